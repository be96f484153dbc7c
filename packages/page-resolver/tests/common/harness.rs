//! MySQL test harness with testcontainers.
//!
//! One container is started on first use and shared by every test; each test
//! gets its own database so tests can run in parallel.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use page_resolver::source::MySqlSource;
use sqlx::MySqlPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mysql::Mysql;
use tokio::sync::OnceCell;
use url::Url;

static NEXT_DATABASE: AtomicUsize = AtomicUsize::new(0);

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE pages (
        uid INT UNSIGNED NOT NULL PRIMARY KEY,
        pid INT UNSIGNED NOT NULL DEFAULT 0,
        is_siteroot TINYINT(4) NOT NULL DEFAULT 0,
        title VARCHAR(255) NULL,
        nav_hide SMALLINT NULL
    )
    "#,
    r#"
    CREATE TABLE sys_domain (
        uid INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
        pid INT UNSIGNED NOT NULL,
        domainName VARCHAR(255) NOT NULL,
        forced TINYINT(1) NOT NULL DEFAULT 0,
        sorting INT NOT NULL DEFAULT 0
    )
    "#,
];

/// Shared container, kept alive for the whole test run.
struct SharedTestInfra {
    server_url: String,
    _mysql: ContainerAsync<Mysql>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --ignored --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let mysql = Mysql::default()
            .start()
            .await
            .context("Failed to start MySQL container")?;

        let host = mysql.get_host().await?;
        let port = mysql.get_host_port_ipv4(3306).await?;
        let server_url = format!("mysql://root@{}:{}", host, port);

        Ok(Self {
            server_url,
            _mysql: mysql,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

pub struct TestHarness {
    pub db_url: Url,
    pub db_pool: MySqlPool,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;
        let database = format!(
            "resolver_{}",
            NEXT_DATABASE.fetch_add(1, Ordering::SeqCst)
        );

        let admin = MySqlPool::connect(&format!("{}/test", infra.server_url))
            .await
            .context("Failed to connect to MySQL")?;
        sqlx::query(&format!("CREATE DATABASE {database}"))
            .execute(&admin)
            .await
            .context("Failed to create test database")?;
        admin.close().await;

        let db_url = Url::parse(&format!("{}/{}", infra.server_url, database))?;
        let db_pool = MySqlPool::connect(db_url.as_str())
            .await
            .context("Failed to connect to test database")?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&db_pool)
                .await
                .context("Failed to create schema")?;
        }

        Ok(Self { db_url, db_pool })
    }

    pub fn source(&self) -> MySqlSource {
        MySqlSource::new(self.db_pool.clone())
    }

    pub async fn insert_page(&self, uid: u32, pid: u32, is_siteroot: bool, title: Option<&str>) {
        sqlx::query("INSERT INTO pages (uid, pid, is_siteroot, title) VALUES (?, ?, ?, ?)")
            .bind(uid)
            .bind(pid)
            .bind(i8::from(is_siteroot))
            .bind(title)
            .execute(&self.db_pool)
            .await
            .expect("Failed to insert page");
    }

    pub async fn insert_domain(&self, pid: u32, name: &str, forced: bool, sorting: i32) {
        sqlx::query("INSERT INTO sys_domain (pid, domainName, forced, sorting) VALUES (?, ?, ?, ?)")
            .bind(pid)
            .bind(name)
            .bind(forced)
            .bind(sorting)
            .execute(&self.db_pool)
            .await
            .expect("Failed to insert domain");
    }
}
