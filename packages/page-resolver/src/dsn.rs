//! Connection string normalization.
//!
//! Accepts either a `mysql://` URL or the driver-style form
//! `user:password@tcp(host:port)/dbname?param=value` and always yields a URL
//! the pool can connect with.

use url::{form_urlencoded, Url};

use crate::error::{ResolverError, Result};

const DEFAULT_TCP_ADDRESS: &str = "127.0.0.1:3306";

pub fn normalize_dsn(dsn: &str) -> Result<Url> {
    let dsn = dsn.trim();
    if dsn.is_empty() {
        return Err(ResolverError::Config("empty connection string".to_string()));
    }

    if dsn.starts_with("mysql://") || dsn.starts_with("mariadb://") {
        return Url::parse(dsn)
            .map_err(|e| ResolverError::Config(format!("invalid connection URL: {e}")));
    }

    parse_driver_dsn(dsn)
}

fn invalid(reason: &str) -> ResolverError {
    ResolverError::Config(format!("invalid connection string: {reason}"))
}

fn parse_driver_dsn(dsn: &str) -> Result<Url> {
    // Parameters start at the first '?' after any "(address)" block.
    let params_from = dsn.rfind(')').unwrap_or(0);
    let (head, params) = match dsn[params_from..].find('?') {
        Some(q) => (&dsn[..params_from + q], &dsn[params_from + q + 1..]),
        None => (dsn, ""),
    };

    let slash = head
        .rfind('/')
        .ok_or_else(|| invalid("missing '/' before database name"))?;
    let (prefix, dbname) = (&head[..slash], &head[slash + 1..]);

    let (credentials, net) = match prefix.rfind('@') {
        Some(at) => (Some(&prefix[..at]), &prefix[at + 1..]),
        None => (None, prefix),
    };

    let (protocol, address) = match net.find('(') {
        Some(open) => {
            if !net.ends_with(')') || net.len() < open + 2 {
                return Err(invalid("unterminated address"));
            }
            (&net[..open], &net[open + 1..net.len() - 1])
        }
        None => (net, ""),
    };

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut url = match protocol {
        "" | "tcp" => {
            let address = if address.is_empty() {
                DEFAULT_TCP_ADDRESS
            } else {
                address
            };
            Url::parse(&format!("mysql://{address}/"))
                .map_err(|e| invalid(&format!("bad address {address:?}: {e}")))?
        }
        "unix" => {
            if address.is_empty() {
                return Err(invalid("unix protocol needs a socket path"));
            }
            pairs.push(("socket".to_string(), address.to_string()));
            Url::parse("mysql://localhost/").map_err(|e| invalid(&e.to_string()))?
        }
        other => return Err(invalid(&format!("unsupported protocol {other:?}"))),
    };

    if let Some(credentials) = credentials {
        let (user, password) = match credentials.split_once(':') {
            Some((user, password)) => (user, Some(password)),
            None => (credentials, None),
        };
        url.set_username(user)
            .map_err(|_| invalid("cannot set username"))?;
        url.set_password(password)
            .map_err(|_| invalid("cannot set password"))?;
    }

    url.set_path(dbname);
    pairs.extend(form_urlencoded::parse(params.as_bytes()).into_owned());
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }

    Ok(url)
}
