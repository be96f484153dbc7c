// Page Resolver - Core
//
// Resolves page uids from a parent-pointer page tree into fully-qualified site
// URLs, using a second relation that binds tree roots to domain names.
//
// The hierarchy is loaded once per run into an immutable index; everything
// after the load is pure lookups over that index.

pub mod assoc;
pub mod config;
pub mod dsn;
pub mod error;
pub mod index;
pub mod models;
pub mod output;
pub mod resolver;
pub mod selection;
pub mod source;

pub use config::*;
pub use error::{ResolverError, Result};
pub use index::HierarchyIndex;
pub use resolver::{resolve, ResolveOutcome, ResolveRequest, Resolver};
