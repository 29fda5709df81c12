//! PGHA PostgreSQL Building Blocks
//!
//! Server parameters and access rules, grouped into the tiers the HA agent
//! configuration is merged from.
//!
//! # Core Concepts
//!
//! - [`ParameterSet`]: Insertion-ordered, case-normalized server parameters
//! - [`Parameters`]: Mandatory and default parameter tiers
//! - [`HostBasedAuthentication`]: One `pg_hba.conf` rule and its text form
//! - [`HBAs`]: Mandatory and default rule tiers
//!
//! # Example
//!
//! ```rust
//! use pgha_postgres::HostBasedAuthentication;
//!
//! let rule = HostBasedAuthentication::new().local().method("peer");
//! assert_eq!(rule.to_string(), "local all all peer");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod directories;
mod hba;
mod parameters;

pub use directories::{data_directory, wal_directory, REPLICATION_USER};
pub use hba::{ConnectionKind, HostBasedAuthentication, HBAs};
pub use parameters::{ParameterSet, Parameters};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
