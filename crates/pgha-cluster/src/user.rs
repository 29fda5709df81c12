//! Administrator-supplied bootstrap user
//!
//! Every field is untrusted text and is only ever embedded through the
//! quoting layer of the document assembler.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, ClusterResult};

/// Database, role and password digest created after the cluster bootstraps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapUser {
    /// Database to create
    pub database: String,
    /// Role to create; owns all privileges on `database`
    pub user: String,
    /// Password verifier (SCRAM or MD5 digest), never a plaintext password
    pub verifier: String,
}

impl BootstrapUser {
    /// Secret key holding the database name
    pub const DATABASE_KEY: &'static str = "dbname";
    /// Secret key holding the role name
    pub const USER_KEY: &'static str = "user";
    /// Secret key holding the password verifier
    pub const VERIFIER_KEY: &'static str = "verifier";

    /// Create bootstrap user
    #[must_use]
    pub fn new(
        database: impl Into<String>,
        user: impl Into<String>,
        verifier: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            user: user.into(),
            verifier: verifier.into(),
        }
    }

    /// Read the user from secret data. Missing keys become empty strings.
    ///
    /// # Errors
    /// Returns [`ClusterError::InvalidSecret`] when a present value is not UTF-8
    pub fn from_secret_data(data: &BTreeMap<String, Vec<u8>>) -> ClusterResult<Self> {
        let read = |key: &str| -> ClusterResult<String> {
            match data.get(key) {
                Some(bytes) => String::from_utf8(bytes.clone())
                    .map_err(|_| ClusterError::InvalidSecret { key: key.to_string() }),
                None => Ok(String::new()),
            }
        };

        Ok(Self {
            database: read(Self::DATABASE_KEY)?,
            user: read(Self::USER_KEY)?,
            verifier: read(Self::VERIFIER_KEY)?,
        })
    }
}
