//! Host-based authentication rules
//!
//! Each rule renders to one `pg_hba.conf` line:
//! `<kind> <database> <user> [<address>] <method> [<options...>]`.

use std::collections::BTreeMap;
use std::fmt;

/// Connection type a rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionKind {
    /// Unix-domain socket; never carries an address
    Local,
    /// TCP/IP, with or without TLS
    Host,
    /// TCP/IP with TLS only
    HostSsl,
    /// TCP/IP without TLS only
    HostNoSsl,
}

impl ConnectionKind {
    /// Keyword used in `pg_hba.conf`
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Host => "host",
            Self::HostSsl => "hostssl",
            Self::HostNoSsl => "hostnossl",
        }
    }

    /// Whether rules of this kind match on a client address
    #[inline]
    #[must_use]
    pub fn is_network(self) -> bool {
        !matches!(self, Self::Local)
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One access rule, assembled with a fluent builder
///
/// A rule without a connection kind or a method, or a network rule without an
/// address, is incomplete and renders as the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostBasedAuthentication {
    kind: Option<ConnectionKind>,
    database: String,
    user: String,
    address: Option<String>,
    method: Option<String>,
    options: Option<String>,
}

impl HostBasedAuthentication {
    /// Start a rule matching all databases and all users
    #[must_use]
    pub fn new() -> Self {
        Self {
            kind: None,
            database: "all".to_string(),
            user: "all".to_string(),
            address: None,
            method: None,
            options: None,
        }
    }

    /// Match Unix-domain socket connections. Drops any address.
    #[must_use]
    pub fn local(mut self) -> Self {
        self.kind = Some(ConnectionKind::Local);
        self.address = None;
        self
    }

    /// Match TCP/IP connections with or without TLS
    #[must_use]
    pub fn tcp(mut self) -> Self {
        self.kind = Some(ConnectionKind::Host);
        self
    }

    /// Match TCP/IP connections that use TLS
    #[must_use]
    pub fn tls(mut self) -> Self {
        self.kind = Some(ConnectionKind::HostSsl);
        self
    }

    /// Match TCP/IP connections that do not use TLS
    #[must_use]
    pub fn no_ssl(mut self) -> Self {
        self.kind = Some(ConnectionKind::HostNoSsl);
        self
    }

    /// Match clients from `address`. Switches to TCP/IP unless a network kind
    /// was already chosen.
    #[must_use]
    pub fn network(mut self, address: impl Into<String>) -> Self {
        if !self.kind.is_some_and(ConnectionKind::is_network) {
            self.kind = Some(ConnectionKind::Host);
        }
        self.address = Some(address.into());
        self
    }

    /// Match every database
    #[must_use]
    pub fn all_databases(mut self) -> Self {
        self.database = "all".to_string();
        self
    }

    /// Match one database by name
    #[must_use]
    pub fn database(mut self, name: &str) -> Self {
        self.database = quote(name);
        self
    }

    /// Match physical replication connections
    #[must_use]
    pub fn replication(mut self) -> Self {
        self.database = "replication".to_string();
        self
    }

    /// Match the database named after the connecting user
    #[must_use]
    pub fn same_user(mut self) -> Self {
        self.database = "sameuser".to_string();
        self
    }

    /// Match every user
    #[must_use]
    pub fn all_users(mut self) -> Self {
        self.user = "all".to_string();
        self
    }

    /// Match one user by name
    #[must_use]
    pub fn user(mut self, name: &str) -> Self {
        self.user = quote(name);
        self
    }

    /// Match every member of a role
    #[must_use]
    pub fn role(mut self, name: &str) -> Self {
        self.user = format!("+{}", quote(name));
        self
    }

    /// Authentication method, e.g. `peer`, `scram-sha-256`, `cert`
    #[must_use]
    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.method = Some(name.into());
        self
    }

    /// Method options, rendered sorted by name with quoted values
    #[must_use]
    pub fn options<K, V, I>(mut self, options: I) -> Self
    where
        K: Into<String>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let sorted: BTreeMap<String, V> =
            options.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let rendered = sorted
            .iter()
            .map(|(k, v)| format!("{k}={}", quote(v.as_ref())))
            .collect::<Vec<_>>()
            .join(" ");
        self.options = (!rendered.is_empty()).then_some(rendered);
        self
    }

    /// Connection kind, if chosen
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<ConnectionKind> {
        self.kind
    }

    /// Client address, present only for network kinds
    #[inline]
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

impl Default for HostBasedAuthentication {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HostBasedAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Some(kind), Some(method)) = (self.kind, self.method.as_deref()) else {
            return Ok(());
        };

        let address = match (kind.is_network(), self.address.as_deref()) {
            (true, None) => return Ok(()),
            (true, Some(address)) => Some(address),
            (false, _) => None,
        };

        write!(f, "{kind} {} {}", self.database, self.user)?;
        if let Some(address) = address {
            write!(f, " {address}")?;
        }
        write!(f, " {method}")?;
        if let Some(options) = &self.options {
            write!(f, " {options}")?;
        }
        Ok(())
    }
}

/// Rule tiers composed into the `pg_hba` list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HBAs {
    /// Rules always emitted first, in order
    pub mandatory: Vec<HostBasedAuthentication>,
    /// Rules emitted when the administrator supplies none
    pub default: Vec<HostBasedAuthentication>,
}

impl HBAs {
    /// Create with no rules
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Double-quote an identifier the way `pg_hba.conf` expects
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
