//! Connection profiles
//!
//! A [`ConnectionProfile`] names everything an adapter needs to reach a
//! database: the dialect tag used to pick the adapter, the host/port of the
//! server, optional credentials, and the target database name.
//!
//! Profiles are immutable once built. They can be assembled field by field or
//! parsed from a connection string of the form
//! `<dialect>://[user[:password]@]host[:port]/`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Login credentials for a database server
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// User name
    pub user: String,
    /// Password (never printed by `Debug`)
    pub password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Everything needed to open one database connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    dialect: String,
    host: String,
    port: Option<u16>,
    credentials: Option<Credentials>,
    database: String,
}

impl ConnectionProfile {
    /// Create a profile without credentials or port
    pub fn new(
        dialect: impl Into<String>,
        host: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        ConnectionProfile {
            dialect: dialect.into().to_ascii_lowercase(),
            host: host.into(),
            port: None,
            credentials: None,
            database: database.into(),
        }
    }

    /// Set the server port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set login credentials
    pub fn with_credentials(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.credentials = Some(Credentials {
            user: user.into(),
            password,
        });
        self
    }

    /// Parse `<dialect>://[user[:password]@]host[:port]/` plus a database name
    ///
    /// The host part may be a filesystem path for file-based dialects
    /// (`sqlite:///var/lib/dbs/`), in which case the trailing slash is kept
    /// off the host.
    pub fn parse(connection_string: &str, database: impl Into<String>) -> Result<Self> {
        let invalid = |reason: &str| {
            Error::Config(format!(
                "invalid connection string '{}': {}",
                redact(connection_string),
                reason
            ))
        };

        let (dialect, rest) = connection_string
            .split_once("://")
            .ok_or_else(|| invalid("missing '<dialect>://' prefix"))?;
        if dialect.is_empty() {
            return Err(invalid("empty dialect"));
        }

        let (userinfo, hostport) = match rest.rfind('@') {
            Some(at) => (Some(&rest[..at]), &rest[at + 1..]),
            None => (None, rest),
        };

        let credentials = match userinfo {
            Some(info) => {
                let (user, password) = match info.split_once(':') {
                    Some((user, password)) => (user, Some(password.to_string())),
                    None => (info, None),
                };
                if user.is_empty() {
                    return Err(invalid("empty user name"));
                }
                Some(Credentials {
                    user: user.to_string(),
                    password,
                })
            }
            None => None,
        };

        let hostport = hostport.strip_suffix('/').unwrap_or(hostport);
        let (host, port) = match hostport.rsplit_once(':') {
            Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
                let port = port.parse::<u16>().map_err(|_| invalid("port out of range"))?;
                (host, Some(port))
            }
            _ => (hostport, None),
        };
        if host.is_empty() {
            return Err(invalid("empty host"));
        }

        Ok(ConnectionProfile {
            dialect: dialect.to_ascii_lowercase(),
            host: host.to_string(),
            port,
            credentials,
            database: database.into(),
        })
    }

    /// Dialect tag (lowercase)
    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    /// Server host, or the directory holding the database for file dialects
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Server port, if any
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Login credentials, if any
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Target database name
    pub fn database(&self) -> &str {
        &self.database
    }
}

/// Strip the password from a connection string before it reaches an error message
fn redact(connection_string: &str) -> String {
    let Some((scheme, rest)) = connection_string.split_once("://") else {
        return connection_string.to_string();
    };
    match rest.rfind('@') {
        Some(at) => {
            let user = rest[..at].split(':').next().unwrap_or_default();
            format!("{}://{}:***@{}", scheme, user, &rest[at + 1..])
        }
        None => connection_string.to_string(),
    }
}
