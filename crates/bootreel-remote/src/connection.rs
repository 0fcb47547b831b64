//! Device connection strings.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::RemoteError;

/// Port used when the connection string does not name one.
pub const DEFAULT_SSH_PORT: u16 = 22;

// user:password@host[:port]; the password may contain ':' but not '@'.
static CONNECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^:@]+):([^@]+)@([^:@]+)(?::(\d+))?$").expect("valid connection regex")
});

/// SSH credentials and address of one device.
#[derive(Clone, PartialEq, Eq)]
pub struct Connection {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

impl Connection {
    /// `host:port` as used for TCP connects and log lines.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl FromStr for Connection {
    type Err = RemoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            RemoteError::InvalidConnection(
                "expected user:password@host or user:password@host:port".to_string(),
            )
        };

        let caps = CONNECTION_RE.captures(s.trim()).ok_or_else(invalid)?;

        let port = match caps.get(4) {
            Some(p) => match p.as_str().parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => {
                    return Err(RemoteError::InvalidConnection(format!(
                        "port out of range: {}",
                        p.as_str()
                    )))
                }
            },
            None => DEFAULT_SSH_PORT,
        };

        Ok(Self {
            user: caps[1].to_string(),
            password: caps[2].to_string(),
            host: caps[3].to_string(),
            port,
        })
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("user", &self.user)
            .field("password", &"********")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}
