// ── Gateway endpoint ──
//
// Where a gateway lives and how to authenticate against it. Sessions
// only ever read it.

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Default OpenWebNet TCP port.
pub const DEFAULT_PORT: u16 = 20000;

/// Address, port and optional credentials of one gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayEndpoint {
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Numeric for legacy gateways, free text for HMAC ones.
    #[serde(default, skip_serializing)]
    pub password: Option<SecretString>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub firmware: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl GatewayEndpoint {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: DEFAULT_PORT,
            password: None,
            serial: None,
            model: None,
            firmware: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    /// Short identifier for log lines: the serial when known, else `host:port`.
    pub fn log_id(&self) -> String {
        self.serial
            .clone()
            .unwrap_or_else(|| format!("{}:{}", self.address, self.port))
    }
}

impl fmt::Display for GatewayEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}
