// ── Gateway discovery ──
//
// Resolves a hint (address or serial) into a full endpoint. Network
// discovery (SSDP) is left to other implementations of the trait.

use std::future::Future;

use crate::endpoint::GatewayEndpoint;
use crate::error::Error;

/// What the caller knows about the gateway it wants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryHint {
    pub address: Option<String>,
    pub serial: Option<String>,
}

impl DiscoveryHint {
    pub fn address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            serial: None,
        }
    }

    pub fn serial(serial: impl Into<String>) -> Self {
        Self {
            address: None,
            serial: Some(serial.into()),
        }
    }

    fn matches(&self, endpoint: &GatewayEndpoint) -> bool {
        let address_ok = self
            .address
            .as_deref()
            .is_none_or(|address| endpoint.address == address);
        let serial_ok = self.serial.as_deref().is_none_or(|serial| {
            endpoint
                .serial
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(serial))
        });
        address_ok && serial_ok
    }
}

pub trait Discovery: Send + Sync {
    fn find(
        &self,
        hint: &DiscoveryHint,
    ) -> impl Future<Output = Result<GatewayEndpoint, Error>> + Send;
}

/// A fixed list of known gateways, typically from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    endpoints: Vec<GatewayEndpoint>,
}

impl StaticDiscovery {
    pub fn new(endpoints: Vec<GatewayEndpoint>) -> Self {
        Self { endpoints }
    }

    /// Synchronous lookup: the first endpoint matching `hint`.
    pub fn lookup(&self, hint: &DiscoveryHint) -> Result<GatewayEndpoint, Error> {
        self.endpoints
            .iter()
            .find(|endpoint| hint.matches(endpoint))
            .cloned()
            .ok_or_else(|| match (&hint.address, &hint.serial) {
                (None, None) => Error::Discovery("no gateway configured".into()),
                (Some(address), _) => Error::Discovery(format!("no gateway at {address}")),
                (None, Some(serial)) => Error::Discovery(format!("no gateway with serial {serial}")),
            })
    }
}

impl Discovery for StaticDiscovery {
    async fn find(&self, hint: &DiscoveryHint) -> Result<GatewayEndpoint, Error> {
        let found = self.lookup(hint)?;
        tracing::debug!(gateway = %found.log_id(), "Gateway discovered");
        Ok(found)
    }
}
