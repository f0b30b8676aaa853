use crate::core::models::RelayConfig;
use crate::core::IdentityProvider;
use crate::proxy::{IdentityGate, OriginRelay, RelayError};
use std::sync::Arc;

/// Web 应用状态
pub struct AppState {
    pub config: RelayConfig,
    pub identity: IdentityGate,
    pub relay: OriginRelay,
}

impl AppState {
    pub fn new(
        config: RelayConfig,
        provider: Arc<dyn IdentityProvider>,
    ) -> Result<Self, RelayError> {
        let relay = OriginRelay::new(config.relay_timeout)?;
        Ok(Self {
            config,
            identity: IdentityGate::new(provider),
            relay,
        })
    }
}
