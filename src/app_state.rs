use std::sync::Arc;

use crate::{
    config::MailConfig, extraction::registry::RunRegistry, utils::utils_mailbox::MailConnector,
};

/// Shared by every HTTP worker through `web::Data`.
pub struct AppState {
    pub registry: RunRegistry,
    pub connector: Arc<dyn MailConnector>,
    pub config: Arc<MailConfig>,
}

impl AppState {
    pub fn new(connector: Arc<dyn MailConnector>, config: MailConfig) -> Self {
        Self {
            registry: RunRegistry::new(),
            connector,
            config: Arc::new(config),
        }
    }
}
