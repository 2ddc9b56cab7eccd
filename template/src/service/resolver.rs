use super::{ServiceConfig, ServiceEntry, ServiceError};
use crate::error::ConfigError;
use std::sync::Arc;

/// Maps a service URI to the first configured entry whose path matches it.
#[derive(Debug, Clone, Default)]
pub struct ServiceResolver {
    entries: Vec<Arc<ServiceEntry>>,
}

impl ServiceResolver {
    pub fn new(entries: Vec<ServiceEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn from_configs(configs: &[ServiceConfig]) -> Result<Self, ConfigError> {
        let entries = configs
            .iter()
            .map(ServiceEntry::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(entries))
    }

    pub fn resolve(&self, uri: &str) -> Result<Arc<ServiceEntry>, ServiceError> {
        self.entries
            .iter()
            .find(|entry| entry.matches(uri))
            .cloned()
            .ok_or_else(|| ServiceError::NotFound {
                uri: uri.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
