//! In-memory adapter catalog
//!
//! Serves a fixed adapter list and caller-controlled counters. Used to drive
//! the sampling engine deterministically in tests and when embedding the
//! engine behind a host that already knows its adapters.

use async_trait::async_trait;
use log::trace;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{AdapterCatalog, AdapterDescriptor, AdapterId, ByteCounters, CatalogError};

#[derive(Debug, Default)]
struct CatalogContents {
    adapters: Vec<AdapterDescriptor>,
    counters: HashMap<AdapterId, ByteCounters>,
    enumeration_failure: Option<String>,
}

/// Catalog backed by an adapter list held in memory
#[derive(Debug, Default)]
pub struct StaticCatalog {
    contents: Mutex<CatalogContents>,
}

impl StaticCatalog {
    /// Creates a catalog serving `adapters`, all counters starting at zero
    pub fn new(adapters: Vec<AdapterDescriptor>) -> Self {
        let catalog = Self::default();
        catalog.set_adapters(adapters);
        catalog
    }

    fn contents(&self) -> MutexGuard<'_, CatalogContents> {
        self.contents.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replaces the adapter list; counters of adapters already known are kept
    pub fn set_adapters(&self, adapters: Vec<AdapterDescriptor>) {
        let mut contents = self.contents();
        for adapter in &adapters {
            contents.counters.entry(adapter.id.clone()).or_default();
        }
        contents.adapters = adapters;
    }

    /// Overwrites the cumulative counters of one adapter
    pub fn set_counters(&self, id: &AdapterId, counters: ByteCounters) {
        self.contents().counters.insert(id.clone(), counters);
    }

    /// Adds traffic on top of the current counters of one adapter
    pub fn add_traffic(&self, id: &AdapterId, received: u64, sent: u64) {
        let mut contents = self.contents();
        let counters = contents.counters.entry(id.clone()).or_default();
        counters.received = counters.received.saturating_add(received);
        counters.sent = counters.sent.saturating_add(sent);
    }

    /// Removes the counters of one adapter so reading them fails
    pub fn clear_counters(&self, id: &AdapterId) {
        self.contents().counters.remove(id);
    }

    /// Makes every enumeration call fail with `reason` until cleared with `None`
    pub fn set_enumeration_failure(&self, reason: Option<&str>) {
        self.contents().enumeration_failure = reason.map(str::to_string);
    }
}

#[async_trait]
impl AdapterCatalog for StaticCatalog {
    async fn list_adapters(&self) -> Result<Vec<AdapterDescriptor>, CatalogError> {
        let contents = self.contents();
        if let Some(reason) = &contents.enumeration_failure {
            return Err(CatalogError::Enumeration(reason.clone()));
        }
        trace!("Static catalog serving {} adapters", contents.adapters.len());
        Ok(contents.adapters.clone())
    }

    async fn read_counters(&self, adapter: &AdapterDescriptor) -> Result<ByteCounters, CatalogError> {
        self.contents()
            .counters
            .get(&adapter.id)
            .copied()
            .ok_or_else(|| CatalogError::AdapterNotFound(adapter.id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::adapters::LinkType;

    #[tokio::test]
    async fn test_static_catalog_counters() {
        let eth = AdapterDescriptor::new("eth0", LinkType::Wired);
        let catalog = StaticCatalog::new(vec![eth.clone()]);

        assert_eq!(catalog.read_counters(&eth).await.unwrap(), ByteCounters::default());

        catalog.add_traffic(&eth.id, 1_000, 200);
        catalog.add_traffic(&eth.id, 500, 50);
        assert_eq!(catalog.read_counters(&eth).await.unwrap(), ByteCounters::new(1_500, 250));

        catalog.clear_counters(&eth.id);
        assert!(matches!(
            catalog.read_counters(&eth).await,
            Err(CatalogError::AdapterNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_static_catalog_enumeration_failure() {
        let catalog = StaticCatalog::new(vec![AdapterDescriptor::new("eth0", LinkType::Wired)]);

        catalog.set_enumeration_failure(Some("facility offline"));
        let err = catalog.list_adapters().await.unwrap_err();
        assert!(err.to_string().contains("facility offline"));

        catalog.set_enumeration_failure(None);
        assert_eq!(catalog.list_adapters().await.unwrap().len(), 1);
    }
}
