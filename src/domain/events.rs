//! Progress events emitted while the catalog changes.
//!
//! Events are delivered synchronously, in order, to a caller-supplied sink.
//! They are the only user-visible failure channel of a scan.

use serde::{Deserialize, Serialize};

use super::asset::Asset;

/// Why an asset appears in a progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogChangeReason {
    /// A new asset was catalogued
    Created,

    /// An asset was removed from the catalog
    Deleted,
}

/// A single progress event
#[derive(Debug, Clone, Default)]
pub struct CatalogChange {
    /// The asset affected by this change
    pub asset: Option<Asset>,

    /// Full catalogued-asset snapshot for the affected folder
    pub catalogued_assets: Option<Vec<Asset>>,

    /// Human-readable message (empty on the final completion event)
    pub message: String,

    /// Change kind, absent on failure and completion events
    pub reason: Option<CatalogChangeReason>,

    /// Failure description
    pub error: Option<String>,
}

impl CatalogChange {
    pub fn created(asset: Asset, catalogued_assets: Vec<Asset>, message: String) -> Self {
        Self {
            asset: Some(asset),
            catalogued_assets: Some(catalogued_assets),
            message,
            reason: Some(CatalogChangeReason::Created),
            error: None,
        }
    }

    pub fn deleted(asset: Asset, message: String) -> Self {
        Self {
            asset: Some(asset),
            message,
            reason: Some(CatalogChangeReason::Deleted),
            ..Default::default()
        }
    }

    pub fn failed(message: String, error: String) -> Self {
        Self {
            message,
            error: Some(error),
            ..Default::default()
        }
    }

    /// Final event of a scan
    pub fn completed() -> Self {
        Self::default()
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_completion(&self) -> bool {
        self.asset.is_none() && self.error.is_none() && self.message.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::asset::fixtures::asset;
    use crate::domain::Folder;

    #[test]
    fn test_created_event_carries_snapshot() {
        let folder = Folder::new("/pictures");
        let a = asset(&folder, "a.jpg", "h");
        let event = CatalogChange::created(a.clone(), vec![a.clone()], "added".to_string());

        assert_eq!(event.reason, Some(CatalogChangeReason::Created));
        assert_eq!(event.catalogued_assets.as_ref().map(Vec::len), Some(1));
        assert!(!event.is_failure());
        assert!(!event.is_completion());
    }

    #[test]
    fn test_failure_and_completion() {
        let failed = CatalogChange::failed("scan failed".to_string(), "boom".to_string());
        assert!(failed.is_failure());
        assert!(failed.reason.is_none());

        let done = CatalogChange::completed();
        assert!(done.is_completion());
        assert!(done.message.is_empty());
    }

    #[test]
    fn test_reason_serialization() {
        let json = serde_json::to_string(&CatalogChangeReason::Deleted).unwrap();
        assert_eq!(json, "\"deleted\"");
    }
}
