use super::event_types;
use crate::domain::identity::Operation;
use serde::{Deserialize, Serialize};

/// Payload of every ledger event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEvent {
    pub tx_id: String,
    pub key: String,
    /// Owner after the change (the last owner, for a deletion).
    pub owner: String,
    /// Owner before the change, when it changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_owner: Option<String>,
}

impl AssetEvent {
    pub fn new(tx_id: impl Into<String>, key: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            tx_id: tx_id.into(),
            key: key.into(),
            owner: owner.into(),
            previous_owner: None,
        }
    }

    pub fn with_previous_owner(mut self, previous: impl Into<String>) -> Self {
        self.previous_owner = Some(previous.into());
        self
    }

    /// Event type published for a committed mutation.
    pub fn event_type(operation: Operation) -> Option<&'static str> {
        match operation {
            Operation::CreateAsset => Some(event_types::ASSET_CREATED),
            Operation::UpdateAsset => Some(event_types::ASSET_UPDATED),
            Operation::TransferAsset => Some(event_types::ASSET_TRANSFERRED),
            Operation::DeleteAsset => Some(event_types::ASSET_DELETED),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
