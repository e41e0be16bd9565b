//! JSON record serializer.
//!
//! Records are stored as `{"docType":"asset","id":..,"owner":..,"fields":{..}}`.
//! Unknown fields are ignored on read; a missing or foreign `docType` is
//! rejected.

use crate::domain::entities::Asset;
use crate::domain::errors::SerializationError;
use crate::ports::outbound::AssetSerializer;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(tag = "docType")]
enum DocumentRef<'a> {
    #[serde(rename = "asset")]
    Asset(&'a Asset),
}

#[derive(Deserialize)]
#[serde(tag = "docType")]
enum Document {
    #[serde(rename = "asset")]
    Asset(Asset),
}

/// Default asset serializer using serde_json.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonAssetSerializer;

impl AssetSerializer for JsonAssetSerializer {
    fn serialize(&self, asset: &Asset) -> Result<Vec<u8>, SerializationError> {
        serde_json::to_vec(&DocumentRef::Asset(asset))
            .map_err(|e| SerializationError::new(e.to_string()))
    }

    fn deserialize(&self, data: &[u8]) -> Result<Asset, SerializationError> {
        match serde_json::from_slice(data) {
            Ok(Document::Asset(asset)) => Ok(asset),
            Err(e) => Err(SerializationError::new(e.to_string())),
        }
    }
}
