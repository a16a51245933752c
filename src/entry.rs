use serde::{Serialize, de::DeserializeOwned};

use crate::error::CacheError;

/// A cache entry: the serialized form of a value stored under a resource key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The resource key this entry is stored under.
    pub key: String,

    /// JSON encoding of the value.
    pub serialized_value: String,
}

impl CacheEntry {
    /// Serialize a value into a new entry.
    pub fn encode<V: Serialize>(key: &str, value: &V) -> Result<Self, CacheError> {
        let serialized_value = serde_json::to_string(value)
            .map_err(|e| CacheError::Serialization(format!("Serialization failed: {}", e)))?;
        Ok(CacheEntry {
            key: key.to_string(),
            serialized_value,
        })
    }

    /// Wrap a raw value read back from a store.
    ///
    /// Returns `None` for empty values, which count as a cache miss.
    pub fn from_stored(key: &str, serialized_value: String) -> Option<Self> {
        if serialized_value.is_empty() {
            return None;
        }
        Some(CacheEntry {
            key: key.to_string(),
            serialized_value,
        })
    }

    /// Deserialize the stored value.
    pub fn decode<V: DeserializeOwned>(&self) -> Result<V, CacheError> {
        serde_json::from_str(&self.serialized_value).map_err(|e| {
            CacheError::Serialization(format!(
                "Deserialization failed for key '{}': {}",
                self.key, e
            ))
        })
    }
}
