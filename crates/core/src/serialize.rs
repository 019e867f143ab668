// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serializer capability for stored payloads
//!
//! The store only ever sees serialized text. Which domain type a payload
//! decodes into is chosen by the reader; polymorphic payloads (enums of
//! state changes or events) keep their variant through an internal type tag,
//! e.g. `#[serde(tag = "_type")]`, which is also what payload queries match on.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from encoding or decoding a payload
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("failed to encode {type_name}: {source}")]
    Encode {
        type_name: &'static str,
        #[source]
        source: BoxError,
    },
    #[error("failed to decode {type_name}: {source}")]
    Decode {
        type_name: &'static str,
        #[source]
        source: BoxError,
    },
}

/// Encodes domain objects into storable text and back
pub trait Serializer: Send + Sync {
    fn serialize<T: Serialize>(&self, value: &T) -> Result<String, SerializationError>;

    fn deserialize<T: DeserializeOwned>(&self, data: &str) -> Result<T, SerializationError>;
}

/// JSON serializer; payloads stay queryable with SQLite's `json_extract`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize<T: Serialize>(&self, value: &T) -> Result<String, SerializationError> {
        serde_json::to_string(value).map_err(|e| SerializationError::Encode {
            type_name: std::any::type_name::<T>(),
            source: Box::new(e),
        })
    }

    fn deserialize<T: DeserializeOwned>(&self, data: &str) -> Result<T, SerializationError> {
        serde_json::from_str(data).map_err(|e| SerializationError::Decode {
            type_name: std::any::type_name::<T>(),
            source: Box::new(e),
        })
    }
}

#[cfg(test)]
#[path = "serialize_tests.rs"]
mod tests;
