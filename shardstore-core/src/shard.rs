//! Wire types for shard creation requests
//!
//! A [`ShardImport`] is the JSON body a worker receives when asked to build
//! one shard from one source chunk. Chunk bytes travel base64-encoded inside
//! the document; the field list encoding must round-trip with the worker
//! unchanged.

use serde::{Deserialize, Serialize};

/// Target column type for an imported field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Fixed-width 64-bit integer.
    Long,
    /// 64-bit floating point.
    Double,
    /// Variable-length binary.
    Bytes,
}

/// One column to import: the source column plus the target column and type.
///
/// Immutable once constructed; passed unchanged from the import request into
/// every [`ShardImport`] for the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportField {
    /// Column identifier on the source side.
    pub source_column: String,
    /// Column identifier in the target store.
    pub target_column: String,
    /// Type the target store materialises the column as.
    pub target_type: ColumnType,
}

impl ImportField {
    pub fn new(
        source_column: impl Into<String>,
        target_column: impl Into<String>,
        target_type: ColumnType,
    ) -> Self {
        Self {
            source_column: source_column.into(),
            target_column: target_column.into(),
            target_type,
        }
    }
}

/// JSON body for `PUT /v1/shard/{id}`: one chunk plus the field list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardImport {
    /// Source system tag (`"hive"` in this revision).
    pub source_name: String,
    /// Opaque chunk bytes produced by the source. Base64 on the wire.
    #[serde(with = "base64_bytes")]
    pub chunk: Vec<u8>,
    /// Columns the worker materialises into the shard.
    pub fields: Vec<ImportField>,
}

impl ShardImport {
    pub fn new(source_name: impl Into<String>, chunk: Vec<u8>, fields: Vec<ImportField>) -> Self {
        Self {
            source_name: source_name.into(),
            chunk,
            fields,
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
