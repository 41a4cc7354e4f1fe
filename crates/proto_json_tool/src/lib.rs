//! Encode JSON fixtures into protobuf wire format using `.proto` schemas that
//! are compiled at runtime, so no generated code or external `protoc` is needed.
//!
//! The pipeline is: compile schema -> resolve message type -> read fixture ->
//! map JSON onto a dynamic message -> serialize.

use prost::Message;
use prost_reflect::{DynamicMessage, MessageDescriptor};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

pub mod error;
pub mod fixture;
pub mod schema;

pub use error::{ConversionError, EncodeError, FixtureError, Result, SchemaError};
pub use schema::{CompiledSchema, SchemaCache};

/// Everything needed to produce one encoded message.
#[derive(Debug, Clone, Copy)]
pub struct EncodeTarget<'a> {
    pub json_file: &'a Path,
    pub proto_file: &'a Path,
    pub message_type: &'a str,
    /// Import root; the proto file's directory when `None`.
    pub proto_root: Option<&'a Path>,
}

/// Stateless encoder with an optional schema cache.
#[derive(Debug)]
pub struct Encoder {
    cache: Option<SchemaCache>,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    /// Encoder that caches compiled schemas until their files change.
    pub fn new() -> Self {
        Self {
            cache: Some(SchemaCache::new()),
        }
    }

    /// Encoder that compiles the schema on every call.
    pub fn without_cache() -> Self {
        Self { cache: None }
    }

    pub fn schema(
        &self,
        proto_file: &Path,
        proto_root: Option<&Path>,
    ) -> std::result::Result<Arc<CompiledSchema>, SchemaError> {
        match &self.cache {
            Some(cache) => cache.get_or_compile(proto_file, proto_root),
            None => schema::compile(proto_file, proto_root).map(Arc::new),
        }
    }

    /// Build the message described by `target` and return its wire bytes.
    pub fn encode(&self, target: &EncodeTarget<'_>) -> Result<Vec<u8>> {
        let schema = self.schema(target.proto_file, target.proto_root)?;
        let desc = schema.message(target.message_type)?;
        let json = fixture::read_fixture(target.json_file)?;
        let message = fixture::to_message(json, &desc)?;

        let bytes = message.encode_to_vec();
        tracing::debug!(
            "Encoded {} from {} ({} bytes)",
            desc.full_name(),
            target.json_file.display(),
            bytes.len()
        );
        Ok(bytes)
    }
}

/// Decode wire bytes as `desc` and render them as JSON.
pub fn decode_to_json(bytes: &[u8], desc: &MessageDescriptor) -> std::result::Result<Value, ConversionError> {
    let message = DynamicMessage::decode(desc.clone(), bytes).map_err(|source| ConversionError::Decode {
        message: desc.full_name().to_string(),
        source,
    })?;
    fixture::to_json(&message)
}
