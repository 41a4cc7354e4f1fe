use crate::config::EndpointEntry;
use proto_json_tool::EncodeTarget;
use std::path::{Path, PathBuf};

/// A configured route bound to a fixture and a protobuf message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub path: String,
    pub json_file: PathBuf,
    pub proto_file: PathBuf,
    pub message_type: String,
    /// Import root for the schema; the proto file's directory when unset.
    pub proto_root: Option<PathBuf>,
}

impl EndpointConfig {
    /// Build from a raw config entry, resolving relative paths against `base_dir`.
    pub fn from_entry(entry: &EndpointEntry, base_dir: &Path) -> Self {
        Self {
            path: entry.path.clone(),
            json_file: resolve(base_dir, &entry.json_file),
            proto_file: resolve(base_dir, &entry.proto_file),
            message_type: entry.message_type.trim().to_string(),
            proto_root: entry
                .proto_root
                .as_deref()
                .filter(|root| !root.trim().is_empty())
                .map(|root| resolve(base_dir, root)),
        }
    }

    pub fn target(&self) -> EncodeTarget<'_> {
        EncodeTarget {
            json_file: &self.json_file,
            proto_file: &self.proto_file,
            message_type: &self.message_type,
            proto_root: self.proto_root.as_deref(),
        }
    }

    /// Referenced files and directories that do not currently exist.
    pub fn missing_files(&self) -> Vec<&Path> {
        let mut missing = Vec::new();
        for file in [&self.json_file, &self.proto_file] {
            if !file.is_file() {
                missing.push(file.as_path());
            }
        }
        if let Some(root) = &self.proto_root {
            if !root.is_dir() {
                missing.push(root.as_path());
            }
        }
        missing
    }
}

fn resolve(base_dir: &Path, value: &str) -> PathBuf {
    let path = Path::new(value.trim());
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
