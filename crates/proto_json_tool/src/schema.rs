//! Runtime compilation of `.proto` files into descriptor pools, plus an
//! mtime-validated cache of compiled schemas.

use crate::error::SchemaError;
use prost_reflect::{DescriptorPool, MessageDescriptor};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

/// A compiled schema: the descriptor pool for one `.proto` file and all of
/// its transitive imports.
#[derive(Debug)]
pub struct CompiledSchema {
    pool: DescriptorPool,
    proto_file: PathBuf,
    /// Files read from disk during compilation with their mtime at that point.
    sources: Vec<(PathBuf, Option<SystemTime>)>,
}

impl CompiledSchema {
    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Files on disk this schema was compiled from.
    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        self.sources.iter().map(|(path, _)| path.as_path())
    }

    /// Resolve a message by name.
    ///
    /// A fully-qualified name (with or without a leading `.`) is matched exactly.
    /// Otherwise the name is treated as a suffix of a fully-qualified name and
    /// must identify exactly one message.
    pub fn message(&self, name: &str) -> Result<MessageDescriptor, SchemaError> {
        let wanted = name.trim_start_matches('.');
        if let Some(desc) = self.pool.get_message_by_name(wanted) {
            return Ok(desc);
        }

        let suffix = format!(".{}", wanted);
        let candidates: Vec<MessageDescriptor> = self
            .pool
            .all_messages()
            .filter(|m| m.full_name().ends_with(&suffix))
            .collect();

        match candidates.as_slice() {
            [one] => Ok(one.clone()),
            [] => Err(SchemaError::UnknownMessage {
                name: name.to_string(),
                file: self.proto_file.clone(),
                available: self.declared_messages(),
            }),
            many => Err(SchemaError::AmbiguousMessage {
                name: name.to_string(),
                file: self.proto_file.clone(),
                candidates: many.iter().map(|m| m.full_name().to_string()).collect(),
            }),
        }
    }

    /// Fully-qualified names of all user-defined messages, sorted.
    pub fn declared_messages(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .pool
            .all_messages()
            .filter(|m| m.package_name() != "google.protobuf")
            .map(|m| m.full_name().to_string())
            .collect();
        names.sort();
        names
    }

    /// True while every source file still has the mtime it had at compile time.
    pub fn is_fresh(&self) -> bool {
        self.sources
            .iter()
            .all(|(path, mtime)| modified(path) == *mtime)
    }
}

/// Compile `proto_file`, resolving imports against `proto_root`.
///
/// When no root is given the directory containing the file is used.
pub fn compile(proto_file: &Path, proto_root: Option<&Path>) -> Result<CompiledSchema, SchemaError> {
    let (file, root) = resolve_paths(proto_file, proto_root)?;
    compile_resolved(&file, &root)
}

fn compile_resolved(file: &Path, root: &Path) -> Result<CompiledSchema, SchemaError> {
    if !file.starts_with(root) {
        return Err(SchemaError::OutsideRoot {
            file: file.to_path_buf(),
            root: root.to_path_buf(),
        });
    }

    let compile_error = |e: protox::Error| SchemaError::Compile {
        file: file.to_path_buf(),
        message: e.to_string(),
    };

    let mut compiler = protox::Compiler::new([root]).map_err(compile_error)?;
    compiler.include_imports(true).include_source_info(false);
    compiler.open_file(file).map_err(compile_error)?;
    let pool = compiler.descriptor_pool();

    // Well-known types ship with the compiler and have no file under the root.
    let sources = pool
        .files()
        .map(|f| root.join(f.name()))
        .filter(|path| path.is_file())
        .map(|path| {
            let mtime = modified(&path);
            (path, mtime)
        })
        .collect();

    tracing::debug!(
        "Compiled {} ({} files in descriptor pool)",
        file.display(),
        pool.files().len()
    );

    Ok(CompiledSchema {
        pool,
        proto_file: file.to_path_buf(),
        sources,
    })
}

/// Canonical (file, include root) pair for a schema.
fn resolve_paths(proto_file: &Path, proto_root: Option<&Path>) -> Result<(PathBuf, PathBuf), SchemaError> {
    let file = std::fs::canonicalize(proto_file)
        .map_err(|_| SchemaError::MissingProtoFile(proto_file.to_path_buf()))?;

    let root = match proto_root {
        Some(root) => {
            std::fs::canonicalize(root).map_err(|_| SchemaError::MissingRoot(root.to_path_buf()))?
        }
        None => file
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| SchemaError::MissingRoot(file.clone()))?,
    };

    Ok((file, root))
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Cache of compiled schemas keyed by canonical (proto file, proto root).
///
/// An entry is served only while all of its source files keep their recorded
/// modification time; otherwise it is recompiled and replaced. Failed
/// compilations are not cached.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: RwLock<HashMap<(PathBuf, PathBuf), Arc<CompiledSchema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(
        &self,
        proto_file: &Path,
        proto_root: Option<&Path>,
    ) -> Result<Arc<CompiledSchema>, SchemaError> {
        let key = resolve_paths(proto_file, proto_root)?;

        let cached = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();

        if let Some(schema) = cached {
            if schema.is_fresh() {
                tracing::trace!("Schema cache hit for {}", key.0.display());
                return Ok(schema);
            }
            tracing::info!("Schema {} changed on disk, recompiling", key.0.display());
        }

        let compiled = Arc::new(compile_resolved(&key.0, &key.1)?);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, compiled.clone());
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
