//! Artifact loading trait and implementations
//!
//! [`FileSystemArtifactSource`] reads compiler output from disk. Both Hardhat
//! (`artifacts/contracts/Foo.sol/Foo.json`, bytecode as a hex string) and
//! Forge (`out/Foo.sol/Foo.json`, bytecode as `{ "object": ... }`) layouts
//! are understood.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::abi::{Abi, ConstructorInfo};
use crate::bytecode::Bytecode;
use crate::error::{Error, Result};

// =============================================================================
// Artifact
// =============================================================================

/// Compiled contract: creation bytecode plus ABI
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub name: String,
    pub bytecode: Bytecode,
    pub abi: Abi,
}

impl ContractArtifact {
    pub fn new(name: impl Into<String>, abi: Abi, bytecode: Bytecode) -> Self {
        Self {
            name: name.into(),
            bytecode,
            abi,
        }
    }

    /// Parse a Hardhat or Forge artifact JSON document
    pub fn from_json(name: &str, json: &str) -> Result<Self> {
        let file: ArtifactFile = serde_json::from_str(json)?;
        let abi = Abi::from_value(&file.abi)?;
        let bytecode = match file.bytecode {
            Some(field) => Bytecode::from_hex(field.as_hex())?,
            None => Bytecode::default(),
        };
        Ok(Self::new(name, abi, bytecode))
    }

    /// Interfaces and abstract contracts compile to empty bytecode
    pub fn is_deployable(&self) -> bool {
        !self.bytecode.is_empty()
    }
}

/// On-disk artifact layout shared by Hardhat and Forge
#[derive(Debug, Deserialize)]
struct ArtifactFile {
    abi: serde_json::Value,
    #[serde(default)]
    bytecode: Option<BytecodeField>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Hex(String),
    Object { object: String },
}

impl BytecodeField {
    fn as_hex(&self) -> &str {
        match self {
            BytecodeField::Hex(hex) => hex,
            BytecodeField::Object { object } => object,
        }
    }
}

/// Summary of a deployable artifact (for listing)
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub name: String,
    pub source: String,
    /// Human readable constructor signature
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constructor: Option<ConstructorInfo>,
    pub bytecode_size: usize,
}

// =============================================================================
// Trait Definition
// =============================================================================

/// Source of compiled contract artifacts
pub trait ArtifactSource: Send + Sync {
    /// Load an artifact by contract name
    fn load_artifact(&self, name: &str) -> Result<ContractArtifact>;
}

impl<T: ArtifactSource + ?Sized> ArtifactSource for Arc<T> {
    fn load_artifact(&self, name: &str) -> Result<ContractArtifact> {
        (**self).load_artifact(name)
    }
}

// =============================================================================
// Filesystem Implementation
// =============================================================================

/// Artifact source that reads compiler output from a directory tree
#[derive(Debug, Clone)]
pub struct FileSystemArtifactSource {
    root: PathBuf,
}

impl FileSystemArtifactSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List all deployable artifacts, sorted by name
    pub fn list(&self) -> Result<Vec<ArtifactInfo>> {
        let mut files = Vec::new();
        collect_json_files(&self.root, &mut files)?;

        let mut artifacts = Vec::new();
        for path in files {
            let Some(name) = path.file_stem().and_then(|n| n.to_str()) else {
                continue;
            };
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            // Skip non-artifact JSON and interfaces
            let Ok(artifact) = ContractArtifact::from_json(name, &content) else {
                continue;
            };
            if !artifact.is_deployable() {
                continue;
            }

            artifacts.push(ArtifactInfo {
                name: artifact.name.clone(),
                source: source_of(&path),
                signature: artifact.abi.constructor_signature(),
                constructor: artifact.abi.constructor(),
                bytecode_size: artifact.bytecode.len(),
            });
        }

        artifacts.sort_by(|a, b| a.name.cmp(&b.name).then(a.source.cmp(&b.source)));
        Ok(artifacts)
    }

    /// Locate the artifact file for `name`.
    ///
    /// `name` is either a bare contract name or `Source.sol:Contract` to
    /// disambiguate contracts that share a name.
    fn find(&self, name: &str) -> Result<PathBuf> {
        let (source, contract) = match name.rsplit_once(':') {
            Some((source, contract)) => (Some(source), contract),
            None => (None, name),
        };

        let mut files = Vec::new();
        if self.root.is_dir() {
            collect_json_files(&self.root, &mut files)?;
        }

        let file_name = format!("{}.json", contract);
        let matches: Vec<PathBuf> = files
            .into_iter()
            .filter(|p| p.file_name().and_then(|n| n.to_str()) == Some(file_name.as_str()))
            .filter(|p| match source {
                Some(source) => {
                    let found = source_of(p);
                    source == found || source.ends_with(&format!("/{}", found))
                }
                None => true,
            })
            .collect();

        match matches.len() {
            0 => Err(Error::ArtifactNotFound(format!(
                "'{}' not found under {}. Was the project compiled?",
                name,
                self.root.display()
            ))),
            1 => Ok(matches.into_iter().next().unwrap_or_default()),
            _ => {
                let sources: Vec<String> = matches.iter().map(|p| source_of(p)).collect();
                Err(Error::config(format!(
                    "Contract name '{}' is ambiguous ({}). Use <Source.sol>:{}",
                    name,
                    sources.join(", "),
                    contract
                )))
            }
        }
    }
}

impl ArtifactSource for FileSystemArtifactSource {
    fn load_artifact(&self, name: &str) -> Result<ContractArtifact> {
        let path = self.find(name)?;
        tracing::debug!(artifact = %path.display(), "Loading artifact");

        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let contract = name.rsplit_once(':').map_or(name, |(_, c)| c);
        ContractArtifact::from_json(contract, &content)
    }
}

/// Recursively collect artifact JSON files, skipping debug and build-info output
fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| Error::config(format!("Failed to read {}: {}", dir.display(), e)))?;

    for entry in entries.flatten() {
        let path = entry.path();
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();

        if path.is_dir() {
            if file_name.starts_with('.') || file_name == "build-info" {
                continue;
            }
            collect_json_files(&path, out)?;
        } else if file_name.ends_with(".json")
            && !file_name.ends_with(".dbg.json")
            && !file_name.ends_with(".metadata.json")
        {
            out.push(path);
        }
    }

    Ok(())
}

/// Name of the directory holding an artifact, i.e. the source file name
fn source_of(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

// =============================================================================
// In-memory Implementation
// =============================================================================

/// Artifact source backed by a map, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifactSource {
    artifacts: HashMap<String, ContractArtifact>,
}

impl InMemoryArtifactSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, artifact: ContractArtifact) {
        self.artifacts.insert(artifact.name.clone(), artifact);
    }

    pub fn with(mut self, artifact: ContractArtifact) -> Self {
        self.insert(artifact);
        self
    }
}

impl ArtifactSource for InMemoryArtifactSource {
    fn load_artifact(&self, name: &str) -> Result<ContractArtifact> {
        self.artifacts
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ArtifactNotFound(name.to_string()))
    }
}
