//! Contract deployment core
//!
//! Loads compiled artifacts, encodes constructor arguments and drives a
//! contract creation transaction to the requested confirmation depth.

pub mod abi;
pub mod artifact;
pub mod bytecode;
pub mod chain;
pub mod error;
pub mod orchestrator;
pub mod types;

pub use abi::{json_to_sol_value, Abi, ConstructorInfo, ParamInfo};
pub use artifact::{
    ArtifactInfo, ArtifactSource, ContractArtifact, FileSystemArtifactSource,
    InMemoryArtifactSource,
};
pub use bytecode::Bytecode;
pub use chain::{AlloyChainClient, ChainClient, DeploySigner, DeploymentReceipt, PendingDeployment};
pub use error::{Error, ErrorKind, Result};
pub use orchestrator::Orchestrator;
pub use types::*;
