//! # Subscope - scope resolution for extracted graph fragments
//!
//! When a backend pulls a subset of nodes out of a computation graph, the
//! new fragment has to stand on its own before anything resolves it.
//! Nested control-flow bodies still read values from enclosing scopes,
//! and some of those values are now produced outside the fragment.
//!
//! Subscope provides:
//! - An in-memory host graph model with nested control-flow bodies
//! - Fragment extraction from an original model
//! - Scope context building, locality queries and outer-scope binding
//! - Synthesis and installation of missing top-level inputs
//! - A closure check mirroring what a validation pass would reject

pub mod value;
pub mod node;
pub mod graph;
pub mod document;
pub mod extract;
pub mod scope;
pub mod partition;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use value::{ElemType, ValueRef, ValueType};
pub use node::{Node, NodeIndex};
pub use graph::{Graph, GraphId, Model};
pub use partition::{PartitionContext, PartitionOutcome};
pub use scope::{ScopeContextStore, ScopeRecord};

/// Result type alias for Subscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Subscope operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid graph document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("Graph not found: {0}")]
    GraphNotFound(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Duplicate graph name: {0}")]
    DuplicateGraph(String),

    #[error("Structural mismatch: {0}")]
    StructuralMismatch(scope::Diagnostic),
}
