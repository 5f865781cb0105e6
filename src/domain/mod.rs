//! Domain layer: the ST structural model
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod document;
pub mod error;
pub mod grammar;
pub mod node;
pub mod serializer;
pub mod tree;
pub mod workspace;

pub use builder::{StructuralEvent, StructureBuilder};
pub use document::Document;
pub use error::{DomainError, DomainResult, ParseError};
pub use grammar::read_events;
pub use node::{Node, NodeId, NodeKind, Subtree, ROOT_SENTINEL};
pub use serializer::{serialize, serialize_excluding};
pub use tree::{StyleHint, TreeModel};
pub use workspace::{Entry, FileKind, Workspace};
