//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the `FileSystem` boundary trait but are themselves
//! concrete structs, not traits.

mod deletion;
mod workspace;

pub use deletion::{DeletionService, RemovalOutcome};
pub use workspace::WorkspaceService;
