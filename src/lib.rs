//! stree: structural model for ST template files.
//!
//! ST files hold nested folders of text templates. This crate reads them
//! into an arena-backed tree addressed by (parent, row), writes them back in
//! canonical form, and manages a workspace of open files with deletion that
//! keeps the tree and the files on disk consistent.
//!
//! # Architecture
//!
//! ```text
//! cli            argument parsing, dispatch, terminal output
//! infrastructure FileSystem implementation, file watcher, service container
//! application    WorkspaceService, DeletionService, session persistence
//! domain         Node, TreeModel, StructureBuilder, grammar, serializer
//! ```
//!
//! Errors are layered the same way: `DomainError` is wrapped by
//! `ApplicationError`, which is wrapped by `InfraError`, which is wrapped by
//! `CliError`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
