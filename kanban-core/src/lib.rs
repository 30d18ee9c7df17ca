//! Kanban Core
//!
//! Core types and abstractions for the kanban board client.
//!
//! This crate contains:
//! - Domain types: Boards, columns and users as returned by the board API
//! - DTOs: Variable sets for the write operations
//! - Operations: The operation model, cache identities and the operation catalog

pub mod domain;
pub mod dto;
pub mod operation;
pub mod operations;

pub use operation::{Identity, Operation, OperationKind, ValidationError};
