//! Data Transfer Objects for write operations
//!
//! Each DTO is the variable set of one mutation in the operation catalog.
//! Field names serialize to the camelCase argument names the board API expects.

pub mod auth;
pub mod board;
pub mod column;
