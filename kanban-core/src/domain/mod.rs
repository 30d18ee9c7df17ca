//! Core domain types
//!
//! These types mirror the objects returned by the remote board API. They are
//! shared between the client library (which decodes them from cached query
//! results) and the CLI (which renders them).

pub mod board;
pub mod column;
pub mod user;
