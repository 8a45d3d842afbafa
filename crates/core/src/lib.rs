//! Domain primitives shared by the database layer and the HTTP API.
//!
//! Nothing in this crate performs I/O.

pub mod error;
pub mod greeting;
pub mod types;
