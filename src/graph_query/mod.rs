//! Domain layer: filter criteria, query compilation and graph shaping.
//!
//! Nothing in here performs I/O. Query execution is reached through the
//! `QueryExecutor` port.

pub mod domain;
pub mod policies;
pub mod services;
