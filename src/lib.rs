//! GraphDB Path - bidirectional path finding for a graph database
//!
//! This crate implements the `FIND SHORTEST | ALL | WEIGHTED SHORTEST PATH`
//! query family: per-pair bidirectional frontier search over an injected
//! neighbor-expansion capability, coordinated across the cartesian product
//! of source and destination vertices.

pub mod config;
pub mod core;
pub mod query;
pub mod storage;
pub mod utils;
