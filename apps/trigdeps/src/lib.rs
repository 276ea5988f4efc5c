//! # trigdeps
//!
//! Application layer around `trigdeps-core`: configuration, snapshot
//! storage, the CLI and the HTTP endpoint that receives popup batches.

pub mod api;
pub mod cli;
pub mod config;
pub mod popup;
pub mod store;
