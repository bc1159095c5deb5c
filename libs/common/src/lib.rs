//! Common library for the Jobly application
//!
//! This crate provides shared functionality used by the services of the
//! workspace: database connectivity, error types and the partial-update
//! SQL builder.

pub mod database;
pub mod error;
pub mod sql;
