//! # sessionhub-core
//!
//! Core crate for SessionHub. Contains configuration schemas, typed
//! identifiers, limit types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other SessionHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
