//! Common utilities module
//!
//! This module contains shared utilities used across the stain pipeline.

pub mod error;

pub use error::{Result, StainError};
