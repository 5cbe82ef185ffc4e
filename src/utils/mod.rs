//! Utility functions.
//!
//! This module provides:
//! - Sanitization of untrusted header values before they are stored
//! - Process metadata for the health endpoint

pub mod process;
pub mod sanitize;
