//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the scene core:
//! - Math types and operations
//! - Bounding volumes
//! - Logging utilities

pub mod math;
pub mod bounds;
pub mod logging;
