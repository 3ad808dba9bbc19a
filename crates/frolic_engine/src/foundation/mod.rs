//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - 2D math types and operations
//! - Frame time management
//! - Logging utilities and the on-screen rolling log

pub mod math;
pub mod time;
pub mod logging;
