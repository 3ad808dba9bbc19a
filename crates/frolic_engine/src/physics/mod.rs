//! Physics module for collision detection and response
//!
//! Provides axis-aligned area tests with enter detection, push-out
//! resolution against solid objects and a simple platformer body.

pub mod body;
pub mod collision;
pub mod resolve;

pub use body::{Body, BodyConf};
pub use collision::{Area, ContactKind};
pub use resolve::{Contact, Side, SOLID_TAG};
