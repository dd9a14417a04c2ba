//! Core types and pure logic for the hookline event feed.
//!
//! Everything here is HTTP- and database-free: the canonical event model,
//! the normalizer that collapses upstream payloads into it, the display
//! formatting, and the storage abstraction the server is written against.

pub mod error;
pub mod event;
pub mod normalize;
pub mod present;
pub mod store;
pub mod timefmt;

pub use error::{Error, Result};
