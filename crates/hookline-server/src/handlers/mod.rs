//! Request handlers, one module per endpoint.

pub mod cleanup;
pub mod events;
pub mod health;
pub mod seed;
pub mod webhook;
