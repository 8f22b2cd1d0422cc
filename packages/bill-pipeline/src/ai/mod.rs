//! Delegate implementations for the bill pipeline.
//!
//! This module provides reference implementations of the `Delegate` trait.
//! Users can use these directly or implement their own.

#[cfg(feature = "anthropic")]
mod anthropic;

#[cfg(feature = "anthropic")]
pub use anthropic::{upstream_from, AnthropicDelegate};
