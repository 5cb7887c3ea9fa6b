#![deny(missing_docs)]
//! Mediagrab core library.
//!
//! Link extraction, platform detection, provider fallback chains and
//! delivery of resolved media, independent of any chat framework.

/// Configuration management.
pub mod config;
/// Sending resolved media through a reply channel.
pub mod delivery;
/// URL extraction from free text.
pub mod links;
/// Media references and kind detection.
pub mod media;
/// Per-message processing flow.
pub mod pipeline;
/// Platform classification.
pub mod platform;
/// Provider contract and outcomes.
pub mod provider;
/// Concrete media providers.
pub mod providers;
/// Per-platform provider chains.
pub mod resolver;

pub use pipeline::{MediaPipeline, MessageSummary};
