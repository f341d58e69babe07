//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Generative clients (Gemini over HTTP, deterministic mock for offline use)
//! - CLI wiring: container, router and controllers

pub mod adapter;
pub mod api;

pub use adapter::*;
