//! tshot - Kubernetes troubleshooting assistant
//!
//! This library resolves the tool's configuration and runs a single-shot
//! Gemini chat session that turns cluster events into a short diagnosis.

pub mod agent;
pub mod config;
pub mod error;
pub mod ui;

pub use error::{Error, Result};
