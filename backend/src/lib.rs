//! Authentic-vs-synthetic media analysis.
//!
//! The pipeline takes a path to an uploaded image or video, pulls a single
//! representative frame, normalises it to a (1, 224, 224, 3) tensor, scores it
//! with either a TorchScript classifier or a simulator, and maps the score to
//! a [`shared::VerdictRecord`].

pub mod analyzer;
pub mod config;
pub mod error;
pub mod inference;
pub mod media;
pub mod preprocess;
pub mod routes;
pub mod upload;
pub mod verdict;

pub use analyzer::Analyzer;
pub use config::AppConfig;
