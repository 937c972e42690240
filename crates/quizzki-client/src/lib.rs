//! quizzki-client: HTTP transport and configuration.
//!
//! Implements the `QuizzkiApi` trait over `reqwest` and loads the client
//! configuration from TOML.

pub mod config;
pub mod http;

pub use config::{load_config, load_config_from, QuizzkiConfig};
pub use http::HttpApi;
