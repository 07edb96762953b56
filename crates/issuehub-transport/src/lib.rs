//! HTTPS implementations of the kernel's upstream facade.
//!
//! One `reqwest::Client` per operation, carrying the GitHub default headers
//! (accept, pinned API version, bearer token). Failures are reported once;
//! nothing here retries.

pub mod config;
pub mod graph;
pub mod rest;
pub mod source;
pub mod token;

pub use config::TransportConfig;
pub use graph::GithubGraphClient;
pub use rest::GithubRestClient;
pub use source::GithubClientSource;
pub use token::{TOKEN_ENV_VAR, TokenSource};
