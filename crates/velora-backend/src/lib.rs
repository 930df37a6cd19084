//! # velora-backend
//!
//! HTTP adapter implementing the `velora-core` auth collaborator port
//! against the Velora auth service.

pub mod http;

pub use http::HttpAuthBackend;
