//! HTTP front end for the weather advice service.
//!
//! The binary in `main.rs` handles CLI parsing, configuration and startup;
//! this library exposes the router so it can be driven in tests.

pub mod http;

pub use http::router;
