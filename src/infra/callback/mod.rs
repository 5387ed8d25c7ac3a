//! Callback transports.

pub mod http;

pub use http::HttpCallbackTransport;
