//! Operator notification backends.

pub mod logging;

pub use logging::LogNotifier;
