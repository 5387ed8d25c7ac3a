//! Shared utilities: time, tokens, metrics and tracing setup.

pub mod clock;
pub mod metrics;
pub mod telemetry;
pub mod token;

pub use self::clock::*;
pub use self::metrics::*;
pub use self::telemetry::*;
pub use self::token::*;
