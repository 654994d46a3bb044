//! Conditional logging macros.
//!
//! With the `tracing` feature these re-export the `tracing` macros.
//! Without it they expand to nothing.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, warn};

#[cfg(not(feature = "tracing"))]
macro_rules! debug_ {
    ($($arg:tt)*) => {};
}

// `warn` alone would clash with the built-in lint attribute.
#[cfg(not(feature = "tracing"))]
macro_rules! warn_ {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use debug_ as debug;

#[cfg(not(feature = "tracing"))]
pub(crate) use warn_ as warn;
