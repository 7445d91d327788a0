//! Zero-cost logging macros.
//!
//! With the `tracing` feature enabled the macros forward to the `tracing`
//! crate; without it they expand to nothing, so release builds carry no
//! logging overhead. Only construction logs. The query path stays silent
//! either way.

#![allow(unused_macros, unused_imports)]

/// Debug-level build instrumentation.
#[cfg(feature = "tracing")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

/// Trace-level build instrumentation.
#[cfg(feature = "tracing")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub(crate) use debug_log;
pub(crate) use trace_log;
