//! Diagnostics written to stderr, gated on the run's verbosity.
//!
//! `verbosity` comes from `AnalyzerConfig.verbosity`. A message is printed
//! when the verbosity is at least the message's level, so 0 prints nothing.

/// One line per `analyze`/`suggest` call.
pub const VERBOSITY_SUMMARY: u8 = 1;
/// Per-task scores and circular flags.
pub const VERBOSITY_DECISIONS: u8 = 2;
/// Cycle search internals and unknown dependency ids.
pub const VERBOSITY_DEBUG: u8 = 3;

/// Print to stderr if `$verbosity >= $level`.
#[macro_export]
macro_rules! log_at {
    ($level:expr, $verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $level {
            eprintln!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_summary {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::VERBOSITY_SUMMARY, $verbosity, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_decisions {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::VERBOSITY_DECISIONS, $verbosity, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::VERBOSITY_DEBUG, $verbosity, $($arg)*)
    };
}
