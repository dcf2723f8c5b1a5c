//! Logging macros that can be muted per module.
//!
//! The tick loops and the audio thread log on every event; each such module
//! declares its own switch and calls these instead of `log::*` directly:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = false;
//!
//! use crate::log_info;
//! log_info!("countdown tick");
//! ```

/// `log::info!` behind the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// `log::debug!` behind the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// `log::warn!` behind the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}
