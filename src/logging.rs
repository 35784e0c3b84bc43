//! Logging abstraction
//!
//! Unified logging macros for every build flavour:
//! - Target with the `defmt` feature: forwards to `defmt` (RTT transport)
//! - Unit tests: `println!`
//! - Anything else: compiled out, arguments still type-checked
//!
//! Format strings must stay within the subset both `defmt` and
//! `core::fmt` accept (`{}` with `Format` + `Display` arguments).

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($defmt:ident, $tag:literal, $($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::$defmt!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        ::std::println!("[{}] {}", $tag, ::core::format_args!($($arg)*));

        #[cfg(all(not(feature = "defmt"), not(test)))]
        {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::__log!(error, "ERROR", $($arg)*)
    };
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::__log!(warn, "WARN", $($arg)*)
    };
}

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::__log!(info, "INFO", $($arg)*)
    };
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::__log!(debug, "DEBUG", $($arg)*)
    };
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        $crate::__log!(trace, "TRACE", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use crate::task::CadenceId;

    #[test]
    fn test_macros_accept_display_args() {
        let id = CadenceId::FiftyMs;
        log_info!("activated {}", id);
        log_warn!("overload in {} at tick {}", id.family(), 7u8);
        log_error!("plain message");
        log_debug!("{} {}", 1u32, 2u32);
        log_trace!("{}", id);
    }
}
