/// Conditional logging module for development builds
///
/// The `log!` macro provides informational console logging that is compiled out
/// in production (release) builds by default. Errors and warnings go through
/// `leptos::logging::error!` and `leptos::logging::warn!` instead.
///
/// Logging is enabled when either:
/// - Building in debug mode (`cfg(debug_assertions)`)
/// - The `console_logging` feature is explicitly enabled
///
/// # Examples
///
/// ```ignore
/// use crate::logging::log;
///
/// log!("Viewport reload #{} returned {} stops", generation, stops.len());
/// ```
/// Conditionally log to console in development builds
///
/// This macro expands to `web_sys::console::log_1()` in debug builds or when
/// the `console_logging` feature is enabled. In production release builds,
/// it compiles to nothing (zero overhead).
#[macro_export]
macro_rules! log {
    ($($arg:expr),+ $(,)?) => {{
        #[cfg(any(debug_assertions, feature = "console_logging"))]
        {
            web_sys::console::log_1(&format!($($arg),+).into());
        }
    }};
}

pub use log;

#[cfg(test)]
mod tests {
    use super::log;

    fn describe(outcome: Option<u32>) -> u32 {
        // Usable as a match arm expression as well as a statement
        match outcome {
            Some(_) => {}
            None => log!("nothing to report: {}", 0),
        }
        outcome.unwrap_or_default()
    }

    #[test]
    fn test_log_expands_in_expression_position() {
        assert_eq!(describe(Some(3)), 3);
    }
}
