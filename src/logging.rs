//! Internal logging helpers for structured keyspan events.

/// Single logging target for keyspan.
pub(crate) const LOG_TARGET: &str = "keyspan";

macro_rules! keyspan_log {
    ($level:expr, $event:expr, $fmt:expr $(, $args:expr)* $(,)?) => {{
        if log::log_enabled!($level) {
            log::log!(
                target: crate::logging::LOG_TARGET,
                $level,
                "event={} {}",
                $event,
                format_args!($fmt $(, $args)*)
            );
        }
    }};
}

pub(crate) use keyspan_log;
