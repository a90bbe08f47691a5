//! crates/echoverse_core/src/telemetry.rs
//!
//! Shared helpers for turning the `LOG_LEVEL` setting into a tracing filter.

/// Maps a log level name onto a `tracing_subscriber::EnvFilter` directive.
///
/// Accepts the usual level names in any case, including `WARNING` and
/// `CRITICAL`. Anything else is passed through as a raw directive such as
/// `api_lib=debug`.
pub fn log_directive(level: &str) -> String {
    let level = level.trim();
    match level.to_ascii_uppercase().as_str() {
        "" | "INFO" => "info".to_string(),
        "CRITICAL" | "FATAL" | "ERROR" => "error".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "DEBUG" => "debug".to_string(),
        "TRACE" | "NOTSET" => "trace".to_string(),
        _ => level.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_level_names() {
        assert_eq!(log_directive("INFO"), "info");
        assert_eq!(log_directive("warning"), "warn");
        assert_eq!(log_directive("CRITICAL"), "error");
        assert_eq!(log_directive(" Debug "), "debug");
        assert_eq!(log_directive(""), "info");
    }

    #[test]
    fn passes_directives_through() {
        assert_eq!(log_directive("api_lib=debug,tower_http=info"), "api_lib=debug,tower_http=info");
    }
}
