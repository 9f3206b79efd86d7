//! Logging macros used across the workspace. They keep the
//! `log_info!("...")` call style and hand the message to `tracing`
//! together with the call site.

pub fn log(msg: &str, file: &str, line: u32, severity: u32) {
    match severity {
        0 | 1 => tracing::debug!(file, line, "{}", msg),
        2 => tracing::info!(file, line, "{}", msg),
        3 => tracing::warn!(file, line, "{}", msg),
        _ => tracing::error!(file, line, "{}", msg),
    }
}

pub fn log_debug(msg: &str, file: &str, line: u32) {
    log(msg, file, line, 1);
}
pub fn log_info(msg: &str, file: &str, line: u32) {
    log(msg, file, line, 2);
}
pub fn log_warn(msg: &str, file: &str, line: u32) {
    log(msg, file, line, 3);
}
pub fn log_error(msg: &str, file: &str, line: u32) {
    log(msg, file, line, 4);
}

#[macro_export]
macro_rules! log_debug {
    ($($args:tt)*) => {{
        $crate::log_debug(&std::fmt::format(format_args!($($args)*)), file!(), line!());
    }}
}

#[macro_export]
macro_rules! log_info {
    ($($args:tt)*) => {{
        $crate::log_info(&std::fmt::format(format_args!($($args)*)), file!(), line!());
    }}
}

#[macro_export]
macro_rules! log_warn {
    ($($args:tt)*) => {{
        $crate::log_warn(&std::fmt::format(format_args!($($args)*)), file!(), line!());
    }}
}

#[macro_export]
macro_rules! log_error {
    ($($args:tt)*) => {{
        $crate::log_error(&std::fmt::format(format_args!($($args)*)), file!(), line!());
    }}
}
