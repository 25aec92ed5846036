/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Colour for a month lock state: closed months are shown in grey.
pub fn color_for_state(closed: bool) -> &'static str {
    if closed { GREY } else { GREEN }
}

/// Colour for actual minutes against an estimate:
/// over budget → red, within → green, no estimate → reset
pub fn color_for_budget(actual: i64, estimated: Option<i64>) -> &'static str {
    match estimated {
        Some(est) if actual > est => RED,
        Some(_) => GREEN,
        None => RESET,
    }
}

/// Greys out empty cells ("" or "--").
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}
