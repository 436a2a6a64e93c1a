use colored::{Color, ColoredString, Colorize};

use crate::testing::Status;

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for log::Level {
    fn color(&self) -> Color {
        use log::Level::*;
        match self {
            Error => Color::BrightRed,
            Warn => Color::BrightYellow,
            Info => Color::Cyan,
            Debug => Color::Magenta,
            Trace => Color::Blue,
        }
    }
}

/// Basic ANSI colour and its 24-bit counterpart for each status.
fn status_palette(status: Status) -> (Color, [u8; 3]) {
    match status {
        Status::Passed => (Color::Green, [46, 160, 67]),
        Status::Failed => (Color::Yellow, [219, 154, 4]),
        Status::TimedOut => (Color::Red, [207, 34, 46]),
        Status::ExecutionError => (Color::Magenta, [137, 87, 229]),
    }
}

impl ColorTheme for Status {
    fn color(&self) -> Color {
        let (basic, [r, g, b]) = status_palette(*self);
        if is_truecolor_supported() {
            Color::TrueColor { r, g, b }
        } else {
            basic
        }
    }
}

/// Status code as a badge, e.g. ` TLE ` in white on red.
pub fn status_icon(status: Status) -> ColoredString {
    format!(" {} ", status)
        .on_color(status.color())
        .bold()
        .white()
}

/// `✓ PASS` / `✗ FAIL`
pub fn pass_marker(passed: bool) -> ColoredString {
    if passed {
        "✓ PASS".green().bold()
    } else {
        "✗ FAIL".bright_red().bold()
    }
}
