//! Time-windowed developer gate.
//!
//! A six-digit code is derived from the current ten-minute epoch bucket, so
//! the same code is valid everywhere for up to ten minutes and nothing needs
//! to be stored.

use std::time::{SystemTime, UNIX_EPOCH};

const WINDOW_SECONDS: u64 = 10 * 60;

/// The access code for the window containing `unix_seconds`.
pub fn window_code(unix_seconds: u64) -> String {
    let window = unix_seconds / WINDOW_SECONDS;
    let code = (window.wrapping_mul(123_456)) % 900_000 + 100_000;
    code.to_string()
}

/// The access code for the current window.
pub fn current_code() -> String {
    window_code(now_unix_seconds())
}

/// Whether `code` matches the current window's code.
pub fn verify_code(code: &str) -> bool {
    window_code(now_unix_seconds()) == code.trim()
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
