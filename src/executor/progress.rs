//! Parsing of executor progress lines
//!
//! Two line shapes are recognized:
//!
//! ```text
//! [download]  45.2% of ~ 10.00MiB at  1.23MiB/s ETA 00:07
//! [#2089b0 400KiB/33MiB(1%) CN:1 DL:115KiB ETA:4m51s]
//! ```
//!
//! The first is the executor's own downloader (printed with `--newline`), the second is
//! the accelerated downloader's summary line.

use crate::types::ProgressEvent;

/// Parse one output line into a progress event
///
/// Returns `None` for lines that carry no percentage.
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let trimmed = line.trim();
    let (percent, rate_bps) = if let Some(rest) = trimmed.strip_prefix("[download]") {
        parse_native(rest)?
    } else if trimmed.starts_with("[#") {
        parse_accelerated(trimmed)?
    } else {
        return None;
    };

    Some(ProgressEvent {
        percent: percent.clamp(0.0, 100.0),
        rate_bps,
        line: trimmed.to_string(),
    })
}

fn parse_native(rest: &str) -> Option<(f32, u64)> {
    let mut tokens = rest.split_whitespace();
    let percent = tokens.next()?.strip_suffix('%')?.parse::<f32>().ok()?;

    let mut rate = 0;
    while let Some(token) = tokens.next() {
        if token == "at" {
            rate = tokens
                .next()
                .and_then(|value| value.strip_suffix("/s"))
                .and_then(parse_size)
                .unwrap_or(0);
            break;
        }
    }
    Some((percent, rate))
}

fn parse_accelerated(line: &str) -> Option<(f32, u64)> {
    let open = line.find('(')?;
    let close = open + line[open..].find(")")?;
    let percent = line[open + 1..close].strip_suffix('%')?.parse::<f32>().ok()?;

    let rate = line
        .split_whitespace()
        .find_map(|token| token.strip_prefix("DL:"))
        .map(|value| value.trim_end_matches(']'))
        .and_then(parse_size)
        .unwrap_or(0);
    Some((percent, rate))
}

/// Convert a size such as `1.23MiB` or `512KB` to bytes
pub fn parse_size(value: &str) -> Option<u64> {
    let value = value.trim().trim_start_matches('~');
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number = number.parse::<f64>().ok()?;

    let multiplier: f64 = match unit {
        "" | "B" => 1.0,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "KB" | "kB" => 1_000.0,
        "MB" => 1_000_000.0,
        "GB" => 1_000_000_000.0,
        _ => return None,
    };
    Some((number * multiplier) as u64)
}
