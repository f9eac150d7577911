/// Format a CO2 mass given in grams (e.g., "1.23 kg", "4.56 g", "12.3 mg").
pub fn format_grams(grams: f64) -> String {
    let g = grams.abs();
    if g >= 1000.0 {
        format!("{:.2} kg", grams / 1000.0)
    } else if g >= 1.0 {
        format!("{:.2} g", grams)
    } else if g >= 0.001 {
        format!("{:.1} mg", grams * 1000.0)
    } else if g > 0.0 {
        format!("{:.1} \u{00b5}g", grams * 1_000_000.0)
    } else {
        "0 g".to_string()
    }
}

/// Format a duration in seconds into "Xd Xh Xm" or "Xh Xm Xs".
pub fn format_elapsed(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let mins = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {mins}m")
    } else if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        let s = secs % 60;
        format!("{mins}m {s}s")
    }
}

/// Format a percentage with one decimal (e.g., "45.2%").
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty()
        || haystack
            .as_bytes()
            .windows(needle.len())
            .any(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Parse a `#RRGGBB` color code.
pub fn parse_hex_color(code: &str) -> Option<(u8, u8, u8)> {
    let hex = code.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grams_pick_a_readable_unit() {
        assert_eq!(format_grams(0.0), "0 g");
        assert_eq!(format_grams(0.001667), "1.7 mg");
        assert_eq!(format_grams(0.0000005), "0.5 \u{00b5}g");
        assert_eq!(format_grams(12.346), "12.35 g");
        assert_eq!(format_grams(2500.0), "2.50 kg");
    }

    #[test]
    fn elapsed_time() {
        assert_eq!(format_elapsed(59), "0m 59s");
        assert_eq!(format_elapsed(3 * 3600 + 120), "3h 2m");
        assert_eq!(format_elapsed(86400 + 60), "1d 0h 1m");
    }

    #[test]
    fn case_insensitive_contains() {
        assert!(contains_ignore_ascii_case("Intel(R) Core(TM)", "INTEL"));
        assert!(contains_ignore_ascii_case("anything", ""));
        assert!(!contains_ignore_ascii_case("AM", "AMD"));
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#a6e3a1"), Some((166, 227, 161)));
        assert_eq!(parse_hex_color("#FFFFFF"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("a6e3a1"), None);
        assert_eq!(parse_hex_color("#a6e3a"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }
}
