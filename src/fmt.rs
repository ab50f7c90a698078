/// Group the integer digits of a non-negative whole number with `sep`.
fn group_thousands(int_part: &str, sep: char) -> String {
    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(sep);
        }
        grouped.push(c);
    }
    grouped.chars().rev().collect()
}

/// Format a peso amount the way es-AR does with no decimals: `$ 1.234.567`
pub fn ars(val: f64) -> String {
    let rounded = val.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let grouped = group_thousands(&digits, '.');
    if negative {
        format!("-$ {grouped}")
    } else {
        format!("$ {grouped}")
    }
}

/// Format a dollar amount with two fixed decimals: `U$S 1250.50`
pub fn usd(val: f64) -> String {
    if val < 0.0 {
        format!("-U$S {:.2}", val.abs())
    } else {
        format!("U$S {:.2}", val)
    }
}

/// Format a file size: `1.2 MB`
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ars_formatting() {
        assert_eq!(ars(1234.56), "$ 1.235");
        assert_eq!(ars(-500.0), "-$ 500");
        assert_eq!(ars(0.0), "$ 0");
        assert_eq!(ars(1000000.4), "$ 1.000.000");
        assert_eq!(ars(100000.0), "$ 100.000");
    }

    #[test]
    fn test_ars_small_negative_rounds_to_zero() {
        assert_eq!(ars(-0.4), "$ 0");
    }

    #[test]
    fn test_usd_formatting() {
        assert_eq!(usd(100.0), "U$S 100.00");
        assert_eq!(usd(1250.5), "U$S 1250.50");
        assert_eq!(usd(-3.456), "-U$S 3.46");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
