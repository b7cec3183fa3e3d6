/// Format a statistic for display
///
/// Energies of 1000 or more are shortened to one decimal with a `k` suffix.
/// Everything else gets thousands separators on the integer part and keeps
/// its shortest decimal representation.
pub fn format_number(value: f64, is_energy: bool) -> String {
    if is_energy && value >= 1000.0 {
        return format!("{:.1}k", value / 1000.0);
    }

    let text = value.to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Round to `decimals` places then format, the way stats are shown
pub fn format_fixed(value: f64, decimals: usize, is_energy: bool) -> String {
    let rounded: f64 = format!("{:.*}", decimals, value).parse().unwrap_or(value);
    format_number(rounded, is_energy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separators() {
        assert_eq!(format_number(0.0, false), "0");
        assert_eq!(format_number(999.0, false), "999");
        assert_eq!(format_number(1000.0, false), "1,000");
        assert_eq!(format_number(1234567.0, false), "1,234,567");
        assert_eq!(format_number(-1234.5, false), "-1,234.5");
    }

    #[test]
    fn test_keeps_fraction_digits() {
        assert_eq!(format_number(12.25, false), "12.25");
        assert_eq!(format_number(1234.5678, false), "1,234.5678");
    }

    #[test]
    fn test_energy_shortening() {
        assert_eq!(format_number(999.99, true), "999.99");
        assert_eq!(format_number(1000.0, true), "1.0k");
        assert_eq!(format_number(15_432.0, true), "15.4k");
    }

    #[test]
    fn test_format_fixed_drops_trailing_zeros() {
        assert_eq!(format_fixed(3.10, 2, true), "3.1");
        assert_eq!(format_fixed(0.004, 2, true), "0");
        assert_eq!(format_fixed(2048.456, 2, false), "2,048.46");
    }
}
