//! Currency formatting.

/// Currency used when neither the payload nor the configuration names one.
pub const DEFAULT_CURRENCY: &str = "BHD";

/// Number of minor-unit digits for an ISO 4217 code.
#[must_use]
pub fn minor_units(currency: &str) -> usize {
    match currency.to_ascii_uppercase().as_str() {
        "BHD" | "KWD" | "OMR" | "JOD" | "IQD" | "LYD" | "TND" => 3,
        "JPY" | "KRW" | "VND" | "CLP" | "ISK" => 0,
        _ => 2,
    }
}

/// `BHD 1,234.500`; negative amounts render as `-BHD 12.000`.
///
/// Non-finite values render as zero.
#[must_use]
pub fn format_money(amount: f64, currency: &str) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let digits = minor_units(currency);
    let fixed = format!("{:.*}", digits, amount.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + currency.len() + 4);
    // "-0.000" would be odd; only show the sign when something survives rounding.
    if amount < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    out.push_str(currency);
    out.push(' ');
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Short form for tight spaces: `BHD 950`, `BHD 1.2K`, `BHD 3.4M`.
#[must_use]
pub fn format_compact(amount: f64, currency: &str) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let sign = if amount < 0.0 { "-" } else { "" };
    let abs = amount.abs();
    // Pick the unit after rounding so 999,950 reads 1M rather than 1000K.
    let body = if abs.round() < 1_000.0 {
        format!("{abs:.0}")
    } else if (abs / 100.0).round() < 10_000.0 {
        format!("{:.1}K", abs / 1_000.0)
    } else {
        format!("{:.1}M", abs / 1_000_000.0)
    };
    format!("{sign}{currency} {}", body.replace(".0K", "K").replace(".0M", "M"))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dinar_uses_three_decimals() {
        assert_eq!(format_money(1234.5, "BHD"), "BHD 1,234.500");
        assert_eq!(format_money(0.0, "BHD"), "BHD 0.000");
    }

    #[test]
    fn other_currencies() {
        assert_eq!(format_money(1_000_000.0, "USD"), "USD 1,000,000.00");
        assert_eq!(format_money(1500.0, "JPY"), "JPY 1,500");
        assert_eq!(format_money(12.346, "EUR"), "EUR 12.35");
    }

    #[test]
    fn negatives_and_non_finite() {
        assert_eq!(format_money(-12.0, "BHD"), "-BHD 12.000");
        assert_eq!(format_money(-0.0001, "BHD"), "BHD 0.000");
        assert_eq!(format_money(f64::NAN, "BHD"), "BHD 0.000");
    }

    #[test]
    fn compact() {
        assert_eq!(format_compact(950.0, "BHD"), "BHD 950");
        assert_eq!(format_compact(1_240.0, "BHD"), "BHD 1.2K");
        assert_eq!(format_compact(2_000.0, "BHD"), "BHD 2K");
        assert_eq!(format_compact(-3_400_000.0, "USD"), "-USD 3.4M");
    }

    #[test]
    fn compact_rolls_over_to_the_next_unit() {
        assert_eq!(format_compact(999.6, "BHD"), "BHD 1K");
        assert_eq!(format_compact(999_950.0, "BHD"), "BHD 1M");
        assert_eq!(format_compact(999_940.0, "BHD"), "BHD 999.9K");
    }
}
