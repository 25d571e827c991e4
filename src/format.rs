//! fr-FR display formatting for amounts. Display only: records keep full precision.

/// Grouping separator used by fr-FR (narrow no-break space).
const GROUP_SEP: char = '\u{202f}';
/// Space between amount and currency symbol (no-break space).
const SYMBOL_SEP: char = '\u{a0}';

/// `1234567.8, "EUR"` → `"1 234 568 €"`. Non-finite input formats as zero.
pub fn format_currency(amount: f64, currency: &str) -> String {
    let rounded = if amount.is_finite() { amount.round() } else { 0.0 };
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    format!("{sign}{}{SYMBOL_SEP}{}", group_thousands(&digits), currency_symbol(currency))
}

/// fr-FR number with at most three fraction digits: `1234.5` → `"1 234,5"`.
pub fn format_number(n: f64) -> String {
    let n = if n.is_finite() { n } else { 0.0 };
    let fixed = format!("{:.3}", n.abs());
    let (int, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac.trim_end_matches('0');
    let is_zero = int == "0" && frac.is_empty();
    let sign = if n < 0.0 && !is_zero { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{}", group_thousands(int))
    } else {
        format!("{sign}{},{frac}", group_thousands(int))
    }
}

pub fn currency_symbol(code: &str) -> String {
    match code.to_ascii_uppercase().as_str() {
        "EUR" => "€".to_string(),
        "USD" => "$US".to_string(),
        "GBP" => "£GB".to_string(),
        "CAD" => "$CA".to_string(),
        "AUD" => "$AU".to_string(),
        other => other.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * GROUP_SEP.len_utf8());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEP);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_rounds_and_groups() {
        assert_eq!(format_currency(1_110_000.0, "EUR"), "1\u{202f}110\u{202f}000\u{a0}€");
        assert_eq!(format_currency(999.5, "EUR"), "1\u{202f}000\u{a0}€");
        assert_eq!(format_currency(420_000.0, "usd"), "420\u{202f}000\u{a0}$US");
        assert_eq!(format_currency(12.0, "CHF"), "12\u{a0}CHF");
        assert_eq!(format_currency(-2_500.4, "EUR"), "-2\u{202f}500\u{a0}€");
    }

    #[test]
    fn non_finite_formats_as_zero() {
        assert_eq!(format_currency(f64::NAN, "EUR"), "0\u{a0}€");
        assert_eq!(format_number(f64::INFINITY), "0");
    }

    #[test]
    fn numbers_keep_up_to_three_decimals() {
        assert_eq!(format_number(1234.5), "1\u{202f}234,5");
        assert_eq!(format_number(0.12345), "0,123");
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(-0.0001), "0");
        assert_eq!(format_number(-1500.25), "-1\u{202f}500,25");
    }
}
