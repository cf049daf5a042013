//! Brazilian number formatting used on proposal documents: `.` groups
//! thousands, `,` separates decimals and currency carries an `R$ ` prefix.

const CURRENCY_SYMBOL: &str = "R$";
const MAX_PLACES: usize = 15;
// Largest magnitude an f64 holds with integer precision (2^53).
const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

pub fn format_currency(value: f64) -> String {
    let (negative, digits) = grouped(value, 2);
    if negative {
        format!("-{CURRENCY_SYMBOL} {digits}")
    } else {
        format!("{CURRENCY_SYMBOL} {digits}")
    }
}

pub fn format_decimal(value: f64, places: usize) -> String {
    let (negative, digits) = grouped(value, places);
    if negative { format!("-{digits}") } else { digits }
}

pub fn format_percentage(value: f64) -> String {
    format!("{}%", format_decimal(value, 2))
}

pub fn format_kwh(value: f64) -> String {
    format!("{} kWh", format_decimal(value, 2))
}

/// Returns the sign and the grouped magnitude separately so that values that
/// round to zero never print as `-0,00`.
fn grouped(value: f64, places: usize) -> (bool, String) {
    if !value.is_finite() {
        return (false, value.to_string());
    }

    let places = places.min(MAX_PLACES);
    let scale = 10f64.powi(places as i32);
    // f64::round rounds half away from zero.
    let scaled = (value.abs() * scale).round();
    if !scaled.is_finite() || scaled >= MAX_EXACT {
        return (value < 0.0, format!("{:e}", value.abs()));
    }
    let negative = value < 0.0 && scaled > 0.0;

    let fixed = format!("{:.*}", places, scaled / scale);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3);
    let len = int_part.len();
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if let Some(frac_part) = frac_part {
        out.push(',');
        out.push_str(frac_part);
    }
    (negative, out)
}
