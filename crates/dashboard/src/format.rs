//! Text formatting for the stat regions.

/// Format a monetary amount as `$` followed by exactly two decimals.
///
/// `100.0` renders as `$100.00`, `543.2` as `$543.20`. Halfway cases that are
/// exact in binary (`0.125`, `2.375`, ...) round away from zero.
pub fn format_currency(amount: f64) -> String {
    format!("${}", fixed_2(amount))
}

/// Format a count the way a browser prints a JSON number: `120.0` as `120`,
/// `2.5` as `2.5`, very large or very small magnitudes in exponent form.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let text = format!("{value:e}");
        return match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        };
    }
    value.to_string()
}

fn fixed_2(amount: f64) -> String {
    // -0.0 prints as "0.00".
    let amount = if amount == 0.0 { 0.0 } else { amount };

    let scaled = amount * 100.0;
    // The std formatter rounds exact ties to even; push them away from zero instead.
    if scaled.fract().abs() == 0.5 && (amount * 8.0).fract() == 0.0 {
        return format!("{:.2}", scaled.round() / 100.0);
    }
    format!("{:.2}", amount)
}
