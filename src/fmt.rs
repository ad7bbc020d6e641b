use rust_decimal::Decimal;

/// Format a decimal as a dollar amount with thousands separators: $1,234.56
pub fn money(val: Decimal) -> String {
    let negative = val.is_sign_negative() && !val.is_zero();
    let abs = val.abs().round_dp(2);
    let text = abs.to_string();
    let (int_part, dec_part) = match text.split_once('.') {
        Some((int_part, dec_part)) => (int_part.to_string(), format!("{dec_part:0<2}")),
        None => (text, "00".to_string()),
    };

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Render a split as whole-ish percentages: 0.7/0.3 -> "70/30".
pub fn percent_pair(percent_a: Decimal, percent_b: Decimal) -> String {
    let a = (percent_a * Decimal::ONE_HUNDRED).normalize();
    let b = (percent_b * Decimal::ONE_HUNDRED).normalize();
    format!("{a}/{b}")
}

/// Format a byte count with a binary unit ladder: 2048 -> "2.0 KB"
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
