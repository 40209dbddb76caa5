/// Parse a decimal price string ("1250", "1250.5", "1250.50") into cents.
/// Returns `None` for anything that isn't a plain non-negative decimal.
pub fn parse_price_cents(price: &str) -> Option<i64> {
    let price = price.trim();
    let (whole, fraction) = match price.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (price, ""),
    };

    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = whole.parse().ok()?;
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    whole.checked_mul(100)?.checked_add(fraction)
}

/// Check that a price string is a number the API will accept.
pub fn is_valid_price(price: &str) -> bool {
    parse_price_cents(price).is_some()
}

/// Format cents as rubles with grouped thousands, e.g. "10 400 ₽" or "99,90 ₽".
pub fn format_rubles(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    if fraction == 0 {
        format!("{}{} ₽", sign, grouped)
    } else {
        format!("{}{},{:02} ₽", sign, grouped, fraction)
    }
}

/// Format a price string from the API, falling back to the raw text.
pub fn format_price(price: &str) -> String {
    match parse_price_cents(price) {
        Some(cents) => format_rubles(cents),
        None => price.to_string(),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
