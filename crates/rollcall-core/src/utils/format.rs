/// Format an amount with space-separated thousands: `30000.0` -> `"30 000"`.
/// Fractions are rounded to two places and dropped when zero.
pub fn format_amount(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    if fraction == 0 {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{:02}", sign, grouped, fraction)
    }
}

/// Amount followed by the currency label: `"30 000 Ft"`
pub fn format_money(amount: f64, currency: &str) -> String {
    if currency.is_empty() {
        format_amount(amount)
    } else {
        format!("{} {}", format_amount(amount), currency)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(30000.0), "30 000");
        assert_eq!(format_amount(1234567.0), "1 234 567");
        assert_eq!(format_amount(3333.333), "3 333.33");
        assert_eq!(format_amount(-1500.5), "-1 500.50");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(7500.0, "Ft"), "7 500 Ft");
        assert_eq!(format_money(7500.0, ""), "7 500");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Földváry Annamária", 8), "Földv...");
    }
}
