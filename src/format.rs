use rust_decimal::{Decimal, RoundingStrategy};

/// Currency rendered with a bare symbol instead of its code.
const SYMBOL_CURRENCY: &str = "USD";

/// Decimal places shown in a price suffix.
const SUFFIX_DECIMALS: u32 = 2;

fn group_int_digits(int_part: &str) -> String {
    // Insert commas every 3 digits, preserving any leading zeros.
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        out.push(ch);
        let remaining = len.saturating_sub(i + 1);
        if remaining > 0 && remaining % 3 == 0 {
            out.push(',');
        }
    }
    out
}

/// Split a plain decimal string and pad or cut its fraction to exactly `dp` digits.
fn pad_fraction_to_dp(s: &str, dp: u32) -> (&str, String) {
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));

    let mut frac: String = frac_part.chars().take(dp as usize).collect();
    while frac.len() < dp as usize {
        frac.push('0');
    }

    (int_part, frac)
}

/// Format an amount for display: rounded half away from zero to `dp` places,
/// padded to exactly `dp` decimals, with `,` between thousands and `symbol`
/// after any minus sign.
pub fn format_amount(value: Decimal, dp: u32, symbol: &str) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = rounded.abs().normalize().to_string();
    let (int_part, frac) = pad_fraction_to_dp(&plain, dp);

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(symbol);
    out.push_str(&group_int_digits(int_part));
    if !frac.is_empty() {
        out.push('.');
        out.push_str(&frac);
    }
    out
}

/// Prefix for a currency: `$` for USD, otherwise the uppercased code and a space.
pub fn currency_symbol(currency: &str) -> String {
    let code = currency.trim().to_uppercase();
    if code == SYMBOL_CURRENCY {
        "$".to_string()
    } else {
        format!("{code} ")
    }
}

/// Render a price suffix such as `(BTC: $65,000.40)`.
pub fn format_suffix(amount: Decimal, currency: &str, label: &str) -> String {
    let symbol = currency_symbol(currency);
    let rendered = format_amount(amount, SUFFIX_DECIMALS, &symbol);
    format!("({label}: {rendered})")
}
