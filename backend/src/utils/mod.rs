//! # Utilities Module
//!
//! Helpers shared across the backend: SOL/lamport conversion and log
//! formatting.

use solana_sdk::native_token::LAMPORTS_PER_SOL;

/// Number of decimal places of one SOL.
const SOL_DECIMALS: usize = 9;

/// Format lamports as human-readable SOL.
///
/// Exact: integer arithmetic only, trailing zeros trimmed to at least two
/// decimals.
///
/// ## Examples
///
/// ```rust,ignore
/// assert_eq!(format_sol(1_000_000_000), "1.00 SOL");
/// assert_eq!(format_sol(1_234_500_000_000), "1,234.50 SOL");
/// assert_eq!(format_sol(890_880), "0.00089088 SOL");
/// ```
pub fn format_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let frac = lamports % LAMPORTS_PER_SOL;

    let mut frac_str = format!("{:0width$}", frac, width = SOL_DECIMALS);
    while frac_str.len() > 2 && frac_str.ends_with('0') {
        frac_str.pop();
    }

    // Add commas
    let whole_str = whole.to_string();
    let mut result = String::new();
    for (i, c) in whole_str.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    let whole_with_commas: String = result.chars().rev().collect();

    format!("{}.{} SOL", whole_with_commas, frac_str)
}

/// Parse a SOL amount string to lamports.
///
/// Accepts `"1.5"`, `"1,000"`, `"0.000000001 SOL"`. More than nine decimal
/// places cannot be represented in lamports and is rejected.
///
/// ## Examples
///
/// ```rust,ignore
/// assert_eq!(parse_sol("1.5")?, 1_500_000_000);
/// assert_eq!(parse_sol("0.000000001")?, 1);
/// ```
pub fn parse_sol(amount_str: &str) -> Result<u64, String> {
    let cleaned = amount_str.trim().trim_end_matches("SOL").trim().replace(',', "");

    if cleaned.is_empty() {
        return Err(format!("Invalid amount: {}", amount_str));
    }
    if cleaned.starts_with('-') {
        return Err("Amount cannot be negative".to_string());
    }

    let (whole_str, frac_str) = match cleaned.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (cleaned.as_str(), ""),
    };

    if frac_str.len() > SOL_DECIMALS {
        return Err(format!("Too many decimal places: {}", amount_str));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole_str) || !all_digits(frac_str) || (whole_str.is_empty() && frac_str.is_empty()) {
        return Err(format!("Invalid amount: {}", amount_str));
    }

    let whole: u64 = if whole_str.is_empty() {
        0
    } else {
        whole_str
            .parse()
            .map_err(|_| format!("Invalid amount: {}", amount_str))?
    };
    let frac: u64 = if frac_str.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac_str, width = SOL_DECIMALS)
            .parse()
            .map_err(|_| format!("Invalid amount: {}", amount_str))?
    };

    whole
        .checked_mul(LAMPORTS_PER_SOL)
        .and_then(|lamports| lamports.checked_add(frac))
        .ok_or_else(|| format!("Amount too large: {}", amount_str))
}

/// Truncate a string to a maximum length.
///
/// Useful for logging long public keys and signatures.
/// Counts characters, so multi-byte input is never split.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let len = s.chars().count();
    if len <= max_len {
        return s.to_string();
    }

    let half = max_len.saturating_sub(3) / 2;
    let head: String = s.chars().take(half).collect();
    let tail: String = s.chars().skip(len - half).collect();
    format!("{}...{}", head, tail)
}
