//! Fixed-decimal formatting for panel text.
//!
//! Panel strings are rendered in the browser too, where float-to-decimal
//! `format!` has panicked on some wasm toolchains. These helpers round into an
//! integer and format that instead.

/// `value` with exactly `decimals` digits after the point (at most 9).
pub fn fixed(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value.is_sign_positive() {
            "Inf".to_string()
        } else {
            "-Inf".to_string()
        };
    }

    let decimals = decimals.min(9);
    let scale = 10_i64.pow(decimals as u32);
    let scaled = (value * scale as f64).round();
    if scaled.abs() >= i64::MAX as f64 {
        return if value.is_sign_negative() {
            "-Inf".to_string()
        } else {
            "Inf".to_string()
        };
    }

    let scaled = scaled as i64;
    let abs = scaled.unsigned_abs();
    let scale = scale as u64;

    let mut out = String::new();
    if scaled < 0 {
        out.push('-');
    }
    out.push_str(&(abs / scale).to_string());
    if decimals > 0 {
        let frac = (abs % scale).to_string();
        out.push('.');
        for _ in frac.len()..decimals {
            out.push('0');
        }
        out.push_str(&frac);
    }
    out
}

/// Two decimals, the precision every estimate is shown with.
pub fn fixed2(value: f64) -> String {
    fixed(value, 2)
}
