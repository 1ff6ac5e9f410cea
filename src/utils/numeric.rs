use regex::Regex;
use std::sync::LazyLock;

/// 非数值字符匹配（保留数字、小数点和负号）
pub static NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\d.\-]").unwrap());

/// 整数显示的上限，超过后按浮点格式输出
const MAX_INTEGRAL_DISPLAY: f64 = 1e15;

/// Parses a trimmed cell text as a finite number.
///
/// `"inf"` and `"NaN"` are rejected even though `f64::from_str` accepts them.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Drops currency symbols, thousands separators, percent signs and the like.
pub fn strip_non_numeric(text: &str) -> String {
    NON_NUMERIC.replace_all(text, "").into_owned()
}

/// Strips then parses; broker exports write `"$1,234.50"` or `"+2.5%"`.
pub fn coerce_number(text: &str) -> Option<f64> {
    parse_number(&strip_non_numeric(text))
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < MAX_INTEGRAL_DISPLAY {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
