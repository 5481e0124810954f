//! Pay-scale extraction from free-text continuation lines.
//!
//! Pay bills describe the scale as prose, e.g.
//! `PAY SCALE : LEVEL-13A (131100-216600)`. Only the first
//! `<digits> - <digits>` pair is taken; anything else yields no bounds.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)\s*-\s*([0-9]+)").unwrap());

/// Extract `(min, max)` from a pay-scale description.
///
/// Never fails: absent text, no range, or digits too large for `i64` all
/// degrade to `(None, None)`.
pub fn parse_pay_scale(text: Option<&str>) -> (Option<i64>, Option<i64>) {
    let Some(text) = text else {
        return (None, None);
    };
    let Some(caps) = RE_RANGE.captures(text) else {
        return (None, None);
    };
    match (caps[1].parse::<i64>(), caps[2].parse::<i64>()) {
        (Ok(min), Ok(max)) => (Some(min), Some(max)),
        _ => (None, None),
    }
}
