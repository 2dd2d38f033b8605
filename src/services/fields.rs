//! Tolerant parsers for the numeric text fragments on brewery pages.
//!
//! The site renders numbers inside decorated text (`(4.12)`, `1,234 Ratings`,
//! `5.5% ABV`) and substitutes `N/A` when a value is missing. Optional fields
//! come back as `None` for placeholders and unparseable text alike. Counts
//! that must always be present return an error instead.

use crate::error::{AppError, Result};

/// The site's stand-in for a missing value.
pub const PLACEHOLDER: &str = "N/A";

fn decimal(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn strip_parens(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '(' || c == ')').trim()
}

fn first_token(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or("")
}

fn is_placeholder(s: &str) -> bool {
    s.is_empty() || s.eq_ignore_ascii_case(PLACEHOLDER)
}

/// Parse the aggregate rating fragment, e.g. `(4.12)`.
///
/// `(N/A)` and empty text are `Ok(None)`; any other non-number is an error.
pub fn aggregate_rating(text: &str) -> Result<Option<f64>> {
    let inner = strip_parens(text);
    if is_placeholder(inner) {
        return Ok(None);
    }
    decimal(inner)
        .map(Some)
        .ok_or_else(|| AppError::numeric("rating", text.trim()))
}

/// Parse a `<integer-with-commas> <label>` fragment, e.g. ` 1,234 Ratings `.
pub fn count(field: &str, text: &str) -> Result<u64> {
    first_token(text)
        .replace(',', "")
        .parse::<u64>()
        .map_err(|_| AppError::numeric(field, text.trim()))
}

/// ABV from ` 5.5% ABV `; `None` for ` N/A ABV ` or anything unparseable.
pub fn abv(text: &str) -> Option<f64> {
    text.trim().split('%').next().and_then(decimal)
}

/// IBU from ` 45 IBU `; `None` for ` N/A IBU `.
pub fn ibu(text: &str) -> Option<f64> {
    decimal(first_token(text))
}

/// Beer rating from `(3.87)`; `None` for `(N/A)`.
pub fn rating(text: &str) -> Option<f64> {
    decimal(strip_parens(text))
}

/// Beer rater count from ` 1,234 Ratings `; `None` for ` N/A Ratings `.
pub fn raters(text: &str) -> Option<u64> {
    count("raters", text).ok()
}
