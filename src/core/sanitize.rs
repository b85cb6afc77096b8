use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a number: {raw:?}")]
pub struct ParseError {
    pub raw: String,
}

/// Parses a currency-formatted amount such as `" $1,234.50 "`.
///
/// `$` and `,` are removed anywhere in the token and surrounding whitespace is
/// trimmed. Anything else that is not a finite decimal is a [`ParseError`];
/// callers decide whether that means "skip the row" or "try the next fallback".
pub fn parse_amount(raw: &str) -> Result<f64, ParseError> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError {
            raw: raw.to_string(),
        })
}
