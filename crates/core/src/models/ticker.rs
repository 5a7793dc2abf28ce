use crate::errors::CoreError;

/// Longest accepted ticker symbol.
pub const MAX_TICKER_LEN: usize = 5;

/// Trim and uppercase `input`, then require 1-5 ASCII letters.
///
/// Runs before any request is issued; a rejected ticker never reaches
/// the analysis service.
pub fn normalize_ticker(input: &str) -> Result<String, CoreError> {
    let ticker = input.trim().to_uppercase();
    let valid = (1..=MAX_TICKER_LEN).contains(&ticker.len())
        && ticker.chars().all(|c| c.is_ascii_uppercase());
    if valid {
        Ok(ticker)
    } else {
        Err(CoreError::InvalidTicker(input.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_uppercases() {
        assert_eq!(normalize_ticker(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_ticker("F").unwrap(), "F");
        assert_eq!(normalize_ticker("GOOGL").unwrap(), "GOOGL");
    }

    #[test]
    fn rejects_bad_shapes() {
        for bad in ["", "   ", "TOOLONG", "BRK.B", "123", "A1", "ÄPFEL"] {
            assert!(
                matches!(normalize_ticker(bad), Err(CoreError::InvalidTicker(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
