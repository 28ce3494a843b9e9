//! Ticker list parsing.

/// Parse a ticker list: symbols separated by commas, newlines, or other
/// whitespace. Blank entries are dropped and symbols are uppercased; order
/// is preserved.
pub fn parse_tickers(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_uppercase)
        .collect()
}
