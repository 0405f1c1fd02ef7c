//! Launch options read from the host environment

/// `seed` from a URL query string such as `?seed=42&debug`
pub fn seed_from_query(query: &str) -> Option<u32> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "seed")
        .and_then(|(_, value)| parse_seed(value))
}

/// Decimal or `0x` hex seed
pub fn parse_seed(text: &str) -> Option<u32> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_from_query() {
        assert_eq!(seed_from_query("?seed=42"), Some(42));
        assert_eq!(seed_from_query("?debug=1&seed=0x2A"), Some(42));
        assert_eq!(seed_from_query("?seed=banana"), None);
        assert_eq!(seed_from_query(""), None);
        assert_eq!(seed_from_query("?seeds=4"), None);
    }

    #[test]
    fn test_parse_seed_bounds() {
        assert_eq!(parse_seed("4294967295"), Some(u32::MAX));
        assert_eq!(parse_seed("4294967296"), None);
        assert_eq!(parse_seed(" 7 "), Some(7));
    }
}
