//! Repeatable flags that also accept comma-separated values

/// Flatten values from `ArgAction::Append` flags, splitting on commas.
///
/// Items are trimmed and empty items dropped.
///
/// ```
/// use srctidy::cli::enhanced_parser::parse_comma_separated;
///
/// // --ignore-dir target --ignore-dir dist
/// let result = parse_comma_separated(vec!["target".to_string(), "dist".to_string()]);
/// assert_eq!(result, vec!["target", "dist"]);
///
/// // --ignore-dir "target, dist"
/// let result = parse_comma_separated(vec!["target, dist".to_string()]);
/// assert_eq!(result, vec!["target", "dist"]);
/// ```
pub fn parse_comma_separated(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .flat_map(|item| {
            item.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<String>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_formats() {
        let input = vec!["obj,bin".to_string(), "logs".to_string()];
        assert_eq!(parse_comma_separated(input), vec!["obj", "bin", "logs"]);
    }

    #[test]
    fn test_whitespace_and_empty_items() {
        let input = vec![" .git , ,  target ".to_string(), ",".to_string()];
        assert_eq!(parse_comma_separated(input), vec![".git", "target"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_comma_separated(Vec::new()).is_empty());
    }
}
