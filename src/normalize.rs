//! Text normalization pipeline
//!
//! Produces the canonical form of a text file: LF line endings, no trailing
//! space or tab on any line, no leading or trailing blank lines and exactly
//! one final newline. The canonical form is always encoded as UTF-8.

/// How carriage returns are collapsed into line feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEndingStyle {
    /// Remove every `\r`
    #[default]
    StripCarriageReturns,
    /// Turn `\r\n` and lone `\r` into `\n`
    TranslateCarriageReturns,
}

impl LineEndingStyle {
    fn apply(&self, text: &str) -> String {
        match self {
            LineEndingStyle::StripCarriageReturns => text.replace('\r', ""),
            LineEndingStyle::TranslateCarriageReturns => text.replace("\r\n", "\n").replace('\r', "\n"),
        }
    }
}

/// Canonicalizes decoded text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Normalizer {
    line_endings: LineEndingStyle,
}

impl Normalizer {
    pub fn new(line_endings: LineEndingStyle) -> Self {
        Self { line_endings }
    }

    pub fn line_endings(&self) -> LineEndingStyle {
        self.line_endings
    }

    /// Canonical form of `text`.
    ///
    /// Blank lines at either end are trimmed after trailing whitespace is
    /// removed, so whitespace-only edge lines disappear in a single pass and
    /// the result is a fixed point.
    pub fn normalize(&self, text: &str) -> String {
        let text = self.line_endings.apply(text);

        let stripped = text
            .split('\n')
            .map(|line| line.trim_end_matches([' ', '\t']))
            .collect::<Vec<_>>()
            .join("\n");

        let mut canonical = stripped.trim_matches('\n').to_string();
        canonical.push('\n');
        canonical
    }

    /// Canonical form encoded as UTF-8 bytes
    pub fn normalize_to_bytes(&self, text: &str) -> Vec<u8> {
        self.normalize(text).into_bytes()
    }

    /// Normalize `text` and compare against the file's original bytes
    pub fn diff(&self, original: &[u8], text: &str) -> Diff {
        Diff::between(original, self.normalize_to_bytes(text))
    }
}

/// Byte-level comparison between a file and its canonical replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diff {
    Identical,
    Different(Vec<u8>),
}

impl Diff {
    /// Any byte difference counts, including a pure re-encoding
    pub fn between(original: &[u8], replacement: Vec<u8>) -> Self {
        if original == replacement.as_slice() {
            Diff::Identical
        } else {
            Diff::Different(replacement)
        }
    }

    pub fn is_different(&self) -> bool {
        matches!(self, Diff::Different(_))
    }
}

/// Canonical form using the default line ending style
pub fn normalize(text: &str) -> String {
    Normalizer::default().normalize(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_trailing_whitespace_and_crlf() {
        assert_eq!(normalize("line1 \t\nline2\r\n\r\n"), "line1\nline2\n");
    }

    #[test]
    fn test_leading_and_trailing_blank_lines() {
        assert_eq!(normalize("\n\n\nhello\n\n"), "hello\n");
    }

    #[test]
    fn test_inner_and_leading_whitespace_preserved() {
        assert_eq!(normalize("\tfn main() {\n    let  x = 1;  \n}"), "\tfn main() {\n    let  x = 1;\n}\n");
    }

    #[test]
    fn test_inner_blank_lines_preserved() {
        assert_eq!(normalize("a\n\n\nb\n"), "a\n\n\nb\n");
    }

    #[test]
    fn test_whitespace_only_edge_lines() {
        assert_eq!(normalize("  \n\ta\n \t"), "\ta\n");
        assert_eq!(normalize(" \t \n"), "\n");
        assert_eq!(normalize(""), "\n");
    }

    #[test]
    fn test_lone_carriage_return_styles() {
        let strip = Normalizer::new(LineEndingStyle::StripCarriageReturns);
        let translate = Normalizer::new(LineEndingStyle::TranslateCarriageReturns);

        assert_eq!(strip.normalize("a\rb\r\n"), "ab\n");
        assert_eq!(translate.normalize("a\rb\r\n"), "a\nb\n");

        // Same result for well-formed CRLF text
        assert_eq!(strip.normalize("a\r\nb\r\n"), translate.normalize("a\r\nb\r\n"));
    }

    #[test]
    fn test_diff_detects_encoding_only_change() {
        let normalizer = Normalizer::default();
        let original = [0xEF, 0xBB, 0xBF, b'x', b'\n'];
        assert_eq!(normalizer.diff(&original, "x\n"), Diff::Different(b"x\n".to_vec()));
        assert_eq!(normalizer.diff(b"x\n", "x\n"), Diff::Identical);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(text in "[ a-z\t\r\n]{0,64}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_translate_style_is_idempotent(text in "[ a-z\t\r\n]{0,64}") {
            let normalizer = Normalizer::new(LineEndingStyle::TranslateCarriageReturns);
            let once = normalizer.normalize(&text);
            prop_assert_eq!(normalizer.normalize(&once), once);
        }

        #[test]
        fn prop_single_final_newline_and_no_trailing_blanks(text in "\\PC{0,64}") {
            let canonical = normalize(&text);
            prop_assert!(canonical.ends_with('\n'));
            prop_assert!(canonical == "\n" || !canonical.ends_with("\n\n"));
            for line in canonical.split('\n') {
                prop_assert!(!line.ends_with(' ') && !line.ends_with('\t'));
            }
        }

        #[test]
        fn prop_canonical_output_has_no_diff(text in "[ a-z\t\r\n]{0,64}") {
            let normalizer = Normalizer::default();
            let canonical = normalizer.normalize_to_bytes(&text);
            let as_text = String::from_utf8(canonical.clone()).unwrap();
            prop_assert_eq!(normalizer.diff(&canonical, &as_text), Diff::Identical);
        }
    }
}
