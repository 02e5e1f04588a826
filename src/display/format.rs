//! Compact one-line formatting

/// Types that render as a single console line
pub trait CompactFormat {
    /// One line, no trailing newline
    fn to_compact_format(&self) -> String;
}
