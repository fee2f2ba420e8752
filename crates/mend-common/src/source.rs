use miette::{NamedSource, SourceSpan};

/// Split template text into lines.
///
/// Lines break on `\n`; one trailing `\r` per line is dropped. A trailing
/// newline yields a final empty line, so the line count is always the number
/// of `\n` plus one. Everything that indexes diagnostics into a source must go
/// through this function.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Number of decimal digits needed to print `n`.
pub fn count_digits(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// Byte index of `column` in `line`, clamped to the line and moved back to
/// the start of the character it falls inside. Unknown columns map to 0.
pub fn clamp_column(line: &str, column: i64) -> usize {
    let mut col = usize::try_from(column).unwrap_or(0).min(line.len());
    while !line.is_char_boundary(col) {
        col -= 1;
    }
    col
}

/// A named template source with its contents.
#[derive(Debug, Clone)]
pub struct SourceText {
    pub name: String,
    pub content: String,
    line_starts: Vec<usize>,
}

impl SourceText {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self {
            name: name.into(),
            content,
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Width of the line-number gutter when printing this source.
    pub fn gutter_width(&self) -> usize {
        count_digits(self.line_count())
    }

    pub fn lines(&self) -> Vec<&str> {
        split_lines(&self.content)
    }

    /// Get the content of a specific line (0-indexed). Negative or
    /// out-of-range lines yield `None`.
    pub fn line(&self, line: i64) -> Option<&str> {
        let idx = usize::try_from(line).ok()?;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&next| next - 1)
            .unwrap_or(self.content.len());
        let text = &self.content[start..end];
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    /// Byte offset of a (line, column) position, clamped to the line and to a
    /// character boundary.
    pub fn offset(&self, line: i64, column: i64) -> Option<usize> {
        let text = self.line(line)?;
        let start = self.line_starts[line as usize];
        Some(start + clamp_column(text, column))
    }

    /// Span covering a diagnostic position: one character when the column is
    /// known, the whole line otherwise.
    pub fn span(&self, line: i64, column: i64) -> Option<SourceSpan> {
        let text = self.line(line)?;
        let line_start = self.line_starts[line as usize];
        if column < 0 {
            return Some(SourceSpan::new(line_start.into(), text.len()));
        }
        let start = self.offset(line, column)?;
        let len = self.content[start..line_start + text.len()]
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(0);
        Some(SourceSpan::new(start.into(), len))
    }

    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_keeps_trailing_empty_line() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b", ""]);
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn test_split_lines_drops_carriage_return() {
        assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
    }

    #[test]
    fn test_line_lookup_matches_split() {
        let source = SourceText::new("t", "first\r\nsecond\n\nlast");
        let split = split_lines(&source.content);
        assert_eq!(source.line_count(), split.len());
        for (idx, expected) in split.iter().enumerate() {
            assert_eq!(source.line(idx as i64), Some(*expected));
        }
        assert_eq!(source.line(-1), None);
        assert_eq!(source.line(4), None);
    }

    #[test]
    fn test_span_for_known_and_unknown_column() {
        let source = SourceText::new("t", "abc\n{{foo}}\n");
        let span = source.span(1, 2).unwrap();
        assert_eq!(span.offset(), 6);
        assert_eq!(span.len(), 1);

        let whole = source.span(1, -1).unwrap();
        assert_eq!(whole.offset(), 4);
        assert_eq!(whole.len(), 7);
    }

    #[test]
    fn test_offset_clamps_to_line_end() {
        let source = SourceText::new("t", "ab\ncd");
        assert_eq!(source.offset(0, 10), Some(2));
    }

    #[test]
    fn test_column_inside_multibyte_char_moves_back() {
        let source = SourceText::new("t", "é{{.X}}");
        assert_eq!(source.offset(0, 1), Some(0));

        let span = source.span(0, 1).unwrap();
        assert_eq!(span.offset(), 0);
        assert_eq!(span.len(), 'é'.len_utf8());
    }

    #[test]
    fn test_huge_column_clamps_to_line_end() {
        let source = SourceText::new("t", "ab\ncd");
        assert_eq!(source.offset(1, 99_999_999_999_999_999), Some(5));
        assert_eq!(source.span(1, 99_999_999_999_999_999).unwrap().len(), 0);
    }

    #[test]
    fn test_clamp_column() {
        assert_eq!(clamp_column("aé", 2), 1);
        assert_eq!(clamp_column("aé", 3), 3);
        assert_eq!(clamp_column("abc", -1), 0);
    }

    #[test]
    fn test_count_digits() {
        assert_eq!(count_digits(0), 1);
        assert_eq!(count_digits(9), 1);
        assert_eq!(count_digits(10), 2);
        assert_eq!(count_digits(1234), 4);
    }
}
