//! DYR record framing and tokenization.
//!
//! A logical record may span several physical lines and ends at the first
//! terminator character outside a quoted span. Blank lines and lines starting
//! with `@!` or `//` are comments. Tokens are separated by whitespace or
//! commas; a single-quoted span is one token and keeps its quotes.

use tracing::debug;

/// One logical DYR record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DyrRecord {
    /// 1-based physical line where the record starts
    pub line: usize,
    /// Number of physical lines the record spans
    pub line_span: usize,
    pub tokens: Vec<String>,
}

impl DyrRecord {
    /// Token at a 1-based position.
    pub fn token(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(String::as_str)
    }
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("@!") || trimmed.starts_with("//")
}

/// Byte offset of the first `terminator` outside single quotes.
///
/// A line whose quotes never balance ends at its first terminator, quoted or
/// not, so a stray quote cannot swallow the records that follow.
fn find_terminator(line: &str, terminator: &str) -> Option<usize> {
    if terminator.is_empty() {
        return None;
    }
    let mut in_quote = false;
    for (offset, ch) in line.char_indices() {
        if ch == '\'' {
            in_quote = !in_quote;
        } else if !in_quote && line[offset..].starts_with(terminator) {
            return Some(offset);
        }
    }
    if in_quote {
        line.find(terminator)
    } else {
        None
    }
}

/// Split record text into tokens, keeping quoted spans intact.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;

    for ch in text.chars() {
        match ch {
            '\'' => {
                current.push(ch);
                in_quote = !in_quote;
                if !in_quote {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c if !in_quote && (c.is_whitespace() || c == ',') => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Frame DYR text into logical records.
///
/// Text after the terminator on the closing line is ignored. A trailing
/// record without a terminator is still returned.
pub fn frame_records(text: &str, terminator: &str) -> Vec<DyrRecord> {
    let mut records = Vec::new();
    let mut buffer = String::new();
    let mut start_line = 0;
    let mut span = 0;

    for (offset, line) in text.lines().enumerate() {
        if line.trim().is_empty() || is_comment(line) {
            continue;
        }
        if buffer.is_empty() {
            start_line = offset + 1;
            span = 0;
        }
        span += 1;

        match find_terminator(line, terminator) {
            Some(end) => {
                buffer.push_str(&line[..end]);
                records.push(DyrRecord {
                    line: start_line,
                    line_span: span,
                    tokens: tokenize(&buffer),
                });
                buffer.clear();
            }
            None => {
                buffer.push_str(line);
                buffer.push(' ');
            }
        }
    }

    if !buffer.trim().is_empty() {
        debug!(line = start_line, "unterminated DYR record at end of input");
        records.push(DyrRecord {
            line: start_line,
            line_span: span,
            tokens: tokenize(&buffer),
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_keeps_quoted_spans() {
        assert_eq!(
            tokenize("1 'GENROU' '1 A' 6.5,0.05"),
            vec!["1", "'GENROU'", "'1 A'", "6.5", "0.05"]
        );
        assert_eq!(tokenize("  "), Vec::<String>::new());
        assert_eq!(tokenize("1 'GENCLS'1"), vec!["1", "'GENCLS'", "1"]);
    }

    #[test]
    fn frames_single_and_multi_line_records() {
        let text = "\
@! comment line
1 'GENCLS' 1 5.0 0.0 /

// another comment
2 'GENROU' 1 6.5 0.06 0.2
  0.05 4.0 0.0 /  trailing text
";
        let records = frame_records(text, "/");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[0].line_span, 1);
        assert_eq!(records[0].tokens, vec!["1", "'GENCLS'", "1", "5.0", "0.0"]);
        assert_eq!(records[1].line, 5);
        assert_eq!(records[1].line_span, 2);
        assert_eq!(records[1].tokens.len(), 9);
        assert_eq!(records[1].token(9), Some("0.0"));
        assert_eq!(records[1].token(0), None);
    }

    #[test]
    fn terminator_inside_quotes_is_ignored() {
        let records = frame_records("1 'IEEET1' 'A/B' 2.0 /", "/");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tokens, vec!["1", "'IEEET1'", "'A/B'", "2.0"]);
    }

    #[test]
    fn unbalanced_quote_ends_at_first_terminator() {
        let records = frame_records("1 'GENCLS 1 5.0 0.0 /\n2 'GENCLS' 1 3.0 0.0 /\n", "/");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line_span, 1);
        assert_eq!(records[0].tokens, vec!["1", "'GENCLS 1 5.0 0.0 "]);
        assert_eq!(records[1].line, 2);
        assert_eq!(records[1].tokens, vec!["2", "'GENCLS'", "1", "3.0", "0.0"]);
    }

    #[test]
    fn unterminated_tail_is_kept() {
        let records = frame_records("1 'GENCLS' 1 5.0 0.0", "/");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tokens.len(), 5);
    }

    #[test]
    fn empty_input_frames_nothing() {
        assert!(frame_records("", "/").is_empty());
        assert!(frame_records("\n\n@! only comments\n", "/").is_empty());
    }
}
