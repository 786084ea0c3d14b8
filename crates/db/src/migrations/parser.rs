//! Statement parser for migration scripts.
//!
//! A script holds one forward section and at most one backward section:
//!
//! ```text
//! -- +++ UP Migration
//! CREATE TABLE t (id INT);
//! -- --- DOWN Migration
//! DROP TABLE t;
//! ```
//!
//! The text is split at the backward marker; the forward marker is
//! stripped once from the part before it. Each section then splits into
//! individual statements at `;`. Separators inside single-quoted strings,
//! double-quoted identifiers, and `--` line comments do not split.

/// Marks the start of the forward section.
pub const UP_MARKER: &str = "-- +++ UP Migration";

/// Marks the start of the backward section. May be absent, in which case
/// the backward statement list is empty.
pub const DOWN_MARKER: &str = "-- --- DOWN Migration";

/// Split raw script text into forward and backward statement lists.
pub fn parse_script(content: &str) -> (Vec<String>, Vec<String>) {
    let (up, down) = match content.split_once(DOWN_MARKER) {
        Some((up, down)) => (up, down),
        None => (content, ""),
    };
    let up = up.replacen(UP_MARKER, "", 1);
    (split_statements(&up), split_statements(down))
}

/// Split one section into `;`-separated statements.
///
/// Fragments are trimmed of surrounding whitespace and empty ones
/// discarded; source order is preserved. Statements carry no trailing
/// separator.
pub fn split_statements(section: &str) -> Vec<String> {
    #[derive(Clone, Copy)]
    enum State {
        Normal,
        SingleQuote,
        DoubleQuote,
        LineComment,
    }

    let mut statements = Vec::new();
    let mut start = 0;
    let mut state = State::Normal;
    let mut chars = section.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match state {
            State::Normal => match c {
                '\'' => state = State::SingleQuote,
                '"' => state = State::DoubleQuote,
                '-' if matches!(chars.peek(), Some((_, '-'))) => state = State::LineComment,
                ';' => {
                    push_fragment(&mut statements, &section[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
            // A doubled quote inside a string reads as leave-and-re-enter,
            // which lands in the same state.
            State::SingleQuote if c == '\'' => state = State::Normal,
            State::DoubleQuote if c == '"' => state = State::Normal,
            State::LineComment if c == '\n' => state = State::Normal,
            _ => {}
        }
    }
    push_fragment(&mut statements, &section[start..]);
    statements
}

fn push_fragment(statements: &mut Vec<String>, fragment: &str) {
    let trimmed = fragment.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_forward_and_backward_sections() {
        let content =
            "-- +++ UP Migration\nCREATE TABLE t (id INT);\n-- --- DOWN Migration\nDROP TABLE t;\n";
        let (forward, backward) = parse_script(content);
        assert_eq!(forward, vec!["CREATE TABLE t (id INT)"]);
        assert_eq!(backward, vec!["DROP TABLE t"]);
    }

    #[test]
    fn missing_backward_marker_yields_empty_backward_list() {
        let content = "-- +++ UP Migration\nCREATE TABLE t (id INT);\n";
        let (forward, backward) = parse_script(content);
        assert_eq!(forward.len(), 1);
        assert!(backward.is_empty());
    }

    #[test]
    fn strips_forward_marker_only_once() {
        let content = "-- +++ UP Migration\nINSERT INTO notes (body) VALUES ('-- +++ UP Migration');";
        let (forward, _) = parse_script(content);
        assert_eq!(
            forward,
            vec!["INSERT INTO notes (body) VALUES ('-- +++ UP Migration')"]
        );
    }

    #[test]
    fn preserves_statement_order() {
        let section = "CREATE TABLE a (id INT);\nCREATE TABLE b (id INT);\nCREATE TABLE c (id INT);";
        let statements = split_statements(section);
        assert_eq!(statements.len(), 3);
        assert!(statements[0].contains("a"));
        assert!(statements[1].contains("b"));
        assert!(statements[2].contains("c"));
    }

    #[test]
    fn drops_empty_fragments() {
        let statements = split_statements(";;  ;\nDROP TABLE t;\n;");
        assert_eq!(statements, vec!["DROP TABLE t"]);
    }

    #[test]
    fn separator_inside_string_literal_does_not_split() {
        let statements = split_statements("INSERT INTO t (v) VALUES ('a;b');\nDROP TABLE t;");
        assert_eq!(
            statements,
            vec!["INSERT INTO t (v) VALUES ('a;b')", "DROP TABLE t"]
        );
    }

    #[test]
    fn doubled_quote_escape_stays_inside_string() {
        let statements = split_statements("INSERT INTO t (v) VALUES ('it''s; fine');");
        assert_eq!(statements, vec!["INSERT INTO t (v) VALUES ('it''s; fine')"]);
    }

    #[test]
    fn separator_inside_quoted_identifier_does_not_split() {
        let statements = split_statements("CREATE TABLE \"odd;name\" (id INT);");
        assert_eq!(statements, vec!["CREATE TABLE \"odd;name\" (id INT)"]);
    }

    #[test]
    fn separator_inside_line_comment_does_not_split() {
        let statements =
            split_statements("CREATE TABLE t (\n    id INT -- key; not a separator\n);");
        assert_eq!(statements.len(), 1);
        assert!(statements[0].starts_with("CREATE TABLE t"));
    }
}
