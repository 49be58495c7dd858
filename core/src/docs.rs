//! # Documentation Blocks
//!
//! Splits a handler documentation block into summary, description and notes.
//!
//! ```text
//! create a new user            <- summary
//! Stores the user and returns  <- description (line breaks become <br/>)
//! its address.
//! ---                          <- delimiter: opts the handler into the document
//! free-form notes              <- kept, never emitted
//! ```

/// The delimiter line that marks a handler as documented.
pub const DELIMITER: &str = "---";

const LINE_BREAK: &str = "<br/>";

/// Parsed documentation block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    /// First line above the delimiter.
    pub summary: String,
    /// Remaining lines above the delimiter.
    pub description: String,
    /// Text below the delimiter.
    pub notes: String,
    /// Whether the delimiter is present.
    pub exported: bool,
}

/// Parses a raw documentation block.
pub fn parse(raw: &str) -> DocBlock {
    let lines = dedent(raw);
    let delimiter = lines.iter().position(|l| l.trim() == DELIMITER);

    let (head, tail) = match delimiter {
        Some(idx) => (&lines[..idx], &lines[idx + 1..]),
        None => (&lines[..], &[][..]),
    };

    DocBlock {
        summary: head.first().map(|l| l.trim().to_string()).unwrap_or_default(),
        description: join_trimmed(head.get(1..).unwrap_or_default(), LINE_BREAK),
        notes: join_trimmed(tail, "\n"),
        exported: delimiter.is_some(),
    }
}

/// Strips surrounding blank lines and the common indentation.
///
/// The first line is trimmed on its own, since doc strings usually start
/// right after the opening quote.
fn dedent(raw: &str) -> Vec<String> {
    let mut lines: Vec<&str> = raw.lines().collect();
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let indent = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .enumerate()
        .map(|(i, l)| {
            if i == 0 {
                l.trim().to_string()
            } else {
                l.get(indent..).unwrap_or(l.trim_start()).trim_end().to_string()
            }
        })
        .collect()
}

fn join_trimmed(lines: &[String], sep: &str) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(s), Some(e)) => lines[s..=e].join(sep),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summary_and_description() {
        let doc = parse(
            "create a new user
            Stores the user record.
            Returns its address.
            ---
            internal: uses the primary db",
        );
        assert_eq!(doc.summary, "create a new user");
        assert_eq!(
            doc.description,
            "Stores the user record.<br/>Returns its address."
        );
        assert_eq!(doc.notes, "internal: uses the primary db");
        assert!(doc.exported);
    }

    #[test]
    fn test_missing_delimiter_is_not_exported() {
        let doc = parse("just a helper\nwith details");
        assert!(!doc.exported);
        assert_eq!(doc.summary, "just a helper");
        assert_eq!(doc.description, "with details");
    }

    #[test]
    fn test_empty_block() {
        let doc = parse("");
        assert_eq!(doc, DocBlock::default());
        assert!(!doc.exported);
    }

    #[test]
    fn test_delimiter_only_exports_with_empty_summary() {
        let doc = parse("---");
        assert!(doc.exported);
        assert_eq!(doc.summary, "");
        assert_eq!(doc.description, "");
    }

    #[test]
    fn test_delimiter_must_be_on_its_own_line() {
        let doc = parse("summary --- inline\nmore");
        assert!(!doc.exported);
    }

    #[test]
    fn test_leading_blank_lines_are_dropped() {
        let doc = parse("\n   \n    \n    details only\n    ---");
        assert_eq!(doc.summary, "details only");
        assert!(doc.exported);
    }

    #[test]
    fn test_blank_lines_around_description_are_trimmed() {
        let doc = parse("x\n\nbody\n\n---");
        assert_eq!(doc.summary, "x");
        assert_eq!(doc.description, "body");
    }

    #[test]
    fn test_dedent_keeps_relative_indentation() {
        let doc = parse("summary\n    line one\n      indented\n    ---");
        assert_eq!(doc.description, "line one<br/>  indented");
    }

    #[test]
    fn test_indented_delimiter_counts() {
        let doc = parse("summary\n    ---\n");
        assert!(doc.exported);
    }
}
