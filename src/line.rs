//! Splitting a single line of the booking export into fields.
//!
//! The export is simple enough that we scan it by hand: the free-text columns may contain commas
//! inside double quotes, but records never span lines and quotes are never escaped.

/// Split one line into its fields.
///
/// A `"` toggles quoted mode anywhere in the line and is not kept. Commas outside quotes separate
/// fields. Each field is trimmed. An unterminated quote runs to the end of the line.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_owned());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_owned());
    fields
}

/// Iterate over the non-blank lines of `text` with their 1-based line numbers.
///
/// Handles both `\n` and `\r\n` line endings.
pub fn lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, line))
}

#[cfg(test)]
mod test {
    use super::{lines, split_line};

    #[test]
    fn plain() {
        assert_eq!(split_line("a,b,c"), ["a", "b", "c"]);
    }

    #[test]
    fn quoted_comma() {
        assert_eq!(
            split_line(r#"Center,"Smith, Jane",30"#),
            ["Center", "Smith, Jane", "30"]
        );
    }

    #[test]
    fn trims_and_keeps_empty_fields() {
        assert_eq!(split_line(" a , ,c,"), ["a", "", "c", ""]);
        assert_eq!(split_line(""), [""]);
    }

    #[test]
    fn unterminated_quote() {
        assert_eq!(split_line(r#"a,"b,c"#), ["a", "b,c"]);
    }

    #[test]
    fn skips_blank_lines() {
        let text = "header\r\n\r\nrow 1\n   \nrow 2";
        assert_eq!(
            lines(text).collect::<Vec<_>>(),
            [(1, "header"), (3, "row 1"), (5, "row 2")]
        );
    }
}
