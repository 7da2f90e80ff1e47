/// Splits one line into fields.
///
/// A `"` toggles quoting, except that `""` inside a quoted run emits a
/// literal quote. Commas outside quotes separate fields, and every field is
/// trimmed. Unbalanced quotes are not an error: the remainder of the line
/// simply stays inside the open field.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(cell.trim().to_string());
                cell.clear();
            }
            other => cell.push(other),
        }
    }

    fields.push(cell.trim().to_string());
    fields
}

/// Trimmed, non-blank lines of a file. Handles `\n` and `\r\n` endings and
/// a leading byte order mark.
pub fn non_blank_lines(text: &str) -> Vec<&str> {
    text.strip_prefix('\u{feff}')
        .unwrap_or(text)
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::quote_field;
    use proptest::prelude::*;

    #[test]
    fn quoted_comma_is_preserved() {
        assert_eq!(tokenize_line(r#""a,b",c"#), vec!["a,b", "c"]);
    }

    #[test]
    fn doubled_quote_becomes_literal() {
        assert_eq!(tokenize_line(r#""a""b",c"#), vec![r#"a"b"#, "c"]);
    }

    #[test]
    fn fields_are_trimmed() {
        assert_eq!(tokenize_line("  uno ,dos  ,  "), vec!["uno", "dos", ""]);
        assert_eq!(tokenize_line(r#"" con espacio ""#), vec!["con espacio"]);
    }

    #[test]
    fn empty_fields_are_kept_in_position() {
        assert_eq!(tokenize_line("a,,c"), vec!["a", "", "c"]);
        assert_eq!(tokenize_line(""), vec![""]);
    }

    #[test]
    fn unbalanced_quote_swallows_the_rest_of_the_line() {
        assert_eq!(tokenize_line(r#""abierto,b,c"#), vec!["abierto,b,c"]);
        assert_eq!(tokenize_line(r#"a,b"c,d"#), vec!["a", "bc,d"]);
    }

    #[test]
    fn lines_drop_blanks_and_carriage_returns() {
        let text = "\u{feff}h1,h2\r\n\r\n  \r\nv1,v2\r\n";
        assert_eq!(non_blank_lines(text), vec!["h1,h2", "v1,v2"]);
    }

    proptest! {
        #[test]
        fn quoting_a_plain_value_round_trips(v in "[^,\"]*") {
            prop_assert_eq!(tokenize_line(&quote_field(&v)), vec![v.trim().to_string()]);
        }
    }
}
