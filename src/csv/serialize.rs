/// Wraps a value in double quotes, doubling any embedded quote so the
/// tokenizer reads it back as a single field.
pub fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn write_quoted_row<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| quote_field(v.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Header labels joined bare, followed by one fully quoted line per row.
pub fn write_table<S: AsRef<str>>(labels: &[&str], rows: &[Vec<S>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(labels.join(","));
    lines.extend(rows.iter().map(|row| write_quoted_row(row)));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::tokenize_line;

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(quote_field(r#"dijo "no""#), r#""dijo ""no""""#);
        assert_eq!(tokenize_line(&quote_field(r#"dijo "no""#)), vec![r#"dijo "no""#]);
    }

    #[test]
    fn commas_survive_inside_quotes() {
        let line = write_quoted_row(&["Pérez, Ana", "Juzgado 3"]);
        assert_eq!(line, r#""Pérez, Ana","Juzgado 3""#);
        assert_eq!(tokenize_line(&line), vec!["Pérez, Ana", "Juzgado 3"]);
    }

    #[test]
    fn table_has_bare_header_and_quoted_rows() {
        let rows = vec![vec!["a", ""], vec!["b", "c"]];
        assert_eq!(
            write_table(&["Uno", "Dos"], &rows),
            "Uno,Dos\n\"a\",\"\"\n\"b\",\"c\""
        );
    }

    #[test]
    fn table_without_rows_is_just_the_header() {
        let rows: Vec<Vec<String>> = Vec::new();
        assert_eq!(write_table(&["Uno"], &rows), "Uno");
    }
}
