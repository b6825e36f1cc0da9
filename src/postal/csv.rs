//! Quoted-CSV line tokenizer / CSV 行パーサ
//!
//! Tolerant by intent: a single in-quotes flag is tracked for the whole line,
//! so a `"` in the middle of a field also toggles quoting. Field counts are
//! not checked here.

/// Split one line (without line terminator) into fields / 1行をフィールドに分割
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
        } else {
            match ch {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut field)),
                _ => field.push(ch),
            }
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_fields() {
        assert_eq!(parse_csv_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_line_is_one_empty_field() {
        assert_eq!(parse_csv_line(""), vec![""]);
        assert_eq!(parse_csv_line(","), vec!["", ""]);
    }

    #[test]
    fn test_quoted_fields_with_commas() {
        let fields = parse_csv_line(r#"13101,"100  ","1000005","東京都","千代田区","丸の内（１、２丁目）""#);
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[1], "100  ");
        assert_eq!(fields[5], "丸の内（１、２丁目）");

        assert_eq!(parse_csv_line(r#""a,b",c"#), vec!["a,b", "c"]);
    }

    #[test]
    fn test_escaped_quote() {
        assert_eq!(parse_csv_line(r#""say ""hi""",x"#), vec![r#"say "hi""#, "x"]);
    }

    #[test]
    fn test_mid_field_quote_toggles() {
        // ab"c,d"e -> quoting opens mid-field and swallows the comma
        assert_eq!(parse_csv_line(r#"ab"c,d"e,f"#), vec!["abc,de", "f"]);
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(parse_csv_line(r#"a,"b,c"#), vec!["a", "b,c"]);
    }
}
