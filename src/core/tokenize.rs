//! Quote-aware splitting and quoting of command lines
//!
//! Follows POSIX shell word rules closely enough for firewall-cmd scripts:
//! single quotes are literal, double quotes allow `\"` `\\` `\$` escapes, a
//! backslash outside quotes escapes the next character, and quoted spans may
//! sit inside a word (`--rich-rule='rule ...'` is one token).

/// Splits a line into shell words.
///
/// An unquoted `#` at the start of a word ends the line.
///
/// # Errors
///
/// Returns `Err` for an unterminated quote.
pub fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '#' if !in_token => break,
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err("unterminated single quote".to_string()),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.peek() {
                            Some(&next @ ('"' | '\\' | '$' | '`')) => {
                                current.push(next);
                                chars.next();
                            }
                            _ => current.push('\\'),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err("unterminated double quote".to_string()),
                    }
                }
            }
            '\\' => {
                in_token = true;
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            _ => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_./:@%+,=-".contains(c)
}

/// Quotes a value for the shell unless every character is safe bare.
///
/// Embedded single quotes are written as `'\''`.
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_safe_char) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(
            tokenize("firewall-cmd --permanent --add-port=80/tcp").unwrap(),
            ["firewall-cmd", "--permanent", "--add-port=80/tcp"]
        );
    }

    #[test]
    fn test_inline_single_quoted_flag() {
        let tokens =
            tokenize(r#"firewall-cmd --add-rich-rule='rule service name="ssh" accept'"#).unwrap();
        assert_eq!(tokens[1], r#"--add-rich-rule=rule service name="ssh" accept"#);
    }

    #[test]
    fn test_double_quotes_and_escapes() {
        assert_eq!(
            tokenize(r#"a "b c" d\ e "x\"y""#).unwrap(),
            ["a", "b c", "d e", "x\"y"]
        );
    }

    #[test]
    fn test_empty_quoted_word_is_kept() {
        assert_eq!(tokenize("a '' b").unwrap(), ["a", "", "b"]);
    }

    #[test]
    fn test_comment_ends_line() {
        assert_eq!(tokenize("a b # c d").unwrap(), ["a", "b"]);
        assert_eq!(tokenize("a b#c").unwrap(), ["a", "b#c"]);
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(tokenize("a 'b c").is_err());
        assert!(tokenize("a \"b c").is_err());
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("80/tcp"), "80/tcp");
        assert_eq!(shell_quote("port=80:proto=tcp"), "port=80:proto=tcp");
        assert_eq!(shell_quote("-j ACCEPT"), "'-j ACCEPT'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_quote_then_tokenize_is_identity() {
        for value in ["simple", "two words", "it's", r#"name="ssh""#, "", "$HOME"] {
            let line = format!("cmd {}", shell_quote(value));
            assert_eq!(tokenize(&line).unwrap(), ["cmd", value]);
        }
    }
}
