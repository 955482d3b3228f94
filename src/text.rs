//! Text helpers shared by the option loader and the label renderer

use std::sync::OnceLock;

use regex::Regex;

/// Process escape sequences in text (e.g., \n -> newline, \t -> tab)
/// This handles the case where shell passes literal "\n" instead of actual newlines
pub fn unescape(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            let replacement = match chars.peek() {
                Some('n') => Some('\n'),
                Some('t') => Some('\t'),
                Some('r') => Some('\r'),
                Some('\\') => Some('\\'),
                Some('"') => Some('"'),
                _ => None,
            };
            match replacement {
                Some(r) => {
                    result.push(r);
                    chars.next();
                }
                None => result.push(c),
            }
        } else {
            result.push(c);
        }
    }

    result
}

fn tag_pattern() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"</?[A-Za-z][^<>]*>").expect("static tag pattern"))
}

/// Drop span/b/i style tags and decode the basic entities
pub fn strip_markup(input: &str) -> String {
    tag_pattern()
        .replace_all(input, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Split an option string the way a POSIX shell would for simple cases:
/// whitespace separation, single and double quotes, backslash escapes.
pub fn split_args(input: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err("unterminated single quote".to_string()),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\' | '$' | '`')) => current.push(ch),
                            Some(ch) => {
                                current.push('\\');
                                current.push(ch);
                            }
                            None => return Err("unterminated double quote".to_string()),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err("unterminated double quote".to_string()),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(ch) => current.push(ch),
                    None => return Err("trailing backslash".to_string()),
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        args.push(current);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\nb\tc"), "a\nb\tc");
        assert_eq!(unescape(r"back\\slash"), "back\\slash");
        assert_eq!(unescape(r"keep \q as is"), r"keep \q as is");
        assert_eq!(unescape(r"trailing\"), r"trailing\");
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("<b>Bold</b> &amp; <span foreground='red'>red</span>"), "Bold & red");
        assert_eq!(strip_markup("1 &lt; 2"), "1 < 2");
        assert_eq!(strip_markup("a < b"), "a < b");
    }

    #[test]
    fn test_split_args() {
        let args = split_args(r#"--title="Hello world" --width 300 'it''s' a\ b"#).unwrap();
        assert_eq!(args, vec!["--title=Hello world", "--width", "300", "its", "a b"]);
    }

    #[test]
    fn test_split_args_errors() {
        assert!(split_args("--title='open").is_err());
        assert!(split_args("--text=\"open").is_err());
        assert_eq!(split_args("   ").unwrap(), Vec::<String>::new());
    }
}
