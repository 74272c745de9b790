//! Body normalization for routine/view comparison.
//!
//! Strips comments, collapses whitespace, and lowercases everything
//! outside string literals (identifiers are case-insensitive on both
//! providers). Literal contents are preserved verbatim: a changed string
//! constant is a real change.

/// Normalize a body for equality comparison.
pub fn normalize_body(body: &str) -> String {
    let chars: Vec<char> = body.chars().collect();
    let mut out = String::with_capacity(body.len());
    let mut i = 0;
    let mut pending_space = false;

    let mut push = |out: &mut String, c: char, pending_space: &mut bool| {
        if *pending_space && !out.is_empty() {
            out.push(' ');
        }
        *pending_space = false;
        out.push(c);
    };

    while i < chars.len() {
        let c = chars[i];
        match c {
            '-' if chars.get(i + 1) == Some(&'-') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                pending_space = true;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                let mut depth = 1;
                i += 2;
                while i < chars.len() && depth > 0 {
                    if chars[i] == '/' && chars.get(i + 1) == Some(&'*') {
                        depth += 1;
                        i += 2;
                    } else if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                        depth -= 1;
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
                pending_space = true;
            }
            '\'' => {
                push(&mut out, '\'', &mut pending_space);
                i += 1;
                while i < chars.len() {
                    if chars[i] == '\'' {
                        if chars.get(i + 1) == Some(&'\'') {
                            out.push_str("''");
                            i += 2;
                            continue;
                        }
                        out.push('\'');
                        i += 1;
                        break;
                    }
                    out.push(chars[i]);
                    i += 1;
                }
            }
            c if c.is_whitespace() => {
                pending_space = true;
                i += 1;
            }
            c => {
                for lower in c.to_lowercase() {
                    push(&mut out, lower, &mut pending_space);
                }
                i += 1;
            }
        }
    }

    out
}

/// Whether two bodies are equal after normalization.
pub fn bodies_equal(a: &str, b: &str) -> bool {
    normalize_body(a) == normalize_body(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_and_case_are_insignificant() {
        assert!(bodies_equal(
            "SELECT  Name\nFROM dbo.Students",
            "select name from DBO.STUDENTS"
        ));
    }

    #[test]
    fn comments_are_insignificant() {
        assert!(bodies_equal(
            "SELECT 1 -- explanatory\n/* more */ FROM T",
            "SELECT 1 FROM T"
        ));
    }

    #[test]
    fn string_literal_content_is_significant() {
        assert!(!bodies_equal("SELECT 'a' FROM T", "SELECT 'b' FROM T"));
        // But literal case is preserved, not folded.
        assert!(!bodies_equal("SELECT 'A' FROM T", "SELECT 'a' FROM T"));
    }
}
