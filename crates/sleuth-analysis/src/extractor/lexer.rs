//! SQL tokenizer.
//!
//! Produces a flat token stream with comments and string literal contents
//! already discarded. Bracketed (`[x]`), double-quoted (`"x"`) and
//! backtick identifiers are unquoted into `Tok::Quoted` so they can never
//! be mistaken for keywords.

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tok {
    /// Unquoted word: identifier or keyword, original casing preserved.
    Word(String),
    /// Quoted identifier with quotes stripped. Never a keyword.
    Quoted(String),
    /// String literal; the content is deliberately dropped.
    Str,
    /// Numeric literal.
    Num(String),
    /// `@variable` (including `@@globals`).
    Var(String),
    /// `#temp` or `##globaltemp`, leading hashes preserved.
    Temp(String),
    /// Any other single symbol.
    Sym(char),
}

impl Tok {
    /// Case-insensitive keyword test. Quoted identifiers never match.
    pub fn is_kw(&self, kw: &str) -> bool {
        matches!(self, Tok::Word(w) if w.eq_ignore_ascii_case(kw))
    }

    /// The identifier text, if this token can name an object.
    pub fn ident(&self) -> Option<&str> {
        match self {
            Tok::Word(w) => Some(w),
            Tok::Quoted(q) => Some(q),
            _ => None,
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Tokenize a SQL body. Never fails; unrecognized bytes become symbols.
pub fn tokenize(body: &str) -> Vec<Tok> {
    let chars: Vec<char> = body.chars().collect();
    let mut toks = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '-' if chars.get(i + 1) == Some(&'-') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                // Block comments nest on SQL Server.
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
            }
            '\'' => {
                i = skip_string(&chars, i);
                toks.push(Tok::Str);
            }
            'N' | 'n' if chars.get(i + 1) == Some(&'\'') => {
                i = skip_string(&chars, i + 1);
                toks.push(Tok::Str);
            }
            '[' => {
                let (text, next) = read_delimited(&chars, i + 1, ']');
                toks.push(Tok::Quoted(text));
                i = next;
            }
            '"' => {
                let (text, next) = read_delimited(&chars, i + 1, '"');
                toks.push(Tok::Quoted(text));
                i = next;
            }
            '`' => {
                let (text, next) = read_delimited(&chars, i + 1, '`');
                toks.push(Tok::Quoted(text));
                i = next;
            }
            '@' => {
                let start = i;
                i += 1;
                if chars.get(i) == Some(&'@') {
                    i += 1;
                }
                while i < chars.len() && is_ident_part(chars[i]) {
                    i += 1;
                }
                toks.push(Tok::Var(chars[start..i].iter().collect()));
            }
            '#' => {
                let start = i;
                i += 1;
                if chars.get(i) == Some(&'#') {
                    i += 1;
                }
                while i < chars.len() && is_ident_part(chars[i]) {
                    i += 1;
                }
                toks.push(Tok::Temp(chars[start..i].iter().collect()));
            }
            c if is_ident_start(c) => {
                let start = i;
                while i < chars.len() && is_ident_part(chars[i]) {
                    i += 1;
                }
                toks.push(Tok::Word(chars[start..i].iter().collect()));
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '.') {
                    i += 1;
                }
                toks.push(Tok::Num(chars[start..i].iter().collect()));
            }
            c if c.is_whitespace() => {
                i += 1;
            }
            other => {
                toks.push(Tok::Sym(other));
                i += 1;
            }
        }
    }

    toks
}

/// Skip a single-quoted literal starting at `open`. Doubled quotes escape.
fn skip_string(chars: &[char], open: usize) -> usize {
    let mut i = open + 1;
    while i < chars.len() {
        if chars[i] == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    i
}

/// Read a delimited identifier. Doubled closers escape.
fn read_delimited(chars: &[char], start: usize, close: char) -> (String, usize) {
    let mut text = String::new();
    let mut i = start;
    while i < chars.len() {
        if chars[i] == close {
            if chars.get(i + 1) == Some(&close) {
                text.push(close);
                i += 2;
                continue;
            }
            return (text, i + 1);
        }
        text.push(chars[i]);
        i += 1;
    }
    (text, i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_and_block_comments() {
        let toks = tokenize("SELECT a -- from Hidden\n/* JOIN Secret */ FROM T");
        assert!(!toks.iter().any(|t| t.ident() == Some("Hidden")));
        assert!(!toks.iter().any(|t| t.ident() == Some("Secret")));
        assert!(toks.iter().any(|t| t.is_kw("from")));
    }

    #[test]
    fn string_literals_keep_no_content() {
        let toks = tokenize("SELECT 'FROM Users' FROM Logs");
        let words: Vec<_> = toks.iter().filter_map(Tok::ident).collect();
        assert_eq!(words, vec!["SELECT", "FROM", "Logs"]);
    }

    #[test]
    fn doubled_quote_escapes_inside_literal() {
        let toks = tokenize("SELECT 'it''s from dbo.X' FROM T");
        let words: Vec<_> = toks.iter().filter_map(Tok::ident).collect();
        assert_eq!(words, vec!["SELECT", "FROM", "T"]);
    }

    #[test]
    fn bracketed_identifier_is_not_a_keyword() {
        let toks = tokenize("SELECT [from] FROM [Order Details]");
        assert_eq!(toks[1], Tok::Quoted("from".into()));
        assert_eq!(toks[3], Tok::Quoted("Order Details".into()));
        assert!(toks[2].is_kw("from"));
    }

    #[test]
    fn temp_and_variable_tokens() {
        let toks = tokenize("INSERT INTO #tmp SELECT * FROM @tv, ##global");
        assert!(toks.contains(&Tok::Temp("#tmp".into())));
        assert!(toks.contains(&Tok::Var("@tv".into())));
        assert!(toks.contains(&Tok::Temp("##global".into())));
    }

    #[test]
    fn unicode_string_prefix() {
        let toks = tokenize("SELECT N'FROM X' FROM T");
        let words: Vec<_> = toks.iter().filter_map(Tok::ident).collect();
        assert_eq!(words, vec!["SELECT", "FROM", "T"]);
    }
}
