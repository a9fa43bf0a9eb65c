//! SQL expression fragments and portable date patterns.

use crate::value::BindValue;

/// A partial SQL expression with its bound arguments.
///
/// Dialects rewrite the expression in place, e.g. when wrapping it in a
/// date formatting call. Arguments are never touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expr {
    /// Expression text.
    pub sql: String,
    /// Arguments bound to placeholders inside `sql`.
    pub args: Vec<BindValue>,
}

impl Expr {
    /// Creates an expression without arguments.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    /// Replaces the expression text with `f(current)`.
    pub fn rewrite(&mut self, f: impl FnOnce(&str) -> String) -> &mut Self {
        self.sql = f(&self.sql);
        self
    }
}

/// One component of a portable date pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateToken {
    /// `y`
    Year,
    /// `m`
    Month,
    /// `d`
    Day,
    /// `h`
    Hour,
    /// `M`
    Minute,
    /// `s`
    Second,
}

impl DateToken {
    const fn from_char(c: char) -> Option<Self> {
        match c {
            'y' => Some(Self::Year),
            'm' => Some(Self::Month),
            'd' => Some(Self::Day),
            'h' => Some(Self::Hour),
            'M' => Some(Self::Minute),
            's' => Some(Self::Second),
            _ => None,
        }
    }
}

/// A parsed element of a portable date pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    /// A date component.
    Token(DateToken),
    /// Any other character, copied through.
    Literal(char),
}

/// Splits a portable pattern into tokens and literals.
///
/// A run of the same token letter is one token, so `yyyy-mm-dd` and `y-m-d`
/// parse identically.
#[must_use]
pub fn parse_date_format(format: &str) -> Vec<DatePart> {
    let mut parts = Vec::new();
    let mut previous: Option<char> = None;

    for c in format.chars() {
        match DateToken::from_char(c) {
            Some(_) if previous == Some(c) => {}
            Some(token) => parts.push(DatePart::Token(token)),
            None => parts.push(DatePart::Literal(c)),
        }
        previous = Some(c);
    }

    parts
}

/// Renders a portable pattern into a dialect's native pattern.
///
/// `token` maps each component; `literal` appends a literal character,
/// escaping it as the native pattern language requires.
pub fn translate_date_format(
    format: &str,
    token: impl Fn(DateToken) -> &'static str,
    literal: impl Fn(char, &mut String),
) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    for part in parse_date_format(format) {
        match part {
            DatePart::Token(t) => out.push_str(token(t)),
            DatePart::Literal(c) => literal(c, &mut out),
        }
    }
    out
}

/// Appends a literal unchanged.
///
/// Native patterns are SQL-quoted as a whole once rendered, so quotes are
/// left alone here.
pub fn push_literal(c: char, out: &mut String) {
    out.push(c);
}

/// Literal escaping for `strftime`-style patterns (`%` directives).
pub fn push_percent_literal(c: char, out: &mut String) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_collapse_to_one_token() {
        assert_eq!(parse_date_format("yyyy-mm-dd"), parse_date_format("y-m-d"));
        assert_eq!(
            parse_date_format("y-m"),
            vec![
                DatePart::Token(DateToken::Year),
                DatePart::Literal('-'),
                DatePart::Token(DateToken::Month),
            ]
        );
    }

    #[test]
    fn test_month_and_minute_are_case_sensitive() {
        assert_eq!(
            parse_date_format("mM"),
            vec![
                DatePart::Token(DateToken::Month),
                DatePart::Token(DateToken::Minute),
            ]
        );
    }

    #[test]
    fn test_translate_with_escaping() {
        let native = translate_date_format(
            "d% h'",
            |t| match t {
                DateToken::Day => "%d",
                DateToken::Hour => "%H",
                _ => "?",
            },
            push_percent_literal,
        );
        assert_eq!(native, "%d%% %H'");
    }

    #[test]
    fn test_rewrite_keeps_args() {
        let mut expr = Expr {
            sql: "created_at".to_string(),
            args: vec![BindValue::Int(1)],
        };
        expr.rewrite(|e| format!("DATE({e})"));
        assert_eq!(expr.sql, "DATE(created_at)");
        assert_eq!(expr.args, vec![BindValue::Int(1)]);
    }
}
