//! Formula tokenizing.
//!
//! A formula is a single function call, `=NAME(arg, arg, ...)`. Arguments are
//! split on top-level commas; a comma inside a double-quoted literal does not
//! split, and a quote preceded by `\` does not open or close a literal.

use regex::Regex;
use std::sync::OnceLock;

use super::error::EvalError;

/// The pieces of `=NAME(args)`, arguments still in source form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedFormula {
    pub name: String,
    pub args: Vec<String>,
}

fn call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^=\s*(?<name>[A-Z_]+)\((?<args>.*)\)\s*$")
            .expect("formula call regex must compile")
    })
}

/// Parse `=NAME(args)`. Anything else is a syntax error.
pub fn parse_formula(formula: &str) -> Result<ParsedFormula, EvalError> {
    let caps = call_re()
        .captures(formula.trim())
        .ok_or_else(|| EvalError::Syntax(formula.to_string()))?;
    Ok(ParsedFormula {
        name: caps["name"].to_string(),
        args: split_args(&caps["args"]),
    })
}

/// Split an argument list on commas outside double-quoted literals.
/// Each argument is trimmed; an empty list yields no arguments.
pub fn split_args(args: &str) -> Vec<String> {
    if args.trim().is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut prev: Option<char> = None;

    for ch in args.chars() {
        match ch {
            '"' if prev != Some('\\') => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => {
                out.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
        prev = Some(ch);
    }
    out.push(current.trim().to_string());
    out
}

/// Strip the surrounding quotes of a string literal argument and unescape
/// `\"`. Unquoted arguments are returned unchanged.
pub fn unquote(arg: &str) -> String {
    if arg.len() >= 2 && arg.starts_with('"') && arg.ends_with('"') {
        arg[1..arg.len() - 1].replace("\\\"", "\"")
    } else {
        arg.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_name_and_args() {
        let parsed = parse_formula("=SUM(A1:A3, B1)").unwrap();
        assert_eq!(parsed.name, "SUM");
        assert_eq!(parsed.args, vec!["A1:A3", "B1"]);
    }

    #[test]
    fn quoted_commas_do_not_split() {
        assert_eq!(
            split_args(r#"A1,"a,b","x""#),
            vec!["A1", r#""a,b""#, r#""x""#]
        );
    }

    #[test]
    fn escaped_quote_stays_inside_literal() {
        assert_eq!(
            split_args(r#"A1,"say \"hi, there\"","x""#),
            vec!["A1", r#""say \"hi, there\"""#, r#""x""#]
        );
        assert_eq!(unquote(r#""say \"hi\"""#), r#"say "hi""#);
    }

    #[test]
    fn parentheses_inside_literals_are_kept() {
        let parsed = parse_formula(r#"=FIND_AND_REPLACE(A1,"(x)","y")"#).unwrap();
        assert_eq!(parsed.args, vec!["A1", r#""(x)""#, r#""y""#]);
    }

    #[test]
    fn empty_argument_list() {
        assert_eq!(parse_formula("=SUM()").unwrap().args, Vec::<String>::new());
        assert_eq!(split_args("A1,"), vec!["A1", ""]);
    }

    #[test]
    fn malformed_formulas_are_syntax_errors() {
        for bad in ["=SUM(", "=sum(A1)", "=SUM A1", "=(A1)", "SUM(A1)", "=SUM(A1) + 1"] {
            assert_eq!(
                parse_formula(bad),
                Err(EvalError::Syntax(bad.to_string())),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn unquote_leaves_bare_arguments() {
        assert_eq!(unquote("A1"), "A1");
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote("\"\""), "");
    }
}
