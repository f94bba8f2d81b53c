//! Built-in spreadsheet functions and their metadata.
//!
//! Conventions:
//! - Spreadsheet-facing built-in names are ALL CAPS (e.g. `SUM`, `AVERAGE`).
//! - Every function receives the resolved cells of its range arguments and
//!   the unquoted literal arguments, and returns a display string.
//! - If you add a new built-in, add a row to `BUILTINS`; its [`ArgShape`]
//!   decides which arguments are resolved as ranges (and therefore tracked as
//!   dependencies).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};
use std::collections::HashSet;

use crate::chart::{ChartKind, format_chart_spec};
use crate::engine::{
    Cell, EvalError, RangeRef, format_number, parse_leading_number, parse_number,
};

pub type BuiltinFn = fn(&[Cell], &[String]) -> Result<String, EvalError>;

/// Grouping used by help listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Math,
    Text,
    DataQuality,
    Conditional,
    Chart,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Math => "Math Functions",
            Category::Text => "Text Functions",
            Category::DataQuality => "Data Quality",
            Category::Conditional => "Conditional",
            Category::Chart => "Charts",
        }
    }
}

/// How a function's arguments are prepared before the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgShape {
    /// Every argument is a range, resolved to cells.
    Ranges,
    /// The first argument is a range; the rest are literal strings.
    RangeThenLiterals,
    /// Nothing is resolved; all arguments are literal strings.
    Literals,
}

impl ArgShape {
    /// Split source arguments into (range tokens, literal tokens).
    pub fn split<'a>(&self, args: &'a [String]) -> (&'a [String], &'a [String]) {
        match self {
            ArgShape::Ranges => (args, &[]),
            ArgShape::RangeThenLiterals if args.is_empty() => (&[], &[]),
            ArgShape::RangeThenLiterals => args.split_at(1),
            ArgShape::Literals => (&[], args),
        }
    }
}

pub struct Builtin {
    pub name: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub example: &'static str,
    pub args: ArgShape,
    pub eval: BuiltinFn,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "SUM",
        category: Category::Math,
        description: "Add up numbers in a range",
        example: "=SUM(A1:A5)",
        args: ArgShape::Ranges,
        eval: sum,
    },
    Builtin {
        name: "AVERAGE",
        category: Category::Math,
        description: "Calculate average of numbers",
        example: "=AVERAGE(B1:B10)",
        args: ArgShape::Ranges,
        eval: average,
    },
    Builtin {
        name: "MAX",
        category: Category::Math,
        description: "Find highest number in range",
        example: "=MAX(C1:C20)",
        args: ArgShape::Ranges,
        eval: max,
    },
    Builtin {
        name: "MIN",
        category: Category::Math,
        description: "Find lowest number in range",
        example: "=MIN(D1:D20)",
        args: ArgShape::Ranges,
        eval: min,
    },
    Builtin {
        name: "COUNT",
        category: Category::Math,
        description: "Count numbers in range",
        example: "=COUNT(E1:E10)",
        args: ArgShape::Ranges,
        eval: count,
    },
    Builtin {
        name: "TRIM",
        category: Category::Text,
        description: "Remove extra spaces",
        example: "=TRIM(A1)",
        args: ArgShape::Ranges,
        eval: trim,
    },
    Builtin {
        name: "UPPER",
        category: Category::Text,
        description: "Convert to uppercase",
        example: "=UPPER(B1)",
        args: ArgShape::Ranges,
        eval: upper,
    },
    Builtin {
        name: "LOWER",
        category: Category::Text,
        description: "Convert to lowercase",
        example: "=LOWER(C1)",
        args: ArgShape::Ranges,
        eval: lower,
    },
    Builtin {
        name: "CONCATENATE",
        category: Category::Text,
        description: "Join the values of a range",
        example: "=CONCATENATE(A1:A3)",
        args: ArgShape::Ranges,
        eval: concatenate,
    },
    Builtin {
        name: "FIND_AND_REPLACE",
        category: Category::Text,
        description: "Replace text in a cell",
        example: r#"=FIND_AND_REPLACE(A1,"find","replace")"#,
        args: ArgShape::RangeThenLiterals,
        eval: find_and_replace,
    },
    Builtin {
        name: "REMOVE_DUPLICATES",
        category: Category::DataQuality,
        description: "Remove duplicate values from range",
        example: "=REMOVE_DUPLICATES(A1:A10)",
        args: ArgShape::Ranges,
        eval: remove_duplicates,
    },
    Builtin {
        name: "IS_NUMBER",
        category: Category::DataQuality,
        description: "Check if cell contains a valid number",
        example: "=IS_NUMBER(A1)",
        args: ArgShape::Ranges,
        eval: is_number,
    },
    Builtin {
        name: "IS_DATE",
        category: Category::DataQuality,
        description: "Check if cell contains a valid date",
        example: "=IS_DATE(A1)",
        args: ArgShape::Ranges,
        eval: is_date,
    },
    Builtin {
        name: "COPY_ABSOLUTE",
        category: Category::DataQuality,
        description: "Copy the value of a (usually $-pinned) cell",
        example: "=COPY_ABSOLUTE($A$1)",
        args: ArgShape::Ranges,
        eval: copy_absolute,
    },
    Builtin {
        name: "SUMIF",
        category: Category::Conditional,
        description: "Add up numbers that satisfy a condition",
        example: r#"=SUMIF(A1:A10,">15")"#,
        args: ArgShape::RangeThenLiterals,
        eval: sumif,
    },
    Builtin {
        name: "COUNTIF",
        category: Category::Conditional,
        description: "Count numbers that satisfy a condition",
        example: r#"=COUNTIF(A1:A10,"<=3")"#,
        args: ArgShape::RangeThenLiterals,
        eval: countif,
    },
    Builtin {
        name: "CHART",
        category: Category::Chart,
        description: "Draw a line, bar or pie chart of a range",
        example: r#"=CHART("line","A1:A3")"#,
        args: ArgShape::Literals,
        eval: chart,
    },
];

/// Find a built-in by its spreadsheet name (case-sensitive).
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

/// All built-ins, in listing order.
pub fn builtins() -> &'static [Builtin] {
    BUILTINS
}

fn numbers(cells: &[Cell]) -> Vec<f64> {
    cells
        .iter()
        .filter_map(|c| parse_leading_number(c.value_str()))
        .collect()
}

fn first_value(cells: &[Cell]) -> &str {
    cells.first().map(Cell::value_str).unwrap_or("")
}

fn sum(cells: &[Cell], _: &[String]) -> Result<String, EvalError> {
    Ok(format_number(numbers(cells).iter().sum()))
}

fn average(cells: &[Cell], _: &[String]) -> Result<String, EvalError> {
    let nums = numbers(cells);
    if nums.is_empty() {
        return Ok("0".to_string());
    }
    Ok(format_number(nums.iter().sum::<f64>() / nums.len() as f64))
}

fn max(cells: &[Cell], _: &[String]) -> Result<String, EvalError> {
    Ok(numbers(cells)
        .into_iter()
        .reduce(f64::max)
        .map(format_number)
        .unwrap_or_else(|| "0".to_string()))
}

fn min(cells: &[Cell], _: &[String]) -> Result<String, EvalError> {
    Ok(numbers(cells)
        .into_iter()
        .reduce(f64::min)
        .map(format_number)
        .unwrap_or_else(|| "0".to_string()))
}

fn count(cells: &[Cell], _: &[String]) -> Result<String, EvalError> {
    Ok(numbers(cells).len().to_string())
}

fn trim(cells: &[Cell], _: &[String]) -> Result<String, EvalError> {
    Ok(first_value(cells).trim().to_string())
}

fn upper(cells: &[Cell], _: &[String]) -> Result<String, EvalError> {
    Ok(first_value(cells).to_uppercase())
}

fn lower(cells: &[Cell], _: &[String]) -> Result<String, EvalError> {
    Ok(first_value(cells).to_lowercase())
}

fn concatenate(cells: &[Cell], _: &[String]) -> Result<String, EvalError> {
    Ok(cells.iter().map(Cell::value_str).collect())
}

fn remove_duplicates(cells: &[Cell], _: &[String]) -> Result<String, EvalError> {
    let mut seen = HashSet::new();
    let unique: Vec<&str> = cells
        .iter()
        .filter_map(|c| c.value.as_deref())
        .filter(|v| seen.insert(*v))
        .collect();
    Ok(unique.join(","))
}

fn find_and_replace(cells: &[Cell], args: &[String]) -> Result<String, EvalError> {
    let [find, replace, ..] = args else {
        return Err(EvalError::Arity {
            function: "FIND_AND_REPLACE",
            expected: 2,
            actual: args.len(),
        });
    };
    let re = Regex::new(find).map_err(|e| EvalError::InvalidPattern(e.to_string()))?;
    let haystack = first_value(cells);
    Ok(re
        .replace_all(haystack, |caps: &Captures<'_>| {
            let mut out = String::new();
            expand_replacement(replace, &re, caps, haystack, &mut out);
            out
        })
        .into_owned())
}

/// Expand `$$`, `$&`, `` $` ``, `$'`, `$1`..`$99` and `$<name>` in a
/// replacement. A `$` that does not start one of these, or that names a
/// group the pattern lacks, is copied as is.
fn expand_replacement(
    template: &str,
    re: &Regex,
    caps: &Captures<'_>,
    haystack: &str,
    dst: &mut String,
) {
    let whole = caps.get(0);
    let group_text = |i: usize| caps.get(i).map_or("", |m| m.as_str());
    let mut rest = template;
    while let Some(pos) = rest.find('$') {
        dst.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];
        let consumed = match rest.as_bytes().first() {
            Some(b'$') => {
                dst.push('$');
                1
            }
            Some(b'&') => {
                dst.push_str(group_text(0));
                1
            }
            Some(b'`') => {
                dst.push_str(&haystack[..whole.map_or(0, |m| m.start())]);
                1
            }
            Some(b'\'') => {
                dst.push_str(&haystack[whole.map_or(haystack.len(), |m| m.end())..]);
                1
            }
            Some(b'0'..=b'9') => match group_number(rest, caps.len()) {
                Some((group, digits)) => {
                    dst.push_str(group_text(group));
                    digits
                }
                None => {
                    dst.push('$');
                    0
                }
            },
            Some(b'<') => match named_group(rest, re) {
                Some((name, len)) => {
                    dst.push_str(caps.name(name).map_or("", |m| m.as_str()));
                    len
                }
                None => {
                    dst.push('$');
                    0
                }
            },
            _ => {
                dst.push('$');
                0
            }
        };
        rest = &rest[consumed..];
    }
    dst.push_str(rest);
}

/// The group a `$n` or `$nn` reference names, and how many digits it used.
/// Two digits win when they name an existing group.
fn group_number(text: &str, groups: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let digit = |i: usize| {
        bytes
            .get(i)
            .filter(|b| b.is_ascii_digit())
            .map(|b| usize::from(b - b'0'))
    };
    let first = digit(0)?;
    if let Some(second) = digit(1) {
        let n = first * 10 + second;
        if (1..groups).contains(&n) {
            return Some((n, 2));
        }
    }
    (1..groups).contains(&first).then_some((first, 1))
}

/// `<name>` at the start of `text`, when the pattern has a group by that name.
fn named_group<'t>(text: &'t str, re: &Regex) -> Option<(&'t str, usize)> {
    let close = text.find('>')?;
    let name = &text[1..close];
    re.capture_names()
        .flatten()
        .any(|n| n == name)
        .then_some((name, close + 1))
}

fn is_number(cells: &[Cell], _: &[String]) -> Result<String, EvalError> {
    let value = first_value(cells);
    Ok((value.is_empty() || parse_leading_number(value).is_some()).to_string())
}

fn is_date(cells: &[Cell], _: &[String]) -> Result<String, EvalError> {
    let value = first_value(cells);
    Ok((value.is_empty() || looks_like_date(value)).to_string())
}

fn copy_absolute(cells: &[Cell], _: &[String]) -> Result<String, EvalError> {
    Ok(first_value(cells).to_string())
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

fn looks_like_date(value: &str) -> bool {
    let v = value.trim();
    DateTime::parse_from_rfc3339(v).is_ok()
        || DateTime::parse_from_rfc2822(v).is_ok()
        || DATE_FORMATS
            .iter()
            .any(|f| NaiveDate::parse_from_str(v, f).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(v, f).is_ok())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// A `SUMIF`/`COUNTIF` condition: a comparison operator and a number.
/// A bare number means equality.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Comparator {
    op: CompareOp,
    rhs: f64,
}

// Longer operators first so ">=" is not read as ">" followed by "=5".
const OPERATORS: &[(&str, CompareOp)] = &[
    (">=", CompareOp::Ge),
    ("<=", CompareOp::Le),
    ("<>", CompareOp::Ne),
    ("!=", CompareOp::Ne),
    ("==", CompareOp::Eq),
    (">", CompareOp::Gt),
    ("<", CompareOp::Lt),
    ("=", CompareOp::Eq),
];

impl Comparator {
    /// None when the condition is not `[op] number`.
    pub fn parse(condition: &str) -> Option<Comparator> {
        let condition = condition.trim();
        let (op, rest) = OPERATORS
            .iter()
            .find_map(|(token, op)| condition.strip_prefix(token).map(|rest| (*op, rest)))
            .unwrap_or((CompareOp::Eq, condition));
        Some(Comparator {
            op,
            rhs: parse_number(rest)?,
        })
    }

    pub fn matches(&self, lhs: f64) -> bool {
        match self.op {
            CompareOp::Lt => lhs < self.rhs,
            CompareOp::Le => lhs <= self.rhs,
            CompareOp::Gt => lhs > self.rhs,
            CompareOp::Ge => lhs >= self.rhs,
            CompareOp::Eq => lhs == self.rhs,
            CompareOp::Ne => lhs != self.rhs,
        }
    }
}

fn matching_numbers(
    function: &'static str,
    cells: &[Cell],
    args: &[String],
) -> Result<Vec<f64>, EvalError> {
    let condition = args.first().ok_or(EvalError::Arity {
        function,
        expected: 1,
        actual: 0,
    })?;
    let Some(comparator) = Comparator::parse(condition) else {
        log::debug!("{function}: unparseable condition {condition:?} matches nothing");
        return Ok(Vec::new());
    };
    Ok(numbers(cells)
        .into_iter()
        .filter(|n| comparator.matches(*n))
        .collect())
}

fn sumif(cells: &[Cell], args: &[String]) -> Result<String, EvalError> {
    let matched = matching_numbers("SUMIF", cells, args)?;
    Ok(format_number(matched.iter().sum()))
}

fn countif(cells: &[Cell], args: &[String]) -> Result<String, EvalError> {
    Ok(matching_numbers("COUNTIF", cells, args)?.len().to_string())
}

fn chart(_: &[Cell], args: &[String]) -> Result<String, EvalError> {
    let [kind, range, ..] = args else {
        return Err(EvalError::Arity {
            function: "CHART",
            expected: 2,
            actual: args.len(),
        });
    };
    let kind = ChartKind::from_tag(kind).ok_or_else(|| EvalError::InvalidChartType(kind.clone()))?;
    let range = range.trim();
    RangeRef::parse(range)?;
    Ok(format_chart_spec(kind, range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cells(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Cell::new_text(v)).collect()
    }

    fn call(name: &str, values: &[&str], args: &[&str]) -> Result<String, EvalError> {
        let builtin = lookup(name).unwrap();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        (builtin.eval)(&cells(values), &args)
    }

    #[test]
    fn builtin_names_are_unique_and_upper_case() {
        let mut names = HashSet::new();
        for b in BUILTINS {
            assert!(names.insert(b.name), "duplicate built-in {}", b.name);
            assert!(b.name.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
            assert!(b.example.starts_with(&format!("={}(", b.name)));
        }
    }

    #[test]
    fn numeric_functions_skip_text() {
        let values = ["10", "abc", "", "20.5"];
        assert_eq!(call("SUM", &values, &[]).unwrap(), "30.50");
        assert_eq!(call("AVERAGE", &values, &[]).unwrap(), "15.25");
        assert_eq!(call("MAX", &values, &[]).unwrap(), "20.50");
        assert_eq!(call("MIN", &values, &[]).unwrap(), "10");
        assert_eq!(call("COUNT", &values, &[]).unwrap(), "2");
    }

    #[test]
    fn numeric_functions_read_leading_numbers() {
        let values = ["12abc", "3px", "px3"];
        assert_eq!(call("SUM", &values, &[]).unwrap(), "15");
        assert_eq!(call("COUNT", &values, &[]).unwrap(), "2");
        assert_eq!(call("MAX", &values, &[]).unwrap(), "12");
        assert_eq!(call("SUMIF", &values, &[">5"]).unwrap(), "12");
        assert_eq!(call("COUNTIF", &values, &["<5"]).unwrap(), "1");
    }

    #[test]
    fn empty_numeric_sets_yield_zero() {
        for name in ["SUM", "AVERAGE", "MAX", "MIN", "COUNT"] {
            assert_eq!(call(name, &["x", ""], &[]).unwrap(), "0", "{name}");
            assert_eq!(call(name, &[], &[]).unwrap(), "0", "{name}");
        }
    }

    #[test]
    fn negative_extremes() {
        assert_eq!(call("MAX", &["-5", "-2.5"], &[]).unwrap(), "-2.50");
        assert_eq!(call("MIN", &["-5", "-2.5"], &[]).unwrap(), "-5");
    }

    #[test]
    fn text_functions_use_first_value() {
        assert_eq!(call("TRIM", &["  hi  ", "x"], &[]).unwrap(), "hi");
        assert_eq!(call("UPPER", &["abc", "x"], &[]).unwrap(), "ABC");
        assert_eq!(call("LOWER", &["AbC"], &[]).unwrap(), "abc");
        assert_eq!(call("TRIM", &[], &[]).unwrap(), "");
        assert_eq!(
            (lookup("UPPER").unwrap().eval)(&[Cell::default()], &[]).unwrap(),
            ""
        );
    }

    #[test]
    fn remove_duplicates_keeps_first_occurrence() {
        let mut input = cells(&["b", "a", "b", "", "c", "a"]);
        input.push(Cell::default());
        assert_eq!(
            (lookup("REMOVE_DUPLICATES").unwrap().eval)(&input, &[]).unwrap(),
            "b,a,,c"
        );
    }

    #[test]
    fn remove_duplicates_keeps_one_blank() {
        let input = vec![
            Cell::new_text("a"),
            Cell::new_empty(),
            Cell::new_text("b"),
            Cell::new_empty(),
        ];
        assert_eq!(
            (lookup("REMOVE_DUPLICATES").unwrap().eval)(&input, &[]).unwrap(),
            "a,,b"
        );
    }

    #[test]
    fn concatenate_joins_everything() {
        let mut input = cells(&["10", "20"]);
        input.push(Cell::default());
        input.push(Cell::new_text("x"));
        assert_eq!(
            (lookup("CONCATENATE").unwrap().eval)(&input, &[]).unwrap(),
            "1020x"
        );
    }

    #[test]
    fn find_and_replace_is_global_regex() {
        assert_eq!(
            call("FIND_AND_REPLACE", &["a-b-c"], &["-", "+"]).unwrap(),
            "a+b+c"
        );
        assert_eq!(
            call("FIND_AND_REPLACE", &["x1y22"], &["[0-9]+", "#"]).unwrap(),
            "x#y#"
        );
        assert_eq!(call("FIND_AND_REPLACE", &[], &["a", "b"]).unwrap(), "");
    }

    #[test]
    fn find_and_replace_expands_known_groups_only() {
        let replace = |find: &str, with: &str| {
            call("FIND_AND_REPLACE", &["abc"], &[find, with]).unwrap()
        };
        assert_eq!(replace("b", "$5"), "a$5c");
        assert_eq!(replace("b", "$x"), "a$xc");
        assert_eq!(replace("b", "$0"), "a$0c");
        assert_eq!(replace("b", "US$"), "aUS$c");
        assert_eq!(replace("b", "$$"), "a$c");
        assert_eq!(replace("b", "[$&]"), "a[b]c");
        assert_eq!(replace("b", "<$`|$'>"), "a<a|c>c");
        assert_eq!(replace("(b)", "[$1]"), "a[b]c");
        assert_eq!(replace("(b)", "$10"), "ab0c");
        assert_eq!(replace("(b)(x)?", "$2."), "a.c");
        assert_eq!(replace("(?P<mid>b)", "<$<mid>>"), "a<b>c");
        assert_eq!(replace("b", "$<mid>"), "a$<mid>c");
    }

    #[test]
    fn find_and_replace_needs_two_literals() {
        assert_eq!(
            call("FIND_AND_REPLACE", &["abc"], &["a"]),
            Err(EvalError::Arity {
                function: "FIND_AND_REPLACE",
                expected: 2,
                actual: 1
            })
        );
        assert!(matches!(
            call("FIND_AND_REPLACE", &["abc"], &["(", "x"]),
            Err(EvalError::InvalidPattern(_))
        ));
    }

    #[test]
    fn validity_checks() {
        assert_eq!(call("IS_NUMBER", &["12.5"], &[]).unwrap(), "true");
        assert_eq!(call("IS_NUMBER", &["twelve"], &[]).unwrap(), "false");
        assert_eq!(call("IS_NUMBER", &[""], &[]).unwrap(), "true");
        assert_eq!(call("IS_NUMBER", &["12abc"], &[]).unwrap(), "true");
        assert_eq!(call("IS_NUMBER", &["Infinity"], &[]).unwrap(), "true");
        assert_eq!(call("IS_NUMBER", &["NaN"], &[]).unwrap(), "false");

        assert_eq!(call("IS_DATE", &["2024-01-15"], &[]).unwrap(), "true");
        assert_eq!(call("IS_DATE", &["01/15/2024"], &[]).unwrap(), "true");
        assert_eq!(call("IS_DATE", &["January 15, 2024"], &[]).unwrap(), "true");
        assert_eq!(call("IS_DATE", &["2024-01-15T10:30:00Z"], &[]).unwrap(), "true");
        assert_eq!(call("IS_DATE", &["2024-02-30"], &[]).unwrap(), "false");
        assert_eq!(call("IS_DATE", &["10"], &[]).unwrap(), "false");
        assert_eq!(call("IS_DATE", &[""], &[]).unwrap(), "true");
    }

    #[test]
    fn comparator_parsing() {
        assert!(Comparator::parse(">15").unwrap().matches(20.0));
        assert!(!Comparator::parse(">15").unwrap().matches(15.0));
        assert!(Comparator::parse(">=15").unwrap().matches(15.0));
        assert!(Comparator::parse("<> 3").unwrap().matches(4.0));
        assert!(Comparator::parse("!=3").unwrap().matches(4.0));
        assert!(Comparator::parse("==3").unwrap().matches(3.0));
        assert!(Comparator::parse("=3").unwrap().matches(3.0));
        assert!(Comparator::parse("3").unwrap().matches(3.0));
        assert!(Comparator::parse("<-1.5").unwrap().matches(-2.0));
        assert_eq!(Comparator::parse(">abc"), None);
        assert_eq!(Comparator::parse("1; process.exit()"), None);
        assert_eq!(Comparator::parse(""), None);
    }

    #[test]
    fn conditional_aggregates() {
        let values = ["10", "20", "30", "n/a"];
        assert_eq!(call("SUMIF", &values, &[">15"]).unwrap(), "50");
        assert_eq!(call("COUNTIF", &values, &[">15"]).unwrap(), "2");
        assert_eq!(call("COUNTIF", &values, &["<=10"]).unwrap(), "1");
        assert_eq!(call("SUMIF", &values, &["bogus"]).unwrap(), "0");
        assert_eq!(call("COUNTIF", &values, &["bogus"]).unwrap(), "0");
        assert!(matches!(
            call("SUMIF", &values, &[]),
            Err(EvalError::Arity { .. })
        ));
    }

    #[test]
    fn chart_emits_sentinel() {
        assert_eq!(
            call("CHART", &[], &["line", "A1:A3"]).unwrap(),
            "__CHART__line__A1:A3"
        );
        assert_eq!(
            call("CHART", &[], &["pie", "B2:A1"]).unwrap(),
            "__CHART__pie__B2:A1"
        );
        assert_eq!(
            call("CHART", &[], &["bar", " $A$1:A3 "]).unwrap(),
            "__CHART__bar__$A$1:A3"
        );
        assert_eq!(
            call("CHART", &[], &["LINE", "$A$1:A3"]),
            Err(EvalError::InvalidChartType("LINE".into()))
        );
        assert_eq!(
            call("CHART", &[], &["radar", "A1:A3"]),
            Err(EvalError::InvalidChartType("radar".into()))
        );
        assert!(matches!(
            call("CHART", &[], &["bar", "nope"]),
            Err(EvalError::InvalidAddress(_))
        ));
        assert!(matches!(
            call("CHART", &[], &["bar"]),
            Err(EvalError::Arity { .. })
        ));
    }

    #[test]
    fn arg_shapes_split_ranges_from_literals() {
        let args: Vec<String> = ["A1", "\"x\"", "\"y\""]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let none: &[String] = &[];
        assert_eq!(ArgShape::Ranges.split(&args), (&args[..], none));
        assert_eq!(
            ArgShape::RangeThenLiterals.split(&args),
            (&args[..1], &args[1..])
        );
        assert_eq!(ArgShape::Literals.split(&args), (none, &args[..]));
        assert_eq!(ArgShape::RangeThenLiterals.split(none), (none, none));
    }
}
