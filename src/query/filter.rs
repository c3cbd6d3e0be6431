//! # Filter Grammar
//!
//! Parses `[not.]<op>.<operand>` filter values and compiles them into
//! parameterized SQL conditions.

use std::fmt;
use std::str::FromStr;

use crate::value::SqlValue;

/// Prefix that negates the operator following it
pub const NOT: &str = "not";

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equals
    Eq,

    /// Not equals
    Neq,

    /// Greater than
    Gt,

    /// Greater than or equal
    Gte,

    /// Less than
    Lt,

    /// Less than or equal
    Lte,

    /// Pattern match (LIKE), `*` is the wildcard
    Like,

    /// Is null/true/false
    Is,

    /// Value in list
    In,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 9] = [
        FilterOperator::Eq,
        FilterOperator::Neq,
        FilterOperator::Gt,
        FilterOperator::Gte,
        FilterOperator::Lt,
        FilterOperator::Lte,
        FilterOperator::Like,
        FilterOperator::Is,
        FilterOperator::In,
    ];

    /// Get the operator string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Like => "like",
            FilterOperator::Is => "is",
            FilterOperator::In => "in",
        }
    }

    /// SQL comparator for the plain and negated forms.
    ///
    /// `In` has no single comparator and returns `None`.
    pub fn comparator(&self, negated: bool) -> Option<&'static str> {
        let (plain, inverse) = match self {
            FilterOperator::Eq => ("=", "!="),
            FilterOperator::Neq => ("!=", "="),
            FilterOperator::Gt => (">", "<="),
            FilterOperator::Gte => (">=", "<"),
            FilterOperator::Lt => ("<", ">="),
            FilterOperator::Lte => ("<=", ">"),
            FilterOperator::Like => ("LIKE", "NOT LIKE"),
            FilterOperator::Is => ("IS", "IS NOT"),
            FilterOperator::In => return None,
        };
        Some(if negated { inverse } else { plain })
    }
}

impl FromStr for FilterOperator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or(())
    }
}

/// An operator with its optional `not.` prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operator {
    pub kind: FilterOperator,
    pub negated: bool,
}

impl Operator {
    /// Parse an operator token such as `gte` or `not.like`.
    pub fn parse(token: &str) -> Option<Self> {
        let (negated, base) = match token.strip_prefix(NOT).and_then(|r| r.strip_prefix('.')) {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        base.parse()
            .ok()
            .map(|kind| Operator { kind, negated })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "{}.{}", NOT, self.kind.as_str())
        } else {
            f.write_str(self.kind.as_str())
        }
    }
}

/// Split a raw filter value into `(operator, operand)`.
///
/// A leading `not` joins the next token into the operator; everything after
/// the operator is the operand, dots included.
pub fn parse_filter(raw: &str) -> (&str, &str) {
    let Some((first, rest)) = raw.split_once('.') else {
        return (raw, "");
    };

    if first != NOT {
        return (first, rest);
    }

    match rest.split_once('.') {
        Some((op, operand)) => (&raw[..first.len() + 1 + op.len()], operand),
        None => (raw, ""),
    }
}

/// SQL template for a comparison against `column`, with a single `?`.
///
/// Unrecognized operators (and `in`, which is compiled separately) yield an
/// empty template.
pub fn comparison_template(column: &str, operator: &str) -> String {
    Operator::parse(operator)
        .and_then(|op| op.kind.comparator(op.negated))
        .map(|cmp| format!("{} {} ?", column, cmp))
        .unwrap_or_default()
}

/// Rewrite an operand into the bound value for the given operator.
pub fn rectify_operand(kind: FilterOperator, operand: &str) -> SqlValue {
    match kind {
        FilterOperator::Like => SqlValue::Text(operand.replace('*', "%")),
        FilterOperator::Is => match operand.to_ascii_lowercase().as_str() {
            "null" => SqlValue::Null,
            "true" => SqlValue::Boolean(true),
            "false" => SqlValue::Boolean(false),
            _ => SqlValue::Text(operand.to_string()),
        },
        _ => SqlValue::Text(operand.to_string()),
    }
}

/// Split a parenthesized, comma-separated list with CSV quoting.
///
/// `(a,"b,c",d)` yields `a`, `b,c`, `d`. Doubled quotes inside a quoted
/// field stand for one quote. An empty list yields no values.
pub fn parse_list(operand: &str) -> Vec<String> {
    let inner = operand.strip_prefix('(').unwrap_or(operand);
    let inner = inner.strip_suffix(')').unwrap_or(inner);
    if inner.is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut field_start = true;
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if quoted {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    quoted = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' if field_start => {
                quoted = true;
                field_start = false;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                field_start = true;
            }
            _ => {
                field.push(c);
                field_start = false;
            }
        }
    }
    fields.push(field);
    fields
}

/// A compiled WHERE condition
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A single comparison: `template` holds exactly one `?`
    Compare { template: String, value: SqlValue },

    /// Set membership, possibly negated
    Membership {
        column: String,
        negated: bool,
        values: Vec<SqlValue>,
    },
}

impl Condition {
    /// Compile a raw filter value for `column`.
    ///
    /// Returns `None` for operators outside the grammar, including
    /// `or`/`and` groupings, which the caller drops.
    pub fn compile(column: &str, raw: &str) -> Option<Self> {
        let (operator, operand) = parse_filter(raw);
        let op = Operator::parse(operator)?;

        if op.kind == FilterOperator::In {
            let values = parse_list(operand).into_iter().map(SqlValue::Text).collect();
            return Some(Condition::Membership {
                column: column.to_string(),
                negated: op.negated,
                values,
            });
        }

        let template = comparison_template(column, operator);
        if template.is_empty() {
            return None;
        }
        Some(Condition::Compare {
            template,
            value: rectify_operand(op.kind, operand),
        })
    }

    /// Equality used for owner scoping.
    pub fn equals(column: &str, value: SqlValue) -> Self {
        Condition::Compare {
            template: format!("{} = ?", column),
            value,
        }
    }

    /// Render to SQL, appending bound values to `params`.
    pub fn render(self, params: &mut Vec<SqlValue>) -> String {
        match self {
            Condition::Compare { template, value } => {
                params.push(value);
                template
            }
            Condition::Membership {
                column,
                negated,
                values,
            } => {
                if values.is_empty() {
                    // IN () is not valid SQL; an empty set matches nothing.
                    return if negated { "1=1" } else { "1=0" }.to_string();
                }
                let placeholders = vec!["?"; values.len()].join(", ");
                params.extend(values);
                let keyword = if negated { "NOT IN" } else { "IN" };
                format!("{} {} ({})", column, keyword, placeholders)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter("eq.3"), ("eq", "3"));
        assert_eq!(parse_filter("not.eq.90"), ("not.eq", "90"));
        assert_eq!(parse_filter("like.a.b.c"), ("like", "a.b.c"));
        assert_eq!(parse_filter("not.in.(1,2)"), ("not.in", "(1,2)"));
        assert_eq!(parse_filter("eq."), ("eq", ""));
        assert_eq!(parse_filter("eq"), ("eq", ""));
    }

    #[test]
    fn test_comparison_templates() {
        assert_eq!(comparison_template("a", "eq"), "a = ?");
        assert_eq!(comparison_template("a", "neq"), "a != ?");
        assert_eq!(comparison_template("a", "not.neq"), "a = ?");
        assert_eq!(comparison_template("a", "like"), "a LIKE ?");
        assert_eq!(comparison_template("a", "not.is"), "a IS NOT ?");
    }

    #[test]
    fn test_unrecognized_operator_is_empty() {
        assert_eq!(comparison_template("a", "or"), "");
        assert_eq!(comparison_template("a", "between"), "");
        assert_eq!(comparison_template("a", "not"), "");
        assert!(Condition::compile("a", "or.(b.eq.1,c.eq.2)").is_none());
        assert!(Condition::compile("a", "nope.1").is_none());
    }

    #[test]
    fn test_negation_inverts_every_comparator() {
        for kind in FilterOperator::ALL {
            let Some(plain) = kind.comparator(false) else {
                continue;
            };
            let inverse = kind.comparator(true).unwrap();
            let negated = comparison_template("c", &format!("not.{}", kind.as_str()));
            assert_eq!(negated, format!("c {} ?", inverse));
            assert_ne!(plain, inverse);
        }
    }

    #[test]
    fn test_like_rewrites_wildcards() {
        let condition = Condition::compile("name", "like.*son").unwrap();
        assert_eq!(
            condition,
            Condition::Compare {
                template: "name LIKE ?".into(),
                value: SqlValue::Text("%son".into()),
            }
        );
    }

    #[test]
    fn test_is_operands() {
        let mut params = Vec::new();
        let sql = Condition::compile("deleted_at", "is.null")
            .unwrap()
            .render(&mut params);
        assert_eq!(sql, "deleted_at IS ?");
        assert_eq!(params, vec![SqlValue::Null]);

        let mut params = Vec::new();
        Condition::compile("active", "not.is.true")
            .unwrap()
            .render(&mut params);
        assert_eq!(params, vec![SqlValue::Boolean(true)]);
    }

    #[test]
    fn test_in_list() {
        let mut params = Vec::new();
        let sql = Condition::compile("grade", "in.(90,\"8,5\",70)")
            .unwrap()
            .render(&mut params);
        assert_eq!(sql, "grade IN (?, ?, ?)");
        assert_eq!(
            params,
            vec![
                SqlValue::Text("90".into()),
                SqlValue::Text("8,5".into()),
                SqlValue::Text("70".into()),
            ]
        );
    }

    #[test]
    fn test_empty_in_list() {
        let mut params = Vec::new();
        let sql = Condition::compile("grade", "in.()").unwrap().render(&mut params);
        assert_eq!(sql, "1=0");
        assert!(params.is_empty());

        let sql = Condition::compile("grade", "not.in.()")
            .unwrap()
            .render(&mut params);
        assert_eq!(sql, "1=1");
    }

    #[test]
    fn test_parse_list_quoting() {
        assert_eq!(parse_list("(a,b)"), vec!["a", "b"]);
        assert_eq!(parse_list("(\"say \"\"hi\"\"\",x)"), vec!["say \"hi\"", "x"]);
        assert_eq!(parse_list("(a,,b)"), vec!["a", "", "b"]);
        assert!(parse_list("()").is_empty());
    }

    #[test]
    fn test_operator_display() {
        let op = Operator::parse("not.gte").unwrap();
        assert_eq!(op.kind, FilterOperator::Gte);
        assert!(op.negated);
        assert_eq!(op.to_string(), "not.gte");
    }
}
