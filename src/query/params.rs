//! # Query Parameter Parser
//!
//! Splits a request's query pairs into the reserved keys (`select`, `order`,
//! `limit`, `offset`) and per-column filters. Nothing here knows about table
//! columns; validation against the schema happens in the assemblers.

/// Keys that never name a filter column
pub const RESERVED_KEYS: [&str; 4] = ["select", "order", "limit", "offset"];

/// Sort direction; descending unless a column asks for `asc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Order by clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

/// A `column=<filter>` pair, still unparsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParam {
    pub column: String,
    pub raw: String,
}

/// Parsed query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    /// Requested projection, empty means every column
    pub select: Vec<String>,

    /// Order by clauses
    pub order: Vec<OrderBy>,

    /// Row cap; `None` when absent, non-numeric, negative or zero
    pub limit: Option<u64>,

    /// Rows to skip, only meaningful alongside a limit
    pub offset: u64,

    /// Filters in request order
    pub filters: Vec<FilterParam>,
}

impl QueryParams {
    /// Parse query pairs in request order.
    ///
    /// For reserved keys the first occurrence wins. Every other key is a
    /// filter, repeated keys included.
    pub fn parse<K, V>(pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k.as_ref() == key)
                .map(|(_, v)| v.as_ref())
        };

        let limit = first("limit").and_then(parse_limit);
        let offset = match limit {
            Some(_) => first("offset").map(parse_offset).unwrap_or(0),
            None => 0,
        };

        let filters = pairs
            .iter()
            .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_ref()))
            .map(|(k, v)| FilterParam {
                column: k.as_ref().to_string(),
                raw: v.as_ref().to_string(),
            })
            .collect();

        QueryParams {
            select: first("select").map(parse_select).unwrap_or_default(),
            order: first("order").map(parse_order).unwrap_or_default(),
            limit,
            offset,
            filters,
        }
    }
}

/// Parse select parameter (comma-separated column list)
fn parse_select(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse order parameter (comma-separated `column[.asc|.desc]`)
fn parse_order(value: &str) -> Vec<OrderBy> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('.') {
            Some((column, direction)) => OrderBy {
                column: column.to_string(),
                direction: if direction.eq_ignore_ascii_case("asc") {
                    Direction::Asc
                } else {
                    Direction::Desc
                },
            },
            None => OrderBy {
                column: part.to_string(),
                direction: Direction::Desc,
            },
        })
        .collect()
}

/// Parse limit parameter; anything but a positive integer disables limiting
fn parse_limit(value: &str) -> Option<u64> {
    value.trim().parse::<i64>().ok().filter(|n| *n > 0).map(|n| n as u64)
}

/// Parse offset parameter; malformed or negative offsets become zero
fn parse_offset(value: &str) -> u64 {
    value.trim().parse::<i64>().ok().filter(|n| *n > 0).map(|n| n as u64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(pairs: &[(&str, &str)]) -> QueryParams {
        QueryParams::parse(pairs)
    }

    #[test]
    fn test_parse_select() {
        assert_eq!(parse_select("id,name,email"), vec!["id", "name", "email"]);
        assert!(parse_select("").is_empty());
    }

    #[test]
    fn test_parse_order_defaults_to_desc() {
        let orders = parse_order("grade.asc,student_id");
        assert_eq!(
            orders,
            vec![
                OrderBy { column: "grade".into(), direction: Direction::Asc },
                OrderBy { column: "student_id".into(), direction: Direction::Desc },
            ]
        );

        let orders = parse_order("name.sideways");
        assert_eq!(orders[0].direction, Direction::Desc);
    }

    #[test]
    fn test_limit_coercion() {
        assert_eq!(parse(&[("limit", "10")]).limit, Some(10));
        assert_eq!(parse(&[("limit", "-1")]).limit, None);
        assert_eq!(parse(&[("limit", "0")]).limit, None);
        assert_eq!(parse(&[("limit", "ten")]).limit, None);
    }

    #[test]
    fn test_offset_requires_limit() {
        let query = parse(&[("limit", "5"), ("offset", "20")]);
        assert_eq!(query.offset, 20);

        let query = parse(&[("offset", "20")]);
        assert_eq!(query.offset, 0);

        let query = parse(&[("limit", "5"), ("offset", "-3")]);
        assert_eq!(query.offset, 0);
    }

    #[test]
    fn test_first_reserved_value_wins() {
        let query = parse(&[("select", "a"), ("select", "b"), ("limit", "3"), ("limit", "9")]);
        assert_eq!(query.select, vec!["a"]);
        assert_eq!(query.limit, Some(3));
    }

    #[test]
    fn test_filters_keep_request_order() {
        let query = parse(&[
            ("grade", "gte.90"),
            ("select", "name"),
            ("student_id", "eq.2"),
            ("grade", "lt.100"),
        ]);
        let columns: Vec<_> = query.filters.iter().map(|f| f.column.as_str()).collect();
        assert_eq!(columns, vec!["grade", "student_id", "grade"]);
        assert_eq!(query.filters[0].raw, "gte.90");
    }
}
