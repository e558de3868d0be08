use chrono::{DateTime, Utc};
use nom::{
    IResult, Parser,
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::{all_consuming, rest},
    sequence::separated_pair,
};

use crate::{Error, Result};

/// `field=value`, as used by term and prefix queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub field: String,
    pub value: String,
}

/// `field=from~to`. An empty side is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRange {
    pub field: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Parse a semicolon-separated list of `field=value` expressions.
pub fn parse_field_values(input: &str, kind: &str) -> Result<Vec<FieldValue>> {
    input
        .split(';')
        .map(|item| match all_consuming(field_value).parse(item) {
            Ok((_, (field, value))) => Ok(FieldValue {
                field: field.to_string(),
                value: value.to_string(),
            }),
            Err(_) => Err(Error::Validation(format!("Invalid {kind} query {item:?}"))),
        })
        .collect()
}

/// Parse a semicolon-separated list of `field=from~to` expressions.
pub fn parse_field_ranges(input: &str) -> Result<Vec<FieldRange>> {
    input
        .split(';')
        .map(|item| match all_consuming(field_range).parse(item) {
            Ok((_, (field, (from, to)))) => Ok(FieldRange {
                field: field.to_string(),
                from: non_empty(from),
                to: non_empty(to),
            }),
            Err(_) => Err(Error::Validation(format!("Invalid range query {item:?}"))),
        })
        .collect()
}

/// Parse an RFC3339 timestamp into UTC.
pub fn parse_time(input: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::Validation(format!("Invalid time {input:?}")))
}

fn field_value(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(field_name, char('='), rest).parse(input)
}

fn field_range(input: &str) -> IResult<&str, (&str, (&str, &str))> {
    separated_pair(field_name, char('='), range_bounds).parse(input)
}

fn range_bounds(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(take_while(|c: char| c != '~'), char('~'), rest).parse(input)
}

fn field_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != '=')(input)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
