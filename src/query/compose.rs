use chrono::{DateTime, Utc};

use super::condition::BoolOp;
use super::parser::{parse_field_ranges, parse_field_values};
use crate::search::{Client, Query};
use crate::{Error, Result};

/// Query expressions as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    pub raw: Option<String>,
    /// `field=term;field=term`
    pub terms: Option<String>,
    /// `field=prefix;field=prefix`
    pub prefixes: Option<String>,
    /// `field=from~to;...`
    pub ranges: Option<String>,
}

/// Build the leaf queries described by `spec`, in the order raw, terms,
/// prefixes, ranges.
pub fn build_queries(client: &Client, spec: &QuerySpec) -> Result<Vec<Query>> {
    let mut queries = Vec::new();

    if let Some(raw) = given(&spec.raw) {
        queries.push(client.raw_query(raw));
    }
    if let Some(terms) = given(&spec.terms) {
        for term in parse_field_values(terms, "term")? {
            queries.push(client.term_query(term.field, term.value));
        }
    }
    if let Some(prefixes) = given(&spec.prefixes) {
        for prefix in parse_field_values(prefixes, "prefix")? {
            queries.push(client.prefix_query(prefix.field, prefix.value));
        }
    }
    if let Some(ranges) = given(&spec.ranges) {
        for range in parse_field_ranges(ranges)? {
            queries.push(client.range_query(
                range.field,
                range.from.map(Into::into),
                range.to.map(Into::into),
            ));
        }
    }

    Ok(queries)
}

/// Range filter on the timestamp field, or `None` when neither bound is set.
pub fn time_range_query(
    client: &Client,
    time_field: &str,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Option<Query> {
    if from.is_none() && to.is_none() {
        return None;
    }
    Some(client.range_query(time_field, from.map(Into::into), to.map(Into::into)))
}

/// Combine the leaf queries with `op` and AND the time filter on top. A
/// single query is used as-is rather than wrapped in a one-clause bool.
pub fn compose(
    client: &Client,
    mut queries: Vec<Query>,
    op: BoolOp,
    time_range: Option<Query>,
) -> Result<Query> {
    let combined = match queries.len() {
        0 => return Err(Error::Validation("No queries specified".to_string())),
        1 => queries.remove(0),
        _ => client.bool_query(op, &queries)?,
    };

    match time_range {
        Some(range) => client.and_query(&[combined, range]),
        None => Ok(combined),
    }
}

fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
