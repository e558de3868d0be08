use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// How the children of a boolean query are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolOp::And => write!(f, "AND"),
            BoolOp::Or => write!(f, "OR"),
        }
    }
}

/// One side of a range query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeValue {
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl RangeValue {
    /// The JSON form sent to the server. Timestamps use RFC3339 with
    /// millisecond precision, which every supported server version accepts
    /// for date fields.
    pub fn to_json(&self) -> Value {
        match self {
            RangeValue::Text(text) => Value::String(text.clone()),
            RangeValue::Timestamp(ts) => {
                Value::String(ts.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
        }
    }
}

impl From<&str> for RangeValue {
    fn from(value: &str) -> Self {
        RangeValue::Text(value.to_string())
    }
}

impl From<String> for RangeValue {
    fn from(value: String) -> Self {
        RangeValue::Text(value)
    }
}

impl From<DateTime<Utc>> for RangeValue {
    fn from(value: DateTime<Utc>) -> Self {
        RangeValue::Timestamp(value)
    }
}

/// Version-independent query tree.
///
/// Children of a `Bool` node are shared with the queries they were built
/// from, so a leaf can be reused in several composites.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    Raw {
        query: String,
    },
    Term {
        field: String,
        value: String,
    },
    Prefix {
        field: String,
        value: String,
    },
    Range {
        field: String,
        from: Option<RangeValue>,
        to: Option<RangeValue>,
    },
    Bool {
        op: BoolOp,
        queries: Vec<Arc<QueryNode>>,
    },
}

impl QueryNode {
    pub fn is_leaf(&self) -> bool {
        !matches!(self, QueryNode::Bool { .. })
    }

    /// Check every leaf names a field. Bool nodes are checked recursively.
    pub fn validate(&self) -> crate::Result<()> {
        match self {
            QueryNode::Raw { .. } => Ok(()),
            QueryNode::Term { field, .. } => require_field("term", field),
            QueryNode::Prefix { field, .. } => require_field("prefix", field),
            QueryNode::Range { field, .. } => require_field("range", field),
            QueryNode::Bool { queries, .. } => queries.iter().try_for_each(|q| q.validate()),
        }
    }

    /// Number of leaf queries in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            QueryNode::Bool { queries, .. } => queries.iter().map(|q| q.leaf_count()).sum(),
            _ => 1,
        }
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryNode::Raw { query } => write!(f, "raw({query})"),
            QueryNode::Term { field, value } => write!(f, "{field}={value}"),
            QueryNode::Prefix { field, value } => write!(f, "{field}={value}*"),
            QueryNode::Range { field, from, to } => {
                let show = |bound: &Option<RangeValue>| match bound {
                    Some(RangeValue::Text(text)) => text.clone(),
                    Some(RangeValue::Timestamp(ts)) => ts.to_rfc3339(),
                    None => String::new(),
                };
                write!(f, "{field}=[{}~{}]", show(from), show(to))
            }
            QueryNode::Bool { op, queries } => {
                write!(f, "(")?;
                for (i, query) in queries.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {op} ")?;
                    }
                    write!(f, "{query}")?;
                }
                write!(f, ")")
            }
        }
    }
}

fn require_field(kind: &str, field: &str) -> crate::Result<()> {
    if field.is_empty() {
        return Err(crate::Error::Validation(format!(
            "{kind} query has an empty field name"
        )));
    }
    Ok(())
}

/// Parse the body of a raw query. Raw queries are accepted as-is when built,
/// so this is the first point their JSON is looked at.
pub(crate) fn parse_raw(query: &str) -> crate::Result<Value> {
    serde_json::from_str(query)
        .map_err(|e| crate::Error::Validation(format!("raw query is not valid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn term(field: &str, value: &str) -> Arc<QueryNode> {
        Arc::new(QueryNode::Term {
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    #[test]
    fn test_timestamp_bound_serialization() {
        let ts = Utc.with_ymd_and_hms(2018, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            RangeValue::from(ts).to_json(),
            Value::String("2018-03-01T12:30:00.000Z".to_string())
        );
        assert_eq!(
            RangeValue::from("now-1d").to_json(),
            Value::String("now-1d".to_string())
        );
    }

    #[test]
    fn test_leaf_count_nested() {
        let inner = Arc::new(QueryNode::Bool {
            op: BoolOp::Or,
            queries: vec![term("a", "1"), term("b", "2")],
        });
        let outer = QueryNode::Bool {
            op: BoolOp::And,
            queries: vec![inner, term("c", "3")],
        };

        assert_eq!(outer.leaf_count(), 3);
        assert!(!outer.is_leaf());
        assert!(term("a", "1").is_leaf());
    }

    #[test]
    fn test_display() {
        let node = QueryNode::Bool {
            op: BoolOp::And,
            queries: vec![
                term("host", "web-1"),
                Arc::new(QueryNode::Range {
                    field: "bytes".to_string(),
                    from: Some("10".into()),
                    to: None,
                }),
            ],
        };
        assert_eq!(node.to_string(), "(host=web-1 AND bytes=[10~])");
    }

    #[test]
    fn test_empty_field_is_invalid_for_every_leaf() {
        let leaves = [
            QueryNode::Term {
                field: String::new(),
                value: "x".to_string(),
            },
            QueryNode::Prefix {
                field: String::new(),
                value: "x".to_string(),
            },
            QueryNode::Range {
                field: String::new(),
                from: Some("1".into()),
                to: None,
            },
        ];

        for leaf in leaves {
            assert!(matches!(leaf.validate(), Err(crate::Error::Validation(_))));
        }
        assert!(term("host", "web-1").validate().is_ok());
    }

    #[test]
    fn test_empty_field_inside_bool_is_invalid() {
        let node = QueryNode::Bool {
            op: BoolOp::Or,
            queries: vec![term("host", "web-1"), term("", "web-2")],
        };
        assert!(matches!(node.validate(), Err(crate::Error::Validation(_))));
    }

    #[test]
    fn test_parse_raw_rejects_garbage() {
        assert!(parse_raw(r#"{"match_all":{}}"#).is_ok());
        assert!(matches!(
            parse_raw("{not json"),
            Err(crate::Error::Validation(_))
        ));
    }
}
