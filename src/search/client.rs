use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::debug;

use super::backend::{Backend, ProtocolVersion, select_protocol};
use super::deadline::with_deadline;
use super::result::SearchResult;
use crate::error::{Error, Result, Stage};
use crate::query::{BoolOp, QueryNode, QueryOptions, RangeValue};

/// Version-independent client bound to one server.
///
/// Queries built by a client remember it and can only be combined with
/// other queries from the same client.
#[derive(Clone)]
pub struct Client {
    backend: Arc<dyn Backend>,
}

impl Client {
    /// Client for a known protocol version.
    pub fn new(protocol: ProtocolVersion, base_url: &str) -> Result<Self> {
        Ok(Self::with_backend(protocol.connect(base_url)?))
    }

    /// Client for the backend matching a version string reported by the
    /// server, see [`crate::get_server_version`].
    pub fn for_version(version: &str, base_url: &str) -> Result<Self> {
        Self::new(select_protocol(version)?, base_url)
    }

    pub fn with_backend(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn protocol(&self) -> ProtocolVersion {
        self.backend.protocol()
    }

    /// A query document in the server's own DSL, passed through unchanged.
    /// It is not parsed until the query runs.
    pub fn raw_query(&self, query: impl Into<String>) -> Query {
        self.leaf(QueryNode::Raw {
            query: query.into(),
        })
    }

    pub fn term_query(&self, field: impl Into<String>, value: impl Into<String>) -> Query {
        self.leaf(QueryNode::Term {
            field: field.into(),
            value: value.into(),
        })
    }

    pub fn prefix_query(&self, field: impl Into<String>, prefix: impl Into<String>) -> Query {
        self.leaf(QueryNode::Prefix {
            field: field.into(),
            value: prefix.into(),
        })
    }

    /// Inclusive range; `None` leaves that side open.
    pub fn range_query(
        &self,
        field: impl Into<String>,
        from: Option<RangeValue>,
        to: Option<RangeValue>,
    ) -> Query {
        self.leaf(QueryNode::Range {
            field: field.into(),
            from,
            to,
        })
    }

    /// All of `queries` must match.
    pub fn and_query(&self, queries: &[Query]) -> Result<Query> {
        self.bool_query(BoolOp::And, queries)
    }

    /// At least one of `queries` must match.
    pub fn or_query(&self, queries: &[Query]) -> Result<Query> {
        self.bool_query(BoolOp::Or, queries)
    }

    pub fn bool_query(&self, op: BoolOp, queries: &[Query]) -> Result<Query> {
        if queries.is_empty() {
            return Err(Error::Validation(format!(
                "{op} query needs at least one sub-query"
            )));
        }
        if let Some(foreign) = queries.iter().find(|q| !self.owns(q)) {
            return Err(Error::Validation(format!(
                "sub-query {} belongs to a different client ({})",
                foreign.node,
                foreign.backend.protocol()
            )));
        }

        Ok(self.leaf(QueryNode::Bool {
            op,
            queries: queries.iter().map(|q| Arc::clone(&q.node)).collect(),
        }))
    }

    fn owns(&self, query: &Query) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.backend), Arc::as_ptr(&query.backend))
    }

    fn leaf(&self, node: QueryNode) -> Query {
        Query {
            backend: Arc::clone(&self.backend),
            node: Arc::new(node),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("backend", &self.backend)
            .finish()
    }
}

/// An immutable query, ready to run against an index.
#[derive(Clone)]
pub struct Query {
    backend: Arc<dyn Backend>,
    node: Arc<QueryNode>,
}

impl Query {
    pub fn node(&self) -> &QueryNode {
        &self.node
    }

    pub fn protocol(&self) -> ProtocolVersion {
        self.backend.protocol()
    }

    /// The exact body [`Query::execute`] sends for these options.
    pub fn request_body(&self, options: &QueryOptions) -> Result<Value> {
        options.validate()?;
        self.node.validate()?;
        self.backend.search_body(&self.node, options)
    }

    /// Search `index`, giving up with [`Error::Timeout`] once `deadline`
    /// passes. No request is sent when the deadline has already passed.
    pub async fn execute(
        &self,
        index: &str,
        options: &QueryOptions,
        deadline: Instant,
    ) -> Result<SearchResult> {
        with_deadline(Stage::Execute, deadline, async {
            let body = self.request_body(options)?;
            debug!(
                "Searching {} on {} backend: {}",
                index,
                self.backend.protocol(),
                self.node
            );
            let result = self.backend.search(index, &body).await?;
            debug!(
                "Search matched {} document(s), returned {}",
                result.total_hits,
                result.raw_documents.len()
            );
            Ok::<_, Error>(result)
        })
        .await
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("protocol", &self.backend.protocol())
            .field("node", &self.node)
            .finish()
    }
}
