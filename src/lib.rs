pub mod error;
pub mod logging;
pub mod query;
pub mod search;

pub use error::{Error, Result, Stage};
pub use query::{
    BoolOp, QueryNode, QueryOpt, QueryOptions, QuerySpec, RangeValue, build_queries, compose,
    time_range_query,
};
pub use search::{
    Backend, Client, ProtocolVersion, Query, SearchResult, get_server_version,
    get_server_version_with, select_protocol, with_deadline,
};
