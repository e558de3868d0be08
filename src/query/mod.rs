pub mod compose;
pub mod condition;
pub mod options;
pub mod parser;

pub use compose::{QuerySpec, build_queries, compose, time_range_query};
pub use condition::{BoolOp, QueryNode, RangeValue};
pub use options::{QueryOpt, QueryOptions, query_opts_from_flags};
pub use parser::{parse_field_ranges, parse_field_values, parse_time};
