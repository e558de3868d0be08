pub mod backend;
pub mod client;
pub mod deadline;
pub mod result;
pub mod transport;
pub mod v2;
pub mod v6;
pub mod version;

pub use backend::{Backend, ProtocolVersion, select_protocol};
pub use client::{Client, Query};
pub use deadline::with_deadline;
pub use result::SearchResult;
pub use version::{get_server_version, get_server_version_with};
