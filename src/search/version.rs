use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::transport::HttpTransport;
use crate::error::{Error, Result, Stage};

#[derive(Debug, Deserialize)]
struct NodesInfo {
    #[serde(default)]
    nodes: BTreeMap<String, NodeInfo>,
}

#[derive(Debug, Deserialize)]
struct NodeInfo {
    #[serde(default)]
    version: String,
}

/// Ask the server at `base_url` which version it runs.
pub async fn get_server_version(base_url: &str) -> Result<String> {
    get_server_version_with(&reqwest::Client::new(), base_url).await
}

/// Same as [`get_server_version`], on a caller-provided HTTP client.
pub async fn get_server_version_with(http: &reqwest::Client, base_url: &str) -> Result<String> {
    let transport = HttpTransport::with_client(http.clone(), base_url)?;
    let info: NodesInfo = transport
        .get_json(Stage::Probe, &["_nodes", "_all", "version"])
        .await?;

    debug!("Server reported {} node(s)", info.nodes.len());

    first_version(&info)
        .ok_or_else(|| Error::protocol(Stage::Probe, "could not find version in server response"))
}

/// Nodes are visited in id order so the answer does not depend on map order.
fn first_version(info: &NodesInfo) -> Option<String> {
    info.nodes
        .values()
        .map(|node| node.version.as_str())
        .find(|version| !version.is_empty())
        .map(str::to_string)
}
