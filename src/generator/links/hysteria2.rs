use crate::models::ProxyRecord;

use super::common::{escaped_remark, first_non_empty, has_endpoint, QueryParams};

/// Convert a hysteria2 node into `hysteria2://password@server:port?params#remark`
///
/// Certificate skipping is spelled `insecure=1` here, unlike vless and trojan.
pub fn hysteria2_to_link(node: &ProxyRecord) -> String {
    if !has_endpoint(node, &node.password) {
        return String::new();
    }

    let mut params = QueryParams::new();
    params.set_non_empty(
        "sni",
        first_non_empty(&[node.sni.as_str(), node.servername.as_str()]),
    );

    if !node.obfs.is_empty() {
        params.set("obfs", node.obfs.as_str());
        params.set_non_empty("obfs-password", &node.obfs_password);
    }

    if node.skip_cert_verify {
        params.set("insecure", "1");
    }

    params.set_non_empty("fp", &node.client_fingerprint);
    params.set_non_empty("alpn", &node.alpn.join(","));

    format!(
        "hysteria2://{}@{}:{}?{}#{}",
        node.password,
        node.server,
        node.port,
        params.encode(),
        escaped_remark(node)
    )
}
