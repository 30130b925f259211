use crate::models::ProxyRecord;

use super::common::{escaped_remark, first_non_empty, has_endpoint, QueryParams};

/// Convert a trojan node into `trojan://password@server:port?params#remark`
pub fn trojan_to_link(node: &ProxyRecord) -> String {
    if !has_endpoint(node, &node.password) {
        return String::new();
    }

    let mut params = QueryParams::new();
    params.set("security", "tls");
    params.set_non_empty(
        "sni",
        first_non_empty(&[node.sni.as_str(), node.servername.as_str()]),
    );
    params.set_non_empty("fp", &node.client_fingerprint);
    params.set_non_empty("alpn", &node.alpn.join(","));
    params.set("type", first_non_empty(&[node.network.as_str(), "tcp"]));

    if node.skip_cert_verify {
        params.set("allowInsecure", "1");
    }

    format!(
        "trojan://{}@{}:{}?{}#{}",
        node.password,
        node.server,
        node.port,
        params.encode(),
        escaped_remark(node)
    )
}
