use crate::models::ProxyRecord;

use super::common::{escaped_remark, first_non_empty, has_endpoint, QueryParams};

/// Convert a vless node into `vless://uuid@server:port?params#remark`
pub fn vless_to_link(node: &ProxyRecord) -> String {
    if !has_endpoint(node, &node.uuid) {
        return String::new();
    }

    let mut params = QueryParams::new();
    params.set("encryption", "none");
    params.set_non_empty("flow", &node.flow);
    params.set_non_empty("type", &node.network);

    let security = if node.tls.is_empty() && node.tls_enabled {
        "tls"
    } else {
        node.tls.as_str()
    };
    params.set_non_empty("security", security);
    params.set_non_empty(
        "sni",
        first_non_empty(&[node.servername.as_str(), node.sni.as_str()]),
    );
    params.set_non_empty("fp", &node.client_fingerprint);
    params.set_non_empty("alpn", &node.alpn.join(","));

    if node.skip_cert_verify {
        params.set("allowInsecure", "1");
    }

    if node.network == "ws" {
        params.set_non_empty("host", &node.ws_host);
        params.set_non_empty("path", &node.ws_path);
    }

    format!(
        "vless://{}@{}:{}?{}#{}",
        node.uuid,
        node.server,
        node.port,
        params.encode(),
        escaped_remark(node)
    )
}
