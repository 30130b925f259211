use std::collections::BTreeMap;

use crate::models::ProxyRecord;
use crate::utils::base64::base64_encode;

use super::common::{first_non_empty, has_endpoint, strip_flag_emoji};

/// Convert a vmess node into `vmess://BASE64(JSON)`
///
/// Keys whose value is empty or `"0"` are left out of the JSON object.
pub fn vmess_to_link(node: &ProxyRecord) -> String {
    if !has_endpoint(node, &node.uuid) {
        return String::new();
    }

    let alter_id = node.alter_id.to_string();
    let alpn = node.alpn.join(",");
    let tls = if node.tls_enabled { "tls" } else { "" };
    let remark = strip_flag_emoji(&node.name);

    let fields: [(&str, &str); 15] = [
        ("v", "2"),
        ("ps", remark.as_str()),
        ("add", node.server.as_str()),
        ("port", node.port.as_str()),
        ("id", node.uuid.as_str()),
        ("aid", alter_id.as_str()),
        ("scy", node.cipher.as_str()),
        ("net", node.network.as_str()),
        // consumers of these links expect the protocol tag in this slot
        ("type", node.type_tag.as_str()),
        ("host", node.ws_host.as_str()),
        ("path", node.ws_path.as_str()),
        ("tls", tls),
        (
            "sni",
            first_non_empty(&[node.servername.as_str(), node.sni.as_str()]),
        ),
        ("alpn", alpn.as_str()),
        ("fp", node.client_fingerprint.as_str()),
    ];

    let config: BTreeMap<&str, &str> = fields
        .into_iter()
        .filter(|(_, value)| !value.is_empty() && *value != "0")
        .collect();

    match serde_json::to_string(&config) {
        Ok(json) => format!("vmess://{}", base64_encode(json)),
        Err(_) => String::new(),
    }
}
