use crate::models::ProxyRecord;
use crate::utils::base64::base64_encode;

use super::common::{escaped_remark, first_non_empty, has_endpoint};

pub const DEFAULT_SS_CIPHER: &str = "aes-256-gcm";

/// Convert a shadowsocks node into `ss://BASE64(cipher:password)@server:port#remark`
pub fn ss_to_link(node: &ProxyRecord) -> String {
    if !has_endpoint(node, &node.password) {
        return String::new();
    }

    let cipher = first_non_empty(&[node.cipher.as_str(), DEFAULT_SS_CIPHER]);
    let user_info = base64_encode(format!("{}:{}", cipher, node.password));

    format!(
        "ss://{}@{}:{}#{}",
        user_info,
        node.server,
        node.port,
        escaped_remark(node)
    )
}
