//! Share-link codec
//!
//! Turns node records into the `scheme://...` links understood by v2ray-style
//! clients. Nodes whose protocol has no link form, or that lack the fields a
//! link needs, encode to an empty string and are left out of link lists.

mod common;
mod hysteria2;
mod ss;
mod trojan;
mod vless;
mod vmess;

pub use common::strip_flag_emoji;
pub use hysteria2::hysteria2_to_link;
pub use ss::{ss_to_link, DEFAULT_SS_CIPHER};
pub use trojan::trojan_to_link;
pub use vless::vless_to_link;
pub use vmess::vmess_to_link;

use crate::models::{ProxyRecord, ProxyType};

/// Convert a node to its share link, or an empty string when it has none
pub fn proxy_to_uri(node: &ProxyRecord) -> String {
    match node.proxy_type() {
        ProxyType::VMess => vmess_to_link(node),
        ProxyType::Vless => vless_to_link(node),
        ProxyType::Shadowsocks => ss_to_link(node),
        ProxyType::Trojan => trojan_to_link(node),
        ProxyType::Hysteria2 => hysteria2_to_link(node),
        ProxyType::Unknown => String::new(),
    }
}

/// Convert nodes to share links, skipping the ones that do not encode
pub fn proxy_to_links(nodes: &[ProxyRecord]) -> Vec<String> {
    nodes
        .iter()
        .map(proxy_to_uri)
        .filter(|link| !link.is_empty())
        .collect()
}

/// Newline-joined link list, as written to `v2ray.txt`
pub fn proxy_to_single(nodes: &[ProxyRecord]) -> String {
    proxy_to_links(nodes).join("\n")
}
