use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subsave::generator::{proxy_to_links, proxy_to_uri};
use subsave::parser::parse_node_yaml;
use subsave::ProxyRecord;

fn record(yaml: &str) -> ProxyRecord {
    serde_yaml::from_str(yaml).unwrap()
}

#[cfg(test)]
mod codec_tests {
    use super::*;

    #[test]
    fn test_missing_server_encodes_to_nothing() {
        for kind in ["vmess", "vless", "ss", "shadowsocks", "trojan", "hysteria2", "hy2"] {
            let node = record(&format!(
                "{{name: n, type: {}, port: 443, uuid: u-1, password: pw, cipher: aes-128-gcm}}",
                kind
            ));
            assert_eq!(proxy_to_uri(&node), "", "{} without server", kind);
        }
    }

    #[test]
    fn test_vmess_payload_drops_empty_and_zero() {
        let node = record(
            r#"
name: "🇭🇰HK 01"
type: vmess
server: hk.example.com
port: 443
uuid: 6b3a2f1e-0000-4000-8000-000000000001
alterId: 0
cipher: auto
network: ws
tls: true
servername: hk.example.com
ws-opts:
  path: /ray
"#,
        );
        let link = proxy_to_uri(&node);
        let payload = link.strip_prefix("vmess://").unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&STANDARD.decode(payload).unwrap()).unwrap();
        let object = json.as_object().unwrap();

        assert!(object.values().all(|v| v != "" && v != "0"));
        assert!(!object.contains_key("aid"));
        assert_eq!(object["ps"], "HK 01");
        assert_eq!(object["port"], "443");
        assert_eq!(object["tls"], "tls");
        assert_eq!(object["path"], "/ray");
    }

    #[test]
    fn test_ss_default_cipher() {
        let link = proxy_to_uri(&record(
            "{name: a, type: ss, server: 1.2.3.4, port: 8388, password: pw}",
        ));
        let userinfo = link
            .strip_prefix("ss://")
            .and_then(|rest| rest.split('@').next())
            .unwrap();
        assert_eq!(STANDARD.decode(userinfo).unwrap(), b"aes-256-gcm:pw");
    }

    #[test]
    fn test_insecure_flag_names_differ_per_protocol() {
        let base = "server: h.example, port: 443, uuid: u-1, password: pw, skip-cert-verify: true";
        let hy2 = proxy_to_uri(&record(&format!("{{name: a, type: hysteria2, {}}}", base)));
        let vless = proxy_to_uri(&record(&format!("{{name: a, type: vless, {}}}", base)));
        let trojan = proxy_to_uri(&record(&format!("{{name: a, type: trojan, {}}}", base)));

        assert!(hy2.contains("insecure=1"));
        assert!(!hy2.contains("allowInsecure"));
        assert!(vless.contains("allowInsecure=1"));
        assert!(trojan.contains("allowInsecure=1"));
    }

    #[test]
    fn test_unknown_protocol_is_not_counted() {
        let document = parse_node_yaml(
            r#"
proxies:
  - {name: a, type: trojan, server: t.example, port: 443, password: pw}
  - {name: b, type: wireguard, server: 5.6.7.8, port: 51820, private-key: k}
  - {name: c, type: hy2, server: h.example, port: "8443", password: pw}
"#,
        )
        .unwrap();
        let links = proxy_to_links(&document.proxies);
        assert_eq!(links.len(), 2);
        assert!(links[0].starts_with("trojan://pw@t.example:443?"));
        assert!(links[1].starts_with("hysteria2://pw@h.example:8443?"));
    }
}
