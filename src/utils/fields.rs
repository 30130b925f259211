//! Lenient field access over raw YAML mappings
//!
//! Node records arrive as loosely typed YAML. These helpers pull typed values
//! out of a mapping without ever failing: a missing key or a value of the
//! wrong shape simply yields the zero value of the requested type.

use serde_yaml::{Mapping, Value};

fn lookup<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(Value::String(key.to_string()))
}

/// Returns the first string value found among `keys`, or an empty string.
///
/// Keys are tried in order; a key holding a non-string value is skipped.
pub fn get_string(map: &Mapping, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| lookup(map, key))
        .find_map(|value| value.as_str())
        .map(str::to_string)
        .unwrap_or_default()
}

/// Walks nested mappings along `path` and returns the string at the end.
///
/// Any missing hop or non-mapping intermediate value yields an empty string.
pub fn get_nested_string(map: &Mapping, path: &[&str]) -> String {
    let Some((last, parents)) = path.split_last() else {
        return String::new();
    };

    let mut current = map;
    for key in parents {
        match lookup(current, key) {
            Some(Value::Mapping(nested)) => current = nested,
            _ => return String::new(),
        }
    }

    get_string(current, &[last])
}

/// Reads an integer, accepting integers, floats and numeric strings.
pub fn get_int(map: &Mapping, key: &str) -> i64 {
    match lookup(map, key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|v| v as i64))
            .or_else(|| n.as_f64().map(|v| v as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .or_else(|_| s.trim().parse::<f64>().map(|v| v as i64))
            .unwrap_or(0),
        _ => 0,
    }
}

/// Reads a boolean, accepting real booleans and `true`/`false`/`1`/`0` strings.
pub fn get_bool(map: &Mapping, key: &str) -> bool {
    match lookup(map, key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}

/// Reads a port that may be written either as a number or as a string.
///
/// Returns an empty string when the field is absent or blank.
pub fn get_port(map: &Mapping, key: &str) -> String {
    match lookup(map, key) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    }
}

/// Collects the string items of a sequence field, skipping anything else.
pub fn get_string_list(map: &Mapping, key: &str) -> Vec<String> {
    match lookup(map, key) {
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_get_string_fallback_order() {
        let map = mapping("sni: b.example\nservername: a.example\n");
        assert_eq!(get_string(&map, &["servername", "sni"]), "a.example");
        assert_eq!(get_string(&map, &["sni", "servername"]), "b.example");
        assert_eq!(get_string(&map, &["missing"]), "");
    }

    #[test]
    fn test_get_string_skips_non_string() {
        let map = mapping("tls: true\nsni: host\n");
        assert_eq!(get_string(&map, &["tls"]), "");
        assert_eq!(get_string(&map, &["tls", "sni"]), "host");
    }

    #[test]
    fn test_get_nested_string() {
        let map = mapping(
            r#"
ws-opts:
  path: /ws
  headers:
    Host: cdn.example
"#,
        );
        assert_eq!(get_nested_string(&map, &["ws-opts", "path"]), "/ws");
        assert_eq!(
            get_nested_string(&map, &["ws-opts", "headers", "Host"]),
            "cdn.example"
        );
        assert_eq!(get_nested_string(&map, &["ws-opts", "headers", "X"]), "");
        assert_eq!(get_nested_string(&map, &["ws-opts", "path", "deeper"]), "");
        assert_eq!(get_nested_string(&map, &[]), "");
    }

    #[test]
    fn test_get_int_and_bool_coercion() {
        let map = mapping("a: 4\nb: \"7\"\nc: 2.0\nd: x\ne: \"true\"\nf: false\ng: 1\n");
        assert_eq!(get_int(&map, "a"), 4);
        assert_eq!(get_int(&map, "b"), 7);
        assert_eq!(get_int(&map, "c"), 2);
        assert_eq!(get_int(&map, "d"), 0);
        assert_eq!(get_int(&map, "zz"), 0);
        assert!(get_bool(&map, "e"));
        assert!(!get_bool(&map, "f"));
        assert!(get_bool(&map, "g"));
        assert!(!get_bool(&map, "zz"));
    }

    #[test]
    fn test_get_port_and_list() {
        let map = mapping("port: 443\nport2: \"8443\"\nalpn: [h2, 5, http/1.1]\n");
        assert_eq!(get_port(&map, "port"), "443");
        assert_eq!(get_port(&map, "port2"), "8443");
        assert_eq!(get_port(&map, "port3"), "");
        assert_eq!(get_string_list(&map, "alpn"), vec!["h2", "http/1.1"]);
    }
}
