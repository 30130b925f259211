use base64::{engine::general_purpose, Engine as _};

/// Encodes bytes to padded standard-alphabet Base64.
pub fn base64_encode(input: impl AsRef<[u8]>) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Decodes standard Base64 to text; invalid input gives an empty string.
#[cfg(test)]
pub(crate) fn base64_decode(input: &str) -> String {
    general_purpose::STANDARD
        .decode(input)
        .map(|decoded| String::from_utf8_lossy(&decoded).into_owned())
        .unwrap_or_default()
}
