//! S3 compatible object storage, signed with AWS Signature Version 4

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use log::info;
use sha2::{Digest, Sha256};

use crate::settings::Settings;
use crate::utils::http::build_client;
use crate::utils::url::url_encode;

use super::{
    check_response, content_type_for, network_error, Persist, SaveMethod, StorageError,
    UPLOAD_TIMEOUT,
};

type HmacSha256 = Hmac<Sha256>;

const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

#[derive(Debug, Clone, PartialEq)]
pub struct S3Config {
    /// `host[:port]`, without scheme
    pub endpoint: String,
    pub access_id: String,
    pub secret_key: String,
    pub bucket: String,
    pub use_ssl: bool,
    /// Virtual-hosted style (`bucket.endpoint`) instead of path style
    pub virtual_host: bool,
    pub region: String,
}

impl S3Config {
    pub fn from_settings(settings: &Settings) -> Result<Self, StorageError> {
        let mut missing = Vec::new();
        if settings.s3_endpoint.is_empty() {
            missing.push("s3-endpoint");
        }
        if settings.s3_access_id.is_empty() {
            missing.push("s3-access-id");
        }
        if settings.s3_secret_key.is_empty() {
            missing.push("s3-secret-key");
        }
        if settings.s3_bucket.is_empty() {
            missing.push("s3-bucket");
        }
        if !missing.is_empty() {
            return Err(StorageError::incomplete(
                SaveMethod::S3,
                format!("missing {}", missing.join(", ")),
            ));
        }

        let virtual_host = match settings.s3_bucket_lookup.as_str() {
            "dns" => true,
            "" | "auto" | "path" => false,
            other => {
                return Err(StorageError::incomplete(
                    SaveMethod::S3,
                    format!("unsupported s3-bucket-lookup {:?}", other),
                ))
            }
        };

        // A scheme in the endpoint wins over s3-use-ssl
        let (endpoint, use_ssl) = match settings.s3_endpoint.split_once("://") {
            Some((scheme, rest)) => (rest, scheme.eq_ignore_ascii_case("https")),
            None => (settings.s3_endpoint.as_str(), settings.s3_use_ssl),
        };

        Ok(S3Config {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_id: settings.s3_access_id.clone(),
            secret_key: settings.s3_secret_key.clone(),
            bucket: settings.s3_bucket.clone(),
            use_ssl,
            virtual_host,
            region: if settings.s3_region.is_empty() {
                "us-east-1".to_string()
            } else {
                settings.s3_region.clone()
            },
        })
    }

    fn host(&self) -> String {
        if self.virtual_host {
            format!("{}.{}", self.bucket, self.endpoint)
        } else {
            self.endpoint.clone()
        }
    }

    /// URI-encoded object path, each key segment encoded on its own
    fn canonical_uri(&self, key: &str) -> String {
        let key = key
            .split('/')
            .map(url_encode)
            .collect::<Vec<_>>()
            .join("/");
        if self.virtual_host {
            format!("/{}", key)
        } else {
            format!("/{}/{}", url_encode(&self.bucket), key)
        }
    }
}

/// A signed PUT ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, StorageError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| {
        StorageError::incomplete(SaveMethod::S3, format!("invalid signing key: {}", e))
    })?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Sign a PUT of `payload` to `key` at instant `now`
pub fn sign_put(
    config: &S3Config,
    key: &str,
    payload: &[u8],
    now: DateTime<Utc>,
) -> Result<SignedRequest, StorageError> {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = now.format("%Y%m%d").to_string();
    let payload_hash = sha256_hex(payload);
    let host = config.host();
    let uri = config.canonical_uri(key);

    let canonical_request = format!(
        "PUT\n{}\n\nhost:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n\n{}\n{}",
        uri, host, payload_hash, amz_date, SIGNED_HEADERS, payload_hash
    );

    let scope = format!("{}/{}/s3/aws4_request", date_stamp, config.region);
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{}\n{}\n{}",
        amz_date,
        scope,
        sha256_hex(canonical_request.as_bytes())
    );

    let k_date = hmac_sha256(
        format!("AWS4{}", config.secret_key).as_bytes(),
        date_stamp.as_bytes(),
    )?;
    let k_region = hmac_sha256(&k_date, config.region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, b"s3")?;
    let k_signing = hmac_sha256(&k_service, b"aws4_request")?;
    let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes())?);

    let authorization = format!(
        "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
        config.access_id, scope, SIGNED_HEADERS, signature
    );

    let scheme = if config.use_ssl { "https" } else { "http" };
    Ok(SignedRequest {
        url: format!("{}://{}{}", scheme, host, uri),
        headers: vec![
            ("x-amz-content-sha256".to_string(), payload_hash),
            ("x-amz-date".to_string(), amz_date),
            ("Authorization".to_string(), authorization),
        ],
    })
}

pub struct S3Saver {
    config: S3Config,
}

impl S3Saver {
    pub fn new(config: S3Config) -> Self {
        S3Saver { config }
    }
}

impl Persist for S3Saver {
    fn persist(&self, content: &[u8], name: &str) -> Result<(), StorageError> {
        let signed = sign_put(&self.config, name, content, Utc::now())?;
        let client = build_client(UPLOAD_TIMEOUT).map_err(StorageError::Network)?;

        let mut request = client
            .put(&signed.url)
            .header("Content-Type", content_type_for(name))
            .body(content.to_vec());
        for (key, value) in &signed.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.send().map_err(network_error)?;
        check_response(response)?;

        info!("Uploaded {} to s3://{}", name, self.config.bucket);
        Ok(())
    }
}
