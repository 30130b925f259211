use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_TIMEOUT: u64 = 30;

pub const USER_AGENT: &str = "subsave";

/// Builds a blocking client with the given timeout
pub fn build_client(timeout_secs: u64) -> Result<Client, String> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))
}

/// Makes a GET request and returns the body
///
/// # Arguments
/// * `url` - The URL to request
/// * `timeout_secs` - Upper bound on the whole request, in seconds
///
/// # Returns
/// * `Ok(String)` - The response body as a string
/// * `Err(String)` - Error message if the request failed or the status is not 200
pub fn web_get(url: &str, timeout_secs: u64) -> Result<String, String> {
    let client = build_client(timeout_secs)?;

    debug!("GET {}", url);
    let response = client
        .get(url)
        .send()
        .map_err(|e| format!("Failed to send request: {}", e))?;

    if response.status() != StatusCode::OK {
        return Err(format!("HTTP error: {}", response.status()));
    }

    response
        .text()
        .map_err(|e| format!("Failed to read response body: {}", e))
}
