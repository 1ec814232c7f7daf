use crate::error::{CoreError, CoreResult};
use std::net::IpAddr;
use url::Url;

pub fn is_loopback_host(url: &Url) -> bool {
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false),
        None => false,
    }
}

/// Accepts `https://…`, or plain `http://` only when it points at this machine
/// (local stubs during development).
pub fn validate_api_base(endpoint: &str) -> CoreResult<Url> {
    let url = Url::parse(endpoint)
        .map_err(|_| CoreError::Config(format!("invalid api_base URL: {}", endpoint)))?;
    if url.host_str().is_none() {
        return Err(CoreError::Config("api_base missing host".to_string()));
    }
    match url.scheme() {
        "https" => Ok(url),
        "http" if is_loopback_host(&url) => Ok(url),
        "http" => Err(CoreError::Config(
            "api_base must use https unless it is a loopback address".to_string(),
        )),
        other => Err(CoreError::Config(format!(
            "unsupported api_base scheme: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_endpoint_is_accepted() {
        assert!(validate_api_base("https://generativelanguage.googleapis.com").is_ok());
    }

    #[test]
    fn plain_http_only_on_loopback() {
        assert!(validate_api_base("http://127.0.0.1:8787").is_ok());
        assert!(validate_api_base("http://[::1]:8787").is_ok());
        assert!(validate_api_base("http://example.com").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(validate_api_base("not a url").is_err());
        assert!(validate_api_base("ftp://example.com").is_err());
    }
}
