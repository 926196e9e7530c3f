//! Outbound HTTP client construction and source URL validation.
//!
//! Download sources are untrusted input: the URL must be absolute,
//! http(s), and must not point the server at loopback or private
//! address space.

use std::net::IpAddr;
use std::time::Duration;

use reqwest::Client;

use crate::config::DownloadConfig;
use crate::{LoradError, Result};

/// Build the outbound HTTP client with bounded timeouts.
pub fn build_client(config: &DownloadConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .read_timeout(Duration::from_secs(config.read_timeout_secs))
        .timeout(Duration::from_secs(config.total_timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| LoradError::Config(format!("failed to create HTTP client: {e}")))
}

/// Validate a download source URL.
///
/// This function checks that:
/// - The URL parses and uses http or https scheme
/// - Unless `allow_private` is set: the host is not a private/loopback
///   address or a reserved hostname
pub fn validate_url(url: &str, allow_private: bool) -> Result<()> {
    let parsed =
        url::Url::parse(url).map_err(|e| LoradError::InvalidRequest(format!("invalid URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(LoradError::InvalidRequest(format!(
                "unsupported URL scheme: {scheme}"
            )));
        }
    }

    let host = parsed
        .host()
        .ok_or_else(|| LoradError::InvalidRequest("URL has no host".to_string()))?;

    if allow_private {
        return Ok(());
    }

    match host {
        url::Host::Domain(domain) => {
            if is_forbidden_hostname(domain) {
                return Err(LoradError::InvalidRequest(format!(
                    "forbidden host: {domain}"
                )));
            }
        }
        url::Host::Ipv4(ipv4) => {
            let ip = IpAddr::V4(ipv4);
            if is_private_ip(&ip) {
                return Err(LoradError::InvalidRequest(format!(
                    "private IP address not allowed: {ip}"
                )));
            }
        }
        url::Host::Ipv6(ipv6) => {
            let ip = IpAddr::V6(ipv6);
            if is_private_ip(&ip) {
                return Err(LoradError::InvalidRequest(format!(
                    "private IP address not allowed: {ip}"
                )));
            }
        }
    }

    Ok(())
}

/// Check if a hostname is forbidden.
fn is_forbidden_hostname(host: &str) -> bool {
    let host_lower = host.to_lowercase();

    if host_lower == "localhost" {
        return true;
    }

    let forbidden_suffixes = [
        ".local",
        ".localhost",
        ".internal",
        ".intranet",
        ".corp",
        ".home",
        ".lan",
    ];

    forbidden_suffixes
        .iter()
        .any(|suffix| host_lower.ends_with(suffix))
}

/// Check if an IP address is private/reserved.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            if ipv4.is_loopback() || ipv4.is_broadcast() || ipv4.is_unspecified() {
                return true;
            }

            let octets = ipv4.octets();

            // Private: 10.0.0.0/8
            if octets[0] == 10 {
                return true;
            }

            // Private: 172.16.0.0/12
            if octets[0] == 172 && (16..=31).contains(&octets[1]) {
                return true;
            }

            // Private: 192.168.0.0/16
            if octets[0] == 192 && octets[1] == 168 {
                return true;
            }

            // Link-local: 169.254.0.0/16
            if octets[0] == 169 && octets[1] == 254 {
                return true;
            }

            false
        }
        IpAddr::V6(ipv6) => {
            if ipv6.is_loopback() || ipv6.is_unspecified() {
                return true;
            }

            let segments = ipv6.segments();

            // Unique local: fc00::/7
            if (segments[0] & 0xfe00) == 0xfc00 {
                return true;
            }

            // Link-local: fe80::/10
            if (segments[0] & 0xffc0) == 0xfe80 {
                return true;
            }

            false
        }
    }
}
