use std::net::IpAddr;

use axum::http::HeaderMap;
use ipnet::IpNet;
use reqwest::Url;

/// What the pipeline needs to know about the caller.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub ip: String,
    /// Origin of the page the lead was sent from, when the browser told us.
    pub website: Option<String>,
    pub user_agent: String,
}

pub fn extract(
    headers: &HeaderMap,
    peer_addr: Option<IpAddr>,
    trusted_proxies: &[IpNet],
) -> RequestMeta {
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    RequestMeta {
        ip: extract_ip(headers, peer_addr, trusted_proxies),
        website: extract_website(headers),
        user_agent,
    }
}

fn extract_website(headers: &HeaderMap) -> Option<String> {
    ["origin", "referer"].iter().find_map(|name| {
        let value = headers.get(*name)?.to_str().ok()?;
        let url = Url::parse(value).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        Some(url.origin().ascii_serialization())
    })
}

fn extract_ip(
    headers: &HeaderMap,
    peer_addr: Option<IpAddr>,
    trusted_proxies: &[IpNet],
) -> String {
    let peer = peer_addr.unwrap_or(IpAddr::from([127, 0, 0, 1]));

    // Only trust X-Forwarded-For if the direct connection is from a trusted proxy
    if !trusted_proxies.is_empty() && trusted_proxies.iter().any(|net| net.contains(&peer)) {
        if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
            for ip_str in xff.split(',').map(|s| s.trim()) {
                if let Ok(ip) = ip_str.parse::<IpAddr>() {
                    if !trusted_proxies.iter().any(|net| net.contains(&ip)) {
                        return ip.to_string();
                    }
                }
            }
        }
    }

    peer.to_string()
}
