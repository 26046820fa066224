use std::net::{IpAddr, Ipv4Addr};

use axum::http::HeaderMap;

/// Sentinel for requests whose origin could not be determined.
pub const UNKNOWN_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Proxy headers consulted in priority order. Cloudflare's header wins
/// because the challenge verification happens against the same edge.
const CANDIDATE_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-forwarded-for", "x-real-ip"];

/// Resolve the submitting client's address from proxy headers, falling
/// back to the peer address and finally to [`UNKNOWN_ADDR`].
pub fn resolve(headers: &HeaderMap, peer_addr: Option<IpAddr>) -> IpAddr {
    for header in CANDIDATE_HEADERS {
        if let Some(value) = headers.get(header).and_then(|v| v.to_str().ok()) {
            // X-Forwarded-For may carry a chain; the leftmost entry is
            // the original client.
            let first = value.split(',').next().unwrap_or("").trim();
            if let Ok(ip) = first.parse::<IpAddr>() {
                return ip;
            }
        }
    }

    peer_addr.unwrap_or(UNKNOWN_ADDR)
}

pub fn is_unknown(ip: IpAddr) -> bool {
    ip == UNKNOWN_ADDR
}
