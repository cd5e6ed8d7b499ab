use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};

/// Client address used to key the rate limiter.
///
/// The TCP peer address is used unless `trust_proxy_headers` is set, in which
/// case `x-real-ip` and then the first `x-forwarded-for` entry take precedence.
pub fn client_address(req: &Request, trust_proxy_headers: bool) -> String {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    let forwarded = trust_proxy_headers
        .then(|| {
            req.headers()
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .or_else(|| {
                    req.headers()
                        .get("x-forwarded-for")
                        .and_then(|h| h.to_str().ok())
                        .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
                })
        })
        .flatten();

    forwarded
        .or(remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}
