//! Request guards: token check for the protected routes and
//! per-IP rate limiting for the auth routes.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::error::ApiError;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::{decode_jwt, token_from_headers};

/// Reject requests without a valid token; attach the decoded `Claims` otherwise
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = token_from_headers(req.headers())
        .ok_or_else(|| DomainError::Unauthorized("No token provided".to_string()))?;

    let claims = decode_jwt(&state.config.jwt, &token)?;
    tracing::debug!("Authenticated user {} for {}", claims.user_id, req.uri().path());

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Sliding-window limit keyed by client IP
pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = client_ip(&req);

    if !state.rate_limiter.check(ip) {
        tracing::warn!("Rate limit exceeded for {} on {}", ip, req.uri().path());
        return Err(ApiError::RateLimited);
    }
    state.rate_limiter.prune(Instant::now());

    Ok(next.run(req).await)
}

/// Peer address when the server was started with connect info,
/// else the first `X-Forwarded-For` entry, else the unspecified address.
fn client_ip(req: &Request) -> IpAddr {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip();
    }
    forwarded_for(req.headers()).unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_takes_the_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(
            forwarded_for(&headers),
            Some("203.0.113.7".parse().unwrap())
        );
    }

    #[test]
    fn garbage_forwarded_for_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        assert_eq!(forwarded_for(&headers), None);
    }
}
