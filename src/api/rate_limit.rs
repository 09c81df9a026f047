use axum::extract::ConnectInfo;
use axum::{body::Body, http::Request, http::StatusCode, middleware::Next, response::Response};
use ipnetwork::IpNetwork;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::net::{IpAddr, SocketAddr};
use std::sync::LazyLock;
use tower_governor::GovernorError;
use tower_governor::key_extractor::KeyExtractor;

static DECISIONS_TOTAL: LazyLock<Counter<u64>> = LazyLock::new(|| {
    global::meter("chatter-server")
        .u64_counter("rate_limit_decisions_total")
        .with_description("Rate limit decisions (allowed/throttled)")
        .build()
});

/// Identifies clients by IP, reading `X-Forwarded-For` only from trusted proxies.
#[derive(Clone, Debug)]
pub struct IpKeyExtractor {
    trusted_proxies: Vec<IpNetwork>,
}

impl IpKeyExtractor {
    #[must_use]
    pub const fn new(trusted_proxies: Vec<IpNetwork>) -> Self {
        Self { trusted_proxies }
    }

    #[must_use]
    pub fn identify_client_ip(&self, headers: &axum::http::HeaderMap, peer_addr: IpAddr) -> IpAddr {
        if !self.is_trusted(&peer_addr) {
            return peer_addr;
        }

        let xff = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok());

        if let Some(xff_val) = xff {
            // Right to left; the first hop outside our proxies is the client.
            if let Some(real_ip) =
                xff_val.rsplit(',').filter_map(|s| s.trim().parse::<IpAddr>().ok()).find(|ip| !self.is_trusted(ip))
            {
                return real_ip;
            }
        }

        peer_addr
    }

    fn is_trusted(&self, ip: &IpAddr) -> bool {
        self.trusted_proxies.iter().any(|net| net.contains(*ip))
    }
}

impl KeyExtractor for IpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let peer_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)?;

        Ok(self.identify_client_ip(req.headers(), peer_ip))
    }
}

/// Records every decision of the limiter wrapped inside this middleware.
pub async fn log_rate_limit_events(request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(path = %path, "Request throttled by rate limiter");
        DECISIONS_TOTAL.add(1, &[KeyValue::new("decision", "throttled")]);
    } else {
        DECISIONS_TOTAL.add(1, &[KeyValue::new("decision", "allowed")]);
    }

    response
}
