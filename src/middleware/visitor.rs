use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, OriginalUri, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::database::models::{VisitorFields, VisitorLog};

const UNKNOWN: &str = "Unknown";

/// Device, browser and operating system derived from a User-Agent string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInfo {
    pub device: String,
    pub browser: String,
    pub os: String,
}

pub trait AgentParser: Send + Sync {
    fn parse(&self, user_agent: &str) -> AgentInfo;
}

#[async_trait]
pub trait GeoLocator: Send + Sync {
    /// Country for `ip`, or `None` when it cannot be determined.
    async fn country(&self, ip: &str, headers: &HeaderMap) -> Option<String>;
}

/// Substring heuristics over the User-Agent.
#[derive(Debug, Default)]
pub struct HeuristicAgentParser;

impl HeuristicAgentParser {
    fn device(ua: &str) -> &'static str {
        if ["bot", "crawler", "spider", "slurp", "curl", "wget"]
            .iter()
            .any(|m| ua.contains(m))
        {
            "bot"
        } else if ua.contains("ipad") || ua.contains("tablet") || (ua.contains("android") && !ua.contains("mobile")) {
            "tablet"
        } else if ua.contains("mobi") || ua.contains("iphone") || ua.contains("ipod") {
            "mobile"
        } else {
            "desktop"
        }
    }

    fn browser(ua: &str) -> &'static str {
        // Chromium derivatives also advertise Chrome and Safari, so they go first.
        if ua.contains("edg/") || ua.contains("edge/") {
            "Edge"
        } else if ua.contains("opr/") || ua.contains("opera") {
            "Opera"
        } else if ua.contains("samsungbrowser") {
            "Samsung Internet"
        } else if ua.contains("firefox/") || ua.contains("fxios") {
            "Firefox"
        } else if ua.contains("chrome/") || ua.contains("crios") {
            "Chrome"
        } else if ua.contains("safari/") {
            "Safari"
        } else {
            UNKNOWN
        }
    }

    fn os(ua: &str) -> &'static str {
        if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
            "iOS"
        } else if ua.contains("mac os x") || ua.contains("macintosh") {
            "macOS"
        } else if ua.contains("windows") {
            "Windows"
        } else if ua.contains("android") {
            "Android"
        } else if ua.contains("cros ") {
            "ChromeOS"
        } else if ua.contains("linux") {
            "Linux"
        } else {
            UNKNOWN
        }
    }
}

impl AgentParser for HeuristicAgentParser {
    fn parse(&self, user_agent: &str) -> AgentInfo {
        let ua = user_agent.to_ascii_lowercase();
        AgentInfo {
            device: Self::device(&ua).to_string(),
            browser: Self::browser(&ua).to_string(),
            os: Self::os(&ua).to_string(),
        }
    }
}

/// Reads the country code a CDN or edge proxy attached to the request.
#[derive(Debug, Default)]
pub struct HeaderGeoLocator;

const COUNTRY_HEADERS: [&str; 4] = [
    "cf-ipcountry",
    "cloudfront-viewer-country",
    "x-vercel-ip-country",
    "x-country-code",
];

#[async_trait]
impl GeoLocator for HeaderGeoLocator {
    async fn country(&self, _ip: &str, headers: &HeaderMap) -> Option<String> {
        COUNTRY_HEADERS.iter().find_map(|name| {
            let value = headers.get(*name)?.to_str().ok()?.trim();
            // Cloudflare reports XX when it has no data
            if value.is_empty() || value.eq_ignore_ascii_case("xx") {
                None
            } else {
                Some(value.to_ascii_uppercase())
            }
        })
    }
}

/// Builds the visitor record for a request.
pub struct VisitorInspector {
    agents: Arc<dyn AgentParser>,
    geo: Arc<dyn GeoLocator>,
}

impl Default for VisitorInspector {
    fn default() -> Self {
        Self::new(Arc::new(HeuristicAgentParser), Arc::new(HeaderGeoLocator))
    }
}

impl VisitorInspector {
    pub fn new(agents: Arc<dyn AgentParser>, geo: Arc<dyn GeoLocator>) -> Self {
        Self { agents, geo }
    }

    pub async fn inspect(&self, headers: &HeaderMap, peer: Option<SocketAddr>, request_path: &str) -> VisitorFields {
        let ip = client_ip(headers, peer);
        let user_agent = header_str(headers, header::USER_AGENT.as_str());
        let referer = header_str(headers, header::REFERER.as_str());
        let agent = self.agents.parse(&user_agent);
        let country = self
            .geo
            .country(&ip, headers)
            .await
            .unwrap_or_else(|| UNKNOWN.to_string());

        VisitorFields {
            path: visited_path(&referer, request_path),
            ip,
            device: agent.device,
            country,
            browser: agent.browser,
            os: agent.os,
            user_agent,
            referer,
            visited_at: Utc::now(),
            t1: None,
            t2: None,
        }
    }
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// The page being viewed: the referer's path when there is one, else the
/// path that was requested.
fn visited_path(referer: &str, request_path: &str) -> String {
    url::Url::parse(referer)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| request_path.to_string())
}

fn header_str(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Captures a `VisitorLog` into request extensions for the create handler.
pub async fn capture_visitor(
    State(inspector): State<Arc<VisitorInspector>>,
    mut request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    // Nested routers see a stripped URI; log the path the client asked for
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let fields = inspector.inspect(request.headers(), peer, &path).await;
    tracing::debug!(ip = %fields.ip, device = %fields.device, country = %fields.country, "Captured visitor");

    let log = VisitorLog::new(fields, Utc::now());
    request.extensions_mut().insert(log);
    next.run(request).await
}
