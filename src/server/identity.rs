use axum::http::HeaderMap;
use std::net::SocketAddr;

/// How a request is mapped to the conversation it belongs to.
///
/// Neither strategy authenticates anything: the peer address can be shared
/// behind NAT, and a header can be set by any client. Use `Header` only behind
/// a proxy that overwrites it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityResolver {
    PeerAddress,
    Header { name: String },
}

impl IdentityResolver {
    pub fn from_header(name: Option<String>) -> Self {
        match name.filter(|n| !n.trim().is_empty()) {
            Some(name) => IdentityResolver::Header { name: name.trim().to_string() },
            None => IdentityResolver::PeerAddress,
        }
    }

    pub fn resolve(&self, headers: &HeaderMap, peer: SocketAddr) -> String {
        match self {
            IdentityResolver::PeerAddress => peer.ip().to_string(),
            IdentityResolver::Header { name } => {
                headers
                    .get(name.as_str())
                    .and_then(|v| v.to_str().ok())
                    // X-Forwarded-For style lists name the original client first
                    .and_then(|v| v.split(',').next())
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_owned)
                    .unwrap_or_else(|| peer.ip().to_string())
            }
        }
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        IdentityResolver::PeerAddress
    }
}
