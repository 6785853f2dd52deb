//! Client identification utilities
//!
//! Derives a stable per-client key for rate limiting. The key is the socket
//! peer address; `X-Forwarded-For` is only read when the peer is one of the
//! configured trusted proxies.

use std::net::IpAddr;

use http::HeaderMap;

use crate::config::{self, EnvError};

/// Comma-separated list of reverse-proxy addresses allowed to set
/// `X-Forwarded-For`
pub const TRUSTED_PROXIES_VAR: &str = "TRUSTED_PROXIES";

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Peers whose `X-Forwarded-For` header is believed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedProxies(Vec<IpAddr>);

impl TrustedProxies {
    /// Trust no one: every request is keyed on its peer address
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(proxies: impl IntoIterator<Item = IpAddr>) -> Self {
        let mut proxies: Vec<IpAddr> = proxies.into_iter().collect();
        proxies.sort();
        proxies.dedup();
        Self(proxies)
    }

    /// Read `TRUSTED_PROXIES`; unset means none
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EnvError> {
        let Some(raw) = config::optional(lookup, TRUSTED_PROXIES_VAR) else {
            return Ok(Self::none());
        };

        let proxies = config::split_list(&raw)
            .into_iter()
            .map(|entry| {
                entry.parse::<IpAddr>().map_err(|e| EnvError::Invalid {
                    name: TRUSTED_PROXIES_VAR.to_string(),
                    reason: format!("{entry}: {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(proxies))
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.0.binary_search(ip).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Address of the client a request should be charged to.
///
/// An untrusted peer is the client, whatever its headers say. Behind a
/// trusted proxy the `X-Forwarded-For` chain is walked from the right, and
/// the first hop that is not itself a trusted proxy is the client. An
/// unparsable hop stops the walk and the peer is used.
pub fn extract_client_ip(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trusted: &TrustedProxies,
) -> Option<IpAddr> {
    let peer = peer?;
    if !trusted.contains(&peer) {
        return Some(peer);
    }

    let hops: Vec<&str> = headers
        .get_all(FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .collect();

    for hop in hops.into_iter().rev() {
        match hop.parse::<IpAddr>() {
            Ok(ip) if trusted.contains(&ip) => continue,
            Ok(ip) => return Some(ip),
            Err(_) => break,
        }
    }
    Some(peer)
}

/// Rate-limit bucket key for a request
///
/// Requests whose peer address is unknown share one bucket, so they are
/// limited together rather than not at all.
pub fn client_key(headers: &HeaderMap, peer: Option<IpAddr>, trusted: &TrustedProxies) -> String {
    match extract_client_ip(headers, peer, trusted) {
        Some(ip) => format!("ip:{ip}"),
        None => "ip:unknown".to_string(),
    }
}
