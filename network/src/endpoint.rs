//! Ordered candidate server endpoints.

use rlusd_types::Network;
use url::Url;

use crate::error::NetworkError;

/// A non-empty, ordered list of ledger server URLs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointSet(Vec<Url>);

impl EndpointSet {
    pub fn new<I, S>(endpoints: I) -> Result<Self, NetworkError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = endpoints
            .into_iter()
            .map(|raw| parse_endpoint(raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if urls.is_empty() {
            return Err(NetworkError::NoEndpoints);
        }
        Ok(Self(urls))
    }

    /// Parse a comma-separated list, as given in `RLUSD_ENDPOINTS`.
    pub fn parse_list(list: &str) -> Result<Self, NetworkError> {
        Self::new(list.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    pub fn for_network(network: Network) -> Self {
        let urls = network
            .default_endpoints()
            .iter()
            .filter_map(|raw| Url::parse(raw).ok())
            .collect();
        Self(urls)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Url> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> &Url {
        &self.0[0]
    }
}

impl Default for EndpointSet {
    fn default() -> Self {
        Self::for_network(Network::Mainnet)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, NetworkError> {
    let invalid = |reason: String| NetworkError::InvalidEndpoint {
        endpoint: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "ws" | "wss" | "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}
