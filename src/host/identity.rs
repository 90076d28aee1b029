// src/host/identity.rs - Hostname and reachable address of the host machine
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use tokio::net::{lookup_host, UdpSocket};

/// Public resolver used only to pick the outbound interface; nothing is sent.
const ROUTE_PROBE: &str = "8.8.8.8:53";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub hostname: String,
    pub ip: Option<IpAddr>,
}

impl HostIdentity {
    pub fn new(hostname: impl Into<String>, ip: Option<IpAddr>) -> Self {
        Self { hostname: hostname.into(), ip }
    }

    /// Best-effort lookup of this machine's name and routable IPv4 address.
    pub async fn discover() -> Self {
        let hostname = sysinfo::System::host_name()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "printer-host".to_string());
        let ip = match resolved_address(&hostname).await {
            Some(ip) => Some(ip),
            None => outbound_address().await,
        };
        if ip.is_none() {
            tracing::debug!("No routable address found for host '{}'", hostname);
        }
        Self { hostname, ip }
    }
}

impl fmt::Display for HostIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ip {
            Some(ip) => write!(f, "{} at {}", self.hostname, ip),
            None => write!(f, "{} connected", self.hostname),
        }
    }
}

fn usable(ip: &IpAddr) -> bool {
    ip.is_ipv4() && !ip.is_loopback() && !ip.is_unspecified()
}

/// First non-loopback IPv4 address the hostname resolves to.
async fn resolved_address(hostname: &str) -> Option<IpAddr> {
    lookup_host((hostname, 0))
        .await
        .ok()?
        .map(|addr| addr.ip())
        .find(usable)
}

/// Local address of the interface that would route to the public internet.
async fn outbound_address() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").await.ok()?;
    socket.connect(ROUTE_PROBE).await.ok()?;
    socket
        .local_addr()
        .ok()
        .map(|addr: SocketAddr| addr.ip())
        .filter(usable)
}
