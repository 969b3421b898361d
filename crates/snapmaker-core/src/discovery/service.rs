//! Broadcast discovery client.
//!
//! Every call opens its own socket; it is closed when the call returns,
//! whichever path it returns by.

use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, SocketAddr};
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use super::reply::parse_reply;
use crate::config::ClientConfig;
use crate::protocol::{DISCOVERY_BUFFER_SIZE, DISCOVER_MESSAGE};
use crate::types::DiscoveryRecord;

/// Create a UDP socket allowed to send to broadcast addresses.
pub fn create_broadcast_socket() -> Result<std::net::UdpSocket, std::io::Error> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;

    socket.set_broadcast(true)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], 0));
    socket.bind(&addr.into())?;

    socket.set_nonblocking(true)?;

    Ok(socket.into())
}

/// Why [`DiscoveryClient::check_online`] gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryFailure {
    /// Every probe went unanswered by the target host.
    NoReply { attempts: u32 },
    /// The socket could not be opened or the probe could not be sent.
    Socket(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    Online(DiscoveryRecord),
    Offline(DiscoveryFailure),
}

/// Sends discovery probes and collects replies.
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    config: ClientConfig,
}

impl DiscoveryClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Probe until `host` answers or the retry budget runs out.
    ///
    /// Replies from other devices and malformed datagrams are skipped
    /// without ending the attempt.
    pub async fn check_online(&self, host: &str) -> DiscoveryOutcome {
        let socket = match self.open_socket() {
            Ok(socket) => socket,
            Err(e) => {
                warn!("Discovery socket for {} failed: {}", host, e);
                return DiscoveryOutcome::Offline(DiscoveryFailure::Socket(e.to_string()));
            }
        };

        let addrs = resolve_host(host).await;
        let attempts = self.config.discovery_retries;
        let mut buf = vec![0u8; DISCOVERY_BUFFER_SIZE];

        for attempt in 1..=attempts {
            if let Err(e) = self.send_probe(&socket).await {
                warn!("Discovery probe for {} failed: {}", host, e);
                return DiscoveryOutcome::Offline(DiscoveryFailure::Socket(e.to_string()));
            }

            if let Some(record) = self.await_host(&socket, &mut buf, host, &addrs).await {
                return DiscoveryOutcome::Online(record);
            }

            debug!("No discovery reply from {} (attempt {}/{})", host, attempt, attempts);

            if attempt < attempts {
                sleep(self.config.discovery_retry_delay).await;
            }
        }

        DiscoveryOutcome::Offline(DiscoveryFailure::NoReply { attempts })
    }

    /// Broadcast once and return every device that answers before a read times out.
    pub async fn discover_all(&self) -> Vec<DiscoveryRecord> {
        let socket = match self.open_socket() {
            Ok(socket) => socket,
            Err(e) => {
                warn!("Discovery socket failed: {}", e);
                return Vec::new();
            }
        };

        if let Err(e) = self.send_probe(&socket).await {
            warn!("Discovery broadcast failed: {}", e);
            return Vec::new();
        }

        let mut devices = Vec::new();
        let mut buf = vec![0u8; DISCOVERY_BUFFER_SIZE];

        loop {
            match timeout(self.config.receive_timeout, socket.recv_from(&mut buf)).await {
                Ok(Ok((len, addr))) => match parse_reply(&buf[..len]) {
                    Ok(record) => {
                        debug!("Discovered {} ({}) at {}", record.model, record.status, record.host);
                        devices.push(record);
                    }
                    Err(e) => warn!("Skipping malformed discovery reply from {}: {}", addr, e),
                },
                Ok(Err(e)) => {
                    debug!("Discovery receive error: {}", e);
                    break;
                }
                Err(_) => break,
            }
        }

        devices
    }

    fn open_socket(&self) -> Result<UdpSocket, std::io::Error> {
        UdpSocket::from_std(create_broadcast_socket()?)
    }

    async fn send_probe(&self, socket: &UdpSocket) -> Result<(), std::io::Error> {
        let target = (self.config.broadcast_address.as_str(), self.config.discovery_port);
        socket.send_to(DISCOVER_MESSAGE, target).await?;
        Ok(())
    }

    /// Read replies until one names `host` or a read times out.
    async fn await_host(
        &self,
        socket: &UdpSocket,
        buf: &mut [u8],
        host: &str,
        addrs: &[IpAddr],
    ) -> Option<DiscoveryRecord> {
        loop {
            match timeout(self.config.receive_timeout, socket.recv_from(buf)).await {
                Ok(Ok((len, addr))) => match parse_reply(&buf[..len]) {
                    Ok(record) if names_host(&record, host, addrs) => return Some(record),
                    Ok(record) => debug!("Ignoring discovery reply from {}", record.host),
                    Err(e) => warn!("Skipping malformed discovery reply from {}: {}", addr, e),
                },
                Ok(Err(e)) => {
                    debug!("Discovery receive error: {}", e);
                    return None;
                }
                Err(_) => return None,
            }
        }
    }
}

/// Addresses `host` stands for. Replies carry IP literals, so hostnames are
/// resolved once per check.
async fn resolve_host(host: &str) -> Vec<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return vec![ip];
    }

    match lookup_host((host, 0)).await {
        Ok(addrs) => addrs.map(|addr| addr.ip()).collect(),
        Err(e) => {
            debug!("Could not resolve {}: {}", host, e);
            Vec::new()
        }
    }
}

fn names_host(record: &DiscoveryRecord, host: &str, addrs: &[IpAddr]) -> bool {
    record.host == host
        || record
            .host
            .parse::<IpAddr>()
            .is_ok_and(|ip| addrs.contains(&ip))
}

impl Default for DiscoveryClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}
