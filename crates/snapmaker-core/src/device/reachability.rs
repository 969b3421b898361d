//! TCP reachability precheck.
//!
//! A cheap connect to the API port before any HTTP request, so a device that
//! answered discovery but is still booting fails fast.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::config::ClientConfig;

#[derive(Debug, Clone)]
pub struct ReachabilityProbe {
    connect_timeout: Duration,
    attempts: u32,
    backoff_base: Duration,
}

impl ReachabilityProbe {
    pub fn new(connect_timeout: Duration, attempts: u32, backoff_base: Duration) -> Self {
        Self {
            connect_timeout,
            attempts,
            backoff_base,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.connect_timeout,
            config.reachability_retries,
            config.reachability_backoff_base,
        )
    }

    /// Delay after the failed attempt with index `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(1u32 << attempt.min(16))
    }

    /// Try to open a TCP connection, backing off between attempts.
    ///
    /// Never sleeps after the final attempt.
    pub async fn is_reachable(&self, host: &str, port: u16) -> bool {
        for attempt in 0..self.attempts {
            match timeout(self.connect_timeout, TcpStream::connect((host, port))).await {
                Ok(Ok(_stream)) => return true,
                Ok(Err(e)) => debug!("TCP connect to {}:{} failed: {}", host, port, e),
                Err(_) => debug!("TCP connect to {}:{} timed out", host, port),
            }

            if attempt + 1 < self.attempts {
                let delay = self.backoff(attempt);
                debug!(
                    "Retrying {}:{} in {:?} (attempt {}/{})",
                    host,
                    port,
                    delay,
                    attempt + 1,
                    self.attempts
                );
                sleep(delay).await;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::net::TcpListener;

    #[test]
    fn test_backoff_doubles() {
        let probe = ReachabilityProbe::new(Duration::from_secs(1), 4, Duration::from_secs(1));
        assert_eq!(probe.backoff(0), Duration::from_secs(1));
        assert_eq!(probe.backoff(1), Duration::from_secs(2));
        assert_eq!(probe.backoff(2), Duration::from_secs(4));
    }

    #[test]
    fn test_defaults_from_config() {
        let probe = ReachabilityProbe::from_config(&ClientConfig::default());
        assert_eq!(probe.attempts, 2);
        assert_eq!(probe.backoff(0), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_reachable_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = ReachabilityProbe::new(Duration::from_secs(1), 2, Duration::from_millis(10));
        assert!(probe.is_reachable("127.0.0.1", port).await);
    }

    #[tokio::test]
    async fn test_unreachable_after_all_attempts() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let probe = ReachabilityProbe::new(Duration::from_millis(200), 2, Duration::from_millis(50));
        let start = Instant::now();
        assert!(!probe.is_reachable("127.0.0.1", port).await);
        // One backoff between two attempts, none after the last.
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_zero_attempts_is_unreachable() {
        let probe = ReachabilityProbe::new(Duration::from_millis(100), 0, Duration::from_millis(10));
        assert!(!probe.is_reachable("127.0.0.1", 1).await);
    }
}
