//! Connectivity probing for the cloud backend.
//!
//! A probe is a cheap reachability check (TCP connect, no payload) used to
//! gate the switch into cloud mode. The router only depends on the
//! [`ConnectivityProbe`] trait so tests can substitute a scripted probe.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use super::config::ProbeConfig;

/// Outcome of a failed probe, carried into `ModeSwitchError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    pub endpoint: String,
    pub reason: String,
}

/// A reachability check against a single `host:port`.
pub trait ConnectivityProbe: Send + Sync {
    /// Perform exactly one reachability attempt.
    fn check(&self, host: &str, port: u16) -> Result<(), ProbeFailure>;
}

/// Probe that opens (and immediately drops) a TCP connection.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(config.timeout())
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::from_config(&ProbeConfig::default())
    }
}

impl ConnectivityProbe for TcpProbe {
    fn check(&self, host: &str, port: u16) -> Result<(), ProbeFailure> {
        let endpoint = format!("{host}:{port}");
        let start = Instant::now();

        let addrs: Vec<_> = (host, port)
            .to_socket_addrs()
            .map_err(|e| ProbeFailure {
                endpoint: endpoint.clone(),
                reason: format!("DNS resolution failed: {e}"),
            })?
            .collect();

        // The timeout budget covers every resolved address together.
        let mut last_error = String::from("no addresses resolved");
        for addr in addrs {
            let remaining = self.timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                last_error = format!("timed out after {}s", self.timeout.as_secs());
                break;
            }
            match TcpStream::connect_timeout(&addr, remaining) {
                Ok(_stream) => {
                    tracing::debug!(
                        endpoint = %endpoint,
                        addr = %addr,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "connectivity probe succeeded"
                    );
                    return Ok(());
                }
                Err(e) => last_error = e.to_string(),
            }
        }

        tracing::debug!(endpoint = %endpoint, reason = %last_error, "connectivity probe failed");
        Err(ProbeFailure {
            endpoint,
            reason: last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn test_tcp_probe_reaches_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let probe = TcpProbe::new(Duration::from_secs(2));
        assert!(probe.check("127.0.0.1", port).is_ok());
    }

    #[test]
    fn test_tcp_probe_refused() {
        // Bind then drop to get a port that is very likely closed.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let probe = TcpProbe::new(Duration::from_secs(2));
        let failure = probe.check("127.0.0.1", port).unwrap_err();
        assert_eq!(failure.endpoint, format!("127.0.0.1:{port}"));
        assert!(!failure.reason.is_empty());
    }

    #[test]
    fn test_tcp_probe_dns_failure() {
        let probe = TcpProbe::new(Duration::from_secs(1));
        let failure = probe.check("no-such-host.invalid", 443).unwrap_err();
        assert!(failure.endpoint.starts_with("no-such-host.invalid"));
    }
}
