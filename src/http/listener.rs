//! TCP listener with port fallback

use std::io::ErrorKind;
use tokio::net::TcpListener;
use tracing::warn;

/// Startup bind failures
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("No free port on {host} in {first}..={last}")]
    Exhausted { host: String, first: u16, last: u16 },

    #[error("Failed to bind {addr}: {source}")]
    Io {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Bind `host:port`, moving to the next port while the current one is taken.
///
/// At most `limit` ports are tried (at least one). Errors other than
/// `AddrInUse` are returned immediately.
pub async fn bind_with_retry(host: &str, port: u16, limit: u16) -> Result<TcpListener, BindError> {
    let mut last = port;

    for offset in 0..limit.max(1) {
        let Some(candidate) = port.checked_add(offset) else {
            break;
        };
        last = candidate;

        let addr = format!("{host}:{candidate}");
        match TcpListener::bind(&addr).await {
            Ok(listener) => {
                if offset > 0 {
                    warn!(requested = port, bound = candidate, "Requested port was busy");
                }
                return Ok(listener);
            }
            Err(e) if e.kind() == ErrorKind::AddrInUse => {
                warn!(port = candidate, "Port in use, trying next");
            }
            Err(source) => return Err(BindError::Io { addr, source }),
        }
    }

    Err(BindError::Exhausted {
        host: host.to_string(),
        first: port,
        last,
    })
}
