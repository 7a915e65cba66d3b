use dns_sql_domain::{NameserverAddr, TransportError};
use std::net::SocketAddr;
use std::time::Duration;

/// Resolves a hostname to all its IP addresses (IPv4 + IPv6).
pub async fn resolve_all(
    hostname: &str,
    port: u16,
    timeout: Duration,
) -> Result<Vec<SocketAddr>, TransportError> {
    let target = format!("{}:{}", hostname, port);
    let addrs_iter = tokio::time::timeout(timeout, tokio::net::lookup_host(&target))
        .await
        .map_err(|_| TransportError::Timeout {
            server: target.clone(),
        })?
        .map_err(|e| TransportError::Unreachable {
            server: target.clone(),
            reason: format!("address lookup failed: {}", e),
        })?;

    let addrs: Vec<SocketAddr> = addrs_iter.collect();
    if addrs.is_empty() {
        return Err(TransportError::Unreachable {
            server: target,
            reason: "no addresses found".to_string(),
        });
    }
    Ok(addrs)
}

/// Socket address for a nameserver, looking the hostname up when needed.
pub async fn socket_addr_for(
    addr: &NameserverAddr,
    timeout: Duration,
) -> Result<SocketAddr, TransportError> {
    match addr {
        NameserverAddr::Resolved(addr) => Ok(*addr),
        NameserverAddr::Unresolved { hostname, port } => {
            let addrs = resolve_all(hostname, *port, timeout).await?;
            Ok(addrs[0])
        }
    }
}
