#![allow(dead_code)]
use dns_sql_domain::{DnsProtocol, ResolverConfig};
use rusqlite::Connection;
use std::net::SocketAddr;
use std::time::Duration;

/// Fast-failing configuration pointing at `server`.
pub fn test_config(server: SocketAddr) -> ResolverConfig {
    ResolverConfig::new(vec![DnsProtocol::udp(server)])
        .with_timeout(Duration::from_millis(300))
        .with_retries(0)
        .with_backoff(Duration::ZERO)
}

pub fn connection_with(config: ResolverConfig) -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    dns_sql::register_with_config(&conn, config).unwrap();
    conn
}
