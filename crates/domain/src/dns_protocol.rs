use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_DNS_PORT: u16 = 53;
pub const DEFAULT_DOT_PORT: u16 = 853;

/// A nameserver address that may or may not be resolved to an IP yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameserverAddr {
    Resolved(SocketAddr),
    Unresolved { hostname: Arc<str>, port: u16 },
}

impl NameserverAddr {
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self {
            NameserverAddr::Resolved(addr) => Some(*addr),
            NameserverAddr::Unresolved { .. } => None,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            NameserverAddr::Resolved(addr) => addr.port(),
            NameserverAddr::Unresolved { port, .. } => *port,
        }
    }

    /// Host part without the port, IPv6 addresses unbracketed.
    pub fn host(&self) -> String {
        match self {
            NameserverAddr::Resolved(addr) => addr.ip().to_string(),
            NameserverAddr::Unresolved { hostname, .. } => hostname.to_string(),
        }
    }
}

impl fmt::Display for NameserverAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameserverAddr::Resolved(addr) => write!(f, "{}", addr),
            NameserverAddr::Unresolved { hostname, port } => write!(f, "{}:{}", hostname, port),
        }
    }
}

/// A nameserver endpoint, parsed from a URL such as `udp://8.8.8.8:53`,
/// `tls://1.1.1.1:853?hostname=one.one.one.one` or
/// `https://dns.google/dns-query`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DnsProtocol {
    Udp {
        addr: NameserverAddr,
    },
    Tcp {
        addr: NameserverAddr,
    },
    Tls {
        addr: NameserverAddr,
        hostname: Arc<str>,
    },
    Https {
        url: Arc<str>,
        hostname: Arc<str>,
    },
}

impl DnsProtocol {
    pub fn udp(addr: SocketAddr) -> Self {
        DnsProtocol::Udp {
            addr: NameserverAddr::Resolved(addr),
        }
    }

    pub fn tcp(addr: SocketAddr) -> Self {
        DnsProtocol::Tcp {
            addr: NameserverAddr::Resolved(addr),
        }
    }

    pub fn addr(&self) -> Option<&NameserverAddr> {
        match self {
            DnsProtocol::Udp { addr } | DnsProtocol::Tcp { addr } | DnsProtocol::Tls { addr, .. } => {
                Some(addr)
            }
            DnsProtocol::Https { .. } => None,
        }
    }

    pub fn hostname(&self) -> Option<&str> {
        match self {
            DnsProtocol::Tls { hostname, .. } | DnsProtocol::Https { hostname, .. } => {
                Some(hostname)
            }
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            DnsProtocol::Https { url, .. } => Some(url),
            _ => None,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            DnsProtocol::Udp { .. } => "UDP",
            DnsProtocol::Tcp { .. } => "TCP",
            DnsProtocol::Tls { .. } => "TLS",
            DnsProtocol::Https { .. } => "HTTPS",
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            DnsProtocol::Udp { .. } => "udp",
            DnsProtocol::Tcp { .. } => "tcp",
            DnsProtocol::Tls { .. } => "tls",
            DnsProtocol::Https { .. } => "https",
        }
    }
}

fn parse_host_port(s: &str, default_port: u16) -> Option<(&str, u16)> {
    if let Some(rest) = s.strip_prefix('[') {
        let end = rest.find(']')?;
        let host = &rest[..end];
        let port = match rest[end + 1..].strip_prefix(':') {
            Some(port_str) => port_str.parse::<u16>().ok()?,
            None if rest[end + 1..].is_empty() => default_port,
            None => return None,
        };
        return Some((host, port));
    }
    match s.rsplit_once(':') {
        // More than one colon without brackets is a bare IPv6 address.
        Some((host, _)) if host.contains(':') => Some((s, default_port)),
        Some((host, port_str)) => Some((host, port_str.parse::<u16>().ok()?)),
        None => Some((s, default_port)),
    }
}

fn parse_nameserver_addr(addr_str: &str, default_port: u16) -> Result<NameserverAddr, String> {
    if let Ok(addr) = addr_str.parse::<SocketAddr>() {
        return Ok(NameserverAddr::Resolved(addr));
    }
    let (host, port) =
        parse_host_port(addr_str, default_port).ok_or_else(|| format!("Invalid address '{}'", addr_str))?;
    if host.is_empty() {
        return Err(format!("Missing host in '{}'", addr_str));
    }
    if let Ok(ip) = host.parse::<std::net::IpAddr>() {
        return Ok(NameserverAddr::Resolved(SocketAddr::new(ip, port)));
    }
    Ok(NameserverAddr::Unresolved {
        hostname: host.into(),
        port,
    })
}

/// Splits `authority?key=value&...` and returns the value of `key`, if any.
fn query_param<'a>(query: Option<&'a str>, key: &str) -> Option<&'a str> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

impl FromStr for DnsProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("https://") {
            let url: Arc<str> = s.into();
            let hostname: Arc<str> = s
                .strip_prefix("https://")
                .and_then(|rest| rest.split(['/', '?']).next())
                .filter(|host| !host.is_empty())
                .ok_or_else(|| format!("Invalid HTTPS URL: {}", s))?
                .into();
            return Ok(DnsProtocol::Https { url, hostname });
        }

        let (scheme, rest) = match s.split_once("://") {
            Some((scheme, rest)) => (scheme, rest),
            None => ("udp", s),
        };
        let (authority, query) = match rest.split_once('?') {
            Some((authority, query)) => (authority, Some(query)),
            None => (rest, None),
        };
        let authority = authority.trim_end_matches('/');

        match scheme {
            "udp" => {
                let addr = parse_nameserver_addr(authority, DEFAULT_DNS_PORT)
                    .map_err(|e| format!("Invalid UDP address: {}", e))?;
                Ok(DnsProtocol::Udp { addr })
            }
            "tcp" => {
                let addr = parse_nameserver_addr(authority, DEFAULT_DNS_PORT)
                    .map_err(|e| format!("Invalid TCP address: {}", e))?;
                Ok(DnsProtocol::Tcp { addr })
            }
            "tls" => {
                let addr = parse_nameserver_addr(authority, DEFAULT_DOT_PORT)
                    .map_err(|e| format!("Invalid TLS address: {}", e))?;
                let hostname: Arc<str> = match query_param(query, "hostname") {
                    Some(name) if !name.is_empty() => name.into(),
                    _ => addr.host().into(),
                };
                Ok(DnsProtocol::Tls { addr, hostname })
            }
            other => Err(format!(
                "No resolver for '{}' protocol in '{}'. Expected: udp://HOST:PORT, tcp://HOST:PORT, tls://HOST:PORT?hostname=NAME, https://URL, or IP[:PORT]",
                other, s
            )),
        }
    }
}

impl fmt::Display for DnsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsProtocol::Udp { addr } => write!(f, "udp://{}", addr),
            DnsProtocol::Tcp { addr } => write!(f, "tcp://{}", addr),
            DnsProtocol::Tls { addr, hostname } => {
                write!(f, "tls://{}?hostname={}", addr, hostname)
            }
            DnsProtocol::Https { url, .. } => write!(f, "{}", url),
        }
    }
}

impl serde::Serialize for DnsProtocol {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
