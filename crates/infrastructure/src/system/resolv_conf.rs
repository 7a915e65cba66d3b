use dns_sql_domain::config::{MAX_ATTEMPTS, MAX_NDOTS, MAX_TIMEOUT_SECS};
use dns_sql_domain::{ConfigError, DnsProtocol, ResolverConfig};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

pub const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

/// The parts of a glibc-style resolv.conf the resolver understands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvConf {
    pub nameservers: Vec<IpAddr>,
    pub search: Vec<String>,
    pub ndots: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub attempts: Option<u32>,
}

impl ResolvConf {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.display().to_string(), e.to_string()))?;
        Ok(Self::parse(&content))
    }

    /// Unknown keywords and malformed values are skipped. `domain` and
    /// `search` override each other, the last one wins.
    pub fn parse(content: &str) -> Self {
        let mut conf = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let Some(keyword) = fields.next() else {
                continue;
            };

            match keyword {
                "nameserver" => {
                    let Some(value) = fields.next() else { continue };
                    // fe80::1%eth0: scope ids are not representable in IpAddr
                    let addr = value.split('%').next().unwrap_or(value);
                    match IpAddr::from_str(addr) {
                        Ok(ip) => conf.nameservers.push(ip),
                        Err(e) => warn!(nameserver = value, error = %e, "Ignoring invalid nameserver"),
                    }
                }
                "domain" => {
                    if let Some(domain) = fields.next() {
                        conf.search = vec![domain.to_string()];
                    }
                }
                "search" => {
                    conf.search = fields.map(str::to_string).collect();
                }
                "options" => {
                    for option in fields {
                        conf.parse_option(option);
                    }
                }
                _ => {}
            }
        }

        conf
    }

    fn parse_option(&mut self, option: &str) {
        let Some((name, value)) = option.split_once(':') else {
            return;
        };
        match name {
            "ndots" => {
                if let Ok(n) = value.parse::<usize>() {
                    self.ndots = Some(n.min(MAX_NDOTS));
                }
            }
            "timeout" => {
                if let Ok(n) = value.parse::<u64>() {
                    self.timeout_secs = Some(n.clamp(1, MAX_TIMEOUT_SECS));
                }
            }
            "attempts" => {
                if let Ok(n) = value.parse::<u32>() {
                    self.attempts = Some(n.clamp(1, MAX_ATTEMPTS));
                }
            }
            _ => {}
        }
    }

    /// Resolver settings for this file. Without any usable nameserver the
    /// default (127.0.0.1:53) is kept.
    pub fn to_config(&self) -> ResolverConfig {
        let mut config = ResolverConfig::default();

        if !self.nameservers.is_empty() {
            config.servers = self
                .nameservers
                .iter()
                .map(|ip| DnsProtocol::udp(SocketAddr::new(*ip, 53)))
                .collect();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = self.attempts {
            config.retries = attempts.saturating_sub(1);
        }
        if let Some(ndots) = self.ndots {
            config.ndots = ndots;
        }
        config.search = self.search.clone();

        config
    }
}

/// Reads the system configuration, falling back to the defaults when the
/// file cannot be read.
pub fn load_system_config(path: impl AsRef<Path>) -> ResolverConfig {
    match ResolvConf::read(path) {
        Ok(conf) => {
            let config = conf.to_config();
            debug!(
                servers = config.servers.len(),
                search = config.search.len(),
                ndots = config.ndots,
                "System resolver configuration loaded"
            );
            config
        }
        Err(e) => {
            warn!(error = %e, "Using default resolver configuration");
            ResolverConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typical_file() {
        let conf = ResolvConf::parse(
            "# generated\n\
             nameserver 10.0.0.1\n\
             nameserver 2001:db8::1\n\
             search corp.example example.com\n\
             options ndots:2 timeout:3 attempts:4 rotate\n",
        );

        assert_eq!(
            conf.nameservers,
            vec![
                "10.0.0.1".parse::<IpAddr>().unwrap(),
                "2001:db8::1".parse::<IpAddr>().unwrap()
            ]
        );
        assert_eq!(conf.search, vec!["corp.example", "example.com"]);
        assert_eq!(conf.ndots, Some(2));
        assert_eq!(conf.timeout_secs, Some(3));
        assert_eq!(conf.attempts, Some(4));
    }

    #[test]
    fn test_last_of_domain_and_search_wins() {
        let conf = ResolvConf::parse("search a.example b.example\ndomain c.example\n");
        assert_eq!(conf.search, vec!["c.example"]);

        let conf = ResolvConf::parse("domain c.example\nsearch a.example\n");
        assert_eq!(conf.search, vec!["a.example"]);
    }

    #[test]
    fn test_invalid_lines_are_skipped() {
        let conf = ResolvConf::parse("nameserver not-an-ip\nnameserver\n; comment\noptions ndots:x\n");
        assert!(conf.nameservers.is_empty());
        assert_eq!(conf.ndots, None);
    }

    #[test]
    fn test_scoped_ipv6_nameserver() {
        let conf = ResolvConf::parse("nameserver fe80::1%eth0\n");
        assert_eq!(conf.nameservers, vec!["fe80::1".parse::<IpAddr>().unwrap()]);
    }

    #[test]
    fn test_to_config_maps_options() {
        let conf = ResolvConf::parse("nameserver 192.0.2.53\noptions timeout:2 attempts:1 ndots:3\n");
        let config = conf.to_config();

        assert_eq!(config.servers, vec![DnsProtocol::udp("192.0.2.53:53".parse().unwrap())]);
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.retries, 0);
        assert_eq!(config.ndots, 3);
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let config = ResolvConf::parse("").to_config();
        assert_eq!(config, ResolverConfig::default());
    }
}
