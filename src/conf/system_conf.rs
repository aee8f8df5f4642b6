use crate::conf::ResolverConf;
use lazy_static::lazy_static;
use log::{debug, warn};
use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";
const DNS_PORT: u16 = 53;

/// Settings read from the host's resolv.conf
#[derive(Debug)]
pub struct SystemConf {
    servers: Vec<SocketAddr>,
    search: Vec<String>,
    ndots: usize,
    timeout: Duration,
    attempts: usize,
}

lazy_static! {
    static ref SYSTEM_CONF_INSTANCE: Arc<SystemConf> = Arc::new(SystemConf::load(RESOLV_CONF_PATH));
}

impl SystemConf {
    /// The process-wide configuration, read on first use
    pub fn get() -> Arc<Self> {
        SYSTEM_CONF_INSTANCE.clone()
    }

    /// Reads `path`, falling back to the loopback server when it is
    /// missing or unparseable
    pub fn load(path: &str) -> Self {
        match fs::read(path) {
            Ok(data) => Self::parse(&data),
            Err(err) => {
                warn!("could not read {}: {}", path, err);
                Self::fallback()
            }
        }
    }

    pub fn parse(data: &[u8]) -> Self {
        let config = match resolv_conf::Config::parse(data) {
            Ok(config) => config,
            Err(err) => {
                warn!("could not parse resolver configuration: {}", err);
                return Self::fallback();
            }
        };

        let mut servers: Vec<SocketAddr> = config
            .nameservers
            .iter()
            .map(|ip| SocketAddr::new(ip.into(), DNS_PORT))
            .collect();
        if servers.is_empty() {
            servers.push(SocketAddr::new(Ipv4Addr::LOCALHOST.into(), DNS_PORT));
        }

        let search = match (config.get_search(), config.get_domain()) {
            (Some(search), _) => search.clone(),
            (None, Some(domain)) => vec![domain.clone()],
            (None, None) => Vec::new(),
        };

        let conf = Self {
            servers,
            search,
            ndots: config.ndots as usize,
            timeout: Duration::from_secs(u64::from(config.timeout.max(1))),
            attempts: (config.attempts as usize).max(1),
        };
        debug!("resolver configuration: {:?}", conf);
        conf
    }

    fn fallback() -> Self {
        Self {
            servers: vec![SocketAddr::new(Ipv4Addr::LOCALHOST.into(), DNS_PORT)],
            search: Vec::new(),
            ndots: 1,
            timeout: Duration::from_secs(5),
            attempts: 2,
        }
    }
}

impl ResolverConf for SystemConf {
    fn name_servers(&self) -> Vec<SocketAddr> {
        self.servers.clone()
    }
    fn search_domains(&self) -> Vec<String> {
        self.search.clone()
    }
    fn ndots(&self) -> usize {
        self.ndots
    }
    fn timeout(&self) -> Duration {
        self.timeout
    }
    fn attempts(&self) -> usize {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_resolv_conf() {
        let conf = SystemConf::parse(
            b"nameserver 192.0.2.1\nnameserver 2001:db8::1\n\
              search corp.example.com example.com\noptions ndots:2 timeout:3 attempts:4\n",
        );
        assert_eq!(
            conf.name_servers(),
            vec![
                "192.0.2.1:53".parse::<SocketAddr>().unwrap(),
                "[2001:db8::1]:53".parse::<SocketAddr>().unwrap(),
            ]
        );
        assert_eq!(conf.search_domains(), ["corp.example.com", "example.com"]);
        assert_eq!(conf.ndots(), 2);
        assert_eq!(conf.timeout(), Duration::from_secs(3));
        assert_eq!(conf.attempts(), 4);
    }

    #[test]
    fn domain_used_without_search() {
        let conf = SystemConf::parse(b"nameserver 192.0.2.1\ndomain example.net\n");
        assert_eq!(conf.search_domains(), ["example.net"]);
    }

    #[test]
    fn empty_conf_uses_loopback() {
        let conf = SystemConf::parse(b"");
        assert_eq!(
            conf.name_servers(),
            vec!["127.0.0.1:53".parse::<SocketAddr>().unwrap()]
        );
    }

    #[test]
    fn missing_file_uses_fallback() {
        let conf = SystemConf::load("/nonexistent/resolv.conf");
        assert_eq!(conf.ndots(), 1);
        assert_eq!(conf.name_servers().len(), 1);
    }
}
