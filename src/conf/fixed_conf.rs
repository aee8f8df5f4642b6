use crate::conf::{ResolverConf, DEFAULT_SRV_DOMAIN};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct FixedConf {
    servers: Vec<SocketAddr>,
    search: Vec<String>,
    ndots: usize,
    timeout: Duration,
    attempts: usize,
    srv_domain: String,
}

impl FixedConf {
    pub fn new(servers: Vec<SocketAddr>) -> Self {
        Self {
            servers,
            search: Vec::new(),
            ndots: 1,
            timeout: Duration::from_secs(5),
            attempts: 2,
            srv_domain: DEFAULT_SRV_DOMAIN.to_owned(),
        }
    }

    pub fn search(mut self, domains: Vec<String>) -> Self {
        self.search = domains;
        self
    }

    pub fn ndots(mut self, ndots: usize) -> Self {
        self.ndots = ndots;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn srv_domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.srv_domain = domain.into();
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl ResolverConf for FixedConf {
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
    fn srv_domain(&self) -> &str {
        &self.srv_domain
    }
}
