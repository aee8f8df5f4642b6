use std::fmt::Debug;
use std::net::SocketAddr;
use std::time::Duration;

/// Domain suffix SRV targets must carry before `rewrite_uri` trusts them
pub const DEFAULT_SRV_DOMAIN: &str = ".lindenlab.com";

pub trait ResolverConf: Debug {
    fn name_servers(&self) -> Vec<SocketAddr>;
    fn search_domains(&self) -> Vec<String>;
    fn ndots(&self) -> usize;
    /// How long one attempt against one server may take
    fn timeout(&self) -> Duration;
    /// Rounds through the server list before a query times out
    fn attempts(&self) -> usize;
    fn srv_domain(&self) -> &str {
        DEFAULT_SRV_DOMAIN
    }
}
