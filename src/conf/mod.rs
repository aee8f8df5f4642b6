//! Where the resolver finds its name servers and search rules.

mod fixed_conf;
mod resolver_conf;
mod system_conf;

pub use self::fixed_conf::FixedConf;
pub use self::resolver_conf::{ResolverConf, DEFAULT_SRV_DOMAIN};
pub use self::system_conf::SystemConf;
