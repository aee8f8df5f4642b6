//! Protocol plumbing for the viewer's message layer.
//!
//! Two independent pieces live here:
//!
//! * [`Ares`], a non-blocking DNS resolver channel. Lookups are issued with a
//!   responder object and complete only while the owner drives the channel
//!   with [`Ares::process`] or [`Ares::process_all`]; there is no background
//!   thread.
//! * [`template`], the tokenizer and parser for the message template file
//!   that describes the layout of every UDP message.

use std::cell::RefCell;
use std::net::{IpAddr, SocketAddr};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use url::Url;

mod address_family;
mod channel;
mod conf;
mod dns_parser;
mod error;
mod name_info;
mod query;
mod record;
mod responders;
pub mod template;

pub use crate::address_family::Family;
pub use crate::conf::{FixedConf, ResolverConf, SystemConf, DEFAULT_SRV_DOMAIN};
pub use crate::error::{AresError, SUCCESS};
pub use crate::name_info::{reverse_name, NameInfoFlags};
pub use crate::query::QueryResponse;
pub use crate::record::{DnsRecord, RecordData, RecordType, SrvRecord};
pub use crate::responders::{
    HostEntry, HostResponder, NameInfoResponder, QueryResponder, SrvResponder,
    UriRewriteResponder,
};

use crate::channel::{Channel, Completion};
use crate::dns_parser::{Name, QueryType};
use crate::responders::{SrvQuery, UriRewriteQuery};

/// A resolver channel driven by its owner
///
/// Every lookup reports to its responder exactly once, either from inside
/// the lookup call (when no I/O is needed or the channel is unusable) or
/// from a later [`process`](Ares::process), [`process_all`](Ares::process_all)
/// or [`cancel`](Ares::cancel). Dropping the resolver fails whatever is still
/// pending with [`AresError::Destruction`].
///
/// The channel is single threaded: `Ares` is neither `Send` nor `Sync`, and
/// `process` must not be called from inside an async runtime.
pub struct Ares {
    conf: Arc<dyn ResolverConf>,
    channel: Option<Channel>,
}

impl Ares {
    /// A resolver using the host's resolv.conf
    pub fn new() -> Ares {
        Ares::with_conf(SystemConf::get())
    }

    pub fn with_conf(conf: Arc<dyn ResolverConf>) -> Ares {
        let channel = match Channel::new(&*conf) {
            Ok(channel) => Some(channel),
            Err(err) => {
                warn!("could not initialize resolver channel: {}", err);
                None
            }
        };
        Ares { conf, channel }
    }

    pub fn is_initialized(&self) -> bool {
        self.channel.is_some()
    }

    /// Looks up the addresses of `name`
    ///
    /// Address literals are answered immediately.
    pub fn get_host_by_name<R: HostResponder + 'static>(
        &mut self,
        name: &str,
        responder: Rc<RefCell<R>>,
        family: Family,
    ) {
        if let Ok(addr) = name.parse::<IpAddr>() {
            if Family::of(&addr) == family {
                let entry = HostEntry::from_literal(name, addr);
                responder.borrow_mut().host_result(&entry);
            } else {
                debug!("{} is not a {:?} address", name, family);
                responder.borrow_mut().host_error(AresError::NotFound);
            }
            return;
        }
        let qtype = match family {
            Family::Inet => QueryType::A,
            Family::Inet6 => QueryType::AAAA,
        };
        self.submit_search(name, qtype, Completion::Host { family, responder });
    }

    /// Finds the host name and service name of `addr`
    pub fn get_name_info<R: NameInfoResponder + 'static>(
        &mut self,
        addr: SocketAddr,
        flags: NameInfoFlags,
        responder: Rc<RefCell<R>>,
    ) {
        if !flags.wants_host() || flags.contains(NameInfoFlags::NUMERICHOST) {
            let node = if flags.wants_host() {
                Some(addr.ip().to_string())
            } else {
                None
            };
            let service = if flags.wants_service() {
                Some(name_info::service_name(addr.port(), flags))
            } else {
                None
            };
            responder
                .borrow_mut()
                .name_info_result(node.as_deref(), service.as_deref());
            return;
        }
        let completion = Completion::NameInfo {
            addr,
            flags,
            responder,
        };
        match self.channel.as_mut() {
            Some(channel) => {
                channel.submit(vec![reverse_name(&addr.ip())], QueryType::PTR, completion)
            }
            None => completion.complete(Err(AresError::NotInitialized)),
        }
    }

    /// Looks up the SRV records of `name`
    pub fn get_srv_records<R: SrvResponder + 'static>(
        &mut self,
        name: &str,
        responder: Rc<RefCell<R>>,
    ) {
        let query = SrvQuery::new(responder);
        self.search(name, RecordType::Srv, Rc::new(RefCell::new(query)));
    }

    /// Rewrites `uri` from the SRV records of `_<scheme>._tcp.<host>`
    ///
    /// Only targets inside [`ResolverConf::srv_domain`] are used. When none
    /// qualifies, or the lookup fails, the responder gets the original URI.
    pub fn rewrite_uri<R: UriRewriteResponder + 'static>(
        &mut self,
        uri: &str,
        responder: Rc<RefCell<R>>,
    ) {
        let parsed = match Url::parse(uri) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("cannot rewrite {:?}: {}", uri, err);
                responder.borrow_mut().rewrite_result(&[uri.to_owned()]);
                return;
            }
        };
        let query = UriRewriteQuery::new(parsed, self.conf.srv_domain(), responder);
        match query.srv_name() {
            Some(name) => self.search(&name, RecordType::Srv, Rc::new(RefCell::new(query))),
            None => query.unchanged(),
        }
    }

    /// Queries `query` for records of `record_type`, walking the search list
    ///
    /// The responder receives the raw answer through
    /// [`QueryResponder::query_result`].
    pub fn search<R: QueryResponder + 'static>(
        &mut self,
        query: &str,
        record_type: RecordType,
        responder: Rc<RefCell<R>>,
    ) {
        self.submit_search(
            query,
            record_type.query_type(),
            Completion::Query { responder },
        );
    }

    fn submit_search(&mut self, name: &str, qtype: QueryType, completion: Completion) {
        match self.channel.as_mut() {
            Some(channel) => {
                let names = channel.search_names(name);
                channel.submit(names, qtype, completion);
            }
            None => completion.complete(Err(AresError::NotInitialized)),
        }
    }

    /// Ends every pending lookup with [`AresError::Timeout`]
    pub fn cancel(&mut self) {
        if let Some(channel) = self.channel.as_mut() {
            channel.fail_all(AresError::Timeout);
        }
    }

    /// Waits at most `timeout` for answers and dispatches what arrived
    ///
    /// Returns whether any answer was handled or any lookup ended or moved
    /// on to another server.
    pub fn process(&mut self, timeout: Duration) -> bool {
        match self.channel.as_mut() {
            Some(channel) => channel.process(timeout),
            None => false,
        }
    }

    /// Processes until no lookup is pending
    pub fn process_all(&mut self) -> bool {
        match self.channel.as_mut() {
            Some(channel) => channel.process_all(),
            None => false,
        }
    }

    /// Time until the next pending lookup times out, None when idle
    pub fn next_timeout(&self) -> Option<Duration> {
        self.channel.as_ref().and_then(Channel::next_timeout)
    }

    pub fn pending(&self) -> usize {
        self.channel.as_ref().map_or(0, Channel::pending)
    }

    /// Decodes the possibly compressed name at `offset` of `buf`
    ///
    /// Returns the dotted name and the number of bytes it occupies at
    /// `offset`.
    pub fn expand_name(buf: &[u8], offset: usize) -> Result<(String, usize), AresError> {
        Name::expand(buf, offset).map_err(|_| AresError::BadName)
    }

    /// Text for a numeric status code
    pub fn strerror(code: i32) -> String {
        AresError::describe(code)
    }
}

impl Default for Ares {
    fn default() -> Self {
        Ares::new()
    }
}
