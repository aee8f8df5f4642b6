//! Callback interfaces a lookup reports to, and the adapters that turn a
//! decoded response into SRV lists and rewritten URIs.
//!
//! Responders are shared as `Rc<RefCell<_>>`: the caller keeps one handle,
//! the resolver keeps another until exactly one of the result or error
//! methods has been called.

use std::cell::RefCell;
use std::mem;
use std::net::IpAddr;
use std::rc::Rc;

use log::{debug, info};
use url::Url;

use crate::address_family::Family;
use crate::dns_parser::{Packet, RRData};
use crate::error::AresError;
use crate::query::QueryResponse;
use crate::record::{DnsRecord, RecordType};

/// Result of a host name lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    /// Canonical name, after following CNAMEs
    pub name: String,
    /// Names that led to the canonical name, in the order they were followed
    pub aliases: Vec<String>,
    pub family: Family,
    pub addresses: Vec<IpAddr>,
}

impl HostEntry {
    pub(crate) fn from_literal(name: &str, addr: IpAddr) -> HostEntry {
        HostEntry {
            name: name.to_owned(),
            aliases: Vec::new(),
            family: Family::of(&addr),
            addresses: vec![addr],
        }
    }

    /// Collects the addresses of `family` owned by the queried name or by
    /// the end of its CNAME chain
    pub(crate) fn from_response(buf: &[u8], family: Family) -> Result<HostEntry, AresError> {
        let packet = Packet::parse(buf)?;
        let mut name = match packet.question() {
            Some(question) => question.qname.to_string(),
            None => return Err(AresError::BadResponse),
        };
        let mut aliases = Vec::new();
        let mut addresses = Vec::new();

        for rr in &packet.answers {
            if !rr.owned_by(&name) {
                continue;
            }
            match (&rr.data, family) {
                (RRData::A(addr), Family::Inet) => addresses.push(IpAddr::V4(*addr)),
                (RRData::AAAA(addr), Family::Inet6) => addresses.push(IpAddr::V6(*addr)),
                (RRData::CNAME(target), _) => {
                    let old = mem::replace(&mut name, target.to_string());
                    aliases.push(old);
                }
                _ => (),
            }
        }

        if addresses.is_empty() {
            return Err(AresError::NoData);
        }
        Ok(HostEntry {
            name,
            aliases,
            family,
            addresses,
        })
    }
}

pub trait HostResponder {
    fn host_result(&mut self, entry: &HostEntry);

    fn host_error(&mut self, code: AresError) {
        info!("host lookup failed: {} ({})", code, code.code());
    }
}

pub trait NameInfoResponder {
    fn name_info_result(&mut self, node: Option<&str>, service: Option<&str>);

    fn name_info_error(&mut self, code: AresError) {
        info!("name info lookup failed: {} ({})", code, code.code());
    }
}

/// Receives the raw answer to a generic query
///
/// The provided `query_result` decodes the buffer with
/// [`QueryResponse::parse`] and reports to `query_success` or
/// `query_error`; implementors normally only provide those two.
pub trait QueryResponder {
    fn query_result(&mut self, buf: &[u8]) -> Result<(), AresError> {
        match QueryResponse::parse(buf) {
            Ok(response) => {
                self.query_success(response);
                Ok(())
            }
            Err(code) => {
                self.query_error(code);
                Err(code)
            }
        }
    }

    fn query_success(&mut self, response: QueryResponse);

    fn query_error(&mut self, code: AresError) {
        info!("query failed: {} ({})", code, code.code());
    }
}

pub trait SrvResponder {
    /// The SRV answers, in the order the server sent them
    fn srv_result(&mut self, records: &[DnsRecord]);

    fn srv_error(&mut self, code: AresError) {
        info!("SRV lookup failed: {} ({})", code, code.code());
    }
}

pub trait UriRewriteResponder {
    /// Candidate URIs, best first
    ///
    /// Holds the original URI alone when no rewrite was possible.
    fn rewrite_result(&mut self, uris: &[String]);
}

pub(crate) struct SrvQuery<R: ?Sized> {
    responder: Rc<RefCell<R>>,
}

impl<R: SrvResponder + ?Sized> SrvQuery<R> {
    pub(crate) fn new(responder: Rc<RefCell<R>>) -> Self {
        SrvQuery { responder }
    }
}

impl<R: SrvResponder + ?Sized> QueryResponder for SrvQuery<R> {
    fn query_success(&mut self, response: QueryResponse) {
        if response.record_type() != RecordType::Srv {
            self.responder
                .borrow_mut()
                .srv_error(AresError::BadResponse);
            return;
        }
        let records: Vec<DnsRecord> = response
            .into_answers()
            .into_iter()
            .filter(|r| r.record_type() == RecordType::Srv)
            .collect();
        self.responder.borrow_mut().srv_result(&records);
    }

    fn query_error(&mut self, code: AresError) {
        self.responder.borrow_mut().srv_error(code);
    }
}

/// Rewrites a URI from the SRV records of `_<scheme>._tcp.<host>`
pub(crate) struct UriRewriteQuery<R: ?Sized> {
    uri: Url,
    domain: String,
    responder: Rc<RefCell<R>>,
}

impl<R: UriRewriteResponder + ?Sized> UriRewriteQuery<R> {
    pub(crate) fn new(uri: Url, domain: &str, responder: Rc<RefCell<R>>) -> Self {
        UriRewriteQuery {
            uri,
            domain: domain.to_owned(),
            responder,
        }
    }

    /// The SRV name to look up, None when the URI has no host
    pub(crate) fn srv_name(&self) -> Option<String> {
        let host = self.uri.host_str()?;
        Some(format!("_{}._tcp.{}", self.uri.scheme(), host))
    }

    /// Reports the URI unchanged
    pub(crate) fn unchanged(&self) {
        let uris = [self.uri.to_string()];
        self.responder.borrow_mut().rewrite_result(&uris);
    }

    // only targets inside the configured domain are used
    fn trusted(&self, host: &str) -> bool {
        host.trim_end_matches('.').ends_with(self.domain.as_str())
    }

    fn rewrite(&self, srv: &DnsRecord) -> Option<String> {
        let record = srv.srv()?;
        if !self.trusted(&record.target) {
            debug!("ignoring SRV target {} outside {}", record.target, self.domain);
            return None;
        }
        let mut uri = self.uri.clone();
        uri.set_host(Some(record.target.trim_end_matches('.'))).ok()?;
        if self.uri.port().is_none() {
            uri.set_port(Some(record.port)).ok()?;
        }
        Some(uri.to_string())
    }
}

impl<R: UriRewriteResponder + ?Sized> QueryResponder for UriRewriteQuery<R> {
    fn query_success(&mut self, response: QueryResponse) {
        let uris: Vec<String> = response
            .answers()
            .iter()
            .filter_map(|srv| self.rewrite(srv))
            .collect();
        if uris.is_empty() {
            self.unchanged();
        } else {
            self.responder.borrow_mut().rewrite_result(&uris);
        }
    }

    fn query_error(&mut self, code: AresError) {
        debug!("keeping {} after SRV lookup failed: {}", self.uri, code);
        self.unchanged();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns_parser::{self, Builder, QueryClass, QueryType};
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[derive(Default)]
    struct Uris(Vec<String>);

    impl UriRewriteResponder for Uris {
        fn rewrite_result(&mut self, uris: &[String]) {
            self.0 = uris.to_vec();
        }
    }

    #[derive(Default)]
    struct Srvs {
        records: Vec<DnsRecord>,
        error: Option<AresError>,
    }

    impl SrvResponder for Srvs {
        fn srv_result(&mut self, records: &[DnsRecord]) {
            self.records = records.to_vec();
        }
        fn srv_error(&mut self, code: AresError) {
            self.error = Some(code);
        }
    }

    fn srv_response(qname: &'static str, targets: &[(&'static str, u16)]) -> Vec<u8> {
        let name = dns_parser::Name::from_str(qname).unwrap();
        let mut builder = Builder::new_response(3, true, false)
            .add_question(&name, QueryType::SRV, QueryClass::IN)
            .move_to::<dns_parser::Answers>();
        for &(target, port) in targets {
            let data = RRData::SRV {
                priority: 0,
                weight: 0,
                port,
                target: dns_parser::Name::from_str(target).unwrap(),
            };
            builder = builder.add_answer(&name, QueryClass::IN, 60, &data);
        }
        builder.build()
    }

    fn rewrite_query(uri: &str) -> (UriRewriteQuery<Uris>, Rc<RefCell<Uris>>) {
        let responder = Rc::new(RefCell::new(Uris::default()));
        let query = UriRewriteQuery::new(
            Url::parse(uri).unwrap(),
            ".lindenlab.com",
            responder.clone(),
        );
        (query, responder)
    }

    #[test]
    fn rewrite_takes_trusted_targets_in_wire_order() {
        let (mut query, responder) = rewrite_query("https://login.agni.lindenlab.com/cgi-bin/login.cgi");
        assert_eq!(
            query.srv_name().unwrap(),
            "_https._tcp.login.agni.lindenlab.com"
        );
        let buf = srv_response(
            "_https._tcp.login.agni.lindenlab.com",
            &[
                ("evil.example.com", 443),
                ("login1.agni.lindenlab.com", 12043),
                ("login2.agni.lindenlab.com", 12044),
            ],
        );
        query.query_result(&buf).unwrap();
        assert_eq!(
            responder.borrow().0,
            [
                "https://login1.agni.lindenlab.com:12043/cgi-bin/login.cgi",
                "https://login2.agni.lindenlab.com:12044/cgi-bin/login.cgi",
            ]
        );
    }

    #[test]
    fn rewrite_keeps_explicit_port() {
        let (mut query, responder) = rewrite_query("http://login.lindenlab.com:8080/x?y=1");
        let buf = srv_response(
            "_http._tcp.login.lindenlab.com",
            &[("login3.lindenlab.com", 12043)],
        );
        query.query_result(&buf).unwrap();
        assert_eq!(responder.borrow().0, ["http://login3.lindenlab.com:8080/x?y=1"]);
    }

    #[test]
    fn rewrite_without_trusted_target_is_unchanged() {
        let (mut query, responder) = rewrite_query("https://login.lindenlab.com/");
        let buf = srv_response(
            "_https._tcp.login.lindenlab.com",
            &[("lindenlab.com.evil.example", 443)],
        );
        query.query_result(&buf).unwrap();
        assert_eq!(responder.borrow().0, ["https://login.lindenlab.com/"]);
    }

    #[test]
    fn rewrite_error_is_unchanged() {
        let (mut query, responder) = rewrite_query("https://login.lindenlab.com/");
        query.query_error(AresError::NotFound);
        assert_eq!(responder.borrow().0, ["https://login.lindenlab.com/"]);
    }

    #[test]
    fn srv_query_filters_records() {
        let responder = Rc::new(RefCell::new(Srvs::default()));
        let mut query = SrvQuery::new(responder.clone());
        let buf = srv_response(
            "_sip._udp.example.com",
            &[("a.example.com", 5060), ("b.example.com", 5061)],
        );
        query.query_result(&buf).unwrap();
        let srvs = responder.borrow();
        assert!(srvs.error.is_none());
        let ports: Vec<u16> = srvs.records.iter().map(|r| r.srv().unwrap().port).collect();
        assert_eq!(ports, [5060, 5061]);
    }

    #[test]
    fn srv_query_reports_parse_errors() {
        let responder = Rc::new(RefCell::new(Srvs::default()));
        let mut query = SrvQuery::new(responder.clone());
        let buf = srv_response("_sip._udp.example.com", &[]);
        assert_eq!(query.query_result(&buf), Err(AresError::NoData));
        assert_eq!(responder.borrow().error, Some(AresError::NoData));
    }

    #[test]
    fn host_entry_follows_cname() {
        let name = dns_parser::Name::from_str("www.example.com").unwrap();
        let canonical = dns_parser::Name::from_str("web.example.net").unwrap();
        let buf = Builder::new_response(9, true, false)
            .add_question(&name, QueryType::A, QueryClass::IN)
            .add_answer(&name, QueryClass::IN, 60, &RRData::CNAME(canonical.clone()))
            .add_answer(&canonical, QueryClass::IN, 60, &RRData::A(Ipv4Addr::new(192, 0, 2, 1)))
            .add_answer(&canonical, QueryClass::IN, 60, &RRData::AAAA(Ipv6Addr::LOCALHOST))
            .add_answer(&canonical, QueryClass::IN, 60, &RRData::A(Ipv4Addr::new(192, 0, 2, 2)))
            .build();

        let entry = HostEntry::from_response(&buf, Family::Inet).unwrap();
        assert_eq!(entry.name, "web.example.net");
        assert_eq!(entry.aliases, ["www.example.com"]);
        assert_eq!(
            entry.addresses,
            [
                IpAddr::from([192, 0, 2, 1]),
                IpAddr::from([192, 0, 2, 2]),
            ]
        );

        let entry = HostEntry::from_response(&buf, Family::Inet6).unwrap();
        assert_eq!(entry.addresses, [IpAddr::from(Ipv6Addr::LOCALHOST)]);
    }

    #[test]
    fn host_entry_skips_unknown_record_types() {
        let name = dns_parser::Name::from_str("sim.agni.lindenlab.com").unwrap();
        let dname = RRData::Unknown {
            typ: 39,
            data: b"\x03sim\x00",
        };
        let buf = Builder::new_response(9, true, false)
            .add_question(&name, QueryType::A, QueryClass::IN)
            .add_answer(&name, QueryClass::IN, 60, &RRData::A(Ipv4Addr::new(192, 0, 2, 5)))
            .add_answer(&name, QueryClass::IN, 60, &dname)
            .build();
        let entry = HostEntry::from_response(&buf, Family::Inet).unwrap();
        assert_eq!(entry.addresses, [IpAddr::from([192, 0, 2, 5])]);
    }

    #[test]
    fn host_entry_without_addresses() {
        let name = dns_parser::Name::from_str("www.example.com").unwrap();
        let buf = Builder::new_response(9, true, false)
            .add_question(&name, QueryType::AAAA, QueryClass::IN)
            .add_answer(&name, QueryClass::IN, 60, &RRData::A(Ipv4Addr::LOCALHOST))
            .build();
        assert_eq!(
            HostEntry::from_response(&buf, Family::Inet6),
            Err(AresError::NoData)
        );
    }
}
