use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future;
use std::io;
use std::io::ErrorKind::WouldBlock;
use std::net::{self, SocketAddr};
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::{debug, error, trace, warn};
use rand::{thread_rng, Rng};
use tokio::net::UdpSocket;
use tokio::runtime::{self, Runtime};

use crate::address_family::Family;
use crate::conf::ResolverConf;
use crate::dns_parser::{self, Header, Name, QueryType, Question, ResponseCode};
use crate::error::AresError;
use crate::name_info::{node_name, ptr_target, service_name, NameInfoFlags};
use crate::responders::{HostEntry, HostResponder, NameInfoResponder, QueryResponder};

/// What to do with the answer once a query is over
pub(crate) enum Completion {
    Host {
        family: Family,
        responder: Rc<RefCell<dyn HostResponder>>,
    },
    NameInfo {
        addr: SocketAddr,
        flags: NameInfoFlags,
        responder: Rc<RefCell<dyn NameInfoResponder>>,
    },
    Query {
        responder: Rc<RefCell<dyn QueryResponder>>,
    },
}

impl Completion {
    pub(crate) fn complete(self, outcome: Result<&[u8], AresError>) {
        self.deliver(outcome);
    }

    // Calls the responder and returns the state matching the callback that
    // fired: a decoded answer can still end in the error callback.
    fn deliver(self, outcome: Result<&[u8], AresError>) -> QueryState {
        let delivered = match self {
            Completion::Host { family, responder } => {
                match outcome.and_then(|buf| HostEntry::from_response(buf, family)) {
                    Ok(entry) => {
                        responder.borrow_mut().host_result(&entry);
                        Ok(())
                    }
                    Err(code) => {
                        responder.borrow_mut().host_error(code);
                        Err(code)
                    }
                }
            }
            Completion::NameInfo {
                addr,
                flags,
                responder,
            } => {
                let service = if flags.wants_service() {
                    Some(service_name(addr.port(), flags))
                } else {
                    None
                };
                match outcome.and_then(ptr_target) {
                    Ok(host) => {
                        responder.borrow_mut().name_info_result(
                            Some(node_name(&host, flags).as_str()),
                            service.as_deref(),
                        );
                        Ok(())
                    }
                    Err(code) if flags.contains(NameInfoFlags::NAMEREQD) => {
                        responder.borrow_mut().name_info_error(code);
                        Err(code)
                    }
                    Err(code) => {
                        debug!("no name for {}: {}, answering numerically", addr.ip(), code);
                        responder
                            .borrow_mut()
                            .name_info_result(Some(addr.ip().to_string().as_str()), service.as_deref());
                        Ok(())
                    }
                }
            }
            Completion::Query { responder } => match outcome {
                Ok(buf) => responder.borrow_mut().query_result(buf),
                Err(code) => {
                    responder.borrow_mut().query_error(code);
                    Err(code)
                }
            },
        };
        match delivered {
            Ok(()) => QueryState::Completed,
            Err(code) => {
                trace!("query ended in the error callback: {}", code);
                QueryState::Failed
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryState {
    Pending,
    Completed,
    Failed,
}

struct PendingQuery {
    state: QueryState,
    completion: Option<Completion>,
    /// search candidates, tried in order
    names: Vec<String>,
    current: usize,
    qtype: QueryType,
    /// index into the server list, wraps
    server: usize,
    sent_to: Option<SocketAddr>,
    sends: usize,
    deadline: Instant,
    nodata: bool,
    send_error: Option<AresError>,
}

impl PendingQuery {
    fn name(&self) -> &str {
        &self.names[self.current]
    }

    fn packet(&self, id: u16) -> Vec<u8> {
        let name = Name::FromStr(Cow::Owned(self.name().to_owned()));
        dns_parser::Builder::query(id, &name, self.qtype)
    }

    fn finish(&mut self, outcome: Result<&[u8], AresError>) {
        assert_eq!(self.state, QueryState::Pending, "query finished twice");
        self.state = match self.completion.take() {
            Some(completion) => completion.deliver(outcome),
            None if outcome.is_ok() => QueryState::Completed,
            None => QueryState::Failed,
        };
    }
}

struct Endpoint {
    /// readiness and receiving
    socket: UdpSocket,
    /// the same socket; sending never waits
    sender: net::UdpSocket,
}

impl Endpoint {
    // Must be called inside the runtime context.
    fn bind(family: Family) -> io::Result<Endpoint> {
        let std_socket = family.bind()?;
        let sender = std_socket.try_clone()?;
        let socket = UdpSocket::from_std(std_socket)?;
        Ok(Endpoint { socket, sender })
    }
}

/// One resolver channel: its sockets, name servers and in-flight queries
pub(crate) struct Channel {
    runtime: Runtime,
    v4: Option<Endpoint>,
    v6: Option<Endpoint>,
    servers: Vec<SocketAddr>,
    search: Vec<String>,
    ndots: usize,
    timeout: Duration,
    attempts: usize,
    pending: HashMap<u16, PendingQuery>,
}

impl Channel {
    pub(crate) fn new(conf: &dyn ResolverConf) -> io::Result<Channel> {
        let runtime = runtime::Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()?;

        let mut servers = conf.name_servers();
        let (v4, v6) = {
            let _guard = runtime.enter();
            let mut bind = |family: Family| -> Option<Endpoint> {
                if !servers.iter().any(|s| Family::of(&s.ip()) == family) {
                    return None;
                }
                match Endpoint::bind(family) {
                    Ok(endpoint) => Some(endpoint),
                    Err(err) => {
                        warn!("dropping {:?} name servers, cannot bind: {}", family, err);
                        servers.retain(|s| Family::of(&s.ip()) != family);
                        None
                    }
                }
            };
            (bind(Family::Inet), bind(Family::Inet6))
        };

        if servers.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no usable name servers",
            ));
        }

        Ok(Channel {
            runtime,
            v4,
            v6,
            servers,
            search: conf.search_domains(),
            ndots: conf.ndots(),
            timeout: conf.timeout(),
            attempts: conf.attempts().max(1),
            pending: HashMap::new(),
        })
    }

    /// Candidate names for `name` after applying the search list
    pub(crate) fn search_names(&self, name: &str) -> Vec<String> {
        if name.ends_with('.') {
            return vec![name.trim_end_matches('.').to_owned()];
        }
        let mut names: Vec<String> = self
            .search
            .iter()
            .map(|domain| format!("{}.{}", name, domain.trim_matches('.')))
            .collect();
        if name.matches('.').count() >= self.ndots {
            names.insert(0, name.to_owned());
        } else {
            names.push(name.to_owned());
        }
        names
    }

    pub(crate) fn submit(&mut self, names: Vec<String>, qtype: QueryType, completion: Completion) {
        if names.is_empty()
            || names
                .iter()
                .any(|name| Name::from_str(name.clone()).is_err())
        {
            debug!("refusing to query malformed name {:?}", names.first());
            completion.complete(Err(AresError::BadName));
            return;
        }

        let mut id = thread_rng().gen::<u16>();
        while self.pending.contains_key(&id) {
            id = thread_rng().gen::<u16>();
        }

        debug!("query {}: {:?} {}", id, qtype, names[0]);
        self.pending.insert(
            id,
            PendingQuery {
                state: QueryState::Pending,
                completion: Some(completion),
                names,
                current: 0,
                qtype,
                server: 0,
                sent_to: None,
                sends: 0,
                deadline: Instant::now(),
                nodata: false,
                send_error: None,
            },
        );
        self.send(id);
    }

    fn max_sends(&self) -> usize {
        self.servers.len() * self.attempts
    }

    fn send(&mut self, id: u16) {
        let query = match self.pending.get_mut(&id) {
            Some(query) => query,
            None => return,
        };
        let server = self.servers[query.server % self.servers.len()];
        query.sends += 1;
        query.sent_to = Some(server);
        query.deadline = Instant::now() + self.timeout;
        query.send_error = None;
        let packet = query.packet(id);

        let endpoint = match Family::of(&server.ip()) {
            Family::Inet => self.v4.as_ref(),
            Family::Inet6 => self.v6.as_ref(),
        };
        let endpoint = match endpoint {
            Some(endpoint) => endpoint,
            None => {
                query.send_error = Some(AresError::ConnRefused);
                query.deadline = Instant::now();
                return;
            }
        };

        trace!("sending query {} to {:?}", id, server);
        match endpoint.sender.send_to(&packet, server) {
            Ok(sent) if sent == packet.len() => (),
            Ok(_) => warn!("failed to send entire query {}", id),
            Err(ref err) if err.kind() == WouldBlock => {
                warn!("send buffer full, query {} will time out", id)
            }
            Err(err) => {
                warn!("error sending query {} to {:?}: {}", id, server, err);
                query.send_error = Some(AresError::ConnRefused);
                query.deadline = Instant::now();
            }
        }
    }

    /// Waits up to `timeout` for answers, then handles them and expires
    /// overdue attempts
    pub(crate) fn process(&mut self, timeout: Duration) -> bool {
        let v4 = self.v4.as_ref().map(|e| &e.socket);
        let v6 = self.v6.as_ref().map(|e| &e.socket);
        let ready = self
            .runtime
            .block_on(async { tokio::time::timeout(timeout, wait_readable(v4, v6)).await })
            .is_ok();
        if ready {
            trace!("name server socket readable");
        }

        let mut processed = self.recv_packets();
        processed |= self.expire(Instant::now());
        processed
    }

    /// Processes until no query is left
    pub(crate) fn process_all(&mut self) -> bool {
        let mut processed = false;
        while let Some(timeout) = self.next_timeout() {
            processed |= self.process(timeout);
        }
        processed
    }

    pub(crate) fn next_timeout(&self) -> Option<Duration> {
        let now = Instant::now();
        self.pending
            .values()
            .map(|query| query.deadline.saturating_duration_since(now))
            .min()
    }

    pub(crate) fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Fails every pending query with `code`
    pub(crate) fn fail_all(&mut self, code: AresError) {
        let ids: Vec<u16> = self.pending.keys().cloned().collect();
        for id in ids {
            if let Some(mut query) = self.pending.remove(&id) {
                debug!("query {} for {} ended: {}", id, query.name(), code);
                query.finish(Err(code));
            }
        }
    }

    fn recv_packets(&mut self) -> bool {
        let mut recv_buf = [0u8; 65536];
        let mut datagrams = Vec::new();
        for endpoint in self.v4.iter().chain(self.v6.iter()) {
            loop {
                match endpoint.socket.try_recv_from(&mut recv_buf) {
                    Ok((len, addr)) => datagrams.push((recv_buf[..len].to_vec(), addr)),
                    Err(ref err) if err.kind() == WouldBlock => break,
                    Err(err) => {
                        error!("error receiving from name server: {}", err);
                        break;
                    }
                }
            }
        }

        let mut processed = false;
        for (datagram, addr) in datagrams {
            processed |= self.handle_packet(&datagram, addr);
        }
        processed
    }

    fn handle_packet(&mut self, buffer: &[u8], addr: SocketAddr) -> bool {
        trace!("received packet from {:?}", addr);

        let header = match Header::parse(buffer) {
            Ok(header) => header,
            Err(error) => {
                warn!("couldn't parse packet from {:?}: {}", addr, error);
                return false;
            }
        };

        if header.query {
            trace!("ignoring query from {:?}", addr);
            return false;
        }

        let query = match self.pending.get(&header.id) {
            Some(query) => query,
            None => {
                debug!("no pending query {} for packet from {:?}", header.id, addr);
                return false;
            }
        };

        if query.sent_to != Some(addr) {
            warn!("dropping answer to query {} from unexpected {:?}", header.id, addr);
            return false;
        }

        let echoed = header.questions > 0
            && match Question::parse(&buffer[dns_parser::HEADER_SIZE..], buffer) {
                Ok((question, _)) => {
                    question.qtype == query.qtype
                        && question
                            .qname
                            .to_string()
                            .eq_ignore_ascii_case(query.name())
                }
                Err(_) => false,
            };
        if !echoed {
            warn!("dropping answer to query {} that doesn't echo the question", header.id);
            return false;
        }

        if header.truncated {
            warn!("answer to query {} from {:?} is truncated", header.id, addr);
        }

        let status = match header.response_code {
            ResponseCode::NoError if header.answers == 0 => Err(AresError::NoData),
            ResponseCode::NoError => Ok(()),
            ResponseCode::FormatError => Err(AresError::FormErr),
            ResponseCode::ServerFailure => Err(AresError::ServFail),
            ResponseCode::NameError => Err(AresError::NotFound),
            ResponseCode::NotImplemented => Err(AresError::NotImp),
            ResponseCode::Refused => Err(AresError::Refused),
            ResponseCode::Reserved(_) => Err(AresError::BadResponse),
        };
        self.answer(header.id, buffer, status);
        true
    }

    fn answer(&mut self, id: u16, buffer: &[u8], status: Result<(), AresError>) {
        let max_sends = self.max_sends();
        let mut query = match self.pending.remove(&id) {
            Some(query) => query,
            None => return,
        };

        match status {
            Ok(()) => {
                debug!("query {} for {} answered", id, query.name());
                query.finish(Ok(buffer));
            }
            Err(code @ AresError::NotFound) | Err(code @ AresError::NoData)
                if query.current + 1 < query.names.len() =>
            {
                debug!("query {} for {}: {}, trying next name", id, query.name(), code);
                query.nodata |= code == AresError::NoData;
                query.current += 1;
                query.sends = 0;
                self.pending.insert(id, query);
                self.send(id);
            }
            Err(code @ AresError::ServFail)
            | Err(code @ AresError::NotImp)
            | Err(code @ AresError::Refused)
                if query.sends < max_sends =>
            {
                debug!("query {}: {}, trying next server", id, code);
                query.server += 1;
                self.pending.insert(id, query);
                self.send(id);
            }
            Err(code) => {
                let code = if code == AresError::NotFound && query.nodata {
                    AresError::NoData
                } else {
                    code
                };
                debug!("query {} for {} failed: {}", id, query.name(), code);
                query.finish(Err(code));
            }
        }
    }

    fn expire(&mut self, now: Instant) -> bool {
        let overdue: Vec<u16> = self
            .pending
            .iter()
            .filter(|(_, query)| query.deadline <= now)
            .map(|(id, _)| *id)
            .collect();

        let max_sends = self.max_sends();
        for &id in &overdue {
            let resend = match self.pending.get_mut(&id) {
                Some(query) if query.sends < max_sends => {
                    query.server += 1;
                    true
                }
                Some(_) => false,
                None => continue,
            };
            if resend {
                debug!("query {} timed out, trying next server", id);
                self.send(id);
            } else if let Some(mut query) = self.pending.remove(&id) {
                let code = query.send_error.unwrap_or(AresError::Timeout);
                debug!("query {} for {} failed: {}", id, query.name(), code);
                query.finish(Err(code));
            }
        }
        !overdue.is_empty()
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.fail_all(AresError::Destruction);
    }
}

async fn wait_readable(v4: Option<&UdpSocket>, v6: Option<&UdpSocket>) {
    // let the reactor look at the sockets even when the timeout is zero
    tokio::task::yield_now().await;
    let v4 = async {
        match v4 {
            Some(socket) => {
                let _ = socket.readable().await;
            }
            None => future::pending::<()>().await,
        }
    };
    let v6 = async {
        match v6 {
            Some(socket) => {
                let _ = socket.readable().await;
            }
            None => future::pending::<()>().await,
        }
    };
    tokio::select! {
        _ = v4 => (),
        _ = v6 => (),
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::dns_parser::{Builder, QueryClass, RRData};
    use crate::query::QueryResponse;

    #[derive(Default)]
    struct Outcome {
        answers: usize,
        errors: Vec<AresError>,
    }

    impl QueryResponder for Outcome {
        fn query_success(&mut self, response: QueryResponse) {
            self.answers = response.answers().len();
        }

        fn query_error(&mut self, code: AresError) {
            self.errors.push(code);
        }
    }

    impl HostResponder for Outcome {
        fn host_result(&mut self, entry: &HostEntry) {
            self.answers = entry.addresses.len();
        }

        fn host_error(&mut self, code: AresError) {
            self.errors.push(code);
        }
    }

    fn a_response(addr: Option<Ipv4Addr>) -> Vec<u8> {
        let name = Name::from_str("sim.agni.lindenlab.com").unwrap();
        let builder = Builder::new_response(1, true, false)
            .add_question(&name, QueryType::A, QueryClass::IN)
            .move_to::<dns_parser::Answers>();
        match addr {
            Some(addr) => builder
                .add_answer(&name, QueryClass::IN, 60, &RRData::A(addr))
                .build(),
            None => builder.build(),
        }
    }

    #[test]
    fn state_follows_the_callback_that_fired() {
        let responder = Rc::new(RefCell::new(Outcome::default()));
        let completion = Completion::Query {
            responder: responder.clone(),
        };
        let buf = a_response(Some(Ipv4Addr::new(192, 0, 2, 5)));
        assert_eq!(completion.deliver(Ok(&buf)), QueryState::Completed);
        assert_eq!(responder.borrow().answers, 1);

        // a reply that arrives but cannot be decoded ends in the error callback
        let responder = Rc::new(RefCell::new(Outcome::default()));
        let completion = Completion::Query {
            responder: responder.clone(),
        };
        let buf = a_response(None);
        assert_eq!(completion.deliver(Ok(&buf)), QueryState::Failed);
        assert_eq!(responder.borrow().errors, [AresError::NoData]);

        let responder = Rc::new(RefCell::new(Outcome::default()));
        let completion = Completion::Host {
            family: Family::Inet6,
            responder: responder.clone(),
        };
        let buf = a_response(Some(Ipv4Addr::new(192, 0, 2, 5)));
        assert_eq!(completion.deliver(Ok(&buf)), QueryState::Failed);
        assert_eq!(responder.borrow().errors, [AresError::NoData]);

        let responder = Rc::new(RefCell::new(Outcome::default()));
        let completion = Completion::Query {
            responder: responder.clone(),
        };
        assert_eq!(completion.deliver(Err(AresError::Timeout)), QueryState::Failed);
        assert_eq!(responder.borrow().errors, [AresError::Timeout]);
    }
}
