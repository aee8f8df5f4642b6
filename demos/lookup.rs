use std::cell::RefCell;
use std::env;
use std::rc::Rc;

use llmessage::{
    Ares, AresError, DnsRecord, Family, HostEntry, HostResponder, SrvResponder,
    UriRewriteResponder,
};

struct Printer;

impl HostResponder for Printer {
    fn host_result(&mut self, entry: &HostEntry) {
        println!("{} ({:?}): {:?}", entry.name, entry.family, entry.addresses);
        if !entry.aliases.is_empty() {
            println!("  aliases: {}", entry.aliases.join(", "));
        }
    }

    fn host_error(&mut self, code: AresError) {
        println!("host lookup failed: {}", code);
    }
}

impl SrvResponder for Printer {
    fn srv_result(&mut self, records: &[DnsRecord]) {
        for srv in records.iter().filter_map(DnsRecord::srv) {
            println!(
                "SRV {} {} {} {}",
                srv.priority, srv.weight, srv.port, srv.target
            );
        }
    }

    fn srv_error(&mut self, code: AresError) {
        println!("SRV lookup failed: {}", code);
    }
}

impl UriRewriteResponder for Printer {
    fn rewrite_result(&mut self, uris: &[String]) {
        for uri in uris {
            println!("rewritten: {}", uri);
        }
    }
}

pub fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "lindenlab.com".to_owned());

    let mut ares = Ares::new();
    if !ares.is_initialized() {
        eprintln!("resolver could not be initialized");
        return;
    }

    let printer = Rc::new(RefCell::new(Printer));
    ares.get_host_by_name(&name, printer.clone(), Family::Inet);
    ares.get_host_by_name(&name, printer.clone(), Family::Inet6);
    ares.get_srv_records(&format!("_sip._udp.{}", name), printer.clone());
    if let Some(uri) = args.next() {
        ares.rewrite_uri(&uri, printer);
    }

    ares.process_all();
}
