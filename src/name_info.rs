//! Flags and helpers for reverse (address to name) lookups.

use std::fmt::Write;
use std::net::IpAddr;

use bitflags::bitflags;

use crate::dns_parser::{Packet, RRData};
use crate::error::AresError;

bitflags! {
    /// Options for [`Ares::get_name_info`](crate::Ares::get_name_info)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NameInfoFlags: u32 {
        /// Only the first label of the host name
        const NOFQDN = 1 << 0;
        /// The address in numeric form, no lookup
        const NUMERICHOST = 1 << 1;
        /// Fail instead of falling back to the numeric address
        const NAMEREQD = 1 << 2;
        /// The port in numeric form
        const NUMERICSERV = 1 << 3;
        /// Look the service up as a datagram (udp) service
        const DGRAM = 1 << 4;
        const LOOKUPHOST = 1 << 8;
        const LOOKUPSERVICE = 1 << 9;
    }
}

impl NameInfoFlags {
    /// Host lookup is implied when neither lookup flag is given
    pub(crate) fn wants_host(self) -> bool {
        self.contains(NameInfoFlags::LOOKUPHOST) || !self.contains(NameInfoFlags::LOOKUPSERVICE)
    }

    pub(crate) fn wants_service(self) -> bool {
        self.contains(NameInfoFlags::LOOKUPSERVICE)
    }
}

/// The `in-addr.arpa` or `ip6.arpa` name a PTR query for `addr` asks for
pub fn reverse_name(addr: &IpAddr) -> String {
    let mut name = String::with_capacity(72);
    match addr {
        IpAddr::V4(addr) => {
            let o = addr.octets();
            let _ = write!(name, "{}.{}.{}.{}.in-addr.arpa", o[3], o[2], o[1], o[0]);
        }
        IpAddr::V6(addr) => {
            for byte in addr.octets().iter().rev() {
                let _ = write!(name, "{:x}.{:x}.", byte & 0x0f, byte >> 4);
            }
            name.push_str("ip6.arpa");
        }
    }
    name
}

const TCP_SERVICES: &[(u16, &str)] = &[
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (53, "domain"),
    (80, "http"),
    (110, "pop3"),
    (143, "imap"),
    (443, "https"),
    (587, "submission"),
    (993, "imaps"),
    (995, "pop3s"),
];

const UDP_SERVICES: &[(u16, &str)] = &[
    (53, "domain"),
    (67, "bootps"),
    (68, "bootpc"),
    (69, "tftp"),
    (123, "ntp"),
    (161, "snmp"),
    (514, "syslog"),
    (3478, "stun"),
];

/// Service name for `port`, or the number when none is known or
/// `NUMERICSERV` is set
pub(crate) fn service_name(port: u16, flags: NameInfoFlags) -> String {
    if !flags.contains(NameInfoFlags::NUMERICSERV) {
        let table = if flags.contains(NameInfoFlags::DGRAM) {
            UDP_SERVICES
        } else {
            TCP_SERVICES
        };
        if let Some((_, name)) = table.iter().find(|(p, _)| *p == port) {
            return (*name).to_owned();
        }
    }
    port.to_string()
}

/// Applies `NOFQDN` to a resolved host name
pub(crate) fn node_name(host: &str, flags: NameInfoFlags) -> String {
    if flags.contains(NameInfoFlags::NOFQDN) {
        host.split('.').next().unwrap_or(host).to_owned()
    } else {
        host.to_owned()
    }
}

/// Target of the first PTR answer owned by the queried name, following
/// CNAMEs such as classless in-addr.arpa delegations
pub(crate) fn ptr_target(buf: &[u8]) -> Result<String, AresError> {
    let packet = Packet::parse(buf)?;
    let mut owner = match packet.question() {
        Some(question) => question.qname.to_string(),
        None => return Err(AresError::BadResponse),
    };
    for rr in &packet.answers {
        if !rr.owned_by(&owner) {
            continue;
        }
        match rr.data {
            RRData::PTR(ref name) => return Ok(name.to_string()),
            RRData::CNAME(ref target) => owner = target.to_string(),
            _ => (),
        }
    }
    Err(AresError::NoData)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns_parser::{Builder, Name, QueryClass, QueryType};

    #[test]
    fn reverse_v4() {
        assert_eq!(
            reverse_name(&"192.0.2.10".parse().unwrap()),
            "10.2.0.192.in-addr.arpa"
        );
    }

    #[test]
    fn reverse_v6() {
        assert_eq!(
            reverse_name(&"2001:db8::567:89ab".parse().unwrap()),
            "b.a.9.8.7.6.5.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa"
        );
    }

    #[test]
    fn services() {
        assert_eq!(service_name(443, NameInfoFlags::empty()), "https");
        assert_eq!(service_name(443, NameInfoFlags::NUMERICSERV), "443");
        assert_eq!(service_name(123, NameInfoFlags::DGRAM), "ntp");
        assert_eq!(service_name(123, NameInfoFlags::empty()), "123");
    }

    #[test]
    fn lookup_flags() {
        assert!(NameInfoFlags::empty().wants_host());
        assert!(!NameInfoFlags::LOOKUPSERVICE.wants_host());
        assert!((NameInfoFlags::LOOKUPSERVICE | NameInfoFlags::LOOKUPHOST).wants_host());
        assert_eq!(node_name("sim1.agni.example.com", NameInfoFlags::NOFQDN), "sim1");
    }

    #[test]
    fn ptr_answer_of_the_queried_name() {
        let owner = Name::from_str("10.2.0.192.in-addr.arpa").unwrap();
        let other = Name::from_str("11.2.0.192.in-addr.arpa").unwrap();
        let wrong = Name::from_str("wrong.example.com").unwrap();
        let right = Name::from_str("sim1.agni.example.com").unwrap();
        let buf = Builder::new_response(5, true, false)
            .add_question(&owner, QueryType::PTR, QueryClass::IN)
            .add_answer(&other, QueryClass::IN, 60, &RRData::PTR(wrong))
            .add_answer(&owner, QueryClass::IN, 60, &RRData::PTR(right))
            .build();
        assert_eq!(ptr_target(&buf).unwrap(), "sim1.agni.example.com");

        let empty = Builder::new_response(5, true, false)
            .add_question(&owner, QueryType::PTR, QueryClass::IN)
            .build();
        assert_eq!(ptr_target(&empty), Err(AresError::NoData));
    }

    #[test]
    fn ptr_follows_classless_delegation() {
        let owner = Name::from_str("5.2.0.192.in-addr.arpa").unwrap();
        let delegated = Name::from_str("5.0-25.2.0.192.in-addr.arpa").unwrap();
        let host = Name::from_str("sim5.agni.example.com").unwrap();
        let buf = Builder::new_response(5, true, false)
            .add_question(&owner, QueryType::PTR, QueryClass::IN)
            .add_answer(&owner, QueryClass::IN, 60, &RRData::CNAME(delegated.clone()))
            .add_answer(
                &delegated,
                QueryClass::IN,
                60,
                &RRData::Unknown {
                    typ: 65,
                    data: b"\x00\x01\x00",
                },
            )
            .add_answer(&delegated, QueryClass::IN, 60, &RRData::PTR(host))
            .build();
        assert_eq!(ptr_target(&buf).unwrap(), "sim5.agni.example.com");
    }

    #[test]
    fn flags_from_bits() {
        assert_eq!(
            NameInfoFlags::from_bits_truncate(0x0301 | 0x8000),
            NameInfoFlags::LOOKUPHOST | NameInfoFlags::LOOKUPSERVICE | NameInfoFlags::NOFQDN
        );
        assert_eq!(NameInfoFlags::default(), NameInfoFlags::empty());
    }
}
