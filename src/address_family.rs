use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

/// Address family of a host lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// IPv4, answered from A records
    Inet,
    /// IPv6, answered from AAAA records
    Inet6,
}

impl Default for Family {
    fn default() -> Self {
        Family::Inet
    }
}

impl Family {
    pub fn of(addr: &IpAddr) -> Family {
        match addr {
            IpAddr::V4(_) => Family::Inet,
            IpAddr::V6(_) => Family::Inet6,
        }
    }

    fn any_addr(self) -> IpAddr {
        match self {
            Family::Inet => Ipv4Addr::UNSPECIFIED.into(),
            Family::Inet6 => Ipv6Addr::UNSPECIFIED.into(),
        }
    }

    fn domain(self) -> Domain {
        match self {
            Family::Inet => Domain::IPV4,
            Family::Inet6 => Domain::IPV6,
        }
    }

    fn udp_socket(self) -> io::Result<Socket> {
        Socket::new(self.domain(), Type::DGRAM, Some(Protocol::UDP))
    }

    /// Binds a non-blocking UDP socket on an ephemeral port for talking to
    /// name servers of this family
    pub(crate) fn bind(self) -> io::Result<UdpSocket> {
        let addr: SockAddr = SocketAddr::new(self.any_addr(), 0).into();
        let socket = self.udp_socket()?;
        socket.set_nonblocking(true)?;
        if self == Family::Inet6 {
            socket.set_only_v6(true)?;
        }
        socket.bind(&addr)?;
        Ok(socket.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_ephemeral_v4() {
        let socket = Family::Inet.bind().unwrap();
        let local = socket.local_addr().unwrap();
        assert!(local.is_ipv4());
        assert_ne!(local.port(), 0);
    }

    #[test]
    fn family_of_address() {
        assert_eq!(Family::of(&"127.0.0.1".parse().unwrap()), Family::Inet);
        assert_eq!(Family::of(&"::1".parse().unwrap()), Family::Inet6);
        assert_eq!(Family::default(), Family::Inet);
    }
}
