use std::fmt;
use std::hash::{Hash, Hasher};

use crate::addr::parse::parse_ipv6;
use crate::addr::{AddressError, Domain, ToSockAddr};

/// IPv6 address family marker.
///
/// Sockets with this domain use 128-bit addresses (e.g., ::1).
#[derive(Debug)]
pub struct Ipv6;

impl Domain for Ipv6 {
	type Addr = SocketAddrV6;

	#[inline]
	fn raw() -> libc::c_int {
		libc::AF_INET6
	}

	fn parse(text: &str, port: u16) -> Result<SocketAddrV6, AddressError> {
		SocketAddrV6::parse(text, port)
	}
}

/// IPv6 socket address (IP + port + scope).
///
/// IP and port are kept in network byte order. Equality and hashing cover
/// only those two; the scope is routing detail supplied by the kernel.
#[derive(Clone, Copy)]
pub struct SocketAddrV6 {
	ip: [u8; 16],
	port: u16,
	/// Scope ID for link-local addresses (identifies network interface).
	/// Usually 0 unless the kernel reports a link-local peer.
	scope_id: u32,
}

impl SocketAddrV6 {
	/// Creates a new IPv6 address from network-order IP bytes and a host-order port.
	pub const fn new(ip: [u8; 16], port: u16) -> Self {
		Self { ip, port: port.to_be(), scope_id: 0 }
	}

	/// Creates with explicit scope ID.
	///
	/// Use for link-local addresses (fe80::) where you need to specify the interface.
	pub const fn with_scope(ip: [u8; 16], port: u16, scope_id: u32) -> Self {
		Self { ip, port: port.to_be(), scope_id }
	}

	/// `[::]:port`.
	pub const fn any(port: u16) -> Self {
		Self::new([0; 16], port)
	}

	/// `[::1]:port`.
	pub const fn localhost(port: u16) -> Self {
		let mut ip = [0; 16];
		ip[15] = 1;
		Self::new(ip, port)
	}

	/// Parses address text at runtime.
	pub fn parse(text: &str, port: u16) -> Result<Self, AddressError> {
		let ip = parse_ipv6(text.as_bytes())?;
		Ok(Self::new(ip, port))
	}

	/// Parses an address literal in a constant context.
	///
	/// ```
	/// use wiregate::SocketAddrV6;
	///
	/// const MAPPED: SocketAddrV6 = SocketAddrV6::literal("::ffff:192.168.0.1", 53);
	/// assert_eq!(MAPPED.segments()[5..], [0xffff, 0xc0a8, 0x0001]);
	/// ```
	///
	/// ```compile_fail
	/// use wiregate::SocketAddrV6;
	///
	/// const BROKEN: SocketAddrV6 = SocketAddrV6::literal("1::2::3", 53);
	/// ```
	pub const fn literal(text: &str, port: u16) -> Self {
		match parse_ipv6(text.as_bytes()) {
			Ok(ip) => Self::new(ip, port),
			Err(_) => panic!("invalid IPv6 address literal"),
		}
	}

	/// Returns the IP bytes.
	pub const fn ip(&self) -> [u8; 16] {
		self.ip
	}

	/// Returns the eight 16-bit groups in host order.
	pub const fn segments(&self) -> [u16; 8] {
		let mut segments = [0u16; 8];
		let mut i = 0;
		while i < 8 {
			segments[i] = u16::from_be_bytes([self.ip[i * 2], self.ip[i * 2 + 1]]);
			i += 1;
		}
		segments
	}

	/// Returns the port in host byte order.
	pub const fn port(&self) -> u16 {
		u16::from_be(self.port)
	}

	/// Returns the scope ID.
	pub const fn scope_id(&self) -> u32 {
		self.scope_id
	}

	/// Converts to the raw sockaddr_in6 for syscalls.
	pub(crate) fn to_raw(&self) -> libc::sockaddr_in6 {
		let mut raw: libc::sockaddr_in6 = unsafe { std::mem::zeroed() };
		raw.sin6_family = libc::AF_INET6 as libc::sa_family_t;
		raw.sin6_port = self.port;
		raw.sin6_addr = libc::in6_addr { s6_addr: self.ip };
		raw.sin6_scope_id = self.scope_id;
		raw
	}

	/// Creates from raw sockaddr_in6.
	pub(crate) fn from_raw(raw: &libc::sockaddr_in6) -> Self {
		Self {
			ip: raw.sin6_addr.s6_addr,
			port: raw.sin6_port,
			scope_id: raw.sin6_scope_id,
		}
	}
}

impl ToSockAddr for SocketAddrV6 {
	fn with_raw<F, R>(&self, f: F) -> R
	where
		F: FnOnce(*const libc::sockaddr, libc::socklen_t) -> R,
	{
		let raw = self.to_raw();
		let ptr = &raw as *const _ as *const libc::sockaddr;
		let len = std::mem::size_of::<libc::sockaddr_in6>() as libc::socklen_t;
		f(ptr, len)
	}
}

impl fmt::Display for SocketAddrV6 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&std::net::SocketAddrV6::from(*self), f)
	}
}

impl fmt::Debug for SocketAddrV6 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

impl From<std::net::SocketAddrV6> for SocketAddrV6 {
	fn from(addr: std::net::SocketAddrV6) -> Self {
		Self::with_scope(addr.ip().octets(), addr.port(), addr.scope_id())
	}
}

impl From<SocketAddrV6> for std::net::SocketAddrV6 {
	fn from(addr: SocketAddrV6) -> Self {
		std::net::SocketAddrV6::new(addr.ip.into(), addr.port(), 0, addr.scope_id)
	}
}

impl PartialEq for SocketAddrV6 {
	fn eq(&self, other: &Self) -> bool {
		self.ip == other.ip && self.port == other.port
	}
}

impl Eq for SocketAddrV6 {}

impl Hash for SocketAddrV6 {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.ip.hash(state);
		self.port.hash(state);
	}
}
