use std::fmt;

use crate::addr::parse::parse_ipv4;
use crate::addr::{AddressError, Domain, ToSockAddr};

/// IPv4 address family marker.
///
/// Sockets with this domain use 32-bit addresses (e.g., 192.168.1.1).
#[derive(Debug)]
pub struct Ipv4;

impl Domain for Ipv4 {
	type Addr = SocketAddrV4;

	#[inline]
	fn raw() -> libc::c_int {
		libc::AF_INET
	}

	fn parse(text: &str, port: u16) -> Result<SocketAddrV4, AddressError> {
		SocketAddrV4::parse(text, port)
	}
}

/// IPv4 socket address (IP + port).
///
/// Both fields are kept in network byte order, exactly as they travel in a
/// `sockaddr_in`. Equality and hashing cover only these bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketAddrV4 {
	ip: [u8; 4],
	port: u16,
}

impl SocketAddrV4 {
	/// Creates a new IPv4 address from network-order IP bytes and a host-order port.
	pub const fn new(ip: [u8; 4], port: u16) -> Self {
		Self { ip, port: port.to_be() }
	}

	/// `0.0.0.0:port`, for binding every interface.
	pub const fn any(port: u16) -> Self {
		Self::new([0, 0, 0, 0], port)
	}

	/// `127.0.0.1:port`.
	pub const fn localhost(port: u16) -> Self {
		Self::new([127, 0, 0, 1], port)
	}

	/// Parses address text at runtime.
	///
	/// Accepts dotted-quad text with decimal, octal (`0177`) or hex (`0x7f`)
	/// parts, plus the shorter POSIX forms (`127.1`).
	pub fn parse(text: &str, port: u16) -> Result<Self, AddressError> {
		let ip = parse_ipv4(text.as_bytes())?;
		Ok(Self::new(ip, port))
	}

	/// Parses an address literal in a constant context.
	///
	/// An invalid literal fails the build when used in a `const`:
	///
	/// ```
	/// use wiregate::SocketAddrV4;
	///
	/// const SERVER: SocketAddrV4 = SocketAddrV4::literal("0x7f.0.0.1", 6969);
	/// assert_eq!(SERVER, SocketAddrV4::parse("127.0.0.1", 6969).unwrap());
	/// ```
	///
	/// ```compile_fail
	/// use wiregate::SocketAddrV4;
	///
	/// const BROKEN: SocketAddrV4 = SocketAddrV4::literal("127.0.0.256", 80);
	/// ```
	pub const fn literal(text: &str, port: u16) -> Self {
		match parse_ipv4(text.as_bytes()) {
			Ok(ip) => Self::new(ip, port),
			Err(_) => panic!("invalid IPv4 address literal"),
		}
	}

	/// Returns the IP bytes.
	pub const fn ip(&self) -> [u8; 4] {
		self.ip
	}

	/// Returns the IP as a host-order integer (`192.168.1.50` is `0xC0A80132`).
	pub const fn ip_bits(&self) -> u32 {
		u32::from_be_bytes(self.ip)
	}

	/// Returns the port in host byte order.
	pub const fn port(&self) -> u16 {
		u16::from_be(self.port)
	}

	/// Creates from raw sockaddr_in.
	pub(crate) fn from_raw(raw: &libc::sockaddr_in) -> Self {
		Self {
			ip: raw.sin_addr.s_addr.to_ne_bytes(),
			port: raw.sin_port,
		}
	}

	/// Converts to the raw sockaddr_in for syscalls.
	pub(crate) fn to_raw(&self) -> libc::sockaddr_in {
		let mut raw: libc::sockaddr_in = unsafe { std::mem::zeroed() };
		raw.sin_family = libc::AF_INET as libc::sa_family_t;
		raw.sin_port = self.port;
		raw.sin_addr = libc::in_addr {
			s_addr: u32::from_ne_bytes(self.ip),
		};
		raw
	}
}

impl ToSockAddr for SocketAddrV4 {
	fn with_raw<F, R>(&self, f: F) -> R
	where
		F: FnOnce(*const libc::sockaddr, libc::socklen_t) -> R,
	{
		let raw = self.to_raw();
		let ptr = &raw as *const _ as *const libc::sockaddr;
		let len = std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t;
		f(ptr, len)
	}
}

impl fmt::Display for SocketAddrV4 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let [a, b, c, d] = self.ip;
		write!(f, "{a}.{b}.{c}.{d}:{}", self.port())
	}
}

impl fmt::Debug for SocketAddrV4 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

impl From<std::net::SocketAddrV4> for SocketAddrV4 {
	fn from(addr: std::net::SocketAddrV4) -> Self {
		Self::new(addr.ip().octets(), addr.port())
	}
}

impl From<SocketAddrV4> for std::net::SocketAddrV4 {
	fn from(addr: SocketAddrV4) -> Self {
		std::net::SocketAddrV4::new(addr.ip.into(), addr.port())
	}
}
