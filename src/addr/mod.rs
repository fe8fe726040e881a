//! Address families and related types.
//!
//! Two families are supported:
//! - `Ipv4`: Internet Protocol version 4
//! - `Ipv6`: Internet Protocol version 6
//!
//! Both parse text through the `const fn` grammar in [`parse`], so a literal
//! checked at compile time and the same text parsed at runtime are identical.

mod ipv4;
mod ipv6;
pub mod parse;

pub use self::ipv4::{Ipv4, SocketAddrV4};
pub use self::ipv6::{Ipv6, SocketAddrV6};

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Malformed address text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum AddressError {
	#[error("invalid address")]
	Invalid,
}

/// Trait for address family markers.
///
/// Each type implementing this trait represents an address family
/// that can be passed to the `socket()` syscall.
pub trait Domain: Send + Sync + 'static {
	/// Socket address type of this family.
	type Addr: ToSockAddr + FromSockAddr + Copy + Eq + Hash + Debug + Display + Send + Sync;

	/// Returns the libc constant for this address family.
	fn raw() -> libc::c_int;

	/// Parses address text plus port for this family.
	fn parse(text: &str, port: u16) -> Result<Self::Addr, AddressError>;
}

/// An address value that names its own family.
///
/// Lets the `Net` constructors infer the domain from the address passed in.
pub trait SocketAddr: Copy + Debug + Display + Send + Sync + 'static {
	/// Family this address belongs to.
	type Domain: Domain<Addr = Self>;
}

impl SocketAddr for SocketAddrV4 {
	type Domain = Ipv4;
}

impl SocketAddr for SocketAddrV6 {
	type Domain = Ipv6;
}

/// Trait for address types that can be converted to raw sockaddr for syscalls.
pub trait ToSockAddr {
	/// Calls the provided closure with a pointer to the raw sockaddr and its size.
	fn with_raw<F, R>(&self, f: F) -> R
	where
		F: FnOnce(*const libc::sockaddr, libc::socklen_t) -> R;
}

/// Trait for address types that can be created from raw sockaddr.
pub trait FromSockAddr: Sized {
	/// Creates address from raw sockaddr storage.
	///
	/// Returns `None` when the storage is too short or holds another family.
	///
	/// # Safety
	/// `addr` must point to at least `len` readable bytes.
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self>;
}

impl FromSockAddr for SocketAddrV4 {
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self> {
		if len < std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t {
			return None;
		}
		let raw = unsafe { &*(addr as *const libc::sockaddr_in) };
		if raw.sin_family as libc::c_int != libc::AF_INET {
			return None;
		}
		Some(Self::from_raw(raw))
	}
}

impl FromSockAddr for SocketAddrV6 {
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self> {
		if len < std::mem::size_of::<libc::sockaddr_in6>() as libc::socklen_t {
			return None;
		}
		let raw = unsafe { &*(addr as *const libc::sockaddr_in6) };
		if raw.sin6_family as libc::c_int != libc::AF_INET6 {
			return None;
		}
		Some(Self::from_raw(raw))
	}
}

/// Reads a peer or local address out of `sockaddr_storage` filled by the kernel.
pub(crate) fn from_storage<A: FromSockAddr>(
	storage: &libc::sockaddr_storage,
	len: libc::socklen_t,
) -> Option<A> {
	// sockaddr_storage is large enough and aligned for every family.
	unsafe { A::from_sockaddr(storage as *const _ as *const libc::sockaddr, len) }
}
