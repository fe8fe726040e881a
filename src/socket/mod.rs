//! The session-typed socket.
//!
//! A [`Socket`] carries five type parameters: the address family `D`, the
//! transport `T` (which fixes the protocol), the legality state `S`, the
//! byte-order policy `P`, and the `'net` borrow of the [`Net`] that made it.
//! Operations live in `impl` blocks gated on those parameters, so calling
//! one in the wrong state is a compile error rather than an `EINVAL`.
//!
//! ```no_run
//! use wiregate::{Net, SocketAddrV4, Stream};
//!
//! let net = Net::new()?;
//! let listener = net.server_socket(SocketAddrV4::localhost(6969), 16)?;
//! let client = net.client_socket::<Stream, _>(SocketAddrV4::localhost(6969))?;
//! let peer = listener.accept()?;
//! # drop((client, peer));
//! # Ok::<(), wiregate::Error>(())
//! ```

mod bound;
mod connected;
mod datagram;
mod handle;
mod io;
mod listener;
mod options;
mod poll;
mod raw;
mod state;
mod stream;

pub use self::handle::SocketHandle;
pub use self::listener::PeerConnection;
pub use self::poll::PollFlags;
pub use self::state::{Bound, BoundConnected, BoundListening, Connectable, Connected, IsBound, IsConnected, State, Unbound};
pub use self::stream::Shutdown;

use std::fmt;
use std::marker::PhantomData;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd};

use crate::addr::{Domain, Ipv4};
use crate::error::Result;
use crate::net::Net;

mod sealed {
	pub trait Sealed {}
}

/// Trait for socket type markers.
///
/// Each type implementing this trait represents a socket type
/// that can be passed to the `socket()` syscall, together with the one
/// protocol it runs.
///
/// - `Stream`: reliable, ordered byte stream (TCP)
/// - `Datagram`: unreliable, unordered packets (UDP)
pub trait SockType: sealed::Sealed + Send + Sync + 'static {
	/// The protocol this transport runs.
	type Protocol: Protocol;

	/// Returns the libc constant for this socket type.
	fn raw() -> libc::c_int;

	/// Writes one whole packet.
	#[doc(hidden)]
	fn send_bytes(fd: RawFd, bytes: &[u8]) -> Result<()>;

	/// Fills `buf` with exactly one packet.
	#[doc(hidden)]
	fn recv_bytes(fd: RawFd, buf: &mut [u8]) -> Result<()>;
}

/// Trait for protocol markers.
pub trait Protocol: sealed::Sealed + Send + Sync + 'static {
	/// Returns the `IPPROTO_*` constant.
	fn raw() -> libc::c_int;
}

/// Stream socket marker.
///
/// Provides reliable, ordered, two-way byte streams.
#[derive(Debug)]
pub struct Stream;

/// Datagram socket marker.
///
/// Provides unreliable, unordered packets with preserved boundaries.
#[derive(Debug)]
pub struct Datagram;

/// TCP protocol marker.
#[derive(Debug)]
pub struct Tcp;

/// UDP protocol marker.
#[derive(Debug)]
pub struct Udp;

impl sealed::Sealed for Stream {}
impl sealed::Sealed for Datagram {}
impl sealed::Sealed for Tcp {}
impl sealed::Sealed for Udp {}

impl SockType for Stream {
	type Protocol = Tcp;

	#[inline]
	fn raw() -> libc::c_int {
		libc::SOCK_STREAM
	}

	fn send_bytes(fd: RawFd, bytes: &[u8]) -> Result<()> {
		io::send_all(fd, bytes)
	}

	fn recv_bytes(fd: RawFd, buf: &mut [u8]) -> Result<()> {
		io::recv_exact(fd, buf)
	}
}

impl SockType for Datagram {
	type Protocol = Udp;

	#[inline]
	fn raw() -> libc::c_int {
		libc::SOCK_DGRAM
	}

	fn send_bytes(fd: RawFd, bytes: &[u8]) -> Result<()> {
		io::send_datagram(fd, bytes)
	}

	fn recv_bytes(fd: RawFd, buf: &mut [u8]) -> Result<()> {
		io::recv_datagram_exact(fd, buf)
	}
}

impl Protocol for Tcp {
	#[inline]
	fn raw() -> libc::c_int {
		libc::IPPROTO_TCP
	}
}

impl Protocol for Udp {
	#[inline]
	fn raw() -> libc::c_int {
		libc::IPPROTO_UDP
	}
}

/// Per-socket transfer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
	/// Put numeric fields into network byte order on send and back on receive.
	pub convert_byte_order: bool,
}

/// Type-level choice of [`ConnectionSettings`].
pub trait ByteOrderPolicy: Send + Sync + 'static {
	const SETTINGS: ConnectionSettings;
}

/// Big-endian on the wire. The default.
#[derive(Debug)]
pub struct NetworkOrder;

/// Host byte order on the wire, for peers known to share it.
#[derive(Debug)]
pub struct HostOrder;

impl ByteOrderPolicy for NetworkOrder {
	const SETTINGS: ConnectionSettings = ConnectionSettings { convert_byte_order: true };
}

impl ByteOrderPolicy for HostOrder {
	const SETTINGS: ConnectionSettings = ConnectionSettings { convert_byte_order: false };
}

/// A socket whose type records what may be done with it next.
///
/// Move-only. State-changing operations consume the value and return a new
/// one; if they fail, the descriptor is closed with the consumed value.
pub struct Socket<'net, D: Domain, T: SockType, S: State, P: ByteOrderPolicy = NetworkOrder> {
	handle: SocketHandle,
	_marker: PhantomData<(&'net Net, D, T, S, P)>,
}

/// Listening TCP socket.
pub type TcpListener<'net, D = Ipv4, P = NetworkOrder> = Socket<'net, D, Stream, BoundListening, P>;

/// Connected TCP socket.
pub type TcpStream<'net, D = Ipv4, P = NetworkOrder> = Socket<'net, D, Stream, Connected, P>;

/// Bound UDP socket.
pub type UdpSocket<'net, D = Ipv4, P = NetworkOrder> = Socket<'net, D, Datagram, Bound, P>;

impl<'net, D: Domain, T: SockType, S: State, P: ByteOrderPolicy> Socket<'net, D, T, S, P> {
	pub(crate) fn from_handle(handle: SocketHandle) -> Self {
		Self { handle, _marker: PhantomData }
	}

	/// Gives up the typestate and returns the owned descriptor.
	pub fn into_handle(self) -> SocketHandle {
		self.handle
	}

	/// Re-tags the same descriptor with another state or policy.
	pub(crate) fn transition<S2: State, P2: ByteOrderPolicy>(self) -> Socket<'net, D, T, S2, P2> {
		tracing::debug!(fd = self.handle.raw(), from = S::NAME, to = S2::NAME, "socket state transition");
		Socket::from_handle(self.handle)
	}

	/// Returns the raw file descriptor.
	///
	/// Used internally for syscalls. Does not transfer ownership.
	#[inline]
	pub fn as_raw_fd(&self) -> RawFd {
		self.handle.raw()
	}

	/// Switches the byte-order policy used by later transfers.
	pub fn with_policy<P2: ByteOrderPolicy>(self) -> Socket<'net, D, T, S, P2> {
		Socket::from_handle(self.handle)
	}

	/// Settings applied to every transfer on this socket.
	#[inline]
	pub const fn connection_settings(&self) -> ConnectionSettings {
		P::SETTINGS
	}

	#[inline]
	pub(crate) fn convert(&self) -> bool {
		P::SETTINGS.convert_byte_order
	}
}

impl<D: Domain, T: SockType, S: State, P: ByteOrderPolicy> AsRawFd for Socket<'_, D, T, S, P> {
	fn as_raw_fd(&self) -> RawFd {
		self.handle.raw()
	}
}

impl<D: Domain, T: SockType, S: State, P: ByteOrderPolicy> AsFd for Socket<'_, D, T, S, P> {
	fn as_fd(&self) -> BorrowedFd<'_> {
		self.handle.as_fd()
	}
}

impl<D: Domain, T: SockType, S: State, P: ByteOrderPolicy> fmt::Debug for Socket<'_, D, T, S, P> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Socket")
			.field("fd", &self.handle.raw())
			.field("domain", &std::any::type_name::<D>())
			.field("type", &std::any::type_name::<T>())
			.field("state", &S::NAME)
			.field("settings", &P::SETTINGS)
			.finish()
	}
}
