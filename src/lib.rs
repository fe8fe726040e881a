//! Typestate sockets over the POSIX socket API.
//!
//! - [`addr`]: IPv4/IPv6 socket addresses and the `const fn` parser behind
//!   both compile-time literals and runtime input.
//! - [`packet`]: fixed-layout packets, byte-order conversion and validity
//!   predicates.
//! - [`socket`]: a socket whose type tracks family, transport, state and
//!   byte-order policy.
//! - [`Net`]: the factory every socket borrows from.

pub mod addr;
mod error;
mod net;
pub mod packet;
pub mod socket;

pub use self::addr::{
	AddressError, Domain, FromSockAddr, Ipv4, Ipv6, SocketAddr, SocketAddrV4, SocketAddrV6, ToSockAddr, parse,
};
pub use self::error::{Error, Result, errno};
pub use self::net::Net;
pub use self::packet::{Packet, PacketVariant, ValidatedPacket, WireField, make_valid_packet};
pub use self::socket::{
	Bound, BoundConnected, BoundListening, ByteOrderPolicy, Connectable, Connected, ConnectionSettings, Datagram,
	HostOrder, IsBound, IsConnected, NetworkOrder, PeerConnection, PollFlags, Protocol, Shutdown, SockType, Socket,
	SocketHandle, State, Stream, Tcp, TcpListener, TcpStream, Udp, UdpSocket, Unbound,
};
