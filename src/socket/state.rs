//! Legality states and the capability traits that gate operations on them.
//!
//! | From             | Operation | To               |
//! |------------------|-----------|------------------|
//! | `Unbound`        | `bind`    | `Bound`          |
//! | `Unbound`        | `connect` | `Connected`      |
//! | `Bound`          | `listen`  | `BoundListening` |
//! | `Bound`          | `connect` | `BoundConnected` |
//! | `BoundListening` | `accept`  | new `Connected`  |
//!
//! Anything not in the table does not type-check. `accept` before `listen`:
//!
//! ```compile_fail
//! use wiregate::{Net, SocketAddrV4, Stream};
//!
//! let net = Net::new().unwrap();
//! let bound = net.bound_socket::<Stream, _>(SocketAddrV4::localhost(0)).unwrap();
//! let _ = bound.accept();
//! ```
//!
//! `listen` on a datagram socket:
//!
//! ```compile_fail
//! use wiregate::{Datagram, Net, SocketAddrV4};
//!
//! let net = Net::new().unwrap();
//! let bound = net.bound_socket::<Datagram, _>(SocketAddrV4::localhost(0)).unwrap();
//! let _ = bound.listen(16);
//! ```
//!
//! `send` before `connect`:
//!
//! ```compile_fail
//! use wiregate::{Ipv4, Net, Stream};
//!
//! let net = Net::new().unwrap();
//! let socket = net.socket::<Ipv4, Stream>().unwrap();
//! let _ = socket.send_packet(7u32);
//! ```
//!
//! `recvfrom` without a local address:
//!
//! ```compile_fail
//! use wiregate::{Datagram, Ipv4, Net};
//!
//! let net = Net::new().unwrap();
//! let socket = net.socket::<Ipv4, Datagram>().unwrap();
//! let _ = socket.recvfrom::<u32>();
//! ```
//!
//! Binding twice:
//!
//! ```compile_fail
//! use wiregate::{Net, SocketAddrV4, Stream};
//!
//! let net = Net::new().unwrap();
//! let bound = net.bound_socket::<Stream, _>(SocketAddrV4::localhost(0)).unwrap();
//! let _ = bound.bind(SocketAddrV4::localhost(0));
//! ```

use super::sealed::Sealed;

/// A legality state marker.
pub trait State: Sealed + Send + Sync + 'static {
	/// Name used in logs.
	const NAME: &'static str;
}

/// Freshly created. May bind or connect.
#[derive(Debug)]
pub struct Unbound;

/// Has a local address. May listen (stream) or connect.
#[derive(Debug)]
pub struct Bound;

/// Accepting connections.
#[derive(Debug)]
pub struct BoundListening;

/// Connected without an explicit bind.
#[derive(Debug)]
pub struct Connected;

/// Connected from an explicitly bound local address.
#[derive(Debug)]
pub struct BoundConnected;

macro_rules! states {
	($($state:ident),*) => {
		$(
			impl Sealed for $state {}

			impl State for $state {
				const NAME: &'static str = stringify!($state);
			}
		)*
	};
}

states!(Unbound, Bound, BoundListening, Connected, BoundConnected);

/// States from which `connect` is legal, and where it leads.
pub trait Connectable: State {
	type Next: IsConnected;
}

impl Connectable for Unbound {
	type Next = Connected;
}

impl Connectable for Bound {
	type Next = BoundConnected;
}

/// States with a peer: `send`, `recv` and `peer_addr` are legal.
pub trait IsConnected: State {}

impl IsConnected for Connected {}
impl IsConnected for BoundConnected {}

/// States with an explicit local address: `recvfrom` is legal.
pub trait IsBound: State {}

impl IsBound for Bound {}
impl IsBound for BoundListening {}
impl IsBound for BoundConnected {}
