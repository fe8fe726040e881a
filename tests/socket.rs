use std::io::ErrorKind;
use std::os::fd::{AsFd, AsRawFd, RawFd};
use std::thread;

use wiregate::{
	Datagram, Error, HostOrder, Ipv4, Net, Packet, PollFlags, Shutdown, SocketAddrV4, SocketAddrV6, Stream,
	make_valid_packet,
};

wiregate::packet! {
	#[derive(Debug, PartialEq)]
	pub struct Quad {
		pub a: u32,
		pub b: u32,
		pub c: u32,
		pub d: u32,
	}
}

impl Packet for Quad {
	fn is_valid(&self) -> bool {
		(self.a, self.b, self.c, self.d) == (1, 2, 3, 4)
	}
}

wiregate::packet! {
	#[derive(Debug, PartialEq)]
	pub struct Ack {
		pub seq: u16,
		pub status: u16,
	}
}

impl Packet for Ack {
	fn is_valid(&self) -> bool {
		self.status <= 2
	}
}

wiregate::packet_variant! {
	#[derive(Debug, PartialEq)]
	pub enum Message {
		Quad(Quad),
		Ack(Ack),
	}
}

wiregate::packet_variant! {
	#[derive(Debug, PartialEq)]
	pub enum Overlap {
		Ack(Ack),
		Word(u32),
	}
}

const QUAD: Quad = Quad { a: 1, b: 2, c: 3, d: 4 };

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn any_local() -> SocketAddrV4 {
	SocketAddrV4::localhost(0)
}

/// Inode of the open file behind `fd`, if it is open.
fn inode(fd: RawFd) -> Option<libc::ino_t> {
	let mut stat: libc::stat = unsafe { std::mem::zeroed() };
	if unsafe { libc::fstat(fd, &mut stat) } == -1 {
		assert_eq!(std::io::Error::last_os_error().raw_os_error(), Some(libc::EBADF));
		return None;
	}
	Some(stat.st_ino)
}

/// Asserts the socket that was `fd` with inode `ino` is gone. Another test
/// thread may already have reused the number for a different socket.
fn assert_closed(fd: RawFd, ino: libc::ino_t) {
	assert_ne!(inode(fd), Some(ino), "descriptor {fd} still refers to the same socket");
}

#[test]
fn quad_round_trips_over_tcp() {
	init_tracing();
	let net = Net::new().unwrap();
	let listener = net.server_socket(any_local(), 8).unwrap();
	let server_addr = listener.local_addr().unwrap();

	thread::scope(|s| {
		let client = s.spawn(|| {
			let stream = net.client_socket::<Stream, _>(server_addr).unwrap();
			let packet = make_valid_packet(QUAD).unwrap();
			stream.send(&packet).unwrap();
			stream.local_addr().unwrap()
		});

		let peer = listener.accept().unwrap();
		let received = peer.socket.recv_valid::<Quad>().unwrap();
		assert_eq!(*received, QUAD);
		assert!(received.is_valid());

		let client_addr = client.join().unwrap();
		assert_eq!(peer.addr, client_addr);
	});
}

#[test]
fn invalid_packet_sends_nothing() {
	init_tracing();
	let net = Net::new().unwrap();
	let listener = net.server_socket(any_local(), 8).unwrap();
	let client = net.client_socket::<Stream, _>(listener.local_addr().unwrap()).unwrap();
	let peer = listener.accept().unwrap();

	let result = client.send_packet(Quad { a: 9, b: 9, c: 9, d: 9 });
	assert!(matches!(result, Err(Error::InvalidArgument)));
	assert!(!peer.socket.poll(PollFlags::IN, 50).unwrap());
}

#[test]
fn peer_close_before_full_packet_is_not_connected() {
	init_tracing();
	let net = Net::new().unwrap();
	let listener = net.server_socket(any_local(), 8).unwrap();
	let client = net.client_socket::<Stream, _>(listener.local_addr().unwrap()).unwrap();
	let peer = listener.accept().unwrap();

	// Half a Quad, then end of stream.
	client.send_packet(0x0102_0304_0506_0708u64).unwrap();
	drop(client);

	let result = peer.socket.recv::<Quad>();
	assert!(matches!(result, Err(Error::NotConnected)));
	assert_eq!(result.unwrap_err().kind(), ErrorKind::NotConnected);
}

#[test]
fn shutdown_write_ends_the_stream_after_pending_data() {
	init_tracing();
	let net = Net::new().unwrap();
	let listener = net.server_socket(any_local(), 8).unwrap();
	let client = net.client_socket::<Stream, _>(listener.local_addr().unwrap()).unwrap();
	client.set_tcp_nodelay(true).unwrap();
	let peer = listener.accept().unwrap();

	client.send_packet(QUAD).unwrap();
	client.shutdown(Shutdown::Write).unwrap();

	assert_eq!(peer.socket.recv::<Quad>().unwrap(), QUAD);
	assert!(matches!(peer.socket.recv::<Quad>(), Err(Error::NotConnected)));
}

#[test]
fn connect_to_a_non_listening_port_is_refused() {
	init_tracing();
	let net = Net::new().unwrap();
	// Bound but not listening, so the port is reserved and refuses connections.
	let bound = net.bound_socket::<Stream, _>(any_local()).unwrap();
	let addr = bound.local_addr().unwrap();

	let err = net.client_socket::<Stream, _>(addr).unwrap_err();
	assert!(matches!(err, Error::Connect { errno: libc::ECONNREFUSED, .. }));
	assert_eq!(err.kind(), ErrorKind::ConnectionRefused);
}

#[test]
fn binding_a_taken_port_fails() {
	init_tracing();
	let net = Net::new().unwrap();
	let first = net.bound_socket::<Datagram, _>(any_local()).unwrap();
	let taken = first.local_addr().unwrap();

	let err = net.bound_socket::<Datagram, _>(taken).unwrap_err();
	assert!(matches!(err, Error::Bind { .. }));
	assert_eq!(err.kind(), ErrorKind::AddrInUse);
	assert!(err.to_string().contains(&taken.to_string()));
}

#[test]
fn failed_bind_closes_the_descriptor() {
	init_tracing();
	let net = Net::new().unwrap();
	let first = net.bound_socket::<Datagram, _>(any_local()).unwrap();
	let taken = first.local_addr().unwrap();

	let socket = net.socket::<Ipv4, Datagram>().unwrap();
	let fd = socket.as_raw_fd();
	let ino = inode(fd).unwrap();

	let err = socket.bind(taken).unwrap_err();
	assert!(matches!(err, Error::Bind { errno: libc::EADDRINUSE, .. }));
	assert_closed(fd, ino);
}

#[test]
fn failed_connect_closes_the_descriptor() {
	init_tracing();
	let net = Net::new().unwrap();
	let bound = net.bound_socket::<Stream, _>(any_local()).unwrap();
	let addr = bound.local_addr().unwrap();

	let socket = net.socket::<Ipv4, Stream>().unwrap();
	let fd = socket.as_raw_fd();
	let ino = inode(fd).unwrap();

	let err = socket.connect(addr).unwrap_err();
	assert!(matches!(err, Error::Connect { errno: libc::ECONNREFUSED, .. }));
	assert_closed(fd, ino);
}

#[test]
fn into_handle_keeps_the_descriptor_open() {
	init_tracing();
	let net = Net::new().unwrap();
	let socket = net.bound_socket::<Datagram, _>(any_local()).unwrap();
	let fd = socket.as_raw_fd();
	let ino = inode(fd).unwrap();

	let handle = socket.into_handle();
	assert_eq!(handle.as_fd().as_raw_fd(), fd);
	assert_eq!(inode(fd), Some(ino));

	handle.close();
	assert_closed(fd, ino);
}

#[test]
fn peer_addr_after_reset_is_not_connected() {
	init_tracing();
	let net = Net::new().unwrap();
	let listener = net.server_socket(any_local(), 8).unwrap();
	let client = net.client_socket::<Stream, _>(listener.local_addr().unwrap()).unwrap();
	let peer = listener.accept().unwrap();

	// A zero linger makes close() send RST instead of FIN.
	let linger = libc::linger { l_onoff: 1, l_linger: 0 };
	let result = unsafe {
		libc::setsockopt(
			peer.socket.as_raw_fd(),
			libc::SOL_SOCKET,
			libc::SO_LINGER,
			&linger as *const _ as *const libc::c_void,
			size_of::<libc::linger>() as libc::socklen_t,
		)
	};
	assert_eq!(result, 0);
	drop(peer);

	assert!(matches!(client.recv::<u32>(), Err(Error::Recv { errno: libc::ECONNRESET })));
	let err = client.peer_addr().unwrap_err();
	assert!(matches!(err, Error::PeerAddr { errno: libc::ENOTCONN }));
	assert_eq!(err.kind(), ErrorKind::NotConnected);
}

#[test]
fn datagram_sendto_and_recvfrom() {
	init_tracing();
	let net = Net::new().unwrap();
	let a = net.bound_socket::<Datagram, _>(any_local()).unwrap();
	let b = net.bound_socket::<Datagram, _>(any_local()).unwrap();
	let b_addr = b.local_addr().unwrap();

	a.sendto_packet(QUAD, &b_addr).unwrap();
	let (received, from) = b.recvfrom::<Quad>().unwrap();
	assert_eq!(received, QUAD);
	assert_eq!(from, a.local_addr().unwrap());
}

#[test]
fn datagram_size_mismatch_is_wrong_protocol_type() {
	init_tracing();
	let net = Net::new().unwrap();
	let a = net.bound_socket::<Datagram, _>(any_local()).unwrap();
	let b = net.bound_socket::<Datagram, _>(any_local()).unwrap();
	let b_addr = b.local_addr().unwrap();

	// Too short.
	a.sendto_packet(7u16, &b_addr).unwrap();
	assert!(matches!(b.recvfrom::<u32>(), Err(Error::WrongProtocolType { received: 2 })));

	// Too long is caught too, and reports the real length.
	a.sendto_packet(7u64, &b_addr).unwrap();
	assert!(matches!(b.recvfrom::<u32>(), Err(Error::WrongProtocolType { received: 8 })));

	// Longer than any alternative of a variant.
	a.sendto_packet([7u32; 5], &b_addr).unwrap();
	assert!(matches!(b.recvfrom_variant::<Message>(), Err(Error::WrongProtocolType { received: 20 })));

	// The next datagram is unaffected.
	a.sendto_packet(7u32, &b_addr).unwrap();
	assert_eq!(b.recvfrom::<u32>().unwrap().0, 7);
}

#[test]
fn connected_datagrams_carry_variants() {
	init_tracing();
	let net = Net::new().unwrap();
	let b = net.bound_socket::<Datagram, _>(any_local()).unwrap();
	let b_addr = b.local_addr().unwrap();
	let a = net.bound_client_socket::<Datagram, _>(b_addr, any_local()).unwrap();
	let b = b.connect(a.local_addr().unwrap()).unwrap();

	a.send_variant(&Message::Ack(Ack { seq: 3, status: 1 })).unwrap();
	assert_eq!(b.recv_variant::<Message>().unwrap(), Message::Ack(Ack { seq: 3, status: 1 }));

	a.send_variant(&Message::Quad(QUAD)).unwrap();
	assert_eq!(b.recv_variant::<Message>().unwrap(), Message::Quad(QUAD));

	// Four bytes that fit both alternatives of `Overlap`.
	a.send_packet(Ack { seq: 3, status: 1 }).unwrap();
	assert!(matches!(b.recv_variant::<Overlap>(), Err(Error::WrongProtocolType { received: 4 })));

	// Connected datagram sockets also carry plain packets.
	b.send_packet(QUAD).unwrap();
	assert_eq!(a.recv::<Quad>().unwrap(), QUAD);
}

#[test]
fn invalid_variant_is_not_sent() {
	init_tracing();
	let net = Net::new().unwrap();
	let a = net.bound_socket::<Datagram, _>(any_local()).unwrap();
	let b = net.bound_socket::<Datagram, _>(any_local()).unwrap();

	let result = a.sendto_variant(&Message::Ack(Ack { seq: 1, status: 7 }), &b.local_addr().unwrap());
	assert!(matches!(result, Err(Error::InvalidArgument)));
	assert!(!b.poll(PollFlags::IN, 50).unwrap());
}

#[test]
fn datagram_variant_from_any_sender() {
	init_tracing();
	let net = Net::new().unwrap();
	let a = net.socket::<Ipv4, Datagram>().unwrap();
	let b = net.bound_socket::<Datagram, _>(any_local()).unwrap();

	// Sending from an unbound socket is legal.
	a.sendto_variant(&Message::Quad(QUAD), &b.local_addr().unwrap()).unwrap();
	let (message, from) = b.recvfrom_variant::<Message>().unwrap();
	assert_eq!(message, Message::Quad(QUAD));
	assert_eq!(from.ip(), [127, 0, 0, 1]);
}

#[test]
fn poll_times_out_then_reports_readiness() {
	init_tracing();
	let net = Net::new().unwrap();
	let a = net.bound_socket::<Datagram, _>(any_local()).unwrap();
	let b = net.bound_socket::<Datagram, _>(any_local()).unwrap();

	assert!(!b.poll(PollFlags::IN, 20).unwrap());
	assert!(b.poll(PollFlags::OUT, 0).unwrap());

	a.sendto_packet(1u32, &b.local_addr().unwrap()).unwrap();
	assert!(b.poll(PollFlags::IN | PollFlags::PRI, 1000).unwrap());
}

#[test]
fn byte_order_policy_applies_per_socket() {
	init_tracing();
	let net = Net::new().unwrap();
	let host = net.bound_socket::<Datagram, _>(any_local()).unwrap().with_policy::<HostOrder>();
	let network = net.bound_socket::<Datagram, _>(any_local()).unwrap();
	assert!(!host.connection_settings().convert_byte_order);
	assert!(network.connection_settings().convert_byte_order);

	let value = 0x1122_3344u32;
	host.sendto_packet(value, &network.local_addr().unwrap()).unwrap();
	let (received, _) = network.recvfrom::<u32>().unwrap();
	assert_eq!(received, u32::from_be_bytes(value.to_ne_bytes()));

	network.sendto_packet(value, &host.local_addr().unwrap()).unwrap();
	let (received, _) = host.recvfrom::<u32>().unwrap();
	assert_eq!(received, u32::from_ne_bytes(value.to_be_bytes()));
}

#[test]
fn accept_as_picks_the_connection_policy() {
	init_tracing();
	let net = Net::new().unwrap();
	let listener = net.server_socket(any_local(), 8).unwrap();
	let client = net.client_socket::<Stream, _>(listener.local_addr().unwrap()).unwrap().with_policy::<HostOrder>();
	let peer = listener.accept_as::<HostOrder>().unwrap();

	assert!(!peer.socket.connection_settings().convert_byte_order);
	client.send_packet(0xDEAD_BEEFu32).unwrap();
	assert_eq!(peer.socket.recv::<u32>().unwrap(), 0xDEAD_BEEF);
}

#[test]
fn socket_options_apply() {
	init_tracing();
	let net = Net::new().unwrap();
	let socket = net.socket::<Ipv4, Datagram>().unwrap();
	socket.set_reuse_addr(true).unwrap();
	socket.set_reuse_port(true).unwrap();
	socket.set_send_buffer_size(64 * 1024).unwrap();
	socket.set_recv_buffer_size(64 * 1024).unwrap();
	assert!(socket.recv_buffer_size().unwrap() >= 64 * 1024);
	assert_eq!(socket.take_error().unwrap(), None);
}

#[test]
fn tcp_over_ipv6_loopback() {
	init_tracing();
	let net = Net::new().unwrap();
	let Ok(listener) = net.server_socket(SocketAddrV6::localhost(0), 8) else {
		// No IPv6 on this host.
		return;
	};
	let client = net.client_socket::<Stream, _>(listener.local_addr().unwrap()).unwrap();
	let peer = listener.accept().unwrap();

	client.send_packet(QUAD).unwrap();
	assert_eq!(peer.socket.recv::<Quad>().unwrap(), QUAD);
	assert_eq!(peer.addr, client.local_addr().unwrap());
	assert_eq!(client.peer_addr().unwrap(), listener.local_addr().unwrap());
}
