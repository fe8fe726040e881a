use std::os::fd::RawFd;

use crate::addr::{FromSockAddr, ToSockAddr, from_storage};
use crate::error::{Error, Result, errno};

/// Writes all of `bytes` to a stream socket.
///
/// `MSG_NOSIGNAL` turns a write to a closed peer into `EPIPE` instead of
/// `SIGPIPE`.
pub(super) fn send_all(fd: RawFd, bytes: &[u8]) -> Result<()> {
	let mut sent = 0;
	while sent < bytes.len() {
		let rest = &bytes[sent..];
		let n = unsafe { libc::send(fd, rest.as_ptr() as *const libc::c_void, rest.len(), libc::MSG_NOSIGNAL) };
		match n {
			-1 => {
				let e = errno();
				if e == libc::EINTR {
					continue;
				}
				return Err(Error::Send { errno: e });
			}
			0 => return Err(Error::NotConnected),
			n => sent += n as usize,
		}
	}
	tracing::trace!(fd, bytes = sent, "sent");
	Ok(())
}

/// Reads exactly `buf.len()` bytes from a stream socket.
///
/// End of stream before the buffer is full is [`Error::NotConnected`].
pub(super) fn recv_exact(fd: RawFd, buf: &mut [u8]) -> Result<()> {
	let mut filled = 0;
	while filled < buf.len() {
		let rest = &mut buf[filled..];
		let n = unsafe { libc::recv(fd, rest.as_mut_ptr() as *mut libc::c_void, rest.len(), libc::MSG_WAITALL) };
		match n {
			-1 => {
				let e = errno();
				if e == libc::EINTR {
					continue;
				}
				return Err(Error::Recv { errno: e });
			}
			0 => {
				tracing::debug!(fd, received = filled, expected = buf.len(), "peer closed mid-packet");
				return Err(Error::NotConnected);
			}
			n => filled += n as usize,
		}
	}
	tracing::trace!(fd, bytes = filled, "received");
	Ok(())
}

/// Sends one datagram on a connected socket.
pub(super) fn send_datagram(fd: RawFd, bytes: &[u8]) -> Result<()> {
	let n = unsafe { libc::send(fd, bytes.as_ptr() as *const libc::c_void, bytes.len(), 0) };
	check_datagram_sent(fd, n, bytes.len())
}

/// Sends one datagram to `addr`.
pub(super) fn send_datagram_to<A: ToSockAddr>(fd: RawFd, bytes: &[u8], addr: &A) -> Result<()> {
	let n = addr.with_raw(|ptr, len| unsafe {
		libc::sendto(fd, bytes.as_ptr() as *const libc::c_void, bytes.len(), 0, ptr, len)
	});
	check_datagram_sent(fd, n, bytes.len())
}

fn check_datagram_sent(fd: RawFd, n: isize, expected: usize) -> Result<()> {
	if n == -1 {
		return Err(Error::Send { errno: errno() });
	}
	if n as usize != expected {
		// A datagram is all or nothing; anything else means it was cut.
		return Err(Error::Send { errno: libc::EMSGSIZE });
	}
	tracing::trace!(fd, bytes = expected, "datagram sent");
	Ok(())
}

/// Receives one datagram into `buf`, returning its real size.
///
/// With `MSG_TRUNC` the kernel reports the full datagram length even when only
/// `buf.len()` bytes were copied, so the result may exceed `buf.len()`. Check
/// it before slicing.
pub(super) fn recv_datagram(fd: RawFd, buf: &mut [u8]) -> Result<usize> {
	let n = unsafe { libc::recv(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len(), libc::MSG_TRUNC) };
	if n == -1 {
		return Err(Error::Recv { errno: errno() });
	}
	tracing::trace!(fd, bytes = n, "datagram received");
	Ok(n as usize)
}

/// Receives one datagram and its sender. The size follows [`recv_datagram`].
pub(super) fn recv_datagram_from<A: FromSockAddr>(fd: RawFd, buf: &mut [u8]) -> Result<(usize, A)> {
	let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
	let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

	let n = unsafe {
		libc::recvfrom(
			fd,
			buf.as_mut_ptr() as *mut libc::c_void,
			buf.len(),
			libc::MSG_TRUNC,
			&mut storage as *mut _ as *mut libc::sockaddr,
			&mut len,
		)
	};
	if n == -1 {
		return Err(Error::Recv { errno: errno() });
	}

	let addr = from_storage(&storage, len).ok_or(Error::Address(crate::addr::AddressError::Invalid))?;
	tracing::trace!(fd, bytes = n, "datagram received");
	Ok((n as usize, addr))
}

/// Receives one datagram that must be exactly `buf.len()` bytes.
pub(super) fn recv_datagram_exact(fd: RawFd, buf: &mut [u8]) -> Result<()> {
	let n = recv_datagram(fd, buf)?;
	expect_size(n, buf.len())
}

/// Checks that a datagram of `received` bytes fits the `capacity` of a
/// variant buffer.
pub(super) fn expect_at_most(received: usize, capacity: usize) -> Result<()> {
	if received > capacity {
		tracing::warn!(received, capacity, "datagram larger than any packet alternative");
		return Err(Error::WrongProtocolType { received });
	}
	Ok(())
}

/// Checks a received datagram size against the packet size.
pub(super) fn expect_size(received: usize, expected: usize) -> Result<()> {
	if received != expected {
		tracing::warn!(received, expected, "datagram size does not match packet");
		return Err(Error::WrongProtocolType { received });
	}
	Ok(())
}
