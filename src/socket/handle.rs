use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, IntoRawFd, RawFd};

use crate::error::{Error, Result, errno};

/// Owner of exactly one OS socket descriptor.
///
/// Not `Clone`: a second owner would close the descriptor twice. `release`
/// and `close` consume the handle, so a live handle always owns an open
/// descriptor and `as_fd` never sees the sentinel.
///
/// ```compile_fail
/// use std::os::fd::AsFd;
/// # fn demo(handle: wiregate::SocketHandle) {
/// let fd = handle.release();
/// let _ = handle.as_fd();
/// # let _ = fd;
/// # }
/// ```
#[derive(Debug)]
pub struct SocketHandle {
	fd: RawFd,
}

impl SocketHandle {
	/// Sentinel for "owns nothing". Only seen while a handle is being consumed.
	const INVALID: RawFd = -1;

	/// Creates a socket with the given domain, type and protocol.
	///
	/// The socket is created with `SOCK_CLOEXEC` (close on exec).
	pub(crate) fn open(domain: libc::c_int, ty: libc::c_int, protocol: libc::c_int) -> Result<Self> {
		let fd = unsafe { libc::socket(domain, ty | libc::SOCK_CLOEXEC, protocol) };
		if fd == -1 {
			return Err(Error::Create { errno: errno() });
		}
		tracing::debug!(fd, domain, ty, protocol, "socket created");
		Ok(Self { fd })
	}

	/// Takes ownership of a raw descriptor returned by the OS.
	///
	/// # Safety
	/// `fd` must be an open descriptor nobody else will close.
	pub unsafe fn from_raw(fd: RawFd) -> Self {
		debug_assert!(fd >= 0, "SocketHandle::from_raw needs an open descriptor");
		Self { fd }
	}

	/// Returns the raw descriptor without giving up ownership.
	#[inline]
	pub fn raw(&self) -> RawFd {
		self.fd
	}

	/// Closes the owned descriptor now and adopts `fd` in its place.
	///
	/// # Safety
	/// Same contract as [`SocketHandle::from_raw`].
	pub unsafe fn replace(&mut self, fd: RawFd) {
		debug_assert!(fd >= 0, "SocketHandle::replace needs an open descriptor");
		self.close_now();
		self.fd = fd;
	}

	/// Gives up ownership without closing.
	pub fn release(mut self) -> RawFd {
		self.take()
	}

	/// Closes the descriptor.
	pub fn close(mut self) {
		self.close_now();
	}

	fn take(&mut self) -> RawFd {
		std::mem::replace(&mut self.fd, Self::INVALID)
	}

	fn close_now(&mut self) {
		let fd = self.take();
		if fd != Self::INVALID {
			// close() releases the descriptor even when it reports an error,
			// so there is nothing to retry.
			let result = unsafe { libc::close(fd) };
			if result == -1 {
				tracing::warn!(fd, errno = errno(), "close() reported an error");
			} else {
				tracing::debug!(fd, "socket closed");
			}
		}
	}
}

impl Drop for SocketHandle {
	fn drop(&mut self) {
		self.close_now();
	}
}

impl AsRawFd for SocketHandle {
	fn as_raw_fd(&self) -> RawFd {
		self.fd
	}
}

impl AsFd for SocketHandle {
	fn as_fd(&self) -> BorrowedFd<'_> {
		unsafe { BorrowedFd::borrow_raw(self.fd) }
	}
}

impl FromRawFd for SocketHandle {
	unsafe fn from_raw_fd(fd: RawFd) -> Self {
		unsafe { Self::from_raw(fd) }
	}
}

impl IntoRawFd for SocketHandle {
	fn into_raw_fd(self) -> RawFd {
		self.release()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Returns a handle and the raw peer of a connected Unix stream pair.
	fn pair() -> (SocketHandle, RawFd) {
		let mut fds = [0; 2];
		let result = unsafe { libc::socketpair(libc::AF_UNIX, libc::SOCK_STREAM, 0, fds.as_mut_ptr()) };
		assert_eq!(result, 0);
		(unsafe { SocketHandle::from_raw(fds[0]) }, fds[1])
	}

	/// True once the other end of the pair has been closed.
	fn peer_closed(peer: RawFd) -> bool {
		let mut byte = 0u8;
		let n = unsafe { libc::recv(peer, &mut byte as *mut u8 as *mut libc::c_void, 1, libc::MSG_DONTWAIT) };
		n == 0
	}

	fn close_raw(fd: RawFd) {
		unsafe { libc::close(fd) };
	}

	#[test]
	fn drop_closes_descriptor() {
		let (handle, peer) = pair();
		assert!(!peer_closed(peer));
		drop(handle);
		assert!(peer_closed(peer));
		close_raw(peer);
	}

	#[test]
	fn close_closes_now() {
		let (handle, peer) = pair();
		handle.close();
		assert!(peer_closed(peer));
		close_raw(peer);
	}

	#[test]
	fn release_transfers_ownership() {
		let (handle, peer) = pair();
		let fd = handle.release();
		assert!(!peer_closed(peer));
		drop(unsafe { SocketHandle::from_raw(fd) });
		assert!(peer_closed(peer));
		close_raw(peer);
	}

	#[test]
	fn replace_closes_previous() {
		let (mut handle, old_peer) = pair();
		let (other, new_peer) = pair();
		let new = other.release();
		unsafe { handle.replace(new) };
		assert!(peer_closed(old_peer));
		assert_eq!(handle.raw(), new);
		assert!(!peer_closed(new_peer));
		drop(handle);
		assert!(peer_closed(new_peer));
		close_raw(old_peer);
		close_raw(new_peer);
	}

	#[test]
	fn open_creates_valid_handle() {
		let handle = SocketHandle::open(libc::AF_INET, libc::SOCK_DGRAM, libc::IPPROTO_UDP).unwrap();
		assert!(handle.raw() >= 0);
		assert_eq!(handle.as_fd().as_raw_fd(), handle.raw());
	}

	#[test]
	fn borrowed_fd_is_the_owned_descriptor() {
		let (handle, peer) = pair();
		let borrowed = handle.as_fd().try_clone_to_owned().unwrap();
		drop(handle);
		// The duplicate keeps the socket open after the handle is gone.
		assert!(!peer_closed(peer));
		drop(borrowed);
		assert!(peer_closed(peer));
		close_raw(peer);
	}
}
