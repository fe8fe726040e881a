use std::os::fd::RawFd;

use crate::addr::{AddressError, Domain, from_storage};
use crate::error::{Error, Result, errno};

use super::state::State;
use super::{ByteOrderPolicy, SockType, Socket};

/// Sets an integer socket option.
pub(super) fn set_int_option(
	fd: RawFd,
	level: libc::c_int,
	name: libc::c_int,
	value: libc::c_int,
	label: &'static str,
) -> Result<()> {
	let result = unsafe {
		libc::setsockopt(
			fd,
			level,
			name,
			&value as *const _ as *const libc::c_void,
			std::mem::size_of::<libc::c_int>() as libc::socklen_t,
		)
	};
	if result == -1 {
		return Err(Error::SetOption { errno: errno(), option: label });
	}
	tracing::trace!(fd, option = label, value, "socket option set");
	Ok(())
}

/// Reads an integer socket option.
pub(super) fn get_int_option(fd: RawFd, level: libc::c_int, name: libc::c_int, label: &'static str) -> Result<libc::c_int> {
	let mut value: libc::c_int = 0;
	let mut len = std::mem::size_of::<libc::c_int>() as libc::socklen_t;
	let result = unsafe { libc::getsockopt(fd, level, name, &mut value as *mut _ as *mut libc::c_void, &mut len) };
	if result == -1 {
		return Err(Error::GetOption { errno: errno(), option: label });
	}
	Ok(value)
}

impl<D: Domain, T: SockType, S: State, P: ByteOrderPolicy> Socket<'_, D, T, S, P> {
	/// Sets SO_REUSEADDR.
	///
	/// Allows binding to an address that's in TIME_WAIT state.
	/// Essential for server restarts.
	pub fn set_reuse_addr(&self, enable: bool) -> Result<()> {
		set_int_option(self.as_raw_fd(), libc::SOL_SOCKET, libc::SO_REUSEADDR, enable as libc::c_int, "SO_REUSEADDR")
	}

	/// Sets SO_REUSEPORT.
	///
	/// Allows multiple sockets to bind the same port.
	pub fn set_reuse_port(&self, enable: bool) -> Result<()> {
		set_int_option(self.as_raw_fd(), libc::SOL_SOCKET, libc::SO_REUSEPORT, enable as libc::c_int, "SO_REUSEPORT")
	}

	/// Sets receive buffer size (SO_RCVBUF).
	///
	/// Kernel typically doubles this value internally.
	pub fn set_recv_buffer_size(&self, size: usize) -> Result<()> {
		let size = libc::c_int::try_from(size).map_err(|_| Error::InvalidArgument)?;
		set_int_option(self.as_raw_fd(), libc::SOL_SOCKET, libc::SO_RCVBUF, size, "SO_RCVBUF")
	}

	/// Sets send buffer size (SO_SNDBUF).
	pub fn set_send_buffer_size(&self, size: usize) -> Result<()> {
		let size = libc::c_int::try_from(size).map_err(|_| Error::InvalidArgument)?;
		set_int_option(self.as_raw_fd(), libc::SOL_SOCKET, libc::SO_SNDBUF, size, "SO_SNDBUF")
	}

	/// Returns the effective receive buffer size.
	pub fn recv_buffer_size(&self) -> Result<usize> {
		get_int_option(self.as_raw_fd(), libc::SOL_SOCKET, libc::SO_RCVBUF, "SO_RCVBUF").map(|v| v as usize)
	}

	/// Takes the pending socket error (SO_ERROR), if any.
	pub fn take_error(&self) -> Result<Option<i32>> {
		let value = get_int_option(self.as_raw_fd(), libc::SOL_SOCKET, libc::SO_ERROR, "SO_ERROR")?;
		Ok((value != 0).then_some(value))
	}

	/// Returns the local address.
	///
	/// Useful after binding port 0 to learn the port the kernel chose.
	pub fn local_addr(&self) -> Result<D::Addr> {
		let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
		let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

		let result = unsafe {
			libc::getsockname(self.as_raw_fd(), &mut storage as *mut _ as *mut libc::sockaddr, &mut len)
		};

		if result == -1 {
			return Err(Error::LocalAddr { errno: errno() });
		}
		from_storage(&storage, len).ok_or(Error::Address(AddressError::Invalid))
	}
}
