//! Socket address decoding for `bind(2)`.
//!
//! The family tag is read first and alone. Only once it is known is a second,
//! fixed-size copy made, sized by the family and never by the caller-supplied
//! `addrlen`.

use zerocopy_derive::{FromBytes, Immutable, KnownLayout};

use crate::{event::BindHeader, MAX_UNIX_PATH};

pub const AF_UNIX: u16 = 1;
pub const AF_INET: u16 = 2;
pub const AF_INET6: u16 = 10;

#[repr(C)]
#[derive(Clone, Copy, Debug, FromBytes, Immutable, KnownLayout)]
pub struct SockaddrIn {
	pub sin_family: u16,
	pub sin_port: u16,
	pub sin_addr: [u8; 4],
	pub sin_zero: [u8; 8],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, FromBytes, Immutable, KnownLayout)]
pub struct SockaddrIn6 {
	pub sin6_family: u16,
	pub sin6_port: u16,
	pub sin6_flowinfo: u32,
	pub sin6_addr: [u8; 16],
	pub sin6_scope_id: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, FromBytes, Immutable, KnownLayout)]
pub struct SockaddrUn {
	pub sun_family: u16,
	pub sun_path: [u8; MAX_UNIX_PATH],
}

/// Read access to the calling process' memory.
pub trait UserMemory {
	/// Copies a `T` from user address `addr`, or `None` if it is unreadable.
	fn read<T: zerocopy::FromBytes>(&self, addr: u64) -> Option<T>;
}

/// Decoded bind address. Exactly one shape per family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SockAddr {
	Inet { addr: [u8; 4], port: u16 },
	Inet6 { addr: [u8; 16], port: u16 },
	Unix { path: [u8; MAX_UNIX_PATH] },
	/// Unrecognized family, or a known family whose body was unreadable.
	Other { family: u16 },
}

impl SockAddr {
	pub const fn family(&self) -> u16 {
		match self {
			SockAddr::Inet { .. } => AF_INET,
			SockAddr::Inet6 { .. } => AF_INET6,
			SockAddr::Unix { .. } => AF_UNIX,
			SockAddr::Other { family } => *family,
		}
	}

	/// Writes the family tag and the fields owned by this family only.
	pub fn write_into(&self, header: &mut BindHeader) {
		header.family = self.family();
		match self {
			SockAddr::Inet { addr, port } => {
				header.v4_addr = *addr;
				header.port = *port;
			}
			SockAddr::Inet6 { addr, port } => {
				header.v6_addr = *addr;
				header.port = *port;
			}
			SockAddr::Unix { path } => header.unix_path = *path,
			SockAddr::Other { .. } => {}
		}
	}
}

impl BindHeader {
	/// Rebuilds the tagged address from the record, keyed on `family` alone.
	///
	/// Lossy for a known family whose body was unreadable at bind time: the
	/// record keeps the tag with all-zero arms, so `Other { family: AF_INET }`
	/// comes back as `Inet` with `0.0.0.0:0` and cannot be told apart from a
	/// real wildcard bind.
	pub fn sockaddr(&self) -> SockAddr {
		match self.family {
			AF_INET => SockAddr::Inet {
				addr: self.v4_addr,
				port: self.port,
			},
			AF_INET6 => SockAddr::Inet6 {
				addr: self.v6_addr,
				port: self.port,
			},
			AF_UNIX => SockAddr::Unix { path: self.unix_path },
			family => SockAddr::Other { family },
		}
	}
}

/// Network to host order for a 16-bit port on a little-endian host.
pub const fn swap16(v: u16) -> u16 {
	(v >> 8) | (v << 8)
}

/// Decodes the `sockaddr` at user address `addr`.
///
/// Returns `None` when not even the family tag can be read, and
/// `Other { family }` when the tag reads but the family's body does not.
pub fn decode_sockaddr<M: UserMemory>(mem: &M, addr: u64) -> Option<SockAddr> {
	if addr == 0 {
		return None;
	}

	let family: u16 = mem.read(addr)?;
	let decoded = match family {
		AF_INET => mem.read::<SockaddrIn>(addr).map(|sa| SockAddr::Inet {
			addr: sa.sin_addr,
			port: swap16(sa.sin_port),
		}),
		AF_INET6 => mem.read::<SockaddrIn6>(addr).map(|sa| SockAddr::Inet6 {
			addr: sa.sin6_addr,
			port: swap16(sa.sin6_port),
		}),
		AF_UNIX => mem.read::<SockaddrUn>(addr).map(|sa| SockAddr::Unix { path: sa.sun_path }),
		_ => None,
	};

	Some(decoded.unwrap_or(SockAddr::Other { family }))
}

// region:    --- Tests


// endregion: --- Tests
