use zerocopy::FromZeros;
use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{MAX_PATH_LEN, MAX_UNIX_PATH, TASK_COMM_LEN, UTS_LEN};

// Layout consumed by user space. Offsets are part of the wire format:
// BindHeader (0..152) | EventContext (152..656) | cwd (656..916) | exe (916..1176)

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
	Entry,
	Exit,
}

impl EventKind {
	pub const fn as_raw(self) -> i32 {
		match self {
			EventKind::Entry => 0,
			EventKind::Exit => 1,
		}
	}

	pub const fn from_raw(raw: i32) -> Option<Self> {
		match raw {
			0 => Some(EventKind::Entry),
			1 => Some(EventKind::Exit),
			_ => None,
		}
	}
}

#[repr(C)]
#[derive(Clone, Copy, Debug, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct EventMeta {
	pub ts: u64,        // 0..8
	pub syscall: i32,   // 8..12
	pub processor: u16, // 12..14
	pub _pad0: [u8; 2], // 14..16
}

/// Identity of the calling task, in the host and in its own pid namespace.
///
/// `pid`/`tgid` follow kernel naming: `pid` is the thread, `tgid` the process.
#[repr(C)]
#[derive(Clone, Copy, Debug, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct TaskMeta {
	pub start_time: u64,              // 0..8
	pub host_pid: u32,                // 8..12
	pub host_tgid: u32,               // 12..16
	pub host_ppid: u32,               // 16..20
	pub pid: u32,                     // 20..24
	pub tgid: u32,                    // 24..28
	pub ppid: u32,                    // 28..32
	pub uid: u32,                     // 32..36
	pub gid: u32,                     // 36..40
	pub cgroup_id: u64,               // 40..48
	pub mnt_ns_id: u64,               // 48..56
	pub pid_ns_id: u64,               // 56..64
	pub exec_id: u64,                 // 64..72
	pub parent_exec_id: u64,          // 72..80
	pub comm: [u8; TASK_COMM_LEN],    // 80..96
}

/// `struct new_utsname` of the task's UTS namespace.
#[repr(C)]
#[derive(Clone, Copy, Debug, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NodeMeta {
	pub sysname: [u8; UTS_LEN],    // 0..65
	pub nodename: [u8; UTS_LEN],   // 65..130
	pub release: [u8; UTS_LEN],    // 130..195
	pub version: [u8; UTS_LEN],    // 195..260
	pub machine: [u8; UTS_LEN],    // 260..325
	pub domainname: [u8; UTS_LEN], // 325..390
}

/// Common metadata block, identical for ENTRY and EXIT records.
#[repr(C)]
#[derive(Clone, Copy, Debug, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct EventContext {
	pub meta: EventMeta, // 0..16
	pub task: TaskMeta,  // 16..112
	pub node: NodeMeta,  // 112..502
	pub _pad0: [u8; 2],  // 502..504
}

/// Length-prefixed trailing string. `len` is always `<= MAX_PATH_LEN`.
#[repr(C)]
#[derive(Clone, Copy, Debug, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct PathStr {
	pub len: u32,                   // 0..4
	pub bytes: [u8; MAX_PATH_LEN], // 4..260
}

impl PathStr {
	/// Copies `src`, truncated to `MAX_PATH_LEN`. Returns the stored length.
	pub fn set(&mut self, src: &[u8]) -> usize {
		let len = clamp_path_len(src.len());
		self.bytes[..len].copy_from_slice(&src[..len]);
		self.len = len as u32;
		len
	}

	pub fn as_slice(&self) -> &[u8] {
		&self.bytes[..clamp_path_len(self.len as usize)]
	}
}

#[repr(C)]
#[derive(Clone, Copy, Debug, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct BindHeader {
	pub kind: i32,                       // 0..4
	pub fd: i32,                         // 4..8
	pub addrlen: i32,                    // 8..12
	pub ret: i32,                        // 12..16
	pub family: u16,                     // 16..18
	pub port: u16,                       // 18..20 | host order
	pub v4_addr: [u8; 4],                // 20..24 | network order
	pub v6_addr: [u8; 16],               // 24..40
	pub unix_path: [u8; MAX_UNIX_PATH], // 40..148
	pub _pad0: u32,                      // 148..152
}

#[repr(C)]
#[derive(Clone, Copy, Debug, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct BindEvent {
	pub header: BindHeader,    // 0..152
	pub context: EventContext, // 152..656
	pub cwd: PathStr,          // 656..916
	pub exe: PathStr,          // 916..1176
}

impl BindEvent {
	pub const fn kind(&self) -> Option<EventKind> {
		EventKind::from_raw(self.header.kind)
	}
}

/// A fixed-layout record that Context Enrichment knows how to populate.
pub trait Record: FromZeros {
	fn set_kind(&mut self, kind: EventKind);
	fn context_mut(&mut self) -> &mut EventContext;
	/// Working directory and executable path slots, in that order.
	fn paths_mut(&mut self) -> (&mut PathStr, &mut PathStr);
}

impl Record for BindEvent {
	fn set_kind(&mut self, kind: EventKind) {
		self.header.kind = kind.as_raw();
	}

	fn context_mut(&mut self) -> &mut EventContext {
		&mut self.context
	}

	fn paths_mut(&mut self) -> (&mut PathStr, &mut PathStr) {
		(&mut self.cwd, &mut self.exe)
	}
}

pub const fn clamp_path_len(len: usize) -> usize {
	if len > MAX_PATH_LEN {
		MAX_PATH_LEN
	} else {
		len
	}
}

/// Bytes of a NUL-padded kernel string up to the first NUL.
pub fn cstr(bytes: &[u8]) -> &[u8] {
	let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
	&bytes[..len]
}

const _: () = assert!(core::mem::size_of::<BindHeader>() == 152);
const _: () = assert!(core::mem::size_of::<EventContext>() == 504);
const _: () = assert!(core::mem::size_of::<BindEvent>() == 1176);

// region:    --- Tests

#[cfg(test)]
mod tests {
	type Result<T> = core::result::Result<T, Box<dyn std::error::Error>>; // For tests.

	use std::boxed::Box;
	use std::vec;

	use zerocopy::{FromBytes, IntoBytes};

	use super::*;

	#[test]
	fn event_path_longer_than_bound_is_truncated_to_bound() {
		// -- Setup & Fixtures
		let fx_long = vec![b'a'; MAX_PATH_LEN * 3 + 7];
		let mut path = PathStr::new_zeroed();

		// -- Exec
		let stored = path.set(&fx_long);

		// -- Check
		assert_eq!(stored, MAX_PATH_LEN);
		assert_eq!(path.len as usize, MAX_PATH_LEN);
		assert_eq!(path.as_slice().len(), MAX_PATH_LEN);
	}

	#[test]
	fn event_short_path_kept_verbatim() {
		let mut path = PathStr::new_zeroed();
		path.set(b"/srv/app");
		assert_eq!(path.as_slice(), b"/srv/app");
		assert!(path.bytes[8..].iter().all(|&b| b == 0));
	}

	#[test]
	fn event_forged_length_never_overruns() {
		let mut path = PathStr::new_zeroed();
		path.len = u32::MAX;
		assert_eq!(path.as_slice().len(), MAX_PATH_LEN);
	}

	#[test]
	fn event_kind_round_trips_through_header() -> Result<()> {
		// -- Setup & Fixtures
		let mut evt = BindEvent::new_zeroed();
		evt.set_kind(EventKind::Exit);

		// -- Exec
		let parsed = BindEvent::ref_from_prefix(evt.as_bytes()).map_err(|_| "bad prefix")?.0;

		// -- Check
		assert_eq!(parsed.kind(), Some(EventKind::Exit));
		assert_eq!(EventKind::from_raw(7), None);
		Ok(())
	}

	#[test]
	fn event_wire_offsets_are_stable() {
		let mut evt = BindEvent::new_zeroed();
		evt.header.family = 0xAABB;
		evt.context.meta.ts = 0x0102_0304_0506_0708;
		evt.cwd.len = 3;

		let bytes = evt.as_bytes();
		assert_eq!(&bytes[16..18], &0xAABBu16.to_ne_bytes());
		assert_eq!(&bytes[152..160], &0x0102_0304_0506_0708u64.to_ne_bytes());
		assert_eq!(&bytes[656..660], &3u32.to_ne_bytes());
	}

	#[test]
	fn event_cstr_stops_at_nul() {
		assert_eq!(cstr(b"node-1\0\0\0"), b"node-1");
		assert_eq!(cstr(b"full"), b"full");
	}
}

// endregion: --- Tests
