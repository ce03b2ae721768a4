//! Owned view of a `BindEvent` drained from the ring buffer.

use std::{
	fmt,
	net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6},
	sync::Arc,
};

use kestrel_common::{cstr, BindEvent, EventKind, NodeMeta, SockAddr};
use zerocopy::{ConvertError, FromBytes};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindAddr {
	Socket(SocketAddr),
	Unix(Arc<str>),
	/// Family the probe does not decode. 0 when nothing was read.
	Family(u16),
}

impl From<SockAddr> for BindAddr {
	fn from(addr: SockAddr) -> Self {
		match addr {
			SockAddr::Inet { addr, port } => Self::Socket(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::from(addr), port))),
			SockAddr::Inet6 { addr, port } => {
				Self::Socket(SocketAddr::V6(SocketAddrV6::new(Ipv6Addr::from(addr), port, 0, 0)))
			}
			SockAddr::Unix { path } => Self::Unix(unix_path(&path)),
			SockAddr::Other { family } => Self::Family(family),
		}
	}
}

impl fmt::Display for BindAddr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BindAddr::Socket(addr) => write!(f, "{addr}"),
			BindAddr::Unix(path) => write!(f, "unix:{path}"),
			BindAddr::Family(0) => f.write_str("-"),
			BindAddr::Family(family) => write!(f, "family:{family}"),
		}
	}
}

// Abstract names start with a NUL and are shown with a leading '@'.
fn unix_path(path: &[u8]) -> Arc<str> {
	match path.split_first() {
		Some((0, rest)) => {
			let end = rest.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
			format!("@{}", String::from_utf8_lossy(&rest[..end])).into()
		}
		_ => lossy(path),
	}
}

fn lossy(bytes: &[u8]) -> Arc<str> {
	String::from_utf8_lossy(cstr(bytes)).into()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
	pub sysname: Arc<str>,
	pub nodename: Arc<str>,
	pub release: Arc<str>,
	pub version: Arc<str>,
	pub machine: Arc<str>,
	pub domainname: Arc<str>,
}

impl From<&NodeMeta> for NodeInfo {
	fn from(node: &NodeMeta) -> Self {
		Self {
			sysname: lossy(&node.sysname),
			nodename: lossy(&node.nodename),
			release: lossy(&node.release),
			version: lossy(&node.version),
			machine: lossy(&node.machine),
			domainname: lossy(&node.domainname),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRecord {
	pub kind: EventKind,
	pub ts: u64,
	pub syscall: i32,
	pub processor: u16,

	// -- Task, host view
	pub host_pid: u32,
	pub host_tgid: u32,
	pub host_ppid: u32,
	// -- Task, pid namespace view
	pub pid: u32,
	pub tgid: u32,
	pub ppid: u32,
	pub uid: u32,
	pub gid: u32,
	pub cgroup_id: u64,
	pub mnt_ns_id: u64,
	pub pid_ns_id: u64,
	pub start_time: u64,
	pub exec_id: u64,
	pub parent_exec_id: u64,
	pub comm: Arc<str>,

	pub node: NodeInfo,
	pub cwd: Arc<str>,
	pub exe: Arc<str>,

	pub fd: i32,
	pub addrlen: i32,
	pub ret: i32,
	pub addr: BindAddr,
}

impl BindRecord {
	pub fn from_bytes(data: &[u8]) -> Result<Self> {
		let (evt, _) = BindEvent::ref_from_prefix(data).map_err(|err| match err {
			ConvertError::Alignment(_) => Error::InvalidEventAlign,
			_ => Error::InvalidEventSize,
		})?;
		Self::try_from(evt)
	}
}

impl TryFrom<&BindEvent> for BindRecord {
	type Error = Error;

	fn try_from(evt: &BindEvent) -> Result<Self> {
		let kind = evt.kind().ok_or(Error::UnknownEventKind(evt.header.kind))?;
		let meta = &evt.context.meta;
		let task = &evt.context.task;

		Ok(Self {
			kind,
			ts: meta.ts,
			syscall: meta.syscall,
			processor: meta.processor,
			host_pid: task.host_pid,
			host_tgid: task.host_tgid,
			host_ppid: task.host_ppid,
			pid: task.pid,
			tgid: task.tgid,
			ppid: task.ppid,
			uid: task.uid,
			gid: task.gid,
			cgroup_id: task.cgroup_id,
			mnt_ns_id: task.mnt_ns_id,
			pid_ns_id: task.pid_ns_id,
			start_time: task.start_time,
			exec_id: task.exec_id,
			parent_exec_id: task.parent_exec_id,
			comm: lossy(&task.comm),
			node: NodeInfo::from(&evt.context.node),
			cwd: String::from_utf8_lossy(evt.cwd.as_slice()).into(),
			exe: String::from_utf8_lossy(evt.exe.as_slice()).into(),
			fd: evt.header.fd,
			addrlen: evt.header.addrlen,
			ret: evt.header.ret,
			addr: evt.header.sockaddr().into(),
		})
	}
}

impl fmt::Display for BindRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let kind = match self.kind {
			EventKind::Entry => "enter",
			EventKind::Exit => "exit",
		};
		write!(
			f,
			"[{kind}] host={} tgid={} pid={} ppid={} uid={} comm={}",
			self.node.nodename, self.host_tgid, self.host_pid, self.host_ppid, self.uid, self.comm
		)?;
		match self.kind {
			EventKind::Entry => write!(f, " fd={} addr={} cwd={} exe={}", self.fd, self.addr, self.cwd, self.exe),
			EventKind::Exit => write!(f, " ret={}", self.ret),
		}
	}
}

// region:    --- Tests


// endregion: --- Tests
