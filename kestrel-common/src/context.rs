//! Context enrichment: everything a record carries besides its syscall
//! arguments.

use core::ops::DerefMut;

use crate::{
	event::{EventKind, EventMeta, NodeMeta, PathStr, Record, TaskMeta},
	filter::AgentConfig,
	transport::{Ticket, Transport},
	Error, Result, SCRATCH_LEN, TASK_COMM_LEN,
};

pub type ScratchBuf = [u8; SCRATCH_LEN];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskPath {
	Cwd,
	Exe,
}

/// Task fields that need a walk of the current `task_struct`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskSnapshot {
	pub start_time: u64,
	pub leader_start_time: u64,
	pub host_ppid: u32,
	pub parent_start_time: u64,
	pub ns_pid: u32,
	pub ns_tgid: u32,
	pub ns_ppid: u32,
	pub mnt_ns_id: u64,
	pub pid_ns_id: u64,
}

/// What the probe can learn about the thread it is running on.
pub trait Kernel {
	type Scratch<'a>: DerefMut<Target = ScratchBuf>
	where
		Self: 'a;

	fn ktime_ns(&self) -> u64;
	fn processor_id(&self) -> u32;
	fn syscall_id(&self) -> i32;
	/// `tgid << 32 | pid`
	fn pid_tgid(&self) -> u64;
	/// `gid << 32 | uid`
	fn uid_gid(&self) -> u64;
	fn cgroup_id(&self) -> u64;
	fn comm(&self) -> [u8; TASK_COMM_LEN];
	/// `None` when the current task cannot be read.
	fn task(&self) -> Option<TaskSnapshot>;
	/// Copies the UTS name of the current task. `false` when unavailable.
	fn read_node(&self, node: &mut NodeMeta) -> bool;
	/// Per-CPU scratch buffer, `None` when exhausted.
	fn scratch(&self) -> Option<Self::Scratch<'_>>;
	/// Resolves a task path into `scratch` and returns the resolved bytes.
	fn resolve_path<'s>(&self, which: TaskPath, scratch: &'s mut ScratchBuf) -> &'s [u8];
}

pub trait TriggerStats {
	fn add_trigger(&self);
}

/// Derives the exec id of one process lifetime from `(tgid, start_time)`.
///
/// For a fixed `tgid` the mapping is a bijection of `start_time`, so a reused
/// pid with a new start time always gets a new id.
pub const fn exec_id(tgid: u32, start_time: u64) -> u64 {
	let mut z = start_time ^ (tgid as u64).rotate_left(32);
	z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
	z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
	z ^ (z >> 31)
}

/// Per-invocation view of the probe's collaborators.
pub struct Capture<'a, K, S> {
	kernel: &'a K,
	stats: &'a S,
	config: AgentConfig,
}

impl<'a, K: Kernel, S: TriggerStats> Capture<'a, K, S> {
	pub fn new(kernel: &'a K, stats: &'a S, config: AgentConfig) -> Self {
		Self { kernel, stats, config }
	}

	pub fn can_proceed(&self) -> bool {
		let tgid = (self.kernel.pid_tgid() >> 32) as u32;
		self.config.can_proceed(tgid)
	}

	/// Reserves a record of type `T`, tags it with `kind` and fills the
	/// common context. Any failure after the reservation discards it.
	pub fn new_event<C, T>(&self, channel: &C, kind: EventKind) -> Result<Ticket<C::Slot, T>>
	where
		C: Transport<T>,
		T: Record,
	{
		self.stats.add_trigger();

		if !self.can_proceed() {
			return Err(Error::FilterIgnored);
		}

		let slot = channel.reserve().ok_or(Error::ReservationFailed)?;
		let mut ticket = Ticket::flushed(slot);

		let record = ticket.record_mut();
		record.set_kind(kind);

		let ctx = record.context_mut();
		self.init_meta(&mut ctx.meta);
		self.init_task(&mut ctx.task)?;
		self.init_node(&mut ctx.node)?;

		let (cwd, exe) = record.paths_mut();
		self.init_cwd_and_exe(cwd, exe)?;

		Ok(ticket)
	}

	fn init_meta(&self, meta: &mut EventMeta) {
		meta.ts = self.kernel.ktime_ns();
		meta.syscall = self.kernel.syscall_id();
		meta.processor = self.kernel.processor_id() as u16;
	}

	fn init_task(&self, task: &mut TaskMeta) -> Result<()> {
		let snap = self.kernel.task().ok_or(Error::NullMetadata)?;

		task.start_time = snap.start_time;

		let pid_tgid = self.kernel.pid_tgid();
		task.host_pid = pid_tgid as u32;
		task.host_tgid = (pid_tgid >> 32) as u32;
		task.host_ppid = snap.host_ppid;

		task.pid = snap.ns_pid;
		task.tgid = snap.ns_tgid;
		task.ppid = snap.ns_ppid;

		let uid_gid = self.kernel.uid_gid();
		task.uid = uid_gid as u32;
		task.gid = (uid_gid >> 32) as u32;

		task.cgroup_id = self.kernel.cgroup_id();
		task.mnt_ns_id = snap.mnt_ns_id;
		task.pid_ns_id = snap.pid_ns_id;

		task.exec_id = exec_id(task.host_tgid, snap.leader_start_time);
		task.parent_exec_id = exec_id(task.host_ppid, snap.parent_start_time);

		task.comm = self.kernel.comm();
		Ok(())
	}

	fn init_node(&self, node: &mut NodeMeta) -> Result<()> {
		if self.kernel.read_node(node) {
			Ok(())
		} else {
			Err(Error::NullMetadata)
		}
	}

	fn init_cwd_and_exe(&self, cwd: &mut PathStr, exe: &mut PathStr) -> Result<()> {
		let mut scratch = self.kernel.scratch().ok_or(Error::ScratchSpaceExhausted)?;

		cwd.set(self.kernel.resolve_path(TaskPath::Cwd, &mut scratch));
		exe.set(self.kernel.resolve_path(TaskPath::Exe, &mut scratch));

		Ok(())
	}
}

// region:    --- Tests

#[cfg(test)]
mod tests {
	type Result<T> = core::result::Result<T, Box<dyn std::error::Error>>; // For tests.

	use std::boxed::Box;
	use std::vec;

	use super::*;
	use crate::{
		event::{cstr, BindEvent},
		testing::{CountingStats, FakeKernel, MemRing},
		MAX_PATH_LEN,
	};

	const FX_RECORD: usize = core::mem::size_of::<BindEvent>();

	#[test]
	fn context_exec_id_is_deterministic() {
		assert_eq!(exec_id(4242, 1_000_000), exec_id(4242, 1_000_000));
	}

	#[test]
	fn context_exec_id_changes_with_start_time_on_pid_reuse() {
		for (a, b) in [(1u64, 2u64), (0, u64::MAX), (123_456_789, 123_456_790)] {
			assert_ne!(exec_id(77, a), exec_id(77, b));
		}
		assert_ne!(exec_id(77, 5), exec_id(78, 5));
	}

	#[test]
	fn context_populates_full_identity() -> Result<()> {
		// -- Setup & Fixtures
		let kernel = FakeKernel::new(0x0000_1000_0000_1001);
		let stats = CountingStats::default();
		let ring = MemRing::<BindEvent>::with_byte_size(4 * FX_RECORD);
		let cap = Capture::new(&kernel, &stats, AgentConfig::unknown());

		// -- Exec
		let ticket = cap.new_event::<_, BindEvent>(&ring, EventKind::Entry)?;
		ticket.submit();
		let rec = ring.pop().ok_or("no record")?;

		// -- Check
		let task = rec.context.task;
		assert_eq!(rec.kind(), Some(EventKind::Entry));
		assert_eq!(task.host_pid, 0x1001);
		assert_eq!(task.host_tgid, 0x1000);
		assert_eq!(task.host_ppid, kernel.snapshot.host_ppid);
		assert_eq!(task.pid, kernel.snapshot.ns_pid);
		assert_eq!(task.tgid, kernel.snapshot.ns_tgid);
		assert_eq!(task.ppid, kernel.snapshot.ns_ppid);
		assert_eq!(task.uid, 1000);
		assert_eq!(task.gid, 100);
		assert_eq!(task.cgroup_id, kernel.cgroup_id);
		assert_eq!(task.mnt_ns_id, kernel.snapshot.mnt_ns_id);
		assert_eq!(task.pid_ns_id, kernel.snapshot.pid_ns_id);
		assert_eq!(task.start_time, kernel.snapshot.start_time);
		assert_eq!(task.exec_id, exec_id(0x1000, kernel.snapshot.leader_start_time));
		assert_eq!(
			task.parent_exec_id,
			exec_id(kernel.snapshot.host_ppid, kernel.snapshot.parent_start_time)
		);
		assert_eq!(cstr(&task.comm), b"nginx");
		assert_eq!(rec.context.meta.syscall, crate::SYS_BIND);
		assert_eq!(rec.context.meta.processor, 3);
		assert!(rec.context.meta.ts > 0);
		assert_eq!(cstr(&rec.context.node.nodename), b"node-a");
		assert_eq!(cstr(&rec.context.node.sysname), b"Linux");
		assert_eq!(rec.cwd.as_slice(), b"/srv/www");
		assert_eq!(rec.exe.as_slice(), b"/usr/sbin/nginx");
		assert_eq!(stats.triggers(), 1);
		Ok(())
	}

	#[test]
	fn context_self_event_is_filtered_before_reserving() -> Result<()> {
		// -- Setup & Fixtures
		let kernel = FakeKernel::new(0x0000_2000_0000_2000);
		let stats = CountingStats::default();
		let ring = MemRing::<BindEvent>::with_byte_size(FX_RECORD);
		let cap = Capture::new(&kernel, &stats, AgentConfig::new(0x2000));

		// -- Exec
		let res = cap.new_event::<_, BindEvent>(&ring, EventKind::Entry);

		// -- Check
		assert!(matches!(res, Err(Error::FilterIgnored)));
		assert_eq!(stats.triggers(), 1);
		assert_eq!(ring.reserved(), 0);
		assert_eq!(ring.discarded(), 0);
		Ok(())
	}

	#[test]
	fn context_full_channel_reports_reservation_failure() -> Result<()> {
		let kernel = FakeKernel::new(0x0000_3000_0000_3000);
		let stats = CountingStats::default();
		let ring = MemRing::<BindEvent>::with_byte_size(FX_RECORD - 1);
		let cap = Capture::new(&kernel, &stats, AgentConfig::unknown());

		let res = cap.new_event::<_, BindEvent>(&ring, EventKind::Exit);

		assert!(matches!(res, Err(Error::ReservationFailed)));
		Ok(())
	}

	#[test]
	fn context_scratch_exhaustion_discards_reservation() -> Result<()> {
		// -- Setup & Fixtures
		let mut kernel = FakeKernel::new(0x0000_4000_0000_4000);
		kernel.scratch_available = false;
		let stats = CountingStats::default();
		let ring = MemRing::<BindEvent>::with_byte_size(FX_RECORD);
		let cap = Capture::new(&kernel, &stats, AgentConfig::unknown());

		// -- Exec
		let res = cap.new_event::<_, BindEvent>(&ring, EventKind::Entry);

		// -- Check
		assert!(matches!(res, Err(Error::ScratchSpaceExhausted)));
		assert!(ring.pop().is_none());
		assert_eq!(ring.discarded(), 1);
		assert_eq!(ring.reserved(), 0);
		Ok(())
	}

	#[test]
	fn context_missing_task_or_node_discards_reservation() -> Result<()> {
		// -- Setup & Fixtures
		let mut no_task = FakeKernel::new(0x0000_5000_0000_5000);
		no_task.task_readable = false;
		let mut no_node = FakeKernel::new(0x0000_5000_0000_5000);
		no_node.node_readable = false;
		let stats = CountingStats::default();
		let ring = MemRing::<BindEvent>::with_byte_size(FX_RECORD);

		// -- Exec & Check
		for kernel in [&no_task, &no_node] {
			let cap = Capture::new(kernel, &stats, AgentConfig::unknown());
			let res = cap.new_event::<_, BindEvent>(&ring, EventKind::Entry);
			assert!(matches!(res, Err(Error::NullMetadata)));
		}
		assert!(ring.pop().is_none());
		assert_eq!(ring.discarded(), 2);
		Ok(())
	}

	#[test]
	fn context_long_paths_are_clamped() -> Result<()> {
		// -- Setup & Fixtures
		let mut kernel = FakeKernel::new(0x0000_6000_0000_6000);
		kernel.cwd = vec![b'd'; MAX_PATH_LEN + 100];
		kernel.exe = vec![b'e'; crate::SCRATCH_LEN + 10];
		let stats = CountingStats::default();
		let ring = MemRing::<BindEvent>::with_byte_size(FX_RECORD);
		let cap = Capture::new(&kernel, &stats, AgentConfig::unknown());

		// -- Exec
		cap.new_event::<_, BindEvent>(&ring, EventKind::Entry)?.submit();
		let rec = ring.pop().ok_or("no record")?;

		// -- Check
		assert_eq!(rec.cwd.len as usize, MAX_PATH_LEN);
		assert_eq!(rec.exe.len as usize, MAX_PATH_LEN);
		assert!(rec.cwd.as_slice().iter().all(|&b| b == b'd'));
		Ok(())
	}
}

// endregion: --- Tests
