//! Host doubles for the kernel-side collaborators.

use core::{
	cell::{Cell, RefCell, RefMut},
	mem::{size_of, MaybeUninit},
	sync::atomic::{AtomicU64, Ordering},
};
use std::{
	boxed::Box,
	collections::VecDeque,
	sync::{Arc, Mutex, MutexGuard},
	vec::Vec,
};

use zerocopy::FromBytes;

use crate::{
	addr::UserMemory,
	context::{Kernel, ScratchBuf, TaskPath, TaskSnapshot, TriggerStats},
	event::NodeMeta,
	transport::{Reservation, Transport},
	SCRATCH_LEN, SYS_BIND, TASK_COMM_LEN, UTS_LEN,
};

// region:    --- MemRing

struct RingState<T> {
	used: usize,
	ready: VecDeque<Box<T>>,
	discarded: usize,
}

/// Byte-capacity MPSC ring. Capacity is returned on `pop` or discard.
pub struct MemRing<T> {
	capacity: usize,
	state: Arc<Mutex<RingState<T>>>,
}

impl<T> MemRing<T> {
	pub fn with_byte_size(capacity: usize) -> Self {
		Self {
			capacity,
			state: Arc::new(Mutex::new(RingState {
				used: 0,
				ready: VecDeque::new(),
				discarded: 0,
			})),
		}
	}

	fn lock(&self) -> MutexGuard<'_, RingState<T>> {
		self.state.lock().unwrap_or_else(|e| e.into_inner())
	}

	/// Consumer side. Oldest published record first.
	pub fn pop(&self) -> Option<Box<T>> {
		let mut state = self.lock();
		let rec = state.ready.pop_front()?;
		state.used -= size_of::<T>();
		Some(rec)
	}

	/// Bytes held by in-flight reservations and unconsumed records.
	pub fn reserved(&self) -> usize {
		self.lock().used
	}

	pub fn discarded(&self) -> usize {
		self.lock().discarded
	}
}

pub struct MemSlot<T> {
	buf: Box<MaybeUninit<T>>,
	state: Arc<Mutex<RingState<T>>>,
}

impl<T> Transport<T> for MemRing<T> {
	type Slot = MemSlot<T>;

	fn reserve(&self) -> Option<MemSlot<T>> {
		let mut state = self.lock();
		if state.used + size_of::<T>() > self.capacity {
			return None;
		}
		state.used += size_of::<T>();
		Some(MemSlot {
			buf: Box::new(MaybeUninit::uninit()),
			state: Arc::clone(&self.state),
		})
	}
}

impl<T> Reservation<T> for MemSlot<T> {
	fn slot(&mut self) -> &mut MaybeUninit<T> {
		&mut self.buf
	}

	fn submit(self) {
		// SAFETY: only `Ticket` submits, and it flushes the slot first.
		let rec = unsafe { Box::from_raw(Box::into_raw(self.buf).cast::<T>()) };
		let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
		state.ready.push_back(rec);
	}

	fn discard(self) {
		let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
		state.used -= size_of::<T>();
		state.discarded += 1;
	}
}

// endregion: --- MemRing

// region:    --- FakeUserMemory

pub struct FakeUserMemory {
	base: u64,
	bytes: Vec<u8>,
}

impl FakeUserMemory {
	pub fn new(base: u64, bytes: Vec<u8>) -> Self {
		Self { base, bytes }
	}
}

impl UserMemory for FakeUserMemory {
	fn read<T: FromBytes>(&self, addr: u64) -> Option<T> {
		let off = usize::try_from(addr.checked_sub(self.base)?).ok()?;
		let bytes = self.bytes.get(off..)?;
		T::read_from_prefix(bytes).ok().map(|(val, _)| val)
	}
}

// endregion: --- FakeUserMemory

// region:    --- FakeKernel

pub struct FakeKernel {
	pub pid_tgid: u64,
	pub uid_gid: u64,
	pub cgroup_id: u64,
	pub comm: [u8; TASK_COMM_LEN],
	pub snapshot: TaskSnapshot,
	pub task_readable: bool,
	pub node_readable: bool,
	pub scratch_available: bool,
	pub cwd: Vec<u8>,
	pub exe: Vec<u8>,
	clock: Cell<u64>,
	scratch: RefCell<ScratchBuf>,
}

impl FakeKernel {
	pub fn new(pid_tgid: u64) -> Self {
		let mut comm = [0u8; TASK_COMM_LEN];
		comm[..5].copy_from_slice(b"nginx");
		let tgid = (pid_tgid >> 32) as u32;

		Self {
			pid_tgid,
			uid_gid: (100u64 << 32) | 1000,
			cgroup_id: 0x5eed,
			comm,
			snapshot: TaskSnapshot {
				start_time: 9_000,
				leader_start_time: 8_000,
				host_ppid: 1,
				parent_start_time: 10,
				ns_pid: tgid % 100 + 1,
				ns_tgid: tgid % 100 + 1,
				ns_ppid: 0,
				mnt_ns_id: 4_026_531_841,
				pid_ns_id: 4_026_531_836,
			},
			task_readable: true,
			node_readable: true,
			scratch_available: true,
			cwd: b"/srv/www".to_vec(),
			exe: b"/usr/sbin/nginx".to_vec(),
			clock: Cell::new(1_000),
			scratch: RefCell::new([0u8; SCRATCH_LEN]),
		}
	}
}

fn uts(value: &[u8]) -> [u8; UTS_LEN] {
	let mut out = [0u8; UTS_LEN];
	out[..value.len()].copy_from_slice(value);
	out
}

impl Kernel for FakeKernel {
	type Scratch<'a> = RefMut<'a, ScratchBuf>;

	fn ktime_ns(&self) -> u64 {
		let now = self.clock.get() + 1;
		self.clock.set(now);
		now
	}

	fn processor_id(&self) -> u32 {
		3
	}

	fn syscall_id(&self) -> i32 {
		SYS_BIND
	}

	fn pid_tgid(&self) -> u64 {
		self.pid_tgid
	}

	fn uid_gid(&self) -> u64 {
		self.uid_gid
	}

	fn cgroup_id(&self) -> u64 {
		self.cgroup_id
	}

	fn comm(&self) -> [u8; TASK_COMM_LEN] {
		self.comm
	}

	fn task(&self) -> Option<TaskSnapshot> {
		self.task_readable.then_some(self.snapshot)
	}

	fn read_node(&self, node: &mut NodeMeta) -> bool {
		if !self.node_readable {
			return false;
		}
		node.sysname = uts(b"Linux");
		node.nodename = uts(b"node-a");
		node.release = uts(b"6.8.0");
		node.machine = uts(b"x86_64");
		true
	}

	fn scratch(&self) -> Option<RefMut<'_, ScratchBuf>> {
		if !self.scratch_available {
			return None;
		}
		self.scratch.try_borrow_mut().ok()
	}

	fn resolve_path<'s>(&self, which: TaskPath, scratch: &'s mut ScratchBuf) -> &'s [u8] {
		let src = match which {
			TaskPath::Cwd => &self.cwd,
			TaskPath::Exe => &self.exe,
		};
		let len = src.len().min(SCRATCH_LEN);
		scratch[..len].copy_from_slice(&src[..len]);
		&scratch[..len]
	}
}

// endregion: --- FakeKernel

#[derive(Default)]
pub struct CountingStats {
	triggers: AtomicU64,
}

impl CountingStats {
	pub fn triggers(&self) -> u64 {
		self.triggers.load(Ordering::Relaxed)
	}
}

impl TriggerStats for CountingStats {
	fn add_trigger(&self) {
		self.triggers.fetch_add(1, Ordering::Relaxed);
	}
}
