use core::ptr::{addr_of, null};

use aya_ebpf::{
	bindings::pt_regs,
	helpers::{
		bpf_get_current_comm, bpf_get_current_pid_tgid, bpf_get_current_uid_gid, bpf_ktime_get_ns,
		bpf_probe_read_kernel, bpf_probe_read_kernel_buf,
		r#gen::{bpf_get_current_cgroup_id, bpf_get_current_task, bpf_get_smp_processor_id},
	},
	programs::ProbeContext,
};
use kestrel_common::{Kernel, NodeMeta, ScratchBuf, TaskPath, TaskSnapshot, TASK_COMM_LEN};
use zerocopy::IntoBytes;

use crate::{
	path,
	vmlinux::{nsproxy, pid, task_struct, upid, MAX_PID_NS_LEVEL},
	SCRATCH_MAP,
};

/// Syscall registers behind the `__x64_sys_*` wrapper, whose only
/// argument is the user `pt_regs`.
pub struct SyscallRegs {
	regs: pt_regs,
}

impl SyscallRegs {
	pub fn from_wrapper(ctx: &ProbeContext) -> Option<Self> {
		let regs: *const pt_regs = ctx.arg(0)?;
		if regs.is_null() {
			return None;
		}
		let regs = unsafe { bpf_probe_read_kernel(regs) }.ok()?;
		Some(Self { regs })
	}

	pub fn arg(&self, n: usize) -> u64 {
		match n {
			0 => self.regs.rdi,
			1 => self.regs.rsi,
			2 => self.regs.rdx,
			_ => 0,
		}
	}

	pub fn syscall_id(&self) -> i32 {
		self.regs.orig_rax as i32
	}
}

pub struct CurrentTask {
	task: *const task_struct,
	syscall: i32,
}

impl CurrentTask {
	pub fn new(syscall: i32) -> Self {
		let task = unsafe { bpf_get_current_task() } as *const task_struct;
		Self { task, syscall }
	}
}

impl Kernel for CurrentTask {
	type Scratch<'a> = &'a mut ScratchBuf;

	fn ktime_ns(&self) -> u64 {
		unsafe { bpf_ktime_get_ns() }
	}

	fn processor_id(&self) -> u32 {
		unsafe { bpf_get_smp_processor_id() }
	}

	fn syscall_id(&self) -> i32 {
		self.syscall
	}

	fn pid_tgid(&self) -> u64 {
		bpf_get_current_pid_tgid()
	}

	fn uid_gid(&self) -> u64 {
		bpf_get_current_uid_gid()
	}

	fn cgroup_id(&self) -> u64 {
		unsafe { bpf_get_current_cgroup_id() }
	}

	fn comm(&self) -> [u8; TASK_COMM_LEN] {
		bpf_get_current_comm().unwrap_or([0u8; TASK_COMM_LEN])
	}

	fn task(&self) -> Option<TaskSnapshot> {
		unsafe { snapshot(self.task) }
	}

	fn read_node(&self, node: &mut NodeMeta) -> bool {
		unsafe { read_uts(self.task, node) }.is_some()
	}

	fn scratch(&self) -> Option<&mut ScratchBuf> {
		let buf = SCRATCH_MAP.get_ptr_mut(0)?;
		Some(unsafe { &mut *buf })
	}

	fn resolve_path<'s>(&self, which: TaskPath, scratch: &'s mut ScratchBuf) -> &'s [u8] {
		unsafe { path::resolve(self.task, which, scratch) }
	}
}

// region:    --- Task walk

unsafe fn read<T>(src: *const T) -> Option<T> {
	bpf_probe_read_kernel(src).ok()
}

unsafe fn snapshot(task: *const task_struct) -> Option<TaskSnapshot> {
	if task.is_null() {
		return None;
	}
	let leader = read(addr_of!((*task).group_leader))?.cast_const();
	let parent = read(addr_of!((*task).real_parent))?.cast_const();
	let parent_leader = match parent.is_null() {
		true => null(),
		false => read(addr_of!((*parent).group_leader))?.cast_const(),
	};
	let proxy = read(addr_of!((*task).nsproxy))?.cast_const();

	Some(TaskSnapshot {
		start_time: start_time(task),
		leader_start_time: start_time(leader),
		host_ppid: host_tgid(parent),
		parent_start_time: start_time(parent_leader),
		ns_pid: ns_nr(task),
		ns_tgid: ns_nr(leader),
		ns_ppid: ns_nr(parent_leader),
		mnt_ns_id: mnt_ns_inum(proxy),
		pid_ns_id: pid_ns_inum(proxy),
	})
}

unsafe fn start_time(task: *const task_struct) -> u64 {
	if task.is_null() {
		return 0;
	}
	read(addr_of!((*task).start_time)).unwrap_or(0)
}

unsafe fn host_tgid(task: *const task_struct) -> u32 {
	if task.is_null() {
		return 0;
	}
	read(addr_of!((*task).tgid)).map_or(0, |tgid| tgid as u32)
}

/// Number of `task` as seen from its own pid namespace.
unsafe fn ns_nr(task: *const task_struct) -> u32 {
	if task.is_null() {
		return 0;
	}
	let thread_pid: *const pid = match read(addr_of!((*task).thread_pid)) {
		Some(thread_pid) if !thread_pid.is_null() => thread_pid.cast_const(),
		_ => return 0,
	};
	let level = read(addr_of!((*thread_pid).level)).unwrap_or(0);
	if level >= MAX_PID_NS_LEVEL {
		return 0;
	}
	let numbers = addr_of!((*thread_pid).numbers) as *const upid;
	let entry = numbers.add(level as usize);
	read(addr_of!((*entry).nr)).map_or(0, |nr| nr as u32)
}

unsafe fn mnt_ns_inum(proxy: *const nsproxy) -> u64 {
	if proxy.is_null() {
		return 0;
	}
	match read(addr_of!((*proxy).mnt_ns)) {
		Some(ns) if !ns.is_null() => read(addr_of!((*ns).ns.inum)).map_or(0, u64::from),
		_ => 0,
	}
}

unsafe fn pid_ns_inum(proxy: *const nsproxy) -> u64 {
	if proxy.is_null() {
		return 0;
	}
	match read(addr_of!((*proxy).pid_ns_for_children)) {
		Some(ns) if !ns.is_null() => read(addr_of!((*ns).ns.inum)).map_or(0, u64::from),
		_ => 0,
	}
}

unsafe fn read_uts(task: *const task_struct, node: &mut NodeMeta) -> Option<()> {
	if task.is_null() {
		return None;
	}
	let proxy = read(addr_of!((*task).nsproxy))?;
	if proxy.is_null() {
		return None;
	}
	let uts = read(addr_of!((*proxy).uts_ns))?;
	if uts.is_null() {
		return None;
	}
	bpf_probe_read_kernel_buf(addr_of!((*uts).name).cast::<u8>(), node.as_mut_bytes()).ok()
}

// endregion: --- Task walk
