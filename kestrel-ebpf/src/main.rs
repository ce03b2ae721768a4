#![no_std]
#![no_main]

use aya_ebpf::{
	macros::{kprobe, kretprobe, map},
	maps::{PerCpuArray, RingBuf},
	programs::{ProbeContext, RetProbeContext},
	EbpfContext,
};
use aya_log_ebpf::{debug, error};
use kestrel_common::{bind_entry, bind_exit, AgentConfig, BindArgs, Capture, Error, ScratchBuf, EVT_RING_BYTES, SYS_BIND};

mod path;
mod probe;
mod ring;
mod vmlinux;

use crate::{
	probe::{CurrentTask, SyscallRegs},
	ring::{EventRing, PerCpuStats, UserSpace},
};

#[map]
static EVT_MAP: RingBuf = RingBuf::with_byte_size(EVT_RING_BYTES, 0);

#[map]
static STATS_MAP: PerCpuArray<u64> = PerCpuArray::with_max_entries(1, 0);

// per-CPU path buffer, too large for the 512 byte BPF stack
#[map]
static SCRATCH_MAP: PerCpuArray<ScratchBuf> = PerCpuArray::with_max_entries(1, 0);

// Set once by the loader through `EbpfLoader::set_global`.
#[no_mangle]
static AGENT_CONFIG: AgentConfig = AgentConfig::unknown();

fn agent_config() -> AgentConfig {
	unsafe { core::ptr::read_volatile(&AGENT_CONFIG) }
}

#[kprobe]
pub fn sys_bind_entry(ctx: ProbeContext) -> u32 {
	match try_sys_bind_entry(&ctx) {
		Ok(()) => 0,
		Err(err) => report(&ctx, err),
	}
}

#[kretprobe]
pub fn sys_bind_exit(ctx: RetProbeContext) -> u32 {
	match try_sys_bind_exit(&ctx) {
		Ok(()) => 0,
		Err(err) => report(&ctx, err),
	}
}

fn try_sys_bind_entry(ctx: &ProbeContext) -> Result<(), Error> {
	let regs = SyscallRegs::from_wrapper(ctx);
	let syscall = regs.as_ref().map_or(SYS_BIND, SyscallRegs::syscall_id);

	let kernel = CurrentTask::new(syscall);
	let stats = PerCpuStats(&STATS_MAP);
	let cap = Capture::new(&kernel, &stats, agent_config());

	let args = match regs {
		Some(regs) => BindArgs {
			fd: regs.arg(0) as i32,
			addr: regs.arg(1),
			addrlen: regs.arg(2) as i32,
		},
		None => BindArgs::default(),
	};

	bind_entry(&cap, &EventRing(&EVT_MAP), &UserSpace, args)
}

fn try_sys_bind_exit(ctx: &RetProbeContext) -> Result<(), Error> {
	let ret: i64 = ctx.ret().unwrap_or(0);

	let kernel = CurrentTask::new(SYS_BIND);
	let stats = PerCpuStats(&STATS_MAP);
	let cap = Capture::new(&kernel, &stats, agent_config());

	bind_exit(&cap, &EventRing(&EVT_MAP), ret as i32)
}

// logs instead of failing so the syscall itself is never affected
fn report<C: EbpfContext>(ctx: &C, err: Error) -> u32 {
	if !err.is_failure() {
		return 0;
	}
	match err {
		Error::ReservationFailed => debug!(ctx, "ring buffer full, bind event dropped"),
		_ => error!(ctx, "bind event dropped, status {}", err.code()),
	}
	err.code() as u32
}

#[cfg(not(test))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
	loop {}
}

#[link_section = "license"]
#[no_mangle]
static LICENSE: [u8; 13] = *b"Dual MIT/GPL\0";
