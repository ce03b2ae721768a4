#![no_std]

#[cfg(test)]
extern crate std;

pub mod addr;
pub mod context;
pub mod emit;
pub mod error;
pub mod event;
pub mod filter;
pub mod transport;

#[cfg(test)]
mod testing;

pub use addr::{decode_sockaddr, swap16, SockAddr, UserMemory};
pub use context::{exec_id, Capture, Kernel, ScratchBuf, TaskPath, TaskSnapshot, TriggerStats};
pub use emit::{bind_entry, bind_exit, BindArgs};
pub use error::{Error, Result};
pub use event::{
	clamp_path_len, cstr, BindEvent, BindHeader, EventContext, EventKind, EventMeta, NodeMeta, PathStr, Record,
	TaskMeta,
};
pub use filter::{AgentConfig, UNKNOWN_PID};
pub use transport::{Reservation, Ticket, Transport};

pub const TASK_COMM_LEN: usize = 16;
pub const UTS_LEN: usize = 65;
pub const MAX_UNIX_PATH: usize = 108;

/// Upper bound for each trailing path string. Must stay a power of two.
pub const MAX_PATH_LEN: usize = 256;
pub const SCRATCH_LEN: usize = 4096;
pub const MAX_PATH_DEPTH: usize = 16;

pub const SYS_BIND: i32 = 49;

pub const EVT_RING_BYTES: u32 = 256 * 1024;

pub const EVT_MAP: &str = "EVT_MAP";
pub const STATS_MAP: &str = "STATS_MAP";
pub const SCRATCH_MAP: &str = "SCRATCH_MAP";
pub const AGENT_CONFIG: &str = "AGENT_CONFIG";

const _: () = assert!(MAX_PATH_LEN.is_power_of_two());
const _: () = assert!(SCRATCH_LEN >= MAX_PATH_LEN);
