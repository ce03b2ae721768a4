//! ENTRY and EXIT producers for `bind(2)`.
//!
//! The two are independent: nothing is carried from an entry to its exit.
//! Downstream pairs them by thread id and timestamp.

use crate::{
	addr::{decode_sockaddr, UserMemory},
	context::{Capture, Kernel, TriggerStats},
	event::{BindEvent, EventKind},
	transport::Transport,
	Result,
};

/// Raw `bind(int fd, struct sockaddr *umyaddr, int addrlen)` arguments.
#[derive(Clone, Copy, Debug, Default)]
pub struct BindArgs {
	pub fd: i32,
	pub addr: u64,
	pub addrlen: i32,
}

pub fn bind_entry<K, S, C, M>(cap: &Capture<'_, K, S>, channel: &C, mem: &M, args: BindArgs) -> Result<()>
where
	K: Kernel,
	S: TriggerStats,
	C: Transport<BindEvent>,
	M: UserMemory,
{
	let mut ticket = cap.new_event::<C, BindEvent>(channel, EventKind::Entry)?;

	let header = &mut ticket.record_mut().header;
	header.fd = args.fd;
	header.addrlen = args.addrlen;
	if let Some(addr) = decode_sockaddr(mem, args.addr) {
		addr.write_into(header);
	}

	ticket.submit();
	Ok(())
}

pub fn bind_exit<K, S, C>(cap: &Capture<'_, K, S>, channel: &C, ret: i32) -> Result<()>
where
	K: Kernel,
	S: TriggerStats,
	C: Transport<BindEvent>,
{
	let mut ticket = cap.new_event::<C, BindEvent>(channel, EventKind::Exit)?;
	ticket.record_mut().header.ret = ret;
	ticket.submit();
	Ok(())
}

// region:    --- Tests


// endregion: --- Tests
