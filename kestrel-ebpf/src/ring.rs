use core::mem::MaybeUninit;

use aya_ebpf::{
	helpers::bpf_probe_read_user,
	maps::{ring_buf::RingBufEntry, PerCpuArray, RingBuf},
};
use kestrel_common::{Reservation, Transport, TriggerStats, UserMemory};
use zerocopy::FromBytes;

pub struct EventRing(pub &'static RingBuf);

pub struct RingSlot<T: 'static>(RingBufEntry<T>);

impl<T: 'static> Transport<T> for EventRing {
	type Slot = RingSlot<T>;

	fn reserve(&self) -> Option<RingSlot<T>> {
		self.0.reserve::<T>(0).map(RingSlot)
	}
}

impl<T: 'static> Reservation<T> for RingSlot<T> {
	fn slot(&mut self) -> &mut MaybeUninit<T> {
		&mut self.0
	}

	fn submit(self) {
		self.0.submit(0);
	}

	fn discard(self) {
		self.0.discard(0);
	}
}

pub struct UserSpace;

impl UserMemory for UserSpace {
	fn read<T: FromBytes>(&self, addr: u64) -> Option<T> {
		unsafe { bpf_probe_read_user(addr as *const T) }.ok()
	}
}

pub struct PerCpuStats(pub &'static PerCpuArray<u64>);

impl TriggerStats for PerCpuStats {
	fn add_trigger(&self) {
		if let Some(count) = self.0.get_ptr_mut(0) {
			unsafe { *count += 1 };
		}
	}
}
