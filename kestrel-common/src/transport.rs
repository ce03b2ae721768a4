//! Transport channel seam.
//!
//! A [`Transport`] hands out exclusive, fixed-size slots. A slot is either
//! submitted (visible to the consumer exactly once) or discarded (capacity
//! returned, contents never observed). [`Ticket`] owns a slot and discards it
//! on drop, so a record that was not explicitly submitted can never leak out
//! half written.

use core::{marker::PhantomData, mem::ManuallyDrop, mem::MaybeUninit};

use zerocopy::FromZeros;

/// Multi-producer, single-consumer record channel.
pub trait Transport<T> {
	type Slot: Reservation<T>;

	/// Never blocks. `None` means the channel is full and the event is lost.
	fn reserve(&self) -> Option<Self::Slot>;
}

/// One reserved, not yet published region of a [`Transport`].
pub trait Reservation<T> {
	fn slot(&mut self) -> &mut MaybeUninit<T>;
	fn submit(self);
	fn discard(self);
}

/// Flushed reservation holding a record under construction.
pub struct Ticket<R: Reservation<T>, T> {
	slot: ManuallyDrop<R>,
	_record: PhantomData<T>,
}

impl<R: Reservation<T>, T: FromZeros> Ticket<R, T> {
	/// Takes ownership of `slot` and zeroes the whole reserved region.
	pub fn flushed(mut slot: R) -> Self {
		let uninit = slot.slot();
		// SAFETY: the region is exclusively ours and `T: FromZeros` makes the
		// all-zero pattern a valid `T`.
		unsafe { uninit.as_mut_ptr().write_bytes(0, 1) };
		Self {
			slot: ManuallyDrop::new(slot),
			_record: PhantomData,
		}
	}

	pub fn record_mut(&mut self) -> &mut T {
		// SAFETY: zero-initialised in `flushed`, only ever written through `&mut T` since.
		unsafe { self.slot.slot().assume_init_mut() }
	}

	/// Publishes the record to the consumer.
	pub fn submit(self) {
		let mut this = ManuallyDrop::new(self);
		// SAFETY: `this` is never dropped, so the slot is taken exactly once.
		let slot = unsafe { ManuallyDrop::take(&mut this.slot) };
		slot.submit();
	}

	pub fn discard(self) {
		drop(self);
	}
}

impl<R: Reservation<T>, T> Drop for Ticket<R, T> {
	fn drop(&mut self) {
		// SAFETY: `submit` bypasses this drop, so the slot is still present.
		let slot = unsafe { ManuallyDrop::take(&mut self.slot) };
		slot.discard();
	}
}

// region:    --- Tests


// endregion: --- Tests
