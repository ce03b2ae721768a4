use derive_more::Display;

pub type Result<T> = core::result::Result<T, Error>;

/// Why a probe firing produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("{self:?}")]
pub enum Error {
	/// The event came from the agent itself. Not a failure.
	FilterIgnored,
	/// The transport channel had no room left; the event is lost.
	ReservationFailed,
	ScratchSpaceExhausted,
	NullMetadata,
}

impl Error {
	/// Status handed back from the probe entry point.
	pub const fn code(self) -> i32 {
		match self {
			Error::FilterIgnored => 0,
			Error::ReservationFailed => -1,
			Error::ScratchSpaceExhausted => -2,
			Error::NullMetadata => -3,
		}
	}

	pub const fn is_failure(self) -> bool {
		!matches!(self, Error::FilterIgnored)
	}
}

// region:    --- Error Boilerplate

impl core::error::Error for Error {}

// endregion: --- Error Boilerplate

// region:    --- Tests

#[cfg(test)]
mod tests {
	use std::boxed::Box;
	use std::string::ToString;

	use super::*;

	#[test]
	fn error_filter_ignored_is_not_a_failure() {
		assert!(!Error::FilterIgnored.is_failure());
		assert_eq!(Error::FilterIgnored.code(), 0);

		for err in [Error::ReservationFailed, Error::ScratchSpaceExhausted, Error::NullMetadata] {
			assert!(err.is_failure());
			assert!(err.code() < 0);
		}
	}

	#[test]
	fn error_converts_into_boxed_std_error() {
		fn reserve() -> core::result::Result<(), Box<dyn std::error::Error>> {
			Err(Error::ReservationFailed)?;
			Ok(())
		}

		let Err(err) = reserve() else {
			panic!("expected an error");
		};
		assert_eq!(err.to_string(), "ReservationFailed");
		assert_eq!(err.downcast_ref::<Error>(), Some(&Error::ReservationFailed));
	}
}

// endregion: --- Tests
