use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// The agent's pid has not been recorded yet.
pub const UNKNOWN_PID: u32 = u32::MAX;

/// Read-only settings injected once when the probes are loaded.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct AgentConfig {
	pub app_pid: u32,
}

impl AgentConfig {
	pub const fn new(app_pid: u32) -> Self {
		Self { app_pid }
	}

	pub const fn unknown() -> Self {
		Self::new(UNKNOWN_PID)
	}

	pub const fn app_pid(&self) -> Option<u32> {
		match self.app_pid {
			UNKNOWN_PID => None,
			pid => Some(pid),
		}
	}

	/// Self-event filter. `false` when `current_tgid` is the agent itself.
	///
	/// An unknown agent pid never suppresses anything.
	pub const fn can_proceed(&self, current_tgid: u32) -> bool {
		match self.app_pid() {
			Some(pid) => pid != current_tgid,
			None => true,
		}
	}
}

impl Default for AgentConfig {
	fn default() -> Self {
		Self::unknown()
	}
}

#[cfg(feature = "user")]
unsafe impl aya::Pod for AgentConfig {}

// region:    --- Tests


// endregion: --- Tests
