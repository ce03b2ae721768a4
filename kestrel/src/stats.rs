use std::time::Duration;

use aya::{
	maps::{MapData, PerCpuArray},
	Ebpf,
};
use tracing::{info, warn};

use crate::{Error, Result};

/// User-space handle on the per-CPU count of probe invocations.
pub struct TriggerCounter {
	map: PerCpuArray<MapData, u64>,
}

impl TriggerCounter {
	pub fn take_from(ebpf: &mut Ebpf) -> Result<Self> {
		let map = ebpf
			.take_map(kestrel_common::STATS_MAP)
			.ok_or(Error::EbpfMapNotFound(kestrel_common::STATS_MAP))?;
		Ok(Self {
			map: PerCpuArray::try_from(map)?,
		})
	}

	pub fn total(&self) -> Result<u64> {
		let per_cpu = self.map.get(&0, 0)?;
		Ok(sum_per_cpu(per_cpu.iter().copied()))
	}

	/// Logs the running total every `period`. Never returns.
	pub async fn report_every(self, period: Duration) {
		let mut ticker = tokio::time::interval(period);
		// first tick completes immediately
		ticker.tick().await;
		loop {
			ticker.tick().await;
			match self.total() {
				Ok(triggers) => info!(target: "stats", triggers, "bind probe triggers"),
				Err(err) => warn!("failed to read trigger counter: {err}"),
			}
		}
	}
}

pub fn sum_per_cpu(values: impl IntoIterator<Item = u64>) -> u64 {
	values.into_iter().fold(0, u64::wrapping_add)
}
