use aya::{
	maps::{MapData, RingBuf},
	programs::KProbe,
	Ebpf, EbpfLoader,
};
use kestrel_common::{AgentConfig, AGENT_CONFIG, EVT_MAP};
use tokio::io::unix::AsyncFd;
use tracing::{debug, info};

use crate::{Error, Result};

const ENTRY_PROG: &str = "sys_bind_entry";
const EXIT_PROG: &str = "sys_bind_exit";

/// Loads the probe object with `app_pid` baked in as the agent to ignore.
pub fn load(object: &[u8], app_pid: u32) -> Result<Ebpf> {
	if object.is_empty() {
		return Err(Error::EmptyEbpfObject);
	}
	let config = AgentConfig::new(app_pid);
	let ebpf = EbpfLoader::new().set_global(AGENT_CONFIG, &config, true).load(object)?;
	debug!("loaded eBPF object, agent pid {app_pid}");
	Ok(ebpf)
}

/// Attaches both halves of the bind probe to `symbol` and hands back the
/// event ring.
pub fn load_probes(ebpf: &mut Ebpf, symbol: &str) -> Result<AsyncFd<RingBuf<MapData>>> {
	let entry: &mut KProbe = ebpf.program_mut(ENTRY_PROG).ok_or(Error::EbpfProgNotFound)?.try_into()?;
	entry.load()?;
	entry.attach(symbol, 0)?;

	let exit: &mut KProbe = ebpf.program_mut(EXIT_PROG).ok_or(Error::EbpfProgNotFound)?.try_into()?;
	exit.load()?;
	exit.attach(symbol, 0)?;
	info!("bind probes attached to {symbol}");

	let ring_buf = RingBuf::try_from(ebpf.take_map(EVT_MAP).ok_or(Error::EbpfMapNotFound(EVT_MAP))?)?;
	let fd = AsyncFd::new(ring_buf)?;
	Ok(fd)
}
