mod cli;
mod error;
mod event;
mod loader;
mod stats;
mod trx;
mod worker;

pub use self::error::{Error, Result};

use std::time::Duration;

use clap::Parser;
use tokio::signal;
#[rustfmt::skip]
use tracing::{info, debug, warn};
use tracing_subscriber::EnvFilter;

use crate::{
	cli::args::Cli,
	stats::TriggerCounter,
	trx::new_trx_pair,
	worker::{ReceiverWorker, RingBufWorker},
};

fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Cli::parse();
	init_tracing();

	// Bump the memlock rlimit. This is needed for older kernels that don't use the
	// new memcg based accounting, see https://lwn.net/Articles/837122/
	let rlim = libc::rlimit {
		rlim_cur: libc::RLIM_INFINITY,
		rlim_max: libc::RLIM_INFINITY,
	};
	let ret = unsafe { libc::setrlimit(libc::RLIMIT_MEMLOCK, &rlim) };
	if ret != 0 {
		debug!("remove limit on locked memory failed, ret is: {ret}");
	}

	let object = aya::include_bytes_aligned!(concat!(env!("OUT_DIR"), "/kestrel"));
	let mut ebpf = loader::load(object, std::process::id())?;
	if let Err(e) = aya_log::EbpfLogger::init(&mut ebpf) {
		// This can happen if you remove all log statements from your eBPF program.
		warn!("failed to initialize eBPF logger: {e}");
	}

	let ringbuf_fd = loader::load_probes(&mut ebpf, &args.attach_symbol)?;
	let (tx, rx) = new_trx_pair();
	RingBufWorker::start(ringbuf_fd, tx).await?;
	ReceiverWorker::start(rx).await?;

	if args.stats_interval > 0 {
		let counter = TriggerCounter::take_from(&mut ebpf)?;
		tokio::spawn(counter.report_every(Duration::from_secs(args.stats_interval)));
	}

	info!("tracing bind(2), ctrl-c to exit");
	signal::ctrl_c().await?;
	info!("Exiting...");

	Ok(())
}
