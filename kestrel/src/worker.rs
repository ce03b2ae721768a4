use aya::maps::{MapData, RingBuf};
use tokio::io::unix::AsyncFd;
use tracing::{info, warn};

use crate::{
	event::BindRecord,
	trx::{EventRx, EventTx},
	Result,
};

pub struct RingBufWorker {
	pub ringbuf_fd: AsyncFd<RingBuf<MapData>>,
	pub tx: EventTx,
}

impl RingBufWorker {
	pub async fn start(ringbuf_fd: AsyncFd<RingBuf<MapData>>, tx: EventTx) -> Result<()> {
		let mut worker = RingBufWorker { ringbuf_fd, tx };
		tokio::spawn(async move {
			if let Err(err) = worker.start_worker().await {
				warn!("ring buffer worker stopped: {err}");
			}
		});
		Ok(())
	}

	async fn start_worker(&mut self) -> Result<()> {
		loop {
			let mut guard = self.ringbuf_fd.readable_mut().await?;
			let ring_buf = guard.get_inner_mut();

			while let Some(item) = ring_buf.next() {
				match BindRecord::from_bytes(&item) {
					Ok(record) => self.tx.send(record).await?,
					Err(err) => warn!("failed to parse bind event: {err}"),
				}
			}

			guard.clear_ready();
		}
	}
}

pub struct ReceiverWorker {
	pub rx: EventRx,
}

impl ReceiverWorker {
	pub async fn start(rx: EventRx) -> Result<()> {
		let worker = ReceiverWorker { rx };
		tokio::spawn(async move { worker.start_worker().await });
		Ok(())
	}

	async fn start_worker(&self) -> Result<()> {
		while let Ok(record) = self.rx.recv().await {
			info!(target: "bind", "{record}");
		}
		Ok(())
	}
}
