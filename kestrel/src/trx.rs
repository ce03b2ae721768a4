use flume::{Receiver, Sender};

use crate::{event::BindRecord, Result};

#[derive(Clone)]
pub struct EventTx {
	tx: Sender<BindRecord>,
}

impl EventTx {
	pub async fn send(&self, item: BindRecord) -> Result<()> {
		self.tx.send_async(item).await?;
		Ok(())
	}
}

pub struct EventRx {
	rx: Receiver<BindRecord>,
}

impl EventRx {
	pub async fn recv(&self) -> Result<BindRecord> {
		let res = self.rx.recv_async().await?;
		Ok(res)
	}
}

pub fn new_trx_pair() -> (EventTx, EventRx) {
	let (tx, rx) = flume::unbounded::<BindRecord>();

	(EventTx { tx }, EventRx { rx })
}
