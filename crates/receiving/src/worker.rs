// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
	io,
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	thread::{self, JoinHandle},
	time::Duration,
};

use inbound_sdk::{ClientError, ItemFilter, ListedItem, Listing, SyncClient, Transport};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::dispatch::{DispatchError, FetchJob, JobReceiver};
use crate::store::{RecordStore, StoreError};

/// Error types for one receipt fetch
#[derive(Debug, Error)]
pub enum ReceiptError {
	#[error("Store error: {0}")]
	Store(#[from] StoreError),
	#[error("Item listing failed: {0}")]
	Listing(#[from] ClientError),
	#[error("SKU {seller_sku} not listed in shipment {shipment_id}")]
	SkuNotListed {
		shipment_id: String,
		seller_sku: String,
	},
}

/// Where shipment item listings come from
pub trait ItemSource: Send {
	fn list_items(&self, shipment_id: &str) -> Result<Listing<ListedItem>, ClientError>;
}

impl<T: Transport> ItemSource for SyncClient<T> {
	fn list_items(&self, shipment_id: &str) -> Result<Listing<ListedItem>, ClientError> {
		self.list_shipment_items(ItemFilter::Shipment(shipment_id.to_string()))
	}
}

/// Receipt written for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
	pub record_id: String,
	pub received: u32,
	pub matched: bool,
}

/// Configuration for the receipt worker
#[derive(Debug, Clone)]
pub struct ReceiptWorkerConfig {
	/// How long one wait for a job may block before the shutdown flag is checked
	pub poll_interval_ms: u64,
}

impl Default for ReceiptWorkerConfig {
	fn default() -> Self {
		Self {
			poll_interval_ms: 100,
		}
	}
}

/// Receipt Worker - fetches received quantities for queued records
///
/// The worker runs on its own thread and handles one job at a time. Each
/// job gets a fresh transaction from the store: the record is reloaded,
/// the shipment's items are listed, the row for the record's SKU is
/// written and the transaction is committed. On any failure the
/// transaction is dropped and the record keeps its previous state.
pub struct ReceiptWorker {
	thread_handle: Option<JoinHandle<()>>,
	shutdown: Arc<AtomicBool>,
}

impl ReceiptWorker {
	/// Start the worker thread
	pub fn start<S>(
		receiver: JobReceiver,
		store: Arc<dyn RecordStore>,
		source: S,
		config: ReceiptWorkerConfig,
	) -> io::Result<Self>
	where
		S: ItemSource + 'static,
	{
		let shutdown = Arc::new(AtomicBool::new(false));
		let shutdown_clone = shutdown.clone();

		let thread_handle = thread::Builder::new()
			.name("receipt-worker".to_string())
			.spawn(move || {
				info!(target: "receipt_worker", "Receipt worker started");
				Self::run_loop(&receiver, store.as_ref(), &source, &config, &shutdown_clone);
				info!(target: "receipt_worker", "Receipt worker stopped");
			})?;

		Ok(Self {
			thread_handle: Some(thread_handle),
			shutdown,
		})
	}

	fn run_loop(
		receiver: &JobReceiver,
		store: &dyn RecordStore,
		source: &dyn ItemSource,
		config: &ReceiptWorkerConfig,
		shutdown: &AtomicBool,
	) {
		let poll = Duration::from_millis(config.poll_interval_ms);

		while !shutdown.load(Ordering::Relaxed) {
			let job = match receiver.recv_timeout(poll) {
				Ok(Some(job)) => job,
				Ok(None) => continue,
				Err(DispatchError::Disconnected) => {
					debug!(target: "receipt_worker", "Fetch queue closed");
					break;
				}
				Err(e) => {
					error!(target: "receipt_worker", error = %e, "Failed to receive job");
					break;
				}
			};

			let record_id = job.record_id.clone();
			match process_job(store, source, job) {
				Ok(receipt) => info!(
					target: "receipt_worker",
					record_id = %receipt.record_id,
					received = receipt.received,
					matched = receipt.matched,
					"Receipt committed"
				),
				Err(e) => warn!(
					target: "receipt_worker",
					record_id = %record_id,
					error = %e,
					"Receipt fetch failed, record left unchanged"
				),
			}
		}
	}

	/// Wait until every dispatcher is gone and the queue is drained
	pub fn join(mut self) {
		if let Some(handle) = self.thread_handle.take()
			&& handle.join().is_err()
		{
			warn!(target: "receipt_worker", "Receipt worker thread panicked");
		}
	}

	/// Stop after the current job and wait for the thread
	pub fn shutdown(mut self) {
		info!(target: "receipt_worker", "Shutting down receipt worker");
		self.stop();
	}

	fn stop(&mut self) {
		self.shutdown.store(true, Ordering::Relaxed);
		if let Some(handle) = self.thread_handle.take()
			&& handle.join().is_err()
		{
			warn!(target: "receipt_worker", "Receipt worker thread panicked");
		}
	}
}

impl Drop for ReceiptWorker {
	fn drop(&mut self) {
		self.stop();
	}
}

/// Fetch and store the receipt of one job in its own transaction
///
/// The job, and with it the record's in-flight mark, is released when this
/// returns.
pub fn process_job(
	store: &dyn RecordStore,
	source: &dyn ItemSource,
	job: FetchJob,
) -> Result<Receipt, ReceiptError> {
	let mut tx = store.begin()?;
	let record = tx.load(&job.record_id)?;
	if record.matched {
		return Ok(Receipt {
			record_id: record.id,
			received: record.received.unwrap_or_default(),
			matched: true,
		});
	}

	let listing = source.list_items(&record.shipment_id)?;
	if let Some(cause) = listing.truncation() {
		warn!(
			target: "receipt_worker",
			record_id = %record.id,
			shipment_id = %record.shipment_id,
			cause = %cause,
			"Item listing truncated, using rows fetched so far"
		);
	}

	let row = listing
		.items
		.iter()
		.find(|item| item.seller_sku == record.seller_sku)
		.ok_or_else(|| ReceiptError::SkuNotListed {
			shipment_id: record.shipment_id.clone(),
			seller_sku: record.seller_sku.clone(),
		})?;

	let received = row.quantity_received;
	let matched = received >= record.quantity;
	tx.record_receipt(&record.id, received, matched)?;
	tx.commit()?;

	Ok(Receipt {
		record_id: record.id,
		received,
		matched,
	})
}
