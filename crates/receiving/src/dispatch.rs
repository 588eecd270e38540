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

//! Fetch dispatch: per-record guard plus bounded job queue
//!
//! A record enters the queue at most once at a time. The in-flight mark is
//! owned by the queued [`FetchJob`] and is released whenever that job is
//! dropped: after processing, when the queue rejects it, or when the queue
//! itself goes away.

use std::{sync::Arc, time::Duration};

use crossbeam::channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use dashmap::DashSet;
use thiserror::Error;
use tracing::debug;

use crate::store::ShipmentRecord;

/// Errors that can occur when dispatching a fetch
#[derive(Debug, Error)]
pub enum DispatchError {
	#[error("Fetch queue is full, record {0} not dispatched")]
	QueueFull(String),
	#[error("Fetch queue disconnected")]
	Disconnected,
}

/// Result of a dispatch attempt that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
	Enqueued,
	AlreadyMatched,
	InFlight,
}

/// Marks one record as having a fetch in flight until dropped
#[derive(Debug)]
pub struct InFlightGuard {
	in_flight: Arc<DashSet<String>>,
	record_id: String,
}

impl Drop for InFlightGuard {
	fn drop(&mut self) {
		self.in_flight.remove(&self.record_id);
	}
}

/// One queued receipt fetch
#[derive(Debug)]
pub struct FetchJob {
	pub record_id: String,
	pub shipment_id: String,
	pub seller_sku: String,
	_guard: InFlightGuard,
}

/// Producer side: applies the guard and enqueues jobs
///
/// This can be cloned and shared across threads; clones share the guard.
#[derive(Clone)]
pub struct FetchDispatcher {
	sender: Sender<FetchJob>,
	in_flight: Arc<DashSet<String>>,
}

/// Consumer side, owned by the receipt worker
pub struct JobReceiver {
	receiver: Receiver<FetchJob>,
}

/// Create a dispatcher and its job receiver around a bounded queue
pub fn fetch_queue(capacity: usize) -> (FetchDispatcher, JobReceiver) {
	let (sender, receiver) = bounded(capacity);
	(
		FetchDispatcher {
			sender,
			in_flight: Arc::new(DashSet::new()),
		},
		JobReceiver { receiver },
	)
}

impl FetchDispatcher {
	/// Queue a receipt fetch for `record` unless one is pointless or pending
	pub fn request(&self, record: &ShipmentRecord) -> Result<DispatchOutcome, DispatchError> {
		if record.matched {
			return Ok(DispatchOutcome::AlreadyMatched);
		}
		if !self.in_flight.insert(record.id.clone()) {
			debug!(target: "dispatch", record_id = %record.id, "Fetch already in flight");
			return Ok(DispatchOutcome::InFlight);
		}

		let job = FetchJob {
			record_id: record.id.clone(),
			shipment_id: record.shipment_id.clone(),
			seller_sku: record.seller_sku.clone(),
			_guard: InFlightGuard {
				in_flight: self.in_flight.clone(),
				record_id: record.id.clone(),
			},
		};

		match self.sender.try_send(job) {
			Ok(()) => {
				debug!(target: "dispatch", record_id = %record.id, "Fetch enqueued");
				Ok(DispatchOutcome::Enqueued)
			}
			Err(TrySendError::Full(_)) => Err(DispatchError::QueueFull(record.id.clone())),
			Err(TrySendError::Disconnected(_)) => Err(DispatchError::Disconnected),
		}
	}

	/// Whether a fetch for `record_id` is queued or running
	pub fn is_in_flight(&self, record_id: &str) -> bool {
		self.in_flight.contains(record_id)
	}

	pub fn in_flight_count(&self) -> usize {
		self.in_flight.len()
	}
}

impl JobReceiver {
	/// Receive the next job, blocking
	pub fn recv(&self) -> Result<FetchJob, DispatchError> {
		self.receiver.recv().map_err(|_| DispatchError::Disconnected)
	}

	/// Receive the next job, waiting at most `timeout`
	///
	/// Returns `Ok(None)` when nothing arrived in time.
	pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<FetchJob>, DispatchError> {
		match self.receiver.recv_timeout(timeout) {
			Ok(job) => Ok(Some(job)),
			Err(RecvTimeoutError::Timeout) => Ok(None),
			Err(RecvTimeoutError::Disconnected) => Err(DispatchError::Disconnected),
		}
	}
}
