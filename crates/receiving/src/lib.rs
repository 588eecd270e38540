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

//! Inbound Receiving - record-facing side of the inbound SDK
//!
//! This crate keeps local shipment records in step with what the remote
//! service reports as received:
//! - Fetch dispatcher (per-record guard + bounded queue)
//! - Receipt worker (own thread, own transaction per job)
//! - Record store abstraction with an in-memory implementation
//! - Configuration and logging for the `inbound` binary

pub mod config;
pub mod dispatch;
pub mod logging;
pub mod store;
pub mod worker;

pub use config::InboundConfig;
pub use dispatch::{DispatchError, DispatchOutcome, FetchDispatcher, FetchJob, JobReceiver, fetch_queue};
pub use store::{MemoryRecordStore, RecordStore, ShipmentRecord, StoreError, StoreTransaction};
pub use worker::{ItemSource, Receipt, ReceiptError, ReceiptWorker, ReceiptWorkerConfig, process_job};
