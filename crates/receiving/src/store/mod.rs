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

mod memory;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryRecordStore;

/// Error types for record store operations
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("Record not found: {0}")]
	NotFound(String),
	#[error("Duplicate record: {0}")]
	Duplicate(String),
	#[error("Record store unavailable: {0}")]
	Unavailable(String),
}

/// Local record tracking how much of one SKU a shipment has received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentRecord {
	pub id: String,
	pub seller_sku: String,
	pub shipment_id: String,
	/// Quantity sent in the shipment
	pub quantity: u32,
	/// Quantity the remote side reports as received, once fetched
	#[serde(default)]
	pub received: Option<u32>,
	/// Set once `received` reaches `quantity`
	#[serde(default)]
	pub matched: bool,
}

impl ShipmentRecord {
	pub fn new(
		id: impl Into<String>,
		seller_sku: impl Into<String>,
		shipment_id: impl Into<String>,
		quantity: u32,
	) -> Self {
		Self {
			id: id.into(),
			seller_sku: seller_sku.into(),
			shipment_id: shipment_id.into(),
			quantity,
			received: None,
			matched: false,
		}
	}
}

/// Record store trait - source of shipment records and unit of commit
///
/// Every writer opens its own [`StoreTransaction`]. Transactions are never
/// shared between threads; writes become visible only on commit.
pub trait RecordStore: Send + Sync {
	/// Open a transaction
	fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError>;

	/// Committed state of one record
	fn get(&self, id: &str) -> Result<ShipmentRecord, StoreError>;

	/// Records not matched yet, in id order
	fn unmatched(&self) -> Result<Vec<ShipmentRecord>, StoreError>;
}

/// Isolated set of staged writes
///
/// Dropping a transaction without committing discards its writes.
pub trait StoreTransaction {
	/// Record as seen by this transaction (staged writes first)
	fn load(&self, id: &str) -> Result<ShipmentRecord, StoreError>;

	/// Stage the received quantity and matched flag of a record
	fn record_receipt(&mut self, id: &str, received: u32, matched: bool) -> Result<(), StoreError>;

	/// Apply every staged write
	fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
