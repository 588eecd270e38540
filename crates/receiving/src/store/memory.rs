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

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use super::{RecordStore, ShipmentRecord, StoreError, StoreTransaction};

/// In-memory record store
///
/// Records live in a map behind one mutex. Transactions stage their writes
/// locally and take the lock only to read committed state and to commit.
#[derive(Default)]
pub struct MemoryRecordStore {
	records: Mutex<BTreeMap<String, ShipmentRecord>>,
}

impl MemoryRecordStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Store seeded with `records`; duplicate ids are rejected
	pub fn with_records(
		records: impl IntoIterator<Item = ShipmentRecord>,
	) -> Result<Self, StoreError> {
		let store = Self::new();
		for record in records {
			store.insert(record)?;
		}
		Ok(store)
	}

	pub fn insert(&self, record: ShipmentRecord) -> Result<(), StoreError> {
		let mut records = self.lock()?;
		if records.contains_key(&record.id) {
			return Err(StoreError::Duplicate(record.id));
		}
		records.insert(record.id.clone(), record);
		Ok(())
	}

	/// Every committed record, in id order
	pub fn snapshot(&self) -> Result<Vec<ShipmentRecord>, StoreError> {
		Ok(self.lock()?.values().cloned().collect())
	}

	pub fn len(&self) -> usize {
		self.records.lock().map(|r| r.len()).unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, ShipmentRecord>>, StoreError> {
		self.records
			.lock()
			.map_err(|_| StoreError::Unavailable("record store lock poisoned".to_string()))
	}
}

impl RecordStore for MemoryRecordStore {
	fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError> {
		Ok(Box::new(MemoryTransaction {
			store: self,
			staged: HashMap::new(),
		}))
	}

	fn get(&self, id: &str) -> Result<ShipmentRecord, StoreError> {
		self.lock()?
			.get(id)
			.cloned()
			.ok_or_else(|| StoreError::NotFound(id.to_string()))
	}

	fn unmatched(&self) -> Result<Vec<ShipmentRecord>, StoreError> {
		Ok(self
			.lock()?
			.values()
			.filter(|r| !r.matched)
			.cloned()
			.collect())
	}
}

struct MemoryTransaction<'a> {
	store: &'a MemoryRecordStore,
	staged: HashMap<String, ShipmentRecord>,
}

impl StoreTransaction for MemoryTransaction<'_> {
	fn load(&self, id: &str) -> Result<ShipmentRecord, StoreError> {
		match self.staged.get(id) {
			Some(record) => Ok(record.clone()),
			None => self.store.get(id),
		}
	}

	fn record_receipt(&mut self, id: &str, received: u32, matched: bool) -> Result<(), StoreError> {
		let mut record = self.load(id)?;
		record.received = Some(received);
		record.matched = matched;
		self.staged.insert(id.to_string(), record);
		Ok(())
	}

	fn commit(self: Box<Self>) -> Result<(), StoreError> {
		let MemoryTransaction { store, staged } = *self;
		let mut records = store.lock()?;
		if let Some(id) = staged.keys().find(|id| !records.contains_key(*id)) {
			return Err(StoreError::NotFound(id.clone()));
		}
		records.extend(staged);
		Ok(())
	}
}
