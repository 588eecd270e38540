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

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account credentials used to sign every request
///
/// Credentials are plain configuration: the SDK never loads, caches or
/// rotates them. A client receives one immutable value at construction.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	/// Access key id sent as `AWSAccessKeyId`
	pub access_key_id: String,
	/// Shared secret used as the HMAC key (never sent, never logged)
	pub secret_key: String,
	/// Seller / merchant account id
	pub seller_id: String,
}

impl Credentials {
	pub fn new(
		access_key_id: impl Into<String>,
		secret_key: impl Into<String>,
		seller_id: impl Into<String>,
	) -> Self {
		Self {
			access_key_id: access_key_id.into(),
			secret_key: secret_key.into(),
			seller_id: seller_id.into(),
		}
	}
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credentials")
			.field("access_key_id", &self.access_key_id)
			.field("secret_key", &"<redacted>")
			.field("seller_id", &self.seller_id)
			.finish()
	}
}

/// Postal address used as the ship-from address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
	pub name: String,
	pub address_line1: String,
	pub city: String,
	/// State or province code (e.g., "DE")
	pub state_or_province_code: String,
	pub postal_code: String,
	/// ISO country code (e.g., "US")
	pub country_code: String,
}

/// Item condition as understood by the remote catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
	NewItem,
	NewWithWarranty,
	NewOEM,
	NewOpenBox,
	UsedLikeNew,
	UsedVeryGood,
	UsedGood,
	UsedAcceptable,
	Refurbished,
}

impl Condition {
	pub fn as_str(&self) -> &'static str {
		match self {
			Condition::NewItem => "NewItem",
			Condition::NewWithWarranty => "NewWithWarranty",
			Condition::NewOEM => "NewOEM",
			Condition::NewOpenBox => "NewOpenBox",
			Condition::UsedLikeNew => "UsedLikeNew",
			Condition::UsedVeryGood => "UsedVeryGood",
			Condition::UsedGood => "UsedGood",
			Condition::UsedAcceptable => "UsedAcceptable",
			Condition::Refurbished => "Refurbished",
		}
	}
}

impl fmt::Display for Condition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One line of a shipment plan request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
	pub seller_sku: String,
	pub quantity: u32,
	/// Catalog identifier (ASIN)
	pub asin: String,
	pub condition: Condition,
}

/// Product line inside a plan returned by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanProduct {
	pub seller_sku: String,
	pub quantity: u32,
	/// Fulfillment network SKU assigned by the remote service
	pub network_sku: String,
}

/// One shipment proposed by the remote service
///
/// The service may split the requested items across several destinations,
/// so one plan request can yield any number of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResult {
	pub shipment_id: String,
	pub destination_center_id: String,
	/// Products in document order
	pub products: Vec<PlanProduct>,
}

/// Confirmation of a created shipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentResult {
	pub shipment_id: String,
	/// Plan products the shipment was created from (set by the workflow)
	pub products: Option<Vec<PlanProduct>>,
}

/// Item row of an inbound shipment listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedItem {
	pub shipment_id: String,
	pub seller_sku: String,
	pub quantity_shipped: u32,
	pub quantity_received: u32,
}

/// Entry of the report listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportInfo {
	pub report_id: String,
	pub report_type: String,
	pub report_request_id: String,
	pub available_date: DateTime<Utc>,
	pub acknowledged: bool,
}

/// One page of a list-style response
///
/// A present token means more pages remain; it is the only termination signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
	pub items: Vec<T>,
	pub next_token: Option<String>,
}

impl<T> Page<T> {
	pub fn last(items: Vec<T>) -> Self {
		Self {
			items,
			next_token: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_credentials_debug_hides_secret() {
		let credentials = Credentials::new("AKID", "very-secret", "M1");
		let printed = format!("{:?}", credentials);

		assert!(printed.contains("AKID"));
		assert!(!printed.contains("very-secret"));
	}

	#[test]
	fn test_plan_item_from_json() {
		let items: Vec<PlanItem> = serde_json::from_str(
			r#"[{"seller_sku":"X1","quantity":3,"asin":"B000","condition":"NewItem"}]"#,
		)
		.unwrap();

		assert_eq!(items[0].quantity, 3);
		assert_eq!(items[0].condition, Condition::NewItem);
		assert_eq!(items[0].condition.to_string(), "NewItem");
	}

	#[test]
	fn test_last_page_has_no_token() {
		let page = Page::last(vec![1, 2]);
		assert_eq!(page.next_token, None);
		assert_eq!(page.items, vec![1, 2]);
	}
}
