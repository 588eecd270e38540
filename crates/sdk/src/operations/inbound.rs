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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{next_token_of, put_address, result_of};
use crate::request::{SignedOperation, format_timestamp};
use crate::signing::{EncodingError, QueryParams};
use crate::types::{Address, ListedItem, Page, PlanItem, PlanProduct, PlanResult, ShipmentResult};
use crate::xml::{Element, ParseError};

/// Propose how a set of items should be split into shipments
#[derive(Debug, Clone)]
pub struct CreateInboundShipmentPlan {
	pub ship_from: Address,
	pub items: Vec<PlanItem>,
}

impl CreateInboundShipmentPlan {
	pub fn new(ship_from: Address, items: Vec<PlanItem>) -> Self {
		Self { ship_from, items }
	}
}

impl SignedOperation for CreateInboundShipmentPlan {
	type Output = Vec<PlanResult>;
	const ACTION: &'static str = "CreateInboundShipmentPlan";

	fn build_params(&self, params: &mut QueryParams) -> Result<(), EncodingError> {
		put_address(params, "ShipFromAddress", &self.ship_from)?;
		for (index, item) in self.items.iter().enumerate() {
			let prefix = format!("InboundShipmentPlanRequestItems.member.{}", index + 1);
			params.insert(format!("{prefix}.SellerSKU"), &item.seller_sku)?;
			params.insert(format!("{prefix}.Quantity"), item.quantity)?;
			params.insert(format!("{prefix}.ASIN"), &item.asin)?;
			params.insert(format!("{prefix}.Condition"), item.condition)?;
		}
		Ok(())
	}

	fn parse_response(&self, root: Element<'_, '_>) -> Result<Vec<PlanResult>, ParseError> {
		let result = result_of::<Self>(root)?;
		let plans = result.child("InboundShipmentPlans")?;
		plans.members().map(parse_plan).collect()
	}
}

fn parse_plan(plan: Element<'_, '_>) -> Result<PlanResult, ParseError> {
	let items = plan.child("Items")?;
	let products = items
		.members()
		.map(|product| {
			Ok(PlanProduct {
				seller_sku: product.text_of("SellerSKU")?,
				quantity: product.value_of("Quantity")?,
				network_sku: product.text_of("FulfillmentNetworkSKU")?,
			})
		})
		.collect::<Result<Vec<_>, ParseError>>()?;

	Ok(PlanResult {
		shipment_id: plan.text_of("ShipmentId")?,
		destination_center_id: plan.text_of("DestinationFulfillmentCenterId")?,
		products,
	})
}

/// Status a new shipment is created in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
	#[default]
	Working,
	Shipped,
	Cancelled,
}

impl ShipmentStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			ShipmentStatus::Working => "WORKING",
			ShipmentStatus::Shipped => "SHIPPED",
			ShipmentStatus::Cancelled => "CANCELLED",
		}
	}
}

/// Who labels the units of a shipment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabelPrepPreference {
	#[default]
	SellerLabel,
	AmazonLabelOnly,
	AmazonLabelPreferred,
}

impl LabelPrepPreference {
	pub fn as_str(&self) -> &'static str {
		match self {
			LabelPrepPreference::SellerLabel => "SELLER_LABEL",
			LabelPrepPreference::AmazonLabelOnly => "AMAZON_LABEL_ONLY",
			LabelPrepPreference::AmazonLabelPreferred => "AMAZON_LABEL_PREFERRED",
		}
	}
}

/// Create one shipment from one plan result
#[derive(Debug, Clone)]
pub struct CreateInboundShipment {
	pub shipment_id: String,
	pub shipment_name: String,
	pub ship_from: Address,
	pub destination_center_id: String,
	pub status: ShipmentStatus,
	pub label_prep: LabelPrepPreference,
	pub products: Vec<PlanProduct>,
}

impl CreateInboundShipment {
	/// Shipment carrying exactly the plan's destination and products
	///
	/// The shipment name is the creation time.
	pub fn from_plan(plan: &PlanResult, ship_from: Address) -> Self {
		Self {
			shipment_id: plan.shipment_id.clone(),
			shipment_name: Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
			ship_from,
			destination_center_id: plan.destination_center_id.clone(),
			status: ShipmentStatus::default(),
			label_prep: LabelPrepPreference::default(),
			products: plan.products.clone(),
		}
	}

	pub fn with_status(mut self, status: ShipmentStatus) -> Self {
		self.status = status;
		self
	}

	pub fn with_label_prep(mut self, label_prep: LabelPrepPreference) -> Self {
		self.label_prep = label_prep;
		self
	}
}

impl SignedOperation for CreateInboundShipment {
	type Output = ShipmentResult;
	const ACTION: &'static str = "CreateInboundShipment";

	fn build_params(&self, params: &mut QueryParams) -> Result<(), EncodingError> {
		params.insert("ShipmentId", &self.shipment_id)?;
		params.insert("InboundShipmentHeader.ShipmentName", &self.shipment_name)?;
		put_address(params, "InboundShipmentHeader.ShipFromAddress", &self.ship_from)?;
		params.insert(
			"InboundShipmentHeader.DestinationFulfillmentCenterId",
			&self.destination_center_id,
		)?;
		params.insert("InboundShipmentHeader.ShipmentStatus", self.status.as_str())?;
		params.insert(
			"InboundShipmentHeader.LabelPrepPreference",
			self.label_prep.as_str(),
		)?;
		for (index, product) in self.products.iter().enumerate() {
			let prefix = format!("InboundShipmentItems.member.{}", index + 1);
			params.insert(format!("{prefix}.SellerSKU"), &product.seller_sku)?;
			params.insert(format!("{prefix}.QuantityShipped"), product.quantity)?;
			params.insert(
				format!("{prefix}.FulfillmentNetworkSKU"),
				&product.network_sku,
			)?;
		}
		Ok(())
	}

	fn parse_response(&self, root: Element<'_, '_>) -> Result<ShipmentResult, ParseError> {
		let result = result_of::<Self>(root)?;
		Ok(ShipmentResult {
			shipment_id: result.text_of("ShipmentId")?,
			products: None,
		})
	}
}

/// Which items to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemFilter {
	/// Every item of one shipment
	Shipment(String),
	/// Items updated inside a time window, across shipments
	UpdatedBetween {
		after: DateTime<Utc>,
		before: DateTime<Utc>,
	},
}

/// First page of an item listing
#[derive(Debug, Clone)]
pub struct ListInboundShipmentItems {
	pub filter: ItemFilter,
}

impl ListInboundShipmentItems {
	pub fn for_shipment(shipment_id: impl Into<String>) -> Self {
		Self {
			filter: ItemFilter::Shipment(shipment_id.into()),
		}
	}
}

impl SignedOperation for ListInboundShipmentItems {
	type Output = Page<ListedItem>;
	const ACTION: &'static str = "ListInboundShipmentItems";

	fn build_params(&self, params: &mut QueryParams) -> Result<(), EncodingError> {
		match &self.filter {
			ItemFilter::Shipment(shipment_id) => params.insert("ShipmentId", shipment_id),
			ItemFilter::UpdatedBetween { after, before } => {
				params.insert("LastUpdatedAfter", format_timestamp(after))?;
				params.insert("LastUpdatedBefore", format_timestamp(before))
			}
		}
	}

	fn parse_response(&self, root: Element<'_, '_>) -> Result<Page<ListedItem>, ParseError> {
		parse_item_page(result_of::<Self>(root)?)
	}
}

/// Follow-up page of an item listing
#[derive(Debug, Clone)]
pub struct ListInboundShipmentItemsByNextToken {
	pub next_token: String,
}

impl ListInboundShipmentItemsByNextToken {
	pub fn new(next_token: impl Into<String>) -> Self {
		Self {
			next_token: next_token.into(),
		}
	}
}

impl SignedOperation for ListInboundShipmentItemsByNextToken {
	type Output = Page<ListedItem>;
	const ACTION: &'static str = "ListInboundShipmentItemsByNextToken";

	fn build_params(&self, params: &mut QueryParams) -> Result<(), EncodingError> {
		params.insert("NextToken", &self.next_token)
	}

	fn parse_response(&self, root: Element<'_, '_>) -> Result<Page<ListedItem>, ParseError> {
		parse_item_page(result_of::<Self>(root)?)
	}
}

fn parse_item_page(result: Element<'_, '_>) -> Result<Page<ListedItem>, ParseError> {
	let data = result.child("ItemData")?;
	let items = data
		.members()
		.map(|item| {
			Ok(ListedItem {
				shipment_id: item.text_of("ShipmentId")?,
				seller_sku: item.text_of("SellerSKU")?,
				quantity_shipped: item.value_of("QuantityShipped")?,
				quantity_received: item.value_of("QuantityReceived")?,
			})
		})
		.collect::<Result<Vec<_>, ParseError>>()?;

	Ok(Page {
		items,
		next_token: next_token_of(result),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::Condition;
	use crate::xml::with_root;

	const NS: &str = "http://mws.amazonaws.com/FulfillmentInboundShipment/2010-10-01/";

	fn address() -> Address {
		Address {
			name: "A Co".to_string(),
			address_line1: "1 Main St".to_string(),
			city: "Seattle".to_string(),
			state_or_province_code: "WA".to_string(),
			postal_code: "98101".to_string(),
			country_code: "US".to_string(),
		}
	}

	fn params_of(operation: &impl SignedOperation) -> QueryParams {
		let mut params = QueryParams::new();
		operation.build_params(&mut params).unwrap();
		params
	}

	#[test]
	fn test_plan_params_are_numbered_from_one() {
		let operation = CreateInboundShipmentPlan::new(
			address(),
			vec![
				PlanItem {
					seller_sku: "X1".to_string(),
					quantity: 3,
					asin: "B000".to_string(),
					condition: Condition::NewItem,
				},
				PlanItem {
					seller_sku: "X2".to_string(),
					quantity: 1,
					asin: "B001".to_string(),
					condition: Condition::UsedGood,
				},
			],
		);
		let params = params_of(&operation);

		assert_eq!(params.get("ShipFromAddress.Name"), Some("A Co"));
		assert_eq!(params.get("ShipFromAddress.CountryCode"), Some("US"));
		assert_eq!(
			params.get("InboundShipmentPlanRequestItems.member.1.SellerSKU"),
			Some("X1")
		);
		assert_eq!(
			params.get("InboundShipmentPlanRequestItems.member.1.Quantity"),
			Some("3")
		);
		assert_eq!(
			params.get("InboundShipmentPlanRequestItems.member.2.Condition"),
			Some("UsedGood")
		);
		assert!(!params.contains("InboundShipmentPlanRequestItems.member.0.SellerSKU"));
	}

	#[test]
	fn test_parse_plans_keeps_member_order() {
		let body = format!(
			r#"<CreateInboundShipmentPlanResponse xmlns="{NS}">
				<CreateInboundShipmentPlanResult>
					<InboundShipmentPlans>
						<member>
							<ShipmentId>FBA1</ShipmentId>
							<DestinationFulfillmentCenterId>CTR1</DestinationFulfillmentCenterId>
							<Items>
								<member><SellerSKU>X2</SellerSKU><Quantity>1</Quantity><FulfillmentNetworkSKU>N2</FulfillmentNetworkSKU></member>
								<member><SellerSKU>X1</SellerSKU><Quantity>3</Quantity><FulfillmentNetworkSKU>N1</FulfillmentNetworkSKU></member>
							</Items>
						</member>
						<member>
							<ShipmentId>FBA2</ShipmentId>
							<DestinationFulfillmentCenterId>CTR2</DestinationFulfillmentCenterId>
							<Items/>
						</member>
					</InboundShipmentPlans>
				</CreateInboundShipmentPlanResult>
			</CreateInboundShipmentPlanResponse>"#
		);
		let operation = CreateInboundShipmentPlan::new(address(), Vec::new());
		let plans = with_root(&body, NS, |root| operation.parse_response(root)).unwrap();

		assert_eq!(plans.len(), 2);
		assert_eq!(plans[0].shipment_id, "FBA1");
		assert_eq!(plans[0].products[0].seller_sku, "X2");
		assert_eq!(plans[0].products[1].network_sku, "N1");
		assert_eq!(plans[1].destination_center_id, "CTR2");
		assert!(plans[1].products.is_empty());
	}

	#[test]
	fn test_create_shipment_carries_only_its_plan() {
		let plan = PlanResult {
			shipment_id: "FBA1".to_string(),
			destination_center_id: "CTR1".to_string(),
			products: vec![PlanProduct {
				seller_sku: "X1".to_string(),
				quantity: 3,
				network_sku: "N1".to_string(),
			}],
		};
		let operation = CreateInboundShipment::from_plan(&plan, address())
			.with_label_prep(LabelPrepPreference::AmazonLabelOnly);
		let params = params_of(&operation);

		assert_eq!(params.get("ShipmentId"), Some("FBA1"));
		assert_eq!(
			params.get("InboundShipmentHeader.DestinationFulfillmentCenterId"),
			Some("CTR1")
		);
		assert_eq!(params.get("InboundShipmentHeader.ShipmentStatus"), Some("WORKING"));
		assert_eq!(
			params.get("InboundShipmentHeader.LabelPrepPreference"),
			Some("AMAZON_LABEL_ONLY")
		);
		assert_eq!(
			params.get("InboundShipmentHeader.ShipFromAddress.City"),
			Some("Seattle")
		);
		assert_eq!(
			params.get("InboundShipmentItems.member.1.QuantityShipped"),
			Some("3")
		);
		assert!(!params.contains("InboundShipmentItems.member.2.SellerSKU"));
		assert!(params.contains("InboundShipmentHeader.ShipmentName"));
	}

	#[test]
	fn test_create_shipment_requires_shipment_id() {
		let body = format!(
			r#"<CreateInboundShipmentResponse xmlns="{NS}">
				<CreateInboundShipmentResult/>
			</CreateInboundShipmentResponse>"#
		);
		let plan = PlanResult {
			shipment_id: "FBA1".to_string(),
			destination_center_id: "CTR1".to_string(),
			products: Vec::new(),
		};
		let operation = CreateInboundShipment::from_plan(&plan, address());
		let result = with_root(&body, NS, |root| operation.parse_response(root));

		assert!(matches!(result, Err(ParseError::MissingElement { .. })));
	}

	#[test]
	fn test_item_page_without_token_is_last() {
		let body = format!(
			r#"<ListInboundShipmentItemsResponse xmlns="{NS}">
				<ListInboundShipmentItemsResult>
					<ItemData>
						<member>
							<ShipmentId>FBA1</ShipmentId>
							<SellerSKU>X1</SellerSKU>
							<QuantityShipped>3</QuantityShipped>
							<QuantityReceived>2</QuantityReceived>
						</member>
					</ItemData>
				</ListInboundShipmentItemsResult>
			</ListInboundShipmentItemsResponse>"#
		);
		let operation = ListInboundShipmentItems::for_shipment("FBA1");
		let page = with_root(&body, NS, |root| operation.parse_response(root)).unwrap();

		assert_eq!(page.next_token, None);
		assert_eq!(page.items.len(), 1);
		assert_eq!(page.items[0].quantity_received, 2);
	}

	#[test]
	fn test_item_page_rejects_non_numeric_quantity() {
		let body = format!(
			r#"<ListInboundShipmentItemsByNextTokenResponse xmlns="{NS}">
				<ListInboundShipmentItemsByNextTokenResult>
					<NextToken>T2</NextToken>
					<ItemData>
						<member>
							<ShipmentId>FBA1</ShipmentId>
							<SellerSKU>X1</SellerSKU>
							<QuantityShipped>three</QuantityShipped>
							<QuantityReceived>0</QuantityReceived>
						</member>
					</ItemData>
				</ListInboundShipmentItemsByNextTokenResult>
			</ListInboundShipmentItemsByNextTokenResponse>"#
		);
		let operation = ListInboundShipmentItemsByNextToken::new("T1");
		let result = with_root(&body, NS, |root| operation.parse_response(root));

		assert_eq!(
			result,
			Err(ParseError::InvalidValue {
				tag: "QuantityShipped".to_string(),
				value: "three".to_string(),
			})
		);
	}

	#[test]
	fn test_updated_window_params() {
		use chrono::TimeZone;

		let operation = ListInboundShipmentItems {
			filter: ItemFilter::UpdatedBetween {
				after: Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap(),
				before: Utc.with_ymd_and_hms(2018, 1, 2, 12, 30, 0).unwrap(),
			},
		};
		let params = params_of(&operation);

		assert_eq!(params.get("LastUpdatedAfter"), Some("2018-01-01T00:00:00Z"));
		assert_eq!(params.get("LastUpdatedBefore"), Some("2018-01-02T12:30:00Z"));
		assert!(!params.contains("ShipmentId"));
	}
}
