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

//! End-to-end tests for the inbound SDK over a scripted transport

use inbound_sdk::signing::decode_query;
use inbound_sdk::{
	Address, Client, ClientConfig, Condition, Credentials, FailurePolicy, ItemFilter, PlanItem,
	PlanProduct, ScriptedTransport, ShipmentWorkflow, SyncClient,
};

const NS: &str = "http://mws.amazonaws.com/FulfillmentInboundShipment/2010-10-01/";

fn origin() -> Address {
	Address {
		name: "A Co".to_string(),
		address_line1: "500 Pine St".to_string(),
		city: "Seattle".to_string(),
		state_or_province_code: "WA".to_string(),
		postal_code: "98101".to_string(),
		country_code: "US".to_string(),
	}
}

fn client(transport: &ScriptedTransport) -> Client<ScriptedTransport> {
	Client::with_transport(
		Credentials::new("K", "S", "M1"),
		ClientConfig::default(),
		transport.clone(),
	)
}

#[tokio::test]
async fn test_plan_then_create_single_shipment() {
	let transport = ScriptedTransport::new();
	transport
		.respond(
			200,
			format!(
				r#"<?xml version="1.0"?>
				<CreateInboundShipmentPlanResponse xmlns="{NS}">
					<CreateInboundShipmentPlanResult>
						<InboundShipmentPlans>
							<member>
								<DestinationFulfillmentCenterId>CTR1</DestinationFulfillmentCenterId>
								<ShipmentId>FBA1</ShipmentId>
								<Items>
									<member>
										<FulfillmentNetworkSKU>N1</FulfillmentNetworkSKU>
										<Quantity>3</Quantity>
										<SellerSKU>X1</SellerSKU>
									</member>
								</Items>
							</member>
						</InboundShipmentPlans>
					</CreateInboundShipmentPlanResult>
					<ResponseMetadata><RequestId>r-1</RequestId></ResponseMetadata>
				</CreateInboundShipmentPlanResponse>"#
			),
		)
		.respond(
			200,
			format!(
				r#"<CreateInboundShipmentResponse xmlns="{NS}">
					<CreateInboundShipmentResult><ShipmentId>FBA1</ShipmentId></CreateInboundShipmentResult>
				</CreateInboundShipmentResponse>"#
			),
		);
	let client = client(&transport);

	let items = [PlanItem {
		seller_sku: "X1".to_string(),
		quantity: 3,
		asin: "B000".to_string(),
		condition: Condition::NewItem,
	}];
	let outcome = ShipmentWorkflow::new(&client, origin())
		.create_shipments(&items)
		.await
		.unwrap();

	assert_eq!(outcome.shipments.len(), 1);
	assert_eq!(outcome.shipments[0].shipment_id, "FBA1");
	assert_eq!(
		outcome.shipments[0].products,
		Some(vec![PlanProduct {
			seller_sku: "X1".to_string(),
			quantity: 3,
			network_sku: "N1".to_string(),
		}])
	);

	let requests = transport.requests();
	assert_eq!(requests.len(), 2);

	let plan_query = requests[0].url.split_once('?').map(|(_, q)| q).unwrap();
	let plan = decode_query(plan_query).unwrap();
	assert_eq!(plan["Action"], "CreateInboundShipmentPlan");
	assert_eq!(plan["AWSAccessKeyId"], "K");
	assert_eq!(plan["SellerId"], "M1");
	assert_eq!(plan["ShipFromAddress.Name"], "A Co");
	assert_eq!(plan["InboundShipmentPlanRequestItems.member.1.ASIN"], "B000");

	let create_query = requests[1].url.split_once('?').map(|(_, q)| q).unwrap();
	let create = decode_query(create_query).unwrap();
	assert_eq!(create["Action"], "CreateInboundShipment");
	assert_eq!(create["ShipmentId"], "FBA1");
	assert_eq!(create["InboundShipmentItems.member.1.FulfillmentNetworkSKU"], "N1");
	assert_eq!(create["InboundShipmentItems.member.1.QuantityShipped"], "3");
}

#[test]
fn test_sync_client_lists_and_plans() {
	let transport = ScriptedTransport::new();
	transport
		.respond(
			200,
			format!(
				r#"<ListInboundShipmentItemsResponse xmlns="{NS}">
					<ListInboundShipmentItemsResult>
						<NextToken>T1</NextToken>
						<ItemData>
							<member><ShipmentId>FBA1</ShipmentId><SellerSKU>X1</SellerSKU><QuantityShipped>3</QuantityShipped><QuantityReceived>1</QuantityReceived></member>
						</ItemData>
					</ListInboundShipmentItemsResult>
				</ListInboundShipmentItemsResponse>"#
			),
		)
		.respond(
			200,
			format!(
				r#"<ListInboundShipmentItemsByNextTokenResponse xmlns="{NS}">
					<ListInboundShipmentItemsByNextTokenResult>
						<ItemData>
							<member><ShipmentId>FBA1</ShipmentId><SellerSKU>X2</SellerSKU><QuantityShipped>2</QuantityShipped><QuantityReceived>2</QuantityReceived></member>
						</ItemData>
					</ListInboundShipmentItemsByNextTokenResult>
				</ListInboundShipmentItemsByNextTokenResponse>"#
			),
		);
	let sync = SyncClient::from_client(client(&transport)).unwrap();

	let listing = sync
		.list_shipment_items(ItemFilter::Shipment("FBA1".to_string()))
		.unwrap();
	assert!(listing.is_complete());
	assert_eq!(listing.items.len(), 2);
	assert_eq!(listing.items[1].seller_sku, "X2");

	let outcome = sync
		.create_shipments(&origin(), &[], FailurePolicy::Continue)
		.unwrap();
	assert!(outcome.shipments.is_empty());
	assert_eq!(transport.remaining(), 0);
}
