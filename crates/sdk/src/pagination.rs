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

//! Continuation-token pagination
//!
//! A listing starts with one operation and follows `NextToken` with another
//! until the remote side stops returning a token. Pages are appended in the
//! order they were fetched.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::client::{Client, ClientError, SyncClient};
use crate::operations::{
	GetReportList, GetReportListByNextToken, ItemFilter, ListInboundShipmentItems,
	ListInboundShipmentItemsByNextToken, ReportFilter,
};
use crate::request::SignedOperation;
use crate::transport::Transport;
use crate::types::{ListedItem, Page, ReportInfo};

/// Why a listing stopped before the last page
#[derive(Debug, Error)]
pub enum TruncationCause {
	#[error("page {page} failed: {source}")]
	PageFailed {
		page: usize,
		#[source]
		source: ClientError,
	},
	#[error("token {0} returned twice in a row")]
	RepeatedToken(String),
	#[error("page limit of {0} reached")]
	PageLimit(usize),
}

#[derive(Debug)]
pub enum ListingStatus {
	Complete,
	Truncated(TruncationCause),
}

/// Items gathered by one paginated listing
#[derive(Debug)]
pub struct Listing<T> {
	pub items: Vec<T>,
	pub pages: usize,
	pub status: ListingStatus,
}

impl<T> Listing<T> {
	pub fn is_complete(&self) -> bool {
		matches!(self.status, ListingStatus::Complete)
	}

	pub fn truncation(&self) -> Option<&TruncationCause> {
		match &self.status {
			ListingStatus::Complete => None,
			ListingStatus::Truncated(cause) => Some(cause),
		}
	}
}

/// Printable summary of a listing
#[derive(Debug, Serialize)]
pub struct ListingReport<'a, T> {
	pub items: &'a [T],
	pub pages: usize,
	pub complete: bool,
	pub truncated_by: Option<String>,
}

impl<T> Listing<T> {
	pub fn report(&self) -> ListingReport<'_, T> {
		ListingReport {
			items: &self.items,
			pages: self.pages,
			complete: self.is_complete(),
			truncated_by: self.truncation().map(ToString::to_string),
		}
	}
}

fn present(token: Option<String>) -> Option<String> {
	token.filter(|t| !t.is_empty())
}

impl<T: Transport> Client<T> {
	/// Run a listing to exhaustion
	///
	/// A failing first page is an error. Any later failure keeps what was
	/// gathered so far and marks the listing truncated.
	pub async fn paginate<I, F, N, M>(&self, first: F, next: M) -> Result<Listing<I>, ClientError>
	where
		F: SignedOperation<Output = Page<I>>,
		N: SignedOperation<Output = Page<I>>,
		M: Fn(String) -> N,
	{
		let page = self.execute(first).await?;
		let mut items = page.items;
		let mut pages = 1;
		let mut token = present(page.next_token);

		while let Some(current) = token.take() {
			if pages >= self.config().max_pages {
				warn!(target: "pagination", action = F::ACTION, pages, "Page limit reached, listing truncated");
				return Ok(Listing {
					items,
					pages,
					status: ListingStatus::Truncated(TruncationCause::PageLimit(pages)),
				});
			}

			let page = match self.execute(next(current.clone())).await {
				Ok(page) => page,
				Err(source) => {
					warn!(target: "pagination", action = N::ACTION, page = pages + 1, error = %source, "Page failed, listing truncated");
					return Ok(Listing {
						items,
						pages,
						status: ListingStatus::Truncated(TruncationCause::PageFailed {
							page: pages + 1,
							source,
						}),
					});
				}
			};

			pages += 1;
			items.extend(page.items);
			debug!(target: "pagination", action = N::ACTION, pages, items = items.len(), "Page appended");

			let following = present(page.next_token);
			if following.as_deref() == Some(current.as_str()) {
				warn!(target: "pagination", action = N::ACTION, pages, "Token repeated, listing truncated");
				return Ok(Listing {
					items,
					pages,
					status: ListingStatus::Truncated(TruncationCause::RepeatedToken(current)),
				});
			}
			token = following;
		}

		Ok(Listing {
			items,
			pages,
			status: ListingStatus::Complete,
		})
	}

	/// Every item matching `filter`, across all pages
	pub async fn list_shipment_items(
		&self,
		filter: ItemFilter,
	) -> Result<Listing<ListedItem>, ClientError> {
		self.paginate(
			ListInboundShipmentItems { filter },
			|token| ListInboundShipmentItemsByNextToken::new(token),
		)
		.await
	}

	/// Every report matching `filter`, across all pages
	pub async fn list_reports(&self, filter: ReportFilter) -> Result<Listing<ReportInfo>, ClientError> {
		self.paginate(GetReportList::new(filter), |token| {
			GetReportListByNextToken::new(token)
		})
			.await
	}
}

impl<T: Transport> SyncClient<T> {
	/// Every item matching `filter` (synchronous)
	pub fn list_shipment_items(&self, filter: ItemFilter) -> Result<Listing<ListedItem>, ClientError> {
		self.block_on(self.client().list_shipment_items(filter))
	}

	/// Every report matching `filter` (synchronous)
	pub fn list_reports(&self, filter: ReportFilter) -> Result<Listing<ReportInfo>, ClientError> {
		self.block_on(self.client().list_reports(filter))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::client::ClientConfig;
	use crate::signing::decode_query;
	use crate::transport::{ScriptedTransport, TransportError};
	use crate::types::Credentials;

	const NS: &str = "http://mws.amazonaws.com/FulfillmentInboundShipment/2010-10-01/";

	fn page(action: &str, skus: &[&str], token: Option<&str>) -> String {
		let members: String = skus
			.iter()
			.map(|sku| {
				format!(
					"<member><ShipmentId>FBA1</ShipmentId><SellerSKU>{sku}</SellerSKU>\
					 <QuantityShipped>1</QuantityShipped><QuantityReceived>0</QuantityReceived></member>"
				)
			})
			.collect();
		let token = token
			.map(|t| format!("<NextToken>{t}</NextToken>"))
			.unwrap_or_default();
		format!(
			"<{action}Response xmlns=\"{NS}\"><{action}Result>{token}\
			 <ItemData>{members}</ItemData></{action}Result></{action}Response>"
		)
	}

	fn first(skus: &[&str], token: Option<&str>) -> String {
		page("ListInboundShipmentItems", skus, token)
	}

	fn next(skus: &[&str], token: Option<&str>) -> String {
		page("ListInboundShipmentItemsByNextToken", skus, token)
	}

	fn client(transport: &ScriptedTransport, max_pages: usize) -> Client<ScriptedTransport> {
		Client::with_transport(
			Credentials::new("K", "S", "M1"),
			ClientConfig {
				max_pages,
				..ClientConfig::default()
			},
			transport.clone(),
		)
	}

	fn skus(listing: &Listing<ListedItem>) -> Vec<&str> {
		listing.items.iter().map(|i| i.seller_sku.as_str()).collect()
	}

	fn shipment() -> ItemFilter {
		ItemFilter::Shipment("FBA1".to_string())
	}

	#[tokio::test]
	async fn test_pages_are_appended_in_order() {
		let transport = ScriptedTransport::new();
		transport
			.respond(200, first(&["A", "B"], Some("T1")))
			.respond(200, next(&["C", "D"], Some("T2")))
			.respond(200, next(&["E"], Some("")));

		let listing = client(&transport, 100)
			.list_shipment_items(shipment())
			.await
			.unwrap();

		assert!(listing.is_complete());
		assert_eq!(listing.pages, 3);
		assert_eq!(skus(&listing), vec!["A", "B", "C", "D", "E"]);

		let tokens: Vec<Option<String>> = transport
			.requests()
			.iter()
			.map(|r| {
				let query = r.url.split_once('?').map(|(_, q)| q).unwrap();
				decode_query(query).unwrap().get("NextToken").cloned()
			})
			.collect();
		assert_eq!(
			tokens,
			vec![None, Some("T1".to_string()), Some("T2".to_string())]
		);
	}

	#[tokio::test]
	async fn test_later_failure_truncates() {
		let transport = ScriptedTransport::new();
		transport
			.respond(200, first(&["A", "B"], Some("T1")))
			.fail(TransportError::Timeout);

		let listing = client(&transport, 100)
			.list_shipment_items(shipment())
			.await
			.unwrap();

		assert!(!listing.is_complete());
		assert_eq!(skus(&listing), vec!["A", "B"]);
		assert!(matches!(
			listing.truncation(),
			Some(TruncationCause::PageFailed {
				page: 2,
				source: ClientError::Transport(TransportError::Timeout),
			})
		));
	}

	#[tokio::test]
	async fn test_first_failure_is_error() {
		let transport = ScriptedTransport::new();
		transport.respond(500, "oops");

		let result = client(&transport, 100).list_shipment_items(shipment()).await;

		assert!(matches!(
			result,
			Err(ClientError::RemoteRejection { status: 500, .. })
		));
		assert_eq!(transport.requests().len(), 1);
	}

	#[tokio::test]
	async fn test_repeated_token_stops() {
		let transport = ScriptedTransport::new();
		transport
			.respond(200, first(&["A"], Some("T1")))
			.respond(200, next(&["B"], Some("T1")))
			.respond(200, next(&["never"], None));

		let listing = client(&transport, 100)
			.list_shipment_items(shipment())
			.await
			.unwrap();

		assert_eq!(skus(&listing), vec!["A", "B"]);
		assert!(matches!(
			listing.truncation(),
			Some(TruncationCause::RepeatedToken(token)) if token == "T1"
		));
		assert_eq!(transport.remaining(), 1);
	}

	#[tokio::test]
	async fn test_page_limit_stops() {
		let transport = ScriptedTransport::new();
		transport
			.respond(200, first(&["A"], Some("T1")))
			.respond(200, next(&["B"], Some("T2")))
			.respond(200, next(&["C"], None));

		let listing = client(&transport, 2)
			.list_shipment_items(shipment())
			.await
			.unwrap();

		assert_eq!(skus(&listing), vec!["A", "B"]);
		assert!(matches!(
			listing.truncation(),
			Some(TruncationCause::PageLimit(2))
		));
		assert_eq!(transport.requests().len(), 2);
	}

	#[tokio::test]
	async fn test_single_page_without_token() {
		let transport = ScriptedTransport::new();
		transport.respond(200, first(&["A"], None));

		let listing = client(&transport, 100)
			.list_shipment_items(shipment())
			.await
			.unwrap();

		assert!(listing.is_complete());
		assert_eq!(listing.pages, 1);

		let report = listing.report();
		assert!(report.complete);
		assert_eq!(report.truncated_by, None);
	}
}
