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

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::operations::{CreateInboundShipment, CreateInboundShipmentPlan};
use crate::request::{RequestState, SignedOperation, SignedRequest, redact_signature};
use crate::signing::{EncodingError, SigningError};
use crate::transport::{HttpRequest, HttpTransport, Transport, TransportError};
use crate::types::{Address, Credentials, PlanItem, PlanResult, ShipmentResult};
use crate::xml::{ParseError, error_details, with_root};

/// Default API host
pub const DEFAULT_HOST: &str = "mws.amazonservices.com";

/// Default host of the response namespaces
pub const DEFAULT_NS_HOST: &str = "mws.amazonaws.com";

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on pages fetched by one listing
pub const DEFAULT_MAX_PAGES: usize = 100;

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Encoding error: {0}")]
	Encoding(#[from] EncodingError),
	#[error("Signing error: {0}")]
	Signing(#[from] SigningError),
	#[error("Transport error: {0}")]
	Transport(#[from] TransportError),
	#[error("Remote rejection ({status}): {}", rejection_summary(.code, .message))]
	RemoteRejection {
		status: u16,
		code: Option<String>,
		message: Option<String>,
		body: String,
	},
	#[error("Parse error: {0}")]
	Parse(#[from] ParseError),
	#[error("Runtime error: {0}")]
	Runtime(String),
}

fn rejection_summary<'a>(code: &'a Option<String>, message: &'a Option<String>) -> &'a str {
	message
		.as_deref()
		.or(code.as_deref())
		.unwrap_or("no details")
}

impl ClientError {
	/// Whether a caller may reasonably try the same call again
	pub fn is_transient(&self) -> bool {
		match self {
			ClientError::Transport(_) => true,
			ClientError::RemoteRejection { status, .. } => *status >= 500,
			_ => false,
		}
	}
}

/// Endpoint and limits of a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
	pub host: String,
	pub ns_host: String,
	pub timeout: Duration,
	pub max_pages: usize,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			host: DEFAULT_HOST.to_string(),
			ns_host: DEFAULT_NS_HOST.to_string(),
			timeout: DEFAULT_TIMEOUT,
			max_pages: DEFAULT_MAX_PAGES,
		}
	}
}

/// Client for the signed inbound API
///
/// Every call is signed with the credentials given at construction and
/// performs exactly one network round trip. There is no retry.
pub struct Client<T = HttpTransport> {
	credentials: Arc<Credentials>,
	config: ClientConfig,
	transport: T,
}

impl Client<HttpTransport> {
	/// Create a client over HTTPS
	pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self, ClientError> {
		let transport = HttpTransport::new(config.timeout)?;
		Ok(Self::with_transport(credentials, config, transport))
	}
}

impl<T: Transport> Client<T> {
	/// Create a client over a custom transport
	pub fn with_transport(credentials: Credentials, config: ClientConfig, transport: T) -> Self {
		Self {
			credentials: Arc::new(credentials),
			config,
			transport,
		}
	}

	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Build and submit one operation
	pub async fn execute<O: SignedOperation>(&self, operation: O) -> Result<O::Output, ClientError> {
		let mut request = match SignedRequest::new(operation) {
			Ok(request) => request,
			Err(e) => {
				warn!(target: "client", action = O::ACTION, error = %e, "Failed to build request");
				return Err(e.into());
			}
		};
		self.submit(&mut request).await
	}

	/// Sign, send and parse a prepared request
	///
	/// Any failure moves the request to [`RequestState::Failed`].
	pub async fn submit<O: SignedOperation>(
		&self,
		request: &mut SignedRequest<O>,
	) -> Result<O::Output, ClientError> {
		let result = self.round_trip(request).await;
		if let Err(e) = &result {
			request.mark(RequestState::Failed);
			warn!(
				target: "client",
				action = O::ACTION,
				transient = e.is_transient(),
				error = %e,
				"Signed request failed"
			);
		}
		result
	}

	async fn round_trip<O: SignedOperation>(
		&self,
		request: &mut SignedRequest<O>,
	) -> Result<O::Output, ClientError> {
		let url = request.get_url(&self.credentials, &self.config.host)?;
		debug!(target: "client", action = O::ACTION, url = redact_signature(&url), "Submitting signed request");

		let response = self
			.transport
			.post(HttpRequest {
				url,
				headers: vec![("Content-Type".to_string(), "text/xml".to_string())],
			})
			.await?;
		request.mark(RequestState::Sent);

		if response.status != 200 {
			let (code, message) = error_details(&response.body);
			return Err(ClientError::RemoteRejection {
				status: response.status,
				code,
				message,
				body: response.body,
			});
		}

		let namespace = request.namespace(&self.config.ns_host);
		let output = with_root(&response.body, &namespace, |root| {
			request.operation().parse_response(root)
		})?;
		request.mark(RequestState::Parsed);

		debug!(target: "client", action = O::ACTION, "Signed request parsed");
		Ok(output)
	}

	/// Propose shipments for a set of items
	pub async fn create_shipment_plan(
		&self,
		ship_from: &Address,
		items: &[PlanItem],
	) -> Result<Vec<PlanResult>, ClientError> {
		self.execute(CreateInboundShipmentPlan::new(ship_from.clone(), items.to_vec()))
			.await
	}

	/// Create the shipment described by one plan result
	pub async fn create_shipment(
		&self,
		plan: &PlanResult,
		ship_from: &Address,
	) -> Result<ShipmentResult, ClientError> {
		self.execute(CreateInboundShipment::from_plan(plan, ship_from.clone()))
			.await
	}
}

/// Synchronous client wrapper
///
/// This wraps the async client and runs it in a tokio runtime.
/// Do not use it from inside another runtime.
pub struct SyncClient<T = HttpTransport> {
	client: Client<T>,
	runtime: tokio::runtime::Runtime,
}

impl SyncClient<HttpTransport> {
	/// Create a new synchronous client over HTTPS
	pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self, ClientError> {
		Self::from_client(Client::new(credentials, config)?)
	}
}

impl<T: Transport> SyncClient<T> {
	/// Wrap an existing async client
	pub fn from_client(client: Client<T>) -> Result<Self, ClientError> {
		let runtime = tokio::runtime::Builder::new_current_thread()
			.enable_all()
			.build()
			.map_err(|e| ClientError::Runtime(format!("Failed to create tokio runtime: {}", e)))?;
		Ok(Self { client, runtime })
	}

	pub fn client(&self) -> &Client<T> {
		&self.client
	}

	/// Run any future against the wrapped client
	pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
		self.runtime.block_on(future)
	}

	/// Build and submit one operation (synchronous)
	pub fn execute<O: SignedOperation>(&self, operation: O) -> Result<O::Output, ClientError> {
		self.runtime.block_on(self.client.execute(operation))
	}

	/// Propose shipments (synchronous)
	pub fn create_shipment_plan(
		&self,
		ship_from: &Address,
		items: &[PlanItem],
	) -> Result<Vec<PlanResult>, ClientError> {
		self.runtime
			.block_on(self.client.create_shipment_plan(ship_from, items))
	}

	/// Create one shipment (synchronous)
	pub fn create_shipment(
		&self,
		plan: &PlanResult,
		ship_from: &Address,
	) -> Result<ShipmentResult, ClientError> {
		self.runtime
			.block_on(self.client.create_shipment(plan, ship_from))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::operations::ListInboundShipmentItems;
	use crate::request::RequestState;
	use crate::signing::decode_query;
	use crate::transport::ScriptedTransport;

	const NS: &str = "http://mws.amazonaws.com/FulfillmentInboundShipment/2010-10-01/";

	fn client(transport: &ScriptedTransport) -> Client<ScriptedTransport> {
		Client::with_transport(
			Credentials::new("K", "S", "M1"),
			ClientConfig::default(),
			transport.clone(),
		)
	}

	fn items_body() -> String {
		format!(
			r#"<ListInboundShipmentItemsResponse xmlns="{NS}">
				<ListInboundShipmentItemsResult>
					<ItemData>
						<member>
							<ShipmentId>FBA1</ShipmentId>
							<SellerSKU>X1</SellerSKU>
							<QuantityShipped>3</QuantityShipped>
							<QuantityReceived>3</QuantityReceived>
						</member>
					</ItemData>
				</ListInboundShipmentItemsResult>
			</ListInboundShipmentItemsResponse>"#
		)
	}

	#[test]
	fn test_client_creation() {
		let client = Client::new(Credentials::new("K", "S", "M1"), ClientConfig::default());
		assert!(client.is_ok());
	}

	#[test]
	fn test_sync_client_creation() {
		let client = SyncClient::new(Credentials::new("K", "S", "M1"), ClientConfig::default());
		assert!(client.is_ok());
	}

	#[tokio::test]
	async fn test_submit_parses_and_walks_states() {
		let transport = ScriptedTransport::new();
		transport.respond(200, items_body());
		let client = client(&transport);

		let mut request = SignedRequest::new(ListInboundShipmentItems::for_shipment("FBA1")).unwrap();
		assert_eq!(request.state(), RequestState::Built);

		let page = client.submit(&mut request).await.unwrap();
		assert_eq!(request.state(), RequestState::Parsed);
		assert_eq!(page.items.len(), 1);
		assert_eq!(page.next_token, None);

		let sent = transport.requests();
		assert_eq!(sent.len(), 1);
		assert!(sent[0].url.starts_with(
			"https://mws.amazonservices.com/FulfillmentInboundShipment/2010-10-01?"
		));
		assert_eq!(
			sent[0].headers,
			vec![("Content-Type".to_string(), "text/xml".to_string())]
		);

		let query = sent[0].url.split_once('?').map(|(_, q)| q).unwrap();
		let params = decode_query(query).unwrap();
		assert_eq!(params["ShipmentId"], "FBA1");
		assert!(params.contains_key("Signature"));
	}

	#[tokio::test]
	async fn test_non_200_is_remote_rejection() {
		let transport = ScriptedTransport::new();
		transport.respond(
			400,
			r#"<ErrorResponse xmlns="http://mws.amazonaws.com/FulfillmentInboundShipment/2010-10-01/">
				<Error>
					<Type>Sender</Type>
					<Code>InvalidParameterValue</Code>
					<Message>Invalid ShipmentId</Message>
				</Error>
			</ErrorResponse>"#,
		);
		let client = client(&transport);

		let mut request = SignedRequest::new(ListInboundShipmentItems::for_shipment("BAD")).unwrap();
		let error = client.submit(&mut request).await.unwrap_err();

		assert_eq!(request.state(), RequestState::Failed);
		assert!(!error.is_transient());
		match error {
			ClientError::RemoteRejection {
				status,
				code,
				message,
				..
			} => {
				assert_eq!(status, 400);
				assert_eq!(code.as_deref(), Some("InvalidParameterValue"));
				assert_eq!(message.as_deref(), Some("Invalid ShipmentId"));
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn test_unreadable_rejection_body_still_rejects() {
		let transport = ScriptedTransport::new();
		transport.respond(503, "Service Unavailable");
		let client = client(&transport);

		let error = client
			.execute(ListInboundShipmentItems::for_shipment("FBA1"))
			.await
			.unwrap_err();

		assert!(error.is_transient());
		assert!(matches!(
			error,
			ClientError::RemoteRejection {
				status: 503,
				code: None,
				message: None,
				..
			}
		));
	}

	#[tokio::test]
	async fn test_transport_failure_is_transient() {
		let transport = ScriptedTransport::new();
		transport.fail(TransportError::Timeout);
		let client = client(&transport);

		let mut request = SignedRequest::new(ListInboundShipmentItems::for_shipment("FBA1")).unwrap();
		let error = client.submit(&mut request).await.unwrap_err();

		assert!(matches!(error, ClientError::Transport(TransportError::Timeout)));
		assert!(error.is_transient());
		assert_eq!(request.state(), RequestState::Failed);
	}

	#[tokio::test]
	async fn test_wrong_namespace_is_parse_error() {
		let transport = ScriptedTransport::new();
		transport.respond(
			200,
			r#"<ListInboundShipmentItemsResponse xmlns="http://example.com/other/">
				<ListInboundShipmentItemsResult/>
			</ListInboundShipmentItemsResponse>"#,
		);
		let client = client(&transport);

		let error = client
			.execute(ListInboundShipmentItems::for_shipment("FBA1"))
			.await
			.unwrap_err();

		assert!(matches!(error, ClientError::Parse(ParseError::UnexpectedRoot(_))));
		assert!(!error.is_transient());
	}

	#[tokio::test]
	async fn test_empty_secret_never_reaches_network() {
		let transport = ScriptedTransport::new();
		transport.respond(200, items_body());
		let client = Client::with_transport(
			Credentials::new("K", "", "M1"),
			ClientConfig::default(),
			transport.clone(),
		);

		let error = client
			.execute(ListInboundShipmentItems::for_shipment("FBA1"))
			.await
			.unwrap_err();

		assert!(matches!(error, ClientError::Signing(SigningError::EmptySecret)));
		assert!(transport.requests().is_empty());
	}

	#[test]
	fn test_sync_client_executes() {
		let transport = ScriptedTransport::new();
		transport.respond(200, items_body());
		let sync = SyncClient::from_client(client(&transport)).unwrap();

		let page = sync
			.execute(ListInboundShipmentItems::for_shipment("FBA1"))
			.unwrap();
		assert_eq!(page.items[0].seller_sku, "X1");
	}
}
