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

//! Signed request lifecycle
//!
//! A [`SignedRequest`] wraps one [`SignedOperation`] and walks
//! `Built -> Signed -> Sent -> Parsed`, or ends in `Failed` from any state.
//! The operation contributes its own parameters and its response parser;
//! the request owns the identity fields, the timestamp and the signature.

use chrono::{DateTime, NaiveDate, Utc};

use crate::signing::{
	EncodingError, QueryParams, SIGNATURE_METHOD, SIGNATURE_VERSION, SigningError,
	encode_component, sign_request,
};
use crate::types::Credentials;
use crate::xml::{Element, ParseError};

/// HTTP method used for every signed call
pub const HTTP_METHOD: &str = "POST";

/// Section of the inbound shipment API
pub const INBOUND_SECTION: &str = "FulfillmentInboundShipment";

/// Version date of the inbound shipment API
pub const INBOUND_VERSION: &str = "2010-10-01";

/// Parameter names owned by the request itself
pub const RESERVED_PARAMS: [&str; 9] = [
	"AWSAccessKeyId",
	"Action",
	"Merchant",
	"SellerId",
	"Signature",
	"SignatureMethod",
	"SignatureVersion",
	"Timestamp",
	"Version",
];

/// Format a timestamp the way the remote API expects (ISO-8601, UTC, seconds)
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
	timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn is_reserved(name: &str) -> bool {
	RESERVED_PARAMS.contains(&name)
}

/// Name of the parameter carrying the account id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
	SellerId,
	Merchant,
}

impl AccountField {
	pub fn as_str(&self) -> &'static str {
		match self {
			AccountField::SellerId => "SellerId",
			AccountField::Merchant => "Merchant",
		}
	}
}

/// A remote action: its parameters and its response parser
///
/// Defaults describe the inbound shipment section; operations of other
/// sections override the section, version, path and namespace.
pub trait SignedOperation {
	type Output;

	/// Value of the `Action` parameter
	const ACTION: &'static str;

	fn section(&self) -> &'static str {
		INBOUND_SECTION
	}

	fn version(&self) -> &'static str {
		INBOUND_VERSION
	}

	fn account_field(&self) -> AccountField {
		AccountField::SellerId
	}

	/// URL path, also the third line of the string to sign
	fn path(&self, version: &str) -> String {
		format!("/{}/{}", self.section(), version)
	}

	/// Namespace every response element is looked up in
	fn namespace(&self, ns_host: &str, version: &str) -> String {
		format!("http://{}/{}/{}/", ns_host, self.section(), version)
	}

	/// Add the operation-specific parameters
	fn build_params(&self, params: &mut QueryParams) -> Result<(), EncodingError>;

	/// Turn the response root element into the operation's record
	fn parse_response(&self, root: Element<'_, '_>) -> Result<Self::Output, ParseError>;
}

/// Lifecycle state of a signed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
	Built,
	Signed,
	Sent,
	Parsed,
	Failed,
}

/// Everything that identifies one call before signing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
	pub action: &'static str,
	pub section: &'static str,
	pub version: String,
	pub params: QueryParams,
	/// Pinned timestamp; stamped on first URL construction when unset
	pub deadline: Option<DateTime<Utc>>,
}

/// One invocation of a [`SignedOperation`]
pub struct SignedRequest<O> {
	operation: O,
	spec: RequestSpec,
	state: RequestState,
}

impl<O: SignedOperation> SignedRequest<O> {
	/// Build a request and collect the operation's parameters
	pub fn new(operation: O) -> Result<Self, EncodingError> {
		let mut params = QueryParams::new();
		operation.build_params(&mut params)?;
		if let Some((name, _)) = params.iter().find(|(name, _)| is_reserved(name)) {
			return Err(EncodingError::ReservedName(name.to_string()));
		}

		let spec = RequestSpec {
			action: O::ACTION,
			section: operation.section(),
			version: operation.version().to_string(),
			params,
			deadline: None,
		};

		Ok(Self {
			operation,
			spec,
			state: RequestState::Built,
		})
	}

	pub fn operation(&self) -> &O {
		&self.operation
	}

	pub fn spec(&self) -> &RequestSpec {
		&self.spec
	}

	pub fn state(&self) -> RequestState {
		self.state
	}

	pub(crate) fn mark(&mut self, state: RequestState) {
		self.state = state;
	}

	fn ensure_unsigned(&self) -> Result<(), EncodingError> {
		if self.state == RequestState::Built {
			Ok(())
		} else {
			Err(EncodingError::AlreadySigned)
		}
	}

	/// Attach an operation-specific parameter
	///
	/// Identity fields cannot be overridden this way.
	pub fn set_param(&mut self, name: &str, value: impl ToString) -> Result<(), EncodingError> {
		self.ensure_unsigned()?;
		if is_reserved(name) {
			return Err(EncodingError::ReservedName(name.to_string()));
		}
		self.spec.params.insert(name, value)
	}

	/// Override the API version date
	pub fn set_version(&mut self, date: NaiveDate) -> Result<(), EncodingError> {
		self.ensure_unsigned()?;
		self.spec.version = date.format("%Y-%m-%d").to_string();
		Ok(())
	}

	/// Pin the request timestamp
	pub fn set_deadline(&mut self, timestamp: DateTime<Utc>) -> Result<(), EncodingError> {
		self.ensure_unsigned()?;
		self.spec.deadline = Some(timestamp);
		Ok(())
	}

	/// Full parameter set sent on the wire, signature excluded
	pub fn wire_params(
		&self,
		credentials: &Credentials,
		timestamp: &DateTime<Utc>,
	) -> Result<QueryParams, EncodingError> {
		let mut params = self.spec.params.clone();
		params.insert("Action", self.spec.action)?;
		params.insert("AWSAccessKeyId", &credentials.access_key_id)?;
		params.insert(self.operation.account_field().as_str(), &credentials.seller_id)?;
		params.insert("SignatureVersion", SIGNATURE_VERSION)?;
		params.insert("SignatureMethod", SIGNATURE_METHOD)?;
		params.insert("Version", &self.spec.version)?;
		params.insert("Timestamp", format_timestamp(timestamp))?;
		Ok(params)
	}

	/// URL path of this request
	pub fn path(&self) -> String {
		self.operation.path(&self.spec.version)
	}

	/// Namespace of the expected response document
	pub fn namespace(&self, ns_host: &str) -> String {
		self.operation.namespace(ns_host, &self.spec.version)
	}

	/// Signed URL of this request
	///
	/// The timestamp is stamped once, on the first call, and reused
	/// afterwards, so repeated calls return the same URL.
	pub fn get_url(&mut self, credentials: &Credentials, host: &str) -> Result<String, SigningError> {
		let timestamp = *self.spec.deadline.get_or_insert_with(Utc::now);
		let query = self
			.wire_params(credentials, &timestamp)
			.map_err(|e| SigningError::Signing(e.to_string()))?
			.encode();
		let path = self.path();
		let signature = sign_request(&credentials.secret_key, HTTP_METHOD, host, &path, &query)?;

		if self.state == RequestState::Built {
			self.state = RequestState::Signed;
		}

		Ok(build_url(host, &path, &query, &signature))
	}
}

/// Join host, path, canonical query and signature into the final URL
///
/// An empty query does not leave a dangling separator.
pub fn build_url(host: &str, path: &str, canonical_query: &str, signature: &str) -> String {
	let signature = format!("Signature={}", encode_component(signature));
	if canonical_query.is_empty() {
		format!("https://{}{}?{}", host, path, signature)
	} else {
		format!("https://{}{}?{}&{}", host, path, canonical_query, signature)
	}
}

/// Drop the signature from a URL before it is logged
pub fn redact_signature(url: &str) -> &str {
	match url.find("Signature=") {
		Some(index) => url[..index].trim_end_matches(['&', '?']),
		None => url,
	}
}
