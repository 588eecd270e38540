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

//! Canonical query encoding and request signing
//!
//! Requests are authenticated with signature version 2: the query parameters
//! are sorted by name (byte-wise), percent-encoded with the RFC 3986
//! unreserved set, and the resulting canonical query is signed together with
//! the HTTP method, host and path:
//!
//! ```text
//! POST
//! mws.amazonservices.com
//! /FulfillmentInboundShipment/2010-10-01
//! AWSAccessKeyId=...&Action=...&SellerId=...
//! ```
//!
//! The signature is the base64-encoded HMAC-SHA256 of that string, keyed by
//! the account secret. It must be percent-encoded again before it is appended
//! to the URL since base64 output contains `+`, `/` and `=`.

use std::collections::BTreeMap;

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Everything except `A-Z a-z 0-9 - _ . ~` is escaped
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'~');

pub const SIGNATURE_VERSION: &str = "2";
pub const SIGNATURE_METHOD: &str = "HmacSHA256";

/// Error types for query encoding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
	#[error("Empty parameter name")]
	EmptyName,
	#[error("Reserved parameter name: {0}")]
	ReservedName(String),
	#[error("Malformed query pair: {0}")]
	MalformedPair(String),
	#[error("Invalid UTF-8 in query component: {0}")]
	InvalidUtf8(String),
	#[error("Request already signed")]
	AlreadySigned,
}

/// Error types for signing operations
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
	#[error("Signing secret is empty")]
	EmptySecret,
	#[error("Signing error: {0}")]
	Signing(String),
}

/// Percent-encode a single name or value
pub fn encode_component(input: &str) -> String {
	utf8_percent_encode(input, COMPONENT).to_string()
}

/// Build the canonical query string from name/value pairs
///
/// Pairs are sorted by name using byte-wise ascending order, so the output
/// does not depend on the order the pairs were produced in. An empty input
/// yields an empty string.
pub fn encode_query<'a, I>(params: I) -> String
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	let mut pairs: Vec<(&str, &str)> = params.into_iter().collect();
	pairs.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

	pairs
		.iter()
		.map(|(name, value)| format!("{}={}", encode_component(name), encode_component(value)))
		.collect::<Vec<_>>()
		.join("&")
}

/// Parse a canonical query string back into its parameter map
pub fn decode_query(query: &str) -> Result<BTreeMap<String, String>, EncodingError> {
	let mut params = BTreeMap::new();
	if query.is_empty() {
		return Ok(params);
	}

	for pair in query.split('&') {
		let (name, value) = pair
			.split_once('=')
			.ok_or_else(|| EncodingError::MalformedPair(pair.to_string()))?;
		params.insert(decode_component(name)?, decode_component(value)?);
	}

	Ok(params)
}

fn decode_component(input: &str) -> Result<String, EncodingError> {
	percent_decode_str(input)
		.decode_utf8()
		.map(|s| s.into_owned())
		.map_err(|_| EncodingError::InvalidUtf8(input.to_string()))
}

/// Ordered parameter set of one request
///
/// Backed by a `BTreeMap`, whose `String` ordering is byte-wise, so iteration
/// already yields the canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
	entries: BTreeMap<String, String>,
}

impl QueryParams {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert or replace a parameter
	pub fn insert(
		&mut self,
		name: impl Into<String>,
		value: impl ToString,
	) -> Result<(), EncodingError> {
		let name = name.into();
		if name.is_empty() {
			return Err(EncodingError::EmptyName);
		}
		self.entries.insert(name, value.to_string());
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.entries.get(name).map(String::as_str)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Canonical query string of the current parameters
	pub fn encode(&self) -> String {
		encode_query(self.iter())
	}
}

/// Assemble the string to sign: exactly four newline-joined lines
pub fn string_to_sign(method: &str, host: &str, path: &str, canonical_query: &str) -> String {
	format!("{}\n{}\n{}\n{}", method, host, path, canonical_query)
}

/// Base64-encoded HMAC-SHA256 of `content` keyed by `secret`
pub fn sign(secret: &str, content: &str) -> Result<String, SigningError> {
	if secret.is_empty() {
		return Err(SigningError::EmptySecret);
	}

	let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
		.map_err(|e| SigningError::Signing(e.to_string()))?;
	mac.update(content.as_bytes());

	Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Sign a request given its method, host, path and canonical query
pub fn sign_request(
	secret: &str,
	method: &str,
	host: &str,
	path: &str,
	canonical_query: &str,
) -> Result<String, SigningError> {
	sign(secret, &string_to_sign(method, host, path, canonical_query))
}
