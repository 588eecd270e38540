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

//! HTTP transports
//!
//! The client talks to the network through the [`Transport`] trait so that
//! signing, parsing and pagination can be driven without a live endpoint.
//! [`HttpTransport`] is the production implementation on top of reqwest;
//! [`ScriptedTransport`] replays canned responses and records every request.

use std::{
	collections::VecDeque,
	future::Future,
	sync::{Arc, Mutex},
	time::Duration,
};

use reqwest::Client as ReqwestClient;
use thiserror::Error;

/// Error types for transport operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
	#[error("Connection failed: {0}")]
	Connection(String),
	#[error("Request timed out")]
	Timeout,
	#[error("Failed to read response body: {0}")]
	Body(String),
}

/// Outbound request: every parameter lives in the URL, no body is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
	pub url: String,
	pub headers: Vec<(String, String)>,
}

/// Raw response handed back to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
	pub status: u16,
	pub body: String,
}

/// Sends one POST request and returns the raw response
pub trait Transport: Send + Sync {
	fn post(
		&self,
		request: HttpRequest,
	) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
	client: ReqwestClient,
}

impl HttpTransport {
	/// Create a transport whose requests are capped at `timeout` end to end
	pub fn new(timeout: Duration) -> Result<Self, TransportError> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| TransportError::Connection(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self { client })
	}
}

impl Transport for HttpTransport {
	async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		let mut builder = self.client.post(&request.url);
		for (name, value) in &request.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}

		let response = builder.send().await.map_err(map_reqwest_error)?;
		let status = response.status().as_u16();
		let body = response
			.text()
			.await
			.map_err(|e| TransportError::Body(e.to_string()))?;

		Ok(HttpResponse { status, body })
	}
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
	if e.is_timeout() {
		TransportError::Timeout
	} else {
		TransportError::Connection(e.to_string())
	}
}

#[derive(Default)]
struct Script {
	responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
	requests: Mutex<Vec<HttpRequest>>,
}

/// Transport that replays queued responses in order
///
/// Clones share the same script, so a test can keep one handle for
/// inspection while the client owns another. Once the queue is exhausted
/// every further request fails with a connection error.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
	script: Arc<Script>,
}

impl ScriptedTransport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queue a response with the given status and body
	pub fn respond(&self, status: u16, body: impl Into<String>) -> &Self {
		self.push(Ok(HttpResponse {
			status,
			body: body.into(),
		}))
	}

	/// Queue a transport failure
	pub fn fail(&self, error: TransportError) -> &Self {
		self.push(Err(error))
	}

	fn push(&self, outcome: Result<HttpResponse, TransportError>) -> &Self {
		self.script
			.responses
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.push_back(outcome);
		self
	}

	/// Requests received so far, oldest first
	pub fn requests(&self) -> Vec<HttpRequest> {
		self.script
			.requests
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.clone()
	}

	/// Number of queued responses not yet consumed
	pub fn remaining(&self) -> usize {
		self.script
			.responses
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.len()
	}
}

impl Transport for ScriptedTransport {
	async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		self.script
			.requests
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.push(request);

		self.script
			.responses
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.pop_front()
			.unwrap_or_else(|| Err(TransportError::Connection("script exhausted".to_string())))
	}
}
