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

//! Inbound SDK - Signed-request client for the inbound fulfillment API
//!
//! This crate builds canonical query strings, signs them with HMAC-SHA256,
//! submits them over a pluggable transport and parses the namespaced XML
//! answers into plain records. On top of single calls it provides the
//! continuation-token pagination driver and the plan-then-create shipment
//! workflow.
//!
//! The SDK is designed to be lightweight and embeddable:
//! - No background threads
//! - No environment or configuration loading
//! - Credentials are injected at construction, never global

pub mod client;
pub mod operations;
pub mod pagination;
pub mod request;
pub mod signing;
pub mod transport;
pub mod types;
pub mod workflow;
pub mod xml;

pub use client::{Client, ClientConfig, ClientError, SyncClient};
pub use operations::{ItemFilter, ReportFilter};
pub use pagination::{Listing, ListingStatus, TruncationCause};
pub use request::{RequestState, SignedOperation, SignedRequest};
pub use signing::{EncodingError, SigningError, encode_query, sign_request};
pub use transport::{HttpTransport, ScriptedTransport, Transport, TransportError};
pub use types::*;
pub use workflow::{FailurePolicy, ShipmentWorkflow, WorkflowError, WorkflowOutcome};
