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

//! Configuration of the receiving service and the `inbound` CLI
//!
//! Values come from an optional config file and from environment variables
//! prefixed with `INBOUND_`; nested keys are separated by `__`:
//!
//! - `INBOUND_CREDENTIALS__ACCESS_KEY_ID`, `INBOUND_CREDENTIALS__SECRET_KEY`,
//!   `INBOUND_CREDENTIALS__SELLER_ID`
//! - `INBOUND_ENDPOINT__HOST`, `INBOUND_ENDPOINT__NS_HOST`,
//!   `INBOUND_ENDPOINT__TIMEOUT_MS`, `INBOUND_ENDPOINT__MAX_PAGES`
//! - `INBOUND_ORIGIN__NAME`, `INBOUND_ORIGIN__ADDRESS_LINE1`, ...
//! - `INBOUND_QUEUE_CAPACITY`

use std::time::Duration;

use inbound_sdk::{Address, ClientConfig, Credentials};
use serde::{Deserialize, Serialize};

// Logging configuration constants
/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log directory component name
pub const LOG_COMPONENT_NAME: &str = "inbound";

/// Default console output enabled (can be overridden by LOG_TO_CONSOLE environment variable)
pub const DEFAULT_LOG_TO_CONSOLE: bool = false;

// Endpoint configuration constants
/// Default API host (can be overridden by INBOUND_ENDPOINT__HOST)
pub const DEFAULT_HOST: &str = inbound_sdk::client::DEFAULT_HOST;

/// Default namespace host (can be overridden by INBOUND_ENDPOINT__NS_HOST)
pub const DEFAULT_NS_HOST: &str = inbound_sdk::client::DEFAULT_NS_HOST;

/// Default per-call timeout in milliseconds (can be overridden by INBOUND_ENDPOINT__TIMEOUT_MS)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default page cap of one listing (can be overridden by INBOUND_ENDPOINT__MAX_PAGES)
pub const DEFAULT_MAX_PAGES: usize = inbound_sdk::client::DEFAULT_MAX_PAGES;

// Dispatch configuration constants
/// Default capacity of the fetch queue (can be overridden by INBOUND_QUEUE_CAPACITY)
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

const ENV_PREFIX: &str = "INBOUND";

/// Remote endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
	pub host: String,
	pub ns_host: String,
	pub timeout_ms: u64,
	pub max_pages: usize,
}

impl Default for EndpointConfig {
	fn default() -> Self {
		Self {
			host: DEFAULT_HOST.to_string(),
			ns_host: DEFAULT_NS_HOST.to_string(),
			timeout_ms: DEFAULT_TIMEOUT_MS,
			max_pages: DEFAULT_MAX_PAGES,
		}
	}
}

fn default_queue_capacity() -> usize {
	DEFAULT_QUEUE_CAPACITY
}

/// Inbound service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundConfig {
	/// Account credentials
	pub credentials: Credentials,
	/// Remote endpoint
	#[serde(default)]
	pub endpoint: EndpointConfig,
	/// Ship-from address used by every shipment plan
	pub origin: Address,
	/// Capacity of the receipt fetch queue
	#[serde(default = "default_queue_capacity")]
	pub queue_capacity: usize,
}

impl InboundConfig {
	fn environment() -> config::Environment {
		config::Environment::with_prefix(ENV_PREFIX)
			.prefix_separator("_")
			.separator("__")
	}

	/// Load configuration from environment variables
	pub fn from_env() -> Result<Self, config::ConfigError> {
		dotenv::dotenv().ok();

		let cfg = config::Config::builder()
			.add_source(Self::environment())
			.build()?;

		cfg.try_deserialize()
	}

	/// Load configuration from file, then environment variables
	pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
		dotenv::dotenv().ok();

		let cfg = config::Config::builder()
			.add_source(config::File::with_name(path))
			.add_source(Self::environment())
			.build()?;

		cfg.try_deserialize()
	}

	/// Client settings derived from the endpoint section
	pub fn client_config(&self) -> ClientConfig {
		ClientConfig {
			host: self.endpoint.host.clone(),
			ns_host: self.endpoint.ns_host.clone(),
			timeout: Duration::from_millis(self.endpoint.timeout_ms),
			max_pages: self.endpoint.max_pages,
		}
	}
}
