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

//! `inbound` command line entry point
//!
//! Subcommands:
//! - `plan`: plan and create shipments for a JSON list of items
//! - `items`: list the items of one shipment
//! - `reports`: list available reports
//! - `receive`: refresh received quantities of a JSON list of records

use std::{fs, path::Path, path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use inbound_receiving::{
	DispatchOutcome, InboundConfig, MemoryRecordStore, ReceiptWorker, ReceiptWorkerConfig,
	RecordStore, ShipmentRecord, fetch_queue,
};
use inbound_sdk::{FailurePolicy, ItemFilter, PlanItem, ReportFilter, SyncClient, WorkflowError};

/// Inbound shipment tool
#[derive(Parser, Debug)]
#[command(name = "inbound", version, about, long_about = None)]
struct Cli {
	/// Path to config file
	#[arg(short, long, global = true)]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Plan shipments for the items in a JSON file and create them
	Plan {
		/// JSON array of plan items
		items: PathBuf,

		/// Keep creating shipments after one fails
		#[arg(long)]
		keep_going: bool,
	},

	/// List every item of a shipment
	Items {
		shipment_id: String,
	},

	/// List available reports
	Reports {
		/// Maximum number of reports per page
		#[arg(long)]
		max_count: Option<u32>,

		/// Only acknowledged (or only unacknowledged) reports
		#[arg(long)]
		acknowledged: Option<bool>,

		/// Report type filter, repeatable
		#[arg(long = "type")]
		report_types: Vec<String>,
	},

	/// Refresh received quantities for the records in a JSON file
	Receive {
		/// JSON array of shipment records
		records: PathBuf,
	},
}

fn load_config(path: Option<&Path>) -> Result<InboundConfig> {
	match path {
		Some(path) => {
			let path_str = path
				.to_str()
				.with_context(|| format!("Config path is not UTF-8: {}", path.display()))?;
			InboundConfig::from_file(path_str)
				.with_context(|| format!("Failed to load config from {}", path.display()))
		}
		None => InboundConfig::from_env().context("Failed to load config from environment"),
	}
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
	let content =
		fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
	serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

fn run_plan(client: &SyncClient, config: &InboundConfig, items: &Path, keep_going: bool) -> Result<()> {
	let items: Vec<PlanItem> = read_json(items)?;
	let policy = if keep_going {
		FailurePolicy::Continue
	} else {
		FailurePolicy::Abort
	};

	match client.create_shipments(&config.origin, &items, policy) {
		Ok(outcome) => {
			let failed: Vec<_> = outcome
				.failed
				.iter()
				.map(|f| {
					json!({
						"shipment_id": f.shipment_id,
						"destination_center_id": f.destination_center_id,
						"error": f.error.to_string(),
					})
				})
				.collect();
			print_json(&json!({ "shipments": &outcome.shipments, "failed": &failed }))?;
			if !failed.is_empty() {
				bail!("{} shipment(s) could not be created", failed.len());
			}
			Ok(())
		}
		Err(WorkflowError::ShipmentAborted {
			shipment_id,
			created,
			source,
		}) => {
			print_json(&json!({ "shipments": &created, "aborted_at": &shipment_id }))?;
			Err(source).with_context(|| format!("Creating shipment {} failed", shipment_id))
		}
		Err(e) => Err(e.into()),
	}
}

fn run_receive(client: SyncClient, config: &InboundConfig, records: &Path) -> Result<()> {
	let records: Vec<ShipmentRecord> = read_json(records)?;
	let store = Arc::new(MemoryRecordStore::with_records(records)?);

	let (dispatcher, receiver) = fetch_queue(config.queue_capacity);
	let worker = ReceiptWorker::start(
		receiver,
		store.clone(),
		client,
		ReceiptWorkerConfig::default(),
	)
	.context("Failed to start receipt worker")?;

	let mut enqueued = 0;
	for record in store.unmatched()? {
		match dispatcher.request(&record) {
			Ok(DispatchOutcome::Enqueued) => enqueued += 1,
			Ok(outcome) => info!(target: "server", record_id = %record.id, ?outcome, "Record skipped"),
			Err(e) => warn!(target: "server", record_id = %record.id, error = %e, "Record not dispatched"),
		}
	}
	info!(target: "server", enqueued, "Receipt fetches dispatched");

	drop(dispatcher);
	worker.join();

	print_json(&store.snapshot()?)
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	inbound_receiving::logging::init_logging()?;

	let config = load_config(cli.config.as_deref())?;
	let client = SyncClient::new(config.credentials.clone(), config.client_config())
		.context("Failed to create client")?;

	info!(target: "server", host = %config.endpoint.host, "Starting inbound");

	match cli.command {
		Commands::Plan { items, keep_going } => run_plan(&client, &config, &items, keep_going),
		Commands::Items { shipment_id } => {
			let listing = client.list_shipment_items(ItemFilter::Shipment(shipment_id))?;
			print_json(&listing.report())
		}
		Commands::Reports {
			max_count,
			acknowledged,
			report_types,
		} => {
			let listing = client.list_reports(ReportFilter {
				max_count,
				acknowledged,
				report_types,
				..ReportFilter::default()
			})?;
			print_json(&listing.report())
		}
		Commands::Receive { records } => run_receive(client, &config, &records),
	}
}
