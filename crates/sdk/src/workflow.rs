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

//! Two-phase shipment creation
//!
//! Phase one asks for a shipment plan for all items. Phase two creates one
//! shipment per plan result, each carrying only that plan's products.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::client::{Client, ClientError, SyncClient};
use crate::transport::Transport;
use crate::types::{Address, PlanItem, ShipmentResult};

/// Error types for the shipment workflow
#[derive(Debug, Error)]
pub enum WorkflowError {
	#[error("Shipment plan failed: {0}")]
	Plan(#[source] ClientError),
	#[error("Creating shipment {shipment_id} failed: {source}")]
	ShipmentAborted {
		shipment_id: String,
		/// Shipments created before the failure
		created: Vec<ShipmentResult>,
		#[source]
		source: ClientError,
	},
}

/// What to do when one shipment of a plan cannot be created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
	/// Stop at the first failure
	#[default]
	Abort,
	/// Record the failure and create the remaining shipments
	Continue,
}

/// A plan result whose shipment could not be created
#[derive(Debug)]
pub struct FailedShipment {
	pub shipment_id: String,
	pub destination_center_id: String,
	pub error: ClientError,
}

#[derive(Debug, Default)]
pub struct WorkflowOutcome {
	pub shipments: Vec<ShipmentResult>,
	pub failed: Vec<FailedShipment>,
}

impl WorkflowOutcome {
	pub fn is_complete(&self) -> bool {
		self.failed.is_empty()
	}
}

/// Plan-then-create workflow bound to one client and origin address
pub struct ShipmentWorkflow<'a, T> {
	client: &'a Client<T>,
	origin: Address,
	policy: FailurePolicy,
}

impl<'a, T: Transport> ShipmentWorkflow<'a, T> {
	pub fn new(client: &'a Client<T>, origin: Address) -> Self {
		Self {
			client,
			origin,
			policy: FailurePolicy::default(),
		}
	}

	pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn policy(&self) -> FailurePolicy {
		self.policy
	}

	/// Plan `items` and create every planned shipment
	pub async fn create_shipments(&self, items: &[PlanItem]) -> Result<WorkflowOutcome, WorkflowError> {
		if items.is_empty() {
			return Ok(WorkflowOutcome::default());
		}

		let plans = self
			.client
			.create_shipment_plan(&self.origin, items)
			.await
			.map_err(|e| {
				warn!(target: "workflow", items = items.len(), error = %e, "Shipment plan failed");
				WorkflowError::Plan(e)
			})?;
		info!(target: "workflow", items = items.len(), plans = plans.len(), "Shipment plan received");

		let mut outcome = WorkflowOutcome::default();
		for plan in plans {
			match self.client.create_shipment(&plan, &self.origin).await {
				Ok(mut shipment) => {
					info!(
						target: "workflow",
						shipment_id = %shipment.shipment_id,
						destination = %plan.destination_center_id,
						products = plan.products.len(),
						"Shipment created"
					);
					shipment.products = Some(plan.products);
					outcome.shipments.push(shipment);
				}
				Err(error) => {
					warn!(
						target: "workflow",
						shipment_id = %plan.shipment_id,
						policy = ?self.policy,
						error = %error,
						"Shipment creation failed"
					);
					match self.policy {
						FailurePolicy::Abort => {
							return Err(WorkflowError::ShipmentAborted {
								shipment_id: plan.shipment_id,
								created: outcome.shipments,
								source: error,
							});
						}
						FailurePolicy::Continue => outcome.failed.push(FailedShipment {
							shipment_id: plan.shipment_id,
							destination_center_id: plan.destination_center_id,
							error,
						}),
					}
				}
			}
		}

		Ok(outcome)
	}
}

impl<T: Transport> SyncClient<T> {
	/// Plan and create shipments (synchronous)
	pub fn create_shipments(
		&self,
		origin: &Address,
		items: &[PlanItem],
		policy: FailurePolicy,
	) -> Result<WorkflowOutcome, WorkflowError> {
		let workflow = ShipmentWorkflow::new(self.client(), origin.clone()).with_policy(policy);
		self.block_on(workflow.create_shipments(items))
	}
}
