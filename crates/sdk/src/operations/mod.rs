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

//! Remote actions
//!
//! One struct per action. Each implements [`SignedOperation`]: it writes its
//! own parameters and parses its own `<Action>Result` element.

mod inbound;
mod reports;

pub use inbound::{
	CreateInboundShipment, CreateInboundShipmentPlan, ItemFilter, LabelPrepPreference,
	ListInboundShipmentItems, ListInboundShipmentItemsByNextToken, ShipmentStatus,
};
pub use reports::{GetReportList, GetReportListByNextToken, ReportFilter};

use crate::request::SignedOperation;
use crate::signing::{EncodingError, QueryParams};
use crate::types::Address;
use crate::xml::{Element, ParseError};

/// Write an address under `prefix` (`{prefix}.Name`, `{prefix}.City`, ...)
pub(crate) fn put_address(
	params: &mut QueryParams,
	prefix: &str,
	address: &Address,
) -> Result<(), EncodingError> {
	params.insert(format!("{prefix}.Name"), &address.name)?;
	params.insert(format!("{prefix}.AddressLine1"), &address.address_line1)?;
	params.insert(format!("{prefix}.City"), &address.city)?;
	params.insert(
		format!("{prefix}.StateOrProvinceCode"),
		&address.state_or_province_code,
	)?;
	params.insert(format!("{prefix}.PostalCode"), &address.postal_code)?;
	params.insert(format!("{prefix}.CountryCode"), &address.country_code)?;
	Ok(())
}

/// The `<Action>Result` child of a response root
pub(crate) fn result_of<'a, 'input, O: SignedOperation>(
	root: Element<'a, 'input>,
) -> Result<Element<'a, 'input>, ParseError> {
	root.child(&format!("{}Result", O::ACTION))
}

/// Continuation token of a list result; empty and absent are the same
pub(crate) fn next_token_of(result: Element<'_, '_>) -> Option<String> {
	result.optional_text_of("NextToken")
}
