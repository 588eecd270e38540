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

use chrono::{DateTime, Utc};

use super::{next_token_of, result_of};
use crate::request::{AccountField, SignedOperation, format_timestamp};
use crate::signing::{EncodingError, QueryParams};
use crate::types::{Page, ReportInfo};
use crate::xml::{Element, ParseError};

const REPORTS_SECTION: &str = "Reports";
const REPORTS_VERSION: &str = "2009-01-01";

/// Filters of a report listing; unset fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
	pub max_count: Option<u32>,
	pub acknowledged: Option<bool>,
	pub available_from: Option<DateTime<Utc>>,
	pub available_to: Option<DateTime<Utc>>,
	pub report_types: Vec<String>,
}

/// First page of the report list
#[derive(Debug, Clone, Default)]
pub struct GetReportList {
	pub filter: ReportFilter,
}

impl GetReportList {
	pub fn new(filter: ReportFilter) -> Self {
		Self { filter }
	}
}

/// Follow-up page of the report list
#[derive(Debug, Clone)]
pub struct GetReportListByNextToken {
	pub next_token: String,
}

impl GetReportListByNextToken {
	pub fn new(next_token: impl Into<String>) -> Self {
		Self {
			next_token: next_token.into(),
		}
	}
}

// The report API is served from the root path, keeps its schema under
// `/doc/{version}/` and names the account `Merchant`.
macro_rules! report_endpoint {
	() => {
		fn section(&self) -> &'static str {
			REPORTS_SECTION
		}

		fn version(&self) -> &'static str {
			REPORTS_VERSION
		}

		fn account_field(&self) -> AccountField {
			AccountField::Merchant
		}

		fn path(&self, _version: &str) -> String {
			"/".to_string()
		}

		fn namespace(&self, ns_host: &str, version: &str) -> String {
			format!("http://{}/doc/{}/", ns_host, version)
		}
	};
}

impl SignedOperation for GetReportList {
	type Output = Page<ReportInfo>;
	const ACTION: &'static str = "GetReportList";

	report_endpoint!();

	fn build_params(&self, params: &mut QueryParams) -> Result<(), EncodingError> {
		let filter = &self.filter;
		if let Some(max_count) = filter.max_count {
			params.insert("MaxCount", max_count)?;
		}
		if let Some(acknowledged) = filter.acknowledged {
			params.insert("Acknowledged", acknowledged)?;
		}
		if let Some(from) = &filter.available_from {
			params.insert("AvailableFromDate", format_timestamp(from))?;
		}
		if let Some(to) = &filter.available_to {
			params.insert("AvailableToDate", format_timestamp(to))?;
		}
		for (index, report_type) in filter.report_types.iter().enumerate() {
			params.insert(format!("ReportTypeList.Type.{}", index + 1), report_type)?;
		}
		Ok(())
	}

	fn parse_response(&self, root: Element<'_, '_>) -> Result<Page<ReportInfo>, ParseError> {
		parse_report_page(result_of::<Self>(root)?)
	}
}

impl SignedOperation for GetReportListByNextToken {
	type Output = Page<ReportInfo>;
	const ACTION: &'static str = "GetReportListByNextToken";

	report_endpoint!();

	fn build_params(&self, params: &mut QueryParams) -> Result<(), EncodingError> {
		params.insert("NextToken", &self.next_token)
	}

	fn parse_response(&self, root: Element<'_, '_>) -> Result<Page<ReportInfo>, ParseError> {
		parse_report_page(result_of::<Self>(root)?)
	}
}

fn parse_report_page(result: Element<'_, '_>) -> Result<Page<ReportInfo>, ParseError> {
	let items = result
		.children("ReportInfo")
		.map(|info| {
			Ok(ReportInfo {
				report_id: info.text_of("ReportId")?,
				report_type: info.text_of("ReportType")?,
				report_request_id: info.text_of("ReportRequestId")?,
				available_date: info.value_of("AvailableDate")?,
				acknowledged: info.value_of("Acknowledged")?,
			})
		})
		.collect::<Result<Vec<_>, ParseError>>()?;

	// A stale token may accompany HasNext=false
	let has_next = result.optional_text_of("HasNext");
	let next_token = match has_next.as_deref() {
		Some("false") => None,
		_ => next_token_of(result),
	};

	Ok(Page { items, next_token })
}
