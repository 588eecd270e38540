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

//! Namespace-scoped XML lookups for response parsing
//!
//! Every lookup goes through an [`Element`] which carries the namespace the
//! document was declared under, so tags from foreign namespaces never match.

use std::str::FromStr;

use thiserror::Error;

/// Error types for response parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
	#[error("Malformed XML: {0}")]
	Malformed(String),
	#[error("Unexpected root element: {0}")]
	UnexpectedRoot(String),
	#[error("Missing element <{tag}> in <{parent}>")]
	MissingElement { parent: String, tag: String },
	#[error("Element <{0}> has no text")]
	EmptyElement(String),
	#[error("Invalid value for <{tag}>: {value}")]
	InvalidValue { tag: String, value: String },
}

/// Parse `body` and hand its root element, scoped to `namespace`, to `f`
///
/// The root element itself must live in `namespace`.
pub fn with_root<T, F>(body: &str, namespace: &str, f: F) -> Result<T, ParseError>
where
	F: FnOnce(Element<'_, '_>) -> Result<T, ParseError>,
{
	let document =
		roxmltree::Document::parse(body).map_err(|e| ParseError::Malformed(e.to_string()))?;
	let root = document.root_element();

	if root.tag_name().namespace() != Some(namespace) {
		return Err(ParseError::UnexpectedRoot(format!(
			"{{{}}}{}",
			root.tag_name().namespace().unwrap_or_default(),
			root.tag_name().name()
		)));
	}

	f(Element {
		node: root,
		namespace,
	})
}

/// Element handle bound to a namespace
#[derive(Clone, Copy)]
pub struct Element<'a, 'input> {
	node: roxmltree::Node<'a, 'input>,
	namespace: &'a str,
}

impl<'a, 'input> Element<'a, 'input> {
	/// Local tag name of this element
	pub fn name(&self) -> &str {
		self.node.tag_name().name()
	}

	fn matches(&self, node: &roxmltree::Node<'a, 'input>, tag: &str) -> bool {
		node.is_element()
			&& node.tag_name().name() == tag
			&& node.tag_name().namespace() == Some(self.namespace)
	}

	fn scoped(&self, node: roxmltree::Node<'a, 'input>) -> Self {
		Self {
			node,
			namespace: self.namespace,
		}
	}

	/// First direct child with the given tag, if any
	pub fn find(&self, tag: &str) -> Option<Self> {
		self.node
			.children()
			.find(|n| self.matches(n, tag))
			.map(|n| self.scoped(n))
	}

	/// First direct child with the given tag, or a parse error
	pub fn child(&self, tag: &str) -> Result<Self, ParseError> {
		self.find(tag).ok_or_else(|| ParseError::MissingElement {
			parent: self.name().to_string(),
			tag: tag.to_string(),
		})
	}

	/// All direct children with the given tag, in document order
	pub fn children(&self, tag: &'a str) -> impl Iterator<Item = Element<'a, 'input>> + '_ {
		self.node
			.children()
			.filter(move |n| self.matches(n, tag))
			.map(|n| self.scoped(n))
	}

	/// Repeated `member` children, in document order
	pub fn members(&self) -> impl Iterator<Item = Element<'a, 'input>> + '_ {
		self.children("member")
	}

	/// Trimmed text content, `None` when empty
	pub fn text(&self) -> Option<&'a str> {
		self.node.text().map(str::trim).filter(|t| !t.is_empty())
	}

	/// Text of a required child element
	pub fn text_of(&self, tag: &str) -> Result<String, ParseError> {
		self.child(tag)?
			.text()
			.map(str::to_string)
			.ok_or_else(|| ParseError::EmptyElement(tag.to_string()))
	}

	/// Text of an optional child element; absent and empty are the same
	pub fn optional_text_of(&self, tag: &str) -> Option<String> {
		self.find(tag)?.text().map(str::to_string)
	}

	/// Parse the text of a required child element
	pub fn value_of<T: FromStr>(&self, tag: &str) -> Result<T, ParseError> {
		let text = self.text_of(tag)?;
		text.parse().map_err(|_| ParseError::InvalidValue {
			tag: tag.to_string(),
			value: text,
		})
	}
}

/// Code and message of a remote error document
///
/// Error bodies are read without namespace scoping since their namespace
/// differs between API sections. Anything unreadable yields `(None, None)`.
pub fn error_details(body: &str) -> (Option<String>, Option<String>) {
	let Ok(document) = roxmltree::Document::parse(body) else {
		return (None, None);
	};

	let error = document
		.descendants()
		.find(|n| n.is_element() && n.tag_name().name() == "Error");
	let Some(error) = error else {
		return (None, None);
	};

	let text_of = |tag: &str| {
		error
			.children()
			.find(|n| n.is_element() && n.tag_name().name() == tag)
			.and_then(|n| n.text())
			.map(|t| t.trim().to_string())
	};

	(text_of("Code"), text_of("Message"))
}
