use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Deserialize;
use serde::Serialize;

/// HTML elements that never have children or a closing tag.
const VOID_ELEMENTS: [&str; 6] = ["br", "hr", "img", "input", "link", "meta"];

/// A node of the renderable tree produced by the semantic transformer.
///
/// The tree is free of custom tags: every node is either text or a plain
/// HTML element, ready to be serialized with [`to_html`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(variant_size_differences)]
pub enum Renderable {
	/// Unescaped text. Escaping happens during serialization.
	Text(String),
	Element(Element),
}

impl Renderable {
	pub fn text(value: impl Into<String>) -> Self {
		Self::Text(value.into())
	}

	pub fn as_element(&self) -> Option<&Element> {
		match self {
			Self::Element(element) => Some(element),
			Self::Text(_) => None,
		}
	}

	/// Concatenated text of this node and all of its descendants.
	pub fn text_content(&self) -> String {
		let mut buf = String::new();
		self.collect_text(&mut buf);
		buf
	}

	fn collect_text(&self, buf: &mut String) {
		match self {
			Self::Text(value) => buf.push_str(value),
			Self::Element(element) => {
				for child in &element.children {
					child.collect_text(buf);
				}
			}
		}
	}

	/// Append every text leaf under this node to `texts`, in document order.
	pub fn collect_text_nodes<'a>(&'a self, texts: &mut Vec<&'a str>) {
		match self {
			Self::Text(value) => texts.push(value),
			Self::Element(element) => {
				for child in &element.children {
					child.collect_text_nodes(texts);
				}
			}
		}
	}
}

impl From<Element> for Renderable {
	fn from(element: Element) -> Self {
		Self::Element(element)
	}
}

/// An HTML element with its attributes and children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
	pub name: String,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub attributes: BTreeMap<String, String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<Renderable>,
}

impl Element {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Default::default()
		}
	}

	#[must_use]
	pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	#[must_use]
	pub fn extend_attributes(
		mut self,
		attributes: impl IntoIterator<Item = (String, String)>,
	) -> Self {
		self.attributes.extend(attributes);
		self
	}

	#[must_use]
	pub fn child(mut self, child: impl Into<Renderable>) -> Self {
		self.children.push(child.into());
		self
	}

	#[must_use]
	pub fn extend_children(mut self, children: impl IntoIterator<Item = Renderable>) -> Self {
		self.children.extend(children);
		self
	}

	/// Shorthand for an element whose only child is a text node.
	pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
		Self::new(name).child(Renderable::text(text))
	}

	/// Direct child elements with the given name.
	pub fn find_children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
		self.children
			.iter()
			.filter_map(Renderable::as_element)
			.filter(move |element| element.name == name)
	}
}

/// Serialize a renderable tree to an HTML string.
pub fn to_html(node: &Renderable) -> String {
	let mut buf = String::new();
	write_node(node, &mut buf);
	buf
}

fn write_node(node: &Renderable, buf: &mut String) {
	match node {
		Renderable::Text(value) => buf.push_str(&escape_html(value)),
		Renderable::Element(element) => write_element(element, buf),
	}
}

fn write_element(element: &Element, buf: &mut String) {
	let _ = write!(buf, "<{}", element.name);

	for (name, value) in &element.attributes {
		let _ = write!(buf, " {}=\"{}\"", name, escape_html(value));
	}

	buf.push('>');

	if VOID_ELEMENTS.contains(&element.name.as_str()) {
		return;
	}

	for child in &element.children {
		write_node(child, buf);
	}

	let _ = write!(buf, "</{}>", element.name);
}

/// Escape HTML special characters.
pub fn escape_html(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());

	for ch in value.chars() {
		match ch {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			_ => escaped.push(ch),
		}
	}

	escaped
}
