use std::collections::BTreeMap;

use serde::Serialize;

use crate::AttributeValue;
use crate::OrderedFloat;
use crate::Point;
use crate::Position;
use crate::TbdocError;
use crate::TbdocResult;
use crate::lexer::TagLineSegment;
use crate::lexer::tokenize_tag_line;
use crate::tokens::SpannedToken;
use crate::tokens::Token;
use crate::tokens::TokenGroup;

/// The fence that opens and closes a frontmatter block.
const FRONTMATTER_FENCE: &str = "---";

/// A parsed document: the raw frontmatter and the tree of content and tag
/// nodes that make up the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
	/// The text between the `---` fences, verbatim. `None` when the
	/// document has no frontmatter.
	pub frontmatter: Option<String>,
	/// Top level nodes in source order.
	pub children: Vec<Node>,
}

impl Document {
	/// Every tag node in the document, depth first in source order.
	pub fn tags(&self) -> Vec<&TagNode> {
		let mut tags = Vec::new();
		collect_tags(&self.children, &mut tags);
		tags
	}
}

fn collect_tags<'a>(nodes: &'a [Node], tags: &mut Vec<&'a TagNode>) {
	for node in nodes {
		if let Node::Tag(tag) = node {
			tags.push(tag);
			collect_tags(&tag.children, tags);
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(variant_size_differences)]
pub enum Node {
	/// Untagged text between tags.
	Content(ContentNode),
	Tag(TagNode),
}

/// A run of consecutive lines that are not tags, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentNode {
	pub value: String,
	pub position: Position,
}

/// A `{% name ... %}` block and everything up to its closing tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagNode {
	pub name: String,
	/// Declared attributes. A repeated attribute keeps its last value.
	pub attributes: BTreeMap<String, AttributeValue>,
	pub children: Vec<Node>,
	/// True for `{% name /%}` tags, which have no body.
	pub self_closing: bool,
	/// From the start of the opening tag to the end of the closing tag.
	pub position: Position,
}

/// The meaning of a single tag's token group.
#[derive(Debug, Clone, PartialEq)]
enum TagSyntax {
	Open {
		name: String,
		attributes: BTreeMap<String, AttributeValue>,
		self_closing: bool,
	},
	Close {
		name: String,
	},
}

/// Parse document text into a [`Document`].
///
/// Only the frontmatter fence and the block tag layer are interpreted here.
/// Everything else is kept as verbatim content for the transformer. Tag
/// names are not checked against any registry, so unknown tags parse fine.
pub fn parse(content: impl AsRef<str>) -> TbdocResult<Document> {
	let content = content.as_ref();
	let lines = split_lines(content);
	let (frontmatter, body_start) = extract_frontmatter(&lines)?;
	let children = build_nodes(&lines[body_start..])?;

	Ok(Document {
		frontmatter,
		children,
	})
}

/// A source line (including its line ending) and the point where it starts.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
	text: &'a str,
	start: Point,
}

fn split_lines(content: &str) -> Vec<Line<'_>> {
	let mut point = Point::default();
	let mut lines = Vec::new();

	for text in content.split_inclusive('\n') {
		lines.push(Line { text, start: point });
		point.advance_str(text);
	}

	lines
}

/// Find the frontmatter block at the head of the document. Returns the raw
/// frontmatter and the index of the first body line.
fn extract_frontmatter(lines: &[Line<'_>]) -> TbdocResult<(Option<String>, usize)> {
	let Some(first) = lines.first() else {
		return Ok((None, 0));
	};

	if first.text.trim_end() != FRONTMATTER_FENCE {
		return Ok((None, 0));
	}

	let Some(closing) = lines
		.iter()
		.skip(1)
		.position(|line| line.text.trim_end() == FRONTMATTER_FENCE)
		.map(|index| index + 1)
	else {
		return Err(TbdocError::UnterminatedFrontmatter);
	};

	let raw: String = lines[1..closing].iter().map(|line| line.text).collect();
	let raw = raw.strip_suffix('\n').unwrap_or(&raw);
	let raw = raw.strip_suffix('\r').unwrap_or(raw);

	Ok((Some(raw.to_string()), closing + 1))
}

/// An opening tag whose closing tag has not been seen yet.
struct PendingTag {
	name: String,
	attributes: BTreeMap<String, AttributeValue>,
	start: Point,
	children: Vec<Node>,
}

/// An open fenced code block: its marker run and where it started.
struct OpenFence {
	marker: String,
	start: Point,
}

/// Consecutive content lines waiting to become a `ContentNode`.
struct PendingContent {
	value: String,
	start: Point,
}

/// Builds the node tree line by line with a stack of open tags.
#[derive(Default)]
struct NodeBuilder {
	root: Vec<Node>,
	stack: Vec<PendingTag>,
	content: Option<PendingContent>,
	/// The fenced code block we are in, if any.
	fence: Option<OpenFence>,
}

impl NodeBuilder {
	fn current_children(&mut self) -> &mut Vec<Node> {
		match self.stack.last_mut() {
			Some(tag) => &mut tag.children,
			None => &mut self.root,
		}
	}

	fn push_content_line(&mut self, line: &Line<'_>) {
		self.track_fence(line);

		match &mut self.content {
			Some(content) => content.value.push_str(line.text),
			None => {
				self.content = Some(PendingContent {
					value: line.text.to_string(),
					start: line.start,
				});
			}
		}
	}

	/// Open or close a fenced code block. Tag syntax inside fences is
	/// content.
	fn track_fence(&mut self, line: &Line<'_>) {
		let text = line.text.trim_end();

		if let Some(fence) = &self.fence {
			let closes = fence_rest(text, &fence.marker).is_some_and(|rest| {
				rest.trim_start_matches(|ch: char| fence.marker.starts_with(ch))
					.trim()
					.is_empty()
			});
			if closes {
				self.fence = None;
			}
			return;
		}

		for fence_char in ['`', '~'] {
			let Some(marker) = fence_marker(text, fence_char) else {
				continue;
			};
			self.fence = Some(OpenFence {
				marker,
				start: line.start,
			});
			return;
		}
	}

	fn flush_content(&mut self) {
		let Some(content) = self.content.take() else {
			return;
		};

		if content.value.trim().is_empty() {
			return;
		}

		let value = content.value.strip_suffix('\n').unwrap_or(&content.value);
		let value = value.strip_suffix('\r').unwrap_or(value).to_string();
		let position = Position::spanning(content.start, &value);

		self.current_children()
			.push(Node::Content(ContentNode { value, position }));
	}

	fn push_tag(&mut self, group: &TokenGroup) -> TbdocResult<()> {
		self.flush_content();

		match classify_group(group)? {
			TagSyntax::Open {
				name,
				attributes,
				self_closing: true,
			} => {
				self.current_children().push(Node::Tag(TagNode {
					name,
					attributes,
					children: vec![],
					self_closing: true,
					position: group.position,
				}));
			}
			TagSyntax::Open {
				name,
				attributes,
				self_closing: false,
			} => {
				self.stack.push(PendingTag {
					name,
					attributes,
					start: group.position.start,
					children: vec![],
				});
			}
			TagSyntax::Close { name } => {
				let matches_innermost = self.stack.last().is_some_and(|tag| tag.name == name);
				if !matches_innermost {
					return Err(TbdocError::UnexpectedClosingTag {
						name,
						line: group.position.start.line,
						column: group.position.start.column,
					});
				}

				if let Some(pending) = self.stack.pop() {
					let node = TagNode {
						name: pending.name,
						attributes: pending.attributes,
						children: pending.children,
						self_closing: false,
						position: Position {
							start: pending.start,
							end: group.position.end,
						},
					};
					self.current_children().push(Node::Tag(node));
				}
			}
		}

		Ok(())
	}

	fn finish(mut self) -> TbdocResult<Vec<Node>> {
		self.flush_content();

		if let Some(pending) = self.stack.pop() {
			if let Some(fence) = self.fence {
				return Err(TbdocError::UnclosedCodeFence {
					name: pending.name,
					line: fence.start.line,
					column: fence.start.column,
				});
			}
			return Err(TbdocError::UnclosedTag {
				name: pending.name,
				line: pending.start.line,
				column: pending.start.column,
			});
		}

		Ok(self.root)
	}
}

fn build_nodes(lines: &[Line<'_>]) -> TbdocResult<Vec<Node>> {
	let mut builder = NodeBuilder::default();
	let mut index = 0;

	while index < lines.len() {
		let line = lines[index];

		if builder.fence.is_some() || !line.text.trim_start().starts_with("{%") {
			builder.push_content_line(&line);
			index += 1;
			continue;
		}

		// A tag may spread its attributes over several lines.
		let mut source = line.text.to_string();
		let mut last = index;
		while has_open_tag(&source) && last + 1 < lines.len() {
			last += 1;
			source.push_str(lines[last].text);
		}

		for segment in tokenize_tag_line(&source, line.start)? {
			match segment {
				TagLineSegment::Tag(group) => builder.push_tag(&group)?,
				TagLineSegment::Text { text, .. } if text.trim().is_empty() => {}
				TagLineSegment::Text { text, start } => {
					builder.push_content_line(&Line { text, start });
				}
			}
		}
		index = last + 1;
	}

	builder.finish()
}

/// The text after the indent of a fence line when it starts with `marker`.
/// Four or more spaces of indent make an indented code block, not a fence.
fn fence_rest<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
	let unindented = text.trim_start_matches(' ');
	if text.len() - unindented.len() > 3 {
		return None;
	}
	unindented.strip_prefix(marker)
}

/// The marker run of a line opening a fence of `fence_char`. A backtick
/// fence whose info string holds another backtick is an inline code span.
fn fence_marker(text: &str, fence_char: char) -> Option<String> {
	let unindented = text.trim_start_matches(' ');
	if text.len() - unindented.len() > 3 {
		return None;
	}

	let run = unindented.chars().take_while(|ch| *ch == fence_char).count();
	if run < 3 {
		return None;
	}

	let info = &unindented[run..];
	if fence_char == '`' && info.contains('`') {
		return None;
	}

	Some(fence_char.to_string().repeat(run))
}

/// Whether the last `{%` in `source` has not been closed yet.
fn has_open_tag(source: &str) -> bool {
	source
		.rfind("{%")
		.is_some_and(|open| !source[open..].contains("%}"))
}

fn syntax_error(reason: impl Into<String>, point: Point) -> TbdocError {
	TbdocError::InvalidTagSyntax {
		reason: reason.into(),
		line: point.line,
		column: point.column,
	}
}

/// Classify a token group as an opening or closing tag and extract its name
/// and attributes.
fn classify_group(group: &TokenGroup) -> TbdocResult<TagSyntax> {
	let end = group.position.end;
	let mut iter = group
		.significant()
		.skip_while(|spanned| spanned.token != Token::TagOpen)
		.skip(1);

	match iter.next() {
		Some(SpannedToken {
			token: Token::Slash,
			..
		}) => {
			let name = match iter.next() {
				Some(SpannedToken {
					token: Token::Ident(name),
					..
				}) => name.clone(),
				Some(other) => {
					return Err(syntax_error(
						format!("expected a tag name, found {}", other.token.describe()),
						other.start,
					));
				}
				None => return Err(syntax_error("expected a tag name", end)),
			};

			match iter.next() {
				Some(SpannedToken {
					token: Token::TagClose,
					..
				}) => Ok(TagSyntax::Close { name }),
				Some(other) => {
					Err(syntax_error(
						format!(
							"closing tags take no attributes, found {}",
							other.token.describe()
						),
						other.start,
					))
				}
				None => Err(syntax_error("expected `%}`", end)),
			}
		}
		Some(SpannedToken {
			token: Token::Ident(name),
			..
		}) => {
			let name = name.clone();
			let mut attributes = BTreeMap::new();

			loop {
				match iter.next() {
					Some(SpannedToken {
						token: Token::TagClose,
						..
					}) => {
						return Ok(TagSyntax::Open {
							name,
							attributes,
							self_closing: false,
						});
					}
					Some(SpannedToken {
						token: Token::SelfClose,
						..
					}) => {
						return Ok(TagSyntax::Open {
							name,
							attributes,
							self_closing: true,
						});
					}
					Some(SpannedToken {
						token: Token::Ident(key),
						start,
					}) => {
						let key = key.clone();
						let key_start = *start;
						match iter.next() {
							Some(SpannedToken {
								token: Token::Equals,
								..
							}) => {}
							_ => {
								return Err(syntax_error(
									format!("expected `=` after attribute `{key}`"),
									key_start,
								));
							}
						}
						let value = match iter.next() {
							Some(spanned) => attribute_value(spanned)?,
							None => {
								return Err(syntax_error(
									format!("expected a value for attribute `{key}`"),
									end,
								));
							}
						};
						attributes.insert(key, value);
					}
					Some(other) => {
						return Err(syntax_error(
							format!("expected an attribute, found {}", other.token.describe()),
							other.start,
						));
					}
					None => return Err(syntax_error("expected `%}`", end)),
				}
			}
		}
		Some(other) => {
			Err(syntax_error(
				format!("expected a tag name, found {}", other.token.describe()),
				other.start,
			))
		}
		None => Err(syntax_error("expected a tag name", end)),
	}
}

fn attribute_value(spanned: &SpannedToken) -> TbdocResult<AttributeValue> {
	match &spanned.token {
		Token::String(value, _) => Ok(AttributeValue::String(value.clone())),
		Token::Number(value) => Ok(AttributeValue::Number(OrderedFloat(*value))),
		Token::Ident(ident) if ident == "true" => Ok(AttributeValue::Boolean(true)),
		Token::Ident(ident) if ident == "false" => Ok(AttributeValue::Boolean(false)),
		other => {
			Err(syntax_error(
				format!("expected an attribute value, found {}", other.describe()),
				spanned.start,
			))
		}
	}
}
