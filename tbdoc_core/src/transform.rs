use crate::BodyMode;
use crate::Document;
use crate::Element;
use crate::Node;
use crate::Renderable;
use crate::TagNode;
use crate::TagRegistry;
use crate::TbdocError;
use crate::TbdocResult;
use crate::content::markdown_to_renderables;

/// The element that wraps a transformed document.
pub const ROOT_ELEMENT: &str = "article";

/// Transform a parsed document into a renderable tree rooted at an
/// `article` element.
pub fn transform(document: &Document, registry: &TagRegistry) -> TbdocResult<Renderable> {
	let children = transform_nodes(&document.children, BodyMode::Markdown, registry)?;

	Ok(Element::new(ROOT_ELEMENT).extend_children(children).into())
}

fn transform_nodes(
	nodes: &[Node],
	mode: BodyMode,
	registry: &TagRegistry,
) -> TbdocResult<Vec<Renderable>> {
	let mut output = Vec::with_capacity(nodes.len());

	for node in nodes {
		match node {
			Node::Content(content) => {
				match mode {
					BodyMode::Raw => output.push(Renderable::text(&content.value)),
					BodyMode::Markdown => output.extend(markdown_to_renderables(&content.value)?),
				}
			}
			Node::Tag(tag) => output.push(transform_tag(tag, registry)?),
		}
	}

	Ok(output)
}

/// Resolve the tag's definition and attributes, transform its children and
/// hand everything to the definition.
fn transform_tag(tag: &TagNode, registry: &TagRegistry) -> TbdocResult<Renderable> {
	let Some(definition) = registry.resolve(&tag.name) else {
		return Err(TbdocError::UnknownTag(tag.name.clone()));
	};

	let attributes = definition.schema().resolve(&tag.name, &tag.attributes)?;
	let children = transform_nodes(&tag.children, definition.body(), registry)?;

	tracing::debug!(
		tag = %tag.name,
		line = tag.position.start.line,
		children = children.len(),
		"transforming tag"
	);

	definition.transform(attributes, children)
}
