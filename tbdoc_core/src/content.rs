use markdown::ParseOptions;
use markdown::mdast::AlignKind;
use markdown::mdast::Node;
use markdown::to_mdast;

use crate::Element;
use crate::Renderable;
use crate::TbdocError;
use crate::TbdocResult;

/// Convert untagged markdown content into renderable nodes.
///
/// Tokenizing is left to markdown-rs with GFM enabled. Raw HTML is kept as
/// text so that it is escaped on output, which matches markdown-rs's own
/// safe default.
pub fn markdown_to_renderables(content: &str) -> TbdocResult<Vec<Renderable>> {
	let options = ParseOptions::gfm();
	let root = to_mdast(content, &options).map_err(|e| TbdocError::Markdown(e.to_string()))?;
	let mut output = Vec::new();
	convert_node(&root, false, &mut output);

	Ok(output)
}

fn convert_children(nodes: &[Node], tight: bool) -> Vec<Renderable> {
	let mut output = Vec::new();
	for node in nodes {
		convert_node(node, tight, &mut output);
	}
	output
}

fn element(name: &str, nodes: &[Node]) -> Renderable {
	Element::new(name)
		.extend_children(convert_children(nodes, false))
		.into()
}

/// Convert a single mdast node, appending the result to `output`. `tight`
/// is set for the content of tight list items, whose paragraphs are unwrapped.
fn convert_node(node: &Node, tight: bool, output: &mut Vec<Renderable>) {
	match node {
		Node::Root(root) => output.extend(convert_children(&root.children, false)),
		Node::Paragraph(paragraph) if tight => {
			output.extend(convert_children(&paragraph.children, false));
		}
		Node::Paragraph(paragraph) => output.push(element("p", &paragraph.children)),
		Node::Heading(heading) => {
			output.push(element(&format!("h{}", heading.depth), &heading.children));
		}
		Node::Text(text) => output.push(Renderable::text(&text.value)),
		Node::Emphasis(emphasis) => output.push(element("em", &emphasis.children)),
		Node::Strong(strong) => output.push(element("strong", &strong.children)),
		Node::Delete(delete) => output.push(element("del", &delete.children)),
		Node::InlineCode(code) => output.push(Element::with_text("code", &code.value).into()),
		Node::Code(code) => {
			let mut inner = Element::with_text("code", &code.value);
			if let Some(lang) = &code.lang {
				inner = inner.attribute("class", format!("language-{lang}"));
			}
			output.push(Element::new("pre").child(inner).into());
		}
		Node::Blockquote(quote) => output.push(element("blockquote", &quote.children)),
		Node::List(list) => {
			let mut list_element = Element::new(if list.ordered { "ol" } else { "ul" });
			if let Some(start) = list.start.filter(|start| list.ordered && *start != 1) {
				list_element = list_element.attribute("start", start.to_string());
			}
			for item in &list.children {
				let Node::ListItem(item) = item else {
					convert_node(item, !list.spread, &mut list_element.children);
					continue;
				};
				let mut li = Element::new("li");
				if let Some(checked) = item.checked {
					let mut checkbox = Element::new("input")
						.attribute("type", "checkbox")
						.attribute("disabled", "");
					if checked {
						checkbox = checkbox.attribute("checked", "");
					}
					li = li.child(checkbox);
				}
				list_element
					.children
					.push(li.extend_children(convert_children(&item.children, !list.spread)).into());
			}
			output.push(list_element.into());
		}
		Node::Link(link) => {
			let mut anchor = Element::new("a").attribute("href", &link.url);
			if let Some(title) = &link.title {
				anchor = anchor.attribute("title", title);
			}
			output.push(anchor.extend_children(convert_children(&link.children, false)).into());
		}
		Node::Image(image) => {
			let mut img = Element::new("img")
				.attribute("src", &image.url)
				.attribute("alt", &image.alt);
			if let Some(title) = &image.title {
				img = img.attribute("title", title);
			}
			output.push(img.into());
		}
		Node::Break(_) => output.push(Element::new("br").into()),
		Node::ThematicBreak(_) => output.push(Element::new("hr").into()),
		Node::Table(table) => output.push(convert_table(&table.children, &table.align)),
		Node::Html(html) => output.push(Renderable::text(&html.value)),
		Node::Definition(_) | Node::Yaml(_) | Node::Toml(_) => {}
		other => {
			match other.children() {
				Some(children) => output.extend(convert_children(children, tight)),
				None => output.push(Renderable::text(other.to_string())),
			}
		}
	}
}

fn convert_table(rows: &[Node], align: &[AlignKind]) -> Renderable {
	let mut rows = rows.iter().map(|row| row.children().map_or(&[][..], Vec::as_slice));

	let head = rows
		.next()
		.map(|cells| convert_row(cells, "th", align))
		.map(|row| Element::new("thead").child(row));
	let body: Vec<Renderable> = rows
		.map(|cells| Renderable::from(convert_row(cells, "td", align)))
		.collect();

	let mut table = Element::new("table");
	if let Some(head) = head {
		table = table.child(head);
	}
	if !body.is_empty() {
		table = table.child(Element::new("tbody").extend_children(body));
	}

	table.into()
}

fn convert_row(cells: &[Node], cell_name: &str, align: &[AlignKind]) -> Element {
	let cells = cells.iter().enumerate().map(|(index, cell)| {
		let mut cell_element = Element::new(cell_name);
		let alignment = match align.get(index) {
			Some(AlignKind::Left) => Some("left"),
			Some(AlignKind::Right) => Some("right"),
			Some(AlignKind::Center) => Some("center"),
			Some(AlignKind::None) | None => None,
		};
		if let Some(alignment) = alignment {
			cell_element = cell_element.attribute("align", alignment);
		}
		let children = cell.children().map_or(&[][..], Vec::as_slice);
		Renderable::from(cell_element.extend_children(convert_children(children, false)))
	});

	Element::new("tr").extend_children(cells)
}
