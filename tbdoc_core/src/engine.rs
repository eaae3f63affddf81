use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::LazyLock;

use serde::Serialize;

use crate::Document;
use crate::Frontmatter;
use crate::Renderable;
use crate::TagDefinition;
use crate::TagRegistry;
use crate::TbdocConfig;
use crate::TbdocResult;
use crate::parse;
use crate::render::to_html;
use crate::transform::transform;

static STANDARD: LazyLock<DocParser> = LazyLock::new(DocParser::default);

/// Options for building a [`DocParser`].
#[derive(Clone, Default)]
pub struct ParserOptions {
	/// Tag definitions merged over the built-in tags. A definition with the
	/// name of a built-in replaces it.
	pub tags: BTreeMap<String, Arc<dyn TagDefinition>>,
}

impl ParserOptions {
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_tag(mut self, name: impl Into<String>, definition: Arc<dyn TagDefinition>) -> Self {
		self.tags.insert(name.into(), definition);
		self
	}
}

impl std::fmt::Debug for ParserOptions {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ParserOptions")
			.field("tags", &self.tags.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Frontmatter paired with the transformed body of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedFile<C> {
	pub frontmatter: Frontmatter,
	pub content: C,
}

/// Parses, transforms and renders Tinybird documentation files.
///
/// The tag registry is fixed at construction, so a parser can be shared
/// freely between threads.
#[derive(Debug, Clone)]
pub struct DocParser {
	registry: TagRegistry,
}

impl Default for DocParser {
	fn default() -> Self {
		Self::new(ParserOptions::default())
	}
}

impl DocParser {
	pub fn new(options: ParserOptions) -> Self {
		let extra = options
			.tags
			.into_iter()
			.fold(TagRegistry::new(), |registry, (name, definition)| {
				registry.with(name, definition)
			});

		Self::with_registry(TagRegistry::builtin().merge(extra))
	}

	/// A parser understanding the built-in tags and those declared in `config`.
	pub fn from_config(config: &TbdocConfig) -> TbdocResult<Self> {
		Ok(Self::with_registry(config.registry()?))
	}

	pub fn with_registry(registry: TagRegistry) -> Self {
		Self { registry }
	}

	/// The shared parser with only the built-in tags.
	pub fn standard() -> &'static DocParser {
		&STANDARD
	}

	pub fn registry(&self) -> &TagRegistry {
		&self.registry
	}

	pub fn parse(&self, content: &str) -> TbdocResult<Document> {
		parse(content)
	}

	pub fn transform(&self, document: &Document) -> TbdocResult<Renderable> {
		transform(document, &self.registry)
	}

	/// Parse, transform and serialize `content` to HTML. Frontmatter is not
	/// rendered.
	pub fn render_html(&self, content: &str) -> TbdocResult<String> {
		let document = self.parse(content)?;
		let tree = self.transform(&document)?;

		Ok(to_html(&tree))
	}

	/// Parse `content` into its decoded frontmatter and renderable tree.
	pub fn parse_file_to_tree(&self, content: &str) -> TbdocResult<ParsedFile<Renderable>> {
		let document = self.parse(content)?;
		let frontmatter = Frontmatter::decode(document.frontmatter.as_deref())?;
		let content = self.transform(&document)?;

		Ok(ParsedFile {
			frontmatter,
			content,
		})
	}

	/// Parse `content` into its decoded frontmatter and rendered HTML.
	pub fn parse_file_to_html(&self, content: &str) -> TbdocResult<ParsedFile<String>> {
		let ParsedFile {
			frontmatter,
			content,
		} = self.parse_file_to_tree(content)?;

		Ok(ParsedFile {
			frontmatter,
			content: to_html(&content),
		})
	}
}
