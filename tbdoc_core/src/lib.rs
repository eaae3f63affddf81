//! `tbdoc_core` parses Tinybird documentation files: markdown documents with
//! an optional YAML frontmatter block and `{% query %}` / `{% datasource %}`
//! tags. It turns them into a renderable tree, an HTML string and the decoded
//! frontmatter.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Document text
//!   → Parser (frontmatter fence, tag lines tokenized by the lexer, nested into a Document)
//!   → Transformer (tags dispatched through the TagRegistry, markdown converted by markdown-rs)
//!   → Renderer (compact HTML with escaped text and sorted attributes)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Loading extra tag definitions from `tbdoc.toml`.
//! - [`columns`]: Extraction of datasource columns from delimited rows.
//! - [`render`]: The renderable tree and its HTML serialization.
//!
//! ## Key Types
//!
//! - [`DocParser`]: The facade tying parsing, transforming and rendering together.
//! - [`Document`]: A parsed document with raw frontmatter and nested nodes.
//! - [`TagRegistry`]: The tag name to [`TagDefinition`] lookup used while transforming.
//! - [`Renderable`]: A text or element node of the transformed tree.
//! - [`Frontmatter`]: Decoded frontmatter metadata.
//!
//! ## Quick Start
//!
//! ```rust
//! use tbdoc_core::DocParser;
//!
//! let source = "---\nname: top_products\n---\n{% query name=\"q1\" %}\nSELECT 1\n{% /query %}\n";
//! let parsed = DocParser::standard().parse_file_to_html(source).unwrap();
//!
//! assert_eq!(parsed.frontmatter.name(), Some("top_products"));
//! assert_eq!(
//! 	parsed.content,
//! 	"<article><pre name=\"q1\"><code class=\"language-sql\">SELECT 1</code></pre></article>"
//! );
//! ```

pub use attributes::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use frontmatter::*;
pub use parser::*;
pub use position::*;
pub use registry::*;
pub use render::Element;
pub use render::Renderable;
pub use tags::*;

mod attributes;
pub mod columns;
pub mod config;
pub mod content;
mod engine;
#[allow(unused_assignments)]
mod error;
mod frontmatter;
pub(crate) mod lexer;
mod parser;
mod position;
mod registry;
pub mod render;
mod tags;
pub(crate) mod tokens;
pub mod transform;
