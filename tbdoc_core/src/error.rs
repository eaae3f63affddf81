use miette::Diagnostic;
use thiserror::Error;

/// Broad classification of a [`TbdocError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
	/// The document could not be tokenized.
	Syntax,
	/// A tag attribute is missing or has the wrong type.
	Validation,
	/// A tag has no registered definition.
	UnknownTag,
	/// The frontmatter block is not a valid mapping.
	Frontmatter,
	/// The configuration file is invalid.
	Config,
	/// Reading or writing a file failed.
	Io,
}

impl ErrorKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Syntax => "syntax",
			Self::Validation => "validation",
			Self::UnknownTag => "unknown_tag",
			Self::Frontmatter => "frontmatter",
			Self::Config => "config",
			Self::Io => "io",
		}
	}
}

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TbdocError {
	#[error(transparent)]
	#[diagnostic(code(tbdoc::io_error))]
	Io(#[from] std::io::Error),

	#[error("failure to parse markdown: {0}")]
	#[diagnostic(code(tbdoc::markdown))]
	Markdown(String),

	#[error("unterminated frontmatter block")]
	#[diagnostic(
		code(tbdoc::unterminated_frontmatter),
		help("close the frontmatter with a line containing only `---`")
	)]
	UnterminatedFrontmatter,

	#[error("unterminated tag starting at {line}:{column}")]
	#[diagnostic(
		code(tbdoc::unterminated_tag),
		help("end the tag with `%}}` or `/%}}`")
	)]
	UnterminatedTag { line: usize, column: usize },

	#[error("invalid tag syntax at {line}:{column}: {reason}")]
	#[diagnostic(code(tbdoc::invalid_tag_syntax))]
	InvalidTagSyntax {
		reason: String,
		line: usize,
		column: usize,
	},

	#[error("missing closing tag for `{name}` opened at {line}:{column}")]
	#[diagnostic(
		code(tbdoc::unclosed_tag),
		help("add `{{% /{name} %}}` to close this tag")
	)]
	UnclosedTag {
		name: String,
		line: usize,
		column: usize,
	},

	#[error("code fence opened at {line}:{column} is never closed inside tag `{name}`")]
	#[diagnostic(
		code(tbdoc::unclosed_code_fence),
		help("close the code fence before `{{% /{name} %}}`")
	)]
	UnclosedCodeFence {
		name: String,
		line: usize,
		column: usize,
	},

	#[error("unexpected closing tag `{name}` at {line}:{column}")]
	#[diagnostic(
		code(tbdoc::unexpected_closing_tag),
		help("closing tags must match the innermost open tag")
	)]
	UnexpectedClosingTag {
		name: String,
		line: usize,
		column: usize,
	},

	#[error("tag `{tag}` is missing required attribute `{attribute}`")]
	#[diagnostic(code(tbdoc::missing_attribute))]
	MissingAttribute { tag: String, attribute: String },

	#[error("attribute `{attribute}` of tag `{tag}` must be a {expected}, found {found}")]
	#[diagnostic(code(tbdoc::invalid_attribute_type))]
	InvalidAttributeType {
		tag: String,
		attribute: String,
		expected: String,
		found: String,
	},

	#[error("attribute `{attribute}` of tag `{tag}` is invalid: {reason}")]
	#[diagnostic(code(tbdoc::invalid_attribute_value))]
	InvalidAttributeValue {
		tag: String,
		attribute: String,
		reason: String,
	},

	#[error("unknown tag: `{0}`")]
	#[diagnostic(
		code(tbdoc::unknown_tag),
		help("built-in tags are `query` and `datasource`; define others in tbdoc.toml")
	)]
	UnknownTag(String),

	#[error("failed to decode frontmatter: {0}")]
	#[diagnostic(
		code(tbdoc::frontmatter),
		help("frontmatter must be a YAML mapping of `key: value` lines")
	)]
	FrontmatterDecode(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(tbdoc::config_parse),
		help("check that tbdoc.toml is valid TOML with `[tags.<name>]` sections")
	)]
	ConfigParse(String),
}

impl TbdocError {
	/// The broad category this error belongs to.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Io(_) => ErrorKind::Io,
			Self::Markdown(_)
			| Self::UnterminatedFrontmatter
			| Self::UnterminatedTag { .. }
			| Self::InvalidTagSyntax { .. }
			| Self::UnclosedTag { .. }
			| Self::UnclosedCodeFence { .. }
			| Self::UnexpectedClosingTag { .. } => ErrorKind::Syntax,
			Self::MissingAttribute { .. }
			| Self::InvalidAttributeType { .. }
			| Self::InvalidAttributeValue { .. } => ErrorKind::Validation,
			Self::UnknownTag(_) => ErrorKind::UnknownTag,
			Self::FrontmatterDecode(_) => ErrorKind::Frontmatter,
			Self::ConfigParse(_) => ErrorKind::Config,
		}
	}
}

pub type TbdocResult<T> = Result<T, TbdocError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
