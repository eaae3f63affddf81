use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Render and check Tinybird documentation files.",
	long_about = "tbdoc parses Tinybird documentation files: markdown with YAML frontmatter and \
	              `{% query %}` / `{% datasource %}` tags.\n\nQuick start:\n  tbdoc render \
	              docs/events.tinybird  Print the HTML of a document\n  tbdoc tree \
	              docs/events.tinybird    Print frontmatter and the renderable tree as JSON\n  \
	              tbdoc check docs                    Verify every document in a directory"
)]
pub struct TbdocCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to a `tbdoc.toml` config file. Defaults to the first of
	/// `tbdoc.toml`, `.tbdoc.toml` and `.config/tbdoc.toml` in the current
	/// directory.
	#[arg(long, short, global = true)]
	pub config: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Render a document to HTML.
	///
	/// The frontmatter is decoded and validated but not part of the output.
	Render {
		/// The document to render.
		file: PathBuf,

		/// Write the HTML to this file instead of stdout.
		#[arg(long, short)]
		output: Option<PathBuf>,
	},
	/// Print the frontmatter and renderable tree of a document as JSON.
	Tree {
		/// The document to transform.
		file: PathBuf,
	},
	/// Print the decoded frontmatter of a document as JSON.
	Frontmatter {
		/// The document to read.
		file: PathBuf,
	},
	/// Check that every `*.tinybird` document under a directory parses and
	/// transforms.
	///
	/// The walk respects `.gitignore`. Exits with a non-zero status code when
	/// any document fails, which makes it suitable for CI pipelines.
	Check {
		/// The directory to scan. Defaults to the current directory.
		dir: Option<PathBuf>,

		/// Output format for check results. Use `text` for human-readable
		/// output or `json` for programmatic consumption.
		#[arg(long, value_enum, default_value_t = CheckFormat::Text)]
		format: CheckFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CheckFormat {
	Text,
	Json,
}
