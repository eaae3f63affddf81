use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use ignore::WalkBuilder;
use owo_colors::OwoColorize;
use serde::Serialize;
use tbdoc_cli::CheckFormat;
use tbdoc_cli::Commands;
use tbdoc_cli::TbdocCli;
use tbdoc_core::DocParser;
use tbdoc_core::TbdocConfig;
use tbdoc_core::TbdocError;
use tracing_subscriber::EnvFilter;

/// File extension of the documents `check` looks for.
const DOCUMENT_EXTENSION: &str = "tinybird";

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
	let args = TbdocCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Render { file, output }) => run_render(&args, file, output.as_deref()),
		Some(Commands::Tree { file }) => run_tree(&args, file),
		Some(Commands::Frontmatter { file }) => run_frontmatter(file),
		Some(Commands::Check { dir, format }) => run_check(&args, dir.as_deref(), *format),
		None => {
			eprintln!("No subcommand specified. Run `tbdoc --help` for usage.");
			process::exit(1);
		}
	};

	match result {
		Ok(true) => {}
		Ok(false) => process::exit(1),
		Err(e) => {
			// Render library errors through miette for help text and codes.
			match e.downcast::<TbdocError>() {
				Ok(tbdoc_err) => {
					let report: miette::Report = (*tbdoc_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(2);
		}
	}
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

/// Build the parser from `--config`, or from a config discovered in the
/// current directory, or with only the built-in tags.
fn load_parser(args: &TbdocCli) -> CliResult<DocParser> {
	let config = match &args.config {
		Some(path) => Some(TbdocConfig::load_file(path)?),
		None => {
			let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
			TbdocConfig::load(&cwd)?
		}
	};

	match config {
		Some(config) => {
			let parser = DocParser::from_config(&config)?;
			tracing::debug!(tags = ?parser.registry(), "loaded configured tags");
			Ok(parser)
		}
		None => Ok(DocParser::standard().clone()),
	}
}

fn read_document(path: &Path) -> CliResult<String> {
	std::fs::read_to_string(path)
		.map_err(|e| format!("failed to read {}: {e}", path.display()).into())
}

fn run_render(args: &TbdocCli, file: &Path, output: Option<&Path>) -> CliResult<bool> {
	let parser = load_parser(args)?;
	let content = read_document(file)?;
	let parsed = parser.parse_file_to_html(&content)?;

	match output {
		Some(output) => {
			std::fs::write(output, &parsed.content)?;
			eprintln!(
				"{} {}",
				colored!("Rendered", green),
				output.display()
			);
		}
		None => println!("{}", parsed.content),
	}

	Ok(true)
}

fn run_tree(args: &TbdocCli, file: &Path) -> CliResult<bool> {
	let parser = load_parser(args)?;
	let content = read_document(file)?;
	let parsed = parser.parse_file_to_tree(&content)?;

	println!("{}", serde_json::to_string_pretty(&parsed)?);

	Ok(true)
}

fn run_frontmatter(file: &Path) -> CliResult<bool> {
	let content = read_document(file)?;
	let document = tbdoc_core::parse(&content)?;
	let frontmatter = tbdoc_core::Frontmatter::decode(document.frontmatter.as_deref())?;

	println!("{}", serde_json::to_string_pretty(&frontmatter)?);

	Ok(true)
}

#[derive(Debug, Serialize)]
struct CheckReport {
	checked: usize,
	failures: Vec<CheckFailure>,
}

#[derive(Debug, Serialize)]
struct CheckFailure {
	path: PathBuf,
	kind: &'static str,
	message: String,
}

/// Collect the documents under `root`, honouring `.gitignore` files.
fn find_documents(root: &Path) -> CliResult<Vec<PathBuf>> {
	let mut documents = Vec::new();

	for entry in WalkBuilder::new(root).require_git(false).build() {
		let entry = entry?;
		let is_document = entry.file_type().is_some_and(|kind| kind.is_file())
			&& entry
				.path()
				.extension()
				.is_some_and(|extension| extension == DOCUMENT_EXTENSION);
		if is_document {
			documents.push(entry.into_path());
		}
	}

	documents.sort();
	Ok(documents)
}

fn run_check(args: &TbdocCli, dir: Option<&Path>, format: CheckFormat) -> CliResult<bool> {
	let parser = load_parser(args)?;
	let root = dir.map_or_else(|| PathBuf::from("."), Path::to_path_buf);
	let documents = find_documents(&root)?;

	let mut report = CheckReport {
		checked: documents.len(),
		failures: Vec::new(),
	};

	for path in documents {
		let content = read_document(&path)?;
		if let Err(error) = parser.parse_file_to_html(&content) {
			tracing::debug!(path = %path.display(), %error, "document failed");
			let relative = path.strip_prefix(&root).map(Path::to_path_buf).unwrap_or(path);
			report.failures.push(CheckFailure {
				path: relative,
				kind: error.kind().as_str(),
				message: error.to_string(),
			});
		}
	}

	match format {
		CheckFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
		CheckFormat::Text => print_check_report(&report),
	}

	Ok(report.failures.is_empty())
}

fn print_check_report(report: &CheckReport) {
	for failure in &report.failures {
		println!(
			"{} {}: {}",
			colored!("error:", red),
			colored!(failure.path.display(), bold),
			failure.message
		);
	}

	if report.failures.is_empty() {
		println!(
			"{}",
			colored!(
				format!("All {} document(s) are valid.", report.checked),
				green
			)
		);
	} else {
		println!(
			"\n{} of {} document(s) failed.",
			report.failures.len(),
			report.checked
		);
	}
}
