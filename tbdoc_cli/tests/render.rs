mod common;

use clap::Parser;
use rstest::rstest;
use serde_json::Value;
use similar_asserts::assert_eq;
use tbdoc_cli::Commands;
use tbdoc_cli::TbdocCli;
use tbdoc_core::AnyEmptyResult;

#[test]
fn render_prints_html() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = tmp.path().join("top.tinybird");
	std::fs::write(&file, common::QUERY_DOC)?;

	let output = common::tbdoc_cmd()
		.current_dir(tmp.path())
		.arg("render")
		.arg(&file)
		.output()?;

	assert!(output.status.success());
	assert_eq!(
		String::from_utf8(output.stdout)?,
		"<article><h1>Top products</h1><pre name=\"q1\"><code \
		 class=\"language-sql\">SELECT 1</code></pre></article>\n"
	);

	Ok(())
}

#[test]
fn render_writes_output_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = tmp.path().join("top.tinybird");
	let output = tmp.path().join("top.html");
	std::fs::write(&file, common::QUERY_DOC)?;

	common::tbdoc_cmd()
		.current_dir(tmp.path())
		.arg("render")
		.arg(&file)
		.arg("--output")
		.arg(&output)
		.assert()
		.success()
		.stderr(predicates::str::contains("Rendered"));

	let html = std::fs::read_to_string(&output)?;
	assert!(html.starts_with("<article><h1>Top products</h1>"));

	Ok(())
}

#[test]
fn render_uses_discovered_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("tbdoc.toml"),
		"[tags.note]\nrender = \"aside\"\n\n[tags.note.attributes.title]\ntype = \
		 \"string\"\ndefault = \"Note\"\n",
	)?;
	let file = tmp.path().join("note.tinybird");
	std::fs::write(&file, "{% note %}\nHello.\n{% /note %}\n")?;

	common::tbdoc_cmd()
		.current_dir(tmp.path())
		.arg("render")
		.arg(&file)
		.assert()
		.success()
		.stdout("<article><aside title=\"Note\"><p>Hello.</p></aside></article>\n");

	Ok(())
}

#[test]
fn render_uses_explicit_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config = tmp.path().join("custom.toml");
	std::fs::write(&config, "[tags.query]\nrender = \"section\"\nbody = \"raw\"\n")?;
	let file = tmp.path().join("top.tinybird");
	std::fs::write(&file, "{% query name=\"q1\" %}\nSELECT 1\n{% /query %}\n")?;

	common::tbdoc_cmd()
		.current_dir(tmp.path())
		.arg("--config")
		.arg(&config)
		.arg("render")
		.arg(&file)
		.assert()
		.success()
		.stdout("<article><section name=\"q1\">SELECT 1</section></article>\n");

	Ok(())
}

#[rstest]
#[case::unknown_tag("{% foo name=\"x\" %}{% /foo %}\n", "tbdoc::unknown_tag")]
#[case::missing_name("{% query %}\nSELECT 1\n{% /query %}\n", "tbdoc::missing_attribute")]
#[case::unclosed("{% query name=\"q\" %}\nSELECT 1\n", "tbdoc::unclosed_tag")]
fn render_reports_diagnostics(#[case] content: &str, #[case] code: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = tmp.path().join("bad.tinybird");
	std::fs::write(&file, content)?;

	common::tbdoc_cmd()
		.current_dir(tmp.path())
		.arg("render")
		.arg(&file)
		.assert()
		.code(2)
		.stderr(predicates::str::contains(code));

	Ok(())
}

#[test]
fn render_missing_file_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::tbdoc_cmd()
		.current_dir(tmp.path())
		.arg("render")
		.arg("missing.tinybird")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to read missing.tinybird"));

	Ok(())
}

#[test]
fn tree_prints_json() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = tmp.path().join("top.tinybird");
	std::fs::write(&file, common::QUERY_DOC)?;

	let output = common::tbdoc_cmd()
		.current_dir(tmp.path())
		.arg("tree")
		.arg(&file)
		.output()?;
	assert!(output.status.success());

	let value: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(value["frontmatter"]["name"], "top_products");
	assert_eq!(value["content"]["element"]["name"], "article");
	assert_eq!(
		value["content"]["element"]["children"][1]["element"]["attributes"]["name"],
		"q1"
	);

	Ok(())
}

#[test]
fn frontmatter_prints_json() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = tmp.path().join("top.tinybird");
	std::fs::write(&file, common::QUERY_DOC)?;

	let output = common::tbdoc_cmd()
		.current_dir(tmp.path())
		.arg("frontmatter")
		.arg(&file)
		.output()?;
	assert!(output.status.success());

	let value: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(
		value,
		serde_json::json!({ "name": "top_products", "type": "pipe" })
	);

	Ok(())
}

#[test]
fn render_command_parses_output_flag() {
	let cli = TbdocCli::parse_from(["tbdoc", "render", "doc.tinybird", "-o", "doc.html"]);
	match cli.command {
		Some(Commands::Render { file, output }) => {
			assert_eq!(file.to_str(), Some("doc.tinybird"));
			assert_eq!(output.as_deref().and_then(|path| path.to_str()), Some("doc.html"));
		}
		_ => panic!("expected Render command"),
	}
}
