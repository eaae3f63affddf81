mod common;

use clap::Parser;
use serde_json::Value;
use similar_asserts::assert_eq;
use tbdoc_cli::CheckFormat;
use tbdoc_cli::Commands;
use tbdoc_cli::TbdocCli;
use tbdoc_core::AnyEmptyResult;

#[test]
fn check_passes_for_valid_documents() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("top.tinybird"), common::QUERY_DOC)?;
	std::fs::create_dir_all(tmp.path().join("nested"))?;
	std::fs::write(
		tmp.path().join("nested/events.tinybird"),
		"{% datasource name=\"events\" %}\nid|Int32|/id|identifier\n{% /datasource %}\n",
	)?;
	std::fs::write(tmp.path().join("notes.md"), "{% foo %}\n")?;

	common::tbdoc_cmd()
		.current_dir(tmp.path())
		.arg("check")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("All 2 document(s) are valid."));

	Ok(())
}

#[test]
fn check_fails_for_invalid_documents() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("good.tinybird"), common::QUERY_DOC)?;
	std::fs::write(tmp.path().join("bad.tinybird"), "{% foo name=\"x\" %}{% /foo %}\n")?;

	common::tbdoc_cmd()
		.current_dir(tmp.path())
		.arg("check")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains("bad.tinybird: unknown tag: `foo`"))
		.stdout(predicates::str::contains("1 of 2 document(s) failed."));

	Ok(())
}

#[test]
fn check_json_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("a.tinybird"), "{% query %}\nSELECT 1\n{% /query %}\n")?;
	std::fs::write(tmp.path().join("b.tinybird"), common::QUERY_DOC)?;

	let output = common::tbdoc_cmd()
		.current_dir(tmp.path())
		.arg("check")
		.arg(tmp.path())
		.arg("--format")
		.arg("json")
		.output()?;
	assert_eq!(output.status.code(), Some(1));

	let value: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(value["checked"], 2);
	assert_eq!(value["failures"][0]["path"], "a.tinybird");
	assert_eq!(value["failures"][0]["kind"], "validation");

	Ok(())
}

#[test]
fn check_respects_gitignore() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join(".gitignore"), "drafts/\n")?;
	std::fs::create_dir_all(tmp.path().join("drafts"))?;
	std::fs::write(tmp.path().join("drafts/wip.tinybird"), "{% query name=\"q\" %}\n")?;
	std::fs::write(tmp.path().join("top.tinybird"), common::QUERY_DOC)?;

	common::tbdoc_cmd()
		.current_dir(tmp.path())
		.arg("check")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("All 1 document(s) are valid."));

	Ok(())
}

#[test]
fn check_reports_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("tbdoc.toml"), "[tags.note]\nrender = \"\"\n")?;

	common::tbdoc_cmd()
		.current_dir(tmp.path())
		.arg("check")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("tbdoc::config_parse"));

	Ok(())
}

#[test]
fn verbose_logs_to_stderr() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("events.tinybird"),
		"{% datasource name=\"events\" %}\nid|Int32|/id\nbroken\n{% /datasource %}\n",
	)?;

	common::tbdoc_cmd()
		.current_dir(tmp.path())
		.arg("check")
		.arg("--verbose")
		.assert()
		.success()
		.stderr(predicates::str::contains("skipping datasource row"))
		.stderr(predicates::str::contains("transforming tag"));

	Ok(())
}

#[test]
fn check_command_defaults() {
	let cli = TbdocCli::parse_from(["tbdoc", "check"]);
	match cli.command {
		Some(Commands::Check { dir, format }) => {
			assert_eq!(dir, None);
			assert!(matches!(format, CheckFormat::Text));
		}
		_ => panic!("expected Check command"),
	}

	let cli = TbdocCli::parse_from(["tbdoc", "--no-color", "check", "docs", "--format", "json"]);
	assert!(cli.no_color);
	match cli.command {
		Some(Commands::Check { dir, format }) => {
			assert_eq!(dir.as_deref().and_then(|path| path.to_str()), Some("docs"));
			assert!(matches!(format, CheckFormat::Json));
		}
		_ => panic!("expected Check command"),
	}
}
