use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub const QUERY_DOC: &str = "---\nname: top_products\ntype: pipe\n---\n# Top products\n\n{% query \
                             name=\"q1\" %}\nSELECT 1\n{% /query %}\n";

pub fn tbdoc_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("tbdoc"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}
