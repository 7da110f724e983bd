// CLI integration tests for the stream filter.
use std::io::Write as _;
use std::process::{Command, Output, Stdio};

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_dictsort");
    Command::new(exe)
}

fn filter_stdin(input: &[u8]) -> Output {
    let mut child = cmd()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .as_mut()
        .expect("stdin")
        .write_all(input)
        .expect("write stdin");
    child.wait_with_output().expect("wait")
}

#[test]
fn sorts_dict_span_keys() {
    let output = filter_stdin(b"result: {'b': 2, 'a': 1}\n");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"result: {'a': 1, 'b': 2}\n".to_vec());
    assert!(output.stderr.is_empty());
}

#[test]
fn passes_plain_text_through() {
    let output = filter_stdin(b"plain text, no braces\n");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"plain text, no braces\n".to_vec());
}

#[test]
fn passes_unparsable_span_through() {
    let output = filter_stdin(b"{not valid syntax here}\n");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"{not valid syntax here}\n".to_vec());
}

#[test]
fn empty_input_produces_empty_output() {
    let output = filter_stdin(b"");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn is_idempotent_on_its_own_output() {
    let first = filter_stdin(b"r: {'b': [1, {'d': 2, 'c': 3}], 'a': None}\n");
    assert!(first.status.success());
    let second = filter_stdin(&first.stdout);
    assert!(second.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn file_operands_concatenate_in_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    let first = temp.path().join("first.log");
    let second = temp.path().join("second.log");
    std::fs::write(&first, "one {'b': 2, 'a': 1}\n").expect("write first");
    std::fs::write(&second, "two {'d': 4, 'c': 3}\n").expect("write second");

    let output = cmd()
        .args([first.to_str().unwrap(), second.to_str().unwrap()])
        .output()
        .expect("run");
    assert!(output.status.success());
    assert_eq!(
        output.stdout,
        b"one {'a': 1, 'b': 2}\ntwo {'c': 3, 'd': 4}\n".to_vec()
    );
}

#[test]
fn missing_file_is_an_io_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let missing = temp.path().join("missing.log");

    let output = cmd()
        .arg(missing.to_str().unwrap())
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let value: serde_json::Value =
        serde_json::from_str(stderr.lines().next().expect("stderr line")).expect("error json");
    assert_eq!(
        value["error"]["kind"].as_str(),
        Some("Io"),
        "stderr was: {stderr}"
    );
    assert!(value["error"]["path"].as_str().is_some());
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let output = cmd().arg("--definitely-not-a-flag").output().expect("run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let value: serde_json::Value =
        serde_json::from_str(stderr.lines().next().expect("stderr line")).expect("error json");
    assert_eq!(value["error"]["kind"].as_str(), Some("Usage"));
}

#[test]
fn completions_flag_emits_a_script() {
    let output = cmd().args(["--completions", "bash"]).output().expect("run");
    assert!(output.status.success());
    let script = String::from_utf8_lossy(&output.stdout);
    assert!(script.contains("dictsort"));
}

#[test]
fn help_and_version_exit_zero() {
    let help = cmd().arg("--help").output().expect("run");
    assert!(help.status.success());
    assert!(String::from_utf8_lossy(&help.stdout).contains("USAGE"));

    let version = cmd().arg("--version").output().expect("run");
    assert!(version.status.success());
    assert!(String::from_utf8_lossy(&version.stdout).contains("dictsort"));
}

#[test]
fn non_utf8_bytes_survive_the_pipe() {
    let output = filter_stdin(b"\xff raw {'b': 1, 'a': 2}\n");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"\xff raw {'a': 2, 'b': 1}\n".to_vec());
}
