use assert_cmd::Command;

fn bookclub() -> Command {
    let mut cmd = Command::cargo_bin("bookclub").unwrap();
    cmd.env_remove("BOOKCLUB_API_URL").env_remove("RUST_LOG");
    cmd
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn help_lists_commands() {
    let output = bookclub().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["list", "show", "add", "edit", "delete", "shell"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn add_without_title_fails_before_any_request() {
    // Port 9 is discard; reaching the network would surface a fetch banner instead.
    let output = bookclub()
        .args(["--api-url", "http://127.0.0.1:9", "add", "--author", "Frank Herbert"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("title is required"), "{stderr}");
    assert!(!stderr.contains("Failed to fetch books"), "{stderr}");
}

#[test]
fn unreachable_server_reports_fetch_banner() {
    let output = bookclub()
        .args(["--api-url", "http://127.0.0.1:9", "list"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = stderr(&output);
    assert!(
        stderr.contains("Failed to fetch books. Please try again later."),
        "{stderr}"
    );
}

#[test]
fn edit_requires_at_least_one_field() {
    let output = bookclub()
        .args(["--api-url", "http://127.0.0.1:9", "edit", "some-id"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("nothing to change"));
}

#[test]
fn shell_runs_by_default_and_quits() {
    let output = bookclub()
        .args(["--api-url", "http://127.0.0.1:9"])
        .write_stdin("help\nquit\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("commands:"));
    assert!(stderr(&output).contains("Failed to fetch books"));
}
