use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_path-defence"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run the path-defence binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn short_session_keeps_running() {
    let output = run(&["--frames", "10", "--tower", "3,5"]);
    assert!(output.status.success());

    let stdout = stdout(&output);
    assert!(stdout.starts_with("Welcome to Path Defence."));
    assert!(stdout.contains("Field 16x12 (640 by 480 units), path of 2 waypoints over 16 cells."));
    assert!(stdout.contains("Starting money 150, towers: Basic Tower 50, Advanced Tower 100."));
    assert!(
        stdout.contains("Still defending after 0 seconds with 10 of 10 lives, 100 money"),
        "unexpected summary: {stdout}"
    );
}

#[test]
fn sprint_config_ends_the_session_on_the_first_tick() {
    let fixture = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sprint.toml");
    let output = run(&["--config", fixture]);
    assert!(output.status.success());

    assert!(stdout(&output).contains("Game over! You survived for 0 seconds."));
}

#[test]
fn unknown_hotkeys_are_refused() {
    let output = run(&["--select", "9", "--frames", "1"]);
    assert!(!output.status.success());
}

#[test]
fn missing_config_files_are_reported() {
    let output = run(&["--config", "does/not/exist.toml"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load session config"));
}
