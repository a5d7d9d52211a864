//! Integration tests for the `taskweave` binary using `assert_cmd`.
//!
//! These tests invoke the compiled binary in temporary workspaces and check
//! exit codes, echoed commands on stdout, and error reports on stderr.

use anyhow::{Context, Result, ensure};
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use test_support::Workspace;

const BUILD: &str = "\
default: build
targets:
  - name: build
    description: Copy the source
    deps: source.txt
    output: out.bin
    commands: cp source.txt out.bin
  - name: clean
    phony: true
    commands: '-rm -f out.bin'
";

fn taskweave() -> Result<Command> {
    let mut cmd = Command::cargo_bin("taskweave").context("locate taskweave binary")?;
    cmd.env_remove("TASKWEAVE_FILE")
        .env_remove("TASKWEAVE_PROPAGATE");
    Ok(cmd)
}

#[cfg(unix)]
#[test]
fn builds_then_reports_up_to_date() -> Result<()> {
    let ws = Workspace::new();
    ws.write_manifest(BUILD).write("source.txt", "payload");

    taskweave()?
        .current_dir(ws.root())
        .assert()
        .success()
        .stdout("cp source.txt out.bin\n");
    ensure!(ws.read("out.bin") == "payload", "out.bin should be copied");

    ws.age("source.txt", 10).age("out.bin", 20);
    taskweave()?
        .current_dir(ws.root())
        .arg("build")
        .assert()
        .success()
        .stdout("taskweave: 'build' is up to date.\n");
    Ok(())
}

#[cfg(unix)]
#[test]
fn failing_command_exits_non_zero() -> Result<()> {
    let ws = Workspace::new();
    ws.write_manifest(
        "\
targets:
  - name: broken
    phony: true
    commands:
      - exit 4
      - touch never
",
    );
    taskweave()?
        .current_dir(ws.root())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "target 'broken': command `exit 4` failed",
        ));
    ensure!(!ws.exists("never"), "commands after a failure must not run");
    Ok(())
}

#[test]
fn cycle_is_reported_before_running() -> Result<()> {
    let ws = Workspace::new();
    ws.write_manifest(
        "\
targets:
  - name: b
    phony: true
    deps: a
    commands: touch b-ran
  - name: a
    phony: true
    deps: b
    commands: touch a-ran
",
    );
    taskweave()?
        .current_dir(ws.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "dependency cycle detected: a -> b -> a",
        ));
    ensure!(
        !ws.exists("a-ran") && !ws.exists("b-ran"),
        "no command may run for a cyclic graph"
    );
    Ok(())
}

#[test]
fn unknown_target_is_reported() -> Result<()> {
    let ws = Workspace::new();
    ws.write_manifest(BUILD);
    taskweave()?
        .current_dir(ws.root())
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "no target named 'deploy' and no such file",
        ));
    Ok(())
}

#[test]
fn missing_manifest_is_reported() -> Result<()> {
    let ws = Workspace::new();
    taskweave()?
        .current_dir(ws.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "no Taskfile found in the current directory",
        ));
    Ok(())
}

#[test]
fn missing_file_prerequisite_is_reported() -> Result<()> {
    let ws = Workspace::new();
    ws.write_manifest(BUILD).write("out.bin", "");
    taskweave()?
        .current_dir(ws.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "target 'build' depends on 'source.txt', which is neither a target nor an existing file",
        ));
    Ok(())
}

#[test]
fn list_shows_targets_with_default_marker() -> Result<()> {
    let ws = Workspace::new();
    ws.write_manifest(BUILD);
    taskweave()?
        .current_dir(ws.root())
        .arg("--list")
        .assert()
        .success()
        .stdout("* build  Copy the source\n  clean  (phony)\n");
    Ok(())
}

#[cfg(unix)]
#[test]
fn directory_option_changes_root() -> Result<()> {
    let ws = Workspace::new();
    ws.write("work/Taskfile", &test_support::manifest_yaml(BUILD))
        .write("work/source.txt", "nested");

    taskweave()?
        .current_dir(ws.root())
        .args(["-C", "work"])
        .assert()
        .success();
    let copied = fs::read_to_string(ws.path("work/out.bin")).context("read nested output")?;
    ensure!(copied == "nested", "output should land in the -C directory");
    ensure!(!ws.exists("out.bin"), "nothing should be written outside -C");
    Ok(())
}

#[test]
fn dry_run_does_not_touch_files() -> Result<()> {
    let ws = Workspace::new();
    ws.write_manifest(BUILD).write("source.txt", "payload");
    taskweave()?
        .current_dir(ws.root())
        .arg("-n")
        .assert()
        .success()
        .stdout("cp source.txt out.bin\n");
    ensure!(!ws.exists("out.bin"), "dry run must not create outputs");
    Ok(())
}

#[test]
fn graph_option_prints_dot() -> Result<()> {
    let ws = Workspace::new();
    ws.write_manifest(BUILD);
    taskweave()?
        .current_dir(ws.root())
        .arg("--graph")
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("digraph taskweave {")
                .and(predicate::str::contains("\"source.txt\" -> \"build\";")),
        );
    Ok(())
}

#[test]
fn custom_manifest_path_from_environment() -> Result<()> {
    let ws = Workspace::new();
    ws.write("tasks.yml", &test_support::manifest_yaml(BUILD));
    taskweave()?
        .current_dir(ws.root())
        .env("TASKWEAVE_FILE", "tasks.yml")
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"));
    Ok(())
}

#[test]
fn malformed_manifest_reports_location() -> Result<()> {
    let ws = Workspace::new();
    ws.write_manifest("targets: [\n");
    taskweave()?
        .current_dir(ws.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("YAML parse error at line"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn stale_output_requested_by_path_is_rebuilt() -> Result<()> {
    let ws = Workspace::new();
    ws.write_manifest(BUILD)
        .write("source.txt", "fresh")
        .write("out.bin", "stale");
    ws.age("out.bin", 10).age("source.txt", 20);
    taskweave()?
        .current_dir(ws.root())
        .arg("out.bin")
        .assert()
        .success()
        .stdout("cp source.txt out.bin\n");
    ensure!(ws.read("out.bin") == "fresh", "out.bin should be rebuilt");
    Ok(())
}
