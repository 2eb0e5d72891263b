use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn toastnotes_cmd(root: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_toastnotes"));
    cmd.env_remove("TOASTNOTES_ROOT")
        .env_remove("RUST_LOG")
        .arg("--root")
        .arg(root);
    cmd
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_save_creates_file_under_root() {
    let tmp = TempDir::new().unwrap();

    let output = toastnotes_cmd(tmp.path())
        .args(["save", "projects/x", "--content", "# Hello"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Saved note projects/x"));
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("projects/x.md")).unwrap(),
        "# Hello"
    );
    assert!(tmp.path().join("images").is_dir());
}

#[test]
fn test_save_without_name_fails() {
    let tmp = TempDir::new().unwrap();

    let output = toastnotes_cmd(tmp.path())
        .args(["save", "", "--content", "text"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No note name"));
}

#[test]
fn test_save_from_stdin() {
    let tmp = TempDir::new().unwrap();

    let mut child = toastnotes_cmd(tmp.path())
        .args(["save", "inbox", "--stdin"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"piped body\n")
        .unwrap();
    assert!(child.wait_with_output().unwrap().status.success());

    let output = toastnotes_cmd(tmp.path())
        .args(["open", "inbox"])
        .output()
        .unwrap();
    assert_eq!(stdout_of(&output), "piped body\n");
}

#[test]
fn test_full_note_workflow() {
    let tmp = TempDir::new().unwrap();

    let output = toastnotes_cmd(tmp.path())
        .args(["save", "projects/x", "--content", "# Hello"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let output = toastnotes_cmd(tmp.path()).args(["list"]).output().unwrap();
    assert!(stdout_of(&output).lines().any(|l| l == "projects/x"));

    let output = toastnotes_cmd(tmp.path())
        .args(["open", "projects/x"])
        .output()
        .unwrap();
    assert_eq!(stdout_of(&output), "# Hello");

    let output = toastnotes_cmd(tmp.path())
        .args(["rename", "projects/x", "projects/y"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let output = toastnotes_cmd(tmp.path())
        .args(["open", "projects/x"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Note not found"));

    let output = toastnotes_cmd(tmp.path())
        .args(["open", "projects/y"])
        .output()
        .unwrap();
    assert_eq!(stdout_of(&output), "# Hello");

    let output = toastnotes_cmd(tmp.path())
        .args(["delete", "projects/y"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let output = toastnotes_cmd(tmp.path())
        .args(["delete", "projects/y"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_rename_conflict_leaves_both_notes() {
    let tmp = TempDir::new().unwrap();

    for (name, body) in [("a", "A"), ("b", "B")] {
        toastnotes_cmd(tmp.path())
            .args(["save", name, "--content", body])
            .output()
            .unwrap();
    }

    let output = toastnotes_cmd(tmp.path())
        .args(["rename", "a", "b"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
    assert_eq!(std::fs::read_to_string(tmp.path().join("a.md")).unwrap(), "A");
    assert_eq!(std::fs::read_to_string(tmp.path().join("b.md")).unwrap(), "B");
}

#[test]
fn test_list_tree_and_json() {
    let tmp = TempDir::new().unwrap();

    for name in ["projects/x", "projects/y", "inbox"] {
        toastnotes_cmd(tmp.path())
            .args(["save", name, "--content", "x"])
            .output()
            .unwrap();
    }

    let output = toastnotes_cmd(tmp.path())
        .args(["list", "--tree"])
        .output()
        .unwrap();
    assert_eq!(stdout_of(&output), "projects/\n  x\n  y\ninbox\n");

    let output = toastnotes_cmd(tmp.path())
        .args(["list", "--json"])
        .output()
        .unwrap();
    let names: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(names, vec!["inbox", "projects/x", "projects/y"]);
}

#[test]
fn test_list_empty() {
    let tmp = TempDir::new().unwrap();

    let output = toastnotes_cmd(tmp.path()).args(["list"]).output().unwrap();
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("No notes found."));
}

#[test]
fn test_search_by_content_and_folder() {
    let tmp = TempDir::new().unwrap();

    toastnotes_cmd(tmp.path())
        .args(["save", "work/plan", "--content", "Quarterly ROADMAP"])
        .output()
        .unwrap();
    toastnotes_cmd(tmp.path())
        .args(["save", "home/list", "--content", "roadmap for the garden"])
        .output()
        .unwrap();

    let output = toastnotes_cmd(tmp.path())
        .args(["search", "roadmap"])
        .output()
        .unwrap();
    let stdout = stdout_of(&output);
    assert!(stdout.contains("work/plan"));
    assert!(stdout.contains("home/list"));

    let output = toastnotes_cmd(tmp.path())
        .args(["search", "folder:work roadmap"])
        .output()
        .unwrap();
    let stdout = stdout_of(&output);
    assert!(stdout.contains("work/plan"));
    assert!(!stdout.contains("home/list"));
}

#[test]
fn test_upload_prints_url() {
    let tmp = TempDir::new().unwrap();
    let image = tmp.path().join("my photo.png");
    std::fs::write(&image, b"\x89PNG").unwrap();
    let root = tmp.path().join("root");

    let output = toastnotes_cmd(&root)
        .args(["upload"])
        .arg(&image)
        .output()
        .unwrap();
    assert!(output.status.success());

    let url = stdout_of(&output).trim().to_string();
    assert!(url.starts_with("/files/images/"));
    assert!(url.ends_with("-my_photo.png"));

    let file_name = url.trim_start_matches("/files/images/");
    assert!(root.join("images").join(file_name).is_file());
}

#[test]
fn test_config_file_sets_root() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("from-config");
    let config = tmp.path().join("toastnotes.yaml");
    std::fs::write(&config, format!("root: {}\n", root.display())).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_toastnotes"))
        .env_remove("TOASTNOTES_ROOT")
        .arg("--config")
        .arg(&config)
        .args(["save", "n", "--content", "body"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(root.join("n.md").is_file());
}
