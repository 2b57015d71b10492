use assert_cmd::Command;
use predicates::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn ghostfile_cmd() -> Command {
    Command::cargo_bin("ghostfile").unwrap()
}

fn create_test_structure(root: &Path) {
    fs::create_dir_all(root.join("alpha/nested")).unwrap();
    fs::create_dir_all(root.join("beta")).unwrap();
    fs::create_dir_all(root.join("empty")).unwrap();

    fs::write(root.join("file1.txt"), "content").unwrap();
    fs::write(root.join("file2.txt"), "more content").unwrap();
    fs::write(root.join("alpha/inner.txt"), "content").unwrap();
    fs::write(root.join("alpha/nested/deep.txt"), "x".repeat(4096)).unwrap();
    fs::write(root.join("beta/other.txt"), "content").unwrap();
}

/// Relative directory and file paths under `root`, walked recursively.
fn listing(root: &Path) -> (BTreeSet<PathBuf>, BTreeSet<PathBuf>) {
    let mut dirs = BTreeSet::new();
    let mut files = BTreeSet::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let entry = entry.unwrap();
            let rel = entry.path().strip_prefix(root).unwrap().to_path_buf();
            if entry.file_type().unwrap().is_dir() {
                dirs.insert(rel);
                pending.push(entry.path());
            } else {
                files.insert(rel);
            }
        }
    }
    (dirs, files)
}

// --- scan ---

#[test]
fn scan_reports_recursive_counts_excluding_root() {
    let temp = TempDir::new().unwrap();
    create_test_structure(temp.path());

    ghostfile_cmd()
        .arg("scan")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("FILES: 5 | DIRECTORIES: 4"));
}

#[test]
fn scan_prints_tree_with_directory_suffixes() {
    let temp = TempDir::new().unwrap();
    create_test_structure(temp.path());

    let output = ghostfile_cmd()
        .args(["scan", "--sort"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let root_name = temp.path().file_name().unwrap().to_string_lossy();
    assert!(stdout.starts_with(&format!("{root_name}\n")));
    assert!(stdout.contains("|-- alpha/\n"));
    assert!(stdout.contains("|   |-- inner.txt\n"));
    assert!(stdout.contains("|   `-- nested/\n"));
    assert!(stdout.contains("|       `-- deep.txt\n"));
    assert!(stdout.contains("`-- file2.txt\n"));
}

#[test]
fn scan_no_tree_prints_only_counts() {
    let temp = TempDir::new().unwrap();
    create_test_structure(temp.path());

    let output = ghostfile_cmd()
        .args(["scan", "--no-tree"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "FILES: 5 | DIRECTORIES: 4\n"
    );
}

#[test]
fn scan_defaults_to_current_directory() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("test.txt"), "content").unwrap();

    ghostfile_cmd()
        .arg("scan")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(".\n"))
        .stdout(predicate::str::contains("`-- test.txt"))
        .stdout(predicate::str::contains("FILES: 1 | DIRECTORIES: 0"));
}

#[test]
fn scan_logs_source_selection_to_stderr() {
    let temp = TempDir::new().unwrap();

    ghostfile_cmd()
        .args(["scan", "--no-tree"])
        .arg(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Source selected: "))
        .stdout(predicate::str::contains("FILES: 0 | DIRECTORIES: 0"));
}

#[test]
fn scan_exclude_skips_matching_names() {
    let temp = TempDir::new().unwrap();
    create_test_structure(temp.path());

    ghostfile_cmd()
        .args(["scan", "-I", "alpha|*2.txt"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("FILES: 2 | DIRECTORIES: 2"))
        .stdout(predicate::str::contains("inner.txt").not())
        .stdout(predicate::str::contains("file2.txt").not());
}

#[test]
fn scan_error_for_nonexistent_path() {
    let output = ghostfile_cmd()
        .args(["scan", "/nonexistent/path/that/does/not/exist"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ghostfile:"));
    assert!(stderr.contains("No such file or directory") || stderr.contains("cannot find"));
}

#[test]
fn scan_rejects_regular_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("single_file.txt");
    fs::write(&file, "content").unwrap();

    ghostfile_cmd()
        .arg("scan")
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not a directory"));
}

// --- mirror ---

#[test]
fn mirror_recreates_structure_with_empty_files() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let destination = temp.path().join("out/dst");
    create_test_structure(&source);

    ghostfile_cmd()
        .arg("mirror")
        .arg(&source)
        .arg(&destination)
        .assert()
        .success()
        .stdout(predicate::str::contains("Operation completed successfully in "));

    assert_eq!(listing(&source), listing(&destination));
    let (_, files) = listing(&destination);
    for file in files {
        assert_eq!(fs::metadata(destination.join(file)).unwrap().len(), 0);
    }
    assert_eq!(
        fs::read_to_string(source.join("alpha/nested/deep.txt"))
            .unwrap()
            .len(),
        4096
    );
}

#[test]
fn mirror_is_idempotent_and_truncates_existing_files() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let destination = temp.path().join("dst");
    create_test_structure(&source);
    fs::create_dir_all(destination.join("beta")).unwrap();
    fs::write(destination.join("beta/other.txt"), "stale content").unwrap();

    for _ in 0..2 {
        ghostfile_cmd()
            .arg("mirror")
            .arg(&source)
            .arg(&destination)
            .assert()
            .success();
    }

    assert_eq!(listing(&source), listing(&destination));
    assert_eq!(
        fs::metadata(destination.join("beta/other.txt")).unwrap().len(),
        0
    );
}

#[test]
fn mirror_logs_timestamped_lines() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    fs::create_dir(&source).unwrap();

    let output = ghostfile_cmd()
        .arg("mirror")
        .arg(&source)
        .arg(temp.path().join("dst"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines.iter().all(|line| line.starts_with('[') && &line[9..11] == "] "));
    assert!(lines[0].contains("Source selected: "));
    assert!(lines[1].contains("Destination selected: "));
    assert!(temp.path().join("dst").is_dir());
}

#[test]
fn mirror_rejects_same_directory() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("keep.txt"), "content").unwrap();

    ghostfile_cmd()
        .arg("mirror")
        .arg(temp.path())
        .arg(temp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Error: Source and destination cannot be the same directory",
        ));

    assert_eq!(fs::read_to_string(temp.path().join("keep.txt")).unwrap(), "content");
}

#[test]
fn mirror_rejects_destination_inside_source() {
    let temp = TempDir::new().unwrap();
    create_test_structure(temp.path());

    ghostfile_cmd()
        .arg("mirror")
        .arg(temp.path())
        .arg(temp.path().join("alpha/copy"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("lies inside source"));

    assert!(!temp.path().join("alpha/copy").exists());
}

#[test]
fn mirror_rejects_nested_destination_reached_through_parent_dir() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    create_test_structure(&source);

    ghostfile_cmd()
        .arg("mirror")
        .arg(&source)
        .arg(temp.path().join("other/../src/copy"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("lies inside source"));

    assert!(!source.join("copy").exists());
    assert!(!temp.path().join("other").exists());
}

#[cfg(unix)]
#[test]
fn mirror_rejects_nested_destination_under_symlinked_parent() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    create_test_structure(&source);
    let link = temp.path().join("link");
    std::os::unix::fs::symlink(&source, &link).unwrap();

    ghostfile_cmd()
        .arg("mirror")
        .arg(&source)
        .arg(link.join("copy"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("lies inside source"));

    assert!(!source.join("copy").exists());
}

#[test]
fn mirror_rejection_is_logged_once() {
    let temp = TempDir::new().unwrap();

    let output = ghostfile_cmd()
        .arg("mirror")
        .arg(temp.path())
        .arg(temp.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stderr.is_empty());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("Error: ").count(), 1);
}

#[test]
fn verbose_flag_enables_diagnostics() {
    let temp = TempDir::new().unwrap();

    ghostfile_cmd()
        .args(["-v", "mirror"])
        .arg(temp.path())
        .arg(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("WARN"));
}

#[test]
fn mirror_exclude_skips_matching_names() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let destination = temp.path().join("dst");
    create_test_structure(&source);

    ghostfile_cmd()
        .args(["mirror", "--exclude", "nested|file1.txt"])
        .arg(&source)
        .arg(&destination)
        .assert()
        .success();

    assert!(destination.join("alpha/inner.txt").is_file());
    assert!(destination.join("file2.txt").is_file());
    assert!(!destination.join("alpha/nested").exists());
    assert!(!destination.join("file1.txt").exists());
}

#[test]
fn mirror_error_for_nonexistent_source() {
    let temp = TempDir::new().unwrap();

    ghostfile_cmd()
        .arg("mirror")
        .arg(temp.path().join("missing"))
        .arg(temp.path().join("dst"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ghostfile:"));

    assert!(!temp.path().join("dst").exists());
}

#[cfg(unix)]
#[test]
fn unreadable_subdirectory_is_logged_and_siblings_complete() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let destination = temp.path().join("dst");
    create_test_structure(&source);
    let locked = source.join("beta");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read the directory anyway.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let scan = ghostfile_cmd()
        .args(["scan", "--no-tree"])
        .arg(&source)
        .output()
        .unwrap();
    let mirror = ghostfile_cmd()
        .arg("mirror")
        .arg(&source)
        .arg(&destination)
        .output()
        .unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(scan.status.success());
    assert!(String::from_utf8_lossy(&scan.stderr).contains("Error: "));
    assert!(String::from_utf8_lossy(&scan.stdout).contains("FILES: 4 | DIRECTORIES: 4"));

    assert!(mirror.status.success());
    let stdout = String::from_utf8_lossy(&mirror.stdout);
    assert!(stdout.contains("Error: "));
    assert!(stdout.contains("Operation completed successfully"));
    assert!(destination.join("alpha/nested/deep.txt").is_file());
    assert!(destination.join("file1.txt").is_file());
    assert!(destination.join("beta").is_dir());
    assert!(!destination.join("beta/other.txt").exists());
}

#[test]
fn help_output() {
    ghostfile_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Mirror a directory's structure using empty placeholder files",
        ))
        .stdout(predicate::str::contains("Usage:"));
}
