//! CLI tests for the `buildapp` binary.
//!
//! Spawns the binary and verifies exit codes and the bundle it writes. Builds
//! only run on macOS; elsewhere the binary must refuse with a failure code.

use std::process::Command;

use buildapp::exit_codes;

#[test]
fn help_exits_ok() {
    let output = Command::new(env!("CARGO_BIN_EXE_buildapp"))
        .arg("--help")
        .output()
        .expect("buildapp --help");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--do-not-test-load-tk"));
    assert!(stdout.contains("--minimum-tk-enforced"));
}

#[cfg(not(target_os = "macos"))]
#[test]
fn refuses_to_build_off_macos() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = Command::new(env!("CARGO_BIN_EXE_buildapp"))
        .current_dir(temp.path())
        .arg("-t")
        .output()
        .expect("buildapp");
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Can only be run on macOS"));
    assert!(!temp.path().join("ProperTree.app").exists());
}

#[cfg(target_os = "macos")]
mod macos {
    use super::*;
    use buildapp::test_support::{fake_python, write_source_tree};
    use std::fs;

    #[test]
    fn builds_bundle_with_explicit_interpreter() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("src");
        write_source_tree(&source, "ProperTree").expect("source");
        let python = fake_python(temp.path(), "python3", "Python 3.12.1", "8.6.13", 0)
            .expect("fake python");

        let status = Command::new(env!("CARGO_BIN_EXE_buildapp"))
            .arg("--source-dir")
            .arg(&source)
            .arg("--output-path")
            .arg(temp.path())
            .arg("--python-path")
            .arg(&python)
            .status()
            .expect("buildapp");
        assert_eq!(status.code(), Some(exit_codes::OK));

        let launcher = fs::read_to_string(
            temp.path()
                .join("ProperTree.app/Contents/MacOS/ProperTree.command"),
        )
        .expect("launcher");
        assert!(launcher.starts_with(&format!("#!{}\n", python.display())));
        assert!(temp.path().join("ProperTree.app/Contents/Info.plist").is_file());
    }

    #[test]
    fn crashing_tk_fails_the_build() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("src");
        write_source_tree(&source, "ProperTree").expect("source");
        let python = fake_python(temp.path(), "python3", "Python 3.9.6", "8.5.9", 134)
            .expect("fake python");

        let output = Command::new(env!("CARGO_BIN_EXE_buildapp"))
            .arg("-s")
            .arg(&source)
            .arg("-p")
            .arg(&python)
            .output()
            .expect("buildapp");
        assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("tkinter failed to load"));
        assert!(!source.join("ProperTree.app").exists());
    }

    #[test]
    fn use_current_without_bundle_fails() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_source_tree(temp.path(), "ProperTree").expect("source");
        let output = Command::new(env!("CARGO_BIN_EXE_buildapp"))
            .current_dir(temp.path())
            .arg("--use-current")
            .output()
            .expect("buildapp");
        assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
        assert!(String::from_utf8_lossy(&output.stderr).contains("An error occurred!"));
    }
}
