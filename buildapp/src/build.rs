//! End-to-end bundle build: probe, select, assemble.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::info;

use crate::io::bundle::{
    BundlePaths, BundleRequest, SourceLayout, assemble_bundle, current_shebang, resolve_app_path,
};
use crate::io::config::BuildConfig;
use crate::io::host::HostInfo;
use crate::io::interpreter::InterpreterProbe;
use crate::io::terminal::clear_screen;
use crate::probe::{ProbeOptions, gather_candidates};
use crate::select::{Selection, select_candidate};

/// Options from the command line.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Rebuild with the interpreter the existing bundle already uses.
    pub use_current: bool,
    pub python_path: Option<String>,
    pub enforce_minimum: bool,
    pub test_load_tk: bool,
    pub output_path: Option<PathBuf>,
    /// Directory holding `<app_name>.py` and `Scripts/`.
    pub source_dir: PathBuf,
}

/// How a build run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Bundle written to this path.
    Saved(PathBuf),
    /// Assembly finished but the bundle directory is missing.
    NotSaved(PathBuf),
    /// User quit from the selection menu.
    Quit,
}

/// Run the whole build with explicit host facts and configuration.
pub fn run_build<P, R, W>(
    probe: &P,
    host: &HostInfo,
    cfg: &BuildConfig,
    options: &BuildOptions,
    input: &mut R,
    out: &mut W,
) -> Result<BuildOutcome>
where
    P: InterpreterProbe,
    R: BufRead,
    W: Write,
{
    if !looks_like_source_dir(&options.source_dir, &cfg.app_name) {
        bail!(
            "{} does not contain {}.py and a Scripts directory",
            options.source_dir.display(),
            cfg.app_name
        );
    }
    let app_path = resolve_app_path(
        options.output_path.as_deref(),
        &options.source_dir,
        &cfg.app_name,
    )?;
    let paths = BundlePaths::new(&app_path, &cfg.app_name);
    let current = current_shebang(&paths);
    info!(app = %app_path.display(), ?current, "resolved bundle");

    writeln!(out, "Locating python versions...")?;
    let explicit_path = if options.use_current {
        let Some(current) = current.as_deref() else {
            writeln!(
                out,
                " - No current {} python version detected!  Aborting!",
                cfg.app_name
            )?;
            bail!("no current interpreter in {}", paths.command_path.display());
        };
        Some(current)
    } else {
        options.python_path.as_deref()
    };

    let policy = cfg.min_tk_policy()?;
    let probe_options = ProbeOptions {
        explicit_path,
        interpreter_names: &cfg.interpreter_names,
        enforce_minimum: options.enforce_minimum,
        test_load_tk: options.test_load_tk,
    };
    let report = gather_candidates(probe, host, &policy, &probe_options, out)?;
    if report.usable.is_empty() {
        writeln!(out, " - No python installs with functioning tk found!  Aborting!")?;
        bail!("no python installs with functioning tk found");
    }

    let threshold = policy.threshold_for(host.os_version.as_ref());
    let chosen = match select_candidate(&report, threshold, current.as_deref(), input, out)? {
        Selection::Chosen(candidate) => candidate,
        Selection::Quit => return Ok(BuildOutcome::Quit),
    };

    clear_screen(out)?;
    writeln!(out, "Building .app with the following python install:")?;
    writeln!(out, " - {}", chosen.path)?;
    if let Some(version) = &chosen.version {
        writeln!(out, " --> {version}")?;
    }
    if let Some(tk) = &chosen.tk {
        writeln!(out, " --> tk {tk}")?;
    }

    let source = SourceLayout::new(&options.source_dir, &cfg.app_name);
    let info = cfg.info_plist();
    let saved = assemble_bundle(
        out,
        &BundleRequest {
            paths: &paths,
            source: &source,
            interpreter: &chosen.path,
            preserve_paths: &cfg.preserve_paths,
            info: &info,
        },
    )?;
    Ok(if saved {
        BuildOutcome::Saved(app_path)
    } else {
        BuildOutcome::NotSaved(app_path)
    })
}

/// Whether `path` looks like a buildable source tree for `app_name`.
pub fn looks_like_source_dir(path: &Path, app_name: &str) -> bool {
    let layout = SourceLayout::new(path, app_name);
    layout.main_script.is_file() && layout.scripts_dir.is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version::Version;
    use crate::test_support::{ScriptedInterpreter, ScriptedProbe, write_source_tree};
    use std::io::Cursor;

    fn host() -> HostInfo {
        HostInfo {
            os_version: Version::parse("14.2"),
        }
    }

    fn probe() -> ScriptedProbe {
        ScriptedProbe::default()
            .with_which("python3", "/opt/homebrew/bin/python3\n")
            .with_interpreter(
                "/opt/homebrew/bin/python3",
                ScriptedInterpreter::new("3.12.1", Some("8.6.13")),
            )
            .with_interpreter(
                "/usr/local/bin/python3",
                ScriptedInterpreter::new("3.11.4", Some("8.6.12")),
            )
    }

    fn options(source_dir: &Path) -> BuildOptions {
        BuildOptions {
            test_load_tk: true,
            source_dir: source_dir.to_path_buf(),
            ..BuildOptions::default()
        }
    }

    #[test]
    fn builds_with_menu_choice() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_source_tree(temp.path(), "ProperTree").expect("source");
        let cfg = BuildConfig::default();
        let mut out = Vec::new();
        let outcome = run_build(
            &probe(),
            &host(),
            &cfg,
            &options(temp.path()),
            &mut Cursor::new("1\n"),
            &mut out,
        )
        .expect("build");

        let app_path = temp.path().join("ProperTree.app");
        assert_eq!(outcome, BuildOutcome::Saved(app_path.clone()));
        let paths = BundlePaths::new(&app_path, "ProperTree");
        assert_eq!(
            current_shebang(&paths),
            Some("/opt/homebrew/bin/python3".to_string())
        );
        let log = String::from_utf8(out).expect("utf8");
        assert!(log.contains("2. /usr/bin/env python3"));
        assert!(log.contains(" --> tk 8.6.13"));
    }

    #[test]
    fn use_current_requires_existing_launcher() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_source_tree(temp.path(), "ProperTree").expect("source");
        let opts = BuildOptions {
            use_current: true,
            ..options(temp.path())
        };
        let mut out = Vec::new();
        let err = run_build(
            &probe(),
            &host(),
            &BuildConfig::default(),
            &opts,
            &mut Cursor::new(""),
            &mut out,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no current interpreter"));
        assert!(
            String::from_utf8(out)
                .expect("utf8")
                .contains("No current ProperTree python version detected")
        );
    }

    #[test]
    fn use_current_rebuilds_with_existing_shebang() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_source_tree(temp.path(), "ProperTree").expect("source");
        let cfg = BuildConfig::default();
        let first = BuildOptions {
            python_path: Some("/usr/local/bin/python3".to_string()),
            ..options(temp.path())
        };
        run_build(&probe(), &host(), &cfg, &first, &mut Cursor::new(""), &mut Vec::new())
            .expect("first build");

        let again = BuildOptions {
            use_current: true,
            python_path: Some("/opt/homebrew/bin/python3".to_string()),
            ..options(temp.path())
        };
        run_build(&probe(), &host(), &cfg, &again, &mut Cursor::new(""), &mut Vec::new())
            .expect("rebuild");
        let paths = BundlePaths::new(temp.path().join("ProperTree.app"), "ProperTree");
        assert_eq!(
            current_shebang(&paths),
            Some("/usr/local/bin/python3".to_string())
        );
    }

    #[test]
    fn use_current_treats_bare_shebang_as_missing() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_source_tree(temp.path(), "ProperTree").expect("source");
        let cfg = BuildConfig::default();
        let first = BuildOptions {
            python_path: Some("/usr/local/bin/python3".to_string()),
            ..options(temp.path())
        };
        run_build(&probe(), &host(), &cfg, &first, &mut Cursor::new(""), &mut Vec::new())
            .expect("first build");
        let paths = BundlePaths::new(temp.path().join("ProperTree.app"), "ProperTree");
        std::fs::write(&paths.command_path, b"#!\nimport sys\n").expect("write launcher");

        let again = BuildOptions {
            use_current: true,
            ..options(temp.path())
        };
        let mut out = Vec::new();
        let err = run_build(&probe(), &host(), &cfg, &again, &mut Cursor::new(""), &mut out)
            .unwrap_err();
        assert!(err.to_string().contains("no current interpreter"));
        assert!(
            String::from_utf8(out)
                .expect("utf8")
                .contains("No current ProperTree python version detected")
        );
    }

    #[test]
    fn no_usable_interpreter_aborts_before_touching_output() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_source_tree(temp.path(), "ProperTree").expect("source");
        let probe = ScriptedProbe::default().with_interpreter(
            "/opt/py/bin/python3",
            ScriptedInterpreter::new("3.12.0", Some("8.6.13")).crashing(),
        );
        let opts = BuildOptions {
            python_path: Some("/opt/py/bin/python3".to_string()),
            ..options(temp.path())
        };
        let err = run_build(
            &probe,
            &host(),
            &BuildConfig::default(),
            &opts,
            &mut Cursor::new(""),
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("no python installs"));
        assert!(!temp.path().join("ProperTree.app").exists());
    }

    #[test]
    fn missing_source_tree_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = run_build(
            &probe(),
            &host(),
            &BuildConfig::default(),
            &options(temp.path()),
            &mut Cursor::new(""),
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("ProperTree.py"));
    }

    #[test]
    fn quitting_leaves_no_bundle() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_source_tree(temp.path(), "ProperTree").expect("source");
        let outcome = run_build(
            &probe(),
            &host(),
            &BuildConfig::default(),
            &options(temp.path()),
            &mut Cursor::new("Q\n"),
            &mut Vec::new(),
        )
        .expect("build");
        assert_eq!(outcome, BuildOutcome::Quit);
        assert!(!temp.path().join("ProperTree.app").exists());
    }

    #[test]
    fn source_dir_detection() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(!looks_like_source_dir(temp.path(), "ProperTree"));
        write_source_tree(temp.path(), "ProperTree").expect("source");
        assert!(looks_like_source_dir(temp.path(), "ProperTree"));
    }
}
