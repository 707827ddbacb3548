//! Interpreter discovery and probing for the bundle build.

use std::io::Write;

use anyhow::Result;
use tracing::{debug, info};

use crate::core::candidate::{Candidate, ProbeReport, toolkit_module};
use crate::core::discovery::discover;
use crate::core::policy::{MinTkPolicy, meets_minimum};
use crate::core::version::Version;
use crate::io::host::HostInfo;
use crate::io::interpreter::InterpreterProbe;

/// Interpreter that is a shim until the Xcode command line tools are set up.
pub const STUB_INTERPRETER: &str = "/usr/bin/python3";
/// First OS release where [`STUB_INTERPRETER`] may be a shim.
pub const STUB_SINCE_OS: &str = "10.15";

/// Options controlling how candidates are gathered.
#[derive(Debug, Clone)]
pub struct ProbeOptions<'a> {
    /// Explicit interpreter path; `None` searches `PATH` for `interpreter_names`.
    pub explicit_path: Option<&'a str>,
    pub interpreter_names: &'a [String],
    /// Drop candidates below the minimum Tk version instead of only flagging them.
    pub enforce_minimum: bool,
    /// Launch Tk in each candidate and drop those that fail.
    pub test_load_tk: bool,
}

/// Gather usable and failed interpreter candidates.
///
/// Progress is written to `out`. Environment launchers discovered on `PATH`
/// are appended to the usable list unprobed, after any minimum-version
/// filtering.
pub fn gather_candidates<P: InterpreterProbe, W: Write>(
    probe: &P,
    host: &HostInfo,
    policy: &MinTkPolicy,
    options: &ProbeOptions<'_>,
    out: &mut W,
) -> Result<ProbeReport> {
    let (paths, env_launchers) = match options.explicit_path {
        Some(path) => (vec![path.to_string()], Vec::new()),
        None => {
            let mut lookups = Vec::new();
            for name in options.interpreter_names {
                lookups.push(probe.lookup(name)?);
            }
            let discovery = discover(&lookups);
            (discovery.paths, discovery.env_launchers)
        }
    };
    debug!(?paths, "probing interpreter paths");

    let mut report = ProbeReport::default();
    for path in &paths {
        let path = path.trim();
        writeln!(out, " - Checking: {path}")?;
        match probe_one(probe, host, path, options.test_load_tk, out)? {
            Probed::Usable(candidate) => report.usable.push(candidate),
            Probed::Failed(candidate) => report.failed.push(candidate),
            Probed::Skipped => {}
        }
    }

    let threshold = policy.threshold_for(host.os_version.as_ref());
    if options.enforce_minimum && threshold.is_some() {
        let before = report.usable.len();
        report
            .usable
            .retain(|c| meets_minimum(c.tk.as_deref(), threshold));
        info!(
            dropped = before - report.usable.len(),
            "enforced minimum tk version"
        );
    }
    report.usable.extend(env_launchers);
    Ok(report)
}

enum Probed {
    Usable(Candidate),
    Failed(Candidate),
    Skipped,
}

fn probe_one<P: InterpreterProbe, W: Write>(
    probe: &P,
    host: &HostInfo,
    path: &str,
    test_load_tk: bool,
    out: &mut W,
) -> Result<Probed> {
    if !probe.is_file(path) {
        writeln!(out, " --> Doesn't exist, skipping...")?;
        return Ok(Probed::Skipped);
    }
    if path == STUB_INTERPRETER && may_be_stub(host) && !probe.developer_tools_installed() {
        writeln!(out, " --> Just a stub, skipping...")?;
        return Ok(Probed::Skipped);
    }

    let Some(version) = probe.python_version(path)? else {
        writeln!(out, " --> Invalid version - skipping...")?;
        return Ok(Probed::Skipped);
    };
    writeln!(out, " --> Located Python v{version}")?;

    let module = toolkit_module(&version);
    let tk = probe.tk_patchlevel(path, module)?;
    writeln!(out, " --> Located {module} v{}", tk.as_deref().unwrap_or_default())?;
    let candidate = Candidate::probed(path, version, tk);

    if test_load_tk {
        let mut warning_error = None;
        let mut on_slow = || {
            let warning = writeln!(
                out,
                " !! Check for any dialogs asking to reopen Python windows !!\n \
                 !! Choosing to \"Reopen\" may prevent multiple prompts !!"
            )
            .and_then(|()| out.flush());
            if let Err(err) = warning {
                warning_error = Some(err);
            }
        };
        let launched = probe.tk_launches(path, module, &mut on_slow)?;
        if let Some(err) = warning_error {
            return Err(err.into());
        }
        if !launched {
            writeln!(out, " --> {module} failed to load - skipping...")?;
            writeln!(
                out,
                "   - You may see a crash log displayed due to {module} failing -"
            )?;
            return Ok(Probed::Failed(candidate));
        }
    }
    Ok(Probed::Usable(candidate))
}

fn may_be_stub(host: &HostInfo) -> bool {
    let Some(os) = &host.os_version else {
        return false;
    };
    Version::parse(STUB_SINCE_OS).is_some_and(|since| *os >= since)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedInterpreter, ScriptedProbe};

    fn host(os: &str) -> HostInfo {
        HostInfo {
            os_version: Version::parse(os),
        }
    }

    fn policy() -> MinTkPolicy {
        MinTkPolicy::from_pairs([("11", "8.6")]).expect("policy")
    }

    fn names() -> Vec<String> {
        vec!["python".to_string(), "python3".to_string()]
    }

    fn options(names: &[String]) -> ProbeOptions<'_> {
        ProbeOptions {
            explicit_path: None,
            interpreter_names: names,
            enforce_minimum: false,
            test_load_tk: true,
        }
    }

    fn scripted() -> ScriptedProbe {
        ScriptedProbe::default()
            .with_which("python3", "/opt/homebrew/bin/python3\n/usr/local/bin/python3\n")
            .with_interpreter(
                "/usr/bin/python3",
                ScriptedInterpreter::new("3.9.6", Some("8.5.9")),
            )
            .with_interpreter(
                "/opt/homebrew/bin/python3",
                ScriptedInterpreter::new("3.12.1", Some("8.6.13")),
            )
            .with_interpreter(
                "/usr/local/bin/python3",
                ScriptedInterpreter::new("3.8.2", Some("8.6.8")).crashing(),
            )
    }

    #[test]
    fn liveness_failure_moves_candidate_to_failed() {
        let names = names();
        let mut out = Vec::new();
        let report =
            gather_candidates(&scripted(), &host("14.2"), &policy(), &options(&names), &mut out)
                .expect("gather");

        let usable: Vec<&str> = report.usable.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(
            usable,
            vec!["/usr/bin/python3", "/opt/homebrew/bin/python3", "/usr/bin/env python3"]
        );
        assert_eq!(
            report.failed,
            vec![Candidate::probed(
                "/usr/local/bin/python3",
                "3.8.2",
                Some("8.6.8".to_string())
            )]
        );
        let log = String::from_utf8(out).expect("utf8");
        assert!(log.contains(" --> tkinter failed to load - skipping..."));
    }

    #[test]
    fn skipping_liveness_keeps_crashing_interpreters() {
        let names = names();
        let opts = ProbeOptions {
            test_load_tk: false,
            ..options(&names)
        };
        let report = gather_candidates(&scripted(), &host("14.2"), &policy(), &opts, &mut Vec::new())
            .expect("gather");
        assert!(report.failed.is_empty());
        assert!(report.usable.iter().any(|c| c.path == "/usr/local/bin/python3"));
    }

    #[test]
    fn advisory_flags_match_os_table() {
        let names = names();
        let policy = policy();
        let probe = scripted()
            .with_which("python", "/usr/local/bin/python2\n")
            .with_interpreter(
                "/usr/local/bin/python2",
                ScriptedInterpreter::new("2.7.18", None),
            );
        for os in ["10.14.6", "11.0", "14.2"] {
            let host = host(os);
            let report = gather_candidates(&probe, &host, &policy, &options(&names), &mut Vec::new())
                .expect("gather");
            let no_tk = report
                .usable
                .iter()
                .find(|c| c.path == "/usr/local/bin/python2")
                .expect("tk-less interpreter listed");
            let threshold = policy.threshold_for(host.os_version.as_ref());
            assert_eq!(no_tk.below_minimum(threshold), threshold.is_some(), "{os}");
            for candidate in report.usable.iter().chain(&report.failed) {
                let expected = match (&candidate.version, &candidate.tk, threshold) {
                    (None, _, _) | (_, _, None) => false,
                    (Some(_), None, Some(_)) => true,
                    (Some(_), Some(tk), Some(min)) => Version::parse(tk).expect("tk") < *min,
                };
                assert_eq!(candidate.below_minimum(threshold), expected, "{os} {candidate:?}");
            }
        }
    }

    #[test]
    fn enforcement_drops_old_tk_but_keeps_env_launchers() {
        let names = names();
        let opts = ProbeOptions {
            enforce_minimum: true,
            ..options(&names)
        };
        let report = gather_candidates(&scripted(), &host("12.6"), &policy(), &opts, &mut Vec::new())
            .expect("gather");
        let usable: Vec<&str> = report.usable.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(usable, vec!["/opt/homebrew/bin/python3", "/usr/bin/env python3"]);
    }

    #[test]
    fn enforcement_is_inert_below_table() {
        let names = names();
        let opts = ProbeOptions {
            enforce_minimum: true,
            ..options(&names)
        };
        let report = gather_candidates(&scripted(), &host("10.15.7"), &policy(), &opts, &mut Vec::new())
            .expect("gather");
        assert!(report.usable.iter().any(|c| c.path == "/usr/bin/python3"));
    }

    #[test]
    fn system_stub_skipped_without_developer_tools() {
        let names = names();
        let probe = scripted().without_developer_tools();
        let mut out = Vec::new();
        let report = gather_candidates(&probe, &host("13.0"), &policy(), &options(&names), &mut out)
            .expect("gather");
        assert!(!report.usable.iter().any(|c| c.path == "/usr/bin/python3"));
        assert!(String::from_utf8(out).expect("utf8").contains("Just a stub"));

        let report = gather_candidates(&probe, &host("10.14"), &policy(), &options(&names), &mut Vec::new())
            .expect("gather");
        assert!(report.usable.iter().any(|c| c.path == "/usr/bin/python3"));
    }

    #[test]
    fn explicit_path_skips_discovery() {
        let names = names();
        let opts = ProbeOptions {
            explicit_path: Some(" /opt/homebrew/bin/python3 "),
            ..options(&names)
        };
        let report = gather_candidates(&scripted(), &host("14.2"), &policy(), &opts, &mut Vec::new())
            .expect("gather");
        assert_eq!(
            report.usable,
            vec![Candidate::probed(
                "/opt/homebrew/bin/python3",
                "3.12.1",
                Some("8.6.13".to_string())
            )]
        );
    }

    #[test]
    fn missing_and_versionless_paths_are_skipped() {
        let names = names();
        let probe = ScriptedProbe::default()
            .with_which("python", "/missing/python\n/opt/broken/python\n")
            .with_interpreter("/opt/broken/python", ScriptedInterpreter::new("", None));
        let mut out = Vec::new();
        let report = gather_candidates(&probe, &host("14.2"), &policy(), &options(&names), &mut out)
            .expect("gather");
        assert_eq!(report.usable, vec![Candidate::env_launcher("python")]);
        let log = String::from_utf8(out).expect("utf8");
        assert!(log.contains(" --> Doesn't exist, skipping..."));
        assert!(log.contains(" --> Invalid version - skipping..."));
    }

    #[test]
    fn slow_launch_prints_dialog_warning_once() {
        let names = names();
        let probe = ScriptedProbe::default().with_interpreter(
            "/opt/py/bin/python3",
            ScriptedInterpreter::new("3.11.4", Some("8.6.12")).slow(),
        );
        let opts = ProbeOptions {
            explicit_path: Some("/opt/py/bin/python3"),
            ..options(&names)
        };
        let mut out = Vec::new();
        gather_candidates(&probe, &host("14.2"), &policy(), &opts, &mut out).expect("gather");
        let log = String::from_utf8(out).expect("utf8");
        assert_eq!(log.matches("reopen Python windows").count(), 1);
    }
}
