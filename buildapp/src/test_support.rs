//! Test-only helpers: scripted interpreter probes and source tree fixtures.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::discovery::NameLookup;
use crate::io::interpreter::InterpreterProbe;

/// Canned answers for one interpreter path.
#[derive(Debug, Clone)]
pub struct ScriptedInterpreter {
    pub version: Option<String>,
    pub tk: Option<String>,
    pub launches: bool,
    pub slow: bool,
}

impl ScriptedInterpreter {
    /// An interpreter that reports `version` (empty means unparseable) and `tk`.
    pub fn new(version: &str, tk: Option<&str>) -> Self {
        Self {
            version: (!version.is_empty()).then(|| version.to_string()),
            tk: tk.map(str::to_string),
            launches: true,
            slow: false,
        }
    }

    /// Tk launch exits non-zero.
    pub fn crashing(mut self) -> Self {
        self.launches = false;
        self
    }

    /// Tk launch outlives the warning delay before succeeding.
    pub fn slow(mut self) -> Self {
        self.slow = true;
        self
    }
}

/// Deterministic `InterpreterProbe` with no subprocesses.
///
/// Registered interpreter paths count as existing files; `/usr/bin/<name>`
/// exists for lookups exactly when it is registered.
#[derive(Debug, Clone)]
pub struct ScriptedProbe {
    which: BTreeMap<String, String>,
    interpreters: BTreeMap<String, ScriptedInterpreter>,
    developer_tools: bool,
}

impl Default for ScriptedProbe {
    fn default() -> Self {
        Self {
            which: BTreeMap::new(),
            interpreters: BTreeMap::new(),
            developer_tools: true,
        }
    }
}

impl ScriptedProbe {
    pub fn with_which(mut self, name: &str, output: &str) -> Self {
        self.which.insert(name.to_string(), output.to_string());
        self
    }

    pub fn with_interpreter(mut self, path: &str, interpreter: ScriptedInterpreter) -> Self {
        self.interpreters.insert(path.to_string(), interpreter);
        self
    }

    pub fn without_developer_tools(mut self) -> Self {
        self.developer_tools = false;
        self
    }

    fn interpreter(&self, path: &str) -> Result<&ScriptedInterpreter> {
        self.interpreters
            .get(path)
            .with_context(|| format!("no scripted interpreter at {path}"))
    }
}

impl InterpreterProbe for ScriptedProbe {
    fn lookup(&self, name: &str) -> Result<NameLookup> {
        Ok(NameLookup {
            name: name.to_string(),
            which_output: self.which.get(name).cloned().unwrap_or_default(),
            system_binary_exists: self.interpreters.contains_key(&format!("/usr/bin/{name}")),
        })
    }

    fn is_file(&self, path: &str) -> bool {
        self.interpreters.contains_key(path)
    }

    fn developer_tools_installed(&self) -> bool {
        self.developer_tools
    }

    fn python_version(&self, path: &str) -> Result<Option<String>> {
        Ok(self.interpreter(path)?.version.clone())
    }

    fn tk_patchlevel(&self, path: &str, _module: &str) -> Result<Option<String>> {
        Ok(self.interpreter(path)?.tk.clone())
    }

    fn tk_launches(&self, path: &str, _module: &str, on_slow: &mut dyn FnMut()) -> Result<bool> {
        let interpreter = self.interpreter(path)?;
        if interpreter.slow {
            on_slow();
        }
        Ok(interpreter.launches)
    }
}

/// Write a `<app_name>.py` launcher and a `Scripts` directory with a mix of
/// copied and ignored files.
pub fn write_source_tree(source_dir: &Path, app_name: &str) -> Result<()> {
    let scripts = source_dir.join("Scripts");
    fs::create_dir_all(&scripts).with_context(|| format!("create {}", scripts.display()))?;
    let files: [(PathBuf, &[u8]); 7] = [
        (
            source_dir.join(format!("{app_name}.py")),
            b"#!/usr/bin/env python\nimport sys\nprint(sys.version)\n",
        ),
        (scripts.join("plist.py"), b"# plist helpers\n"),
        (scripts.join("menu.plist"), b"<plist/>\n"),
        (scripts.join("version.json"), b"{\"version\": \"1.0\"}\n"),
        (scripts.join("shortcut.icns"), b"icns"),
        (scripts.join(".hidden.py"), b"# hidden\n"),
        (scripts.join("notes.txt"), b"not copied\n"),
    ];
    for (path, contents) in files {
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}

/// Write an executable shell script that imitates a Python interpreter.
///
/// `-V` prints `version_line` on stderr, the patch level probe prints
/// `patchlevel`, and any other `-c` program exits with `tk_exit`.
#[cfg(unix)]
pub fn fake_python(
    dir: &Path,
    name: &str,
    version_line: &str,
    patchlevel: &str,
    tk_exit: i32,
) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    let script = format!(
        "#!/bin/sh\n\
         case \"$1\" in\n\
         \x20 -V) echo \"{version_line}\" >&2 ;;\n\
         \x20 -c)\n\
         \x20   case \"$2\" in\n\
         \x20     *patchlevel*) echo \"{patchlevel}\" ;;\n\
         \x20     *) exit {tk_exit} ;;\n\
         \x20   esac ;;\n\
         esac\n"
    );
    fs::write(&path, script).with_context(|| format!("write {}", path.display()))?;
    let mut perms = fs::metadata(&path)
        .with_context(|| format!("stat {}", path.display()))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).with_context(|| format!("chmod {}", path.display()))?;
    Ok(path)
}
