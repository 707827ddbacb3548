//! Bundle assembly: directory skeleton, launcher, resources, and manifest.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tempfile::TempDir;
use tracing::{debug, instrument, warn};

use crate::core::info_plist::InfoPlist;
use crate::core::shebang::{read_shebang, rewrite_shebang};

/// Resource suffixes copied from the source `Scripts` directory.
const RESOURCE_SUFFIXES: [&str; 4] = [".py", ".plist", ".icns", "version.json"];

/// Canonical paths inside `<app>.app`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePaths {
    pub app_path: PathBuf,
    pub scripts_dir: PathBuf,
    pub resources_dir: PathBuf,
    pub command_path: PathBuf,
    pub info_path: PathBuf,
}

impl BundlePaths {
    pub fn new(app_path: impl Into<PathBuf>, app_name: &str) -> Self {
        let app_path = app_path.into();
        let contents = app_path.join("Contents");
        let macos = contents.join("MacOS");
        Self {
            app_path: app_path.clone(),
            scripts_dir: macos.join("Scripts"),
            resources_dir: contents.join("Resources"),
            command_path: macos.join(format!("{app_name}.command")),
            info_path: contents.join("Info.plist"),
        }
    }
}

/// Source tree the bundle is built from: `<app>.py` and a `Scripts` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    pub main_script: PathBuf,
    pub scripts_dir: PathBuf,
}

impl SourceLayout {
    pub fn new(source_dir: &Path, app_name: &str) -> Self {
        Self {
            main_script: source_dir.join(format!("{app_name}.py")),
            scripts_dir: source_dir.join("Scripts"),
        }
    }
}

/// Everything needed to (re)build one bundle.
#[derive(Debug, Clone)]
pub struct BundleRequest<'a> {
    pub paths: &'a BundlePaths,
    pub source: &'a SourceLayout,
    pub interpreter: &'a str,
    pub preserve_paths: &'a [String],
    pub info: &'a InfoPlist,
}

/// Resolve the output bundle path.
///
/// Defaults to `<source_dir>/<app_name>.app`. A path that does not end in
/// `.app` is treated as a parent directory.
pub fn resolve_app_path(output: Option<&Path>, source_dir: &Path, app_name: &str) -> Result<PathBuf> {
    let bundle_name = format!("{app_name}.app");
    let path = match output {
        None => source_dir.join(&bundle_name),
        Some(path) => {
            let is_bundle = path
                .to_str()
                .is_some_and(|p| p.to_lowercase().ends_with(".app"));
            if is_bundle {
                path.to_path_buf()
            } else {
                path.join(&bundle_name)
            }
        }
    };
    std::path::absolute(&path).with_context(|| format!("resolve {}", path.display()))
}

/// Interpreter named by an existing bundle's launcher, if any.
pub fn current_shebang(paths: &BundlePaths) -> Option<String> {
    let script = match fs::read(&paths.command_path) {
        Ok(script) => script,
        Err(err) => {
            debug!(err = %err, path = %paths.command_path.display(), "no readable launcher");
            return None;
        }
    };
    read_shebang(&script)
}

/// Rebuild the bundle from scratch, keeping preserved user files.
///
/// The launcher source and resource list are read before the old bundle is
/// removed. If a later step fails, preserved files are copied back into the
/// partial bundle and their temporary copies are kept on disk.
///
/// Progress lines are written to `out`. Returns whether the bundle directory
/// exists afterwards.
#[instrument(skip_all, fields(app = %request.paths.app_path.display()))]
pub fn assemble_bundle<W: Write>(out: &mut W, request: &BundleRequest<'_>) -> Result<bool> {
    let paths = request.paths;
    let app_display = paths.app_path.display();

    writeln!(out, "Checking for existing {app_display}...")?;
    if paths.app_path.is_file() {
        writeln!(out, " - Found, but is a file - aborting...")?;
        bail!("{app_display} exists and is a file");
    }

    let script = fs::read(&request.source.main_script)
        .with_context(|| format!("read {}", request.source.main_script.display()))?;
    let launcher = rewrite_shebang(&script, request.interpreter);
    let resources = list_resources(&request.source.scripts_dir)?;

    let mut preserved = None;
    if paths.app_path.is_dir() {
        writeln!(out, " - Found, removing...")?;
        preserved = preserve_files(out, &paths.app_path, request.preserve_paths)?;
        fs::remove_dir_all(&paths.app_path)
            .with_context(|| format!("remove {app_display}"))?;
    }

    if let Err(err) = write_bundle(out, request, &launcher, &resources) {
        return Err(match preserved {
            Some(preserved) => rescue_preserved(preserved, &paths.app_path, err),
            None => err,
        });
    }

    if let Some(preserved) = &preserved {
        restore_files(
            out,
            preserved.dir.path(),
            &preserved.relative_paths,
            &paths.app_path,
        )?;
    }

    let saved = paths.app_path.is_dir();
    if saved {
        writeln!(out, "Saved to: {app_display}")?;
    } else {
        writeln!(out, "Something went wrong saving to: {app_display}")?;
    }
    Ok(saved)
}

/// Skeleton, launcher, resources, and manifest.
fn write_bundle<W: Write>(
    out: &mut W,
    request: &BundleRequest<'_>,
    launcher: &[u8],
    resources: &[Resource],
) -> Result<()> {
    let paths = request.paths;
    writeln!(out, "Creating bundle structure...")?;
    create_dir(&paths.scripts_dir)?;
    create_dir(&paths.resources_dir)?;

    writeln!(out, "Copying scripts...")?;
    writeln!(
        out,
        " - {} -> {}",
        file_name(&request.source.main_script),
        file_name(&paths.command_path)
    )?;
    fs::write(&paths.command_path, launcher)
        .with_context(|| format!("write {}", paths.command_path.display()))?;
    make_executable(&paths.command_path)?;
    copy_resources(out, resources, &request.source.scripts_dir, paths)?;

    writeln!(out, "Building Info.plist...")?;
    plist::to_file_xml(&paths.info_path, request.info)
        .with_context(|| format!("write {}", paths.info_path.display()))
}

/// Copies of user files taken before the old bundle is removed.
struct Preserved {
    dir: TempDir,
    relative_paths: Vec<PathBuf>,
}

fn preserve_files<W: Write>(
    out: &mut W,
    app_path: &Path,
    preserve_paths: &[String],
) -> Result<Option<Preserved>> {
    let existing: Vec<&String> = preserve_paths
        .iter()
        .filter(|relative| app_path.join(relative).is_file())
        .collect();
    if existing.is_empty() {
        return Ok(None);
    }

    let dir = tempfile::tempdir().context("create preserve directory")?;
    let mut relative_paths = Vec::new();
    for relative in existing {
        let source = app_path.join(relative);
        writeln!(out, " --> Found {} - preserving...", file_name(&source))?;
        copy_file(&source, &dir.path().join(relative))?;
        relative_paths.push(PathBuf::from(relative));
    }
    Ok(Some(Preserved {
        dir,
        relative_paths,
    }))
}

fn restore_files<W: Write>(
    out: &mut W,
    root: &Path,
    relative_paths: &[PathBuf],
    app_path: &Path,
) -> Result<()> {
    for relative in relative_paths {
        let target = app_path.join(relative);
        writeln!(out, "Restoring {}...", file_name(&target))?;
        copy_file(&root.join(relative), &target)?;
    }
    Ok(())
}

/// Keep the preserved copies after a failed build and put them back into the
/// partial bundle when possible.
fn rescue_preserved(preserved: Preserved, app_path: &Path, err: anyhow::Error) -> anyhow::Error {
    let Preserved {
        dir,
        relative_paths,
    } = preserved;
    let kept = dir.keep();
    match restore_files(&mut std::io::sink(), &kept, &relative_paths, app_path) {
        Ok(()) => warn!(kept = %kept.display(), "build failed; preserved files restored"),
        Err(restore_err) => {
            warn!(
                kept = %kept.display(),
                err = %format!("{restore_err:#}"),
                "could not restore preserved files"
            );
        }
    }
    err.context(format!(
        "bundle build failed; preserved files kept in {}",
        kept.display()
    ))
}

/// A resource file from the source `Scripts` directory.
#[derive(Debug, Clone)]
struct Resource {
    name: String,
    is_icon: bool,
}

fn list_resources(scripts_dir: &Path) -> Result<Vec<Resource>> {
    let entries = fs::read_dir(scripts_dir)
        .with_context(|| format!("read directory {}", scripts_dir.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in {}", scripts_dir.display()))?;
        if !entry.path().is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => warn!(?name, "skipping non-UTF-8 resource name"),
        }
    }
    names.sort();

    Ok(names
        .into_iter()
        .filter_map(|name| {
            let lower = name.to_lowercase();
            if name.starts_with('.') || !RESOURCE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
                return None;
            }
            Some(Resource {
                is_icon: lower.ends_with(".icns"),
                name,
            })
        })
        .collect())
}

fn copy_resources<W: Write>(
    out: &mut W,
    resources: &[Resource],
    scripts_dir: &Path,
    paths: &BundlePaths,
) -> Result<()> {
    for resource in resources {
        writeln!(out, " - {}", resource.name)?;
        let target_dir = if resource.is_icon {
            &paths.resources_dir
        } else {
            &paths.scripts_dir
        };
        copy_file(
            &scripts_dir.join(&resource.name),
            &target_dir.join(&resource.name),
        )?;
    }
    Ok(())
}

fn copy_file(source: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        create_dir(parent)?;
    }
    fs::copy(source, target)
        .with_context(|| format!("copy {} to {}", source.display(), target.display()))?;
    Ok(())
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("create directory {}", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .permissions();
    perms.set_mode(perms.mode() | 0o111);
    fs::set_permissions(path, perms).with_context(|| format!("chmod +x {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("missing launcher {}", path.display()))
    }
}
