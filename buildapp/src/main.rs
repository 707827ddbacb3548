//! Build a macOS `.app` bundle around a Tkinter tool.
//!
//! Probes Python interpreters for a working Tk, lets the user pick one, and
//! writes `<App>.app` with a launcher whose shebang names that interpreter.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use buildapp::build::{BuildOptions, BuildOutcome, run_build};
use buildapp::exit_codes;
use buildapp::io::config::load_config;
use buildapp::io::host::HostInfo;
use buildapp::io::interpreter::SystemProbe;
use buildapp::logging;

#[derive(Parser)]
#[command(
    name = "buildapp",
    version,
    about = "Builds the app bundle with a selectable python interpreter"
)]
struct Cli {
    /// Use the current shebang in the existing bundle (overrides --python-path).
    #[arg(short = 'c', long)]
    use_current: bool,

    /// The python path to use in the bundle launcher's shebang.
    #[arg(short = 'p', long)]
    python_path: Option<String>,

    /// Enforce minimum tk versions depending on the OS version (default is just to suggest).
    #[arg(short = 'm', long)]
    minimum_tk_enforced: bool,

    /// Do not attempt to load discovered tk instances to verify whether or not they crash.
    #[arg(short = 't', long)]
    do_not_test_load_tk: bool,

    /// Target output path for the bundle (a directory gets `<App>.app` appended).
    #[arg(short = 'o', long)]
    output_path: Option<PathBuf>,

    /// Directory holding `<App>.py` and `Scripts/` (defaults to the current directory).
    #[arg(short = 's', long)]
    source_dir: Option<PathBuf>,

    /// TOML configuration file (defaults to built-in values).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    if !cfg!(target_os = "macos") {
        println!("Can only be run on macOS");
        std::process::exit(exit_codes::FAILURE);
    }
    logging::init();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("An error occurred!");
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::FAILURE);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let cfg = load_config(cli.config.as_deref())?;
    let source_dir = match cli.source_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolve current directory")?,
    };
    let options = BuildOptions {
        use_current: cli.use_current,
        python_path: cli.python_path,
        enforce_minimum: cli.minimum_tk_enforced,
        test_load_tk: !cli.do_not_test_load_tk,
        output_path: cli.output_path,
        source_dir,
    };
    let host = HostInfo::detect();
    debug!(?host, ?options, "starting build");
    let probe = SystemProbe::new(cfg.liveness_warning());

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    let outcome = run_build(&probe, &host, &cfg, &options, &mut input, &mut out)?;
    Ok(match outcome {
        BuildOutcome::Saved(_) | BuildOutcome::Quit => exit_codes::OK,
        BuildOutcome::NotSaved(_) => exit_codes::FAILURE,
    })
}
