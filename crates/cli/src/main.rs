//! Run wrapper CLI for RTL emulator and simv workloads.
//!
//! This binary provides a single entry point for the run modes. It performs:
//! 1. **Show:** Print the exported environment and the resolved run configuration.
//! 2. **Cores:** Find an idle window of cores and print its `numactl` pinning.
//! 3. **Run:** Run one workload on `emu` (optionally NUMA-pinned) or `simv`.
//! 4. **CI:** Run a named suite from a JSON suite file, stopping at the first failure.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

use xsrun_core::affinity::IdleCoreFinder;
use xsrun_core::ci::CiRunner;
use xsrun_core::common::{CancelToken, Error};
use xsrun_core::config::{EmuOptions, RunPolicy, RunnerConfig};
use xsrun_core::env::{HomeOverrides, HomePaths};
use xsrun_core::exec::{SubprocessExecutor, signal};
use xsrun_core::sim::{Launcher, SimulatorKind};
use xsrun_core::workload::SuiteFile;

#[derive(Parser, Debug)]
#[command(
    name = "xs",
    author,
    version,
    about = "Run wrapper for RTL emulator and simv workloads",
    long_about = "Assemble the tool environment, run workloads on emu or simv, and drive CI suites.\n\nTool homes come from flags, then NOOP_HOME/NEMU_HOME/AM_HOME/DRAMSIM3_HOME/RVTEST_HOME, then defaults next to NOOP_HOME.\n\nExamples:\n  xs run ready-to-run/linux.bin --numa --threads 8\n  xs run --simv microbench.bin\n  xs ci riscv-tests --suites ci/suites.json --timeout 1800\n  xs cores 16"
)]
struct Cli {
    #[command(flatten)]
    homes: HomeArgs,

    /// Log more (`-v` debug, `-vv` trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct HomeArgs {
    /// RTL project root (NOOP_HOME).
    #[arg(long, global = true)]
    noop_home: Option<PathBuf>,

    /// Path to NEMU.
    #[arg(long, global = true)]
    nemu: Option<PathBuf>,

    /// Path to nexus-am.
    #[arg(long, global = true)]
    am: Option<PathBuf>,

    /// Path to DRAMsim3.
    #[arg(long, global = true)]
    dramsim3: Option<PathBuf>,

    /// Path to riscv-tests.
    #[arg(long, global = true)]
    rvtest: Option<PathBuf>,

    /// Directory receiving waveforms and artifacts of failed runs.
    #[arg(long, global = true)]
    wave_dump: Option<PathBuf>,
}

impl HomeArgs {
    fn overrides(&self) -> HomeOverrides {
        HomeOverrides {
            noop: self.noop_home.clone(),
            nemu: self.nemu.clone(),
            am: self.am.clone(),
            dramsim3: self.dramsim3.clone(),
            rvtest: self.rvtest.clone(),
            wave_dump: self.wave_dump.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Maximum instructions to execute.
    #[arg(long)]
    max_instr: Option<u64>,

    /// Reference model shared object for difftest.
    #[arg(long)]
    diff: Option<String>,

    /// Use Spike instead of NEMU as the reference model.
    #[arg(long)]
    spike: bool,

    /// Simulation seed (random in 0..=9999 by default).
    #[arg(long)]
    seed: Option<u32>,

    /// Simulated memory size (8GB by default in emu).
    #[arg(long)]
    ram_size: Option<String>,

    /// Disable fork-based snapshots (LightSSS).
    #[arg(long)]
    disable_fork: bool,

    /// Disable difftest.
    #[arg(long)]
    no_diff: bool,

    /// Disable the debug database dump.
    #[arg(long)]
    no_db: bool,

    /// Restorer binary for checkpoint workloads.
    #[arg(long)]
    gcpt_restore_bin: Option<PathBuf>,

    /// Pin emu to an idle window of cores with numactl.
    #[arg(long)]
    numa: bool,

    /// Emulator threads; also the pinned window size.
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Per-run timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Give up waiting for idle cores after this many seconds.
    #[arg(long)]
    numa_max_wait: Option<u64>,

    /// Run on simv instead of emu.
    #[arg(long)]
    simv: bool,

    /// Extra arguments passed to emu verbatim (after `--`).
    #[arg(last = true)]
    extra: Vec<String>,
}

impl RunArgs {
    fn emu_options(&self) -> EmuOptions {
        let mut emu = EmuOptions {
            max_instr: self.max_instr,
            ram_size: self.ram_size.clone(),
            fork: !self.disable_fork,
            difftest: !self.no_diff,
            dump_db: !self.no_db,
            gcpt_restore_bin: self.gcpt_restore_bin.clone(),
            extra_args: self.extra.clone(),
            ..EmuOptions::default()
        };
        if let Some(diff) = &self.diff {
            emu.diff.clone_from(diff);
        }
        if let Some(seed) = self.seed {
            emu.seed = seed;
        }
        if self.spike { emu.with_spike() } else { emu }
    }

    const fn policy(&self) -> RunPolicy {
        RunPolicy {
            numa: self.numa,
            threads: self.threads,
            timeout_secs: self.timeout,
            numa_max_wait_secs: self.numa_max_wait,
        }
    }

    const fn simulator(&self) -> SimulatorKind {
        if self.simv {
            SimulatorKind::Simv
        } else {
            SimulatorKind::Emu
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the exported environment and the resolved configuration.
    Show {
        /// Print the configuration as JSON.
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Wait for an idle window of cores and print its pinning.
    Cores {
        /// Number of contiguous cores.
        cores: usize,

        /// Give up after this many seconds.
        #[arg(long)]
        max_wait: Option<u64>,

        /// Print the window as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run one workload.
    Run {
        /// Workload image or checkpoint.
        workload: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Run a CI suite.
    Ci {
        /// Suite name in the suite file.
        suite: String,

        /// JSON suite file.
        #[arg(long, default_value = "ci/suites.json")]
        suites: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn config_for(homes: &HomeArgs, run: &RunArgs) -> xsrun_core::Result<RunnerConfig> {
    let mut config = RunnerConfig::new(HomePaths::resolve(&homes.overrides())?);
    config.emu = run.emu_options();
    config.run = run.policy();
    Ok(config)
}

fn render_json<T: Serialize>(value: &T, pretty: bool) -> xsrun_core::Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.map_err(Error::Serialize)
}

fn execute(cli: Cli) -> xsrun_core::Result<i32> {
    match cli.command {
        Commands::Show { json, run } => {
            let config = config_for(&cli.homes, &run)?;
            if json {
                println!("{}", render_json(&config, true)?);
            } else {
                print!("{config}");
            }
            Ok(0)
        }
        Commands::Cores {
            cores,
            max_wait,
            json,
        } => {
            signal::install_interrupt_handler()?;
            let mut cancel = CancelToken::new().observing_interrupts();
            if let Some(secs) = max_wait {
                cancel = cancel.with_timeout(Duration::from_secs(secs));
            }
            let window = IdleCoreFinder::system().find(cores, &cancel)?;
            if json {
                println!("{}", render_json(&window, false)?);
            } else {
                println!("{} {} {}", window.node, window.start, window.end);
                println!("{}", window.numactl_args().join(" "));
            }
            Ok(0)
        }
        Commands::Run { workload, run } => {
            let config = config_for(&cli.homes, &run)?;
            signal::install_interrupt_handler()?;
            let mut executor = SubprocessExecutor::new().with_timeout(config.run.timeout());
            let mut launcher = Launcher::new(&config, &mut executor);
            Ok(launcher.run(run.simulator(), &workload)?.code())
        }
        Commands::Ci { suite, suites, run } => {
            let config = config_for(&cli.homes, &run)?;
            let workloads = SuiteFile::load(&suites)?
                .suite(&suite)?
                .workloads(&config.homes.path_variables(), &mut rand::thread_rng())?;
            signal::install_interrupt_handler()?;
            let mut executor = SubprocessExecutor::new().with_timeout(config.run.timeout());
            let launcher = Launcher::new(&config, &mut executor);
            CiRunner::new(launcher, run.simulator()).run(&workloads)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match execute(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{e}");
            process::exit(e.exit_code(signal::interrupted()));
        }
    }
}
