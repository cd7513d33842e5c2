//! Global Constants.
//!
//! This module defines the fixed values used across the wrapper. It includes:
//! 1. **Window Selection:** Utilization thresholds and backoff bounds for the idle-core finder.
//! 2. **Emulator Defaults:** Reference model path, seed range and stack limit for `emu` runs.
//! 3. **Layout:** Directory and file names inside the RTL project tree.

use std::time::Duration;

/// Average per-core utilization (percent) a window must stay below.
///
/// A window of `n` cores is accepted only if its summed utilization is below
/// `WINDOW_AVG_USAGE_LIMIT * n`.
pub const WINDOW_AVG_USAGE_LIMIT: f64 = 30.0;

/// Utilization (percent) above which a single core disqualifies its window.
pub const CORE_PEAK_USAGE_LIMIT: f64 = 90.0;

/// Shortest randomized delay between two window searches.
pub const BACKOFF_MIN: Duration = Duration::from_secs(1);

/// Longest randomized delay between two window searches.
pub const BACKOFF_MAX: Duration = Duration::from_secs(60);

/// Interval over which `/proc/stat` deltas are taken for one utilization sample.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Granularity at which sleeps and waits check for cancellation.
pub const POLL_SLICE: Duration = Duration::from_millis(100);

/// Process names containing this fragment never count as core reservations.
///
/// Forwarded login sessions carry the remote command line in their argv.
pub const RESERVATION_EXCLUDED_NAME: &str = "ssh";

/// Default reference model shared object passed to `--diff`.
pub const DEFAULT_DIFF: &str = "./ready-to-run/riscv64-nemu-interpreter-so";

/// Reference model name replaced when Spike is selected.
pub const NEMU_REF_NAME: &str = "nemu-interpreter";

/// Spike reference model name.
pub const SPIKE_REF_NAME: &str = "spike";

/// Upper bound (inclusive) of the randomly drawn emulator seed.
pub const MAX_SEED: u32 = 9999;

/// Stack limit applied to `emu` processes (32 MiB).
pub const EMU_STACK_LIMIT: u64 = 32 * 1024 * 1024;

/// Value exported as `MODULEPATH` to every subprocess.
pub const MODULEPATH: &str = "/usr/share/Modules/modulefiles:/etc/modulefiles";

/// Build output directory below `NOOP_HOME`.
pub const BUILD_DIR: &str = "build";

/// Emulator executable name inside the build directory.
pub const EMU_BINARY: &str = "emu";

/// VCS simulator executable name inside the build directory.
pub const SIMV_BINARY: &str = "simv";

/// Log file capturing `simv` standard output.
pub const SIMV_LOG: &str = "simv.log";

/// Generated top-level netlist, copied next to waveforms on failure.
pub const SIM_TOP_VERILOG: &str = "rtl/SimTop.v";

/// `simv` assertion options.
pub const SIMV_ASSERT_ARGS: [&str; 4] = [
    "-assert",
    "finish_maxfail=30",
    "-assert",
    "global_finish_maxfail=10000",
];

/// Marker printed by the testbench when the workload reaches its good trap.
pub const GOOD_TRAP_MARKER: &str = "HIT GOOD TRAP";

/// Marker printed by VCS for a failing assertion.
pub const ASSERTION_FAILURE_MARKER: &str = "Offending";

/// Checkpoint suffixes considered by random checkpoint selection.
pub const CHECKPOINT_SUFFIXES: [&str; 2] = [".zstd", ".gz"];

/// Exit code reported for a run stopped by SIGINT.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;
