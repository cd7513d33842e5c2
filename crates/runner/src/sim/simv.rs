//! `simv` command construction and log verdict.

use std::path::Path;

use crate::common::constants::{
    ASSERTION_FAILURE_MARKER, GOOD_TRAP_MARKER, SIMV_ASSERT_ARGS, SIMV_BINARY, SIMV_LOG,
};
use crate::config::RunnerConfig;
use crate::exec::CommandSpec;

/// `simv` invocation for `workload`, run inside the build directory with
/// standard output written to `simv.log` and echoed to the console.
pub fn command(config: &RunnerConfig, workload: &Path) -> CommandSpec {
    let build_dir = config.homes.build_dir();
    let diff = config.homes.noop_home.join(&config.emu.diff);
    CommandSpec::new(format!("./{SIMV_BINARY}"))
        .arg(format!("+workload={}", workload.display()))
        .arg(format!("+diff={}", diff.display()))
        .arg("+dump-wave=fsdb")
        .args(SIMV_ASSERT_ARGS)
        .envs(config.homes.environment())
        .tee_stdout(build_dir.join(SIMV_LOG))
        .current_dir(build_dir)
}

/// Returns `true` if a `simv` log shows a passing run.
///
/// A run passes when it reached the good trap and no assertion fired.
pub fn log_passed(log: &str) -> bool {
    log.contains(GOOD_TRAP_MARKER) && !log.contains(ASSERTION_FAILURE_MARKER)
}
