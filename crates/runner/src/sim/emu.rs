//! `emu` command construction.
//!
//! The emulator is run from `$NOOP_HOME/build/emu` with a 32 MiB stack limit,
//! optionally behind a `numactl` pinning prefix. Pinned runs go through a
//! shell that outlives `numactl`, so the pinning stays visible to other
//! wrappers looking for reserved cores.

use std::path::Path;

use crate::affinity::CoreWindow;
use crate::common::constants::{EMU_BINARY, EMU_STACK_LIMIT};
use crate::config::{EmuOptions, RunnerConfig};
use crate::exec::CommandSpec;

/// Emulator arguments derived from the options, in the emulator's flag order.
pub fn option_args(opts: &EmuOptions) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(max_instr) = opts.max_instr {
        args.extend(["--max-instr".to_string(), max_instr.to_string()]);
    }
    args.extend(["--diff".to_string(), opts.diff.clone()]);
    args.extend(["--seed".to_string(), opts.seed.to_string()]);
    if let Some(ram_size) = &opts.ram_size {
        args.extend(["--ram-size".to_string(), ram_size.clone()]);
    }
    if opts.fork {
        args.push("--enable-fork".to_string());
    }
    if !opts.difftest {
        args.push("--no-diff".to_string());
    }
    if opts.dump_db {
        args.push("--dump-db".to_string());
    }
    if let Some(restorer) = &opts.gcpt_restore_bin {
        args.extend(["-r".to_string(), restorer.display().to_string()]);
    }
    args.extend(opts.extra_args.iter().cloned());
    args
}

/// Full `emu` invocation for `workload`, pinned to `window` if given.
pub fn command(config: &RunnerConfig, workload: &Path, window: Option<&CoreWindow>) -> CommandSpec {
    let program = config.homes.build_dir().join(EMU_BINARY);
    let cmd = CommandSpec::new(program.display().to_string())
        .arg("-i")
        .arg(workload.display().to_string())
        .args(option_args(&config.emu))
        .envs(config.homes.environment())
        .stack_limit(EMU_STACK_LIMIT);
    match window {
        Some(window) => cmd.prefixed(window.numactl_args()).in_shell(),
        None => cmd,
    }
}
