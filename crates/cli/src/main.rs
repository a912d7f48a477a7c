use std::process::ExitCode;

use log::debug;
use pnpm_pick_cli::checklist::TerminalChecklist;
use pnpm_pick_cli::cli_args::Args;
use pnpm_pick_cli::workflow::{self, Context};
use pnpm_pick_core::error::Result;
use pnpm_pick_core::execution::ProcessLauncher;

fn execute() -> Result<i32> {
    let args = Args::from_env();
    let context = Context::from_env()?;
    debug!("Running with {context:?}");

    workflow::run(
        &args,
        &context,
        &mut TerminalChecklist::default(),
        &ProcessLauncher,
    )
}

fn main() -> ExitCode {
    env_logger::init();

    match execute() {
        Ok(code) => ExitCode::from(u8::try_from(code & 0xff).unwrap_or(1)),
        Err(e) => {
            if !e.is_silent() {
                eprintln!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}
