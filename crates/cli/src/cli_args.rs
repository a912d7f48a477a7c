//! Command-line argument capture.
//!
//! pnpm-pick interprets no flags of its own: everything after the binary name
//! is forwarded to pnpm untouched, including `--help`.

use std::ffi::OsString;

use clap::Parser;

/// Command-line arguments for the `ppick` binary.
///
/// # Examples
///
/// ```rust
/// use pnpm_pick_cli::cli_args::Args;
///
/// let args = Args::from_iter(["ppick", "run", "build", "--parallel"]);
/// assert_eq!(args.pass_through, ["run", "build", "--parallel"]);
/// ```
#[derive(Parser, Debug)]
#[command(
    name = "ppick",
    about = "Pick workspace packages and run pnpm scoped to them",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Args {
    /// Arguments passed to pnpm after the `-F` filters.
    ///
    /// If none are given, `install` is run.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub pass_through: Vec<String>,
}

impl Args {
    /// Captures the arguments of the current process.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_iter(std::env::args_os())
    }

    /// Captures arguments from an iterator whose first item is the binary name.
    pub fn from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut raw: Vec<OsString> = iter.into_iter().map(Into::into).collect();

        // clap swallows a leading `--`; doubling it keeps the user's one
        if raw.get(1).is_some_and(|first| first == "--") {
            raw.insert(1, OsString::from("--"));
        }

        Self::parse_from(raw)
    }
}
