//! pnpm-pick CLI library
//!
//! The interactive half of pnpm-pick: argument capture, the terminal
//! checklist, and the workflow that ties the core crate together.
//!
//! # Architecture
//!
//! - [`cli_args`]: captures the arguments forwarded to pnpm
//! - [`checklist`]: the multi-select prompt and its key handling
//! - [`workflow`]: discovery, selection, history and launch in one pass
//!
//! # Examples
//!
//! ```bash
//! # Pick packages, then `pnpm -F=<pkg>... install`
//! ppick
//!
//! # Pick packages, then `pnpm -F=<pkg>... run build`
//! ppick run build
//!
//! # Outside a terminal the whole workspace is used: `pnpm -r test`
//! ppick test < /dev/null
//! ```

pub mod checklist;
pub mod cli_args;
pub mod workflow;
