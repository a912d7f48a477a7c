//! pnpm-pick Core Library
//!
//! This crate provides the core functionality for pnpm-pick, a tool that lets
//! a developer pick packages (or configured groups of packages) of a pnpm
//! workspace and run pnpm scoped to that selection.
//!
//! # Key Features
//!
//! - **Workspace Discovery**: Locate the workspace root and read `pnpm-workspace.yaml`
//! - **Group Validation**: Validate the `groups` mapping of the workspace manifest
//! - **Package Filtering**: Resolve pnpm-style filter selectors to package names
//! - **Selection History**: Remember the last selections made in each workspace
//! - **Command Building**: Turn a selection into `-F=<package>` flags and run pnpm
//!
//! # Examples
//!
//! Loading the groups of the enclosing workspace:
//!
//! ```no_run
//! use pnpm_pick_core::manifest::read_workspace_manifest;
//! use pnpm_pick_core::workspace::find_workspace_dir;
//!
//! let root = find_workspace_dir(&std::env::current_dir()?, None)?;
//! let manifest = read_workspace_manifest(&root)?;
//! for (name, filters) in manifest.groups_or_empty() {
//!     println!("{name}: {}", filters.join(", "));
//! }
//! # Ok::<(), pnpm_pick_core::error::Error>(())
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod execution;
pub mod filter;
pub mod history;
pub mod manifest;
pub mod packages;
pub mod selection;
pub mod workspace;
