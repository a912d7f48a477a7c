use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("pnpm-workspace.yaml not found in `{}` or any parent directory", .start.display())]
    WorkspaceNotFound { start: PathBuf },

    #[error(
        "The workspace manifest file should be named \"pnpm-workspace.yaml\". File found: `{}`",
        .0.display()
    )]
    BadWorkspaceManifestName(PathBuf),

    #[error("Expected the workspace manifest at `{}` to be a mapping", .0.display())]
    InvalidWorkspaceManifest(PathBuf),

    #[error("`groups` key not found in pnpm-workspace.yaml")]
    MissingGroupsConfig,

    #[error("`groups` key must be an object")]
    InvalidGroupsType,

    #[error("`groups` values must be arrays of strings (group `{}` is not)", .group)]
    InvalidGroupEntry { group: String },

    #[error("`packages` field in pnpm-workspace.yaml must be an array of strings")]
    InvalidPackagesField,

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path.display(), .original)]
    Yaml {
        action: String,
        file_description: String,
        path: PathBuf,
        original: serde_yaml::Error,
    },

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path.display(), .original)]
    Json {
        action: String,
        file_description: String,
        path: PathBuf,
        original: serde_json::Error,
    },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path.display(), .original)]
    Io {
        file_description: String,
        path: PathBuf,
        original: std::io::Error,
    },

    #[error(
        "The history file at `{}` was corrupt ({}) and has been removed. Please run the command again.",
        .path.display(),
        .reason
    )]
    CorruptHistory { path: PathBuf, reason: String },

    #[error("Invalid glob pattern `{}`: {}", .0, .1)]
    Glob(String, globset::Error),

    #[error("Nothing to select: no groups or packages found in the workspace at `{}`", .root.display())]
    NothingToSelect { root: PathBuf },

    #[error("Found more than one workspace package named `{}`", .0)]
    DuplicatePackageName(String),

    #[error("Failed to start `{}`: {}", .program, .original)]
    Spawn {
        program: String,
        original: std::io::Error,
    },

    #[error("STDIO error: {}", .0)]
    Stdio(#[from] std::io::Error),

    #[error("Selection cancelled")]
    Cancelled,
}

impl Error {
    pub fn io_error(file_description: &str, path: impl Into<PathBuf>, original: std::io::Error) -> Self {
        Self::Io {
            file_description: file_description.to_string(),
            path: path.into(),
            original,
        }
    }

    pub fn yaml_error(
        action: &str,
        file_description: &str,
        path: impl Into<PathBuf>,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action: action.to_string(),
            file_description: file_description.to_string(),
            path: path.into(),
            original,
        }
    }

    pub fn json_error(
        action: &str,
        file_description: &str,
        path: impl Into<PathBuf>,
        original: serde_json::Error,
    ) -> Self {
        Self::Json {
            action: action.to_string(),
            file_description: file_description.to_string(),
            path: path.into(),
            original,
        }
    }

    /// Whether this error should end the run without printing anything.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
