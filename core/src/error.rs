use std::fmt;
use std::path::PathBuf;

use crate::validate::NameError;

/// The stage of the init workflow an error came out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ResolveVersion,
    Fetch,
    Config,
    Copy,
    Substitute,
    Install,
    PostInit,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::ResolveVersion => "resolving template version",
            Step::Fetch => "fetching template",
            Step::Config => "reading template config",
            Step::Copy => "copying template",
            Step::Substitute => "changing placeholder in template",
            Step::Install => "installing dependencies",
            Step::PostInit => "running post init script",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    InvalidName(#[from] NameError),

    #[error("Cannot initialize new project because directory \"{0}\" already exists.")]
    DirectoryAlreadyExists(String),

    #[error("Cannot create project directory {path:?}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed {step}: {source:#}")]
    Step {
        step: Step,
        #[source]
        source: anyhow::Error,
    },
}

impl InitError {
    pub fn step(step: Step) -> impl FnOnce(anyhow::Error) -> InitError {
        move |source| InitError::Step { step, source }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            InitError::InvalidName(_) => 2,
            InitError::DirectoryAlreadyExists(_) => 3,
            InitError::CreateDirectory { .. } => 8,
            InitError::Step { step, .. } => match step {
                Step::ResolveVersion | Step::Fetch | Step::Config | Step::Copy => 4,
                Step::Substitute => 5,
                Step::Install => 6,
                Step::PostInit => 7,
            },
        }
    }

    pub fn failed_step(&self) -> Option<Step> {
        match self {
            InitError::Step { step, .. } => Some(*step),
            _ => None,
        }
    }
}
