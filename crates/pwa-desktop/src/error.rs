//! Error types shared by the pipeline and its collaborators

use std::error::Error as StdError;

pub type Result<T, E = BuildError> = std::result::Result<T, E>;

/// Boxed underlying cause carried by every [`BuildError`] variant
pub type Cause = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum BuildErrorCode {
    /// Manifest is not in the format this platform accepts
    Validation = 7000,
    /// Directory or file operation failed (includes icon fetching)
    Io = 7001,
    /// Icon transcoding failed
    Conversion = 7002,
    /// Project template could not be copied
    Template = 7003,
    /// Dependency installer failed
    Install = 7004,
    /// Native packager failed
    Packaging = 7005,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("[{code}] Validation error: {message}")]
    Validation { code: u32, message: String },

    #[error("[{code}] IO error: {message}")]
    Io {
        code: u32,
        message: String,
        #[source]
        source: Option<Cause>,
    },

    #[error("[{code}] Conversion error: {message}")]
    Conversion {
        code: u32,
        message: String,
        #[source]
        source: Option<Cause>,
    },

    #[error("[{code}] Template error: {message}")]
    Template {
        code: u32,
        message: String,
        #[source]
        source: Option<Cause>,
    },

    #[error("[{code}] Install error: {message}")]
    Install {
        code: u32,
        message: String,
        #[source]
        source: Option<Cause>,
    },

    #[error("[{code}] Packaging error: {message}")]
    Packaging {
        code: u32,
        message: String,
        #[source]
        source: Option<Cause>,
    },
}

impl BuildError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            code: BuildErrorCode::Validation as u32,
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            code: BuildErrorCode::Io as u32,
            message: message.into(),
            source: None,
        }
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            code: BuildErrorCode::Conversion as u32,
            message: message.into(),
            source: None,
        }
    }

    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            code: BuildErrorCode::Template as u32,
            message: message.into(),
            source: None,
        }
    }

    pub fn install(message: impl Into<String>) -> Self {
        Self::Install {
            code: BuildErrorCode::Install as u32,
            message: message.into(),
            source: None,
        }
    }

    pub fn packaging(message: impl Into<String>) -> Self {
        Self::Packaging {
            code: BuildErrorCode::Packaging as u32,
            message: message.into(),
            source: None,
        }
    }

    /// Attach an underlying cause. Validation errors never carry one.
    pub fn with_source(mut self, cause: impl Into<Cause>) -> Self {
        match &mut self {
            Self::Validation { .. } => {}
            Self::Io { source, .. }
            | Self::Conversion { source, .. }
            | Self::Template { source, .. }
            | Self::Install { source, .. }
            | Self::Packaging { source, .. } => *source = Some(cause.into()),
        }
        self
    }

    pub fn code(&self) -> BuildErrorCode {
        match self {
            Self::Validation { .. } => BuildErrorCode::Validation,
            Self::Io { .. } => BuildErrorCode::Io,
            Self::Conversion { .. } => BuildErrorCode::Conversion,
            Self::Template { .. } => BuildErrorCode::Template,
            Self::Install { .. } => BuildErrorCode::Install,
            Self::Packaging { .. } => BuildErrorCode::Packaging,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::Io { message, .. }
            | Self::Conversion { message, .. }
            | Self::Template { message, .. }
            | Self::Install { message, .. }
            | Self::Packaging { message, .. } => message,
        }
    }
}

impl From<std::io::Error> for BuildError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string()).with_source(e)
    }
}
