use thiserror::Error;

/// Boxed error used for opaque collaborator failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors reported by a [`PlaybackDevice`](crate::device::PlaybackDevice)
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The source could not be opened or decoded
    #[error("unable to load source: {message}")]
    Load {
        /// Description of the failure
        message: String,
    },

    /// A transport command was rejected
    #[error("device rejected {command}: {message}")]
    Command {
        /// The command name
        command: &'static str,
        /// Description of the failure
        message: String,
    },

    /// No source is loaded
    #[error("no source loaded")]
    NotLoaded,

    /// Backend specific failure
    #[error("device error: {0}")]
    Other(#[source] BoxError),
}

/// Errors reported by a [`SignedUrlResolver`](crate::resolver::SignedUrlResolver)
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The brief does not exist or its id is invalid
    #[error("brief not found: {0}")]
    NotFound(String),

    /// The backend refused to sign the URL
    #[error("signing denied: {0}")]
    Denied(String),

    /// Transport failure talking to the backend
    #[error("resolver unavailable: {0}")]
    Unavailable(#[source] BoxError),
}

/// Errors that can occur while driving playback
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The signed URL for a summary could not be obtained
    #[error("URL resolution failed for {item_id}: {message}")]
    UrlResolutionFailed {
        /// The item being played
        item_id: String,
        /// Description of the failure
        message: String,
        /// The underlying resolver error, if any
        #[source]
        source: Option<ResolveError>,
    },

    /// The device rejected the source
    #[error("device failed to load {url}")]
    DeviceLoadFailed {
        /// The URL handed to the device
        url: String,
        /// The underlying device error
        #[source]
        source: DeviceError,
    },

    /// A newer `play()` superseded this request before it completed
    #[error("play request for {item_id} was superseded")]
    StaleRequestDiscarded {
        /// The item whose request was dropped
        item_id: String,
    },

    /// A transport command (pause, resume, seek, rate) failed
    #[error("{operation} failed")]
    DeviceCommandFailed {
        /// The operation that failed
        operation: &'static str,
        /// The underlying device error
        #[source]
        source: DeviceError,
    },

    /// Speed outside the allowed set
    #[error("unsupported playback speed: {speed}")]
    InvalidSpeed {
        /// The rejected value
        speed: f32,
    },
}

impl PlayerError {
    /// Whether this error should be shown to the user
    ///
    /// A discarded stale request is an internal signal: the newer request
    /// owns the outcome.
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Self::StaleRequestDiscarded { .. })
    }

    /// Whether this error aborted a `play()` attempt
    #[must_use]
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::UrlResolutionFailed { .. } | Self::DeviceLoadFailed { .. }
        )
    }
}

/// Result type alias for playback operations
pub type Result<T> = std::result::Result<T, PlayerError>;
