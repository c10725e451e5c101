//! Classified error type and chain utilities
//!
//! Every failure that crosses a pipeline boundary is either a [`Fault`] or a
//! foreign error that the classifier treats as unclassified. A `Fault` carries
//! an explicit [`FaultKind`] used for HTTP status and log-severity mapping,
//! and optionally chains the error that caused it.
//!
//! # Example
//!
//! ```rust
//! use restwire::error::{Fault, FaultKind};
//!
//! let fault = Fault::domain("insufficient balance");
//! assert_eq!(fault.kind(), FaultKind::Domain);
//!
//! let wrapped = Fault::wrap(fault, "transfer rejected");
//! // Wrapping never changes the decoration of the original link
//! assert!(Fault::chain_contains(&wrapped, &Fault::domain("insufficient balance")));
//! ```

use std::error::Error as StdError;
use std::fmt;

/// Boxed error type accepted from business functions and collaborators
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Result type alias using the framework error
pub type Result<T> = std::result::Result<T, Fault>;

/// Category of a classified error
///
/// The kind decides the wire-level status code and whether the message text
/// is safe to expose to callers. Unclassified failures default to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FaultKind {
    /// Unclassified failure, treated as internal
    #[default]
    Unknown,
    /// Expected business-rule rejection, safe to expose
    Domain,
    /// Downstream or system failure, never exposed verbatim
    Infra,
    /// Access denied, reason never exposed
    Auth,
    /// Startup or configuration failure, fatal at build time
    Bootstrap,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Domain => write!(f, "domain"),
            Self::Infra => write!(f, "infra"),
            Self::Auth => write!(f, "auth"),
            Self::Bootstrap => write!(f, "bootstrap"),
        }
    }
}

/// Classified error with an optional cause chain
///
/// Two faults are only "the same" when both kind and message match; identity
/// checks over a chain compare the full pair at every link so unrelated
/// errors that happen to share wording never compare equal.
#[derive(Debug)]
pub struct Fault {
    message: String,
    kind: FaultKind,
    cause: Option<BoxError>,
}

impl Fault {
    /// Create a new fault with the default `Unknown` kind
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: FaultKind::Unknown,
            cause: None,
        }
    }

    /// Create a `Domain`-kind fault
    pub fn domain(message: impl Into<String>) -> Self {
        Self::new(message).with_kind(FaultKind::Domain)
    }

    /// Create an `Infra`-kind fault
    pub fn infra(message: impl Into<String>) -> Self {
        Self::new(message).with_kind(FaultKind::Infra)
    }

    /// Create an `Auth`-kind fault
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(message).with_kind(FaultKind::Auth)
    }

    /// Create a `Bootstrap`-kind fault
    pub fn bootstrap(message: impl Into<String>) -> Self {
        Self::new(message).with_kind(FaultKind::Bootstrap)
    }

    /// Wrap an existing error as the cause of a new fault
    ///
    /// The new fault starts with the `Unknown` kind; the wrapped error keeps
    /// whatever decoration it already carries.
    pub fn wrap(cause: impl Into<BoxError>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: FaultKind::Unknown,
            cause: Some(cause.into()),
        }
    }

    /// Set the kind of this fault
    #[must_use]
    pub fn with_kind(mut self, kind: FaultKind) -> Self {
        self.kind = kind;
        self
    }

    /// The kind of this fault
    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    /// The message of this fault
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether two faults are the same link: identical kind and message
    pub fn is_same(&self, other: &Fault) -> bool {
        self.kind == other.kind && self.message == other.message
    }

    /// Walk an error chain looking for a fault link matching `target`
    ///
    /// Both kind and message must match at the link; foreign links in the
    /// chain are traversed but never match.
    pub fn chain_contains(err: &(dyn StdError + 'static), target: &Fault) -> bool {
        let mut current: Option<&(dyn StdError + 'static)> = Some(err);
        while let Some(e) = current {
            if let Some(fault) = e.downcast_ref::<Fault>() {
                if fault.is_same(target) {
                    return true;
                }
            }
            current = e.source();
        }
        false
    }

    /// Find the first fault link in an error chain
    pub fn find<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Fault> {
        find_in_chain::<Fault>(err)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Fault {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| &**cause as &(dyn StdError + 'static))
    }
}

impl From<figment::Error> for Fault {
    fn from(err: figment::Error) -> Self {
        Fault::wrap(err, "failed to load configuration").with_kind(FaultKind::Bootstrap)
    }
}

impl From<std::io::Error> for Fault {
    fn from(err: std::io::Error) -> Self {
        Fault::wrap(err, "i/o failure").with_kind(FaultKind::Infra)
    }
}

/// Find the first link of type `T` in an error chain, the root included
pub(crate) fn find_in_chain<'a, T: StdError + 'static>(
    err: &'a (dyn StdError + 'static),
) -> Option<&'a T> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(found) = e.downcast_ref::<T>() {
            return Some(found);
        }
        current = e.source();
    }
    None
}

/// Display adapter rendering an error with its full source chain
///
/// Used when logging classified failures server-side; the chain never
/// reaches a response body.
pub(crate) struct ErrorChain<'a>(pub &'a (dyn StdError + 'static));

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(cause) = source {
            write!(f, ": {}", cause)?;
            source = cause.source();
        }
        Ok(())
    }
}
