use core::fmt;

/// Represents errors that can occur when inserting a new route.
///
/// Every variant is a configuration mistake. The embedding application is
/// expected to unwrap registration results during startup so that a broken
/// route table never reaches traffic.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InsertError {
    /// Route paths must begin with a `/`.
    MissingLeadingSlash {
        /// The offending registration path.
        path: String,
    },
    /// A handler is already registered for the exact same path.
    Conflict {
        /// The registration path both routes resolve to.
        path: String,
    },
    /// The inserted wildcard does not agree with the wildcard already
    /// occupying this branch point.
    WildcardConflict {
        /// The conflicting segment of the new path.
        segment: String,
        /// The new registration path.
        path: String,
        /// The existing wildcard segment.
        with: String,
        /// The prefix shared by both routes up to the existing wildcard.
        prefix: String,
    },
    /// Inserting the wildcard here would make existing children unreachable.
    UnreachableWildcard {
        /// The wildcard segment of the new path.
        segment: String,
        /// The new registration path.
        path: String,
    },
    /// Wildcards must be registered with a non-empty name.
    UnnamedWildcard {
        /// The offending registration path.
        path: String,
    },
    /// Only one wildcard is allowed per path segment.
    TooManyParams {
        /// The segment holding more than one wildcard.
        segment: String,
        /// The offending registration path.
        path: String,
    },
    /// Catch-all segments are only allowed at the end of a path, right
    /// after a `/`.
    InvalidCatchAll {
        /// The offending registration path.
        path: String,
    },
    /// A catch-all cannot be registered where the segment root already
    /// holds a handler.
    CatchAllRootConflict {
        /// The offending registration path.
        path: String,
    },
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLeadingSlash { path } => {
                write!(f, "path must begin with '/' in path '{path}'")
            }
            Self::Conflict { path } => {
                write!(f, "a handler is already registered for path '{path}'")
            }
            Self::WildcardConflict {
                segment,
                path,
                with,
                prefix,
            } => {
                write!(
                    f,
                    "'{segment}' in new path '{path}' conflicts with existing wildcard '{with}' in existing prefix '{prefix}'",
                )
            }
            Self::UnreachableWildcard { segment, path } => {
                write!(
                    f,
                    "wildcard route '{segment}' conflicts with existing children in path '{path}'",
                )
            }
            Self::UnnamedWildcard { path } => {
                write!(f, "wildcards must be named with a non-empty name in path '{path}'")
            }
            Self::TooManyParams { segment, path } => {
                write!(
                    f,
                    "only one wildcard per path segment is allowed, has: '{segment}' in path '{path}'",
                )
            }
            Self::InvalidCatchAll { path } => {
                write!(f, "catch-all routes are only allowed at the end of the path in path '{path}'")
            }
            Self::CatchAllRootConflict { path } => {
                write!(
                    f,
                    "catch-all conflicts with existing handler for the path segment root in path '{path}'",
                )
            }
        }
    }
}

impl std::error::Error for InsertError {}

/// Outcome of a failed lookup. The trailing slash variants are hints:
/// a handler exists for the same path with one trailing `/` added or
/// removed, and the caller may want to redirect instead of serving a 404.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MatchError {
    /// The path was missing a trailing slash.
    MissingTrailingSlash,
    /// The path had an extra trailing slash.
    ExtraTrailingSlash,
    /// No matching route was found.
    NotFound,
}

impl MatchError {
    // Pick the hint direction from the last byte of the request path.
    pub(crate) fn unsure(full_path: &[u8]) -> Self {
        if full_path.last() == Some(&b'/') {
            MatchError::ExtraTrailingSlash
        } else {
            MatchError::MissingTrailingSlash
        }
    }
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            MatchError::MissingTrailingSlash => "match error: expected trailing slash",
            MatchError::ExtraTrailingSlash => "match error: found extra trailing slash",
            MatchError::NotFound => "match error: route not found",
        };

        f.write_str(msg)
    }
}

impl std::error::Error for MatchError {}
