//! A high performance URL router keyed by HTTP method and path.
//!
//! ```rust
//! use velo_router::Router;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router.insert("GET", "/home", "Welcome!")?;
//!     router.insert("GET", "/users/:id", "A User")?;
//!
//!     let matched = router.at("GET", "/users/978")?;
//!     assert_eq!(matched.params.get("id"), Some("978"));
//!     assert_eq!(*matched.value, "A User");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Routing
//!
//! The router matches the request path against the routes registered for the
//! request method. Static segments match the path byte for byte, and two
//! kinds of wildcard segments capture parts of the path as parameters.
//!
//! ## Parameters
//!
//! A `:name` segment matches anything up to the next `/` or the end of the
//! path, and must match at least one byte:
//!
//! ```rust
//! # use velo_router::Router;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router.insert("GET", "/users/:id", true)?;
//!
//! assert!(router.at("GET", "/users/1").is_ok());
//! assert!(router.at("GET", "/users/23").is_ok());
//! assert!(router.at("GET", "/users/1/posts").is_err());
//! # Ok(())
//! # }
//! ```
//!
//! Routes are fully deterministic: a parameter shares its branch point with
//! at most one set of static siblings, and registering a second wildcard
//! with a different name or shape at the same position is an error.
//!
//! ## Catch-all
//!
//! A `*name` segment matches everything after its `/`, including nothing at
//! all. It must be the last segment of the path:
//!
//! ```rust
//! # use velo_router::Router;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router.insert("GET", "/static/*path", true)?;
//!
//! let matched = router.at("GET", "/static/css/main.css")?;
//! assert_eq!(matched.params.get("path"), Some("css/main.css"));
//! # Ok(())
//! # }
//! ```
//!
//! # Trailing slash redirects
//!
//! A failed lookup distinguishes a plain miss from a path that would have
//! matched with one trailing `/` added or removed, so the caller can issue a
//! redirect instead of a not-found:
//!
//! ```rust
//! # use velo_router::{MatchError, Router};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router.insert("GET", "/home", true)?;
//!
//! assert_eq!(
//!     router.at("GET", "/home/").unwrap_err(),
//!     MatchError::ExtraTrailingSlash
//! );
//! # Ok(())
//! # }
//! ```
//!
//! [`Router::fix_path`] extends this with a case-insensitive lookup that
//! returns the registered spelling of a miscased request path.

#![forbid(unsafe_code)]

mod error;
mod router;
mod tree;

pub mod params;

pub use error::{InsertError, MatchError};
pub use router::{Match, Router, METHODS};

use xitca_unsafe_collection::small_str::SmallBoxedStr as SmallStr;
