use tracing::trace;

use crate::error::{InsertError, MatchError};
use crate::params::Params;
use crate::tree::Node;

/// The HTTP methods a [`Router::insert_any`] registration expands over.
pub const METHODS: [&str; 8] = [
    "GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "HEAD", "TRACE",
];

/// A URL router keyed by HTTP method and path.
///
/// Each method owns an independent radix tree, created lazily at the first
/// registration for that method. Registration paths use `:name` for a single
/// segment parameter and `*name` for a trailing catch-all.
pub struct Router<T> {
    trees: Vec<(Box<str>, Node<T>)>,
}

/// A successful route lookup.
#[derive(Debug)]
pub struct Match<'r, 'p, T> {
    /// The value registered for the matched route.
    pub value: &'r T,
    /// The registration path of the matched route, e.g. `/users/:id`.
    pub pattern: &'r str,
    /// The captured wildcard parameters.
    pub params: Params<'p>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    pub const fn new() -> Self {
        Self { trees: Vec::new() }
    }

    /// Registers a value for the given method and path.
    ///
    /// The method is matched case-insensitively. The path must begin with a
    /// `/` and may contain `:name` and `*name` wildcard segments.
    ///
    /// # Examples
    ///
    /// ```
    /// # use velo_router::Router;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut router = Router::new();
    /// router.insert("GET", "/users/:id", "a user")?;
    /// router.insert("GET", "/static/*path", "a file")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn insert(&mut self, method: &str, path: impl Into<String>, value: T) -> Result<(), InsertError> {
        let path = path.into();

        if !path.starts_with('/') {
            return Err(InsertError::MissingLeadingSlash { path });
        }

        let method = method.to_ascii_uppercase();
        self.tree_mut(&method).add_route(&path, value)?;

        trace!(%method, %path, "route registered");

        Ok(())
    }

    /// Registers a value under every method in [`METHODS`].
    pub fn insert_any(&mut self, path: impl Into<String>, value: T) -> Result<(), InsertError>
    where
        T: Clone,
    {
        let path = path.into();
        for method in METHODS {
            self.insert(method, path.clone(), value.clone())?;
        }

        Ok(())
    }

    /// Finds the route registered for the given method and path.
    ///
    /// The trailing slash variants of [`MatchError`] signal that a route
    /// exists for the same path with one `/` added or removed, which the
    /// caller may want to redirect to instead of serving a not-found.
    ///
    /// # Examples
    ///
    /// ```
    /// # use velo_router::Router;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut router = Router::new();
    /// router.insert("GET", "/users/:id", "a user")?;
    ///
    /// let matched = router.at("GET", "/users/978")?;
    /// assert_eq!(matched.params.get("id"), Some("978"));
    /// assert_eq!(matched.pattern, "/users/:id");
    /// assert_eq!(*matched.value, "a user");
    /// # Ok(())
    /// # }
    /// ```
    pub fn at<'r, 'p>(&'r self, method: &str, path: &'p str) -> Result<Match<'r, 'p, T>, MatchError> {
        let root = self.tree(method).ok_or(MatchError::NotFound)?;

        root.at(path.as_bytes())
            .map(|(value, pattern, params)| Match {
                value,
                pattern,
                params,
            })
    }

    /// Performs a case-insensitive lookup and returns the registered path
    /// the request path should be redirected to.
    ///
    /// Wildcard spans keep the case of the request path. With
    /// `fix_trailing_slash` enabled a superfluous trailing slash is also
    /// removed and a missing one added.
    pub fn fix_path(&self, method: &str, path: &str, fix_trailing_slash: bool) -> Option<String> {
        self.tree(method)?.fix_path(path, fix_trailing_slash)
    }

    /// Visits every registered route as `(method, pattern, value)`.
    pub fn routes<'r, F>(&'r self, mut visitor: F)
    where
        F: FnMut(&'r str, &'r str, &'r T),
    {
        for (method, root) in &self.trees {
            root.for_each(&mut |pattern, value| visitor(method, pattern, value));
        }
    }

    #[doc(hidden)]
    pub fn check_priorities(&self) -> Result<u32, (u32, u32)> {
        let mut total = 0;
        for (_, root) in &self.trees {
            total += root.check_priorities()?;
        }

        Ok(total)
    }

    fn tree(&self, method: &str) -> Option<&Node<T>> {
        self.trees
            .iter()
            .find(|(m, _)| m.eq_ignore_ascii_case(method))
            .map(|(_, root)| root)
    }

    fn tree_mut(&mut self, method: &str) -> &mut Node<T> {
        let i = match self.trees.iter().position(|(m, _)| &**m == method) {
            Some(i) => i,
            None => {
                self.trees.push((Box::from(method), Node::new()));
                self.trees.len() - 1
            }
        };

        &mut self.trees[i].1
    }
}
