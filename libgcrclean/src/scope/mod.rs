//! Project scope: which repositories a run may touch.


/// Ordered set of repository-name prefixes supplied at startup.
///
/// A repository is in scope iff at least one prefix is a literal string
/// prefix of its name. There is no path-segment awareness: the prefix
/// `proj` also matches `project-x/app`.
///
/// # Examples
///
/// ```
/// use libgcrclean::scope::ProjectScope;
///
/// let scope = ProjectScope::new(["my-project", "other-project"]);
/// assert!(scope.contains("my-project/backend"));
/// assert!(!scope.contains("third-project/backend"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectScope {
    prefixes: Vec<String>,
}

impl ProjectScope {
    /// Creates a scope from project identifiers, keeping their order.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `repository` starts with any of the prefixes.
    pub fn contains(&self, repository: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| repository.starts_with(prefix.as_str()))
    }

    /// The prefixes in the order they were given.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}
