//! Values produced by operations that fall back instead of failing.

/// A successful value plus an optional note about how it was produced.
///
/// Several docbase operations have a no-fail contract: store loads,
/// enrichment-reply parsing, and backend-assisted search ranking always
/// return something usable. `Degraded` keeps the fallback visible to the
/// caller so it can be logged rather than silently swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Degraded<T> {
    pub value: T,
    /// Why the value is weaker than the happy path, if it is.
    pub reason: Option<String>,
}

impl<T> Degraded<T> {
    /// A full-quality value.
    #[must_use]
    pub fn ok(value: T) -> Self {
        Self {
            value,
            reason: None,
        }
    }

    /// A value produced by a fallback path.
    #[must_use]
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            reason: Some(reason.into()),
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.reason.is_some()
    }

    /// Transform the carried value, keeping the reason.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Degraded<U> {
        Degraded {
            value: f(self.value),
            reason: self.reason,
        }
    }
}
