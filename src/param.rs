//! Late-bindable configuration values.
//!
//! Connection identifiers are often only known once the owning pipeline
//! actually runs, well after the configuration object was assembled. A
//! [`Param`] carries either a value fixed at construction time or a shared
//! cell that is bound exactly once, later. Everything reading a `Param`
//! re-evaluates it at call time instead of caching.

use std::sync::Arc;

use once_cell::sync::OnceCell;

/// A value that is either fixed up front or bound once at runtime.
///
/// Clones of a deferred param share the underlying cell, so binding through
/// one clone is visible through all of them.
#[derive(Clone, Debug)]
pub enum Param<T> {
    /// Known at construction time.
    Fixed(T),
    /// Bound at most once, some time after construction.
    Deferred(Arc<OnceCell<T>>),
}

impl<T> Param<T> {
    /// A param fixed to `value`.
    pub fn fixed(value: T) -> Self {
        Param::Fixed(value)
    }

    /// A fresh, unbound deferred param.
    pub fn deferred() -> Self {
        Param::Deferred(Arc::new(OnceCell::new()))
    }

    /// The current value, if fixed or already bound.
    pub fn get(&self) -> Option<&T> {
        match self {
            Param::Fixed(value) => Some(value),
            Param::Deferred(cell) => cell.get(),
        }
    }

    /// Bind a deferred param.
    ///
    /// Returns the value back when the param is fixed or was already bound;
    /// a binding never overwrites an observable value.
    pub fn bind(&self, value: T) -> Result<(), T> {
        match self {
            Param::Fixed(_) => Err(value),
            Param::Deferred(cell) => cell.set(value),
        }
    }

    /// Whether a value is currently readable.
    pub fn is_bound(&self) -> bool {
        self.get().is_some()
    }
}

impl<T> Default for Param<T> {
    fn default() -> Self {
        Param::deferred()
    }
}

impl<T> From<T> for Param<T> {
    fn from(value: T) -> Self {
        Param::Fixed(value)
    }
}

impl From<&str> for Param<String> {
    fn from(value: &str) -> Self {
        Param::Fixed(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::Param;

    #[test]
    fn fixed_param_is_always_bound() {
        let param = Param::fixed("v1".to_owned());
        assert_eq!(param.get().map(String::as_str), Some("v1"));
        assert!(param.is_bound());
    }

    #[test]
    fn deferred_param_binds_once() {
        let param: Param<String> = Param::deferred();
        assert!(param.get().is_none());

        param.bind("late".to_owned()).unwrap();
        assert_eq!(param.get().map(String::as_str), Some("late"));

        assert_eq!(param.bind("again".to_owned()), Err("again".to_owned()));
        assert_eq!(param.get().map(String::as_str), Some("late"));
    }

    #[test]
    fn clones_share_the_binding_cell() {
        let param: Param<String> = Param::deferred();
        let clone = param.clone();

        clone.bind("shared".to_owned()).unwrap();
        assert_eq!(param.get().map(String::as_str), Some("shared"));
    }

    #[test]
    fn binding_a_fixed_param_returns_the_value() {
        let param = Param::fixed(7u32);
        assert_eq!(param.bind(8), Err(8));
        assert_eq!(param.get(), Some(&7));
    }
}
