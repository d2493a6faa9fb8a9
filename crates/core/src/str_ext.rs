//! Extension traits for `str` type conversions.
//!
//! Optional string arguments arrive as `""` from callers that have no
//! value (CLI defaults, config files). `StrExt::non_empty` turns that convention
//! into `Option`.

/// Extension trait for `str` to handle empty-as-none semantics.
pub trait StrExt {
    /// Returns `Some(&str)` if non-empty, `None` if empty.
    #[must_use]
    fn non_empty(&self) -> Option<&str>;
}

impl StrExt for str {
    #[inline]
    fn non_empty(&self) -> Option<&str> {
        (!self.is_empty()).then_some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::StrExt;

    #[test]
    fn empty_string_is_none() {
        assert_eq!("".non_empty(), None);
        assert_eq!("http://cdn:9000".non_empty(), Some("http://cdn:9000"));
    }
}
