use std::ops::Deref;

use derive_more::Display;

/// Text that is safe to be placed in a LaTeX document.
#[derive(Debug, Clone, Display, PartialEq, Eq)]
#[display("{}", _0)]
pub struct LatexString(String);

impl LatexString {
    #[must_use]
    pub fn escape(value: &str) -> Self {
        Self(v_latexescape::escape(value).to_string())
    }
}

impl From<&str> for LatexString {
    fn from(value: &str) -> Self {
        Self::escape(value)
    }
}

impl Deref for LatexString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
