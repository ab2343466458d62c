//! Interactive input capability.
//!
//! Every method returns `Ok(None)` when the user cancels. Callers turn that
//! into [`crate::Error::Cancelled`] or a no-op, never into a failure.

use crate::Result;

/// Source of answers to interactive questions.
#[allow(clippy::missing_errors_doc)]
pub trait Prompter {
    /// Pick one of `options`. `descriptions`, when given, is parallel to `options`.
    fn select_one(
        &self,
        message: &str,
        options: &[String],
        descriptions: Option<&[String]>,
    ) -> Result<Option<String>>;

    /// Yes/no question.
    fn confirm(&self, message: &str, default: bool) -> Result<Option<bool>>;

    /// Free text, pre-filled with `default`.
    fn input(&self, message: &str, default: Option<&str>) -> Result<Option<String>>;

    /// Pick any number of `options`.
    fn multi_select(&self, message: &str, options: &[String]) -> Result<Option<Vec<String>>>;
}
