//! Terminal-backed [`Prompter`].

use inquire::error::InquireError;
use inquire::{Confirm, MultiSelect, Select, Text};
use sprig_core::{Error, Prompter, Result};

/// Asks questions on the terminal with `inquire`.
///
/// Escape and Ctrl-C count as cancellation. Without a terminal every
/// question fails with [`Error::Prompt`] so scripts get an error instead of
/// a hang.
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn ensure_terminal() -> Result<()> {
        if console::user_attended() {
            Ok(())
        } else {
            Err(Error::Prompt(
                "no terminal to ask on; pass the value as an argument instead".into(),
            ))
        }
    }
}

/// Turn an `inquire` outcome into the `Prompter` convention.
fn answered<T>(result: std::result::Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(Error::Prompt(e.to_string())),
    }
}

impl Prompter for TerminalPrompter {
    fn select_one(
        &self,
        message: &str,
        options: &[String],
        descriptions: Option<&[String]>,
    ) -> Result<Option<String>> {
        Self::ensure_terminal()?;
        let labels: Vec<String> = match descriptions {
            Some(descriptions) => options
                .iter()
                .zip(descriptions)
                .map(|(option, description)| {
                    if description.is_empty() {
                        option.clone()
                    } else {
                        format!("{option} {description}")
                    }
                })
                .collect(),
            None => options.to_vec(),
        };

        let picked = answered(Select::new(message, labels).raw_prompt())?;
        Ok(picked.and_then(|choice| options.get(choice.index).cloned()))
    }

    fn confirm(&self, message: &str, default: bool) -> Result<Option<bool>> {
        Self::ensure_terminal()?;
        answered(Confirm::new(message).with_default(default).prompt())
    }

    fn input(&self, message: &str, default: Option<&str>) -> Result<Option<String>> {
        Self::ensure_terminal()?;
        let mut text = Text::new(message);
        if let Some(default) = default {
            text = text.with_default(default);
        }
        answered(text.prompt())
    }

    fn multi_select(&self, message: &str, options: &[String]) -> Result<Option<Vec<String>>> {
        Self::ensure_terminal()?;
        answered(MultiSelect::new(message, options.to_vec()).prompt())
    }
}
