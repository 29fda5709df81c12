//! Shell quoting for commands embedded in the document
//!
//! One primitive, [`quote_shell_word`], is applied once per nesting boundary.
//! It wraps the word in single quotes and turns each embedded `'` into
//! `'"'"'` (close, double-quoted quote, reopen), which a POSIX shell reads
//! back as the original text for any input without NUL bytes.

use std::collections::BTreeMap;

/// Quote one word so a POSIX shell reads it back verbatim
#[must_use]
pub fn quote_shell_word(word: &str) -> String {
    format!("'{}'", word.replace('\'', r#"'"'"'"#))
}

/// Quote every word and join them with single spaces
#[must_use]
pub fn quote_shell_words<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .map(|word| quote_shell_word(word.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `script` through `bash -c`, as a single quoted argument
#[must_use]
pub fn bash_command(script: &str) -> String {
    format!("bash -c {}", quote_shell_word(script))
}

/// A `psql` invocation that reads its script from a here-string and binds
/// untrusted values as `psql` variables
///
/// Variables are emitted in lexical order so the same bindings always render
/// the same command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PsqlCommand {
    variables: BTreeMap<String, String>,
    script: String,
}

impl PsqlCommand {
    /// Create command running `script`
    #[must_use]
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            variables: BTreeMap::new(),
            script: script.into(),
        }
    }

    /// Bind a variable; the script refers to it as `:name`, `:'name'` or
    /// `:"name"`
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Render the command line
    #[must_use]
    pub fn render(&self) -> String {
        let mut command = String::from("psql --set=ON_ERROR_STOP=0");
        for (name, value) in &self.variables {
            command.push_str(" --set=");
            command.push_str(name);
            command.push('=');
            command.push_str(&quote_shell_word(value));
        }
        command.push_str(" --file=- <<< ");
        command.push_str(&quote_shell_word(&self.script));
        command
    }
}
