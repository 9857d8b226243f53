//! POSIX shell quoting.

use std::borrow::Cow;

fn is_safe(c: char) -> bool {
  c.is_ascii_alphanumeric() || matches!(c, '@' | '%' | '+' | '=' | ':' | ',' | '.' | '/' | '-' | '_')
}

/// Quote `word` so a POSIX shell reads it back as a single literal word.
pub fn quote(word: &str) -> Cow<'_, str> {
  if !word.is_empty() && word.chars().all(is_safe) {
    return Cow::Borrowed(word);
  }
  Cow::Owned(format!("'{}'", word.replace('\'', r#"'"'"'"#)))
}

/// Render an argv as a copy-pasteable shell command.
pub fn join<S: AsRef<str>>(argv: &[S]) -> String {
  argv
    .iter()
    .map(|arg| quote(arg.as_ref()))
    .collect::<Vec<_>>()
    .join(" ")
}
