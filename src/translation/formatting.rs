/*!
 * Whitespace preservation for translated text.
 *
 * Text nodes routinely carry indentation and line breaks from the HTML
 * source. Only the trimmed core is sent to the translator; the surrounding
 * whitespace runs are spliced back verbatim so layout is unchanged.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Splits text into leading whitespace, core, and trailing whitespace
static ENVELOPE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^(\s*)(.*?)(\s*)$").unwrap());

/// A text split around its trimmed core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitespaceEnvelope<'a> {
    /// Leading whitespace run
    pub leading: &'a str,
    /// Text with surrounding whitespace removed
    pub core: &'a str,
    /// Trailing whitespace run
    pub trailing: &'a str,
}

impl<'a> WhitespaceEnvelope<'a> {
    /// Split `text` into its envelope
    pub fn split(text: &'a str) -> Self {
        match ENVELOPE_REGEX.captures(text) {
            Some(caps) => Self {
                leading: caps.get(1).map_or("", |m| m.as_str()),
                core: caps.get(2).map_or("", |m| m.as_str()),
                trailing: caps.get(3).map_or("", |m| m.as_str()),
            },
            None => Self {
                leading: "",
                core: text,
                trailing: "",
            },
        }
    }

    /// Wrap a translated core in the original whitespace
    pub fn wrap(&self, translated_core: &str) -> String {
        let mut result =
            String::with_capacity(self.leading.len() + translated_core.len() + self.trailing.len());
        result.push_str(self.leading);
        result.push_str(translated_core);
        result.push_str(self.trailing);
        result
    }
}
