//! # Invocation Parsing
//!
//! Splits raw message text into a command name and the rest of the line.
//! The rest of the line is handed to the command untouched apart from trimming.

/// A recognised command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub name: &'a str,
    pub args: &'a str,
}

/// Returns `None` when `text` is not addressed to the bot.
///
/// An empty name (`"m!"` on its own) is still an invocation; it simply never
/// resolves to a command.
pub fn parse_invocation<'a>(text: &'a str, prefix: &str) -> Option<Invocation<'a>> {
    let unprefixed = text.strip_prefix(prefix)?.trim();

    let (name, args) = match unprefixed.find(char::is_whitespace) {
        Some(idx) => (&unprefixed[..idx], unprefixed[idx..].trim()),
        None => (unprefixed, ""),
    };

    Some(Invocation { name, args })
}
