//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.

pub const CANT_DO_THAT: &str = "I can't do that.";
pub const NO_QUOTES: &str = "❌ There are no quotes with the specified tag";
pub const SAYIN_USAGE: &str = "Usage: `sayin <room id> <text>`";

pub fn quote_parse_failed(prefix: &str) -> String {
    format!(
        concat!(
            "Something went wrong while trying to parse Goodreads.\n",
            "This might indicate that the site has updated its markup, or that something else has gone wrong.\n",
            "\n",
            "I'd appreciate it if you could notify the author (`{}help`). Thanks :smile:"
        ),
        prefix
    )
}

/// Refusal sent when a gated command is used by someone other than the owner.
pub fn refusal(requester: Option<&str>) -> String {
    match requester {
        Some(requester) => format!("{requester} no"),
        None => "no".to_string(),
    }
}

pub fn motd_set(motd: Option<&str>) -> String {
    match motd {
        Some(motd) => format!("Message of the day set to: {motd}"),
        None => "Message of the day cleared.".to_string(),
    }
}

pub fn invite(name: &str, url: &str) -> String {
    format!("**Invite {name} to your room**\n\n**[Click here]({url})**")
}

pub const NO_INVITE: &str = "No invite link has been configured.";

pub fn quote(
    text: &str,
    author: Option<&str>,
    title: Option<&str>,
    url: Option<&str>,
    position: usize,
    total: usize,
) -> String {
    let mut out = String::new();
    for line in text.lines() {
        out.push_str("> ");
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&format!("— **{}**", author.unwrap_or("Anonymous")));
    match (title, url) {
        (Some(title), Some(url)) => out.push_str(&format!(", _[{title}]({url})_")),
        (Some(title), None) => out.push_str(&format!(", _{title}_")),
        _ => {}
    }
    out.push_str(&format!("\n\n#{position} of {total} | Goodreads"));
    out
}
