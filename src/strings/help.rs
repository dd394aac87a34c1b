//! # Help Text
//!
//! Builders for the self-describing commands (`help`, `commands`).

/// Longest listing we send in one message.
pub const MAX_LISTING_LEN: usize = 4000;

pub struct About<'a> {
    pub name: &'a str,
    pub owner: &'a str,
    pub prefix: &'a str,
    pub store_version: Option<&'a str>,
    pub uptime: &'a str,
    pub motd: Option<&'a str>,
    pub source_url: &'a str,
}

pub fn about(info: &About<'_>) -> String {
    let About {
        name,
        owner,
        prefix,
        store_version,
        uptime,
        motd,
        source_url,
    } = info;

    let mut out = format!(
        concat!(
            "**🤖 About {name}**\n",
            "Hi! I'm a bot made by {owner}.\n",
            "\n",
            "This bot is self-hosted, so there may be downtime. ",
            "It's also very much a work in progress, so check back for new additions.\n",
            "\n",
            "**Command prefix**: `{prefix}`\n",
            "\n",
            "**Getting started**\n",
            "* `{prefix}commands`\n",
            "* `{prefix}invite`\n",
            "\n",
            "**Environment**\n",
            "* Running on {os} ({arch})\n",
            "* {store}\n",
            "* **Uptime**: {uptime}\n",
        ),
        name = name,
        owner = owner,
        prefix = prefix,
        os = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        store = store_version.unwrap_or("Unknown database"),
        uptime = uptime,
    );
    if let Some(motd) = motd {
        out.push_str(&format!("\n**Message of the day**: {motd}\n"));
    }
    out.push_str(&format!("\n**Source repository**: {source_url}"));
    out
}

/// Lists commands as `` `name` `` lines, cut off before `MAX_LISTING_LEN`.
pub fn command_list<'a>(
    prefix: &str,
    commands: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
) -> String {
    const ELLIPSIS: &str = "…\n";
    let footer = format!("\n**Command prefix**: `{prefix}`");
    let mut out = String::from("**List of commands**\n");

    for (name, summary) in commands {
        let line = match summary {
            Some(summary) => format!("`{name}`: {summary}\n"),
            None => format!("`{name}`\n"),
        };
        if out.len() + line.len() + footer.len() + ELLIPSIS.len() > MAX_LISTING_LEN {
            out.push_str(ELLIPSIS);
            break;
        }
        out.push_str(&line);
    }

    out.push_str(&footer);
    out
}
