//! # Quote Command
//!
//! `quote <tag>` fetches a random quote for a tag from the configured `QuoteSource`.

use crate::application::context::Context;
use crate::application::registry::{CommandDescriptor, Module};
use crate::domain::traits::QuoteLookup;
use crate::strings::messages;
use anyhow::Result;

pub fn module() -> Module {
    Module::new(
        "goodreads",
        vec![CommandDescriptor::new("quote", quote).summary("Fetch a quote from Goodreads")],
    )
}

async fn quote(ctx: Context, tag: String) -> Result<()> {
    match ctx.quotes.random_quote(&tag).await? {
        QuoteLookup::Found(quote) => {
            let text = messages::quote(
                &quote.text,
                quote.author.as_deref(),
                quote.title.as_deref(),
                quote.url.as_deref(),
                quote.index + 1,
                quote.total,
            );
            ctx.reply(&text).await
        }
        QuoteLookup::NotFound => ctx.reply(messages::NO_QUOTES).await,
        QuoteLookup::Unparseable => ctx.reply(&messages::quote_parse_failed(ctx.prefix())).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::testing::*;
    use crate::application::router::{CommandRouter, Outcome};
    use crate::domain::types::Quote;
    use std::sync::Arc;

    async fn run(lookup: QuoteLookup, body: &str) -> (Outcome, Vec<Action>) {
        let router = CommandRouter::new(services_with(vec![module()], lookup));
        let chat = FakeChat::new();
        let outcome = router
            .route(Arc::new(chat.clone()), message(Some(STRANGER), body))
            .unwrap()
            .await
            .unwrap();
        (outcome, chat.actions())
    }

    fn replied(actions: &[Action]) -> &str {
        match actions {
            [Action::Replied { content, .. }] => content,
            other => panic!("expected one reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_found_quote_is_replied() {
        let lookup = QuoteLookup::Found(Quote {
            text: "So many books".into(),
            author: Some("Frank Zappa".into()),
            title: None,
            url: None,
            index: 4,
            total: 9,
        });
        let (outcome, actions) = run(lookup, "m!quote books").await;
        assert_eq!(outcome, Outcome::Completed);
        let content = replied(&actions);
        assert!(content.contains("> So many books"));
        assert!(content.contains("Frank Zappa"));
        assert!(content.contains("#5 of 9"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let (_, actions) = run(QuoteLookup::NotFound, "m!quote nothing here").await;
        assert_eq!(replied(&actions), messages::NO_QUOTES);
    }

    #[tokio::test]
    async fn test_unparseable_page_explains() {
        let (_, actions) = run(QuoteLookup::Unparseable, "m!quote love").await;
        assert!(replied(&actions).contains("`m!help`"));
    }

    #[tokio::test]
    async fn test_source_failure_is_contained() {
        let (outcome, actions) = run(QuoteLookup::NotFound, "m!quote explode").await;
        assert!(matches!(outcome, Outcome::Failed(e) if e.contains("connection reset")));
        assert!(actions.is_empty());
    }
}
