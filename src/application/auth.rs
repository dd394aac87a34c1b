//! # Authorization
//!
//! Decides whether a requester may run a command. The decision is a plain value;
//! the router turns a denial into a refusal reply.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Everyone,
    /// Only the configured bot owner
    Owner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

pub fn authorize(requester: Option<&str>, access: Access, owner: &str) -> Decision {
    match access {
        Access::Everyone => Decision::Allow,
        Access::Owner => match requester {
            Some(requester) if is_owner(requester, owner) => Decision::Allow,
            _ => Decision::Deny,
        },
    }
}

pub fn is_owner(requester: &str, owner: &str) -> bool {
    !owner.is_empty() && requester == owner
}
