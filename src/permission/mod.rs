//! Role-based authorization engine.
//!
//! One capability table maps each role onto what it may manage, and
//! [`decide`] evaluates a (requester, action, target) triple against an
//! ordered policy. Handlers never inspect roles directly; they ask this
//! module.

#[cfg(test)]
mod test;

use crate::orm::users::{self, Role};

/// Actions a requester can attempt against a target.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Read-only actions are "safe" and open to everyone on most targets.
    pub fn is_safe(self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }
}

/// What a request is aimed at.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Target {
    /// The /users collection and any record in it.
    UserDirectory,
    /// The requester's own profile.
    OwnProfile,
    /// Categories, genres and titles.
    Catalog,
    /// The review/comment collections under a title or review.
    FeedbackCollection,
    /// A concrete review or comment, owned by its author.
    Feedback { author_id: i32 },
}

/// What a role is allowed to manage.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub can_manage_users: bool,
    pub can_write_catalog: bool,
    pub can_moderate_feedback: bool,
}

/// The role-capability table.
pub fn capabilities(role: Role) -> Capabilities {
    match role {
        Role::User => Capabilities {
            can_manage_users: false,
            can_write_catalog: false,
            can_moderate_feedback: false,
        },
        Role::Moderator => Capabilities {
            can_manage_users: false,
            can_write_catalog: false,
            can_moderate_feedback: true,
        },
        Role::Admin => Capabilities {
            can_manage_users: true,
            can_write_catalog: true,
            can_moderate_feedback: true,
        },
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Evaluate the policy table. The first matching rule governs; there is
/// no partial application.
pub fn decide(requester: Option<&users::Model>, action: Action, target: Target) -> Decision {
    let caps = requester.map(|u| capabilities(u.role));

    match target {
        // User management is closed to everyone but user managers,
        // reads included.
        Target::UserDirectory => match caps {
            Some(c) if c.can_manage_users => Decision::Allow,
            _ => Decision::Deny,
        },

        // Any authenticated user may read and update their own record.
        Target::OwnProfile => match requester {
            Some(_) if matches!(action, Action::Retrieve | Action::Update) => Decision::Allow,
            _ => Decision::Deny,
        },

        Target::Catalog => {
            if action.is_safe() {
                return Decision::Allow;
            }
            match caps {
                Some(c) if c.can_write_catalog => Decision::Allow,
                _ => Decision::Deny,
            }
        }

        // Creating a review or comment only requires being logged in.
        Target::FeedbackCollection => {
            if action.is_safe() {
                return Decision::Allow;
            }
            match requester {
                Some(_) => Decision::Allow,
                None => Decision::Deny,
            }
        }

        // Mutating a concrete review or comment takes ownership or a
        // moderation capability.
        Target::Feedback { author_id } => {
            if action.is_safe() {
                return Decision::Allow;
            }
            match requester {
                Some(u) if u.id == author_id => Decision::Allow,
                Some(u) if capabilities(u.role).can_moderate_feedback => Decision::Allow,
                _ => Decision::Deny,
            }
        }
    }
}
