//! Authorization engine behavior for reviews and comments

mod common;

use common::fixtures::*;
use critique::orm::users::Role;
use critique::permission::{decide, Action, Decision, Target};

#[test]
fn test_feedback_reads_are_open_to_everyone() {
    let feedback = Target::Feedback { author_id: 42 };

    assert_eq!(decide(None, Action::List, feedback), Decision::Allow);
    assert_eq!(decide(None, Action::Retrieve, feedback), Decision::Allow);
    assert_eq!(
        decide(None, Action::List, Target::FeedbackCollection),
        Decision::Allow
    );
}

#[test]
fn test_feedback_creation_requires_authentication() {
    let plain = make_user(3, "carol", Role::User);

    assert_eq!(
        decide(None, Action::Create, Target::FeedbackCollection),
        Decision::Deny
    );
    assert_eq!(
        decide(Some(&plain), Action::Create, Target::FeedbackCollection),
        Decision::Allow
    );
}

#[test]
fn test_author_moderator_and_admin_can_mutate_feedback() {
    let author = make_user(42, "author", Role::User);
    let moderator = make_user(2, "mod", Role::Moderator);
    let admin = make_user(1, "admin", Role::Admin);
    let feedback = Target::Feedback { author_id: 42 };

    for action in [Action::Update, Action::Delete] {
        assert_eq!(decide(Some(&author), action, feedback), Decision::Allow);
        assert_eq!(decide(Some(&moderator), action, feedback), Decision::Allow);
        assert_eq!(decide(Some(&admin), action, feedback), Decision::Allow);
    }
}

#[test]
fn test_unrelated_plain_user_cannot_mutate_feedback() {
    let stranger = make_user(99, "stranger", Role::User);
    let feedback = Target::Feedback { author_id: 42 };

    assert_eq!(decide(Some(&stranger), Action::Update, feedback), Decision::Deny);
    assert_eq!(decide(Some(&stranger), Action::Delete, feedback), Decision::Deny);
    assert_eq!(decide(None, Action::Update, feedback), Decision::Deny);
    assert_eq!(decide(None, Action::Delete, feedback), Decision::Deny);
}
