use super::*;
use crate::orm::users::Role;

fn user_with(id: i32, role: Role) -> users::Model {
    users::Model {
        id,
        username: format!("user{}", id),
        email: format!("user{}@example.com", id),
        first_name: None,
        last_name: None,
        role,
        bio: None,
        confirmation_code: None,
        created_at: chrono::Utc::now().naive_utc(),
    }
}

#[test]
fn capability_table_matches_roles() {
    let user = capabilities(Role::User);
    assert!(!user.can_manage_users);
    assert!(!user.can_write_catalog);
    assert!(!user.can_moderate_feedback);

    let moderator = capabilities(Role::Moderator);
    assert!(!moderator.can_manage_users);
    assert!(!moderator.can_write_catalog);
    assert!(moderator.can_moderate_feedback);

    let admin = capabilities(Role::Admin);
    assert!(admin.can_manage_users);
    assert!(admin.can_write_catalog);
    assert!(admin.can_moderate_feedback);
}

#[test]
fn user_directory_is_admin_only_even_for_reads() {
    let admin = user_with(1, Role::Admin);
    let moderator = user_with(2, Role::Moderator);
    let plain = user_with(3, Role::User);

    for action in [Action::List, Action::Retrieve, Action::Create, Action::Delete] {
        assert_eq!(decide(Some(&admin), action, Target::UserDirectory), Decision::Allow);
        assert_eq!(decide(Some(&moderator), action, Target::UserDirectory), Decision::Deny);
        assert_eq!(decide(Some(&plain), action, Target::UserDirectory), Decision::Deny);
        assert_eq!(decide(None, action, Target::UserDirectory), Decision::Deny);
    }
}

#[test]
fn own_profile_requires_authentication() {
    let plain = user_with(3, Role::User);

    assert_eq!(decide(Some(&plain), Action::Retrieve, Target::OwnProfile), Decision::Allow);
    assert_eq!(decide(Some(&plain), Action::Update, Target::OwnProfile), Decision::Allow);
    assert_eq!(decide(None, Action::Retrieve, Target::OwnProfile), Decision::Deny);
    assert_eq!(decide(None, Action::Update, Target::OwnProfile), Decision::Deny);
}

#[test]
fn catalog_writes_are_admin_only() {
    let admin = user_with(1, Role::Admin);
    let moderator = user_with(2, Role::Moderator);
    let plain = user_with(3, Role::User);

    assert_eq!(decide(None, Action::List, Target::Catalog), Decision::Allow);
    assert_eq!(decide(None, Action::Retrieve, Target::Catalog), Decision::Allow);

    for action in [Action::Create, Action::Update, Action::Delete] {
        assert_eq!(decide(Some(&admin), action, Target::Catalog), Decision::Allow);
        assert_eq!(decide(Some(&moderator), action, Target::Catalog), Decision::Deny);
        assert_eq!(decide(Some(&plain), action, Target::Catalog), Decision::Deny);
        assert_eq!(decide(None, action, Target::Catalog), Decision::Deny);
    }
}
