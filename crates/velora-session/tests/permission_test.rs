//! Integration tests for validator-level permission checks.

mod helpers;

use velora_core::types::UserRole;

use helpers::{MockAuthBackend, RefreshReply, TestEnv, test_user};

#[tokio::test]
async fn test_permission_check_follows_the_role_hierarchy() {
    let env = TestEnv::new();
    let validator = env.validator(MockAuthBackend::new(RefreshReply::Reject));

    let seller = test_user(UserRole::Seller);
    let guest = test_user(UserRole::Guest);

    assert!(validator.has_permission(Some(&seller), UserRole::Guest));
    assert!(!validator.has_permission(Some(&guest), UserRole::Admin));
    assert!(!validator.has_permission(None, UserRole::Guest));
}

#[tokio::test]
async fn test_route_access_combines_table_and_hierarchy() {
    let env = TestEnv::new();
    let validator = env.validator(MockAuthBackend::new(RefreshReply::Reject));

    let dealer = test_user(UserRole::Dealer);
    let seller = test_user(UserRole::Seller);

    // Unlisted routes are public, even anonymously.
    assert!(validator.can_access_route(None, "/public/anything"));
    assert!(validator.can_access_route(Some(&seller), "/listings/bmw-m3"));

    // Listed routes enforce their role set, including on nested paths.
    assert!(validator.can_access_route(Some(&dealer), "/dealer/inventory"));
    assert!(!validator.can_access_route(Some(&seller), "/dealer/inventory"));
    assert!(!validator.can_access_route(None, "/account/settings"));
}
