//! The authorization properties, checked against real stored entities rather
//! than fixtures.

use domains::{Actor, NewBlog};
use integration_tests::{as_actor, harness, harness_with};
use services::{Action, PolicyOptions, Resource, ResourceKind};

fn new_blog(title: &str, published: bool) -> NewBlog {
    NewBlog {
        title: title.to_string(),
        description: None,
        body: "body".to_string(),
        category_ids: vec![],
        published,
        comment: true,
    }
}

#[tokio::test]
async fn owners_and_only_owners_edit_their_blogs() {
    let h = harness().await;
    let ada = h.confirmed_account("ada").await;
    let brian = h.confirmed_account("brian").await;
    let blog = h.blogs.create(&ada, new_blog("Ada's", true)).await.unwrap();

    assert!(h
        .policy
        .evaluate(&as_actor(&ada), Action::Edit, &Resource::Blog(&blog)));
    assert!(!h
        .policy
        .evaluate(&as_actor(&brian), Action::Edit, &Resource::Blog(&blog)));
    // Brian can create blogs in general, just not touch Ada's.
    assert!(h
        .policy
        .assert_can_create(&as_actor(&brian), ResourceKind::Blog)
        .is_ok());
}

#[tokio::test]
async fn unconfirmed_accounts_cannot_create_blogs() {
    let h = harness().await;
    let unconfirmed = h.register_account("brian").await;
    assert!(h
        .policy
        .assert_can_create(&as_actor(&unconfirmed), ResourceKind::Blog)
        .is_err());
}

#[tokio::test]
async fn admins_can_do_anything_to_anything() {
    let h = harness().await;
    let ada = h.confirmed_account("ada").await;
    let admin = h.admin_account("root").await;
    let draft = h.blogs.create(&ada, new_blog("Draft", false)).await.unwrap();

    for action in [Action::Read, Action::Edit, Action::Delete] {
        assert!(h
            .policy
            .evaluate(&as_actor(&admin), action, &Resource::Blog(&draft)));
        assert!(h
            .policy
            .evaluate(&as_actor(&admin), action, &Resource::Account(&ada)));
    }
}

#[tokio::test]
async fn anonymous_visibility_follows_published() {
    let h = harness().await;
    let ada = h.confirmed_account("ada").await;
    let live = h.blogs.create(&ada, new_blog("Live", true)).await.unwrap();
    let draft = h.blogs.create(&ada, new_blog("Draft", false)).await.unwrap();

    assert!(h
        .policy
        .evaluate(&Actor::Anonymous, Action::Read, &Resource::Blog(&live)));
    assert!(!h
        .policy
        .evaluate(&Actor::Anonymous, Action::Read, &Resource::Blog(&draft)));
}

#[tokio::test]
async fn collection_decisions_filter_what_each_actor_sees() {
    let h = harness().await;
    let ada = h.confirmed_account("ada").await;
    let brian = h.confirmed_account("brian").await;
    let admin = h.admin_account("root").await;
    h.blogs.create(&ada, new_blog("Ada Live", true)).await.unwrap();
    h.blogs.create(&ada, new_blog("Ada Draft", false)).await.unwrap();
    h.blogs.create(&brian, new_blog("Brian Draft", false)).await.unwrap();

    let all = h.blogs.list(Default::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    let visible_to = |actor: &Actor| {
        let decision = h
            .policy
            .evaluate_collection(actor, Action::Read, ResourceKind::Blog);
        all.iter()
            .filter(|blog| decision.permits(&Resource::Blog(blog)))
            .count()
    };

    assert_eq!(visible_to(&Actor::Anonymous), 1);
    assert_eq!(visible_to(&as_actor(&ada)), 2);
    assert_eq!(visible_to(&as_actor(&brian)), 2);
    let admin_decision =
        h.policy
            .evaluate_collection(&as_actor(&admin), Action::Read, ResourceKind::Blog);
    assert!(admin_decision.is_unrestricted());
}

#[tokio::test]
async fn always_confirmed_override_applies_end_to_end() {
    let h = harness_with(PolicyOptions {
        always_confirmed: true,
    })
    .await;
    let unconfirmed = h.register_account("brian").await;
    // Never confirmed, yet treated as such: blog creation and login work.
    assert!(h
        .policy
        .assert_can_create(&as_actor(&unconfirmed), ResourceKind::Blog)
        .is_ok());
    assert!(h
        .accounts
        .check_login("brian@example.org", "hunter2")
        .await
        .is_ok());
}
