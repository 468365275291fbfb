//! End-to-end tests for the mirror/optimistic-update/reconcile cycle across
//! two connected clients sharing one backend.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use serde_json::json;

use rosella_app::store::{DocPath, DocumentStore};
use rosella_app::stores::ProductPatch;
use rosella_integration_tests::{TestContext, sample_product};

#[tokio::test]
async fn test_subscribe_is_idempotent_across_all_stores() {
    let ctx = TestContext::new();
    let stores = &ctx.state;

    stores.products().subscribe();
    stores.products().subscribe();
    stores.settings().subscribe_profile();
    stores.settings().subscribe_profile();
    stores.settings().subscribe_articles();
    stores.settings().subscribe_articles();

    // One products query, one profile doc, one articles query.
    assert_eq!(ctx.backend.active_watch_count(), 3);

    stores.products().unsubscribe();
    stores.settings().unsubscribe_all();
    assert_eq!(ctx.backend.active_watch_count(), 0);
}

#[tokio::test]
async fn test_mutation_propagates_to_second_client() {
    let ctx = TestContext::new();
    let other = ctx.second_client();
    ctx.state.products().subscribe();
    other.products().subscribe();

    let id = ctx
        .state
        .products()
        .add(&sample_product("Serum", Some(1)))
        .await
        .unwrap();

    let seen = other.products().products();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen.first().unwrap().id, id);

    ctx.state
        .products()
        .update(
            &id,
            &ProductPatch {
                stock: Some(2),
                ..ProductPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(other.products().products().first().unwrap().stock, 2);

    ctx.state.products().delete(&id).await.unwrap();
    assert!(other.products().products().is_empty());
}

#[tokio::test]
async fn test_conflicting_remote_write_wins_over_optimistic_value() {
    let ctx = TestContext::new();
    ctx.state.settings().subscribe_profile();

    ctx.state
        .settings()
        .update_profile(&rosella_app::stores::ProfilePatch {
            bio: Some("Local bio".to_owned()),
            ..rosella_app::stores::ProfilePatch::default()
        })
        .await
        .unwrap();
    assert_eq!(ctx.state.settings().profile().bio, "Local bio");

    // Another client overwrites the same field; its snapshot is the later
    // one, so it wins.
    ctx.backend
        .write(
            &DocPath::doc("settings", "public_profile"),
            json!({"bio": "Remote bio"}),
            true,
        )
        .await
        .unwrap();
    assert_eq!(ctx.state.settings().profile().bio, "Remote bio");
}

#[tokio::test]
async fn test_default_ordering_is_stable() {
    let ctx = TestContext::new();
    ctx.state.products().subscribe();

    // Unordered products sort behind every explicitly ordered one.
    ctx.state
        .products()
        .add(&sample_product("Unordered A", None))
        .await
        .unwrap();
    ctx.state
        .products()
        .add(&sample_product("Unordered B", None))
        .await
        .unwrap();
    ctx.state
        .products()
        .add(&sample_product("Ordered", Some(1)))
        .await
        .unwrap();

    let products = ctx.state.products().products();
    assert_eq!(products.len(), 3);
    assert_eq!(products.first().unwrap().name, "Ordered");
    assert!(products.iter().skip(1).all(|p| p.order.is_none()));

    // A fresh client sees the same split.
    let other = ctx.second_client();
    other.products().subscribe();
    let seen = other.products().products();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen.first().unwrap().name, "Ordered");
}

#[tokio::test]
async fn test_sequential_ratings_accumulate() {
    let ctx = TestContext::new();
    ctx.state.products().subscribe();
    let id = ctx
        .state
        .products()
        .add(&sample_product("Serum", None))
        .await
        .unwrap();

    // Each write round-trips through the snapshot before the next rating
    // reads the mirror, so the running pair stays consistent.
    for rating in [5.0, 3.0, 4.0] {
        ctx.state.products().rate(&id, rating).await.unwrap();
    }

    let product = ctx.state.products().products().into_iter().next().unwrap();
    assert_eq!(product.rating_count, Some(3));
    assert_eq!(product.rating_average, Some(4.0));
}

#[tokio::test]
async fn test_rating_rounds_to_two_decimals() {
    let ctx = TestContext::new();
    ctx.state.products().subscribe();
    let id = ctx
        .state
        .products()
        .add(&sample_product("Serum", None))
        .await
        .unwrap();

    for rating in [5.0, 4.0, 4.0] {
        ctx.state.products().rate(&id, rating).await.unwrap();
    }

    let product = ctx.state.products().products().into_iter().next().unwrap();
    // (5 + 4) / 2 = 4.5; (4.5 * 2 + 4) / 3 = 4.333... -> 4.33
    assert_eq!(product.rating_average, Some(4.33));
}
