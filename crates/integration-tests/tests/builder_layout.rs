//! End-to-end tests for the page builder: editing through the ambassador
//! store's mutation API and publishing with an explicit save.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use rosella_app::store::{DocPath, DocumentStore};
use rosella_core::{AmbassadorId, WidgetType};
use rosella_integration_tests::{TestContext, hero_widget};

async fn seed_ambassador(ctx: &TestContext, id: &str) {
    ctx.backend
        .write(
            &DocPath::doc("ambassadors", id),
            json!({"name": "Rosy", "photoUrl": "", "whatsapp": "+39000000000"}),
            false,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_edit_session_publishes_to_storefront_visitor() {
    let ctx = TestContext::new();
    seed_ambassador(&ctx, "rosy").await;

    // Editor client builds a layout.
    ctx.state
        .ambassador()
        .load(&AmbassadorId::new("rosy"))
        .await
        .unwrap();
    ctx.state.builder().set_editing(true);
    ctx.state.builder().add_widget(WidgetType::Hero);
    ctx.state.builder().add_widget(WidgetType::ProductGrid);

    // Nothing is published before the explicit save.
    let visitor = ctx.second_client();
    visitor
        .ambassador()
        .load(&AmbassadorId::new("rosy"))
        .await
        .unwrap();
    assert!(visitor.ambassador().widgets().is_empty());

    ctx.state.builder().save_layout().await;
    assert_eq!(visitor.ambassador().widgets().len(), 2);
}

#[tokio::test]
async fn test_remove_and_resave_shrinks_published_layout() {
    let ctx = TestContext::new();
    seed_ambassador(&ctx, "rosy").await;
    ctx.state
        .ambassador()
        .load(&AmbassadorId::new("rosy"))
        .await
        .unwrap();

    let keep = ctx.state.builder().add_widget(WidgetType::Hero);
    let gone = ctx.state.builder().add_widget(WidgetType::Text);
    ctx.state.builder().save_layout().await;

    ctx.state.builder().remove_widget(&gone);
    ctx.state.builder().save_layout().await;

    let snap = ctx
        .backend
        .get_once(&DocPath::doc("ambassadors", "rosy").sub("config", "layout"))
        .await
        .unwrap();
    let widgets = snap.data.unwrap();
    let widgets = widgets.get("widgets").unwrap().as_array().unwrap();
    assert_eq!(widgets.len(), 1);
    assert_eq!(
        widgets.first().unwrap().get("id").unwrap(),
        &json!(keep.as_str())
    );
}

#[tokio::test]
async fn test_remote_layout_overwrites_unsaved_local_edits() {
    let ctx = TestContext::new();
    seed_ambassador(&ctx, "rosy").await;
    ctx.state
        .ambassador()
        .load(&AmbassadorId::new("rosy"))
        .await
        .unwrap();

    ctx.state.builder().add_widget(WidgetType::Hero);
    assert_eq!(ctx.state.ambassador().widgets().len(), 1);

    // Another editor publishes first; their snapshot replaces the unsaved
    // local layout (last snapshot wins, no version tokens).
    ctx.backend
        .write(
            &DocPath::doc("ambassadors", "rosy").sub("config", "layout"),
            json!({"widgets": [serde_json::to_value(hero_widget("remote-1")).unwrap()]}),
            false,
        )
        .await
        .unwrap();

    let widgets = ctx.state.ambassador().widgets();
    assert_eq!(widgets.len(), 1);
    assert_eq!(widgets.first().unwrap().id.as_str(), "remote-1");
}

#[tokio::test]
async fn test_widget_ids_never_collide_within_a_session() {
    let ctx = TestContext::new();
    seed_ambassador(&ctx, "rosy").await;
    ctx.state
        .ambassador()
        .load(&AmbassadorId::new("rosy"))
        .await
        .unwrap();

    let mut ids: Vec<_> = (0..20)
        .map(|_| ctx.state.builder().add_widget(WidgetType::Text))
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 20);
}

#[tokio::test]
async fn test_switching_ambassador_rekeys_the_layout_watch() {
    let ctx = TestContext::new();
    seed_ambassador(&ctx, "rosy").await;
    seed_ambassador(&ctx, "lina").await;

    ctx.state
        .ambassador()
        .load(&AmbassadorId::new("rosy"))
        .await
        .unwrap();
    ctx.state.builder().add_widget(WidgetType::Hero);
    ctx.state.builder().save_layout().await;

    ctx.state
        .ambassador()
        .load(&AmbassadorId::new("lina"))
        .await
        .unwrap();
    assert!(ctx.state.ambassador().widgets().is_empty());

    // A write to the previous ambassador's layout no longer reaches us.
    ctx.backend
        .write(
            &DocPath::doc("ambassadors", "rosy").sub("config", "layout"),
            json!({"widgets": [serde_json::to_value(hero_widget("stale")).unwrap()]}),
            false,
        )
        .await
        .unwrap();
    assert!(ctx.state.ambassador().widgets().is_empty());
}
