//! End-to-end tests for the settings store: first-run article seeding
//! through the live listener, and the QR code lifecycle.

#![allow(clippy::unwrap_used)]

use rosella_integration_tests::{TestContext, png_fixture};

/// Poll until `done` holds or the attempts run out, yielding to let spawned
/// tasks (like the article seeder) make progress.
async fn wait_until(mut done: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if done() {
            return;
        }
        tokio::task::yield_now().await;
    }
    assert!(done(), "condition not reached");
}

#[tokio::test]
async fn test_empty_articles_collection_is_seeded_via_listener() {
    let ctx = TestContext::new();
    ctx.state.settings().subscribe_articles();

    wait_until(|| !ctx.state.settings().articles().is_empty()).await;

    let articles = ctx.state.settings().articles();
    assert_eq!(articles.len(), 1);
    let seeded = articles.first().unwrap();
    assert_eq!(seeded.title, "Skin Consultation");
    assert_eq!(seeded.action_text, "Fai il Test della Pelle");
    assert!(seeded.active);
    assert_eq!(seeded.order, 1);
    assert!(seeded.image_url.starts_with("https://"));
    assert!(seeded.link_url.starts_with("https://"));
}

#[tokio::test]
async fn test_seeding_happens_at_most_once() {
    let ctx = TestContext::new();
    ctx.state.settings().subscribe_articles();
    wait_until(|| !ctx.state.settings().articles().is_empty()).await;

    // Deleting the seeded article produces another empty snapshot; the
    // once-flag keeps a second seed from firing.
    let id = ctx.state.settings().articles().first().unwrap().id.clone();
    ctx.state.settings().delete_article(&id).await.unwrap();

    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    assert!(ctx.state.settings().articles().is_empty());
}

#[tokio::test]
async fn test_qr_upload_lands_in_both_clients() {
    let ctx = TestContext::new();
    let other = ctx.second_client();
    ctx.state.settings().subscribe_profile();
    other.settings().subscribe_profile();

    let qr = ctx
        .state
        .settings()
        .add_qr("Shop link", &png_fixture(256, 256))
        .await
        .unwrap();
    assert!(qr.url.starts_with("data:image/jpeg;base64,"));

    let mirrored = other.settings().profile().qr_codes;
    assert_eq!(mirrored.len(), 1);
    assert_eq!(mirrored.first().unwrap().name, "Shop link");

    ctx.state.settings().remove_qr(&qr.id).await.unwrap();
    assert!(other.settings().profile().qr_codes.is_empty());
}

#[tokio::test]
async fn test_profile_defaults_carry_mail_relay_from_config() {
    let ctx = TestContext::new();
    // No document stored yet; the mirror serves the configured defaults.
    let profile = ctx.state.settings().profile();
    assert_eq!(profile.name, "Maria Chifeac");
    assert!(profile.email_js_config.is_some());
}
