//! Seed the data file with starter content.
//!
//! Writes the default public profile, the default promotional article, and
//! a demo ambassador page with a small widget layout. Existing documents
//! are left alone, so re-running the command is safe.

use serde_json::json;
use tracing::info;

use rosella_app::store::{DocPath, DocumentStore, MemoryStore};
use rosella_app::stores::default_article;
use rosella_core::{
    AmbassadorProfile, GridPlacement, PublicProfile, Socials, WidgetConfig, WidgetId, WidgetProps,
};

use super::CliError;

const DEMO_AMBASSADOR_ID: &str = "rosella-demo";

/// Seed starter content into the data file.
///
/// # Errors
///
/// Returns an error when the data file cannot be opened or written.
pub async fn run(file: Option<&str>) -> Result<(), CliError> {
    let store = super::open_data_file(file)?;

    seed_profile(&store).await?;
    seed_article(&store).await?;
    seed_demo_ambassador(&store).await?;

    info!("Seeding complete");
    Ok(())
}

async fn seed_profile(store: &MemoryStore) -> Result<(), CliError> {
    let path = DocPath::doc("settings", "public_profile");
    if store.get_once(&path).await?.exists() {
        info!("Public profile already present, skipping");
        return Ok(());
    }

    let profile = PublicProfile::default();
    store
        .write(&path, serde_json::to_value(&profile).map_err(
            rosella_app::store::StoreError::from,
        )?, false)
        .await?;
    info!("Seeded public profile");
    Ok(())
}

async fn seed_article(store: &MemoryStore) -> Result<(), CliError> {
    let existing = store.get_once(&DocPath::doc("articles", "default")).await?;
    if existing.exists() {
        info!("Default article already present, skipping");
        return Ok(());
    }

    let article = default_article();
    store
        .write(
            &DocPath::doc("articles", "default"),
            serde_json::to_value(&article).map_err(rosella_app::store::StoreError::from)?,
            false,
        )
        .await?;
    info!("Seeded default article");
    Ok(())
}

async fn seed_demo_ambassador(store: &MemoryStore) -> Result<(), CliError> {
    let profile_path = DocPath::doc("ambassadors", DEMO_AMBASSADOR_ID);
    if store.get_once(&profile_path).await?.exists() {
        info!("Demo ambassador already present, skipping");
        return Ok(());
    }

    let profile = AmbassadorProfile {
        id: rosella_core::AmbassadorId::default(),
        name: "Rosella Demo".to_owned(),
        photo_url: String::new(),
        whatsapp: String::new(),
        socials: Socials::default(),
        theme_color: None,
    };
    store
        .write(
            &profile_path,
            serde_json::to_value(&profile).map_err(rosella_app::store::StoreError::from)?,
            false,
        )
        .await?;

    let widgets = vec![
        WidgetConfig {
            id: WidgetId::generate(),
            props: WidgetProps::Hero {
                title: "Welcome".to_owned(),
                subtitle: "Discover Beauty".to_owned(),
            },
            grid: GridPlacement {
                col: 1,
                row: 1,
                width: 12,
                height: 4,
            },
        },
        WidgetConfig {
            id: WidgetId::generate(),
            props: WidgetProps::ProductGrid {
                title: "Our Products".to_owned(),
                limit: 4,
            },
            grid: GridPlacement {
                col: 1,
                row: 5,
                width: 12,
                height: 4,
            },
        },
    ];
    store
        .write(
            &profile_path.sub("config", "layout"),
            json!({
                "widgets": serde_json::to_value(&widgets)
                    .map_err(rosella_app::store::StoreError::from)?
            }),
            false,
        )
        .await?;

    info!("Seeded demo ambassador '{DEMO_AMBASSADOR_ID}' with a starter layout");
    Ok(())
}
