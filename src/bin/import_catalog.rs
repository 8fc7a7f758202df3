//! Catalog importer: `import_catalog <sets.json> <cards.json>`.
//! Upserts expansions and cards into the database named by `DATABASE_URL`.

use std::path::PathBuf;

use anyhow::Context;
use ptcg_deck_api::catalog::{import_catalog, load_json};
use ptcg_deck_api::model::{NewCard, NewExpansion};
use ptcg_deck_api::store::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [sets_file, cards_file] = args.as_slice() else {
        eprintln!("Usage: import_catalog sets.json cards.json");
        std::process::exit(1);
    };

    let sets: Vec<NewExpansion> = load_json(&PathBuf::from(sets_file))?;
    let cards: Vec<NewCard> = load_json(&PathBuf::from(cards_file))?;

    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let store = PgStore::connect(&url).await?;
    store.migrate().await?;

    let report = import_catalog(&store, &sets, &cards).await?;
    println!(
        "Import complete: {} expansions, {} cards ({} skipped: unknown set_code)",
        report.expansions, report.cards, report.skipped_cards
    );
    Ok(())
}
