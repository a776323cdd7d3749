use computer_inventory::{
    cache::CacheBackend,
    config::{database, settings},
    core::{AssignmentEngine, employee},
    errors::Result,
    notification::HttpNotifier,
};
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load settings (config.toml + environment overrides)
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Critical error loading settings: {}", e))?;
    info!("Notifications go to {}", settings.notification.url);

    // 4. Connect to the store and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed the employee roster
    employee::seed_employees(&db, &settings.employees)
        .await
        .inspect_err(|e| error!("Failed to seed employees: {}", e))?;

    // 6. Wire the engine; store, cache, and notifier are created once here
    let cache = CacheBackend::connect(&settings.cache)
        .await
        .inspect(|_| info!("Using {:?} cache backend", settings.cache.backend))
        .inspect_err(|e| error!("Failed to connect to cache: {}", e))?;
    let notifier = HttpNotifier::new(&settings.notification)?;
    let engine = AssignmentEngine::new(db, cache, notifier, settings.assignment);

    // 7. Report the current inventory per rostered employee
    let computers = engine.get_all_computers().await?;
    info!("Inventory holds {} computers", computers.len());
    for entry in &settings.employees {
        match engine.list_computers_by_employee(&entry.abbreviation).await {
            Ok(owned) if owned.len() as u64 >= engine.settings().quota => warn!(
                "{} holds {} computers (quota {})",
                entry.abbreviation,
                owned.len(),
                engine.settings().quota
            ),
            Ok(owned) => info!("{} holds {} computers", entry.abbreviation, owned.len()),
            Err(e) => error!("Failed to list computers for {}: {}", entry.abbreviation, e),
        }
    }

    Ok(())
}
