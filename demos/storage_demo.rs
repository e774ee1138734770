use env_logger::Env;
use log::{info, warn};
use roster::{DatabaseStorage, SearchQuery, ServiceError, UserForm, UserService, UserStorage};
use std::env;
use std::fs;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    // Initialize logger (RUST_LOG can override; default to info)
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init();

    // Choose an output directory for the demo database
    let out_dir: PathBuf = env::var("STORAGE_DEMO_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            env::current_dir()
                .expect("cwd")
                .join("target")
                .join("storage_demo")
        });
    fs::create_dir_all(&out_dir).expect("create output dir");

    let db_path = env::var("ROSTER_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| out_dir.join("storage_demo.db"));
    info!("Using DatabaseStorage at {}", db_path.display());
    let storage = DatabaseStorage::open(&db_path).await.expect("open db");
    storage.ensure_schema().await.expect("ensure schema");
    let service = UserService::new(storage);

    // Create a few users
    let mut ids = Vec::new();
    for (name, email) in [("Ann", "ann@example.com"), ("Bob", "bob@example.com")] {
        let created = service
            .create(UserForm::new(name, email))
            .await
            .expect("create user");
        info!("{} -> id {}", created.message, created.id);
        ids.push(created.id);
    }

    // Rename the first one and search for it
    service
        .update(ids[0], UserForm::new("Annie", "ann@example.com"))
        .await
        .expect("update user");
    let found = service
        .search(SearchQuery {
            keyword: Some("ann".to_string()),
        })
        .await
        .expect("search");
    info!("Search for \"ann\" matched {} user(s)", found.len());

    // Delete the second one twice: the second attempt is a not-found outcome
    service.delete(ids[1]).await.expect("delete user");
    match service.delete(ids[1]).await {
        Err(ServiceError::NotFound(id)) => info!("User {} already gone", id),
        other => warn!("Unexpected delete outcome: {:?}", other),
    }

    for user in service.list().await.expect("list users") {
        info!("DB user: id={} name={} email={}", user.id, user.name, user.email);
    }
    info!(
        "Demo complete, {} user(s) in {}",
        service.storage().count().await.expect("count"),
        db_path.display()
    );
}
