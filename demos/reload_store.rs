// Reload example for deploycfg
//
// Run with: cargo run --example reload_store

use deploycfg::{ConfigStore, Environment, gitlab};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔄 deploycfg Reload Example\n");

    let store = ConfigStore::load(gitlab::schema(), &Environment::new())?;

    store.on_change(|change| {
        println!("  📣 {} changed: {:?} -> {:?}", change.key, change.old, change.new);
    });
    store.watch(gitlab::keys::DB_PORT, |change| {
        println!("  🐘 Database port is now {:?}", change.new);
    });

    println!("Reloading with new database settings...");
    let changes = store.reload(
        &Environment::new()
            .with("GITLAB_DB_HOST", "db.internal")
            .with("GITLAB_DB_PORT", "6432"),
    )?;
    println!("✅ {} settings changed\n", changes.len());

    println!("Reloading with an invalid port...");
    let before = store.current();
    match store.reload(&Environment::new().with("GITLAB_DB_PORT", "99999")) {
        Ok(_) => println!("unexpected success"),
        Err(errors) => println!("❌ Rejected:\n{errors}"),
    }
    assert_eq!(store.current(), before);
    println!(
        "Previous configuration kept: db_port = {}",
        store.current().get_int(gitlab::keys::DB_PORT)?
    );

    Ok(())
}
