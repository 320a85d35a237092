// Basic usage example for deploycfg
//
// Run with: cargo run --example basic_usage

use deploycfg::{Environment, Schema, SettingSpec, gitlab, resolve};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔧 deploycfg Basic Usage Example\n");

    // The bundled GitLab schema, resolved with a couple of overrides
    let schema = gitlab::schema();
    let env = Environment::new()
        .with("GITLAB_EXTERNAL_URL", "https://git.example.org")
        .with("GITLAB_DB_PORT", "6432")
        .with("GITLAB_DB_PASSWORD", "hunter2");

    let config = resolve(&schema, &env)?;
    println!("✅ Resolved {} settings ({} overridden):", config.len(), config.override_count());
    print!("{config}");

    let settings = gitlab::GitlabSettings::from_resolved(&config)?;
    println!("\n🔗 Database URL: {}", settings.database_url());
    println!("🔗 Redis URL:    {}", settings.redis_url());

    // Every bad value is reported, not just the first
    println!("\n❌ Resolving with two bad values...");
    let bad = Environment::new()
        .with("GITLAB_DB_PORT", "notanumber")
        .with("GITLAB_SSH_BIND", "0");
    if let Err(errors) = resolve(&schema, &bad) {
        println!("{} errors:\n{errors}", errors.len());
    }

    // Custom schemas are built the same way
    let custom = Schema::builder()
        .setting(
            SettingSpec::integer("registry.port", 5050)
                .env("REGISTRY_PORT")
                .range(1, 65535),
        )
        .setting(SettingSpec::boolean("registry.enable", false).env("REGISTRY_ENABLE"))
        .build()?;
    let config = custom.resolve(&Environment::new().with("REGISTRY_ENABLE", "TRUE"))?;
    println!("📦 Custom schema:\n{}", config.to_json_string(true)?);

    Ok(())
}
