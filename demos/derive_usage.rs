// Derive macro usage example for deploycfg
//
// Run with: cargo run --example derive_usage --features derive

use deploycfg::{DeploymentSchema, Environment};

// =============================================================================
// Settings defined using the derive macro
// =============================================================================

/// Registry settings
#[derive(Debug, DeploymentSchema)]
#[schema(section = "registry")]
pub struct RegistrySettings {
    #[setting(env = "REGISTRY_ENABLE", description = "Serve the container registry")]
    pub enable: bool,

    #[setting(env = "REGISTRY_PORT", min = 1, max = 65535)]
    pub port: u16,

    #[setting(env = "REGISTRY_HTTP_SECRET", secret)]
    pub http_secret: String,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            enable: false,
            port: 5050,
            http_secret: String::new(),
        }
    }
}

/// Pages settings
#[derive(Debug, DeploymentSchema)]
#[schema(section = "pages")]
pub struct PagesSettings {
    #[setting(env = "PAGES_URL", pattern = r"^https?://\S+$")]
    pub external_url: String,

    #[setting(min = 1)]
    pub max_connections: u32,
}

impl Default for PagesSettings {
    fn default() -> Self {
        Self {
            external_url: "http://pages.example.com".to_string(),
            max_connections: 16,
        }
    }
}

/// Everything together; nested structs contribute their own settings
#[derive(Debug, Default, DeploymentSchema)]
pub struct Deployment {
    pub registry: RegistrySettings,
    pub pages: PagesSettings,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🏗️  deploycfg Derive Example\n");

    let schema = Deployment::schema()?;
    println!("Schema with {} settings:", schema.len());
    for spec in &schema {
        println!("  {} ({})", spec.key, spec.kind);
    }

    let env = Environment::new()
        .with("REGISTRY_ENABLE", "true")
        .with("REGISTRY_HTTP_SECRET", "changeme")
        .with("PAGES_URL", "https://pages.corp.example");

    let deployment = Deployment::resolve_from(&env)?;
    println!("\n✅ Resolved:");
    println!("  registry.enable = {}", deployment.registry.enable);
    println!("  registry.port   = {}", deployment.registry.port);
    println!("  pages.url       = {}", deployment.pages.external_url);

    let bad = Environment::new().with("REGISTRY_PORT", "0");
    if let Err(err) = Deployment::resolve_from(&bad) {
        println!("\n❌ {err}");
    }

    Ok(())
}
