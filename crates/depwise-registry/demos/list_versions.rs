//! List the versions a registry offers for one package
//!
//! Run with: cargo run --package depwise-registry --example list_versions -- Newtonsoft.Json

use depwise_registry::{RegistryClient, RegistryDescriptor, ResponseCache, DEFAULT_REPOSITORY_URL};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let name = std::env::args().nth(1).unwrap_or_else(|| "Newtonsoft.Json".to_string());
    let client = RegistryClient::with_http(Arc::new(ResponseCache::new()))?;

    let descriptor = RegistryDescriptor::from_details("v3", DEFAULT_REPOSITORY_URL)?
        .with_versions_url(format!(
            "https://api.nuget.org/v3-flatcontainer/{}/index.json",
            name.to_lowercase()
        ))?;

    match client.get_package_versions(&name, &descriptor).await? {
        Some(versions) => {
            println!("{} has {} versions", name, versions.len());
            for version in versions.iter().rev().take(10) {
                println!("  {}", version);
            }
        }
        None => println!("No versions found for {}", name),
    }

    Ok(())
}
