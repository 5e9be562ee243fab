//! carimage - Resolve representative photo URLs for car listings
//!
//! Resolves one descriptor given on the command line, or every descriptor in
//! a listings file, and prints one result per line.

use clap::Parser;
use serde::Serialize;

use carimage::cli::{descriptors_from_cli, Cli};
use carimage::{CarImageResolver, ResolverConfig};

/// One resolved descriptor as printed with `--json`
#[derive(Debug, Serialize)]
struct ResolvedImage<'a> {
    key: String,
    brand: &'a str,
    model: &'a str,
    year: i32,
    image: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let descriptors = descriptors_from_cli(&cli)?;

    let resolver = CarImageResolver::new(ResolverConfig::from_cli(&cli))?;
    let images = resolver.resolve_all(&descriptors).await;

    if cli.json {
        let results: Vec<ResolvedImage> = descriptors
            .iter()
            .zip(images)
            .map(|(d, image)| ResolvedImage {
                key: d.cache_key(),
                brand: &d.brand,
                model: &d.model,
                year: d.year,
                image,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for (d, image) in descriptors.iter().zip(images) {
            println!("{}\t{}", d.cache_key(), image.as_deref().unwrap_or("-"));
        }
    }

    Ok(())
}
