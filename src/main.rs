use anyhow::{bail, Context, Result};
use std::env;
use tracing_subscriber::EnvFilter;

// Use library instead of local modules
use vacancy_engine::{EngineConfig, PropertyFilters, VacancyEngine};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vacancy_engine=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("help");
    let argument = args.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();

    match command {
        "analyze" => run_analyze(&argument).await?,
        "lookup" => run_lookup(&argument).await?,
        "search" => run_search(&argument).await?,
        _ => print_usage(),
    }

    Ok(())
}

fn build_engine() -> Result<VacancyEngine> {
    let config = EngineConfig::from_env().context("Failed to load engine configuration")?;
    Ok(VacancyEngine::with_http_sources(config))
}

async fn run_analyze(address: &str) -> Result<()> {
    if address.trim().is_empty() {
        bail!("usage: vacancy-engine analyze <address>");
    }

    println!("🔎 Vacancy analysis - {}", address);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let engine = build_engine()?;
    let report = engine.analyze(address).await;
    let property = &report.property;

    println!("📍 {} ({} {})", property.address, property.zip_code, property.city);
    println!("📊 Score: {}/100 - {:?}", property.vacancy_score, property.status);
    println!("🧭 Trajectory: {:?}", property.trajectory);
    if let Some(nearby) = &property.nearby_valid_address {
        println!("↔️  Consumption taken from nearby address: {}", nearby);
    }
    for insight in &property.insights {
        println!("  • {}", insight);
    }
    println!("🔑 Id: {}", property.id);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_lookup(id: &str) -> Result<()> {
    let id = id.trim();
    if id.is_empty() {
        bail!("usage: vacancy-engine lookup <id>");
    }

    let engine = build_engine()?;
    match engine.get_by_identifier(id).await {
        Some(property) => println!("{}", serde_json::to_string_pretty(&property)?),
        None => {
            eprintln!("❌ No property for identifier {}", id);
            std::process::exit(1);
        }
    }
    Ok(())
}

async fn run_search(location: &str) -> Result<()> {
    let filters = PropertyFilters {
        location: Some(location.trim().to_string()),
        ..PropertyFilters::default()
    };

    println!("🗺️  Searching seed addresses matching \"{}\"", location.trim());
    let engine = build_engine()?;
    let properties = engine.search(&filters).await;
    println!("✓ {} properties analyzed\n", properties.len());

    println!("{}", serde_json::to_string_pretty(&properties)?);
    Ok(())
}

fn print_usage() {
    println!("🏚️  Vacancy Engine v{}", vacancy_engine::VERSION);
    println!();
    println!("Usage:");
    println!("  vacancy-engine analyze <address>   Score one address");
    println!("  vacancy-engine lookup <id>         Re-open a property by identifier");
    println!("  vacancy-engine search <location>   Analyze the seed addresses of a city");
    println!();
    println!("Configuration: set {} to a TOML file", vacancy_engine::CONFIG_ENV_VAR);
    println!("Logging: RUST_LOG (default vacancy_engine=info)");
}
