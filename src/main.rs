use anyhow::{bail, Context, Result};
use clap::Parser;
use meteoalarm::{Config, Criterion, Filter, MeteoAlarm, UrlRegistry, DEFAULT_LANGUAGE};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "meteoalarm",
    version,
    about = "Current MeteoAlarm weather warnings for European countries"
)]
struct Args {
    /// Countries to fetch, e.g. `estonia` or `Denmark`
    #[arg(value_name = "COUNTRY", required_unless_present = "list_countries")]
    countries: Vec<String>,

    /// Only show alerts where FIELD contains VALUE (repeatable, all must match)
    #[arg(short, long = "filter", value_name = "FIELD=VALUE")]
    filters: Vec<Criterion>,

    /// Headline language, falling back to the first one available
    #[arg(short, long, value_name = "TAG", default_value = DEFAULT_LANGUAGE)]
    lang: String,

    /// Print alerts as JSON
    #[arg(long)]
    json: bool,

    /// Config file (default: ~/.config/meteoalarm/config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List known countries and exit
    #[arg(long)]
    list_countries: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let path = match path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            path.clone()
        }
        None => match Config::default_path() {
            Some(path) => path,
            None => return Ok(Config::default()),
        },
    };
    Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))
}

fn list_countries(config: &Config) -> Result<()> {
    let registry = match &config.urls_file {
        Some(path) => UrlRegistry::from_path(path)
            .with_context(|| format!("Failed to load country URLs from {}", path.display()))?,
        None => UrlRegistry::bundled().context("Failed to load bundled country URLs")?,
    };
    for country in registry.countries() {
        println!("{country}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    if args.list_countries {
        return list_countries(&config);
    }

    let client = MeteoAlarm::from_config(&config).context("Failed to set up client")?;
    let alerts = client.fetch(&args.countries).await?;

    let filter: Filter = args.filters.into_iter().collect();
    let alerts = alerts.filter(&filter);

    if args.json {
        let json = serde_json::to_string_pretty(&alerts).context("Failed to serialize alerts")?;
        println!("{json}");
        return Ok(());
    }

    if alerts.is_empty() {
        println!("No active warnings.");
        return Ok(());
    }

    for (i, alert) in alerts.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", alert.summary(&args.lang));
    }
    Ok(())
}
