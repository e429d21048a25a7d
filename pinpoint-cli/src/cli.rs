use anyhow::{Context, bail};
use chrono::{Local, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use pinpoint_core::{
    Config, ProviderId, RangeInput, Selection, WeatherLookup, lookup::check,
    provider::provider_from_config,
};
use tracing::{debug, info};

use crate::render::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "pinpoint", version, about = "Historical weather for a point on the map")]
pub struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure a weather provider.
    Configure {
        /// Provider short name: "backend" or "openmeteo".
        provider: String,

        /// Server address; prompted for when absent.
        #[arg(long)]
        base_url: Option<String>,

        /// Request timeout in seconds (Open-Meteo only).
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Make this the default provider.
        #[arg(long)]
        set_default: bool,
    },

    /// Show hourly temperatures for a point and a date/time range.
    Show {
        /// Latitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,

        /// Longitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,

        #[command(flatten)]
        range: RangeArgs,

        /// Provider to use instead of the configured default.
        #[arg(long)]
        provider: Option<String>,
    },

    /// Check a date/time range without sending a request.
    Validate {
        #[command(flatten)]
        range: RangeArgs,
    },
}

#[derive(Debug, Args)]
pub struct RangeArgs {
    /// First day, YYYY-MM-DD.
    #[arg(long, default_value = "")]
    pub start_date: String,

    /// Last day, YYYY-MM-DD.
    #[arg(long, default_value = "")]
    pub end_date: String,

    /// Earliest time of day, HH:MM.
    #[arg(long)]
    pub start_time: Option<String>,

    /// Latest time of day, HH:MM.
    #[arg(long)]
    pub end_time: Option<String>,

    /// Treat this local time as "now" (YYYY-MM-DDTHH:MM[:SS]).
    #[arg(long, value_parser = parse_moment)]
    pub now: Option<NaiveDateTime>,
}

impl RangeArgs {
    fn input(&self) -> RangeInput {
        RangeInput::new(&self.start_date, &self.end_date)
            .with_times(self.start_time.as_deref(), self.end_time.as_deref())
    }

    fn now(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(|| Local::now().naive_local())
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider, base_url, timeout_secs, set_default } => {
                configure(&provider, base_url, timeout_secs, set_default)
            }
            Command::Show { lat, lon, range, provider } => {
                show(lat.zip(lon), &range, provider.as_deref()).await
            }
            Command::Validate { range } => {
                range.input().validate(range.now())?;
                println!("Valid");
                Ok(())
            }
        }
    }
}

fn configure(
    provider: &str,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    set_default: bool,
) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let base_url = match base_url {
        Some(url) => url,
        None => prompt_base_url(id, &config)?,
    };
    let base_url = base_url.trim().to_string();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        bail!("Base URL must start with http:// or https://, got '{base_url}'.");
    }

    config.upsert_provider_base_url(id, base_url);
    if let Some(secs) = timeout_secs {
        config.set_provider_timeout_secs(id, secs);
    }
    if set_default {
        config.set_default_provider(id);
    }

    let path = config.save()?;
    info!(provider = %id, path = %path.display(), "provider configured");
    println!("Configured provider '{id}'. Saved to {}", path.display());

    Ok(())
}

fn prompt_base_url(id: ProviderId, config: &Config) -> anyhow::Result<String> {
    let message = format!("Base URL for {id}:");
    let mut prompt = inquire::Text::new(&message);

    if let Some(current) = config.provider_base_url(id).or_else(|| id.default_base_url()) {
        prompt = prompt.with_default(current);
    }

    prompt.prompt().context("Failed to read base URL")
}

async fn show(point: Option<(f64, f64)>, range: &RangeArgs, provider: Option<&str>) -> anyhow::Result<()> {
    let input = range.input();
    let now = range.now();

    let mut selection = Selection::default();
    if let Some((lat, lon)) = point {
        let point = selection.select(lat, lon)?;
        info!(%point, "location selected");
    }
    let (request, _) = check(&selection, &input, now)?;
    debug!(?request, "input accepted");

    let config = Config::load()?;
    let id = match provider {
        Some(name) => ProviderId::try_from(name)?,
        None => config.default_provider_id()?,
    };
    let lookup = WeatherLookup::with_selection(provider_from_config(id, &config)?, selection);

    eprintln!("Fetching weather data from {id}...");
    let report = lookup.run(&input, now).await?;

    print!("{}", render(&report));
    Ok(())
}

fn parse_moment(value: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| format!("invalid moment '{value}', expected YYYY-MM-DDTHH:MM[:SS]"))
}
