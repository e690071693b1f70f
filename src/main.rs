use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use skiweather::{Coordinate, ResortWeatherService, SkiWeatherConfig, logging};

#[derive(Parser)]
#[command(author, version, about = "Fused ski-resort weather from ground stations and forecasts", long_about = None)]
struct Cli {
    /// Resort name or id
    resort: String,

    /// Resort latitude in decimal degrees
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Resort longitude in decimal degrees
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Prefecture name (Japanese or English) used when no coordinate is given
    #[arg(short, long)]
    prefecture: Option<String>,

    /// Print the 7-day forecast instead of current conditions
    #[arg(short, long)]
    forecast: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, env = "SKIWEATHER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SkiWeatherConfig::load_from_path(cli.config.clone())?;
    logging::init(&config.logging)?;

    let service = ResortWeatherService::from_config(&config)
        .context("Failed to initialise weather service")?;

    let coordinate = cli.lat.zip(cli.lon).map(|(lat, lon)| Coordinate::new(lat, lon));
    let prefecture = cli.prefecture.as_deref();

    let output = if cli.forecast {
        let series = service
            .fetch_7day_forecast_with_source(&cli.resort, coordinate, prefecture)
            .await;
        serde_json::to_value(&series)?
    } else {
        match service.fetch_weather_data(&cli.resort, coordinate, prefecture).await {
            Some(weather) => json!({
                "resort": cli.resort,
                "weather": weather,
                "description": weather.description(),
            }),
            None => json!({
                "resort": cli.resort,
                "weather": null,
                "error": "Weather unavailable",
            }),
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
