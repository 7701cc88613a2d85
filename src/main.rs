use anyhow::{Result, bail};
use clap::Parser;
use farmcast::config::FarmcastConfig;
use farmcast::models::{LocationQuery, WeatherReport};
use farmcast::{
    FixedGeolocation, GreetingClock, GeolocationProvider, NoGeolocation, QueryOutcome, QuerySession,
    SuggestionLookup, SuggestionOutcome, WeatherQueryPipeline,
};
use std::path::PathBuf;
use tracing::error;

/// Weather lookup and farming advisories
#[derive(Parser, Debug)]
#[command(name = "farmcast", version, about = "Weather lookup and farming advisories")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// City name or "lat,lon"
    #[arg(
        value_name = "LOCATION",
        allow_negative_numbers = true,
        required_unless_present_any = ["here", "suggest"],
        conflicts_with_all = ["here", "suggest"]
    )]
    location: Vec<String>,

    /// Use the position configured under [location]
    #[arg(long, conflicts_with = "suggest")]
    here: bool,

    /// List city suggestions for partially typed input
    #[arg(long, value_name = "TEXT")]
    suggest: Option<String>,
}

impl Cli {
    /// Location words joined back into one query string
    fn location_text(&self) -> String {
        self.location.join(" ")
    }
}

fn print_report(report: &WeatherReport) {
    let current = &report.current;

    println!("{}", report.location.display_name);
    println!("  {}", report.location.coordinates().format());
    println!(
        "  {} ({}), {}",
        current.condition_main,
        current.description,
        current.category().description()
    );
    println!(
        "  Temperature {} (feels like {})",
        current.format_temperature(),
        current.format_feels_like()
    );
    println!("  Humidity {:.0}%", current.humidity_pct);
    println!("  Wind {}", current.format_wind());
    println!("  Pressure {}", current.format_pressure());

    if let Some(advisory) = &report.advisory {
        println!();
        println!("Advisory: {}", advisory.advisory.title());
        println!("  {}", advisory.advisory.recommendation());
        println!("  Soil moisture: {}", advisory.soil_moisture);
    }

    if !report.forecast.is_empty() {
        println!();
        println!("Forecast");
        for day in report.forecast.iter() {
            println!(
                "  {:<12} {:>5.1}°C  {} ({})",
                day.format_day(),
                day.temperature_c,
                day.description,
                day.category().description()
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = FarmcastConfig::load_from_path(cli.config.clone())?;
    farmcast::logging::init(&config.logging)?;

    let pipeline = match WeatherQueryPipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("Failed to set up weather client: {}", e);
            bail!(e.user_message());
        }
    };

    let clock = GreetingClock::from_config(&config.greeting);
    println!("{}!", clock.current().greeting());

    if let Some(input) = &cli.suggest {
        let lookup = SuggestionLookup::new(pipeline.source(), &config.suggestions);
        match lookup.suggest(input).await {
            SuggestionOutcome::Suggestions(suggestions) if !suggestions.is_empty() => {
                for suggestion in suggestions {
                    println!("{}", suggestion.label);
                }
            }
            SuggestionOutcome::TooShort => {
                println!(
                    "Type at least {} characters for suggestions",
                    config.suggestions.min_chars
                );
            }
            _ => println!("No suggestions"),
        }
        return Ok(());
    }

    let query = if cli.here {
        let provider: Box<dyn GeolocationProvider> =
            match FixedGeolocation::from_config(&config.location) {
                Some(fixed) => Box::new(fixed),
                None => Box::new(NoGeolocation),
            };
        match provider.current_position().await {
            Ok(coordinates) => LocationQuery::Coordinates(coordinates),
            Err(e) => bail!(e.user_message()),
        }
    } else {
        LocationQuery::parse(&cli.location_text())
    };

    let session = QuerySession::new(pipeline);
    match session.submit(query).await {
        QueryOutcome::Completed(report) => {
            print_report(&report);
            Ok(())
        }
        QueryOutcome::Failed(e) => {
            error!("Query failed: {}", e);
            bail!(e.user_message())
        }
        QueryOutcome::Superseded { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_location_words_are_joined() {
        let cli = Cli::try_parse_from(["farmcast", "Mumbai,", "India"]).unwrap();
        assert_eq!(cli.location_text(), "Mumbai, India");
        assert!(!cli.here);
        assert!(cli.suggest.is_none());
    }

    #[test]
    fn test_negative_coordinates() {
        let cli = Cli::try_parse_from(["farmcast", "-33.87", "151.21"]).unwrap();
        assert_eq!(cli.location_text(), "-33.87 151.21");
    }

    #[test]
    fn test_options_after_suggest_are_parsed() {
        let cli =
            Cli::try_parse_from(["farmcast", "--suggest", "Jai", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.suggest.as_deref(), Some("Jai"));
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(cli.location.is_empty());
    }

    #[test]
    fn test_here_without_location() {
        let cli = Cli::try_parse_from(["farmcast", "--here", "-c", "x.toml"]).unwrap();
        assert!(cli.here);
        assert!(cli.location.is_empty());
    }

    #[test]
    fn test_conflicting_modes_are_rejected() {
        assert!(Cli::try_parse_from(["farmcast"]).is_err());
        assert!(Cli::try_parse_from(["farmcast", "--here", "Mumbai"]).is_err());
        assert!(Cli::try_parse_from(["farmcast", "--here", "--suggest", "Jai"]).is_err());
    }
}
