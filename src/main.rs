use clap::{Parser, Subcommand, ValueEnum};
use places_map::config::AppConfig;
use places_map::controller::MapController;
use places_map::query::UrlDefaults;
use places_map::render::Scene;
use places_map::{data, server};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the feed once and write the resulting markers as JSON
    Render {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        #[arg(long)]
        county: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Attach permanent place-name labels
        #[arg(long)]
        labels: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Scene)]
        format: OutputFormat,
        /// Write here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Serve the map page and marker API
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Scene,
    Geojson,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { config, county, category, labels, format, output } => {
            info!("Rendering with config: {:?}", config);
            let app_config = AppConfig::load_from_file(&config)?;
            let dataset = data::load_dataset(&app_config.source.feed_source()?).await?;

            let defaults = UrlDefaults { county, category };
            let mut controller = MapController::new(Scene::default(), app_config.map.fit_padding, defaults);
            controller.load(dataset);
            controller.apply_pending_defaults();
            if labels {
                controller.set_show_labels(true);
            }
            let scene = controller.into_surface();

            let json = match format {
                OutputFormat::Scene => serde_json::to_string_pretty(&scene)?,
                OutputFormat::Geojson => serde_json::to_string_pretty(&scene.to_geojson())?,
            };
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write output: {:?}", path))?,
                None => println!("{json}"),
            }
            info!("Rendered {} markers", scene.markers.len());
        }
        Commands::Serve { config } => {
            info!("Serving map with config: {:?}", config);
            let app_config = AppConfig::load_from_file(&config)?;

            // A failed load still serves the base map, just without markers.
            let dataset = match app_config.source.feed_source() {
                Ok(source) => data::load_dataset(&source).await.unwrap_or_else(|e| {
                    error!("Failed to load feed: {:#}", e);
                    Vec::new()
                }),
                Err(e) => {
                    error!("{:#}", e);
                    Vec::new()
                }
            };

            server::start_server(app_config, dataset).await?;
        }
    }

    Ok(())
}
