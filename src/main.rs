use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use idokep_bridge::fetch::Fetcher;
use idokep_bridge::parser::ocr::TesseractEngine;
use idokep_bridge::publish::WundergroundClient;
use idokep_bridge::scrape::{scrape, ScrapeOptions, Source};
use idokep_bridge::settings::Settings;

#[derive(Parser)]
#[command(name = "idokep_bridge", about = "IdőKép to Weather Underground data bridge")]
struct Cli {
    /// Run once and exit
    #[arg(short, long)]
    once: bool,
    /// Scrape once and print the reading as JSON without uploading
    #[arg(long)]
    dry_run: bool,
    /// Weather Underground station ID
    #[arg(long)]
    wunderground_id: Option<String>,
    /// Weather Underground API key
    #[arg(long)]
    wunderground_key: Option<String>,
    /// IdőKép location (e.g. Velence)
    #[arg(long)]
    idokep_location: Option<String>,
    /// IdőKép automata ID (e.g. fejnto)
    #[arg(long)]
    idokep_automata_id: Option<String>,
    /// Use IdőKép automata data instead of the regular forecast page
    #[arg(long)]
    use_automata: bool,
    /// Scan interval in seconds
    #[arg(long)]
    scan_interval: Option<u64>,
    /// Path to the tesseract executable
    #[arg(long)]
    tesseract_path: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(id) = &self.wunderground_id {
            info!(station = %id, "Using Weather Underground ID from command line");
            settings.wunderground_id = Some(id.clone());
        }
        if let Some(key) = &self.wunderground_key {
            info!("Using Weather Underground API key from command line");
            settings.wunderground_key = Some(key.clone());
        }
        if let Some(loc) = &self.idokep_location {
            info!(location = %loc, "Using IdőKép location from command line");
            settings.idokep_location = Some(loc.clone());
        }
        if let Some(id) = &self.idokep_automata_id {
            info!(automata = %id, "Using IdőKép automata ID from command line");
            settings.idokep_automata_id = Some(id.clone());
        }
        if self.use_automata {
            settings.use_automata = true;
        }
        if let Some(secs) = self.scan_interval {
            info!(secs, "Using scan interval from command line");
            settings.scan_interval = secs;
        }
        if let Some(path) = &self.tesseract_path {
            settings.tesseract_path = path.clone();
        }
        if self.once {
            settings.run_once = true;
        }
    }
}

/// Everything a cycle needs, built once at startup.
struct Bridge {
    source: Source,
    options: ScrapeOptions,
    fetcher: Fetcher,
    ocr: TesseractEngine,
}

impl Bridge {
    fn new(settings: &Settings) -> Result<Self> {
        let source = settings.source()?;
        let ocr = TesseractEngine::new(settings.tesseract_path.clone());
        if matches!(source, Source::Automata(_)) {
            info!(tesseract = ?ocr.binary(), "Using OCR backend");
        }
        Ok(Self {
            source,
            options: settings.scrape_options(),
            fetcher: Fetcher::new(settings.http_timeout())?,
            ocr,
        })
    }

    fn run_cycle(&self, client: &WundergroundClient) -> Result<()> {
        info!(source = %self.source, "Starting weather data update");
        let reading = scrape(&self.source, &self.fetcher, &self.ocr, &self.options)
            .context("Failed to scrape weather data from IdőKép")?;
        client
            .send(&reading)
            .context("Failed to send weather data to Weather Underground")?;
        info!("Weather data successfully updated");
        Ok(())
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut settings = Settings::load().context("Failed to load configuration")?;
    cli.apply(&mut settings);
    settings.validate(!cli.dry_run)?;

    let bridge = Bridge::new(&settings)?;

    if cli.dry_run {
        let reading = scrape(&bridge.source, &bridge.fetcher, &bridge.ocr, &bridge.options)?;
        println!("{}", serde_json::to_string_pretty(&reading)?);
        return Ok(());
    }

    let creds = settings.credentials()?;
    let client = WundergroundClient::new(&creds.station_id, &creds.api_key, settings.http_timeout())?;

    if settings.run_once {
        info!("Running in one-time mode");
        return bridge.run_cycle(&client);
    }

    let interval = settings.scan_interval();
    info!(interval_secs = interval.as_secs(), "Starting scheduler");
    loop {
        let started = Instant::now();
        if let Err(e) = bridge.run_cycle(&client) {
            error!("Update failed: {:#}", e);
        }
        thread::sleep(interval.saturating_sub(started.elapsed()));
    }
}
