//! Terminal dashboard for wastelens: simulated collection data, compliance stats, and advisory insights.

mod app;
mod input;
mod ui;

use std::{io, sync::Arc, time::Duration as StdDuration};

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use wastelens_advisor_gemini as gemini;
use wastelens_core::{
    generator::RecordGenerator,
    model::District,
    ports::{AdvisoryConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL},
    service::AnalyticsService,
};

use crate::app::App;
use crate::input::Action;

/// Simulated waste-collection compliance dashboard.
#[derive(Debug, Parser)]
#[command(name = "wastelens", version, about)]
struct Args {
    /// Number of most recent days to simulate (today included).
    #[arg(long, default_value_t = 7)]
    days: u32,

    /// Households simulated per district.
    #[arg(long, default_value_t = 20)]
    households: u32,

    /// Seed for reproducible simulations.
    #[arg(long)]
    seed: Option<u64>,

    /// Start the household monitor filtered to this district.
    #[arg(long)]
    district: Option<District>,

    /// API key for the Gemini advisor; insights are skipped without it.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Generic key variable, used when `GEMINI_API_KEY` is unset or blank.
    #[arg(long, env = "API_KEY", hide = true, hide_env_values = true)]
    fallback_api_key: Option<String>,

    /// Gemini model used for insights.
    #[arg(long, env = "WASTELENS_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of the generative language API.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Seconds to wait for insights before falling back.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

impl Args {
    /// First non-blank key among the dedicated and the generic variable.
    fn api_key(&self) -> Option<String> {
        [&self.api_key, &self.fallback_api_key]
            .into_iter()
            .flatten()
            .find(|key| !key.trim().is_empty())
            .cloned()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    // Advisor + service setup
    let config = AdvisoryConfig {
        api_key: args.api_key(),
        model: args.model,
        endpoint: args.endpoint,
        timeout: StdDuration::from_secs(args.timeout_secs),
    };
    let timeout = config.timeout;
    let client = Client::builder().user_agent("wastelens/0.1").build()?;
    let service = Arc::new(AnalyticsService::new(
        gemini::advisor(client, config),
        timeout,
    ));

    let generator = match args.seed {
        Some(seed) => RecordGenerator::seeded(seed, Utc::now()),
        None => RecordGenerator::from_entropy(),
    };

    // First analysis before touching the terminal so bad arguments fail loudly
    let mut app = App::new(service, generator, args.days, args.households, args.district);
    app.regenerate()?;

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    load_insights(terminal, &mut app).await?;

    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
                Action::Regenerate => {
                    app.result = None;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    match app.regenerate() {
                        Ok(()) => load_insights(terminal, &mut app).await?,
                        Err(err) => {
                            app.error_message = Some(format!("Simulation failed: {err}"));
                        }
                    }
                }
                Action::RefreshInsights => load_insights(terminal, &mut app).await?,
            }
        }
    }

    Ok(())
}

/// Render the analysis first, then wait for the advisor.
async fn load_insights(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let Some(districts) = app
        .result
        .as_ref()
        .map(|result| result.district_stats.clone())
    else {
        return Ok(());
    };

    app.insights_loading = true;
    terminal.draw(|frame| ui::draw(frame, app))?;

    app.insights = app.service.insights(&districts).await;
    app.insights_loading = false;
    Ok(())
}
