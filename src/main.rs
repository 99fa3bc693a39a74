use std::{path::PathBuf, sync::Arc};

use ab_glyph::FontArc;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use portrait_studio::{
    config::{DEFAULT_ANALYZE_PROMPT, EnvCredentials, ServerConfig},
    dashboard::{self, Category},
    leaderboard::{JsonFileStore, Leaderboard, NewEntry, relative_age},
    server::start_server,
};
use rand::{SeedableRng, rngs::StdRng};
use studio_compose::{
    amount::{format_dollars, generate_money},
    geometry::CanvasPreset,
    pipeline::{CaptionLine, PosterInputs, PosterLayout, compose_poster, decode_image},
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// Portrait studio: serve the site, render posters, browse the data.
#[derive(Parser, Debug)]
#[command(name = "studio")]
#[command(about = "Portrait studio server and poster tools")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the static site and the /api routes
    Serve(ServeArgs),
    /// Render a poster from a photo
    Compose(ComposeArgs),
    /// Print funding records, highest first
    Dashboard(DashboardArgs),
    /// Show or add leaderboard entries
    Hall(HallArgs),
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Directory the pages are served from
    #[arg(long, env = "DOC_ROOT", default_value = "public")]
    doc_root: PathBuf,

    #[arg(long, env = "HALL_PATH", default_value = "hall.json")]
    hall_path: PathBuf,

    #[arg(long, env = "HALL_KEY", default_value = "hall_of_fame")]
    hall_key: String,

    /// Instruction sent with every analysis request
    #[arg(long, env = "ANALYZE_PROMPT")]
    analyze_prompt: Option<String>,

    #[arg(long, env = "XAI_MODEL", default_value = "grok-2-vision-latest")]
    xai_model: String,

    #[arg(long, env = "XAI_BASE_URL", default_value = "https://api.x.ai")]
    xai_base_url: String,

    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.0-flash-preview-image-generation")]
    gemini_model: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = "https://generativelanguage.googleapis.com")]
    gemini_base_url: String,
}

impl ServeArgs {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            port: self.port,
            doc_root: self.doc_root,
            hall_path: self.hall_path,
            hall_key: self.hall_key,
            analyze_prompt: self.analyze_prompt.unwrap_or_else(|| DEFAULT_ANALYZE_PROMPT.to_string()),
            xai_model: self.xai_model,
            xai_base_url: self.xai_base_url,
            gemini_model: self.gemini_model,
            gemini_base_url: self.gemini_base_url,
        }
    }
}

#[derive(clap::Args, Debug)]
struct ComposeArgs {
    /// Photo to place on the poster
    photo: PathBuf,

    #[arg(short, long)]
    name: String,

    #[arg(short, long, default_value = "poster.png")]
    output: PathBuf,

    /// TTF/OTF font; without one only the images are drawn
    #[arg(long)]
    font: Option<PathBuf>,

    /// Background image stretched over the canvas
    #[arg(long)]
    template: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "square")]
    preset: CanvasPreset,

    /// Line of text under the amount; repeat for more lines
    #[arg(long = "caption")]
    captions: Vec<String>,

    /// Fixed amount text instead of a random one
    #[arg(long)]
    amount: Option<String>,

    /// Seed for the random amount
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(clap::Args, Debug)]
struct DashboardArgs {
    /// Records file (a JSON list)
    #[arg(default_value = "congress-data.json")]
    data: PathBuf,

    #[arg(short, long, value_enum, default_value = "all")]
    category: Category,

    /// Case-insensitive name filter
    #[arg(short, long, default_value = "")]
    search: String,

    #[arg(short, long, default_value_t = 20)]
    limit: usize,
}

#[derive(clap::Args, Debug)]
struct HallArgs {
    #[arg(long, env = "HALL_PATH", default_value = "hall.json")]
    path: PathBuf,

    #[arg(long, env = "HALL_KEY", default_value = "hall_of_fame")]
    key: String,

    /// Add an entry with this score instead of listing
    #[arg(long)]
    add: Option<i64>,

    /// Name for `--add`
    #[arg(long, requires = "add")]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match Args::parse().command {
        Command::Serve(args) => start_server(args.into_config(), Arc::new(EnvCredentials)).await,
        Command::Compose(args) => compose(args),
        Command::Dashboard(args) => show_dashboard(args),
        Command::Hall(args) => hall(args),
    }
}

fn compose(args: ComposeArgs) -> Result<()> {
    let bytes = std::fs::read(&args.photo).with_context(|| format!("reading {}", args.photo.display()))?;
    let photo = decode_image(&bytes)?;

    let template = match &args.template {
        Some(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            Some(decode_image(&bytes)?)
        }
        None => None,
    };

    let font = match &args.font {
        Some(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            Some(FontArc::try_from_vec(bytes).with_context(|| format!("loading font {}", path.display()))?)
        }
        None => None,
    };

    let amount = match (args.amount, args.seed) {
        (Some(amount), _) => amount,
        (None, Some(seed)) => generate_money(&mut StdRng::seed_from_u64(seed)),
        (None, None) => generate_money(&mut rand::thread_rng()),
    };

    let layout = PosterLayout {
        canvas: args.preset.size(),
        captions: args.captions.into_iter().map(CaptionLine::new).collect(),
        ..PosterLayout::default()
    };

    let mut resizer = fast_image_resize::Resizer::new();
    let poster = compose_poster(
        &mut resizer,
        &PosterInputs {
            photo: &photo,
            template: template.as_ref(),
            name: &args.name,
            amount: &amount,
            font: font.as_ref(),
            layout: &layout,
        },
    )?;
    poster
        .save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    info!(output = %args.output.display(), %amount, "poster written");
    println!("{} ({amount})", args.output.display());
    Ok(())
}

fn show_dashboard(args: DashboardArgs) -> Result<()> {
    let records = dashboard::load_records(&args.data)?;
    let selected = dashboard::search(&dashboard::filter(&records, args.category), &args.search);
    let sorted = dashboard::sorted_by_amount(&selected);

    let (count, total) = dashboard::state_summary(&sorted);
    println!("{count} politicians, {} total", format_dollars(total));

    for rep in sorted.iter().take(args.limit) {
        println!(
            "{:<3} {:<30} {:<11} {:<4} {:>8}  {}",
            dashboard::initials(&rep.name),
            rep.name,
            dashboard::party_name(&rep.party),
            rep.state_code.as_deref().unwrap_or("N/A"),
            dashboard::format_compact(rep.amount),
            rep.years_active(),
        );
    }
    Ok(())
}

fn hall(args: HallArgs) -> Result<()> {
    let mut board = Leaderboard::new(JsonFileStore::new(args.path), args.key);

    if let Some(percentage) = args.add {
        let created = board.insert(NewEntry {
            name: args.name,
            percentage,
            image: None,
        })?;
        println!("added {} ({}%)", created.name, created.percentage);
        return Ok(());
    }

    let now = Utc::now();
    for (rank, entry) in board.list()?.iter().enumerate() {
        println!(
            "#{:<3} {:<24} {:>4}%  {}",
            rank + 1,
            entry.name,
            entry.percentage,
            relative_age(&entry.date, now)
        );
    }
    Ok(())
}
