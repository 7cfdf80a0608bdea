use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use staff_poster::{
    AssetLoader, Compositor, DefaultFetcher, DirSink, LogNotifier, Orchestrator, PosterConfig,
    PosterSurface, Roster, SurfaceContent, TextEngine, ViewController,
};

#[derive(Parser, Debug)]
#[command(name = "staff-poster", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print index and name of every roster record.
    List(ListArgs),
    /// Render the low-resolution preview of one person as a PNG.
    Preview(PreviewArgs),
    /// Render and download the high-resolution poster of one person.
    Poster(PosterArgs),
}

#[derive(Args, Debug)]
struct Common {
    /// Roster JSON (array of records keyed by column name).
    #[arg(long)]
    roster: PathBuf,

    /// Optional poster configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[command(flatten)]
    common: Common,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    common: Common,

    /// Roster index (0-based).
    #[arg(long)]
    index: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct PosterArgs {
    #[command(flatten)]
    common: Common,

    /// Roster index (0-based).
    #[arg(long)]
    index: usize,

    /// Directory the poster is saved into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::List(args) => cmd_list(args),
        Command::Preview(args) => cmd_preview(args).await,
        Command::Poster(args) => cmd_poster(args).await,
    }
}

fn load(common: &Common) -> anyhow::Result<(PosterConfig, Roster)> {
    let cfg = match &common.config {
        Some(path) => PosterConfig::from_path(path)?,
        None => PosterConfig::default(),
    };
    let roster = Roster::from_path(&common.roster)?;
    Ok((cfg, roster))
}

fn compositor(cfg: &PosterConfig) -> anyhow::Result<Arc<Compositor>> {
    let fetcher = Arc::new(DefaultFetcher::new(&cfg.asset_root));
    let loader = Arc::new(AssetLoader::from_config(fetcher, cfg));
    Ok(Arc::new(Compositor::new(
        loader,
        TextEngine::from_config(cfg),
        cfg,
    )?))
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let (_, roster) = load(&args.common)?;
    for (i, person) in roster.iter().enumerate() {
        println!("{i}\t{}", person.name);
    }
    Ok(())
}

async fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let (cfg, roster) = load(&args.common)?;
    let person = roster.get(args.index)?;
    let compositor = compositor(&cfg)?;

    let surface = PosterSurface::default();
    compositor.render_preview(person, &surface).await;
    let SurfaceContent::Preview(scene) = surface.content() else {
        anyhow::bail!("preview surface holds no preview");
    };
    let png = compositor.rasterize_png(&scene)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

async fn cmd_poster(args: PosterArgs) -> anyhow::Result<()> {
    let (cfg, roster) = load(&args.common)?;
    let orchestrator = Orchestrator::from_config(
        compositor(&cfg)?,
        roster,
        PosterSurface::default(),
        Arc::new(LogNotifier),
        &cfg,
    );
    let view = ViewController::new(orchestrator, Arc::new(DirSink::new(&args.out_dir)));

    view.open(args.index)?.settled().await;
    let saved = view.download().await?;
    view.close();

    match saved {
        Some(path) => eprintln!("wrote {}", path.display()),
        None => anyhow::bail!("no poster was saved"),
    }
    Ok(())
}
