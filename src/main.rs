mod config;
mod story;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use story_canvas::render::{Compositor, Fill};

use crate::config::{Config, ConfigError};
use crate::story::{Inputs, StoryError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Story(#[from] StoryError),
    #[error("layout encode failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "storyboard", about = "Compose 1080x1920 property stories")]
struct Cli {
    /// Regular text font (TrueType/OpenType).
    #[arg(long, global = true)]
    font: Option<PathBuf>,

    /// Bold text font for headings and figures.
    #[arg(long, global = true)]
    bold_font: Option<PathBuf>,

    /// Labels JSON: bank names, property types, captions.
    #[arg(long, global = true)]
    labels: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a story to PNG.
    Render(RenderArgs),
    /// Print the layout the editor would start from, as JSON.
    Layout(LayoutArgs),
}

#[derive(Args, Debug)]
struct ImageArgs {
    #[arg(long)]
    background: Option<PathBuf>,

    #[arg(long)]
    floor_plan: Option<PathBuf>,

    /// Saved layout JSON.
    #[arg(long)]
    layout: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Property data JSON.
    #[arg(long)]
    data: PathBuf,

    #[command(flatten)]
    images: ImageArgs,

    /// Solid background as #rgb or #rrggbb instead of the default gradient.
    #[arg(long, env = "STORY_FILL")]
    fill: Option<Fill>,

    /// Keep borders and resize handles, as shown in the editor.
    #[arg(long, default_value_t = false)]
    preview: bool,

    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct LayoutArgs {
    #[command(flatten)]
    images: ImageArgs,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env().with_overrides(cli.font, cli.bold_font, cli.labels);

    match cli.command {
        Command::Render(args) => run_render(&config, args),
        Command::Layout(args) => run_layout(args),
    }
}

fn load_inputs(data: Option<&Path>, images: &ImageArgs, fill: Option<Fill>) -> Result<Inputs, StoryError> {
    Inputs::load(
        data,
        images.background.as_deref(),
        images.floor_plan.as_deref(),
        images.layout.as_deref(),
        fill,
    )
}

fn run_render(config: &Config, args: RenderArgs) -> Result<(), CliError> {
    let compositor = Compositor::new(config.load()?);
    let inputs = load_inputs(Some(&args.data), &args.images, args.fill)?;
    let surface = inputs.compose(&compositor, args.preview);
    story::write_png(&surface, &args.out)?;
    Ok(())
}

fn run_layout(args: LayoutArgs) -> Result<(), CliError> {
    let inputs = load_inputs(None, &args.images, None)?;
    println!("{}", serde_json::to_string_pretty(&inputs.resolved_layout())?);
    Ok(())
}
