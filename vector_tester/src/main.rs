use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use pixel_vectorizer::{
    CancellationToken, ConversionOutcome, ConversionRequest, ConverterConfig, ExecutionStrategy,
    PixelBuffer, Vectorizer, svg,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "vector_tester", version, about = "Convert a raster image into SVG path regions")]
struct Cli {
    /// Input image (any format the `image` crate can decode).
    input: PathBuf,

    /// Output path for the SVG document (or JSON with `--json`).
    output: PathBuf,

    /// Where the conversion runs.
    #[arg(long, value_enum, default_value_t = ModeChoice::Cooperative)]
    mode: ModeChoice,

    /// Stroke width written on every path.
    #[arg(long, default_value_t = 2)]
    stroke_width: u32,

    /// Color distance under which pixels join the same region (1 = exact match).
    #[arg(long, default_value_t = 1)]
    threshold: u32,

    /// Fill-stack pops between cooperative yields.
    #[arg(long, default_value_t = 30)]
    yield_quantum: usize,

    /// Write the region list as JSON instead of an SVG document. Runs cooperatively,
    /// so it cannot be combined with `--mode`.
    #[arg(long, conflicts_with = "mode")]
    json: bool,

    /// Log at debug level.
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Cooperative,
    Offloaded,
}

impl From<ModeChoice> for ExecutionStrategy {
    fn from(choice: ModeChoice) -> Self {
        match choice {
            ModeChoice::Cooperative => ExecutionStrategy::Cooperative,
            ModeChoice::Offloaded => ExecutionStrategy::Offloaded,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let vectorizer = Vectorizer::new(ConverterConfig {
        similarity_threshold: cli.threshold,
        stroke_width: cli.stroke_width,
        yield_quantum: cli.yield_quantum,
    });

    let request = load_request(&cli.input)?;
    let (width, height) = (request.width, request.height);
    info!(width, height, input = %cli.input.display(), "loaded image");

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling conversion");
            ctrl_c_cancel.cancel();
        }
    });

    let contents = if cli.json {
        // The region list needs the structured result, so convert on this task.
        let buffer = PixelBuffer::new(&request.image_data, width, height)?;
        match vectorizer.convert_cooperative(buffer, &cancel).await {
            ConversionOutcome::Completed(results) => {
                serde_json::to_string_pretty(&results.path_regions(&vectorizer.emitter()))
                    .context("serialize regions")?
            }
            ConversionOutcome::Cancelled => anyhow::bail!("conversion cancelled"),
        }
    } else {
        match vectorizer
            .convert_request(cli.mode.into(), request, &cancel)
            .await?
        {
            ConversionOutcome::Completed(markup) => svg::wrap_document(width, height, &markup),
            ConversionOutcome::Cancelled => anyhow::bail!("conversion cancelled"),
        }
    };

    write_output(&cli.output, &contents)?;
    eprintln!("wrote {}", cli.output.display());
    Ok(())
}

fn load_request(path: &Path) -> anyhow::Result<ConversionRequest> {
    let image = image::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?
        .to_rgba8();
    Ok(ConversionRequest::from_rgba_image(image))
}

fn write_output(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("write '{}'", path.display()))
}
