use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crop_color::classifier::DEFAULT_INPUT_NAME;
use crop_color::{
    segmentation, BaseColorStrategy, ColorClassifier, ConfidenceClassifier, CropAnnotator,
    CropTuning, DistanceClassifier, KmeansPaletteExtractor, ObjectColorClassifier,
    PipelineConfig,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Crop image, or a directory of crops to annotate
    #[arg(required_unless_present = "save_config")]
    path: Option<PathBuf>,

    /// Classification strategy
    #[arg(short, long, value_enum, default_value_t = Strategy::Distance)]
    strategy: Strategy,

    /// Path to the RGB color classifier (ONNX file), required by the confidence strategy
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Input tensor name of the classifier model
    #[arg(long, default_value = DEFAULT_INPUT_NAME)]
    input_name: String,

    /// Path to a matting model (ONNX file)
    /// If not provided, the crop rectangle itself is used as the foreground
    #[arg(long)]
    segmentation_model: Option<PathBuf>,

    /// Pipeline configuration (JSON file)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Downscale crops whose larger side is more than twice this size
    #[arg(long)]
    max_size: Option<u32>,

    /// Sample the whole crop instead of the reduced focus area
    #[arg(long)]
    full_frame: bool,

    /// Region tuning for the object type
    #[arg(long, value_enum)]
    tuning: Option<Tuning>,

    /// Write the effective pipeline configuration to this JSON file and exit
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Print the confidence map as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Strategy {
    Distance,
    Confidence,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Tuning {
    Pedestrian,
    General,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = load_config(&args)?;

    if let Some(path) = &args.save_config {
        config
            .to_json_file(path)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        tracing::info!("Configuration written to {}", path.display());
        return Ok(());
    }
    let path = args.path.as_deref().context("No crop path given")?;

    let strategy = match args.strategy {
        Strategy::Distance => BaseColorStrategy::Distance(DistanceClassifier::new()),
        Strategy::Confidence => BaseColorStrategy::Confidence(
            ConfidenceClassifier::from_model(args.model.as_deref(), &args.input_name)
                .context("Failed to initialize confidence classifier")?,
        ),
    };

    let segmenter = segmentation::create_default_provider(args.segmentation_model.as_deref())
        .context("Failed to load segmentation model")?;

    let pipeline = ObjectColorClassifier::new(
        config,
        segmenter,
        Arc::new(KmeansPaletteExtractor::new()),
        strategy,
    )
    .context("Failed to build classification pipeline")?;
    tracing::info!(
        "Using {} classifier, focus reduction: {}, tuning: {:?}",
        pipeline.classifier().name(),
        pipeline.config().reduce_focus_area,
        pipeline.config().region
    );

    if path.is_dir() {
        let summary = CropAnnotator::new(&pipeline, args.max_size)
            .annotate_directory(path)
            .context("Failed to annotate directory")?;
        tracing::info!(
            "Done: {} annotated, {} failed, {} skipped",
            summary.processed,
            summary.failed,
            summary.skipped
        );
    } else {
        classify_file(&pipeline, path, args.max_size, args.json)?;
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if args.full_frame {
        config.reduce_focus_area = false;
    }
    match args.tuning {
        Some(Tuning::Pedestrian) => config.region = CropTuning::pedestrian(),
        Some(Tuning::General) => config.region = CropTuning::general(),
        None => {}
    }

    config.validate()?;
    Ok(config)
}

fn classify_file<C: ColorClassifier>(
    pipeline: &ObjectColorClassifier<C>,
    path: &Path,
    max_size: Option<u32>,
    json: bool,
) -> Result<()> {
    let crop = image::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let crop = crop_color::annotate::resize_to_max(crop, max_size);

    let start = Instant::now();
    let result = pipeline
        .classify(crop)
        .with_context(|| format!("Failed to classify {}", path.display()))?;
    tracing::info!(
        "Color is {} (sample {}). Took {}ms",
        result.best(),
        result.sample,
        start.elapsed().as_millis()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&result.confidences)?);
    } else {
        for (class, score) in result.confidences.iter() {
            println!("{:<8} {:>10.4}", class.to_string(), score);
        }
    }

    Ok(())
}
