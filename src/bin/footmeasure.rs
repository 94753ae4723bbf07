use clap::{Parser, Subcommand};
use foot_measure::config::{ConfigError, MeasureConfig, load_config};
use foot_measure::detector::{ContourTracer, EdgeExtractor};
use foot_measure::error::MeasurementFailure;
use foot_measure::tools::{
    SyntheticScene, batch_limit_from_env, dataset_iter, dataset_root_from_env, edge_stats,
    grayscale_stats, load_image, to_rgb_image,
};
use foot_measure::utils::grayscale::rgb_to_grayscale;
use foot_measure::{FootMeasurer, PaperSize};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "footmeasure", version, about = "Measure a foot photographed on paper")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct ConfigArgs {
    /// JSON configuration file; missing fields use the strict defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Start from the permissive preset instead of the strict one
    #[arg(long)]
    permissive: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Measure the foot in a single image
    Measure {
        #[arg(long)]
        image: PathBuf,
        /// Reference paper (A4 or Letter); unknown labels fall back to A4
        #[arg(long, default_value = "A4")]
        paper: String,
        #[command(flatten)]
        config: ConfigArgs,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print per-stage statistics and candidate reports for an image
    Diagnose {
        #[arg(long)]
        image: PathBuf,
        #[arg(long, default_value = "A4")]
        paper: String,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Measure every image under a directory in parallel
    Batch {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value = "A4")]
        paper: String,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Write the synthetic calibration scene to an image file
    Render {
        #[arg(long)]
        out: PathBuf,
        /// Leave the subject out of the scene
        #[arg(long)]
        no_subject: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Measure {
            image,
            paper,
            config,
            json,
        } => measure_cmd(&image, &paper, &config, json),
        Command::Diagnose {
            image,
            paper,
            config,
        } => diagnose_cmd(&image, &paper, &config),
        Command::Batch {
            root,
            limit,
            paper,
            config,
        } => batch_cmd(root, limit, &paper, &config),
        Command::Render { out, no_subject } => render_cmd(&out, no_subject),
    }
}

fn resolve_paper(label: &str) -> PaperSize {
    let paper = PaperSize::from_label_or_default(label);
    if !paper.label().eq_ignore_ascii_case(label.trim()) {
        log::warn!("unknown paper '{label}', using {paper}");
    }
    paper
}

fn build_measurer(args: &ConfigArgs) -> Result<FootMeasurer, ConfigError> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None if args.permissive => MeasureConfig::permissive(),
        None => MeasureConfig::default(),
    };
    FootMeasurer::new(config)
}

fn measure_cmd(image: &Path, paper: &str, args: &ConfigArgs, json: bool) -> ExitCode {
    let measurer = match build_measurer(args) {
        Ok(m) => m,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            return ExitCode::from(2);
        }
    };
    let img = match load_image(image) {
        Ok(img) => img,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    let result = measurer.measure(&img, resolve_paper(paper));
    if json {
        let rendered = match &result {
            Ok(m) => serde_json::to_string_pretty(&serde_json::json!({ "success": true, "measurement": m })),
            Err(f) => serde_json::to_string_pretty(
                &serde_json::json!({ "success": false, "message": f.to_string(), "failure": f }),
            ),
        };
        match rendered {
            Ok(text) => println!("{text}"),
            Err(err) => eprintln!("Failed to serialize result: {err}"),
        }
    } else {
        match &result {
            Ok(m) => println!("{m}"),
            Err(f) => println!("{f}"),
        }
    }

    if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn diagnose_cmd(image: &Path, paper: &str, args: &ConfigArgs) -> ExitCode {
    let measurer = match build_measurer(args) {
        Ok(m) => m,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            return ExitCode::from(2);
        }
    };
    let img = match load_image(image) {
        Ok(img) => img,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };
    let config = measurer.config();

    println!("Image: {} ({}x{})", image.display(), img.width(), img.height());

    let gray = rgb_to_grayscale(img.as_bytes(), img.width(), img.height());
    let gray_stats = grayscale_stats(&gray);
    println!(
        "Grayscale range: {}-{}, average: {}",
        gray_stats.min, gray_stats.max, gray_stats.avg
    );

    let start = Instant::now();
    let edges = EdgeExtractor::extract(&img, &config.edges);
    let stats = edge_stats(&edges);
    println!(
        "Edges: edge_pixels={} total={} edge_ratio={:.2}% ({:.2?})",
        stats.edge_pixels,
        stats.total_pixels,
        stats.edge_ratio * 100.0,
        start.elapsed()
    );

    let tracer = ContourTracer::new(&edges, &config.contours);
    let components = tracer.component_count();
    let contours: Vec<_> = tracer.collect();
    println!("Components: {components}, traced contours: {}", contours.len());
    for (i, c) in contours.iter().take(10).enumerate() {
        let bbox = c.bbox();
        println!(
            "  Contour {}: bbox=({}, {})-({}, {}) area={:.0} vertices={}",
            i,
            bbox.min_x,
            bbox.min_y,
            bbox.max_x,
            bbox.max_y,
            c.area(),
            c.polygon().len()
        );
    }

    let (result, tel) = measurer.measure_with_telemetry(&img, resolve_paper(paper));
    println!("Stage reached: {:?}", tel.stage);
    if let Some(score) = tel.reference_score {
        println!("Reference score: {score:.3}");
    }
    if let Some(scale) = tel.px_per_mm {
        println!("Scale: {scale:.3} px/mm");
    }
    if let Some(confidence) = tel.subject_confidence {
        println!(
            "Subject confidence: {confidence:.3} ({} candidates)",
            tel.subject_candidates
        );
    }

    match &result {
        Ok(m) => println!("{m} (max span {:.1}mm)", m.max_span_mm),
        Err(failure) => {
            println!("{failure}");
            print_candidates(failure, config.diagnostics_top_n);
        }
    }
    ExitCode::SUCCESS
}

fn print_candidates(failure: &MeasurementFailure, limit: usize) {
    match failure {
        MeasurementFailure::ReferenceNotFound { report } => {
            for c in report.top(limit) {
                println!(
                    "  Reference {}: area={:.0} vertices={} aspect={:.2} extent={:.2} score={:.3} rejection={:?}",
                    c.index, c.area_px, c.vertices, c.aspect_ratio, c.extent, c.score, c.rejection
                );
            }
        }
        MeasurementFailure::SubjectNotFound { report } => {
            for c in report.top(limit) {
                println!(
                    "  Subject {}: area_fraction={:.3} aspect={:.2} height={:.0} confidence={:.3} rejection={:?}",
                    c.index, c.area_fraction, c.aspect_ratio, c.height_px, c.confidence, c.rejection
                );
            }
        }
        MeasurementFailure::MeasurementOutOfRange { violations, .. } => {
            for v in violations {
                println!("  {v}");
            }
        }
        MeasurementFailure::CalibrationFailure { .. } => {}
    }
}

fn batch_cmd(root: Option<PathBuf>, limit: Option<usize>, paper: &str, args: &ConfigArgs) -> ExitCode {
    let root = root.unwrap_or_else(dataset_root_from_env);
    let limit = limit.or_else(batch_limit_from_env);
    if !root.exists() {
        eprintln!("Dataset root not found: {}", root.display());
        return ExitCode::from(2);
    }
    let measurer = match build_measurer(args) {
        Ok(m) => m,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            return ExitCode::from(2);
        }
    };
    let paper = resolve_paper(paper);

    let images: Vec<PathBuf> = dataset_iter(&root, limit).collect();
    if images.is_empty() {
        println!("No images found under {}", root.display());
        return ExitCode::SUCCESS;
    }

    let start = Instant::now();
    // Images are independent; each run owns its own buffers
    let outcomes: Vec<(PathBuf, Result<String, String>)> = images
        .into_par_iter()
        .map(|path| {
            let outcome = match load_image(&path) {
                Ok(img) => match measurer.measure(&img, paper) {
                    Ok(m) => Ok(format!(
                        "{:.1}mm x {:.1}mm ({})",
                        m.length_mm, m.width_mm, m.confidence_label
                    )),
                    Err(f) => Err(f.to_string()),
                },
                Err(err) => Err(err.to_string()),
            };
            (path, outcome)
        })
        .collect();

    let mut measured = 0usize;
    for (path, outcome) in &outcomes {
        match outcome {
            Ok(text) => {
                measured += 1;
                println!("  [ok] {} -> {}", path.display(), text);
            }
            Err(text) => println!("  [--] {} -> {}", path.display(), text),
        }
    }
    let rate = measured as f64 / outcomes.len() as f64 * 100.0;
    println!(
        "Measured {}/{} = {:.2}% ({:.2?})",
        measured,
        outcomes.len(),
        rate,
        start.elapsed()
    );
    ExitCode::SUCCESS
}

fn render_cmd(out: &Path, no_subject: bool) -> ExitCode {
    let mut scene = SyntheticScene::a4_on_floor();
    if no_subject {
        scene = scene.without_subject();
    }
    let Some(rgb) = to_rgb_image(&scene.render()) else {
        eprintln!("Rendered buffer does not match its dimensions");
        return ExitCode::FAILURE;
    };
    match rgb.save(out) {
        Ok(()) => {
            println!("Wrote {}x{} scene to {}", scene.width, scene.height, out.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Failed to write {}: {err}", out.display());
            ExitCode::FAILURE
        }
    }
}
