use anyhow::{Context, Result};
use aura_core::{
    AnalysisOptions, Analyzer, AttributeKind, AttributeResult, Catalog, Gender, ImageFrame, ModelRegistry,
    OnnxLoader, RecommendationRequest, Recommender, StaticCatalog,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "aura", about = "Aura style analysis CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which attribute models are available
    Status,
    /// Analyze one attribute of an image
    Analyze {
        /// Image file (JPEG, PNG, ...)
        image: PathBuf,
        /// Attribute to analyze: body, face or skin
        #[arg(short, long)]
        kind: AttributeKind,
        /// Gender hint for body-shape analysis
        #[arg(short, long)]
        gender: Option<Gender>,
    },
    /// Analyze an image and recommend products
    Recommend {
        /// Image file; omit for a generic recommendation
        image: Option<PathBuf>,
        /// Attributes to analyze (comma separated); all when omitted
        #[arg(short, long, value_delimiter = ',')]
        kinds: Vec<AttributeKind>,
        #[arg(short, long)]
        gender: Option<Gender>,
        /// MBTI personality type (e.g. INFJ)
        #[arg(short, long)]
        personality: Option<String>,
        /// Number of products to return
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List catalog products
    Products {
        #[arg(short, long)]
        gender: Option<Gender>,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Show the style blurb for an MBTI personality type
    Personality {
        code: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Status => {
            let analyzer = build_analyzer(&config);
            let catalog = load_catalog(&config)?;
            print_json(&serde_json::json!({
                "version": env!("CARGO_PKG_VERSION"),
                "checked_at": chrono::Utc::now().to_rfc3339(),
                "model_dir": config.model_dir.display().to_string(),
                "models_available": analyzer.availability(),
                "models": analyzer.status(),
                "catalog_products": catalog.products().len(),
            }))?;
        }
        Commands::Analyze { image, kind, gender } => {
            let analyzer = build_analyzer(&config);
            let frame = open_image(&image);
            let options = AnalysisOptions {
                gender: gender.unwrap_or(config.default_gender),
            };
            let result = analyzer.analyze_with(frame.as_ref(), kind, &options);
            tracing::info!(%kind, label = %result.label, using_fallback = result.using_fallback, "analysis complete");
            print_json(&result)?;
        }
        Commands::Recommend {
            image,
            kinds,
            gender,
            personality,
            limit,
        } => {
            let catalog = load_catalog(&config)?;
            let gender = gender.unwrap_or(config.default_gender);

            let results = match image {
                Some(path) => {
                    let analyzer = Arc::new(build_analyzer(&config));
                    let frame = Arc::new(open_image(&path));
                    let kinds = if kinds.is_empty() {
                        AttributeKind::ALL.to_vec()
                    } else {
                        kinds
                    };
                    analyze_concurrently(analyzer, frame, &kinds, AnalysisOptions { gender }).await?
                }
                None => Vec::new(),
            };

            let request = RecommendationRequest::new(results.clone())?
                .with_gender(Some(gender))
                .with_personality(personality);
            let recommender = Recommender::new(catalog).with_limit(limit.unwrap_or(config.recommend_limit));
            let recommendation = recommender.recommend(&request);
            tracing::info!(
                items = recommendation.items.len(),
                using_fallback = recommendation.using_fallback,
                "recommendation complete"
            );

            print_json(&serde_json::json!({
                "attributes": results,
                "recommendation": recommendation,
            }))?;
        }
        Commands::Products { gender, limit } => {
            let catalog = load_catalog(&config)?;
            let products = catalog.list(gender, limit);
            print_json(&serde_json::json!({
                "products": products,
                "count": products.len(),
                "total_products": catalog.products().len(),
            }))?;
        }
        Commands::Personality { code } => match aura_core::style::personality_style(&code) {
            Some(style) => print_json(&serde_json::json!({
                "personality_type": code.trim().to_ascii_uppercase(),
                "style_recommendation": style,
            }))?,
            None => anyhow::bail!("invalid MBTI type: {code}"),
        },
    }

    Ok(())
}

fn build_analyzer(config: &Config) -> Analyzer {
    let registry = ModelRegistry::probe(&config.model_dir);
    Analyzer::with_loader(
        registry,
        OnnxLoader {
            intra_threads: config.intra_threads,
        },
    )
}

fn load_catalog(config: &Config) -> Result<Arc<StaticCatalog>> {
    match &config.catalog_path {
        Some(path) => {
            let catalog = StaticCatalog::load(path)
                .with_context(|| format!("loading catalog {}", path.display()))?;
            Ok(Arc::new(catalog))
        }
        None => Ok(Arc::new(StaticCatalog::builtin().clone())),
    }
}

/// Unreadable images are not fatal: analysis degrades to default results.
fn open_image(path: &Path) -> Option<ImageFrame> {
    let frame = ImageFrame::open(path);
    if let Some(f) = &frame {
        tracing::debug!(path = %path.display(), width = f.width, height = f.height, "image decoded");
    }
    frame
}

/// Run each kind on the blocking pool; results keep the order of `kinds`.
async fn analyze_concurrently(
    analyzer: Arc<Analyzer>,
    frame: Arc<Option<ImageFrame>>,
    kinds: &[AttributeKind],
    options: AnalysisOptions,
) -> Result<Vec<AttributeResult>> {
    let mut seen = Vec::new();
    let mut handles = Vec::new();
    for &kind in kinds {
        if seen.contains(&kind) {
            continue;
        }
        seen.push(kind);
        let analyzer = analyzer.clone();
        let frame = frame.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            analyzer.analyze_with(frame.as_ref().as_ref(), kind, &options)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.context("analysis task failed")?);
    }
    Ok(results)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
