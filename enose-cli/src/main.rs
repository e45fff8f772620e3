//! enose - Electronic nose classifier
//! Command-line interface for classifying BME688 gas readings

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use enose_core::{CHANNEL_NAMES, ClassId, FEATURE_NAMES, FeatureVector, ModelKind, RawReading};
use enose_ml::{
    Artifact, CONFIG_FILE, Dispatcher, EnoseConfig, Model, Session, TreeNode, evaluate, reference,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "enose")]
#[command(author)]
#[command(version = "2026.1.16")]
#[command(about = "Electronic nose - classify BME688 gas readings", long_about = None)]
struct Cli {
    /// Configuration file (default: ./enose.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Active model: dt, rf or svm
    #[arg(short, long, global = true, env = "ENOSE_MODEL")]
    model: Option<ModelKind>,

    /// Load the model from a JSON artifact instead of the bundled one
    #[arg(short, long, global = true, value_name = "FILE")]
    artifact: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one reading (G320 G295 G270 G245 G220 G195 G170 G145 G120 G100)
    Classify {
        #[arg(value_name = "CHANNEL", num_args = 10, required = true, allow_negative_numbers = true)]
        values: Vec<f32>,

        /// Show the features and how the model reached its answer
        #[arg(short, long)]
        explain: bool,
    },

    /// Signed SVM margin of one reading (linear model only)
    Score {
        #[arg(value_name = "CHANNEL", num_args = 10, required = true, allow_negative_numbers = true)]
        values: Vec<f32>,
    },

    /// Classify every row of a recorded session CSV
    Batch {
        #[arg(value_name = "CSV")]
        file: PathBuf,
    },

    /// Accuracy and confusion matrix on labelled sessions
    Evaluate {
        /// Session whose rows all belong to one class
        #[arg(short, long = "label", value_name = "NAME=FILE")]
        labels: Vec<String>,

        /// Sessions with a `classe` column
        #[arg(value_name = "CSV")]
        files: Vec<PathBuf>,
    },

    /// Write the active model as a JSON artifact
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Validate an artifact and summarise it
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show channels, features and models
    Info,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "enose=info,enose_ml=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Classify { values, explain } => classify_command(cli, values, *explain),
        Commands::Score { values } => score_command(cli, values),
        Commands::Batch { file } => batch_command(cli, file),
        Commands::Evaluate { labels, files } => evaluate_command(cli, labels, files),
        Commands::Export { output } => export_command(cli, output.as_deref()),
        Commands::Inspect { file } => inspect_command(cli, file),
        Commands::Info => info_command(cli),
    }
}

// ============================================================================
// Model selection
// ============================================================================

/// Config file and the directory its relative paths start from
fn load_config(path: Option<&Path>) -> Result<(EnoseConfig, PathBuf)> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(CONFIG_FILE);
            if !default.exists() {
                return Ok((EnoseConfig::default(), PathBuf::from(".")));
            }
            default
        }
    };

    let config = EnoseConfig::load(&path)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    tracing::debug!(path = %path.display(), "config loaded");
    Ok((config, base_dir))
}

/// `--artifact` beats the config file; `--model` beats `[model] kind`
fn build_dispatcher(cli: &Cli) -> Result<Dispatcher> {
    let (mut config, base_dir) = load_config(cli.config.as_deref())?;

    if let Some(path) = &cli.artifact {
        let artifact = Artifact::load(path)
            .with_context(|| format!("Failed to load artifact: {}", path.display()))?;
        if let Some(kind) = cli.model {
            if kind != artifact.kind() {
                bail!(
                    "{} holds a {} model, but --model is {}",
                    path.display(),
                    artifact.kind(),
                    kind
                );
            }
        }

        let model = artifact
            .into_model()
            .with_context(|| format!("Invalid artifact: {}", path.display()))?;
        let classes = config.class_table()?.unwrap_or(artifact.classes);
        return Ok(Dispatcher::new(model, classes)?);
    }

    if let Some(kind) = cli.model {
        config.override_kind(kind);
    }
    Ok(config.build_dispatcher(&base_dir)?)
}

fn parse_reading(values: &[f32]) -> Result<RawReading> {
    Ok(RawReading::try_from(values)?)
}

// ============================================================================
// Classification commands
// ============================================================================

fn classify_command(cli: &Cli, values: &[f32], explain: bool) -> Result<()> {
    let dispatcher = build_dispatcher(cli)?;
    let raw = parse_reading(values)?;
    let result = dispatcher.classify_detailed(&raw)?;

    if cli.json {
        let mut out = serde_json::to_value(&result)?;
        if explain {
            out["features"] = json!(raw.features()?.values());
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{} {} (class {}, {})",
        "Detected".green().bold(),
        result.name.cyan().bold(),
        result.class,
        dispatcher.kind().name()
    );

    if explain {
        let features = raw.features()?;
        println!();
        print_features(&features);
        println!();
        print_explanation(&dispatcher, &features);
    } else if let Some(margin) = result.confidence {
        println!("  margin: {:+.4}", margin);
    } else if let Some(votes) = &result.votes {
        println!("  votes: {}", format_votes(&dispatcher, votes));
    }

    Ok(())
}

fn score_command(cli: &Cli, values: &[f32]) -> Result<()> {
    let dispatcher = build_dispatcher(cli)?;
    let raw = parse_reading(values)?;

    let Some(margin) = dispatcher.confidence(&raw)? else {
        bail!(
            "score needs the linear_svm model (active: {}); try --model svm",
            dispatcher.kind()
        );
    };
    let (class, name) = dispatcher.classify_named(&raw)?;

    if cli.json {
        let out = json!({ "margin": margin, "class": class, "name": name });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{:+.6} {}", margin, format!("({})", name).dimmed());
    }
    Ok(())
}

fn batch_command(cli: &Cli, file: &Path) -> Result<()> {
    let dispatcher = build_dispatcher(cli)?;
    let session =
        Session::load(file).with_context(|| format!("Failed to read session: {}", file.display()))?;
    let report = dispatcher.classify_batch(session.readings());

    if cli.json {
        let rows: Vec<_> = session
            .samples
            .iter()
            .zip(&report.predictions)
            .map(|(sample, prediction)| match prediction {
                Ok(class) => json!({
                    "line": sample.line,
                    "class": class,
                    "name": dispatcher.class_name(*class),
                }),
                Err(e) => json!({ "line": sample.line, "error": e.to_string() }),
            })
            .collect();
        let counts: serde_json::Map<_, _> = dispatcher
            .classes()
            .iter()
            .map(|(id, name)| (name.to_string(), json!(report.counts[id.index()])))
            .collect();
        let out = json!({
            "model": dispatcher.kind(),
            "rows": rows,
            "counts": counts,
            "rejected": report.rejected(),
            "skipped": session.skipped,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{} {} with {}",
        "Classifying".green().bold(),
        file.display().to_string().cyan(),
        dispatcher.kind().name()
    );
    for (sample, prediction) in session.samples.iter().zip(&report.predictions) {
        match prediction {
            Ok(class) => println!(
                "  line {:>5}: {}",
                sample.line,
                dispatcher.class_name(*class).unwrap_or("?")
            ),
            Err(e) => println!("  line {:>5}: {} {}", sample.line, "rejected".yellow(), e),
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    for (id, name) in dispatcher.classes().iter() {
        println!("  {:<12} {}", name, report.counts[id.index()]);
    }
    if report.rejected() > 0 {
        println!("  {:<12} {}", "rejected".yellow(), report.rejected());
    }
    if session.skipped > 0 {
        println!("  {:<12} {}", "unreadable".yellow(), session.skipped);
    }
    if let Some(class) = report.dominant() {
        println!(
            "  {} {}",
            "Dominant:".bold(),
            dispatcher.class_name(class).unwrap_or("?").cyan()
        );
    }
    Ok(())
}

fn evaluate_command(cli: &Cli, labels: &[String], files: &[PathBuf]) -> Result<()> {
    if labels.is_empty() && files.is_empty() {
        bail!("nothing to evaluate; pass --label NAME=FILE or a CSV with a class column");
    }

    let dispatcher = build_dispatcher(cli)?;
    let class_id = |name: &str| -> Result<ClassId> {
        dispatcher.classes().id_of(name).with_context(|| {
            format!(
                "unknown class '{}' (known: {})",
                name,
                dispatcher.classes().names().join(", ")
            )
        })
    };

    let mut sessions = Vec::new();
    for spec in labels {
        let (name, path) = spec
            .split_once('=')
            .with_context(|| format!("expected NAME=FILE, got '{spec}'"))?;
        let class = class_id(name.trim())?;
        let session = Session::load(path.trim())
            .with_context(|| format!("Failed to read session: {path}"))?;
        sessions.push((Some(class), PathBuf::from(path.trim()), session));
    }
    for path in files {
        let session = Session::load(path)
            .with_context(|| format!("Failed to read session: {}", path.display()))?;
        sessions.push((None, path.clone(), session));
    }

    let mut labelled = Vec::new();
    for (class, path, session) in &sessions {
        for sample in &session.samples {
            let actual = match (class, sample.label.as_deref()) {
                (Some(class), _) => *class,
                (None, Some(label)) => class_id(label)?,
                (None, None) => bail!(
                    "{} line {} has no class label; use --label NAME=FILE",
                    path.display(),
                    sample.line
                ),
            };
            labelled.push((actual, &sample.reading));
        }
    }

    let result = evaluate(&dispatcher, labelled);
    let matrix = &result.matrix;

    if cli.json {
        let rows: Vec<_> = dispatcher
            .classes()
            .iter()
            .map(|(id, _)| matrix.row(id).to_vec())
            .collect();
        let out = json!({
            "model": dispatcher.kind(),
            "classes": dispatcher.classes(),
            "accuracy": result.accuracy(),
            "total": matrix.total(),
            "correct": matrix.correct(),
            "rejected": result.rejected,
            "confusion_matrix": rows,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{} {}", "Model:".bold(), dispatcher.kind().name());
    match result.accuracy() {
        Some(acc) => println!(
            "{} {:.2}% ({}/{})",
            "Accuracy:".bold(),
            acc * 100.0,
            matrix.correct(),
            matrix.total()
        ),
        None => println!("{} n/a (no accepted readings)", "Accuracy:".bold()),
    }
    if result.rejected > 0 {
        println!("{} {}", "Rejected:".yellow().bold(), result.rejected);
    }

    println!();
    println!("{}", "Confusion matrix (rows = true, columns = predicted):".bold());
    let width = dispatcher
        .classes()
        .names()
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max(6);
    print!("  {:<width$}", "");
    for (_, name) in dispatcher.classes().iter() {
        print!(" {:>width$}", name);
    }
    println!();
    for (id, name) in dispatcher.classes().iter() {
        print!("  {:<width$}", name);
        for count in matrix.row(id) {
            print!(" {:>width$}", count);
        }
        match matrix.recall(id) {
            Some(recall) => println!("   {}", format!("recall {:.1}%", recall * 100.0).dimmed()),
            None => println!(),
        }
    }
    Ok(())
}

// ============================================================================
// Artifact commands
// ============================================================================

fn export_command(cli: &Cli, output: Option<&Path>) -> Result<()> {
    let dispatcher = build_dispatcher(cli)?;
    let artifact = Artifact::from_model(dispatcher.model(), dispatcher.classes().clone());

    match output {
        Some(path) => {
            artifact
                .save(path)
                .with_context(|| format!("Failed to write artifact: {}", path.display()))?;
            if !cli.json {
                println!(
                    "{} {} to {}",
                    "Exported".green().bold(),
                    dispatcher.kind().name(),
                    path.display().to_string().cyan()
                );
            }
        }
        None => println!("{}", artifact.to_json_pretty()?),
    }
    Ok(())
}

fn inspect_command(cli: &Cli, file: &Path) -> Result<()> {
    let artifact = Artifact::load(file)
        .with_context(|| format!("Failed to load artifact: {}", file.display()))?;
    let dispatcher = Dispatcher::from_artifact(&artifact)
        .with_context(|| format!("Invalid artifact: {}", file.display()))?;

    if cli.json {
        let out = json!({
            "valid": true,
            "format": artifact.format,
            "version": artifact.version,
            "kind": artifact.kind(),
            "summary": dispatcher.model().describe(),
            "classes": artifact.classes,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{} {}", "Valid".green().bold(), file.display().to_string().cyan());
    println!("  format:  {} v{}", artifact.format, artifact.version);
    println!("  model:   {}", dispatcher.model().describe());
    println!("  classes: {}", artifact.classes.names().join(", "));
    Ok(())
}

// ============================================================================
// Output helpers
// ============================================================================

fn print_features(features: &FeatureVector) {
    println!("{}", "Features (channel / G100):".bold());
    for (name, value) in FEATURE_NAMES.iter().zip(features.iter()) {
        println!("  {:<7} {:.6}", name, value);
    }
}

fn print_explanation(dispatcher: &Dispatcher, features: &FeatureVector) {
    match dispatcher.model() {
        Model::Tree(tree) => {
            println!("{}", "Decision path:".bold());
            for idx in tree.decision_path(features) {
                match tree.nodes()[idx] {
                    TreeNode::Split {
                        feature, threshold, ..
                    } => {
                        let value = features[feature];
                        let (op, branch) = if value <= threshold {
                            ("<=", "left")
                        } else {
                            (">", "right")
                        };
                        println!(
                            "  [{:>2}] {} = {:.6} {} {:.6} → {}",
                            idx, FEATURE_NAMES[feature], value, op, threshold, branch
                        );
                    }
                    TreeNode::Leaf { class } => println!(
                        "  [{:>2}] leaf → {}",
                        idx,
                        dispatcher.class_name(class).unwrap_or("?").cyan()
                    ),
                }
            }
        }
        Model::Forest(forest) => {
            println!("{}", "Votes:".bold());
            for (i, tree) in forest.trees().iter().enumerate() {
                let class = tree.predict(features);
                println!(
                    "  tree {} → {}",
                    i,
                    dispatcher.class_name(class).unwrap_or("?")
                );
            }
            println!("  total: {}", format_votes(dispatcher, &forest.votes(features)));
        }
        Model::LinearSvm(svm) => {
            println!("{}", "Contributions (weight × scaled feature):".bold());
            let scaled = svm.scaler().transform(features);
            for (i, name) in FEATURE_NAMES.iter().enumerate() {
                println!(
                    "  {:<7} {:+10.4} × {:+9.4} = {:+10.4}",
                    name,
                    svm.weights()[i],
                    scaled[i],
                    svm.weights()[i] * scaled[i]
                );
            }
            println!("  {:<7} {:+10.4}", "bias", svm.bias());
            println!("  {:<7} {:+10.4}", "margin".bold(), svm.decision_value(features));
        }
    }
}

fn format_votes(dispatcher: &Dispatcher, votes: &[u32]) -> String {
    dispatcher
        .classes()
        .iter()
        .filter_map(|(id, name)| votes.get(id.index()).map(|v| format!("{name}={v}")))
        .collect::<Vec<_>>()
        .join(", ")
}

fn info_command(cli: &Cli) -> Result<()> {
    let dispatcher = build_dispatcher(cli)?;

    if cli.json {
        let models: Vec<_> = ModelKind::ALL
            .iter()
            .map(|&kind| {
                let summary = reference::model(kind).map(|m| m.describe()).ok();
                json!({ "kind": kind, "name": kind.name(), "reference": summary })
            })
            .collect();
        let out = json!({
            "version": env!("CARGO_PKG_VERSION"),
            "channels": CHANNEL_NAMES,
            "features": FEATURE_NAMES,
            "active": dispatcher.kind(),
            "classes": dispatcher.classes(),
            "models": models,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", "enose - BME688 electronic nose classifier".bold());
    println!();
    println!("{}", "Channels:".bold());
    println!("  {}", CHANNEL_NAMES.join(" "));
    println!("  features = channel / G100 (G100 must be > 0)");
    println!();
    println!("{}", "Bundled models:".bold());
    for kind in ModelKind::ALL {
        let marker = if kind == dispatcher.kind() {
            "●".green()
        } else {
            "○".normal()
        };
        let summary = match reference::model(kind) {
            Ok(model) => model.describe(),
            Err(e) => format!("{} {}", "invalid:".red(), e),
        };
        println!("  {} {:<4} {}", marker, kind.short(), summary);
    }
    println!();
    println!("{}", "Active:".bold());
    println!("  model:   {}", dispatcher.model().describe());
    println!("  classes: {}", dispatcher.classes().names().join(", "));
    Ok(())
}
