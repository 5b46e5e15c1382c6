use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_geoclean::config::ConfigLoader;
use kira_geoclean::error::KiraError;
use kira_geoclean::fs_util::format_file_size;
use kira_geoclean::geo::LocalGeoFetcher;
use kira_geoclean::organism::OrganismNormalizer;
use kira_geoclean::output::{JsonOutput, OrganismResult, OutputMode, ProcessResult};
use kira_geoclean::pipeline::{
    Pipeline, ProcessedBundle, ProgressEvent, ProgressSink, QualityOverview,
};
use kira_geoclean::store::{BundleStore, WrittenBundle};

#[derive(Parser)]
#[command(name = "kira-gc")]
#[command(about = "Clean GEO datasets into sample metadata, expression matrices and a missing-data report")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Process an uploaded .soft or .txt file")]
    Process(ProcessArgs),
    #[command(about = "Process a dumped GEO accession object")]
    Fetch(FetchArgs),
    #[command(about = "Print canonical organism names")]
    Organism(OrganismArgs),
}

#[derive(Args)]
struct ProcessArgs {
    file: String,

    #[arg(long)]
    out: Option<String>,
}

#[derive(Args)]
struct FetchArgs {
    accession: String,

    #[arg(long)]
    source_dir: String,

    #[arg(long)]
    out: Option<String>,
}

#[derive(Args)]
struct OrganismArgs {
    #[arg(required = true)]
    names: Vec<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(kira) = report.downcast_ref::<KiraError>() {
            return ExitCode::from(map_exit_code(kira));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &KiraError) -> u8 {
    match error {
        KiraError::UnrecognizedSourceKind
        | KiraError::MalformedSource(_)
        | KiraError::UnsupportedFileFormat(_)
        | KiraError::FileParse { .. }
        | KiraError::InvalidGeoAccession(_)
        | KiraError::SourceNotFound(_) => 2,
        KiraError::InvalidAlias(_)
        | KiraError::InvalidPattern(_)
        | KiraError::ConfigRead(_)
        | KiraError::ConfigParse(_) => 2,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let resolved = ConfigLoader::resolve(cli.config.as_deref())?;
    let pipeline = Pipeline::new(&resolved)?;

    match cli.command {
        Commands::Process(args) => run_process(args, &pipeline, output_mode),
        Commands::Fetch(args) => run_fetch(args, &pipeline, output_mode),
        Commands::Organism(args) => run_organism(args, pipeline.normalizer(), output_mode),
    }
}

fn run_process(
    args: ProcessArgs,
    pipeline: &Pipeline,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let path = Path::new(&args.file);
    let content =
        fs::read(path).map_err(|err| KiraError::Filesystem(format!("read {}: {err}", args.file)))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(args.file.as_str());

    let bundle = match output_mode {
        OutputMode::NonInteractive => pipeline.process_file(&content, filename, &JsonOutput)?,
        OutputMode::Interactive => pipeline.process_file(&content, filename, &StderrProgress)?,
    };
    finish(pipeline, &bundle, args.out.as_deref(), output_mode)
}

fn run_fetch(args: FetchArgs, pipeline: &Pipeline, output_mode: OutputMode) -> miette::Result<()> {
    let fetcher = LocalGeoFetcher::new(args.source_dir.as_str());
    let bundle = match output_mode {
        OutputMode::NonInteractive => {
            pipeline.process_accession(&fetcher, &args.accession, &JsonOutput)?
        }
        OutputMode::Interactive => {
            pipeline.process_accession(&fetcher, &args.accession, &StderrProgress)?
        }
    };
    finish(pipeline, &bundle, args.out.as_deref(), output_mode)
}

fn run_organism(
    args: OrganismArgs,
    normalizer: &OrganismNormalizer,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let results: Vec<OrganismResult> = args
        .names
        .into_iter()
        .map(|input| OrganismResult {
            canonical: normalizer.normalize(&input),
            input,
        })
        .collect();
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_organisms(&results).into_diagnostic()?,
        OutputMode::Interactive => {
            for result in &results {
                println!("{} -> {}", result.input, result.canonical);
            }
        }
    }
    Ok(())
}

fn finish(
    pipeline: &Pipeline,
    bundle: &ProcessedBundle,
    out: Option<&str>,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let overview = pipeline.overview(bundle);
    let written = match out {
        Some(dir) => Some(BundleStore::new(dir).write_bundle(bundle, overview.clone())?),
        None => None,
    };
    match output_mode {
        OutputMode::NonInteractive => {
            let result = ProcessResult {
                overview: &overview,
                written: written.as_ref(),
            };
            JsonOutput::print_process(&result).into_diagnostic()?;
        }
        OutputMode::Interactive => print_summary(&overview, written.as_ref()),
    }
    Ok(())
}

fn print_summary(overview: &QualityOverview, written: Option<&WrittenBundle>) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    let summary = &overview.summary;
    println!("{cyan}KIRA-GC summary: {}{reset}", overview.origin.label());
    println!("{green}Samples: {}{reset}", summary.metadata_records);
    if let Some(shape) = &summary.expression {
        println!(
            "{green}Expression: {} features x {} samples{reset}",
            shape.features, shape.samples
        );
    }
    println!(
        "{green}Completion: {:.1}% ({} missing values){reset}",
        summary.completion_rate, summary.total_missing
    );
    for (organism, count) in &summary.organism_distribution {
        println!("   {organism}: {count}");
    }
    for column in &overview.missing_columns {
        println!(
            "{yellow}   {}: {} missing ({:.1}%){reset}",
            column.column, column.missing, column.percent_of_rows
        );
    }
    for warning in &overview.warnings {
        println!("{yellow}warning: {warning}{reset}");
    }
    for recommendation in &overview.recommendations {
        println!("- {recommendation}");
    }
    if let Some(written) = written {
        for path in written.paths() {
            let size = fs::metadata(path.as_std_path())
                .map(|meta| format_file_size(meta.len()))
                .unwrap_or_else(|_| "?".to_string());
            println!("{cyan}wrote {path} ({size}){reset}");
        }
    }
}

struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => eprintln!("{} ({} ms)", event.message, elapsed.as_millis()),
            None => eprintln!("{}", event.message),
        }
    }
}
