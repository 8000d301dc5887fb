use anyhow::{Context, Result};
use papyrus::citations::to_bibtex;
use papyrus::cli::init::{self, InitConfig, InitResult};
use papyrus::cli::output::Output;
use papyrus::cli::{Cli, Commands, OutputFormat};
use papyrus::progress::{ChannelProgress, SharedProgress};
use papyrus::{BibliographicResolver, PapyrusConfig, Reference, SearchOrchestrator, SearchSummary};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose { "papyrus=debug" } else { "papyrus=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn output_for(no_color: bool) -> Output {
    if no_color {
        Output::no_color()
    } else {
        Output::new()
    }
}

fn load_config(path: &Path) -> Result<PapyrusConfig> {
    PapyrusConfig::load_or_default(path)
        .with_context(|| format!("failed to load {}", path.display()))
}

fn print_references(output: &Output, references: &[Reference], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            for (index, reference) in references.iter().enumerate() {
                output.reference(index + 1, reference);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(references)?);
        }
        OutputFormat::Bibtex => {
            for reference in references {
                let entry = reference
                    .bibtex
                    .clone()
                    .unwrap_or_else(|| to_bibtex(reference));
                println!("{}\n", entry);
            }
        }
    }
    Ok(())
}

async fn run_search(
    cli_config: &Path,
    no_color: bool,
    topic: String,
    preprints: bool,
    context: String,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(cli_config)?;
    let orchestrator = SearchOrchestrator::from_config(&config)?;
    let output = output_for(no_color);
    output.banner();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let progress: SharedProgress = Arc::new(ChannelProgress(tx));
    let printer = tokio::spawn(async move {
        let output = output_for(no_color);
        while let Some(event) = rx.recv().await {
            output.progress(&event);
        }
    });

    let session = orchestrator
        .run_session(&topic, &context, preprints, progress)
        .await;
    // All senders are gone once the session returns
    printer.await.ok();

    let references = session.retained_references;
    if references.is_empty() {
        output.warning("No references survived validation");
        output.hint("Try a broader topic, or check your API key and rate limits");
        return Ok(());
    }

    print_references(&output, &references, format)?;
    output.summary(&SearchSummary::of(&references));
    Ok(())
}

async fn run_resolve(
    cli_config: &Path,
    no_color: bool,
    doi: Option<String>,
    title: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(cli_config)?;
    let resolver = BibliographicResolver::from_config(&config)?;
    let output = output_for(no_color);

    let candidate = match (doi, title) {
        (Some(doi), title) => Reference::candidate(title.unwrap_or_else(|| doi.clone()), "cli").with_doi(doi),
        (None, Some(title)) => Reference::candidate(title, "cli"),
        (None, None) => anyhow::bail!("either --doi or --title is required"),
    };

    let reference = resolver.resolve(candidate).await;
    if !reference.is_verified {
        output.warning("No bibliographic source recognised this reference");
    }
    print_references(&output, std::slice::from_ref(&reference), format)
}

fn run_config(cli_config: &Path, no_color: bool, validate: bool) -> Result<()> {
    let config = load_config(cli_config)?;
    let output = output_for(no_color);

    config.validate().context("configuration is invalid")?;
    if validate {
        output.success(&format!("{} is valid", cli_config.display()));
        return Ok(());
    }

    output.header("Configuration");
    output.kv("file", &cli_config.display().to_string());
    output.kv("provider", &format!("{:?}", config.llm.provider));
    output.kv("model", &config.llm.model);
    output.kv("api key variables", &config.llm.api_key_envs.join(", "));
    output.kv("source timeout", &format!("{}s", config.sources.timeout_secs));
    output.kv(
        "validation concurrency",
        &config
            .validation
            .max_concurrency
            .map_or_else(|| "unbounded".to_string(), |limit| limit.to_string()),
    );
    output.kv("quality filter", &format!("{:?}", config.validation.quality_filter));

    output.header("Agents");
    for agent in &config.search.agents {
        output.list_item(&format!("{} ({:?})", agent.name, agent.preprint_policy));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    init_tracing(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Search {
            topic,
            preprints,
            context,
            format,
        } => run_search(&cli.config, cli.no_color, topic, preprints, context, format).await,
        Commands::Resolve { doi, title, format } => {
            run_resolve(&cli.config, cli.no_color, doi, title, format).await
        }
        Commands::Init { path, force } => {
            match init::run(InitConfig { path, force }, &output_for(cli.no_color)) {
                InitResult::Success | InitResult::AlreadyExists => Ok(()),
                InitResult::Error(e) => anyhow::bail!(e),
            }
        }
        Commands::Config { validate } => run_config(&cli.config, cli.no_color, validate),
    }
}
