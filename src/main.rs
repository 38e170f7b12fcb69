use asset_graph::adapters::outbound::console::StderrProgressReporter;
use asset_graph::adapters::outbound::filesystem::FileSystemCriteriaReader;
use asset_graph::adapters::outbound::network::GraphQueryClient;
use asset_graph::application::dto::{GraphRequest, GraphResponse, OutputFormat};
use asset_graph::application::factories::{FormatterFactory, PresenterFactory, PresenterType};
use asset_graph::application::use_cases::{IncrementalLoader, PAGE_SIZE};
use asset_graph::cli::Args;
use asset_graph::config::{self, ConfigFile};
use asset_graph::graph_query::domain::FilterCriteria;
use asset_graph::graph_query::services::{CompileOptions, LayoutEngine, QueryCompiler};
use asset_graph::ports::outbound::CriteriaReader;
use asset_graph::shared::error::{ExitCode, GraphError};
use asset_graph::shared::Result;
use std::process;
use std::time::Duration;

const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }

            eprintln!();
            ExitCode::ApplicationError
        }
    };

    process::exit(exit_code.as_i32());
}

async fn run() -> Result<()> {
    let args = Args::parse_args();

    let config = match args.config.as_deref() {
        Some(path) => config::load_config_from_path(path)?,
        None => config::discover_config(&std::env::current_dir()?)?.unwrap_or_default(),
    };

    let criteria = resolve_criteria(&args, &config, &FileSystemCriteriaReader::new())?;
    let show_internet = args.internet || config.show_internet.unwrap_or(false);
    let request = GraphRequest::new(criteria).with_internet(show_internet);

    if args.print_query {
        print_programs(&request);
        return Ok(());
    }

    let endpoint = args
        .endpoint
        .clone()
        .or(config.endpoint.clone())
        .ok_or_else(|| GraphError::Validation {
            message: format!(
                "No query endpoint configured.\n\n💡 Hint: Pass --endpoint or set 'endpoint' in {}",
                config::CONFIG_FILENAME
            ),
        })?;
    let token = args.token.clone().or(config.token.clone());
    let timeout = Duration::from_secs(
        config
            .timeout_seconds
            .unwrap_or(GraphQueryClient::DEFAULT_TIMEOUT_SECONDS),
    );

    let client = GraphQueryClient::with_options(endpoint, token, timeout)?;
    let loader = IncrementalLoader::new(client, StderrProgressReporter::new());
    let snapshot = loader.load_pages(request, args.pages).await?;

    let mut response = GraphResponse::new(snapshot);
    if args.layout {
        let viewport_width = args
            .viewport_width
            .or(config.viewport_width)
            .unwrap_or(DEFAULT_VIEWPORT_WIDTH);
        response = response.with_layout(&LayoutEngine::default(), viewport_width);
    }

    let format: OutputFormat = args.format.or(config.format).unwrap_or_default();
    eprintln!("{}", FormatterFactory::progress_message(format));
    let formatted_output = FormatterFactory::create(format).format(&response)?;

    PresenterFactory::create(PresenterType::from_output(args.output.clone()))
        .present(&formatted_output)?;

    Ok(())
}

/// `--criteria` file, then the quick flags, then the config file's filters,
/// then the default broad query
fn resolve_criteria(
    args: &Args,
    config: &ConfigFile,
    reader: &impl CriteriaReader,
) -> Result<FilterCriteria> {
    if let Some(path) = args.criteria.as_deref() {
        return reader.read_criteria(path);
    }
    if args.has_quick_criterion() {
        return Ok(FilterCriteria::single(args.quick_criterion()));
    }
    Ok(config.filters.clone().unwrap_or_default())
}

fn print_programs(request: &GraphRequest) {
    let options = CompileOptions {
        show_internet: request.show_internet,
    };
    let criteria = request.criteria.as_slice();

    println!("// data");
    println!(
        "{}",
        QueryCompiler::compile_with_options(criteria, PAGE_SIZE, false, options)
    );
    println!();
    println!("// count");
    println!(
        "{}",
        QueryCompiler::compile_with_options(criteria, PAGE_SIZE, true, options)
    );
}
