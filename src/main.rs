// src/main.rs

use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion2html::{
    render_page, AppError, BaseUrlResolver, CommandLineInput, MemoizedResolver, NotionHttpClient,
    PipelineConfig, TreeFetcher,
};
use std::fs;
use std::sync::Arc;

/// Sets up logging configuration.
///
/// Diagnostics go to stderr so piped stdout stays clean HTML.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("notion2html.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stderr_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Executes the two-stage pipeline: fetch the block tree, render it.
async fn execute_pipeline(config: &PipelineConfig) -> Result<(), AppError> {
    let client = NotionHttpClient::new(&config.api_key)?;

    // Page mentions resolve to intra-site links; memoized so repeated
    // mentions of the same page cost one resolution.
    let resolver = Arc::new(MemoizedResolver::new(BaseUrlResolver::new(
        config.render.page_url_base.clone(),
    )));

    let fetcher = TreeFetcher::new(Arc::new(client))
        .with_max_depth(config.depth)
        .with_resolver(resolver);

    let record_map = fetcher.fetch_page(&config.notion_id).await?;
    log::info!("Fetched {} blocks", record_map.len());

    let html = render_page(&record_map, &config.render);

    match &config.output_file {
        Some(path) => {
            fs::write(path, &html)?;
            eprintln!("✓ HTML written to {}", path.display());
        }
        None => {
            println!("{}", html);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    let config = PipelineConfig::resolve(cli)?;

    execute_pipeline(&config).await?;

    Ok(())
}
