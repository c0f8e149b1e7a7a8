// src/config.rs
use crate::constants::{DEFAULT_COVER_POSITION, MIN_TOC_ITEMS, NOTION_MAX_FETCH_DEPTH};
use crate::error::AppError;
use crate::types::{ApiKey, NotionId, SearchCredentials};
use clap::Parser;
use std::path::PathBuf;

/// Parsed and validated command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Notion page URL or ID (e.g., "https://www.notion.so/...")
    pub notion_input: String,

    /// Output file for the rendered HTML (stdout if omitted)
    #[arg(short, long)]
    pub output_file: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Render the full page shell (cover, icon, aside TOC) instead of the
    /// bare content tree
    #[arg(long, default_value_t = true)]
    pub full_page: bool,

    /// Emit dark-mode page classes
    #[arg(long, default_value_t = false)]
    pub dark_mode: bool,

    /// Show the aside table of contents when enough headings exist
    #[arg(long, default_value_t = true)]
    pub table_of_contents: bool,

    /// Minimum heading count before the aside TOC appears
    #[arg(long, default_value_t = MIN_TOC_ITEMS)]
    pub min_toc_items: usize,

    /// Maximum recursion depth when fetching block trees
    #[arg(long, default_value_t = 10)]
    pub depth: u8,

    /// Base path prepended to intra-workspace page links
    #[arg(long, default_value = "/")]
    pub page_url_base: String,
}

/// Presentation options threaded into the render pass.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub full_page: bool,
    pub dark_mode: bool,
    pub show_table_of_contents: bool,
    pub min_table_of_contents_items: usize,
    pub default_cover_position: f64,
    /// Base path for page links; a page id is appended directly.
    pub page_url_base: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            full_page: true,
            dark_mode: false,
            show_table_of_contents: true,
            min_table_of_contents_items: MIN_TOC_ITEMS,
            default_cover_position: DEFAULT_COVER_POSITION,
            page_url_base: "/".to_string(),
        }
    }
}

impl RenderOptions {
    /// Maps a page identifier to the href used for page links.
    pub fn page_url(&self, id: &str) -> String {
        format!("{}{}", self.page_url_base, id)
    }
}

/// Resolved pipeline configuration — validated and ready to drive the
/// fetch and render stages.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub notion_id: NotionId,
    pub api_key: ApiKey,
    pub depth: u8,
    pub output_file: Option<PathBuf>,
    pub verbose: bool,
    pub render: RenderOptions,
    /// Present only when the unofficial search endpoint is configured.
    pub search: Option<SearchCredentials>,
}

impl PipelineConfig {
    /// Resolves a complete configuration from CLI input and environment.
    ///
    /// `NOTION_API_KEY` is required; `NOTION_TOKEN_V2`/`NOTION_ACTIVE_USER`
    /// are only read when both are present.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        let api_key_str = std::env::var("NOTION_API_KEY").map_err(|_| {
            AppError::MissingConfiguration(
                "NOTION_API_KEY environment variable not set".to_string(),
            )
        })?;

        let api_key = ApiKey::new(api_key_str)?;
        let notion_id = NotionId::parse(&cli.notion_input)?;

        let search = match (
            std::env::var("NOTION_TOKEN_V2").ok(),
            std::env::var("NOTION_ACTIVE_USER").ok(),
        ) {
            (Some(token), Some(user)) => Some(SearchCredentials::new(token, user)?),
            _ => None,
        };

        let depth = cli.depth.min(NOTION_MAX_FETCH_DEPTH);
        if cli.depth > depth {
            log::warn!(
                "Requested recursion depth {} exceeds maximum safe depth {}. Clamping.",
                cli.depth,
                depth
            );
        }

        Ok(PipelineConfig {
            notion_id,
            api_key,
            depth,
            output_file: cli.output_file.map(PathBuf::from),
            verbose: cli.verbose,
            render: RenderOptions {
                full_page: cli.full_page,
                dark_mode: cli.dark_mode,
                show_table_of_contents: cli.table_of_contents,
                min_table_of_contents_items: cli.min_toc_items,
                default_cover_position: DEFAULT_COVER_POSITION,
                page_url_base: cli.page_url_base,
            },
            search,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_mapping() {
        let options = RenderOptions {
            page_url_base: "/note/".to_string(),
            ..RenderOptions::default()
        };
        assert_eq!(
            options.page_url("550e8400e29b41d4a716446655440000"),
            "/note/550e8400e29b41d4a716446655440000"
        );
    }
}
