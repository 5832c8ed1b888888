use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the mdx-guard binary.
#[derive(Debug, Parser)]
#[command(
    name = "mdx-guard",
    version,
    about = "Validate and render untrusted MDX content"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "MDX_GUARD_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: SettingsOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Validate an MDX file; exits non-zero when the content is rejected.
    Check(CheckArgs),
    /// Render an MDX file to HTML or a JSON node tree.
    Render(RenderArgs),
    /// Render a plain Markdown file to sanitised HTML.
    Markdown(MarkdownArgs),
}

#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    /// MDX source file.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// MDX source file.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Identity key for the render cache; derived from the file path and
    /// contents when omitted.
    #[arg(long, value_name = "KEY")]
    pub key: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,
}

#[derive(Debug, Args, Clone)]
pub struct MarkdownArgs {
    /// Markdown source file.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Html,
    Json,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SettingsOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Toggle the render cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub cache_enabled: Option<bool>,

    /// Override the render cache capacity.
    #[arg(long = "cache-capacity", value_name = "COUNT", global = true)]
    pub cache_capacity: Option<u64>,

    /// Override the maximum accepted MDX source size in bytes.
    #[arg(long = "render-max-source-bytes", value_name = "BYTES", global = true)]
    pub render_max_source_bytes: Option<u64>,
}
