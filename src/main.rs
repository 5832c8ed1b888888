use std::{path::Path, process};

use mdx_guard::{
    application::{
        error::AppError,
        render::{
            RenderPipelineConfig, configure_render_service, markdown_sanitizer, render_mdx,
            render_service, validate_mdx,
        },
    },
    cache::{CacheConfig, IdentityKey},
    config::{self, CheckArgs, MarkdownArgs, OutputFormat, RenderArgs},
    infra::{error::InfraError, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        eprintln!("{}", error.presentation_message());
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;
    configure_render_service(
        RenderPipelineConfig::from(&settings.render),
        CacheConfig::from(&settings.cache),
    )
    .map_err(|err| AppError::unexpected(err.to_string()))?;

    match cli_args.command {
        config::Command::Check(args) => run_check(args).await,
        config::Command::Render(args) => run_render(args).await,
        config::Command::Markdown(args) => run_markdown(args).await,
    }
}

async fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let source = read_source(&args.file).await?;

    match validate_mdx(render_service(), source).await {
        Ok(()) => {
            info!(
                target = "mdx_guard::check",
                file = %args.file.display(),
                "Document accepted"
            );
            println!("ok");
            Ok(())
        }
        Err(err) => {
            warn!(
                target = "mdx_guard::check",
                file = %args.file.display(),
                error = %err,
                "Document rejected"
            );
            Err(AppError::from(err))
        }
    }
}

async fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let source = read_source(&args.file).await?;
    let key = match args.key {
        Some(key) => IdentityKey::new(key),
        None => IdentityKey::content_addressed(&args.file.display().to_string(), &source),
    };

    info!(
        target = "mdx_guard::render",
        file = %args.file.display(),
        key = %key,
        "Rendering document"
    );

    let node = render_mdx(render_service(), key, source).await?;
    let output = match args.format {
        OutputFormat::Html => node.to_html(),
        OutputFormat::Json => serde_json::to_string_pretty(&node).map_err(InfraError::from)?,
    };

    println!("{output}");
    Ok(())
}

async fn run_markdown(args: MarkdownArgs) -> Result<(), AppError> {
    let source = read_source(&args.file).await?;
    let html = markdown_sanitizer().render_to_html(&source);

    info!(
        target = "mdx_guard::markdown",
        file = %args.file.display(),
        bytes = html.len(),
        "Rendered markdown"
    );

    println!("{html}");
    Ok(())
}

async fn read_source(path: &Path) -> Result<String, AppError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))
}
