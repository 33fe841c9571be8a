mod cli;

use std::path::Path;

use anyhow::{bail, Context};
use base64::Engine;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parallel::api::{create_router, ApiState};
use parallel::config::Config;
use parallel::controller::{AppController, InputMode};
use parallel::gateway::HttpGateway;
use parallel::llm::LlmProvider;
use parallel::models::{NewLogEntry, ProfilePatch, Requestor};
use parallel::store::{FileStorage, ProfileStore};

use crate::cli::{Cli, Commands, LogCommands, ProfileCommands};

type Controller = AppController<HttpGateway, FileStorage>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    let default_filter = match cli.command {
        Commands::Serve { .. } => "parallel=info,tower_http=debug",
        _ => "parallel=warn",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env();
    if let Some(api_url) = cli.api_url {
        config.client.api_url = api_url;
    }
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Commands::Hooks { tag } => {
            print!("{}", cli::render_hooks(tag.as_deref()));
            Ok(())
        }
        Commands::Modes => {
            print!("{}", cli::render_modes());
            Ok(())
        }
        Commands::Analyze { message, mode } => {
            let mut controller = controller(&config);
            controller.set_input_mode(InputMode::Respond);
            controller.select_mode(mode);
            controller.set_incoming_message(message);
            submit(&mut controller).await
        }
        Commands::ToneCheck { draft, apply } => {
            let mut controller = controller(&config);
            controller.set_input_mode(InputMode::ToneCheck);
            controller.set_incoming_message(draft);
            if !apply {
                return submit(&mut controller).await;
            }
            run_submission(&mut controller).await?;
            if !controller.apply_neutral_rewrite() {
                eprintln!("No rewrite needed.");
            }
            println!("{}", controller.state().current_draft);
            Ok(())
        }
        Commands::Profile { command } => profile(command, &mut controller(&config)),
        Commands::Log { command } => log(command, &mut controller(&config)),
        Commands::Extract { file, target } => {
            let mut controller = controller(&config);
            let (base64_data, mime_type) = read_document(&file)?;
            let text = controller
                .import_document(&base64_data, &mime_type, target.into())
                .await?;
            if text.trim().is_empty() {
                eprintln!("No readable text found in {}", file.display());
                return Ok(());
            }
            controller.save_profile()?;
            println!("Imported {} characters from {}", text.len(), file.display());
            Ok(())
        }
    }
}

fn controller(config: &Config) -> Controller {
    let gateway = HttpGateway::new(config.client.api_url.clone());
    let store = ProfileStore::new(FileStorage::new(config.storage.data_dir.clone()));
    AppController::new(gateway, store)
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Initializing LLM provider: {}...", config.llm.model);
    let llm = LlmProvider::new(&config.llm);
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - analysis requests will fail with a configuration error");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = create_router(ApiState::new(config, llm));

    tracing::info!("Parallel starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn profile(command: ProfileCommands, controller: &mut Controller) -> anyhow::Result<()> {
    match command {
        ProfileCommands::Show => {
            print!("{}", cli::render_profile(&controller.state().user_profile));
        }
        ProfileCommands::Set {
            name,
            email,
            co_parent_name,
            children_names,
            decree,
            plan,
        } => {
            let patch = ProfilePatch {
                name,
                email,
                co_parent_name,
                children_names,
                decree_context: decree,
                parenting_plan_context: plan,
            };
            if patch.is_empty() {
                bail!("Nothing to update; pass at least one field");
            }
            controller.update_profile(patch);
            controller.save_profile()?;
            print_notice(controller);
        }
    }
    Ok(())
}

fn log(command: LogCommands, controller: &mut Controller) -> anyhow::Result<()> {
    match command {
        LogCommands::Add {
            reason,
            date,
            requestor,
            notes,
        } => {
            let Some(requestor) = Requestor::parse(&requestor) else {
                bail!("Unknown requestor '{requestor}', expected me, co-parent or other");
            };
            let mut draft = NewLogEntry {
                requestor,
                reason,
                notes,
                ..Default::default()
            };
            if date.is_some() {
                draft.date = date;
            }
            let entry = controller.add_log_entry(draft)?;
            print_notice(controller);
            println!("{}", entry.id);
        }
        LogCommands::List => {
            print!("{}", cli::render_logs(&controller.state().user_profile.logs));
        }
        LogCommands::Delete { id } => controller.delete_log_entry(&id)?,
    }
    Ok(())
}

async fn submit(controller: &mut Controller) -> anyhow::Result<()> {
    run_submission(controller).await?;
    if let Some(view) = controller.result_view() {
        print!("{}", cli::render_result(&view));
    }
    Ok(())
}

async fn run_submission(controller: &mut Controller) -> anyhow::Result<()> {
    if !controller.submit().await {
        bail!("Nothing to submit; the message is empty");
    }
    if let Some(error) = &controller.state().error {
        bail!("{error}");
    }
    Ok(())
}

fn print_notice(controller: &mut Controller) {
    if let Some(notice) = controller.take_notice() {
        eprintln!("{notice}");
    }
}

fn read_document(path: &Path) -> anyhow::Result<(String, String)> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let supported = mime.type_() == mime_guess::mime::IMAGE || mime.essence_str() == "application/pdf";
    if !supported {
        bail!("Unsupported document type {mime}; use a PDF or an image");
    }

    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok((encoded, mime.essence_str().to_string()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down...");
}
