use clap::Parser;
use docqa::cli::handle_ask_command;
use docqa::cli::handle_chat_command;
use docqa::cli::handle_config_command;
use docqa::cli::handle_docs_command;
use docqa::cli::handle_ingest_command;
use docqa::cli::handle_init_command;
use docqa::cli::handle_remove_command;
use docqa::cli::handle_serve_api;
use docqa::cli::handle_stats_command;
use docqa::cli::print_error;
use docqa::cli::Cli;
use docqa::cli::Commands;
use docqa::AppConfig;
use docqa::Result;
use tracing::info;

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    let level_override = cli.verbose.then_some("debug");
    docqa::logging::init_logging_with_config(Some(&config), level_override)?;
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Init { skip_indexes } => handle_init_command(&config, skip_indexes).await?,
        Commands::Serve {
            host,
            port,
            no_cors,
        } => handle_serve_api(&config, host, port, no_cors).await?,
        Commands::Ingest { file, user, name } => {
            handle_ingest_command(&config, &file, &user, name.as_deref()).await?;
        }
        Commands::Ask {
            question,
            user,
            doc,
            k,
            show_sources,
        } => {
            handle_ask_command(&config, &question, &user, doc.as_deref(), k, show_sources).await?;
        }
        Commands::Chat { user, doc } => {
            handle_chat_command(&config, &user, doc.as_deref()).await?;
        }
        Commands::Docs { user } => handle_docs_command(&config, &user).await?,
        Commands::Remove { user, doc } => handle_remove_command(&config, &user, &doc).await?,
        Commands::Stats => handle_stats_command(&config).await?,
        Commands::Config => handle_config_command(&config),
    }

    Ok(())
}
