use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use engraver::{
    Config,
    cli::{Cli, Commands, ConfigCommands},
    core::{Prompt, download::download_design, run_batch, source_from_config},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Provider token may live in a local .env file
    dotenvy::dotenv().ok();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // The TUI owns the terminal, so its logs go to a file
    let tui_mode = matches!(cli.command, None | Some(Commands::Tui));
    if let Err(e) = init_logging(filter, tui_mode) {
        eprintln!("warning: logging disabled: {e}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(filter: &str, to_file: bool) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::new(filter));

    if to_file {
        let path = Config::log_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?;

    // No subcommand = launch TUI
    let Some(command) = cli.command else {
        return engraver::tui::run(config).await;
    };

    match command {
        Commands::Tui => {
            engraver::tui::run(config).await?;
        }

        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.api.host.clone());
            let port = port.unwrap_or(config.api.port);
            engraver::api::serve(&config, &host, port).await?;
        }

        Commands::Generate {
            theme,
            surprise,
            download,
            format,
        } => {
            let prompt = if surprise {
                Prompt::surprise()
            } else {
                let theme = theme.unwrap_or_default();
                Prompt::themed(&theme).ok_or_else(|| anyhow::anyhow!("theme must not be blank"))?
            };
            generate(&config, &prompt, download, &format).await?;
        }

        Commands::Download { url, name, dir } => {
            let dir = dir.unwrap_or_else(|| config.client.download_dir());
            let path = download_design(&reqwest::Client::new(), &url, &name, &dir).await?;
            println!("{}", path.display());
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigCommands::Path => {
                let path = Config::config_path()?;
                println!("{}", path.display());
            }
        },
    }

    Ok(())
}

async fn generate(
    config: &Config,
    prompt: &Prompt,
    download: Option<std::path::PathBuf>,
    format: &str,
) -> anyhow::Result<()> {
    let source = source_from_config(config);
    let designs = run_batch(source.as_ref(), prompt, config.generation.batch_size).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&designs)?);
    } else {
        println!("{:<18} Image", "Name");
        println!("{}", "-".repeat(80));
        for design in &designs {
            println!("{:<18} {}", design.name, design.image_url);
        }
    }

    if let Some(dir) = download {
        let http = reqwest::Client::new();
        // A failed download only affects that design
        for design in &designs {
            match download_design(&http, &design.image_url, &design.name, &dir).await {
                Ok(path) => eprintln!("saved {}", path.display()),
                Err(e) => eprintln!("Failed to download image '{}': {e}", design.name),
            }
        }
    }

    Ok(())
}
