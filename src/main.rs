use clap::{Parser, Subcommand};
use std::process::ExitCode;

use treasure_atlas::web::{self, AppState};
use treasure_atlas::Config;

#[derive(Parser)]
#[command(name = "treasure-atlas")]
#[command(about = "Balloon telemetry aggregator with live weather")]
struct Cli {
    /// YAML configuration file; built-in defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the combined positions API
    Serve {
        /// Address to listen on, overriding the configuration
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run one aggregation and print the combined document
    Combine {
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match cli.config.as_deref().map(Config::from_file).transpose() {
        Ok(c) => c.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.web.bind = bind;
            }
            serve(config).await
        }
        Commands::Combine { pretty } => combine(&config, pretty).await,
    }
}

async fn serve(config: Config) -> ExitCode {
    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn combine(config: &Config, pretty: bool) -> ExitCode {
    let state = AppState::new(config);

    let response = match state.aggregator.combine().await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Aggregation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let rendered = if pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    };

    match rendered {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            ExitCode::FAILURE
        }
    }
}
