//! Arogya: healthcare assistant server and CLI.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use arogya_server::cli;
use arogya_server::build_router;

const DEFAULT_INSPECT_LIMIT: usize = 5;

fn print_help() {
    println!("Arogya — healthcare assistant");
    println!();
    println!("Usage: arogya [command]");
    println!();
    println!("Commands:");
    println!("  serve                    Start the HTTP server (default)");
    println!("  ask <text>               Run one query through the workflow");
    println!("  ingest <path>            Add a .txt/.md file or directory to the knowledge store");
    println!("  inspect [limit]          Show knowledge store stats and sample documents");
    println!("  videos <query>           Search YouTube yoga videos");
    println!("  yoga <query>             Run the yoga recommendation chain");
    println!("  help                     Show this help message");
}

/// Everything after the subcommand, joined; exits with usage if empty.
fn required_text(args: &[String], usage: &str) -> String {
    let text = args.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();
    if text.trim().is_empty() {
        eprintln!("Usage: {}", usage);
        std::process::exit(1);
    }
    text
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let data_dir = cli::resolve_data_dir();

    if args.len() > 1 {
        match args[1].as_str() {
            "serve" => {}
            "ask" => {
                let text = required_text(&args, "arogya ask <text>");
                return cli::ask(&data_dir, &text).await;
            }
            "ingest" => {
                let path = PathBuf::from(required_text(&args, "arogya ingest <path>"));
                return cli::ingest(&data_dir, &path);
            }
            "inspect" => {
                let limit = args
                    .get(2)
                    .and_then(|l| l.parse().ok())
                    .unwrap_or(DEFAULT_INSPECT_LIMIT);
                return cli::inspect(&data_dir, limit);
            }
            "videos" => {
                let query = required_text(&args, "arogya videos <query>");
                return cli::videos(&data_dir, &query).await;
            }
            "yoga" => {
                let query = required_text(&args, "arogya yoga <query>");
                return cli::yoga(&data_dir, &query).await;
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'arogya help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    info!("Data directory: {}", data_dir.display());

    let state = Arc::new(cli::build_state(&data_dir)?);
    let port = state.config.port;
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Arogya server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
