use anyhow::{Context, Result};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use tracing::{error, info};

use career_guide::{chat, gateway, web_server, GatewayConfig};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the career guidance chat UI.
    Serve {
        #[arg(long, env = "CAREER_GUIDE_HOST", default_value = "127.0.0.1", help = "Address to bind.")]
        host: IpAddr,
        #[arg(long, env = "CAREER_GUIDE_PORT", default_value_t = 3000, help = "Port for the web server.")]
        port: u16,
    },
    /// Ask a single question and print the formatted answer.
    Ask {
        #[arg(required = true, num_args = 1.., help = "The question to ask.")]
        query: Vec<String>,
    },
    /// Ask questions one at a time from the terminal.
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (GEMINI_API_KEY and friends)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG (e.g. RUST_LOG=info,career_guide=debug); stdout stays for answers.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("career-guide starting with command: {:?}", cli.command);

    let config = GatewayConfig::from_env().context("Failed to load configuration")?;
    let gateway = gateway::init(&config).context("Failed to initialize AI gateway")?;

    match cli.command {
        Commands::Serve { host, port } => {
            let addr = SocketAddr::new(host, port);
            let mut web_server_handle =
                tokio::spawn(web_server::start_web_server(addr, gateway.clone()));

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl-C received, shutting down...");
                    web_server_handle.abort();
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(Ok(())) => info!("Web server task completed unexpectedly."),
                        Ok(Err(e)) => {
                            error!("Web server failed: {:?}", e);
                            return Err(e);
                        }
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }
            info!("Shutdown complete.");
        }
        Commands::Ask { query } => {
            let query = query.join(" ");
            let reply = gateway
                .get_ai_response(&query)
                .await
                .context("AI request failed")?;
            println!("{}", reply);
        }
        Commands::Chat => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            chat::run_chat(gateway, stdin, std::io::stdout())
                .await
                .context("Chat session failed")?;
        }
    }

    Ok(())
}
