mod console;

use sgpresolver::ResolverServerExt;
use sgpserver::{ServerBuilder, init_logging};
use tracing::info;

const USAGE: &str = "Usage: SGPlaylist [serve | player [--local]]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None | Some("serve") => serve().await,
        Some("player") => {
            let local = args.iter().skip(1).any(|a| a == "--local");
            let log_state = init_logging();
            console::run(log_state, local).await
        }
        Some("-h") | Some("--help") | Some("help") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(other) => {
            anyhow::bail!("Unknown command '{}'. {}", other, USAGE)
        }
    }
}

/// Lance le service de résolution HTTP
async fn serve() -> anyhow::Result<()> {
    let mut server = ServerBuilder::new_configured().build();
    server.init_logging();

    info!("Initializing resolver service...");
    server.init_resolver().await?;

    let addr = server.start().await?;
    info!("SGPlaylist resolver listening on http://{}/resolve", addr);
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}
