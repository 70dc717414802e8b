use clap::Parser;
use sparqlbench::{serve, Config};

/// Run the demonstration TEXT2SPARQL endpoint.
#[derive(Parser, Debug)]
#[command(name = "serve", version)]
struct Args {
    /// Host to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let args = Args::parse();
    let config = Config::load()?.serve;

    let host = args.host.unwrap_or(config.host);
    let port = args.port.unwrap_or(config.port);
    serve::run(&host, port).await?;
    Ok(())
}
