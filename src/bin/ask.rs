use anyhow::Result;
use clap::Parser;
use sparqlbench::{
    cache::ResponseCache,
    collector::AnswerCollector,
    endpoint::{RetryLog, RetryPolicy, RetryingRequester, Text2SparqlClient},
    output, Config, QuestionsFile,
};
use std::path::PathBuf;
use std::time::Duration;

/// Query a TEXT2SPARQL endpoint.
///
/// Sends each question of QUESTIONS_FILE, in every language it is written in,
/// to URL and writes the answers as JSON. Responses are cached in a SQLite
/// database (--answers-db).
#[derive(Parser, Debug)]
#[command(name = "ask", version)]
struct Args {
    /// Questions YAML file
    questions_file: PathBuf,

    /// TEXT2SPARQL endpoint URL
    url: String,

    /// Where to save the endpoint responses
    #[arg(long)]
    answers_db: Option<PathBuf>,

    /// Timeout in seconds for each request
    #[arg(long)]
    timeout: Option<u64>,

    /// Number of retries for disconnected, http error and timed out requests
    #[arg(short, long)]
    retries: Option<u32>,

    /// Seconds to wait before each retry
    #[arg(long)]
    retry_sleep: Option<u64>,

    /// File to log retries errors to (`-` for stderr)
    #[arg(long)]
    retries_log: Option<String>,

    /// Save JSON output to this file (`-` for stdout)
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Always ask the endpoint, ignoring and not updating the answers database
    #[arg(long)]
    no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let args = Args::parse();
    let config = Config::load()?.ask;

    let file = QuestionsFile::load(&args.questions_file)?;
    output::check_output_free(&args.output)?;

    let policy = RetryPolicy {
        timeout: Duration::from_secs(args.timeout.unwrap_or(config.timeout_secs)),
        max_retries: args.retries.unwrap_or(config.retries),
        delay: Duration::from_secs(args.retry_sleep.unwrap_or(config.retry_sleep_secs)),
    };
    if policy.timeout.is_zero() {
        anyhow::bail!("--timeout must be greater than 0");
    }

    let retry_log = RetryLog::open(args.retries_log.as_deref().unwrap_or(&config.retries_log))?;
    let cache = if args.no_cache || !config.cache {
        ResponseCache::disabled()
    } else {
        ResponseCache::open(args.answers_db.unwrap_or(config.answers_db)).await?
    };

    let client = Text2SparqlClient::new(&args.url)?;
    let collector = AnswerCollector::new(RetryingRequester::new(&client, policy, &retry_log), &cache);
    let (answers, stats) = collector.collect(&file).await?;

    log::info!(
        "Asked {} questions ({} cached, {} skipped).",
        stats.asked,
        stats.cached,
        stats.skipped
    );
    log::info!(
        "Writing {} responses to {}.",
        answers.len(),
        output::describe(&args.output)
    );
    output::write_json(&args.output, &answers)?;

    Ok(())
}
