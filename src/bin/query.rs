use anyhow::Result;
use clap::Parser;
use sparqlbench::{output, resultsets, sparql::SparqlClient, Config, LanguageList, QuestionsFile};
use std::path::PathBuf;
use std::time::Duration;

/// Query the RDF endpoint with the queries in QUESTIONS_FILE or ANSWERS_FILE.
///
/// Without --answers-file the ground-truth result set is written, including
/// the list of order-sensitive questions. With it, the predicted result set.
#[derive(Parser, Debug)]
#[command(name = "query", version)]
struct Args {
    /// Questions YAML file
    questions_file: PathBuf,

    /// Answers JSON produced by `ask`; switches to the predicted result set
    #[arg(short, long)]
    answers_file: Option<PathBuf>,

    /// RDF endpoint URL for the dataset
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Which file to save the result set to (`-` for stdout)
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Languages of the questions, e.g. "['en', 'de']" or en,de
    #[arg(short, long, default_value = "en")]
    languages: LanguageList,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let args = Args::parse();
    let config = Config::load()?.evaluate;
    output::check_output_free(&args.output)?;

    let file = QuestionsFile::load(&args.questions_file)?;
    let endpoint = args.endpoint.unwrap_or(config.sparql_endpoint);
    let sparql = SparqlClient::new(&endpoint, Duration::from_secs(config.sparql_timeout_secs))?;

    log::info!("Querying {} for {} questions ({}).", sparql.endpoint(), file.questions.len(), args.languages);

    match args.answers_file {
        Some(path) => {
            let responses = resultsets::load_responses(&path)?;
            let predicted = resultsets::predicted(&sparql, &responses, &file, &args.languages).await?;
            log::info!("Writing {} results to {}.", predicted.len(), output::describe(&args.output));
            output::write_json(&args.output, &predicted)?;
        }
        None => {
            let truth = resultsets::ground_truth(&sparql, &file, &args.languages).await?;
            log::info!("Writing {} results to {}.", truth.sets.len(), output::describe(&args.output));
            output::write_json(&args.output, &truth)?;
        }
    }

    Ok(())
}
