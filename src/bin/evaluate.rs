//! Evaluation CLI: score the answers of a TEXT2SPARQL endpoint against the
//! reference queries and write per-question and averaged metrics.

use anyhow::Result;
use clap::Parser;
use sparqlbench::{
    metrics::{Evaluation, Measure},
    output, resultsets,
    sparql::SparqlClient,
    Config, LanguageList, QuestionsFile,
};
use std::path::PathBuf;
use std::time::Duration;

/// Evaluate the results from a TEXT2SPARQL endpoint.
#[derive(Parser, Debug)]
#[command(name = "evaluate", version)]
struct Args {
    /// Name of the system under test (reported in logs)
    api_name: String,

    /// Questions YAML file
    questions_file: PathBuf,

    /// Responses JSON produced by `ask`
    responses_file: PathBuf,

    /// RDF endpoint URL for the dataset
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Which file to save the results to (`-` for stdout)
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Languages of the questions, e.g. "['en', 'de']" or en,de
    #[arg(short, long, default_value = "en")]
    languages: LanguageList,

    /// Metric used for questions flagged RESULT_ORDER_MATTERS
    #[arg(short = 'm', long)]
    order_metric: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let args = Args::parse();
    let config = Config::load()?;
    output::check_output_free(&args.output)?;

    let order_metric = Measure::parse(
        args.order_metric
            .as_deref()
            .unwrap_or(&config.evaluate.order_metric),
    )?;
    let file = QuestionsFile::load(&args.questions_file)?;
    let responses = resultsets::load_responses(&args.responses_file)?;

    let endpoint = args.endpoint.unwrap_or_else(|| config.evaluate.sparql_endpoint.clone());
    let sparql = SparqlClient::new(
        &endpoint,
        Duration::from_secs(config.evaluate.sparql_timeout_secs),
    )?;

    log::info!(
        "Evaluating {} on {} questions ({}) against {}",
        args.api_name,
        file.questions.len(),
        args.languages,
        sparql.endpoint()
    );

    let truth = resultsets::ground_truth(&sparql, &file, &args.languages).await?;
    let predicted = resultsets::predicted(&sparql, &responses, &file, &args.languages).await?;

    let evaluation = Evaluation::new(
        config.measures()?,
        order_metric,
        args.languages.as_slice().to_vec(),
    );
    let results = evaluation.run(&predicted, &truth.sets, &truth.order_required)?;

    log::info!("Writing {} results to {}.", results.len(), output::describe(&args.output));
    output::write_json(&args.output, &results)?;

    Ok(())
}
