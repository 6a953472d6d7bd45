use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use pddmat::assembler::{self, MatrixOutcome};
use pddmat::batch;
use pddmat::config::{DEFAULT_BATCH_SIZE, DEFAULT_EMBEDDING_DIMENSION, RunConfig};
use pddmat::diagram::BarsFolder;
use pddmat::distance::TopologicalDistance;
use pddmat::parameters::DistanceKind;
use pddmat::result_store::ResultStore;
use pddmat::worker;
use pddmat::PdError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pddmat")]
#[command(about = "Batched persistence-diagram distance matrices between languages")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RunArgs {
    /// Experiment name, embedded in every artifact
    #[arg(long, env = "PDDMAT_EXPERIMENT")]
    experiment: String,
    /// Number of words used to build the diagrams
    #[arg(long, env = "PDDMAT_WORDS")]
    words: u64,
    /// Languages (comma separated)
    #[arg(long, env = "PDDMAT_LANGUAGES", value_delimiter = ',', num_args = 1.., required = true)]
    languages: Vec<String>,
    /// Point-cloud metrics, e.g. euclidean,cosine
    #[arg(long, env = "PDDMAT_METRICS", value_delimiter = ',', num_args = 1.., required = true)]
    metrics: Vec<String>,
    /// Persistence diagram dimensions
    #[arg(long, env = "PDDMAT_DIMENSIONS", value_delimiter = ',', num_args = 1.., required = true)]
    dimensions: Vec<u32>,
    /// Distance kinds: bottleneck, sliced_wasserstein, persistence_image, bars_statistics
    #[arg(long, env = "PDDMAT_DISTANCES", value_delimiter = ',', num_args = 1.., required = true)]
    distances: Vec<DistanceKind>,
}

impl RunArgs {
    fn into_config(self) -> Result<RunConfig, PdError> {
        RunConfig::new(
            self.experiment,
            self.words,
            &self.languages,
            &self.metrics,
            &self.dimensions,
            &self.distances,
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute one batch of distances and write it as a single artifact
    Compute {
        #[command(flatten)]
        shared: RunArgs,
        #[arg(long, env = "PDDMAT_TASK_ID")]
        task_id: u64,
        #[arg(long, env = "PDDMAT_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: u64,
        #[arg(
            long,
            env = "PDDMAT_EMBEDDING_DIMENSION",
            default_value_t = DEFAULT_EMBEDDING_DIMENSION
        )]
        embedding_dimension: u32,
        /// Highest dimension in the bars files (defaults to the largest requested dimension)
        #[arg(long, env = "PDDMAT_MAXDIM")]
        maxdim: Option<u32>,
        #[arg(long, env = "PDDMAT_BARS_FOLDER", default_value = "data/bars")]
        bars_folder: PathBuf,
        #[arg(long, env = "PDDMAT_OUTPUT_FOLDER", default_value = "data/distances")]
        output_folder: PathBuf,
    },
    /// Merge all batch artifacts into distance matrices
    Merge {
        #[command(flatten)]
        shared: RunArgs,
        #[arg(long, env = "PDDMAT_DATA_FOLDER")]
        data_folder: PathBuf,
        #[arg(long, env = "PDDMAT_OUTPUT_FOLDER")]
        output_folder: PathBuf,
    },
    /// Print the size of the job space and how many tasks cover it
    Plan {
        #[command(flatten)]
        shared: RunArgs,
        #[arg(long, env = "PDDMAT_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: u64,
    },
}

fn run(cli: Cli) -> Result<ExitCode, PdError> {
    match cli.command {
        Commands::Compute {
            shared,
            task_id,
            batch_size,
            embedding_dimension,
            maxdim,
            bars_folder,
            output_folder,
        } => {
            let config = shared.into_config()?.with_embedding_dimension(embedding_dimension);
            config.check_computable()?;
            let maxdim = maxdim.unwrap_or_else(|| config.parameters.max_dimension());
            let mut source =
                BarsFolder::new(bars_folder, embedding_dimension, config.word_count, maxdim);
            let store = ResultStore::new(output_folder, config.experiment_name.clone());
            let report = worker::run_batch(
                &config,
                task_id,
                batch_size,
                &mut source,
                &TopologicalDistance::default(),
                &store,
            )?;
            info!(
                task_id = report.task_id,
                jobs = report.records,
                seconds = report.elapsed.as_secs_f64(),
                "worker finished"
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Merge {
            shared,
            data_folder,
            output_folder,
        } => {
            let config = shared.into_config()?;
            let summary = assembler::merge(
                &config.experiment_name,
                config.word_count,
                config.parameters,
                config.languages,
                &data_folder,
                &output_folder,
            )?;
            for (tuple, outcome) in &summary.outcomes {
                match outcome {
                    MatrixOutcome::Written { path } => println!(
                        "Matrix for {} successfully constructed. Saved to > {}",
                        tuple,
                        path.display()
                    ),
                    MatrixOutcome::Rejected { missing, conflicts } => println!(
                        "Matrix for {} HAS INCOMPLETE DATA! \
                         Missing {} values, {} conflicting values.",
                        tuple, missing, conflicts
                    ),
                }
            }
            info!(%summary, "merge finished");
            Ok(if summary.all_written() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Plan { shared, batch_size } => {
            let config = shared.into_config()?;
            let total = config.job_indexer()?.total_jobs();
            println!("parameter tuples: {}", config.parameters.len());
            println!("languages: {}", config.languages.len());
            println!("total jobs: {}", total);
            let tasks = batch::task_count(batch_size, total)?;
            println!("tasks (batch size {}): {}", batch_size, tasks);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    dotenv().ok();
    pddmat::init_tracing("pddmat");
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
