use clap::{Parser, Subcommand};
use imdbench::{
    Session, benchmark,
    config::Config,
    import,
    queries::{self, QueryId},
    report, schema,
    source::FieldMap,
};

#[derive(Parser)]
#[command(name = "imdbench", version, about = "Load the IMDb subset and time its analytic queries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the nine tables if they do not exist yet.
    Schema,
    /// Import every export file from CSV_DIR.
    Import,
    /// Time the nine queries before and after creating the lookup indexes.
    Bench {
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
        /// Only time the store as it is, without creating or dropping indexes.
        #[arg(long)]
        no_index_only: bool,
    },
    /// Print the first rows of every query.
    Sample {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Schema, import and benchmark in one go.
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,imdbench=debug,sqlx=warn".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let session = Session::open(&config.database_url).await?;

    match cli.command {
        Command::Schema => {
            schema::ensure_schema(&session).await?;
            let tables = schema::existing_tables(&session).await?;
            println!("tables: {}", tables.join(", "));
        },
        Command::Import => {
            schema::ensure_schema(&session).await?;
            run_import(&session, &config).await?;
        },
        Command::Bench { json, no_index_only } => {
            if no_index_only {
                let pass =
                    benchmark::run_unindexed(&session, &QueryId::ALL, &config.query_args).await?;
                print!("{}", report::single_pass_table(&pass));
            } else {
                run_bench(&session, &config, json).await?;
            }
        },
        Command::Sample { limit } => {
            for id in QueryId::ALL {
                println!("--- {id} {} ---", id.label());
                for row in queries::preview(&session, id, &config.query_args, limit).await? {
                    println!("{row}");
                }
            }
        },
        Command::Run => {
            schema::ensure_schema(&session).await?;
            run_import(&session, &config).await?;
            run_bench(&session, &config, false).await?;
        },
    }

    session.close().await?;
    Ok(())
}

async fn run_import(session: &Session, config: &Config) -> anyhow::Result<()> {
    tracing::info!(dir = %config.csv_dir.display(), "import start");
    let outcomes =
        import::import_dataset(session, &config.csv_dir, config.csv_delimiter, &FieldMap::imdb())
            .await?;
    print!("{}", report::import_summary(&outcomes));
    Ok(())
}

async fn run_bench(session: &Session, config: &Config, json: bool) -> anyhow::Result<()> {
    let result = benchmark::run_benchmark(session, &QueryId::ALL, &config.query_args).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", report::benchmark_table(&result));
    }
    Ok(())
}
