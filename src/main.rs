use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

// 导入库模块
use graphdb_path::config::Config;
use graphdb_path::core::error::{DBError, ToPublicError};
use graphdb_path::core::{Edge, EdgeDirection, OverClause, Value, VertexId};
use graphdb_path::query::executor::algorithms::{PathKind, PathQueryContext};
use graphdb_path::query::executor::{Executor, FindPathExecutor};
use graphdb_path::storage::MemoryStorage;
use graphdb_path::utils::logging;

#[derive(Parser)]
#[clap(version = "0.1.0", author = "GraphDB Contributors")]
enum Cli {
    /// Find paths between two vertex sets of a JSON graph
    Find(FindArgs),
}

#[derive(clap::Args, Debug)]
struct FindArgs {
    /// Graph file with `vertices` and `edges` arrays
    #[clap(long)]
    graph: PathBuf,
    /// Source vertex ids, comma separated
    #[clap(long, value_delimiter = ',', required = true)]
    from: Vec<String>,
    /// Destination vertex ids, comma separated
    #[clap(long, value_delimiter = ',', required = true)]
    to: Vec<String>,
    /// shortest | all | weighted
    #[clap(long, default_value = "shortest")]
    kind: PathKind,
    /// Maximum path length; defaults to `path.default_max_steps`
    #[clap(long)]
    steps: Option<usize>,
    /// Reject paths that visit a vertex twice
    #[clap(long)]
    no_loop: bool,
    /// Edge types to traverse, comma separated; all types when omitted
    #[clap(long, value_delimiter = ',')]
    over: Vec<i32>,
    /// out | in | both
    #[clap(long, default_value = "out")]
    direction: EdgeDirection,
    /// Edge property holding the cost for weighted queries
    #[clap(long)]
    cost_prop: Option<String>,
    #[clap(long)]
    limit: Option<usize>,
    /// Attach vertex properties to the vertices of every returned path
    #[clap(long)]
    with_prop: bool,
    /// Print rows as JSON instead of a table
    #[clap(long)]
    json: bool,
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// Mirror all log output to stderr
    #[clap(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli {
        Cli::Find(args) => find(args).await,
    };
    logging::shutdown();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<DBError>()
                .map(|db| db.to_public_error().code.category().to_exit_code())
                .unwrap_or(1);
            ExitCode::from(code.clamp(1, 255) as u8)
        }
    }
}

async fn find(args: FindArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    logging::init(&config.log, args.verbose)?;

    let query_id = uuid::Uuid::new_v4();
    log::info!("Query {} started: {:?}", query_id, args);

    let storage = MemoryStorage::load_json(&args.graph)
        .map_err(DBError::from)
        .with_context(|| format!("failed to load graph {}", args.graph.display()))?;

    let mut ctx = PathQueryContext::new(args.kind, args.steps.unwrap_or(config.path.default_max_steps))
        .with_no_loop(args.no_loop)
        .with_over(OverClause::new(args.over.clone(), args.direction))
        .with_limit(args.limit)
        .with_props(args.with_prop);
    if let Some(prop) = args.cost_prop.clone() {
        // 缺少或非数值的属性按 NaN 处理，执行时报告为无效代价
        ctx = ctx.with_cost_fn(Arc::new(move |edge: &Edge| {
            edge.get_property(&prop)
                .and_then(Value::as_f64)
                .unwrap_or(f64::NAN)
        }));
    }

    let sources = args.from.iter().map(|s| VertexId::parse(s)).collect();
    let destinations = args.to.iter().map(|s| VertexId::parse(s)).collect();
    let mut executor = FindPathExecutor::new(1, Arc::new(storage), sources, destinations, ctx)
        .with_config(&config.path);

    executor.open()?;
    let result = executor.execute().await;
    executor.close()?;
    let dataset = result?.into_dataset();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&dataset.to_json())?);
    } else {
        print!("{}", dataset.to_table_string());
    }
    log::info!(
        "Query {} finished: {}",
        query_id,
        executor.stats().to_formatted_string()
    );
    Ok(())
}
