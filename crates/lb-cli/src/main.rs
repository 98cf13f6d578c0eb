use clap::Parser;

mod cli;
mod commands;
mod context;
mod names;
mod progress;
mod summary;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("npmlb error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;
    let flags = cli.global_flags();

    match cli.command {
        cli::Commands::Schema(args) => commands::schema::handle(&args),
        cli::Commands::Status(args) => {
            let ctx = context::AppContext::init(&cli::RunArgs::default()).await?;
            commands::status::handle(&args, &ctx).await
        }
        cli::Commands::Ingest(args) => {
            let ctx = context::AppContext::init(&args.run).await?;
            commands::run::ingest(&args.input, &ctx, &flags).await
        }
        cli::Commands::Refresh(args) => {
            let ctx = context::AppContext::init(&args).await?;
            commands::run::refresh(&ctx, &flags).await
        }
        cli::Commands::Sync(args) => {
            let ctx = context::AppContext::init(&args.run).await?;
            commands::run::sync(&args.input, &ctx, &flags).await
        }
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("NPMLB_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
