use clap::Parser;
use market_snapshot::capture::ArtifactPaths;
use market_snapshot::{BestEffort, Config, Params};
use std::path::PathBuf;
use tracing::{error, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "market-snapshot")]
#[command(about = "Daily market summary and S&P 500 heatmap capture")]
#[command(version)]
struct Cli {
    /// Config file (defaults reproduce the daily job)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show the browser window (overrides config)
    #[arg(long)]
    headed: bool,

    /// Set a parameter (can be used multiple times)
    #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Pipeline output file the message is appended to
    #[arg(long, env = "GITHUB_OUTPUT", value_name = "PATH")]
    github_output: Option<PathBuf>,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate config without running
    #[arg(long)]
    check: bool,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(cli: &Cli) {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
        return;
    }

    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn print_plan(config: &Config) -> market_snapshot::Result<()> {
    let date = config.output.report_date()?;
    let paths = ArtifactPaths::resolve(&config.output, &date);
    println!("Config valid: {}", config.name);
    println!("  Sheet: {}", config.sheet.export_url());
    println!("  Target: {}", config.capture.url);
    println!("  Attempts: {}", config.capture.navigation.attempts);
    println!("  Selectors: {}", config.capture.targets.join(", "));
    println!("  Dated image: {}", paths.dated.display());
    println!("  Latest image: {}", paths.latest.display());
    Ok(())
}

#[tokio::main]
async fn main() -> market_snapshot::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let params = Params::from_args(&cli.params)?;
    let mut config = Config::resolve(cli.config.as_deref(), &params)?;

    if cli.check {
        return print_plan(&config);
    }

    if cli.headed {
        config.capture.browser.headless = false;
    }

    println!("Running: {}", config.name);

    let report = match market_snapshot::runner::run(&config, cli.github_output.as_deref()).await {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            println!();
            println!("✗ Failed");
            println!("  Error: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("{}", report.message);
    println!();
    println!("✓ Success ({})", report.date);
    println!("  Heatmap: {}", report.capture.artifacts.dated.display());
    match &report.capture.artifacts.latest {
        BestEffort::Done(path) => println!("  Latest: {}", path.display()),
        BestEffort::Ignored(i) => println!("  Latest: {}", i),
    }
    println!("  Capture: {}", report.capture.kind);
    println!("  Navigation: {:?}", report.capture.navigation);
    if report.output_written {
        println!("  Output: written to pipeline");
    }
    println!("  Duration: {}ms", report.duration_ms);

    Ok(())
}
