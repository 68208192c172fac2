use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "mathdrill")]
#[command(about = "Solve math exercise fixtures deterministically")]
#[command(version)]
struct Cli {
    /// Fixture file to run
    fixture: PathBuf,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate the fixture without solving
    #[arg(long)]
    check: bool,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> mathdrill::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
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

    let fixture = mathdrill::Fixture::load(&cli.fixture)?;

    if cli.check {
        println!("Fixture valid: {}", fixture.name);
        println!("  Exercises: {}", fixture.exercises.len());
        let expected = fixture
            .exercises
            .iter()
            .filter(|e| e.expect.is_some())
            .count();
        if expected > 0 {
            println!("  With expectations: {}", expected);
        }
        return Ok(());
    }

    println!("Running: {}", fixture.name);

    let registry = mathdrill::SolverRegistry::with_default_solvers();
    let report = mathdrill::run_fixture(&registry, &fixture);

    // Print result
    println!();
    if report.success {
        println!("✓ Success");
    } else {
        println!("✗ Failed");
        for failure in &report.failures {
            println!("  {}", failure);
        }
    }
    println!("  Solved: {}/{}", report.solved, report.total);
    println!("  Duration: {}ms", report.duration_ms);

    if !report.success {
        std::process::exit(1);
    }

    Ok(())
}
