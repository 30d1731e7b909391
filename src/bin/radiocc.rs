use camino::Utf8PathBuf;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use radiocc::alignment::align;
use radiocc::config::RadioccConfig;
use radiocc::coverage::{CoverageMatcher, OccultationWindow};
use radiocc::logging::init_logging;
use radiocc::report::{
    aligned_table, covered_table, occultations_table, passes_table, read_csv, scatter_points,
    stats_table, write_csv, OccultationRow, ALIGNED_FILE, COVERED_CSV, COVERED_FILE,
    OCCULTATIONS_FILE, PASSES_FILE, SCATTER_CSV, SPICE_CSV,
};
use radiocc::RadioccError;

#[derive(Parser, Debug)]
#[command(
    name = "radiocc",
    version,
    about = "Radio occultation detection and ground station coverage"
)]
struct Cli {
    /// TOML configuration file, built-in defaults when omitted
    #[arg(short, long)]
    config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Fetch passes and occultations from the catalog and keep the fully covered occultations
    Coverage,
    /// Detect occultations from the ephemeris kernels (needs the `spice` feature)
    Scan,
    /// Match detected occultations against the covered ones
    Align,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RadioccConfig::from_file(path),
        None => Ok(RadioccConfig::default()),
    };
    let config = match config {
        Ok(c) => c,
        Err(err) => {
            eprintln!("radiocc: {err}");
            std::process::exit(2);
        }
    };
    init_logging(&config.output.log_level);

    let outcome = match cli.command {
        Command::Coverage => coverage(&config).await,
        Command::Scan => scan(&config).await,
        Command::Align => align_events(&config),
    };
    if let Err(err) = outcome {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn coverage(config: &RadioccConfig) -> Result<(), RadioccError> {
    let client = config.catalog.client()?;
    let (start, end) = config.coverage.range()?;
    let params = config.coverage.params()?;

    let (passes, windows) = tokio::try_join!(
        client.fetch_passes(&start, &end),
        client.fetch_occultations(&start, &end)
    )?;
    let report = CoverageMatcher::new(passes, &params).evaluate(windows);

    let now = Utc::now();
    let dir = &config.output.dir;
    let passes = passes_table(&report.accepted_passes);
    let covered = covered_table(&report.covered);
    println!("{}", passes.render_terminal());
    println!("{}", covered.render_terminal());

    passes.write_to(dir, PASSES_FILE, &now)?;
    occultations_table(&report.windows).write_to(dir, OCCULTATIONS_FILE, &now)?;
    covered.write_to(dir, COVERED_FILE, &now)?;
    write_csv(&dir.join(COVERED_CSV), &report.covered)?;

    info!(
        passes = report.accepted_passes.len(),
        occultations = report.windows.len(),
        covered = report.covered.len(),
        "coverage run complete"
    );
    Ok(())
}

#[cfg(feature = "spice")]
async fn scan(config: &RadioccConfig) -> Result<(), RadioccError> {
    use radiocc::crossing::OccultationScanner;
    use radiocc::ephemeris::spice::SpiceProvider;
    use radiocc::report::{wide_table, SPICE_FILE};

    let kernels = config.scan.kernels()?;
    let params = config.scan.params()?;
    let geometry = config.scan.geometry();
    let observer = config.scan.observer.clone();

    let started = std::time::Instant::now();
    let occultations = tokio::task::spawn_blocking(move || {
        OccultationScanner::new(SpiceProvider::new, kernels, geometry).detect(&observer, &params)
    })
    .await
    .map_err(|e| RadioccError::WorkerPool(e.to_string()))??;

    let rows: Vec<OccultationRow> = occultations.pairs().iter().map(OccultationRow::from).collect();

    let dir = &config.output.dir;
    wide_table(&rows).write_to(dir, SPICE_FILE, &Utc::now())?;
    write_csv(&dir.join(SPICE_CSV), &rows)?;

    info!(
        occultations = rows.len(),
        elapsed_s = started.elapsed().as_secs_f64(),
        "scan complete"
    );
    Ok(())
}

#[cfg(not(feature = "spice"))]
async fn scan(_config: &RadioccConfig) -> Result<(), RadioccError> {
    Err(RadioccError::ConfigError(
        "this build has no ephemeris backend, rebuild with `--features spice`".into(),
    ))
}

fn align_events(config: &RadioccConfig) -> Result<(), RadioccError> {
    let dir = &config.output.dir;
    let derived: Vec<OccultationRow> = read_csv(&dir.join(SPICE_CSV))?;
    let reported: Vec<OccultationWindow> = read_csv(&dir.join(COVERED_CSV))?;
    let scope = config.alignment.scope()?;

    let aligned = align(&derived, &reported, config.alignment.tolerance()?, &scope);
    info!("{}", aligned.stats);
    println!("{}", stats_table(&aligned.stats));

    aligned_table(&aligned.records).write_to(dir, ALIGNED_FILE, &Utc::now())?;

    let in_scope: Vec<OccultationRow> = derived
        .into_iter()
        .filter(|r| scope.contains(r.ingress_utc))
        .collect();
    write_csv(&dir.join(SCATTER_CSV), &scatter_points(&in_scope, &aligned.records))?;
    Ok(())
}
