use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, Commands, RunArgs, SnapshotArgs};
use crate::config::AppConfig;
use crate::error::Result;
use crate::models::Territory;
use crate::processors::{build_daily_report, DailyReport};
use crate::readers::{
    CachedDirectory, FogosDirectory, IpmaSource, ObservationSource, StaticSource,
};
use crate::utils::filename::{report_csv_filename, report_image_filename, yesterday};
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvWriter, RenderJob, ReportPublisher, TemplateRenderer};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run(cli.run)) {
        Commands::Run(args) => run_report(&config, args, cli.quiet).await,
        Commands::Inspect(args) => inspect(&config, args, cli.quiet).await,
        Commands::CheckConfig => check_config(&config),
    }
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when running inside a test harness
    let installed = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    if installed.is_err() {
        warn!("tracing subscriber already initialised");
    }

    Ok(())
}

/// Territories requested on the command line, or every configured one
fn selected_territories(config: &AppConfig, requested: &[Territory]) -> Vec<Territory> {
    if requested.is_empty() {
        config.territories.iter().map(|t| t.territory).collect()
    } else {
        requested.to_vec()
    }
}

async fn daily_report(
    config: &AppConfig,
    args: &SnapshotArgs,
    date: NaiveDate,
    territories: &[Territory],
    quiet: bool,
) -> Result<DailyReport> {
    let source: Box<dyn ObservationSource> = match &args.snapshot_file {
        Some(path) => {
            info!(path = %path.display(), "reading snapshot from file");
            Box::new(StaticSource::from_file(path)?)
        }
        None => Box::new(IpmaSource::new(
            config.source.url.clone(),
            config.source_timeout(),
        )?),
    };
    let directory = CachedDirectory::new(FogosDirectory::new(
        config.directory.base_url.clone(),
        config.directory_timeout(),
    )?);

    let progress = ProgressReporter::new_spinner("Fetching observations...", quiet);
    let daily =
        build_daily_report(source.as_ref(), &directory, config, date, territories).await?;
    progress.finish_with_message(&format!(
        "Built {} territory reports ({} stations looked up)",
        daily.reports.len(),
        directory.cached_len()
    ));

    Ok(daily)
}

async fn run_report(config: &AppConfig, args: RunArgs, quiet: bool) -> Result<()> {
    let date = args.snapshot.date.unwrap_or_else(yesterday);
    let territories = selected_territories(config, &args.snapshot.territory);

    // Layout problems must surface before any network call
    let binders = config.binders()?;
    let renderer = if args.dry_run {
        None
    } else {
        Some(TemplateRenderer::from_font_file(
            &config.render.font_path,
            config.render.font_size,
        )?)
    };

    info!(%date, territories = territories.len(), "building daily report");
    let daily = daily_report(config, &args.snapshot, date, &territories, quiet).await?;
    info!("\n{}", daily.summary.summary());

    let output_dir: PathBuf = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.render.output_dir.clone());

    let mut jobs = Vec::with_capacity(daily.reports.len());
    for report in &daily.reports {
        let Some((_, binder)) = binders.iter().find(|(t, _)| *t == report.territory) else {
            warn!(territory = %report.territory, "territory is not configured, skipping");
            continue;
        };
        let Some(territory_config) = config.territory(report.territory) else {
            continue;
        };

        let instructions = binder.bind_report(report)?;
        jobs.push(RenderJob {
            territory: report.territory,
            template: territory_config.template.clone(),
            instructions,
            output: report_image_filename(&output_dir, report.territory, date),
        });
    }

    let Some(renderer) = renderer else {
        for job in &jobs {
            println!("{} -> {}", job.territory, job.output.display());
            for instruction in &job.instructions {
                println!("  {}", instruction);
            }
        }
        println!("Dry run - no images written");
        return Ok(());
    };

    let csv = if args.csv {
        let bytes = CsvWriter::new().to_bytes(&daily.reports)?;
        Some((report_csv_filename(&output_dir, date), bytes))
    } else {
        None
    };

    let progress = ProgressReporter::new_spinner("Rendering images...", quiet);
    let published = ReportPublisher::new(&renderer)
        .with_max_workers(args.max_workers)
        .publish(&output_dir, &jobs, csv)?;
    progress.finish_with_message(&format!("Published {} files", published.len()));

    for path in &published {
        println!("{}", path.display());
    }

    Ok(())
}

async fn inspect(config: &AppConfig, args: SnapshotArgs, quiet: bool) -> Result<()> {
    let date = args.date.unwrap_or_else(yesterday);
    let territories = selected_territories(config, &args.territory);

    let daily = daily_report(config, &args, date, &territories, quiet).await?;

    println!("{}", daily.summary.summary());
    for report in &daily.reports {
        println!("{}", report.summary());
    }

    Ok(())
}

fn check_config(config: &AppConfig) -> Result<()> {
    let binders = config.binders()?;

    for (territory, _) in &binders {
        if let Some(t) = config.territory(*territory) {
            if !t.template.exists() {
                warn!(%territory, template = %t.template.display(), "template not found");
            }
        }
    }
    if !config.render.font_path.exists() {
        warn!(font = %config.render.font_path.display(), "font not found");
    }

    println!(
        "✅ Configuration valid: {} territories, {} boards, amplitude {}",
        binders.len(),
        config.plan.boards.len(),
        if config.plan.amplitude { "on" } else { "off" }
    );

    Ok(())
}
