use std::{io, process::ExitCode, sync::OnceLock};

use application::{
    args::Report, view::ContractView, Args, Command, Config, Error, Service,
};
use common::Clock as _;
use serde::Serialize;
use service::{
    infra::{postgres, Postgres},
    query::{contract::FindOverlapping, report},
    Query as _,
};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() -> ExitCode {
    // Stdout is reserved for printed reports.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO)
                            >= *meta.level()
                })),
        )
        .init();

    let args = Args::parse().unwrap_or_else(|e| e.exit());

    match start(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            e.exit_code()
        }
    }
}

async fn start(args: Args) -> Result<(), Error> {
    let Args { config, command } = args;

    let Config {
        postgres,
        service,
        log,
    } = Config::new(config).map_err(|e| {
        Error::internal(&format!("failed to load `Config`: {e}"))
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let postgres_config = postgres.into();
    let mut postgres = Postgres::new(&postgres_config).map_err(|e| {
        Error::internal(&format!("failed to initialize `Postgres` client: {e}"))
    })?;

    match command {
        Command::Migrate => migrate(&mut postgres).await,
        Command::Report(report) => {
            let service = Service::new(service.into(), postgres);
            print_report(&service, report).await
        }
    }
}

/// Applies pending database migrations.
async fn migrate(postgres: &mut Postgres) -> Result<(), Error> {
    let report = migrations::runner()
        .run_async(postgres)
        .await
        .map_err(|e| {
            Error::internal(&format!("failed to run database migrations: {e}"))
        })?;
    log::info!(
        "applied {} database migrations",
        report.applied_migrations().len(),
    );
    Ok(())
}

/// Executes the provided [`Report`] and prints its output.
async fn print_report(service: &Service, report: Report) -> Result<(), Error> {
    match report {
        Report::Dashboard => {
            print(&service.execute(report::Dashboard).await?)
        }
        Report::Chart { period } => {
            print(&service.execute(report::Chart(period)).await?)
        }
        Report::Profitability { from, to } => print(
            &service
                .execute(report::Profitability { from, to })
                .await?,
        ),
        Report::Overlaps {
            unit,
            start,
            end,
            exclude,
        } => {
            let today = service.clock().today();
            let found = service
                .execute(FindOverlapping {
                    unit_id: unit,
                    start,
                    end,
                    exclude,
                })
                .await?;
            log::debug!("found {} overlapping contracts", found.len());
            print(
                &found
                    .iter()
                    .map(|c| ContractView::new(c, today))
                    .collect::<Vec<_>>(),
            )
        }
    }
}

/// Prints the provided `value` as pretty JSON to stdout.
fn print(value: &impl Serialize) -> Result<(), Error> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| Error::internal(&e))?;
    println!("{out}");
    Ok(())
}
