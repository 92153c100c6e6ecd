//! [`Args`] definitions.

use clap::{Parser, Subcommand};
use common::Date;
use service::{
    domain::{contract, unit},
    query::report::chart,
};

/// Operator tool of the storage-unit rental system.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Action to perform.
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

/// Action of the [`Args`].
#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Applies pending database migrations.
    Migrate,

    /// Prints a [`Report`] as JSON.
    #[command(flatten)]
    Report(Report),
}

/// Read-only report printed by the [`Command`].
#[derive(Clone, Debug, Subcommand)]
pub enum Report {
    /// Prints a snapshot of the whole business as of today.
    Dashboard,

    /// Prints incomes against expenses over a period ending today.
    Chart {
        /// Charted period: `1m`, `3m`, `6m` or `1y`.
        period: chart::Period,
    },

    /// Prints per-premises profitability over a window of days.
    Profitability {
        /// First day of the window (`YYYY-MM-DD`).
        #[arg(long)]
        from: Option<Date>,

        /// Last day of the window (`YYYY-MM-DD`).
        #[arg(long)]
        to: Option<Date>,
    },

    /// Lists contracts of a unit colliding with the provided dates.
    Overlaps {
        /// ID of the unit to check.
        #[arg(long)]
        unit: unit::Id,

        /// First day to check (`YYYY-MM-DD`).
        #[arg(long)]
        start: Date,

        /// Last day to check (`YYYY-MM-DD`), open-ended if omitted.
        #[arg(long)]
        end: Option<Date>,

        /// ID of the contract to ignore.
        #[arg(long)]
        exclude: Option<contract::Id>,
    },
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::{chart, Args, Command, Report};

    #[test]
    fn defaults_config_path() {
        let args = Args::try_parse_from(["app", "dashboard"]).unwrap();

        assert_eq!(args.config, "config.toml");
        assert!(matches!(args.command, Command::Report(Report::Dashboard)));
    }

    #[test]
    fn parses_chart_period() {
        let args = Args::try_parse_from(["app", "chart", "6m"]).unwrap();

        assert!(matches!(
            args.command,
            Command::Report(Report::Chart {
                period: chart::Period::SixMonths,
            }),
        ));
        assert!(Args::try_parse_from(["app", "chart", "2w"]).is_err());
    }

    #[test]
    fn parses_overlaps() {
        let args = Args::try_parse_from([
            "app",
            "--config",
            "prod.toml",
            "overlaps",
            "--unit",
            "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "--start",
            "2024-06-01",
        ])
        .unwrap();

        assert_eq!(args.config, "prod.toml");
        let Command::Report(Report::Overlaps {
            start, end, exclude, ..
        }) = args.command
        else {
            panic!("expected `overlaps` command");
        };
        assert_eq!(start.to_string(), "2024-06-01");
        assert!(end.is_none());
        assert!(exclude.is_none());
    }

    #[test]
    fn parses_migrate() {
        let args = Args::try_parse_from(["app", "migrate"]).unwrap();

        assert!(matches!(args.command, Command::Migrate));
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(Args::try_parse_from([
            "app",
            "profitability",
            "--from",
            "01.06.2024",
        ])
        .is_err());
    }
}
