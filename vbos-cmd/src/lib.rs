//! Command implementations for the VBOS CLI.
//!
//! Provides subcommands for signing in, browsing the dataset catalog,
//! exporting dataset records, and deriving the dashboard's statistics from
//! a shared view link.

use clap::Subcommand;
use log::{debug, info, warn};
use std::io::Write;
use std::path::PathBuf;
use vbos_core::api::{CancellationToken, HttpClient, SessionRestore, Transport};

pub mod auth;
pub mod catalog;
pub mod config;
pub mod data;
pub mod export;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
use export::open_output;
use view::{tabular_dataset, FilterArgs, KindArg, ViewArgs};

#[derive(Subcommand)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "VBOS_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Check the stored session and show the signed-in user
    Whoami {
        /// Re-fetch the profile even if one is cached
        #[arg(long)]
        refresh: bool,
    },

    /// List dataset clusters
    Clusters,

    /// List the datasets of a cluster, grouped by type
    Datasets {
        #[arg(short, long)]
        cluster: String,
    },

    /// Export every record of a dataset as JSON
    Fetch {
        #[arg(short, long, value_enum)]
        kind: KindArg,

        #[arg(long)]
        id: u64,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Per-region totals for a view's year, as drawn on the choropleth
    Stats {
        /// Tabular dataset (defaults to the view's tabular layer)
        #[arg(long)]
        id: Option<u64>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Attribute totals per period as CSV
    Series {
        #[arg(long)]
        id: Option<u64>,

        /// Always use annual periods, even when the data varies by month
        #[arg(long)]
        annual: bool,

        #[command(flatten)]
        view: ViewArgs,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Attribute totals per place as CSV
    Places {
        #[arg(long)]
        id: Option<u64>,

        #[command(flatten)]
        view: ViewArgs,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a shareable dashboard query string
    Link {
        #[command(flatten)]
        view: ViewArgs,
    },
}

/// Token cancelled on Ctrl-C, so long paginated fetches stop between pages.
fn interrupt_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted; cancelling outstanding requests");
            on_signal.cancel();
        }
    });
    cancel
}

pub async fn run(config: Config, command: Command) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    match command {
        Command::Link { view } => view::run_link(&view, &mut stdout)?,
        command => {
            let client = config.client()?;
            run_with(&client, command, &interrupt_token(), &mut stdout).await?;
        }
    }
    stdout.flush()?;
    Ok(())
}

/// Run `command` against `client`. Except for signing in or out, the
/// stored session is checked first so a revoked token is dropped before
/// any data request carries it.
pub async fn run_with<T: Transport>(
    client: &HttpClient<T>,
    command: Command,
    cancel: &CancellationToken,
    stdout: &mut impl Write,
) -> anyhow::Result<()> {
    let restored = match &command {
        Command::Login { .. } | Command::Logout | Command::Link { .. } => None,
        _ => Some(client.restore_session().await?),
    };
    match &restored {
        Some(SessionRestore::Cleared) => info!("stored session was rejected; continuing signed out"),
        Some(SessionRestore::Validated(user)) => debug!("session restored for {}", user.username),
        _ => {}
    }
    match command {
        Command::Login { username, password } => {
            auth::run_login(client, &username, &password, stdout).await
        }
        Command::Logout => auth::run_logout(client, stdout),
        Command::Whoami { refresh } => {
            let restored = restored.unwrap_or(SessionRestore::Anonymous);
            auth::run_whoami(client, restored, refresh, stdout).await
        }
        Command::Clusters => catalog::run_clusters(client, cancel, stdout).await,
        Command::Datasets { cluster } => catalog::run_datasets(client, &cluster, stdout).await,
        Command::Fetch {
            kind,
            id,
            filters,
            output,
        } => {
            let out = open_output(output.as_deref())?;
            let filters = filters.to_filters();
            data::run_fetch(client, kind.into(), id, &filters, cancel, out).await
        }
        Command::Stats { id, view } => {
            let state = view.state()?;
            let id = tabular_dataset(id, &state)?;
            data::run_stats(client, &state, id, cancel, stdout).await
        }
        Command::Series {
            id,
            annual,
            view,
            output,
        } => {
            let state = view.state()?;
            let id = tabular_dataset(id, &state)?;
            let out = open_output(output.as_deref())?;
            data::run_series(client, &state, id, !annual, cancel, out).await
        }
        Command::Places { id, view, output } => {
            let state = view.state()?;
            let id = tabular_dataset(id, &state)?;
            let out = open_output(output.as_deref())?;
            data::run_places(client, &state, id, cancel, out).await
        }
        Command::Link { view } => view::run_link(&view, stdout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;
    use clap::Parser;
    use vbos_core::Session;

    const ROWS: &str = r#"{"count": 1, "next": null, "previous": null, "results": [
        {"date": "2020-01-01", "province": "Torba", "attribute": "pop", "value": 10}
    ]}"#;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        config: Config,

        #[command(subcommand)]
        command: Command,
    }

    #[test]
    fn test_fetch_arguments() {
        let cli = Cli::try_parse_from([
            "vbos", "fetch", "--kind", "tabular", "--id", "12", "--province", "Torba",
            "--metadata", "sex=female", "--metadata", "age=5", "--api-host", "http://api.test",
        ])
        .unwrap();
        assert_eq!(cli.config.api_host, "http://api.test");
        let Command::Fetch { kind, id, filters, output } = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!((kind, id, output), (KindArg::Tabular, 12, None));
        assert_eq!(
            filters.to_filters().to_query_string(),
            "province=Torba&metadata=sex%3Dfemale%2Cage%3D5"
        );
    }

    #[test]
    fn test_view_arguments_accept_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "vbos", "link", "--link", "?year=2020", "--lng", "168.2", "--lat", "-15.5",
        ])
        .unwrap();
        let Command::Link { view } = cli.command else {
            panic!("expected link");
        };
        assert_eq!(view.lat, Some(-15.5));
        assert_eq!(view.link.as_deref(), Some("?year=2020"));
    }

    #[test]
    fn test_stats_id_is_optional() {
        let cli = Cli::try_parse_from(["vbos", "stats", "--link", "?layers=t4"]).unwrap();
        assert!(matches!(cli.command, Command::Stats { id: None, .. }));
        assert!(Cli::try_parse_from(["vbos", "fetch", "--kind", "raster", "--id", "1"]).is_err());
    }

    fn token_only() -> Session {
        Session {
            token: Some("t".into()),
            user: None,
        }
    }

    fn command(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("vbos").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn test_series_defaults_to_monthly_periods() {
        assert!(matches!(command(&["series", "--id", "7"]), Command::Series { annual: false, .. }));
        assert!(matches!(
            command(&["series", "--id", "7", "--annual"]),
            Command::Series { annual: true, .. }
        ));
    }

    #[tokio::test]
    async fn test_rejected_token_is_dropped_before_data_requests() {
        let api = FakeApi::default()
            .route("/api/v1/users/me/", 401, "{}")
            .route("/api/v1/tabular/7/data/?page_size=2000", 200, ROWS);
        let client = api.client(token_only());
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("series.csv");
        let series = command(&["series", "--id", "7", "--output", csv.to_str().unwrap()]);
        run_with(&client, series, &CancellationToken::new(), &mut Vec::new())
            .await
            .unwrap();
        assert_eq!(
            api.paths(),
            vec!["/api/v1/users/me/", "/api/v1/tabular/7/data/?page_size=2000"]
        );
        assert_eq!(client.session().snapshot(), Session::default());
        assert_eq!(std::fs::read_to_string(csv).unwrap(), "period,pop\n2020,10\n");
    }

    #[tokio::test]
    async fn test_unreachable_profile_keeps_token() {
        let api = FakeApi::default().route(
            "/api/v1/cluster/",
            200,
            r#"{"count": 0, "next": null, "previous": null, "results": []}"#,
        );
        let client = api.client(token_only());
        run_with(&client, Command::Clusters, &CancellationToken::new(), &mut Vec::new())
            .await
            .unwrap();
        assert_eq!(api.paths(), vec!["/api/v1/users/me/", "/api/v1/cluster/"]);
        assert_eq!(client.session().token().as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn test_logout_skips_session_check() {
        let api = FakeApi::default();
        let client = api.client(token_only());
        let mut out = Vec::new();
        run_with(&client, Command::Logout, &CancellationToken::new(), &mut out)
            .await
            .unwrap();
        assert!(api.paths().is_empty());
        assert_eq!(String::from_utf8(out).unwrap(), "Signed out\n");
    }

    #[tokio::test]
    async fn test_whoami_reports_start_up_check() {
        let api = FakeApi::default().route(
            "/api/v1/users/me/",
            200,
            r#"{"id": 4, "username": "analyst", "first_name": "", "last_name": ""}"#,
        );
        let client = api.client(token_only());
        let mut out = Vec::new();
        run_with(
            &client,
            Command::Whoami { refresh: true },
            &CancellationToken::new(),
            &mut out,
        )
        .await
        .unwrap();
        assert_eq!(api.paths().len(), 1);
        assert!(String::from_utf8(out).unwrap().contains("(analyst)"));
    }
}
