use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use unfurl::{
    Downloader, FetchOptions, LayoutOptions, LoneFile, NullSink, TracingSink, name_from_url,
};
use unfurl_fetch::{ClientConfig, DEFAULT_USER_AGENT, ProxyConfig, ReqwestClient};

mod tracker;

use tracker::DownloadTracker;

#[derive(Debug, Parser)]
#[command(name = "unfurl", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Cli {
    /// URL of a zip or tar archive
    url: String,

    /// Proxies as `scheme=url` pairs, e.g. `https=http://proxy:3128,http=http://proxy:3128`
    #[arg(long, env = "UNFURL_PROXY")]
    proxy: Option<ProxyConfig>,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Extra request header as `name: value`, may be repeated
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Overall request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Directory to create the scratch directory in
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// Put a lone extracted file inside the result directory instead of
    /// returning the file itself
    #[arg(long)]
    keep_lone_file_dir: bool,

    /// Print the name derived from the URL and exit without downloading
    #[arg(long)]
    name: bool,

    /// Hide the progress bar and diagnostics
    #[arg(long, short)]
    quiet: bool,

    /// Increase diagnostic output, repeat for more
    #[arg(long, short, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected `name: value`, got `{s}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in `{s}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env()
        .context("invalid RUST_LOG directive")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
    Ok(())
}

fn build_downloader(cli: &Cli) -> Result<Downloader<ReqwestClient>> {
    let config = ClientConfig::new()
        .user_agent(cli.user_agent.clone())
        .proxy(cli.proxy.clone())
        .timeout(cli.timeout.map(Duration::from_secs));
    tracing::debug!(?config, "building client");
    let client = ReqwestClient::with_config(&config).context("could not build the HTTP client")?;

    let options = cli
        .headers
        .iter()
        .fold(FetchOptions::new(), |options, (name, value)| {
            options.header(name.clone(), value.clone())
        });
    let lone_file = if cli.keep_lone_file_dir {
        LoneFile::IntoDirectory
    } else {
        LoneFile::AsTarget
    };

    let mut downloader = Downloader::new(client)
        .options(options)
        .layout(LayoutOptions::new().lone_file(lone_file));
    downloader = if cli.quiet {
        downloader.diagnostics(NullSink)
    } else {
        downloader.diagnostics(TracingSink)
    };
    if let Some(root) = &cli.scratch_dir {
        downloader = downloader.scratch_root(root.clone());
    }
    Ok(downloader)
}

fn run(cli: &Cli) -> Result<PathBuf> {
    let downloader = build_downloader(cli)?;

    let result = if cli.quiet {
        downloader.download_and_extract(&cli.url, None)
    } else {
        let mut tracker = DownloadTracker::new("Downloading");
        let mut report = |p: &unfurl::Progress| tracker.update(p);
        let result = downloader.download_and_extract(&cli.url, Some(&mut report));
        match &result {
            Ok(_) => tracker.finish("done"),
            Err(_) => tracker.abandon(),
        }
        result
    };

    result.map_err(|e| {
        let kind = e.kind();
        anyhow::Error::new(e).context(kind.to_string())
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.name {
        println!("{}", name_from_url(&cli.url));
        return ExitCode::SUCCESS;
    }
    if let Err(e) = setup_logging(&cli) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(target) => {
            println!("{}", target.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
