//! CLI parsing and orchestration. Parses args, streams handles to stdout, maps errors to exit codes.

use crate::fetcher::{
    ApiClient, ErrorKind, FetchError, FetchOptions, Fetcher, Transport, DEFAULT_PAGE_SIZE,
    DEFAULT_TIMEOUT_SECS, MAX_PAGE_SIZE,
};
use crate::model::Relation;
use clap::Parser;
use std::io::{self, Write};
use thiserror::Error;
use tracing::{debug, info};

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(reqwest::Error),

    #[error("Failed to write to standard output: {0}")]
    Output(io::Error),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::Fetch(e) => match e.kind() {
                ErrorKind::InvalidInput => 1,
                ErrorKind::Network => 2,
                ErrorKind::Parse => 3,
            },
            CliRunError::HttpClient(_) => 2,
            CliRunError::Output(_) => 4,
        }
    }
}

/// Exit code for a failed `Args::try_parse`: help and version requests succeed,
/// usage errors (missing `-u`, bad flag values) count as invalid input.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

#[derive(Parser, Debug)]
#[command(name = "mastofollows", version)]
#[command(
    about = "List the accounts a Mastodon account follows (or its followers), one handle per line"
)]
#[command(
    after_help = "Only public listings are supported; no login is attempted. Redirect stdout to keep a backup, e.g. mastofollows -u https://mastodon.online/@rozie > following.txt"
)]
pub struct Args {
    /// Account profile URL (https://host/@user) or handle (user@host).
    #[arg(short, long)]
    pub url: String,

    /// Which listing to fetch: following (default) or followers.
    #[arg(short, long, default_value = "following", value_parser = parse_relation)]
    pub relation: Relation,

    /// Accounts requested per page (1-80).
    #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = parse_page_size)]
    pub page: u32,

    /// Request timeout in seconds.
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = parse_timeout)]
    pub timeout: u64,

    /// HTTP User-Agent.
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Print handles exactly as the instance lists them (local accounts without @host).
    #[arg(long)]
    pub bare: bool,

    /// Debug logging on stderr and the full error chain on failure.
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_relation(s: &str) -> Result<Relation, String> {
    match s.to_lowercase().as_str() {
        "following" | "follows" => Ok(Relation::Following),
        "followers" => Ok(Relation::Followers),
        _ => Err(format!(
            "Invalid --relation value: '{}'. Use following or followers.",
            s
        )),
    }
}

fn parse_page_size(s: &str) -> Result<u32, String> {
    let n: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid --page: '{}' is not a number", s))?;
    if n == 0 || n > MAX_PAGE_SIZE {
        return Err(format!(
            "Invalid --page: {} is out of range (1-{})",
            n, MAX_PAGE_SIZE
        ));
    }
    Ok(n)
}

fn parse_timeout(s: &str) -> Result<u64, String> {
    let n: u64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid --timeout: '{}' is not a number of seconds", s))?;
    if n == 0 {
        return Err("Invalid --timeout: must be at least 1 second".to_string());
    }
    Ok(n)
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let mut builder = ApiClient::builder().timeout_secs(args.timeout);
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    let mut client = builder
        .build()
        .map_err(CliRunError::HttpClient)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_listing(args, &mut client, &mut out)
}

/// Fetch the listing through `transport` and write one handle per line to `out` as pages arrive.
///
/// A closed output (broken pipe) stops the run without error.
pub fn write_listing<T: Transport + ?Sized, W: Write>(
    args: &Args,
    transport: &mut T,
    out: &mut W,
) -> Result<(), CliRunError> {
    let options = FetchOptions {
        relation: args.relation,
        page_size: args.page,
    };
    let mut fetcher = Fetcher::new(transport, options);
    let mut stream = fetcher.fetch(&args.url)?;
    let host = stream.profile().host.clone();
    info!(
        acct = %stream.account().acct,
        relation = %args.relation,
        reported = stream.account().count_for(args.relation),
        "fetching listing"
    );

    let mut written: u64 = 0;
    for item in stream.by_ref() {
        let handle = item?;
        let handle = if args.bare {
            handle
        } else {
            handle.qualified(&host)
        };
        if let Err(e) = writeln!(out, "{}", handle) {
            return output_closed(e);
        }
        written += 1;
    }
    if let Err(e) = out.flush() {
        return output_closed(e);
    }
    info!(
        accounts = written,
        pages = stream.pages_fetched(),
        "listing complete"
    );
    Ok(())
}

fn output_closed(e: io::Error) -> Result<(), CliRunError> {
    if e.kind() == io::ErrorKind::BrokenPipe {
        debug!("stdout closed, stopping");
        Ok(())
    } else {
        Err(CliRunError::Output(e))
    }
}
