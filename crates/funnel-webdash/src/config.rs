//! Command-line and environment configuration for the dashboard host.

use std::net::SocketAddr;

use anyhow::{bail, Context, Result};
use clap::Parser;
use funnel_webdash_core::{FilterState, TagAssignmentError, TagFilter, TaskState, DEFAULT_PAGE_SIZE};
use url::Url;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_TES_SERVER: &str = "http://localhost:8000";

fn parse_tag_assignment(raw: &str) -> Result<TagFilter, TagAssignmentError> {
    TagFilter::parse_assignment(raw)
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "funnel-webdash",
    about = "Serve the Funnel task and node dashboard",
    version
)]
pub struct Cli {
    #[arg(
        long,
        env = "FUNNEL_WEBDASH_BIND",
        default_value = DEFAULT_BIND,
        help = "Socket address the dashboard listens on"
    )]
    pub bind: String,

    #[arg(
        short = 'S',
        long = "server",
        env = "FUNNEL_SERVER",
        default_value = DEFAULT_TES_SERVER,
        help = "Base URL of the Funnel task server the views query"
    )]
    pub server: String,

    #[arg(
        short = 'p',
        long,
        default_value_t = DEFAULT_PAGE_SIZE,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Task list page size"
    )]
    pub page_size: u32,

    #[arg(long, default_value = "", help = "Initial task state filter")]
    pub state: String,

    #[arg(
        long = "tag",
        value_name = "KEY=VALUE",
        value_parser = parse_tag_assignment,
        help = "Initial tag filter. May be repeated"
    )]
    pub tags: Vec<TagFilter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunnelWebdashConfig {
    pub bind: SocketAddr,
    pub tes_server: Url,
    pub page_size: u32,
    pub initial_filters: FilterState,
}

impl FunnelWebdashConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let bind = cli
            .bind
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid --bind '{}'", cli.bind))?;
        let tes_server = Url::parse(&cli.server)
            .with_context(|| format!("invalid --server '{}'", cli.server))?;
        if !matches!(tes_server.scheme(), "http" | "https") {
            bail!(
                "--server must be an http or https URL, got '{}'",
                cli.server
            );
        }

        // Known states are normalized to their wire token; anything else is
        // forwarded as typed.
        let state_filter = TaskState::parse(&cli.state)
            .map(|state| state.as_str().to_string())
            .unwrap_or_else(|| cli.state.trim().to_string());

        Ok(Self {
            bind,
            tes_server,
            page_size: cli.page_size,
            initial_filters: FilterState::seeded(state_filter, cli.tags),
        })
    }
}
