//! HTTP host for the Funnel web dashboard.
//!
//! Owns one [`funnel_webdash_core::DashboardSession`], serves the SSR shell
//! for every routed path and applies filter and drawer edits posted by the
//! shell's forms.

mod bootstrap;
pub mod config;
pub mod server;

pub use bootstrap::init_tracing;
pub use config::{Cli, FunnelWebdashConfig, DEFAULT_BIND, DEFAULT_TES_SERVER};
pub use server::{build_funnel_webdash_router, run_funnel_webdash_server, FunnelWebdashServerState};
