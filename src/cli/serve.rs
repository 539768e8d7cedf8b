//! Serve command: expose audits over HTTP

use anyhow::Result;
use clap::Args;
use console::style;

use super::utils::ConfigArgs;
use repo_audit::audit::Auditor;
use repo_audit::server;

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:8080")]
    pub addr: String,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run(args: ServeArgs) -> Result<()> {
    let auditor = Auditor::new(args.config.resolve()?);
    if auditor.config().api_key.is_none() {
        tracing::warn!("No API key configured; audits of non-empty repositories will fail");
    }
    eprintln!("Listening on {}", style(format!("http://{}", args.addr)).bold());
    server::serve(&args.addr, &auditor)
}
