//! repo-audit: audit a GitHub repository against a task checklist with an LLM

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
