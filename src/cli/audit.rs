//! Audit command implementation

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::utils::{read_tasks, ConfigArgs};
use repo_audit::audit::{Auditor, StepOutcome, StepReport};
use repo_audit::domain::{AuditRequest, Task, TaskStatus};

#[derive(Args)]
pub struct AuditArgs {
    /// GitHub repository URL to audit
    #[arg(short = 'r', long, value_name = "URL")]
    pub repo: String,

    /// JSON file holding the initial task array
    #[arg(short = 't', long, value_name = "FILE")]
    pub tasks: PathBuf,

    /// Write the final task array here instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run(args: AuditArgs) -> Result<()> {
    let start_time = Instant::now();
    let tasks = read_tasks(&args.tasks)?;
    let config = args.config.resolve()?;
    let auditor = Auditor::new(config);

    let request = AuditRequest { repository_identifier: args.repo.clone(), tasks };

    let progress = ProgressBar::new_spinner();
    progress.enable_steady_tick(Duration::from_millis(120));
    progress.set_message(format!("Fetching {}", args.repo));

    let bar_style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
    )?
    .progress_chars("#>-");

    let mut failed_steps = 0usize;
    let result = auditor.run_with_observer(&request, |report: &StepReport| {
        if progress.length().is_none() {
            progress.set_style(bar_style.clone());
            progress.set_length(report.total as u64);
        }
        match &report.outcome {
            StepOutcome::Replaced { task_count } => {
                progress.set_message(format!("chunk {} -> {} tasks", report.index + 1, task_count));
            }
            StepOutcome::ParseFailed(reason) | StepOutcome::CallFailed(reason) => {
                failed_steps += 1;
                progress.println(format!(
                    "{} chunk {}/{} kept previous results: {}",
                    style("warning:").yellow().bold(),
                    report.index + 1,
                    report.total,
                    reason
                ));
            }
        }
        progress.inc(1);
    });
    progress.finish_and_clear();

    let final_tasks = result.with_context(|| format!("Audit of {} failed", args.repo))?;

    let json = serde_json::to_string_pretty(&final_tasks)?;
    match &args.output {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
        }
        None => println!("{json}"),
    }

    print_summary(&final_tasks, failed_steps, start_time.elapsed());
    if let Some(path) = &args.output {
        eprintln!("Wrote {}", style(path.display()).bold());
    }
    Ok(())
}

fn print_summary(tasks: &[Task], failed_steps: usize, elapsed: Duration) {
    let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();

    eprintln!("{}", style("Audit summary").bold().underlined());
    eprintln!("  {} {}", style("implemented:").green(), count(TaskStatus::Implemented));
    eprintln!(
        "  {} {}",
        style("partially implemented:").yellow(),
        count(TaskStatus::PartiallyImplemented)
    );
    eprintln!("  {} {}", style("not implemented:").red(), count(TaskStatus::NotImplemented));
    if failed_steps > 0 {
        eprintln!("  {} {}", style("chunks without an update:").dim(), failed_steps);
    }
    eprintln!("  Completed in {:.1}s", elapsed.as_secs_f64());
}
