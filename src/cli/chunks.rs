//! Chunks command: preview how a repository would be packed, without calling the model

use anyhow::Result;
use clap::Args;
use console::style;

use super::utils::ConfigArgs;
use repo_audit::audit::Auditor;
use repo_audit::utils::char_len;

#[derive(Args)]
pub struct ChunksArgs {
    /// GitHub repository URL to preview
    #[arg(short = 'r', long, value_name = "URL")]
    pub repo: String,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the full text of this chunk (1-based) after the plan
    #[arg(long, value_name = "N")]
    pub show: Option<usize>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run(args: ChunksArgs) -> Result<()> {
    let auditor = Auditor::new(args.config.resolve()?);
    let prepared = auditor.prepare(&args.repo)?;
    let plan = prepared.plan();

    let shown = match args.show {
        Some(n) => match n.checked_sub(1).and_then(|i| prepared.chunks.get(i)) {
            Some(chunk) => Some((n, chunk)),
            None => anyhow::bail!("Chunk {} does not exist ({} chunks)", n, prepared.chunks.len()),
        },
        None => None,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("Repository: {}", args.repo);
        println!("Files fetched: {}", plan.file_count);
        println!("Total characters: {}", plan.total_chars);
        println!("Chunk limit: {} chars", plan.max_chunk_chars);
        println!("Chunks: {}", plan.chunk_count());
        for (i, size) in plan.chunk_sizes.iter().enumerate() {
            println!("  #{:<4} {} chars", i + 1, size);
        }
        if !plan.truncated_files.is_empty() {
            println!("{}", style("Truncated files:").yellow());
            for path in &plan.truncated_files {
                println!("  {}", path);
            }
        }
        if plan.tree_truncated {
            println!(
                "{} the file listing was truncated by the host; some files are not included",
                style("warning:").yellow().bold()
            );
        }
    }

    // Keep stdout parseable in JSON mode.
    if let Some((n, chunk)) = shown {
        let heading = format!("{} ({} chars)", style(format!("Chunk {n}")).bold(), char_len(chunk));
        if args.json {
            eprintln!("{heading}");
            eprintln!("{chunk}");
        } else {
            println!("\n{heading}");
            println!("{chunk}");
        }
    }

    Ok(())
}
