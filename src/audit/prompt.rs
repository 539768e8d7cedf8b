//! The audit prompt sent for every chunk.

use crate::domain::Task;

/// Build the prompt for chunk `index` (0-based) of `total`, embedding the current task state.
pub fn build_audit_prompt(
    index: usize,
    total: usize,
    chunk: &str,
    tasks: &[Task],
) -> Result<String, serde_json::Error> {
    let tasks_json = serde_json::to_string_pretty(tasks)?;
    let position = index + 1;

    Ok(format!(
        r#"<|begin_of_text|><|start_header_id|>system<|end_header_id|>

You are a code audit engine. You are processing chunk {position} of {total} of a codebase.
Your job is to update the status of every task using only the code in this chunk.

Rules:
1. If a task is marked "implemented" or "partially_implemented", re-verify the claim against this chunk. If the code here shows the claim is not supported, downgrade the status and explain why in the evidence.
2. If a task is marked "not_implemented" or "partially_implemented" and this chunk contains new evidence that it is implemented, upgrade the status and cite the files and code that prove it.
3. If this chunk contains nothing relevant to a task, return that task unchanged.

Respond with a JSON array only. Every element must have exactly these fields:
{{"task_id": string, "task": string, "status": "implemented" | "partially_implemented" | "not_implemented", "evidence": string}}

CODE CHUNK:
{chunk}

CURRENT TASK STATUS:
{tasks_json}<|eot_id|><|start_header_id|>user<|end_header_id|>

Return the updated JSON array of tasks.<|eot_id|><|start_header_id|>assistant<|end_header_id|>
"#
    ))
}
