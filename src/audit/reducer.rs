//! Sequential fold of chunks through the model, carrying the task array as state.
//!
//! Each step's prompt embeds the previous step's result, so steps never overlap. A step
//! whose model call fails, or whose output cannot be turned back into tasks, leaves the
//! accumulator exactly as it was.

use super::extract::extract_json_array;
use super::prompt::build_audit_prompt;
use crate::domain::Task;
use crate::llm::TextGenerator;
use serde_json::Value;

/// What happened to the accumulator on one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Replaced { task_count: usize },
    ParseFailed(String),
    CallFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// 0-based chunk index.
    pub index: usize,
    pub total: usize,
    pub outcome: StepOutcome,
}

impl StepReport {
    pub fn advanced(&self) -> bool {
        matches!(self.outcome, StepOutcome::Replaced { .. })
    }
}

/// Fold `chunks` over `initial_tasks`, returning the final task array.
pub fn reduce<G>(chunks: &[String], initial_tasks: &[Task], generator: &G) -> Vec<Task>
where
    G: TextGenerator + ?Sized,
{
    reduce_with_observer(chunks, initial_tasks, generator, |_| {})
}

/// Like [`reduce`], reporting each step to `observer` once it is final.
pub fn reduce_with_observer<G, F>(
    chunks: &[String],
    initial_tasks: &[Task],
    generator: &G,
    mut observer: F,
) -> Vec<Task>
where
    G: TextGenerator + ?Sized,
    F: FnMut(&StepReport),
{
    let total = chunks.len();
    let mut current_results = initial_tasks.to_vec();
    tracing::info!("Auditing {} tasks across {} chunks", current_results.len(), total);

    for (index, chunk) in chunks.iter().enumerate() {
        let outcome = match run_step(index, total, chunk, &current_results, generator) {
            Ok(updated) => {
                let task_count = updated.len();
                current_results = updated;
                StepOutcome::Replaced { task_count }
            }
            Err(outcome) => outcome,
        };

        match &outcome {
            StepOutcome::Replaced { task_count } => {
                tracing::debug!("Chunk {}/{}: {} tasks updated", index + 1, total, task_count);
            }
            StepOutcome::ParseFailed(reason) => {
                tracing::warn!("Chunk {}/{}: unusable model output: {}", index + 1, total, reason);
            }
            StepOutcome::CallFailed(reason) => {
                tracing::warn!("Chunk {}/{}: model call failed: {}", index + 1, total, reason);
            }
        }

        observer(&StepReport { index, total, outcome });
    }

    current_results
}

fn run_step<G>(
    index: usize,
    total: usize,
    chunk: &str,
    current: &[Task],
    generator: &G,
) -> Result<Vec<Task>, StepOutcome>
where
    G: TextGenerator + ?Sized,
{
    let prompt = build_audit_prompt(index, total, chunk, current)
        .map_err(|e| StepOutcome::ParseFailed(format!("could not serialize tasks: {e}")))?;

    let generated =
        generator.generate(&prompt).map_err(|e| StepOutcome::CallFailed(e.to_string()))?;

    let values = extract_json_array(&generated)
        .map_err(|e| StepOutcome::ParseFailed(e.to_string()))?;

    decode_tasks(values).map_err(|e| StepOutcome::ParseFailed(format!("not a task array: {e}")))
}

/// Shape guard: every element must decode as a [`Task`].
fn decode_tasks(values: Vec<Value>) -> Result<Vec<Task>, serde_json::Error> {
    values.into_iter().map(serde_json::from_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;
    use crate::error::LlmCallError;
    use std::cell::RefCell;

    fn logging_task() -> Task {
        Task::new("t1", "Has logging", TaskStatus::NotImplemented, "")
    }

    fn chunks(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("// File: f{i}.js\nconsole.log({i})\n\n")).collect()
    }

    /// Replies with `responses[i]` on call `i` and records every prompt.
    struct Scripted {
        responses: Vec<Result<String, String>>,
        prompts: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<&str, &str>>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for Scripted {
        fn generate(&self, prompt: &str) -> Result<String, LlmCallError> {
            let mut prompts = self.prompts.borrow_mut();
            let call = prompts.len();
            prompts.push(prompt.to_string());
            match &self.responses[call] {
                Ok(text) => Ok(text.clone()),
                Err(msg) => Err(LlmCallError::Request(msg.clone())),
            }
        }
    }

    #[test]
    fn test_zero_chunks_returns_initial_tasks() {
        let initial = vec![logging_task()];
        let generator = Scripted::new(vec![]);
        assert_eq!(reduce(&[], &initial, &generator), initial);
        assert!(generator.prompts.borrow().is_empty());
    }

    #[test]
    fn test_valid_response_replaces_accumulator() {
        let response = r#"[{"task_id":"t1","task":"Has logging","status":"implemented","evidence":"found console logging in file A"}]"#;
        let generator = Scripted::new(vec![Ok(response)]);

        let result = reduce(&chunks(1), &[logging_task()], &generator);
        assert_eq!(
            result,
            vec![Task::new(
                "t1",
                "Has logging",
                TaskStatus::Implemented,
                "found console logging in file A"
            )]
        );
    }

    #[test]
    fn test_replacement_is_wholesale_not_merged() {
        let initial = vec![
            logging_task(),
            Task::new("t2", "Has tests", TaskStatus::NotImplemented, ""),
        ];
        let response = r#"[{"task_id":"t2","task":"Has tests","status":"partially_implemented","evidence":"one test"}]"#;
        let generator = Scripted::new(vec![Ok(response)]);

        let result = reduce(&chunks(1), &initial, &generator);
        assert_eq!(
            result,
            vec![Task::new("t2", "Has tests", TaskStatus::PartiallyImplemented, "one test")]
        );
    }

    #[test]
    fn test_unparsable_output_passes_through() {
        let first = r#"[{"task_id":"t1","task":"Has logging","status":"partially_implemented","evidence":"a"}]"#;
        let generator = Scripted::new(vec![Ok(first), Ok("Sorry, I cannot help with that.")]);

        let mut snapshots = Vec::new();
        let result = reduce_with_observer(&chunks(2), &[logging_task()], &generator, |report| {
            snapshots.push(report.clone())
        });

        let expected =
            vec![Task::new("t1", "Has logging", TaskStatus::PartiallyImplemented, "a")];
        assert_eq!(result, expected);
        assert!(snapshots[0].advanced());
        assert_eq!(
            snapshots[1].outcome,
            StepOutcome::ParseFailed("no bracketed array found".to_string())
        );
    }

    #[test]
    fn test_call_failure_passes_through_and_continues() {
        let last = r#"[{"task_id":"t1","task":"Has logging","status":"implemented","evidence":"b"}]"#;
        let generator = Scripted::new(vec![Err("connection reset"), Ok(last)]);

        let mut outcomes = Vec::new();
        let result = reduce_with_observer(&chunks(2), &[logging_task()], &generator, |report| {
            outcomes.push(report.outcome.clone())
        });

        assert!(matches!(outcomes[0], StepOutcome::CallFailed(ref m) if m.contains("connection reset")));
        assert_eq!(result, vec![Task::new("t1", "Has logging", TaskStatus::Implemented, "b")]);

        // The second prompt still carries the untouched initial state.
        let prompts = generator.prompts.borrow();
        assert!(prompts[1].contains("\"status\": \"not_implemented\""));
    }

    #[test]
    fn test_wrong_shape_passes_through() {
        let initial = vec![logging_task()];
        let generator = Scripted::new(vec![Ok("[1, 2, 3]"), Ok(r#"[{"task_id":"t1"}]"#)]);

        let mut outcomes = Vec::new();
        let result = reduce_with_observer(&chunks(2), &initial, &generator, |report| {
            outcomes.push(report.outcome.clone())
        });

        assert_eq!(result, initial);
        assert!(outcomes.iter().all(|o| matches!(o, StepOutcome::ParseFailed(_))));
    }

    #[test]
    fn test_each_prompt_embeds_previous_result() {
        let first = r#"[{"task_id":"t1","task":"Has logging","status":"implemented","evidence":"EVIDENCE-ONE"}]"#;
        let second = r#"[{"task_id":"t1","task":"Has logging","status":"not_implemented","evidence":"refuted"}]"#;
        let generator = Scripted::new(vec![Ok(first), Ok(second)]);

        let result = reduce(&chunks(2), &[logging_task()], &generator);

        let prompts = generator.prompts.borrow();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("chunk 1 of 2"));
        assert!(!prompts[0].contains("EVIDENCE-ONE"));
        assert!(prompts[1].contains("chunk 2 of 2"));
        assert!(prompts[1].contains("EVIDENCE-ONE"));
        assert!(prompts[1].contains("// File: f1.js"));

        // Later evidence may flip a status back down.
        assert_eq!(result[0].status, TaskStatus::NotImplemented);
    }

    #[test]
    fn test_closure_generator() {
        let generator = |_: &str| -> Result<String, LlmCallError> { Ok("```json\n[]\n```".into()) };
        let result = reduce(&chunks(3), &[logging_task()], &generator);
        assert!(result.is_empty());
    }
}
