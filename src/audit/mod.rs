//! Task auditing: the chunk fold, its prompt, and recovery of the model's answer

pub mod extract;
pub mod pipeline;
pub mod prompt;
pub mod reducer;

pub use extract::extract_json_array;
pub use pipeline::{AuditService, Auditor, PreparedAudit};
pub use prompt::build_audit_prompt;
pub use reducer::{reduce, reduce_with_observer, StepOutcome, StepReport};
