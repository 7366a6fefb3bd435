//! Plain-text (markdown-flavoured) stage reports.
//!
//! Reports are what the navigator hands back for display. The sentinel
//! strings for empty input are part of the contract and tested.

use std::fmt::Write;

use crate::entity::Entity;
use crate::resolve::{CapabilityResolution, IntrinsicOutcome, IntrinsicResolution, TaskOutcome};

/// Default description cut-off in the capability report.
pub const CAPABILITY_DESCRIPTION_LIMIT: usize = 150;

/// Default description cut-off in the intrinsic report.
pub const INTRINSIC_DESCRIPTION_LIMIT: usize = 200;

/// Default description cut-off in the capability catalog.
pub const CATALOG_DESCRIPTION_LIMIT: usize = 100;

/// Sentinel for an empty task list.
pub const NO_TASKS: &str = "No tasks provided.";

/// Sentinel for an empty capability id set.
pub const NO_CAPABILITIES: &str = "No capabilities provided.";

/// Tasks identified from an intent, numbered.
#[must_use]
pub fn identified_tasks(tasks: &[String]) -> String {
    let mut out = String::from("### Identified AI Tasks:\n\n");
    for (i, task) in tasks.iter().enumerate() {
        let _ = writeln!(out, "{}. **{task}**", i + 1);
    }
    out
}

/// The full task catalog used in exhaustive mode.
#[must_use]
pub fn all_tasks(tasks: &[String]) -> String {
    let listing: Vec<String> = tasks.iter().map(|t| format!("- {t}")).collect();
    format!("### Using All Available Tasks\n\n{}", listing.join("\n"))
}

fn entity_line(out: &mut String, entity: &Entity, limit: usize) {
    let _ = writeln!(out, "- **{}** (`{}`)", entity.name, entity.id);
    if let Some(desc) = entity.description_excerpt(limit) {
        let _ = writeln!(out, "  - {desc}");
    }
}

/// Per-task capability report.
#[must_use]
pub fn capabilities(resolution: &CapabilityResolution, description_limit: usize) -> String {
    if resolution.is_empty_input() {
        return NO_TASKS.to_string();
    }

    let mut out = String::new();
    for task in &resolution.outcomes {
        match &task.outcome {
            TaskOutcome::Found(caps) => {
                for cap in caps {
                    entity_line(&mut out, cap, description_limit);
                }
                out.push('\n');
            }
            TaskOutcome::NoMappings => out.push_str("*No capability mappings found*\n\n"),
            TaskOutcome::Failed(msg) => {
                let _ = write!(out, "*Error: {msg}*\n\n");
            }
        }
    }
    out
}

/// Per-capability intrinsic report.
#[must_use]
pub fn intrinsics(resolution: &IntrinsicResolution, description_limit: usize) -> String {
    if resolution.is_empty_input() {
        return NO_CAPABILITIES.to_string();
    }

    let mut out = String::new();
    for group in &resolution.outcomes {
        match &group.outcome {
            IntrinsicOutcome::Found(adapters) => {
                let _ = write!(
                    out,
                    "**{}** ({} implementation(s))\n\n",
                    group.display_name(),
                    adapters.len()
                );
                for adapter in adapters {
                    entity_line(&mut out, adapter, description_limit);
                }
                out.push('\n');
            }
            IntrinsicOutcome::NoneFound => {
                let _ = write!(
                    out,
                    "**{}**\n\n*No intrinsics found for this capability*\n\n",
                    group.display_name()
                );
            }
            IntrinsicOutcome::Failed(msg) => {
                let _ = write!(out, "*Error for {}: {msg}*\n\n", group.capability_id);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::entity::TaskId;
    use crate::resolve::{CapabilityIntrinsics, TaskCapabilities};

    #[test]
    fn identified_tasks_are_numbered() {
        let report = identified_tasks(&["Question Answering".to_string(), "Summarization".to_string()]);
        assert_eq!(
            report,
            "### Identified AI Tasks:\n\n1. **Question Answering**\n2. **Summarization**\n"
        );
    }

    #[test]
    fn all_tasks_listing() {
        let report = all_tasks(&["A".to_string(), "B".to_string()]);
        assert_eq!(report, "### Using All Available Tasks\n\n- A\n- B");
    }

    #[test]
    fn capability_descriptions_are_truncated() {
        let long = "x".repeat(160);
        let resolution = CapabilityResolution {
            outcomes: vec![TaskCapabilities {
                task: "Summarization".to_string(),
                task_id: TaskId::from_name("Summarization"),
                outcome: TaskOutcome::Found(vec![Entity::new("c1", "C1").with_description(long)]),
            }],
            capability_ids: std::iter::once("c1".to_string()).collect(),
        };
        let report = capabilities(&resolution, CAPABILITY_DESCRIPTION_LIMIT);
        assert!(report.starts_with("- **C1** (`c1`)\n  - "));
        assert!(report.contains(&format!("{}...", "x".repeat(150))));
        assert!(!report.contains(&"x".repeat(151)));
    }

    #[test]
    fn failed_lookup_uses_capability_id() {
        let resolution = IntrinsicResolution {
            requested: 1,
            outcomes: vec![CapabilityIntrinsics {
                capability_id: "c9".to_string(),
                capability: None,
                outcome: IntrinsicOutcome::Failed("boom".to_string()),
            }],
            intrinsics: Vec::new(),
        };
        assert_eq!(intrinsics(&resolution, 10), "*Error for c9: boom*\n\n");
    }

    #[test]
    fn all_stale_yields_empty_report() {
        let resolution = IntrinsicResolution {
            requested: 2,
            outcomes: Vec::new(),
            intrinsics: Vec::new(),
        };
        assert!(intrinsics(&resolution, 10).is_empty());
    }
}
