use crate::cli::ComponentType;
use crate::domain::models::{Classification, FileKind};
use crate::services::taxonomy::Taxonomy;
use std::collections::HashSet;

pub struct Outcome {
    pub classification: Classification,
    pub missing_required: Vec<String>,
}

/// Pure classification from the set of valid category codes present.
/// Recommended categories never influence the result; doc files classify
/// against the reduced doc required set. Emits no diagnostics of its own.
pub fn classify(
    present: &HashSet<String>,
    component: ComponentType,
    kind: FileKind,
    taxonomy: &Taxonomy,
) -> Outcome {
    let required = match kind {
        FileKind::Doc => taxonomy.doc_required(),
        FileKind::Code => taxonomy.required_for(component),
    };
    let mut missing: Vec<String> = required
        .iter()
        .filter(|code| !present.contains(**code))
        .map(|code| code.to_string())
        .collect();
    missing.sort();

    let classification = if missing.is_empty() {
        Classification::FullyLabeled
    } else if missing.len() < required.len() {
        Classification::PartiallyLabeled
    } else {
        Classification::Unlabeled
    };

    Outcome {
        classification,
        missing_required: missing,
    }
}
