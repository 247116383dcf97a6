use crate::cli::ComponentType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// Fatal configuration-class failures. Everything per-file is data on the
/// `FileRecord`, never an error.
#[derive(thiserror::Error, Debug)]
pub enum ComplyError {
    #[error("taxonomy inconsistency: {0}")]
    Taxonomy(String),
    #[error("scan root not found: {0}")]
    BadRoot(String),
    #[error("config error: {0}")]
    Config(String),
}

impl ComplyError {
    pub fn code(&self) -> &'static str {
        match self {
            ComplyError::Taxonomy(_) => "TAXONOMY",
            ComplyError::BadRoot(_) => "BAD_ROOT",
            ComplyError::Config(_) => "CONFIG",
        }
    }
}

/// A canonical compliance label: registered category code plus an assurance
/// level in 0..=3. Rendered as `[CODE-N]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub category: String,
    pub level: u8,
}

impl Label {
    pub fn new(category: impl Into<String>, level: u8) -> Self {
        Label {
            category: category.into(),
            level,
        }
    }

    pub fn canonical(&self) -> String {
        format!("[{}-{}]", self.category, self.level)
    }
}

pub const MAX_LEVEL: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyScheme {
    SequentialNumeric,
    FiveLevelScale,
    ParenthesizedSequential,
}

impl LegacyScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyScheme::SequentialNumeric => "sequential_numeric",
            LegacyScheme::FiveLevelScale => "five_level_scale",
            LegacyScheme::ParenthesizedSequential => "parenthesized_sequential",
        }
    }
}

/// A legacy token as extracted, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub raw: String,
    pub category: String,
    pub value: u32,
    pub scheme: LegacyScheme,
}

/// A legacy token as recorded on the `FileRecord`, after normalization.
#[derive(Debug, Clone, Serialize)]
pub struct LegacyTokenRecord {
    pub raw: String,
    pub scheme: LegacyScheme,
    pub resolved: Option<Label>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    UnknownCategory,
    InvalidLevel,
    OutOfDomainValue,
}

/// A compliance finding: data attached to the file record, surfaced through
/// the reporter no matter how many there are.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub token: String,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Unlabeled,
    PartiallyLabeled,
    FullyLabeled,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Unlabeled => "unlabeled",
            Classification::PartiallyLabeled => "partially_labeled",
            Classification::FullyLabeled => "fully_labeled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Code,
    Doc,
}

/// Per-file working record. Created fresh each scan pass, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub path: String,
    pub extension: String,
    pub component: ComponentType,
    pub kind: FileKind,
    pub labels: Vec<Label>,
    pub legacy_tokens: Vec<LegacyTokenRecord>,
    pub findings: Vec<Finding>,
    pub classification: Classification,
    pub missing_required: Vec<String>,
    pub inserted: Vec<Label>,
    pub error: Option<String>,
}

/// Aggregate counters over the file-record stream.
///
/// `merged` is commutative and associative so per-worker partial aggregates
/// reduce to the same value regardless of scheduling. Files with a recorded
/// per-file error are tallied only in `file_errors`, not in a classification
/// bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    pub total_files: usize,
    pub fully_labeled: usize,
    pub partially_labeled: usize,
    pub unlabeled: usize,
    pub per_category: BTreeMap<String, usize>,
    pub auto_fixed: usize,
    pub file_errors: usize,
    pub findings: usize,
}

impl AggregateReport {
    pub fn from_record(record: &FileRecord) -> Self {
        let mut agg = AggregateReport {
            total_files: 1,
            findings: record.findings.len(),
            ..AggregateReport::default()
        };
        if record.error.is_some() {
            agg.file_errors = 1;
            return agg;
        }
        match record.classification {
            Classification::FullyLabeled => agg.fully_labeled = 1,
            Classification::PartiallyLabeled => agg.partially_labeled = 1,
            Classification::Unlabeled => agg.unlabeled = 1,
        }
        for label in &record.labels {
            *agg.per_category.entry(label.category.clone()).or_insert(0) += 1;
        }
        if !record.inserted.is_empty() {
            agg.auto_fixed = 1;
        }
        agg
    }

    pub fn merged(mut self, other: Self) -> Self {
        self.total_files += other.total_files;
        self.fully_labeled += other.fully_labeled;
        self.partially_labeled += other.partially_labeled;
        self.unlabeled += other.unlabeled;
        self.auto_fixed += other.auto_fixed;
        self.file_errors += other.file_errors;
        self.findings += other.findings;
        for (code, count) in other.per_category {
            *self.per_category.entry(code).or_insert(0) += count;
        }
        self
    }

    pub fn compliance_pct(&self) -> f64 {
        let classified = self.total_files.saturating_sub(self.file_errors);
        if classified == 0 {
            return 100.0;
        }
        self.fully_labeled as f64 * 100.0 / classified as f64
    }
}

/// Scan configuration file (`.comply.toml`).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub scan: ScanSection,
}

#[derive(Debug, Deserialize)]
pub struct ScanSection {
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    #[serde(default = "default_code_extensions")]
    pub code_extensions: Vec<String>,
    #[serde(default = "default_doc_extensions")]
    pub doc_extensions: Vec<String>,
}

impl Default for ScanSection {
    fn default() -> Self {
        ScanSection {
            exclude: default_exclude(),
            code_extensions: default_code_extensions(),
            doc_extensions: default_doc_extensions(),
        }
    }
}

fn default_exclude() -> Vec<String> {
    ["node_modules", "target", ".git", "vendor", "dist", "build"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_code_extensions() -> Vec<String> {
    [
        "rs", "js", "ts", "py", "go", "java", "kt", "c", "h", "cpp", "sh", "toml",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_doc_extensions() -> Vec<String> {
    ["md", "txt", "html"].iter().map(|s| s.to_string()).collect()
}

/// Taxonomy row as exposed by `comply taxonomy list`.
#[derive(Serialize)]
pub struct CategoryRow {
    pub code: String,
    pub name: String,
    pub required_for: Vec<String>,
    pub recommended_for: Vec<String>,
}

#[derive(Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// The structured report artifact.
#[derive(Serialize)]
pub struct Report {
    pub summary: Summary,
    pub files: Vec<FileRecord>,
}

#[derive(Serialize)]
pub struct Summary {
    pub total_files: usize,
    pub fully_labeled: usize,
    pub partially_labeled: usize,
    pub unlabeled: usize,
    pub compliance_pct: f64,
    pub auto_fixed: usize,
    pub file_errors: usize,
    pub findings: usize,
    pub per_category: BTreeMap<String, usize>,
}
