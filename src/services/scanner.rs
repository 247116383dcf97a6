use crate::domain::models::{
    AggregateReport, Classification, ComplyError, FileKind, FileRecord, Finding, FindingKind,
    LegacyScheme, LegacyTokenRecord,
};
use crate::services::audit;
use crate::services::autofix;
use crate::services::classify;
use crate::services::extract::{self, Ruleset};
use crate::services::normalize;
use crate::services::taxonomy::{self, Taxonomy};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct ScanOptions {
    pub root: PathBuf,
    pub single_file: Option<PathBuf>,
    pub fix: bool,
    pub default_level: u8,
    pub backup: bool,
    pub exclude: Vec<String>,
    pub code_extensions: Vec<String>,
    pub doc_extensions: Vec<String>,
}

pub struct ScanResult {
    pub aggregate: AggregateReport,
    pub records: Vec<FileRecord>,
}

/// Walk the target set and drive the per-file pipeline:
/// extract -> normalize -> classify -> optionally fix.
///
/// Files fan out across the rayon pool; each worker owns its record until
/// the final reduction, and the aggregate is a merge of per-record partials,
/// so the result is identical regardless of scheduling. Records come back
/// path-sorted for the same reason.
pub fn run(
    taxonomy: &Taxonomy,
    rules: &Ruleset,
    opts: &ScanOptions,
) -> Result<ScanResult, ComplyError> {
    let files = collect_files(opts)?;
    let mut records: Vec<FileRecord> = files
        .par_iter()
        .map(|path| process_file(taxonomy, rules, opts, path))
        .collect();
    records.sort_by(|a, b| a.path.cmp(&b.path));
    let aggregate = records
        .par_iter()
        .map(AggregateReport::from_record)
        .reduce(AggregateReport::default, AggregateReport::merged);
    Ok(ScanResult { aggregate, records })
}

fn is_excluded(path: &Path, exclude: &[String]) -> bool {
    let normalized = path.to_string_lossy().replace('\\', "/");
    exclude.iter().any(|needle| normalized.contains(needle))
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Collect the target file set. Excluded subtrees are pruned before the
/// walker descends, so their files are never opened or counted. A single
/// named file bypasses both the exclusion list and the allow-list.
fn collect_files(opts: &ScanOptions) -> Result<Vec<PathBuf>, ComplyError> {
    if let Some(single) = &opts.single_file {
        if !single.is_file() {
            return Err(ComplyError::BadRoot(single.display().to_string()));
        }
        return Ok(vec![single.clone()]);
    }

    if !opts.root.exists() {
        return Err(ComplyError::BadRoot(opts.root.display().to_string()));
    }

    let mut out = Vec::new();
    let walker = WalkDir::new(&opts.root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry.path(), &opts.exclude));
    for entry in walker {
        // unreadable directory entries are skipped, the batch continues
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_file() {
            continue;
        }
        let ext = extension_of(entry.path());
        if opts.code_extensions.iter().any(|e| *e == ext)
            || opts.doc_extensions.iter().any(|e| *e == ext)
        {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

fn process_file(
    taxonomy: &Taxonomy,
    rules: &Ruleset,
    opts: &ScanOptions,
    path: &Path,
) -> FileRecord {
    let rel = path
        .strip_prefix(&opts.root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");
    let extension = extension_of(path);
    let component = taxonomy::infer_component(&rel);
    let kind = if opts.doc_extensions.iter().any(|e| *e == extension) {
        FileKind::Doc
    } else {
        FileKind::Code
    };
    let mut record = FileRecord {
        path: rel,
        extension,
        component,
        kind,
        labels: Vec::new(),
        legacy_tokens: Vec::new(),
        findings: Vec::new(),
        classification: Classification::Unlabeled,
        missing_required: Vec::new(),
        inserted: Vec::new(),
        error: None,
    };

    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            record.error = Some(format!("read failed: {}", e));
            return record;
        }
    };
    let content = match String::from_utf8(bytes) {
        Ok(c) => c,
        Err(_) => {
            record.error = Some("content is not valid UTF-8".to_string());
            return record;
        }
    };

    let extraction = extract::extract(rules, &content);
    let mut labels = extraction.labels;
    let mut findings = extraction.findings;

    for token in extraction.legacy {
        if !taxonomy.contains(&token.category) {
            // bracketed syntax claims to be a label; bare and parenthesized
            // hits on unregistered codes are ordinary prose
            if token.scheme == LegacyScheme::FiveLevelScale {
                findings.push(Finding {
                    kind: FindingKind::UnknownCategory,
                    token: token.raw.clone(),
                    detail: format!("category {} is not in the taxonomy", token.category),
                });
            }
            continue;
        }
        match normalize::normalize(&token) {
            Ok(label) => {
                record.legacy_tokens.push(LegacyTokenRecord {
                    raw: token.raw,
                    scheme: token.scheme,
                    resolved: Some(label.clone()),
                });
                labels.push(label);
            }
            Err(e) => {
                record.legacy_tokens.push(LegacyTokenRecord {
                    raw: token.raw.clone(),
                    scheme: token.scheme,
                    resolved: None,
                });
                findings.push(Finding {
                    kind: FindingKind::OutOfDomainValue,
                    token: token.raw,
                    detail: e.to_string(),
                });
            }
        }
    }

    let mut seen = HashSet::new();
    labels.retain(|l| seen.insert(format!("{}-{}", l.category, l.level)));

    let mut present: HashSet<String> = HashSet::new();
    for label in labels {
        if taxonomy.contains(&label.category) {
            present.insert(label.category.clone());
            record.labels.push(label);
        } else {
            findings.push(Finding {
                kind: FindingKind::UnknownCategory,
                token: label.canonical(),
                detail: format!("category {} is not in the taxonomy", label.category),
            });
        }
    }

    let outcome = classify::classify(&present, component, kind, taxonomy);
    record.classification = outcome.classification;
    record.missing_required = outcome.missing_required;

    if opts.fix && !record.missing_required.is_empty() {
        let plan = autofix::autofix(
            rules,
            taxonomy,
            &content,
            &record.extension,
            &record.missing_required,
            opts.default_level,
        );
        if plan.content != content {
            match write_fixed(path, &content, &plan.content, opts.backup) {
                Ok(()) => {
                    audit::audit(
                        "fix",
                        serde_json::json!({
                            "file": record.path.clone(),
                            "inserted": plan.inserted.iter().map(|l| l.canonical()).collect::<Vec<_>>(),
                            "orig_digest": audit::content_digest(content.as_bytes()),
                        }),
                    );
                    for label in &plan.inserted {
                        present.insert(label.category.clone());
                        record.labels.push(label.clone());
                    }
                    record.inserted = plan.inserted;
                    let after = classify::classify(&present, component, kind, taxonomy);
                    record.classification = after.classification;
                    record.missing_required = after.missing_required;
                }
                Err(e) => {
                    record.error = Some(format!("write failed: {}", e));
                }
            }
        }
    }

    record.findings = findings;
    record
}

/// Buffer-then-write: the new content is fully materialized before any
/// filesystem mutation, so a failure leaves the original file untouched.
fn write_fixed(
    path: &Path,
    original: &str,
    new_content: &str,
    backup: bool,
) -> std::io::Result<()> {
    if backup {
        let bak = PathBuf::from(format!("{}.bak", path.display()));
        std::fs::write(bak, original)?;
    }
    std::fs::write(path, new_content)
}

#[cfg(test)]
mod tests {
    use super::{run, ScanOptions};
    use crate::domain::models::{Classification, ScanSection};
    use crate::services::extract::Ruleset;
    use crate::services::taxonomy::Taxonomy;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn opts(root: &Path, fix: bool) -> ScanOptions {
        let scan = ScanSection::default();
        ScanOptions {
            root: root.to_path_buf(),
            single_file: None,
            fix,
            default_level: 3,
            backup: false,
            exclude: scan.exclude,
            code_extensions: scan.code_extensions,
            doc_extensions: scan.doc_extensions,
        }
    }

    fn fixture_tree(tmp: &TempDir) -> std::path::PathBuf {
        let root = tmp.path().join("tree");
        fs::create_dir_all(root.join("src/bitcoin")).expect("mkdir");
        fs::create_dir_all(root.join("docs")).expect("mkdir");
        fs::create_dir_all(root.join("vendor")).expect("mkdir");
        fs::write(root.join("src/bitcoin/wallet.rs"), "fn spend() {}\n").expect("write");
        fs::write(root.join("docs/guide.md"), "[AIR-3]\n# Guide\n").expect("write");
        fs::write(root.join("vendor/dep.rs"), "[AIR-7] junk\n").expect("write");
        root
    }

    #[test]
    fn excluded_paths_are_never_counted() {
        let tmp = TempDir::new().expect("tempdir");
        let root = fixture_tree(&tmp);
        let taxonomy = Taxonomy::load().expect("taxonomy");
        let rules = Ruleset::new().expect("patterns");
        let result = run(&taxonomy, &rules, &opts(&root, false)).expect("scan");
        assert_eq!(result.aggregate.total_files, 2);
        assert!(result.records.iter().all(|r| !r.path.contains("vendor")));
    }

    #[test]
    fn validate_runs_are_deterministic() {
        let tmp = TempDir::new().expect("tempdir");
        let root = fixture_tree(&tmp);
        let taxonomy = Taxonomy::load().expect("taxonomy");
        let rules = Ruleset::new().expect("patterns");
        let first = run(&taxonomy, &rules, &opts(&root, false)).expect("scan");
        let second = run(&taxonomy, &rules, &opts(&root, false)).expect("scan");
        assert_eq!(first.aggregate, second.aggregate);
        let paths: Vec<_> = first.records.iter().map(|r| r.path.clone()).collect();
        let paths2: Vec<_> = second.records.iter().map(|r| r.path.clone()).collect();
        assert_eq!(paths, paths2);
    }

    #[test]
    fn fix_then_revalidate_is_fully_labeled_and_stable() {
        let tmp = TempDir::new().expect("tempdir");
        let root = fixture_tree(&tmp);
        let taxonomy = Taxonomy::load().expect("taxonomy");
        let rules = Ruleset::new().expect("patterns");

        let fixed = run(&taxonomy, &rules, &opts(&root, true)).expect("fix scan");
        assert_eq!(fixed.aggregate.auto_fixed, 1);

        let wallet = root.join("src/bitcoin/wallet.rs");
        let after_first = fs::read_to_string(&wallet).expect("read fixed file");
        assert!(after_first.contains("[BPC-3]"));

        let validated = run(&taxonomy, &rules, &opts(&root, false)).expect("revalidate");
        assert_eq!(validated.aggregate.unlabeled, 0);
        assert_eq!(validated.aggregate.partially_labeled, 0);

        let again = run(&taxonomy, &rules, &opts(&root, true)).expect("second fix");
        assert_eq!(again.aggregate.auto_fixed, 0);
        let after_second = fs::read_to_string(&wallet).expect("read again");
        assert_eq!(after_first, after_second);
    }

    #[test]
    fn single_file_mode_scans_exactly_that_file() {
        let tmp = TempDir::new().expect("tempdir");
        let root = fixture_tree(&tmp);
        let taxonomy = Taxonomy::load().expect("taxonomy");
        let rules = Ruleset::new().expect("patterns");
        let mut o = opts(&root, false);
        o.single_file = Some(root.join("docs/guide.md"));
        let result = run(&taxonomy, &rules, &o).expect("scan");
        assert_eq!(result.aggregate.total_files, 1);
        assert_eq!(
            result.records[0].classification,
            Classification::FullyLabeled
        );
    }

    #[test]
    fn unreadable_content_is_a_per_file_error_not_an_abort() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("tree");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(root.join("ok.md"), "[AIR-2]\n").expect("write");
        fs::write(root.join("bad.md"), [0xffu8, 0xfe, 0x00, 0x80]).expect("write");
        let taxonomy = Taxonomy::load().expect("taxonomy");
        let rules = Ruleset::new().expect("patterns");
        let result = run(&taxonomy, &rules, &opts(&root, false)).expect("scan");
        assert_eq!(result.aggregate.total_files, 2);
        assert_eq!(result.aggregate.file_errors, 1);
        assert_eq!(result.aggregate.fully_labeled, 1);
    }
}
