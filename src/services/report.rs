use crate::domain::models::{
    AggregateReport, CategoryCount, Classification, FileRecord, Report, Summary,
};
use std::path::Path;

pub fn build_report(aggregate: &AggregateReport, records: Vec<FileRecord>) -> Report {
    Report {
        summary: Summary {
            total_files: aggregate.total_files,
            fully_labeled: aggregate.fully_labeled,
            partially_labeled: aggregate.partially_labeled,
            unlabeled: aggregate.unlabeled,
            compliance_pct: aggregate.compliance_pct(),
            auto_fixed: aggregate.auto_fixed,
            file_errors: aggregate.file_errors,
            findings: aggregate.findings,
            per_category: aggregate.per_category.clone(),
        },
        files: records,
    }
}

pub fn print_summary(aggregate: &AggregateReport, fix_mode: bool) {
    println!("files scanned: {}", aggregate.total_files);
    println!("fully labeled: {}", aggregate.fully_labeled);
    println!("partially labeled: {}", aggregate.partially_labeled);
    println!("unlabeled: {}", aggregate.unlabeled);
    if aggregate.file_errors > 0 {
        println!("file errors: {}", aggregate.file_errors);
    }
    if aggregate.findings > 0 {
        println!("findings: {}", aggregate.findings);
    }
    if fix_mode {
        println!("auto fixed: {}", aggregate.auto_fixed);
    }
    println!("compliance: {:.1}%", aggregate.compliance_pct());
}

pub fn verbose_line(record: &FileRecord) -> String {
    if let Some(error) = &record.error {
        return format!("ERROR\t{}\t{}", record.path, error);
    }
    if !record.inserted.is_empty() {
        let tokens: Vec<String> = record.inserted.iter().map(|l| l.canonical()).collect();
        return format!("FIXED\t{}\t{}", record.path, tokens.join(" "));
    }
    match record.classification {
        Classification::FullyLabeled => {
            format!("PASS\t{}\t{}", record.path, record.component.as_str())
        }
        _ => format!(
            "FAIL\t{}\t{}\t{}\tmissing: {}",
            record.path,
            record.component.as_str(),
            record.classification.as_str(),
            record.missing_required.join(", ")
        ),
    }
}

/// Occurrence table sorted by count descending, code ascending on ties.
pub fn category_counts(aggregate: &AggregateReport) -> Vec<CategoryCount> {
    let mut out: Vec<CategoryCount> = aggregate
        .per_category
        .iter()
        .map(|(category, count)| CategoryCount {
            category: category.clone(),
            count: *count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(&b.category)));
    out
}

pub fn write_artifact(path: &Path, report: &Report) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_string_pretty(report)?)?;
    Ok(())
}

/// Validate mode gates on any non-fully-labeled file; a completed fix run
/// reports success, leaving only fatal errors to fail the process.
pub fn exit_code(fix_mode: bool, aggregate: &AggregateReport) -> i32 {
    if fix_mode {
        return 0;
    }
    if aggregate.unlabeled + aggregate.partially_labeled > 0 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{category_counts, exit_code};
    use crate::domain::models::AggregateReport;

    #[test]
    fn counts_sort_by_count_then_code() {
        let mut agg = AggregateReport::default();
        agg.per_category.insert("RES".to_string(), 2);
        agg.per_category.insert("AIR".to_string(), 5);
        agg.per_category.insert("BPC".to_string(), 2);
        let counts = category_counts(&agg);
        let order: Vec<&str> = counts.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(order, vec!["AIR", "BPC", "RES"]);
    }

    #[test]
    fn gate_fails_validate_but_not_fix() {
        let agg = AggregateReport {
            total_files: 3,
            fully_labeled: 1,
            partially_labeled: 1,
            unlabeled: 1,
            ..AggregateReport::default()
        };
        assert_eq!(exit_code(false, &agg), 1);
        assert_eq!(exit_code(true, &agg), 0);

        let clean = AggregateReport {
            total_files: 2,
            fully_labeled: 2,
            ..AggregateReport::default()
        };
        assert_eq!(exit_code(false, &clean), 0);
    }
}
