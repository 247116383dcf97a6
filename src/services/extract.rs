use crate::domain::models::{Finding, FindingKind, Label, LegacyScheme, RawToken, MAX_LEVEL};
use crate::services::taxonomy::Taxonomy;
use regex::Regex;

/// Compiled token patterns, built once per run.
///
/// Bracketed tokens are claimed labels and are always interpreted: value
/// 0..=3 is canonical, 4..=5 is the legacy five-level scale, anything else
/// is an invalid-level finding. The migration table below handles the two
/// unbracketed legacy schemes; adding a scheme is a table row plus a mapping
/// arm in `normalize`.
pub struct Ruleset {
    bracketed: Regex,
    migrations: Vec<MigrationRule>,
}

pub struct MigrationRule {
    pub scheme: LegacyScheme,
    pattern: Regex,
}

impl Ruleset {
    pub fn new() -> Result<Ruleset, regex::Error> {
        Ok(Ruleset {
            bracketed: Regex::new(r"\[([A-Z]{2,5})-(\d+)\]")?,
            migrations: vec![
                MigrationRule {
                    scheme: LegacyScheme::ParenthesizedSequential,
                    pattern: Regex::new(r"\(([A-Z]{2,5})-(\d{3})\)")?,
                },
                MigrationRule {
                    scheme: LegacyScheme::SequentialNumeric,
                    pattern: Regex::new(r"\b([A-Z]{2,5})-(\d{3})\b")?,
                },
            ],
        })
    }
}

#[derive(Debug, Default)]
pub struct Extraction {
    pub labels: Vec<Label>,
    pub legacy: Vec<RawToken>,
    pub findings: Vec<Finding>,
}

fn overlaps(spans: &[(usize, usize)], start: usize, end: usize) -> bool {
    spans.iter().any(|&(a, b)| start < b && a < end)
}

/// Scan content into canonical labels, legacy tokens, and invalid-token
/// findings. Pure: never mutates its input, consults no registry.
///
/// A span consumed by an earlier pattern is excluded from later patterns, so
/// canonical interpretation always wins over legacy interpretation of the
/// same text, and a parenthesized token is never re-read as a bare one.
pub fn extract(rules: &Ruleset, content: &str) -> Extraction {
    let mut out = Extraction::default();
    let mut consumed: Vec<(usize, usize)> = Vec::new();

    for caps in rules.bracketed.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        consumed.push((whole.start(), whole.end()));
        let code = &caps[1];
        let digits = &caps[2];
        if digits.len() != 1 {
            out.findings.push(Finding {
                kind: FindingKind::InvalidLevel,
                token: whole.as_str().to_string(),
                detail: format!("level {:?} is not a single digit 0-3", digits),
            });
            continue;
        }
        let value = match digits.parse::<u32>() {
            Ok(v) => v,
            Err(_) => continue,
        };
        if value <= MAX_LEVEL as u32 {
            out.labels.push(Label::new(code, value as u8));
        } else if value <= 5 {
            out.legacy.push(RawToken {
                raw: whole.as_str().to_string(),
                category: code.to_string(),
                value,
                scheme: LegacyScheme::FiveLevelScale,
            });
        } else {
            out.findings.push(Finding {
                kind: FindingKind::InvalidLevel,
                token: whole.as_str().to_string(),
                detail: format!("level {} outside 0..=3", value),
            });
        }
    }

    for rule in &rules.migrations {
        for caps in rule.pattern.captures_iter(content) {
            let Some(whole) = caps.get(0) else { continue };
            if overlaps(&consumed, whole.start(), whole.end()) {
                continue;
            }
            consumed.push((whole.start(), whole.end()));
            let value = match caps[2].parse::<u32>() {
                Ok(v) => v,
                Err(_) => continue,
            };
            out.legacy.push(RawToken {
                raw: whole.as_str().to_string(),
                category: caps[1].to_string(),
                value,
                scheme: rule.scheme,
            });
        }
    }

    out
}

/// Byte span of the first label occurrence, canonical or legacy. Legacy
/// tokens only count when their code is registered, so incidental prose like
/// `SHA-256` never becomes an insertion anchor. Used by the auto-fixer.
pub fn first_token_span(
    rules: &Ruleset,
    taxonomy: &Taxonomy,
    content: &str,
) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut bracketed: Vec<(usize, usize)> = Vec::new();

    for m in rules.bracketed.find_iter(content) {
        bracketed.push((m.start(), m.end()));
        if best.map(|(s, _)| m.start() < s).unwrap_or(true) {
            best = Some((m.start(), m.end()));
        }
    }
    for rule in &rules.migrations {
        for caps in rule.pattern.captures_iter(content) {
            let Some(whole) = caps.get(0) else { continue };
            if overlaps(&bracketed, whole.start(), whole.end()) {
                continue;
            }
            if !taxonomy.contains(&caps[1]) {
                continue;
            }
            if best.map(|(s, _)| whole.start() < s).unwrap_or(true) {
                best = Some((whole.start(), whole.end()));
            }
        }
    }
    best
}
