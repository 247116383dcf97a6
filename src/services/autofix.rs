use crate::domain::models::Label;
use crate::services::extract::{self, Ruleset};
use crate::services::taxonomy::Taxonomy;
use std::collections::HashSet;

pub struct FixPlan {
    pub content: String,
    pub inserted: Vec<Label>,
}

enum CommentStyle {
    Line(&'static str),
    Block(&'static str, &'static str),
}

/// Leading-doc-comment convention per extension. One table instead of
/// per-extension branches scattered through the fixer.
fn comment_style(extension: &str) -> Option<CommentStyle> {
    match extension {
        "rs" | "c" | "h" | "cpp" | "js" | "ts" | "jsx" | "tsx" | "go" | "java" | "kt" => {
            Some(CommentStyle::Line("//"))
        }
        "py" | "sh" | "rb" | "toml" | "yaml" | "yml" => Some(CommentStyle::Line("#")),
        "html" | "xml" => Some(CommentStyle::Block("<!--", "-->")),
        _ => None,
    }
}

/// Plan the insertion of missing required labels. Pure: the scanner owns
/// the write. Insertion policy, first applicable rule wins:
///
/// 1. an existing label occurrence (canonical or legacy) anchors the new
///    tokens right after it, keeping compliance markers co-located;
/// 2. a known leading-comment convention gets a new comment line after the
///    existing leading comment block (or at the top if there is none);
/// 3. otherwise the tokens become the first line of the file.
///
/// The missing set is re-derived against the content, so a category already
/// present is never inserted twice and re-running on fixed output is a
/// byte-identical no-op. Only ever adds content.
pub fn autofix(
    rules: &Ruleset,
    taxonomy: &Taxonomy,
    content: &str,
    extension: &str,
    missing: &[String],
    default_level: u8,
) -> FixPlan {
    let extraction = extract::extract(rules, content);
    let mut present: HashSet<String> = extraction
        .labels
        .iter()
        .map(|l| l.category.clone())
        .collect();
    for token in &extraction.legacy {
        present.insert(token.category.clone());
    }

    let mut to_add: Vec<String> = missing
        .iter()
        .filter(|code| !present.contains(*code))
        .cloned()
        .collect();
    to_add.sort();
    to_add.dedup();
    if to_add.is_empty() {
        return FixPlan {
            content: content.to_string(),
            inserted: Vec::new(),
        };
    }

    let inserted: Vec<Label> = to_add
        .into_iter()
        .map(|code| Label::new(code, default_level))
        .collect();
    let tokens = inserted
        .iter()
        .map(Label::canonical)
        .collect::<Vec<_>>()
        .join(" ");

    let content = if let Some((_, end)) = extract::first_token_span(rules, taxonomy, content) {
        format!("{} {}{}", &content[..end], tokens, &content[end..])
    } else if let Some(style) = comment_style(extension) {
        match style {
            CommentStyle::Line(prefix) => {
                let offset = leading_comment_end(content, prefix);
                format!(
                    "{}{} {}\n{}",
                    &content[..offset],
                    prefix,
                    tokens,
                    &content[offset..]
                )
            }
            CommentStyle::Block(open, close) => {
                format!("{} {} {}\n{}", open, tokens, close, content)
            }
        }
    } else {
        format!("{}\n{}", tokens, content)
    };

    FixPlan { content, inserted }
}

/// Byte offset just past the leading comment block (shebang included).
fn leading_comment_end(content: &str, prefix: &str) -> usize {
    let mut offset = 0;
    let mut first = true;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let shebang = first && trimmed.starts_with("#!");
        first = false;
        if shebang || trimmed.starts_with(prefix) {
            offset += line.len();
        } else {
            break;
        }
    }
    offset
}
