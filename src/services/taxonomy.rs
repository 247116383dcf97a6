use crate::cli::ComponentType;
use crate::domain::models::{CategoryRow, ComplyError};
use std::collections::HashSet;

/// One registry row. The table is embedded so every run sees the same
/// taxonomy with no external I/O.
pub struct CategorySpec {
    pub code: &'static str,
    pub name: &'static str,
    pub required_for: &'static [ComponentType],
    pub recommended_for: &'static [ComponentType],
}

const CATEGORIES: &[CategorySpec] = &[
    CategorySpec {
        code: "AIR",
        name: "AI Readiness",
        required_for: &[ComponentType::Ml, ComponentType::Core, ComponentType::Default],
        recommended_for: &[ComponentType::Api],
    },
    CategorySpec {
        code: "AIS",
        name: "AI Security",
        required_for: &[
            ComponentType::Bitcoin,
            ComponentType::Ml,
            ComponentType::Api,
            ComponentType::Dao,
        ],
        recommended_for: &[ComponentType::Web5, ComponentType::Core],
    },
    CategorySpec {
        code: "AIT",
        name: "AI Testing",
        required_for: &[ComponentType::Ml],
        recommended_for: &[ComponentType::Core],
    },
    CategorySpec {
        code: "BPC",
        name: "Bitcoin Protocol Compliance",
        required_for: &[ComponentType::Bitcoin],
        recommended_for: &[ComponentType::Core],
    },
    CategorySpec {
        code: "RES",
        name: "Resilience",
        required_for: &[ComponentType::Bitcoin, ComponentType::Core, ComponentType::Api],
        recommended_for: &[ComponentType::Dao],
    },
    CategorySpec {
        code: "SCL",
        name: "Scalability",
        required_for: &[ComponentType::Bitcoin, ComponentType::Api],
        recommended_for: &[ComponentType::Core],
    },
    CategorySpec {
        code: "W5C",
        name: "Web5 Compliance",
        required_for: &[ComponentType::Web5],
        recommended_for: &[],
    },
    CategorySpec {
        code: "DID",
        name: "Decentralized Identity",
        required_for: &[ComponentType::Web5],
        recommended_for: &[ComponentType::Api],
    },
    CategorySpec {
        code: "UXA",
        name: "UX Accessibility",
        required_for: &[ComponentType::Ui],
        recommended_for: &[],
    },
    CategorySpec {
        code: "PFM",
        name: "Performance",
        required_for: &[ComponentType::Ui],
        recommended_for: &[ComponentType::Api, ComponentType::Core],
    },
    CategorySpec {
        code: "DAO",
        name: "Governance",
        required_for: &[ComponentType::Dao],
        recommended_for: &[],
    },
];

/// Reduced required set applied to documentation files regardless of the
/// inferred component type.
const DOC_REQUIRED: &[&str] = &["AIR"];

/// Component inference rules, evaluated in this order, first match wins.
/// Needles match whole path tokens (segments split on `/ _ - . space`), not
/// raw substrings, so `main.rs` never hits the `ai` rule.
const INFERENCE_RULES: &[(&[&str], ComponentType)] = &[
    (&["bitcoin", "btc", "lightning", "lnd"], ComponentType::Bitcoin),
    (&["web5", "did", "dwn"], ComponentType::Web5),
    (&["ml", "ai", "model"], ComponentType::Ml),
    (&["ui", "frontend", "component"], ComponentType::Ui),
    (&["api", "service", "endpoint"], ComponentType::Api),
    (&["core", "system", "kernel"], ComponentType::Core),
    (&["dao", "governance", "vote"], ComponentType::Dao),
];

/// Immutable taxonomy registry. Loaded once per run, then shared read-only
/// across workers.
pub struct Taxonomy {
    categories: &'static [CategorySpec],
}

impl Taxonomy {
    pub fn load() -> Result<Taxonomy, ComplyError> {
        let mut seen = HashSet::new();
        for spec in CATEGORIES {
            let len_ok = (2..=5).contains(&spec.code.len());
            if !len_ok || !spec.code.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(ComplyError::Taxonomy(format!(
                    "category code {:?} is not 2-5 uppercase letters",
                    spec.code
                )));
            }
            if !seen.insert(spec.code) {
                return Err(ComplyError::Taxonomy(format!(
                    "duplicate category code {}",
                    spec.code
                )));
            }
            if spec
                .required_for
                .iter()
                .any(|c| spec.recommended_for.contains(c))
            {
                return Err(ComplyError::Taxonomy(format!(
                    "category {} is both required and recommended for a component",
                    spec.code
                )));
            }
        }
        for code in DOC_REQUIRED {
            if !seen.contains(code) {
                return Err(ComplyError::Taxonomy(format!(
                    "doc required set references unknown category {}",
                    code
                )));
            }
        }
        Ok(Taxonomy {
            categories: CATEGORIES,
        })
    }

    pub fn categories(&self) -> &'static [CategorySpec] {
        self.categories
    }

    pub fn contains(&self, code: &str) -> bool {
        self.categories.iter().any(|c| c.code == code)
    }

    /// Required categories for a component, in registry table order.
    pub fn required_for(&self, component: ComponentType) -> Vec<&'static str> {
        self.categories
            .iter()
            .filter(|c| c.required_for.contains(&component))
            .map(|c| c.code)
            .collect()
    }

    pub fn recommended_for(&self, component: ComponentType) -> Vec<&'static str> {
        self.categories
            .iter()
            .filter(|c| c.recommended_for.contains(&component))
            .map(|c| c.code)
            .collect()
    }

    pub fn doc_required(&self) -> Vec<&'static str> {
        DOC_REQUIRED.to_vec()
    }

    pub fn rows(&self) -> Vec<CategoryRow> {
        self.categories()
            .iter()
            .map(|c| CategoryRow {
                code: c.code.to_string(),
                name: c.name.to_string(),
                required_for: c.required_for.iter().map(|t| t.as_str().to_string()).collect(),
                recommended_for: c
                    .recommended_for
                    .iter()
                    .map(|t| t.as_str().to_string())
                    .collect(),
            })
            .collect()
    }
}

pub fn infer_component(path: &str) -> ComponentType {
    let lower = path.to_ascii_lowercase().replace('\\', "/");
    let tokens: Vec<&str> = lower
        .split(['/', '_', '-', '.', ' '])
        .filter(|t| !t.is_empty())
        .collect();
    for (needles, component) in INFERENCE_RULES {
        if tokens.iter().any(|t| needles.contains(t)) {
            return *component;
        }
    }
    ComponentType::Default
}
