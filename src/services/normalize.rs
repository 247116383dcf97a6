use crate::domain::models::{Label, LegacyScheme, RawToken};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("value {value} outside the declared domain of {scheme}")]
    OutOfDomain { scheme: &'static str, value: u32 },
}

/// Sequential-numeric tokens carry a three-digit ordinal (domain 0..=999).
/// Mapping: <=2 -> 1, 3..=4 -> 2, >=5 -> 3.
pub fn sequential_to_level(value: u32) -> Result<u8, NormalizeError> {
    match value {
        0..=2 => Ok(1),
        3..=4 => Ok(2),
        5..=999 => Ok(3),
        _ => Err(NormalizeError::OutOfDomain {
            scheme: LegacyScheme::SequentialNumeric.as_str(),
            value,
        }),
    }
}

/// Five-level scale (domain 1..=5) onto the 0..=3 scale:
/// {1->0, 2->1, 3->1, 4->2, 5->3}.
pub fn five_level_to_level(value: u32) -> Result<u8, NormalizeError> {
    match value {
        1 => Ok(0),
        2 | 3 => Ok(1),
        4 => Ok(2),
        5 => Ok(3),
        _ => Err(NormalizeError::OutOfDomain {
            scheme: LegacyScheme::FiveLevelScale.as_str(),
            value,
        }),
    }
}

/// Resolve a legacy token to its canonical label. Parenthesized tokens share
/// the sequential mapping and are rendered in bracket form on output like
/// every other label. Out-of-domain values are errors, never clamped.
pub fn normalize(token: &RawToken) -> Result<Label, NormalizeError> {
    let level = match token.scheme {
        LegacyScheme::SequentialNumeric | LegacyScheme::ParenthesizedSequential => {
            sequential_to_level(token.value)?
        }
        LegacyScheme::FiveLevelScale => five_level_to_level(token.value)?,
    };
    Ok(Label::new(token.category.clone(), level))
}
