//! Survey feature layout shared by the scaler, the model and request parsing.

/// Columns in the order the scaler and model were fitted with.
pub const FEATURE_COLUMNS: [&str; N_FEATURES] = [
    "age",
    "gender",
    "tech_spend",
    "music_freq",
    "sports_hours",
    "business_interest",
    "edu_freq",
    "food_interest",
    "health_priority",
];

/// The scaled subset of [`FEATURE_COLUMNS`], order preserved.
pub const NUMERIC_COLUMNS: [&str; N_NUMERIC] = [
    "age",
    "tech_spend",
    "music_freq",
    "sports_hours",
    "business_interest",
    "edu_freq",
    "food_interest",
    "health_priority",
];

pub const GENDER_COLUMN: &str = "gender";

pub const N_FEATURES: usize = 9;
pub const N_NUMERIC: usize = 8;

/// Position of `gender` inside the assembled model input.
const GENDER_INDEX: usize = 1;

/// One validated survey submission, before encoding and scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub gender: String,
    /// Values for [`NUMERIC_COLUMNS`], same order.
    pub numeric: [f64; N_NUMERIC],
}

/// Interleave the encoded gender with the scaled numeric values so the
/// result lines up with [`FEATURE_COLUMNS`].
pub fn assemble(gender_code: usize, scaled: &[f64; N_NUMERIC]) -> [f64; N_FEATURES] {
    let mut out = [0.0; N_FEATURES];
    out[..GENDER_INDEX].copy_from_slice(&scaled[..GENDER_INDEX]);
    out[GENDER_INDEX] = gender_code as f64;
    out[GENDER_INDEX + 1..].copy_from_slice(&scaled[GENDER_INDEX..]);
    out
}
