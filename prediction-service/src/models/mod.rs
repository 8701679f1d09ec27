pub mod features;

pub use features::{
    FeatureVector, FEATURE_COLUMNS, GENDER_COLUMN, NUMERIC_COLUMNS, N_FEATURES, N_NUMERIC,
};
