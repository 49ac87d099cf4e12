//! Language identifier error type.

use model_blob::BlobError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LangIdError {
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error("at least two languages must be selected")]
    NoLanguage,
    #[error("unknown language code `{0}`")]
    UnknownLanguageCode(String),
    #[error("{classes} class labels but {priors} class priors")]
    ClassCountMismatch { classes: usize, priors: usize },
    #[error("feature matrix has {cols} columns for {classes} classes")]
    MatrixShape { cols: usize, classes: usize },
    #[error("feature matrix has {features} rows but no class columns")]
    FeaturesWithoutClasses { features: usize },
    #[error("transition table of {len} entries is not a whole number of 256-entry states")]
    TransitionTable { len: usize },
    #[error("transition {index} targets state {target}, only {states} states exist")]
    BadTransition {
        index: usize,
        target: u16,
        states: usize,
    },
    #[error("state {state} emits feature {feature}, only {features} features exist")]
    FeatureOutOfRange {
        state: u32,
        feature: i32,
        features: usize,
    },
}
