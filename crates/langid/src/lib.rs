//! Language identification over a model-blob file.
//!
//! The blob sections map onto a byte n-gram naive Bayes model:
//!
//! - matrix: per-feature, per-class log-probabilities (`nb_ptc`)
//! - vector: per-class priors (`nb_pc`)
//! - int vector: the n-gram automaton, 256 transitions per state (`tk_nextmove`)
//! - string table: class labels, indexed like the matrix columns (`nb_classes`)
//! - sparse table: features emitted on entering each state (`tk_output`)
//!
//! # Example
//!
//! ```no_run
//! use model_blob_langid::Model;
//!
//! let model = Model::load("model.bin").unwrap();
//! if let Some((lang, score)) = model.classify("This text is in English.") {
//!     println!("{} {}", lang, score);
//! }
//! ```

mod error;
mod model;

pub use error::LangIdError;
pub use model::{LangIdBlob, Model, ModelData};
