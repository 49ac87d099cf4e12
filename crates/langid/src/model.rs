//! Naive Bayes scoring over byte n-gram features.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::{debug, info};
use model_blob::{Layout, Matrix, ModelBlob};

use crate::LangIdError;

/// Model file contents: f32 scores, u16 automaton transitions.
pub type LangIdBlob = ModelBlob<f32, u16>;

/// Each automaton state owns one transition per input byte.
const STATE_WIDTH: usize = 256;

/// Class labels and the scores used to rank them.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub nb_classes: Vec<String>,
    /// Features x classes.
    pub nb_ptc: Matrix<f32>,
    /// One prior per class.
    pub nb_pc: Vec<f32>,
}

impl ModelData {
    fn select(&self, mask: &[bool]) -> Self {
        let keep = |i: &usize| mask[*i];
        Self {
            nb_classes: (0..self.nb_classes.len())
                .filter(keep)
                .map(|i| self.nb_classes[i].clone())
                .collect(),
            nb_ptc: self.nb_ptc.select_columns(mask),
            nb_pc: (0..self.nb_pc.len())
                .filter(keep)
                .map(|i| self.nb_pc[i])
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Model {
    tk_output: HashMap<u32, Vec<usize>>,
    tk_nextmove: Vec<u16>,
    nb_numfeats: usize,
    norm_probs: bool,
    data: ModelData,
    used_data: Option<ModelData>,
}

impl Model {
    /// Loads a little-endian raw model file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LangIdError> {
        Self::load_with(path, Layout::LEGACY)
    }

    pub fn load_with<P: AsRef<Path>>(path: P, layout: Layout) -> Result<Self, LangIdError> {
        Self::from_blob(model_blob::read_file(path, layout)?)
    }

    pub fn from_bytes(data: &[u8], layout: Layout) -> Result<Self, LangIdError> {
        Self::from_blob(model_blob::decode(data, layout)?)
    }

    /// Checks that the tables agree with each other and builds the model.
    pub fn from_blob(blob: LangIdBlob) -> Result<Self, LangIdError> {
        let ModelBlob {
            matrix: nb_ptc,
            vector: nb_pc,
            int_vector: tk_nextmove,
            strings: nb_classes,
            sparse,
        } = blob;

        if nb_pc.len() != nb_classes.len() {
            return Err(LangIdError::ClassCountMismatch {
                classes: nb_classes.len(),
                priors: nb_pc.len(),
            });
        }
        if nb_ptc.cols() != nb_classes.len() {
            return Err(LangIdError::MatrixShape {
                cols: nb_ptc.cols(),
                classes: nb_classes.len(),
            });
        }

        // Without columns the row count is not backed by any matrix data.
        if nb_ptc.cols() == 0 && nb_ptc.rows() > 0 {
            return Err(LangIdError::FeaturesWithoutClasses {
                features: nb_ptc.rows(),
            });
        }

        if tk_nextmove.is_empty() || tk_nextmove.len() % STATE_WIDTH != 0 {
            return Err(LangIdError::TransitionTable {
                len: tk_nextmove.len(),
            });
        }
        let states = tk_nextmove.len() / STATE_WIDTH;
        if let Some((index, &target)) = tk_nextmove
            .iter()
            .enumerate()
            .find(|&(_, &target)| target as usize >= states)
        {
            return Err(LangIdError::BadTransition {
                index,
                target,
                states,
            });
        }

        let nb_numfeats = nb_ptc.rows();
        let mut tk_output = HashMap::with_capacity(sparse.len());
        for (state, features) in sparse.iter() {
            let features = features
                .iter()
                .map(|&feature| {
                    usize::try_from(feature)
                        .ok()
                        .filter(|f| *f < nb_numfeats)
                        .ok_or(LangIdError::FeatureOutOfRange {
                            state,
                            feature,
                            features: nb_numfeats,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            // Repeated states: the last entry wins.
            tk_output.insert(state, features);
        }

        info!(
            "loaded model: {} classes, {} features, {} states",
            nb_classes.len(),
            nb_numfeats,
            states
        );
        Ok(Self {
            tk_output,
            tk_nextmove,
            nb_numfeats,
            norm_probs: false,
            data: ModelData {
                nb_classes,
                nb_ptc,
                nb_pc,
            },
            used_data: None,
        })
    }

    fn data(&self) -> &ModelData {
        self.used_data.as_ref().unwrap_or(&self.data)
    }

    /// Active class labels, in model order.
    pub fn classes(&self) -> &[String] {
        &self.data().nb_classes
    }

    pub fn num_features(&self) -> usize {
        self.nb_numfeats
    }

    /// Turns softmax normalisation of class scores on or off.
    pub fn set_norm_probs(&mut self, norm_probs: bool) {
        self.norm_probs = norm_probs;
    }

    /// Restricts classification to a subset of languages.
    ///
    /// `None` restores the full model. A subset needs at least two known
    /// languages.
    pub fn set_langs(&mut self, langs: Option<HashSet<String>>) -> Result<(), LangIdError> {
        let Some(langs) = langs else {
            self.used_data = None;
            return Ok(());
        };
        if langs.len() < 2 {
            return Err(LangIdError::NoLanguage);
        }
        if let Some(lang) = langs
            .iter()
            .find(|lang| !self.data.nb_classes.contains(*lang))
        {
            return Err(LangIdError::UnknownLanguageCode(lang.clone()));
        }
        let mask: Vec<bool> = self
            .data
            .nb_classes
            .iter()
            .map(|class| langs.contains(class))
            .collect();
        self.used_data = Some(self.data.select(&mask));
        debug!("restricted to {} languages", langs.len());
        Ok(())
    }

    /// Counts the features the automaton emits over the UTF-8 bytes of `text`.
    pub fn instance2fv(&self, text: &str) -> Vec<u32> {
        let mut fv = vec![0u32; self.nb_numfeats];
        let mut state = 0usize;
        for &byte in text.as_bytes() {
            state = self.tk_nextmove[(state * STATE_WIDTH) + byte as usize] as usize;
            if let Some(features) = self.tk_output.get(&(state as u32)) {
                for &feature in features {
                    fv[feature] += 1;
                }
            }
        }
        fv
    }

    /// `fv . nb_ptc + nb_pc`.
    pub fn nb_classprobs(&self, fv: &[u32]) -> Vec<f32> {
        let data = self.data();
        let mut pdc = vec![0f32; data.nb_pc.len()];
        for (row, &count) in data.nb_ptc.iter_rows().zip(fv) {
            if count == 0 {
                continue;
            }
            let count = count as f32;
            for (score, &weight) in pdc.iter_mut().zip(row) {
                *score += count * weight;
            }
        }
        for (score, &prior) in pdc.iter_mut().zip(&data.nb_pc) {
            *score += prior;
        }
        pdc
    }

    fn apply_norm_probs(&self, pd: Vec<f32>) -> Vec<f32> {
        if !self.norm_probs {
            return pd;
        }
        pd.iter()
            .map(|&own| 1.0 / pd.iter().map(|&other| (other - own).exp()).sum::<f32>())
            .collect()
    }

    fn scores(&self, text: &str) -> Vec<f32> {
        self.apply_norm_probs(self.nb_classprobs(&self.instance2fv(text)))
    }

    /// Returns every active language with its score, most likely first.
    pub fn rank(&self, text: &str) -> Vec<(&str, f32)> {
        let mut ranked: Vec<(&str, f32)> = self
            .classes()
            .iter()
            .map(String::as_str)
            .zip(self.scores(text))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    /// Returns the most likely language, or `None` for a model without classes.
    ///
    /// Ties go to the class listed first.
    pub fn classify(&self, text: &str) -> Option<(&str, f32)> {
        let scores = self.scores(text);
        let (index, score) = scores
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, score)| match best {
                Some((_, top)) if score <= top => best,
                _ => Some((i, score)),
            })?;
        self.classes()
            .get(index)
            .map(|class| (class.as_str(), score))
    }
}
