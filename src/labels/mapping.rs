use std::collections::BTreeMap;

use tracing::debug;

use super::prediction::{LabelScore, Prediction};
use crate::error::{PipelineError, Result};
use crate::hub::{ModelBundle, ModelConfigFile};
use crate::tensor::TensorValue;

/// Class index to label, read once from the model configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMapping {
    labels: BTreeMap<usize, String>,
}

impl LabelMapping {
    /// Labels in index order: the first label is class 0
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).enumerate().collect(),
        }
    }

    pub fn from_config(config: &ModelConfigFile) -> Result<Self> {
        let mut labels = BTreeMap::new();
        for (key, label) in &config.id2label {
            let index = key.trim().parse::<usize>().map_err(|_| {
                PipelineError::Decode(format!("id2label key '{}' is not a class index", key))
            })?;
            labels.insert(index, label.clone());
        }
        Ok(Self { labels })
    }

    pub fn from_bundle(bundle: &ModelBundle) -> Result<Self> {
        let config = ModelConfigFile::read(&bundle.config_path())?;
        let mapping = Self::from_config(&config)?;
        debug!("Loaded {} labels for '{}'", mapping.len(), bundle.model_id);
        Ok(mapping)
    }

    /// The label for `index`; classes the configuration does not name get `LABEL_<index>`
    pub fn label(&self, index: usize) -> String {
        self.labels
            .get(&index)
            .cloned()
            .unwrap_or_else(|| format!("LABEL_{}", index))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.labels.iter().map(|(i, l)| (*i, l.as_str()))
    }

    /// Decodes the first row of a logits tensor of shape `[.., classes]`
    pub fn decode(&self, logits: &TensorValue) -> Result<Prediction> {
        let array = logits.as_f32().ok_or_else(|| {
            PipelineError::Decode(format!("logits must be f32, got {}", logits.dtype()))
        })?;
        let classes = *array
            .shape()
            .last()
            .ok_or_else(|| PipelineError::Decode("logits tensor has no class axis".to_string()))?;

        let row: Vec<f32> = array.iter().take(classes).copied().collect();
        self.decode_row(&row)
    }

    /// Picks the highest scoring class; ties go to the lowest index
    pub fn decode_row(&self, logits: &[f32]) -> Result<Prediction> {
        let index = argmax(logits).ok_or_else(|| {
            PipelineError::Decode(format!("no usable logits in {:?}", logits))
        })?;
        let probabilities = softmax(logits);

        let scores = probabilities
            .iter()
            .enumerate()
            .map(|(i, &score)| LabelScore {
                label: self.label(i),
                score,
            })
            .collect();

        Ok(Prediction {
            label: self.label(index),
            index,
            score: probabilities[index],
            scores,
        })
    }
}

/// Index of the first maximum, ignoring NaN entries
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Numerically stable softmax. Infinite logits are clamped to the finite
/// range and NaN entries get zero probability.
pub fn softmax(values: &[f32]) -> Vec<f32> {
    let clamped: Vec<f32> = values.iter().map(|v| v.clamp(f32::MIN, f32::MAX)).collect();
    let max = clamped
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = clamped
        .iter()
        .map(|&v| if v.is_nan() { 0.0 } else { (v - max).exp() })
        .collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_of_equal_maxima() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[5.0, 5.0]), Some(0));
    }

    #[test]
    fn argmax_skips_nan_and_handles_empty() {
        assert_eq!(argmax(&[f32::NAN, -1.0, f32::NAN]), Some(1));
        assert_eq!(argmax(&[f32::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn softmax_sums_to_one() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        let total: f32 = p.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(p[2] > p[1] && p[1] > p[0]);
    }

    #[test]
    fn softmax_survives_infinite_logits() {
        let p = softmax(&[1.0, f32::INFINITY, f32::NEG_INFINITY, f32::NAN]);
        assert!(p.iter().all(|v| !v.is_nan()), "{:?}", p);
        assert_eq!(p, vec![0.0, 1.0, 0.0, 0.0]);

        let prediction = LabelMapping::from_labels(["a", "b"]).decode_row(&[f32::INFINITY, 0.5]).unwrap();
        assert_eq!(prediction.index, 0);
        assert_eq!(prediction.score, 1.0);
    }

    #[test]
    fn unnamed_classes_fall_back_to_generic_labels() {
        let mapping = LabelMapping::from_labels(["negative"]);
        assert_eq!(mapping.label(0), "negative");
        assert_eq!(mapping.label(3), "LABEL_3");
    }

    #[test]
    fn config_keys_must_be_indices() {
        let config: ModelConfigFile =
            serde_json::from_str(r#"{"id2label": {"zero": "negative"}}"#).unwrap();
        assert!(matches!(LabelMapping::from_config(&config), Err(PipelineError::Decode(_))));
    }
}
