use std::collections::BTreeMap;
use std::fmt;

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Element types the pipeline exchanges with the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    I64,
    F32,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DType::I64 => write!(f, "i64"),
            DType::F32 => write!(f, "f32"),
        }
    }
}

/// A dense n-dimensional array tagged with its element type
#[derive(Debug, Clone, PartialEq)]
pub enum TensorValue {
    I64(ArrayD<i64>),
    F32(ArrayD<f32>),
}

impl TensorValue {
    /// Build an i64 tensor from flat data, checking the element count against the shape
    pub fn from_i64(shape: &[usize], data: Vec<i64>) -> Result<Self> {
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(TensorValue::I64)
            .map_err(|e| PipelineError::Execute(format!("bad i64 tensor shape {:?}: {}", shape, e)))
    }

    /// Build an f32 tensor from flat data, checking the element count against the shape
    pub fn from_f32(shape: &[usize], data: Vec<f32>) -> Result<Self> {
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(TensorValue::F32)
            .map_err(|e| PipelineError::Execute(format!("bad f32 tensor shape {:?}: {}", shape, e)))
    }

    pub fn dtype(&self) -> DType {
        match self {
            TensorValue::I64(_) => DType::I64,
            TensorValue::F32(_) => DType::F32,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            TensorValue::I64(a) => a.shape(),
            TensorValue::F32(a) => a.shape(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TensorValue::I64(a) => a.len(),
            TensorValue::F32(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_i64(&self) -> Option<&ArrayD<i64>> {
        match self {
            TensorValue::I64(a) => Some(a),
            TensorValue::F32(_) => None,
        }
    }

    pub fn as_f32(&self) -> Option<&ArrayD<f32>> {
        match self {
            TensorValue::F32(a) => Some(a),
            TensorValue::I64(_) => None,
        }
    }
}

/// Serialized form of a tensor, used by the example-input file and the HTTP API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dtype", rename_all = "lowercase")]
pub enum TensorRecord {
    I64 { shape: Vec<usize>, data: Vec<i64> },
    F32 { shape: Vec<usize>, data: Vec<f32> },
}

impl From<&TensorValue> for TensorRecord {
    fn from(value: &TensorValue) -> Self {
        // Iteration is in logical (row-major) order regardless of memory layout
        match value {
            TensorValue::I64(a) => TensorRecord::I64 {
                shape: a.shape().to_vec(),
                data: a.iter().copied().collect(),
            },
            TensorValue::F32(a) => TensorRecord::F32 {
                shape: a.shape().to_vec(),
                data: a.iter().copied().collect(),
            },
        }
    }
}

impl TryFrom<TensorRecord> for TensorValue {
    type Error = PipelineError;

    fn try_from(record: TensorRecord) -> Result<Self> {
        match record {
            TensorRecord::I64 { shape, data } => TensorValue::from_i64(&shape, data),
            TensorRecord::F32 { shape, data } => TensorValue::from_f32(&shape, data),
        }
    }
}

/// Mapping from tensor name to value, used for both model inputs and outputs.
///
/// Backed by a `BTreeMap` so iteration order (and therefore any serialized
/// form) is stable from run to run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedTensorMap {
    tensors: BTreeMap<String, TensorValue>,
}

impl NamedTensorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: TensorValue) -> Option<TensorValue> {
        self.tensors.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&TensorValue> {
        self.tensors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tensors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tensors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TensorValue)> {
        self.tensors.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Keep only the tensors whose names satisfy `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.tensors.retain(|name, _| keep(name));
    }

    pub fn to_records(&self) -> BTreeMap<String, TensorRecord> {
        self.tensors
            .iter()
            .map(|(name, value)| (name.clone(), TensorRecord::from(value)))
            .collect()
    }

    pub fn from_records(records: BTreeMap<String, TensorRecord>) -> Result<Self> {
        let mut map = Self::new();
        for (name, record) in records {
            map.insert(name, TensorValue::try_from(record)?);
        }
        Ok(map)
    }
}

impl IntoIterator for NamedTensorMap {
    type Item = (String, TensorValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, TensorValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.tensors.into_iter()
    }
}
