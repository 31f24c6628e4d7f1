mod engine;

pub use engine::{OrtEngine, OrtModel};
