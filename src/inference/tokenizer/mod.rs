mod tokenizer;
pub mod types;

pub use tokenizer::{Preprocessor, ATTENTION_MASK, INPUT_IDS, TOKEN_TYPE_IDS};
pub use types::{determine_tokenizer_type, TokenizerType};
