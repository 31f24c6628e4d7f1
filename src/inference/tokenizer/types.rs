use std::fmt;

/// Tokenizer families the preprocessor distinguishes between.
///
/// The family decides which tensors are fed to the model: BERT-style
/// encoders take segment ids, RoBERTa-style and DistilBERT encoders do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerType {
    /// BERT style WordPiece tokenizer with segment ids
    BERT,
    /// DistilBERT WordPiece tokenizer, no segment ids
    DistilBERT,
    /// RoBERTa style byte-level BPE tokenizer
    RoBERTa,
    /// XLM-RoBERTa style SentencePiece tokenizer
    XLMRoBERTa,
    /// Anything else; emits every tensor the tokenizer produces
    Generic,
}

impl TokenizerType {
    /// Whether `token_type_ids` is part of the produced tensor map
    pub fn uses_token_type_ids(self) -> bool {
        matches!(self, TokenizerType::BERT | TokenizerType::Generic)
    }
}

impl fmt::Display for TokenizerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizerType::BERT => write!(f, "BERT"),
            TokenizerType::DistilBERT => write!(f, "DistilBERT"),
            TokenizerType::RoBERTa => write!(f, "RoBERTa"),
            TokenizerType::XLMRoBERTa => write!(f, "XLM-RoBERTa"),
            TokenizerType::Generic => write!(f, "Generic"),
        }
    }
}

/// Determines the tokenizer type from `model_type`, falling back to the
/// architecture class names of `config.json`
pub fn determine_tokenizer_type(model_type: Option<&str>, architectures: &[String]) -> TokenizerType {
    if let Some(model_type) = model_type {
        match model_type.to_lowercase().as_str() {
            "bert" | "albert" | "electra" | "mobilebert" => return TokenizerType::BERT,
            "distilbert" => return TokenizerType::DistilBERT,
            "roberta" | "camembert" => return TokenizerType::RoBERTa,
            "xlm-roberta" => return TokenizerType::XLMRoBERTa,
            _ => {}
        }
    }

    // If not specified, infer from the architecture class name
    for arch in architectures {
        let arch = arch.to_lowercase();
        if arch.starts_with("distilbert") {
            return TokenizerType::DistilBERT;
        }
        if arch.starts_with("xlmroberta") {
            return TokenizerType::XLMRoBERTa;
        }
        if arch.starts_with("roberta") {
            return TokenizerType::RoBERTa;
        }
        if arch.starts_with("bert") {
            return TokenizerType::BERT;
        }
    }

    TokenizerType::Generic
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_type_wins_over_architectures() {
        let archs = vec!["BertForSequenceClassification".to_string()];
        assert_eq!(determine_tokenizer_type(Some("roberta"), &archs), TokenizerType::RoBERTa);
        assert_eq!(determine_tokenizer_type(Some("DistilBERT"), &[]), TokenizerType::DistilBERT);
    }

    #[test]
    fn falls_back_to_architecture_names() {
        let archs = vec!["XLMRobertaForSequenceClassification".to_string()];
        assert_eq!(determine_tokenizer_type(None, &archs), TokenizerType::XLMRoBERTa);

        let archs = vec!["BertForSequenceClassification".to_string()];
        assert_eq!(determine_tokenizer_type(Some("custom"), &archs), TokenizerType::BERT);

        assert_eq!(determine_tokenizer_type(None, &[]), TokenizerType::Generic);
    }

    #[test]
    fn only_bert_style_models_take_segment_ids() {
        assert!(TokenizerType::BERT.uses_token_type_ids());
        assert!(!TokenizerType::RoBERTa.uses_token_type_ids());
        assert!(!TokenizerType::DistilBERT.uses_token_type_ids());
    }
}
