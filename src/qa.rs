use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;

use crate::config::KnowledgeBaseConfig;
use crate::knowledge_base::KnowledgeBase;
use crate::models::{RetrieveAndGenerateRequest, RetrieveAndGenerateResponse};

pub const MISSING_QUESTION_MESSAGE: &str = "Missing question";

#[derive(Debug, Error)]
pub enum AskError {
    /// The question was absent or empty; nothing was sent upstream.
    #[error("{}", MISSING_QUESTION_MESSAGE)]
    MissingQuestion,
    #[error("{0:#}")]
    Upstream(anyhow::Error),
}

#[derive(Clone)]
pub struct AskService {
    knowledge_base: Arc<dyn KnowledgeBase>,
    knowledge_base_id: String,
    model_arn: String,
}

impl AskService {
    pub fn new(knowledge_base: Arc<dyn KnowledgeBase>, config: &KnowledgeBaseConfig) -> Self {
        Self {
            knowledge_base,
            knowledge_base_id: config.knowledge_base_id.clone(),
            model_arn: config.model_arn.clone(),
        }
    }

    pub async fn answer(&self, question: Option<&str>) -> Result<String, AskError> {
        let question = match question {
            Some(q) if !q.is_empty() => q,
            _ => return Err(AskError::MissingQuestion),
        };

        tracing::debug!(
            question_chars = question.chars().count(),
            knowledge_base_id = %self.knowledge_base_id,
            "forwarding question to knowledge base"
        );

        let request = RetrieveAndGenerateRequest {
            question: question.to_string(),
            knowledge_base_id: self.knowledge_base_id.clone(),
            model_arn: self.model_arn.clone(),
        };

        let response = self
            .knowledge_base
            .retrieve_and_generate(request)
            .await
            .map_err(AskError::Upstream)?;

        extract_answer(response).map_err(AskError::Upstream)
    }
}

pub fn extract_answer(response: RetrieveAndGenerateResponse) -> Result<String> {
    response
        .output
        .map(|output| output.text)
        .ok_or_else(|| anyhow::anyhow!("knowledge base response is missing output.text"))
}
