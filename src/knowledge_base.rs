use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_bedrockagentruntime::types::{
    KnowledgeBaseRetrieveAndGenerateConfiguration, RetrieveAndGenerateConfiguration,
    RetrieveAndGenerateInput, RetrieveAndGenerateType,
};
use aws_sdk_bedrockagentruntime::Client;
use aws_smithy_types::error::display::DisplayErrorContext;

use crate::config::KnowledgeBaseConfig;
use crate::models::{GeneratedOutput, RetrieveAndGenerateRequest, RetrieveAndGenerateResponse};

/// A managed knowledge base that retrieves passages and synthesizes an answer.
///
/// Implementations must be safe to call from many in-flight requests at once.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn retrieve_and_generate(
        &self,
        request: RetrieveAndGenerateRequest,
    ) -> Result<RetrieveAndGenerateResponse>;
}

/// Bedrock Agent Runtime `RetrieveAndGenerate` against a `KNOWLEDGE_BASE` source.
#[derive(Clone)]
pub struct BedrockKnowledgeBase {
    client: Client,
}

impl BedrockKnowledgeBase {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Resolves credentials from the default provider chain for the configured region.
    pub async fn from_config(config: &KnowledgeBaseConfig) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;
        Self::new(Client::new(&sdk_config))
    }
}

#[async_trait]
impl KnowledgeBase for BedrockKnowledgeBase {
    async fn retrieve_and_generate(
        &self,
        request: RetrieveAndGenerateRequest,
    ) -> Result<RetrieveAndGenerateResponse> {
        let input = RetrieveAndGenerateInput::builder()
            .text(request.question)
            .build()
            .context("failed to build retrieve-and-generate input")?;

        let knowledge_base = KnowledgeBaseRetrieveAndGenerateConfiguration::builder()
            .knowledge_base_id(&request.knowledge_base_id)
            .model_arn(&request.model_arn)
            .build()
            .context("failed to build knowledge base configuration")?;

        let configuration = RetrieveAndGenerateConfiguration::builder()
            .r#type(RetrieveAndGenerateType::KnowledgeBase)
            .knowledge_base_configuration(knowledge_base)
            .build()
            .context("failed to build retrieve-and-generate configuration")?;

        tracing::debug!(
            knowledge_base_id = %request.knowledge_base_id,
            model_arn = %request.model_arn,
            "calling bedrock retrieve_and_generate"
        );

        let response = self
            .client
            .retrieve_and_generate()
            .input(input)
            .retrieve_and_generate_configuration(configuration)
            .send()
            .await
            .map_err(|err| anyhow::anyhow!("{}", DisplayErrorContext(&err)))?;

        Ok(RetrieveAndGenerateResponse {
            output: response.output().map(|output| GeneratedOutput {
                text: output.text().to_string(),
            }),
        })
    }
}
