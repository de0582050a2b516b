use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use aura_bot::knowledge_base::BedrockKnowledgeBase;
use aura_bot::qa::AskService;
use aura_bot::{run_server, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env();
    tracing::info!(
        region = %config.knowledge_base.region,
        knowledge_base_id = %config.knowledge_base.knowledge_base_id,
        model_arn = %config.knowledge_base.model_arn,
        "using bedrock knowledge base"
    );

    let knowledge_base = BedrockKnowledgeBase::from_config(&config.knowledge_base).await;
    let ask = AskService::new(Arc::new(knowledge_base), &config.knowledge_base);

    run_server(config, ask).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
