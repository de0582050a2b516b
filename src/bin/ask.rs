use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use aura_bot::config::AppConfig;
use aura_bot::knowledge_base::BedrockKnowledgeBase;
use aura_bot::qa::AskService;

#[derive(Parser, Debug)]
#[command(name = "ask")]
#[command(about = "Ask the configured Bedrock knowledge base a single question")]
struct Cli {
    /// Question text; multiple words are joined with spaces.
    #[arg(required = true)]
    question: Vec<String>,
    /// Override BEDROCK_KB_ID for this run.
    #[arg(long)]
    knowledge_base_id: Option<String>,
    /// Override MODEL_ARN for this run.
    #[arg(long)]
    model_arn: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = AppConfig::from_env()
        .knowledge_base
        .with_overrides(cli.knowledge_base_id, cli.model_arn);

    let knowledge_base = BedrockKnowledgeBase::from_config(&config).await;
    let ask = AskService::new(Arc::new(knowledge_base), &config);

    let question = cli.question.join(" ");
    let answer = ask.answer(Some(&question)).await?;
    println!("{answer}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
