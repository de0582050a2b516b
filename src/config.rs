use std::env;
use std::path::PathBuf;

pub const DEFAULT_REGION: &str = "us-east-2";
pub const DEFAULT_KNOWLEDGE_BASE_ID: &str = "MAKZOATKHX";
pub const DEFAULT_MODEL_ARN: &str =
    "arn:aws:bedrock:us-east-2::foundation-model/anthropic.claude-3-haiku-20240307-v1:0";

#[derive(Clone, Debug)]
pub struct KnowledgeBaseConfig {
    pub region: String,
    pub knowledge_base_id: String,
    pub model_arn: String,
}

impl KnowledgeBaseConfig {
    /// Replaces the knowledge-base id and model ARN where an override is given.
    pub fn with_overrides(
        mut self,
        knowledge_base_id: Option<String>,
        model_arn: Option<String>,
    ) -> Self {
        if let Some(id) = knowledge_base_id {
            self.knowledge_base_id = id;
        }
        if let Some(arn) = model_arn {
            self.model_arn = arn;
        }
        self
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub static_dir: PathBuf,
    pub knowledge_base: KnowledgeBaseConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("AURA_BOT_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            static_dir: env::var("AURA_BOT_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./static")),
            knowledge_base: KnowledgeBaseConfig {
                region: env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
                knowledge_base_id: env::var("BEDROCK_KB_ID")
                    .unwrap_or_else(|_| DEFAULT_KNOWLEDGE_BASE_ID.to_string()),
                model_arn: env::var("MODEL_ARN").unwrap_or_else(|_| DEFAULT_MODEL_ARN.to_string()),
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            static_dir: PathBuf::from("./static"),
            knowledge_base: KnowledgeBaseConfig {
                region: DEFAULT_REGION.to_string(),
                knowledge_base_id: DEFAULT_KNOWLEDGE_BASE_ID.to_string(),
                model_arn: DEFAULT_MODEL_ARN.to_string(),
            },
        }
    }
}
