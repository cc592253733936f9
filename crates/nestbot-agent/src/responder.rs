//! Grounded answer generation.
//!
//! Only questions that hit the knowledge base reach the model, and the model
//! only sees the matched facts. The model can still decline by answering the
//! sentinel word `none` (any case, surrounding whitespace ignored), which is
//! treated exactly like "no knowledge found".

use std::sync::Arc;

use nestbot_core::config::NestBotConfig;
use nestbot_core::error::Result;
use nestbot_core::types::{CompletionRequest, CompletionResponse};
use nestbot_knowledge::{KnowledgeBase, find_relevant_knowledge, summarize_knowledge};
use nestbot_providers::InferencePool;

/// Model output meaning "nothing grounded to say".
pub const NO_ANSWER_SENTINEL: &str = "none";

/// Generation stops at the next question or at a blank line.
pub const STOP_SEQUENCES: [&str; 2] = ["Question:", "\n\n"];

pub struct Responder {
    knowledge: Arc<KnowledgeBase>,
    inference: InferencePool,
    persona: String,
    max_tokens: u32,
    temperature: f32,
    context_budget: usize,
}

impl Responder {
    pub fn new(config: &NestBotConfig, knowledge: Arc<KnowledgeBase>, inference: InferencePool) -> Self {
        Self {
            knowledge,
            inference,
            persona: config.identity.persona.clone(),
            max_tokens: config.brain.max_tokens,
            temperature: config.brain.temperature,
            context_budget: config.brain.context_budget,
        }
    }

    /// Answer `question`, or `None` when there is nothing grounded to say.
    /// Errors are logged and reported as `None`.
    pub async fn generate_response(&self, question: &str) -> Option<String> {
        match self.try_generate(question).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Error generating response: {e}");
                None
            }
        }
    }

    async fn try_generate(&self, question: &str) -> Result<Option<String>> {
        tracing::info!("Generating response for question: {question}");

        let relevant = find_relevant_knowledge(&self.knowledge, question);
        if relevant.is_empty() {
            tracing::info!("No relevant knowledge found");
            return Ok(None);
        }

        let digest = summarize_knowledge(&relevant);
        if digest.chars().count() > self.context_budget {
            tracing::debug!(
                "Knowledge digest is {} chars, over the {} char budget",
                digest.chars().count(),
                self.context_budget
            );
        }

        let prompt = build_prompt(&self.persona, &digest, question);
        tracing::info!("Prompt length: {}", prompt.len());

        let request = CompletionRequest {
            prompt,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stop: STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
            echo: false,
        };

        let response = self.inference.complete(request).await?;
        Ok(extract_answer(&response))
    }
}

/// Fixed prompt: persona, digest, the raw question, and the answer format.
pub fn build_prompt(persona: &str, digest: &str, question: &str) -> String {
    format!(
        "You are a {persona}. Based on this knowledge: {digest}\n\
         Question: {question}\n\
         Give a SIMPLE YET CONCISE answer (3-4 sentences max) and give a simple explanation/solution:"
    )
}

/// First choice, trimmed. Empty output and the sentinel mean no answer.
pub fn extract_answer(response: &CompletionResponse) -> Option<String> {
    let answer = response.first_text()?.trim();
    if answer.is_empty() || answer.eq_ignore_ascii_case(NO_ANSWER_SENTINEL) {
        return None;
    }
    Some(answer.to_string())
}
