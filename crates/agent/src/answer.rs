//! Answer composer: grounds a reply in retrieved knowledge records.
//!
//! # Flow
//!
//! 1. Retrieve the five nearest records for the question
//! 2. No records: return a fixed hint, no generation call
//! 3. Otherwise render the records into a prompt that restricts the model
//!    to the retrieved content, and return its reply

use cityguide_core::knowledge::{RetrievalHit, Retriever};
use cityguide_core::message::Message;
use cityguide_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use tracing::{debug, info};

use crate::persona::persona;

/// Records retrieved per question.
const TOP_K: usize = 5;

pub const FORMAT_FALLBACK: &str = "I found results but failed to format an answer.";

pub struct AnswerComposer {
    retriever: Arc<dyn Retriever>,
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    city: String,
}

impl AnswerComposer {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        city: impl Into<String>,
    ) -> Self {
        Self {
            retriever,
            provider,
            model: model.into(),
            temperature,
            city: city.into(),
        }
    }

    /// Reply used when nothing relevant is indexed.
    pub fn no_results_message(&self) -> String {
        format!(
            "I couldn't find anything relevant in the local {} knowledge base. \
             Try asking with a neighborhood (Downtown, North York, Scarborough) or a category (museum/food/park).",
            self.city
        )
    }

    pub async fn answer(&self, question: &str) -> Result<String, cityguide_core::Error> {
        let hits = self.retriever.retrieve(question, TOP_K).await?;
        if hits.is_empty() {
            info!("No knowledge records matched");
            return Ok(self.no_results_message());
        }
        debug!(hits = hits.len(), "Composing grounded answer");

        let request = ProviderRequest::new(
            self.model.clone(),
            vec![
                Message::system(persona(&self.city)),
                Message::user(grounding_prompt(question, &hits)),
            ],
            self.temperature,
        );
        let response = self.provider.complete(request).await?;

        let content = response.message.content.trim();
        if content.is_empty() {
            Ok(FORMAT_FALLBACK.to_string())
        } else {
            Ok(content.to_string())
        }
    }
}

/// One context entry per hit: a metadata line, then the document text.
fn context_line(hit: &RetrievalHit) -> String {
    let m = &hit.metadata;
    format!(
        "- {} | category={} | neighborhood={} | transit={} | price={} | tips={}\n  text={}",
        m.name, m.category, m.neighborhood, m.transit, m.price_level, m.tips, hit.text
    )
}

fn grounding_prompt(question: &str, hits: &[RetrievalHit]) -> String {
    let context: Vec<String> = hits.iter().map(context_line).collect();
    format!(
        "Answer the user's question using ONLY the retrieved local knowledge base results below.\n\
         Rules:\n\
         1) Do not invent facts not in the retrieved text.\n\
         2) Provide 3-5 bullet points.\n\
         3) If relevant, include transit suggestions (subway/streetcar/bus).\n\
         4) If the user asks something not present in the retrieved results (e.g., an exact fare), \
         say the local knowledge base doesn't contain it (\"not available locally\") and recommend checking the official source.\n\n\
         User question: {question}\n\n\
         Retrieved results:\n{}",
        context.join("\n")
    )
}
