//! Chat-completions backed [`Analyzer`]: sends the instruction and a corpus document to an
//! OpenAI-compatible endpoint and returns the reply text. Documents larger than one
//! request are analysed chunk by chunk and the notes are combined.

use async_trait::async_trait;
use repo_corpus_core::contract::{Analyzer, AnalyzerError};
use repo_corpus_core::corpus::Corpus;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;

use crate::load_config::AnalyzerSection;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Split `text` into windows of at most `chunk_chars` characters. Each window after the
/// first starts `overlap` characters before the previous one ended, so concatenating the
/// windows with the overlaps removed gives back `text` exactly.
pub fn chunk_chars(text: &str, chunk_chars: usize, overlap: usize) -> Vec<&str> {
    let chunk_chars = chunk_chars.max(1);
    let overlap = overlap.min(chunk_chars - 1);
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(text.len()))
        .collect();
    let total = bounds.len() - 1;
    if total <= chunk_chars {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + chunk_chars).min(total);
        chunks.push(&text[bounds[start]..bounds[end]]);
        if end == total {
            return chunks;
        }
        start = end - overlap;
    }
}

/// System prompt for one part of a document that did not fit a single request.
fn part_instruction(instruction: &str, part: usize, parts: usize) -> String {
    format!(
        "{instruction}\n\nThe project document is too large for one message. This is part {part} of {parts}. \
Write concise notes on what this part shows: technologies, structure and difficulty. \
The notes of all parts are combined into the final review afterwards."
    )
}

/// User message for the final request combining every part's notes in order.
fn combined_notes(project: &str, notes: &[String]) -> String {
    let mut message = format!(
        "Project Name = '{project}'\nThe document was reviewed in {} parts. Notes per part, in order:\n",
        notes.len()
    );
    for (idx, note) in notes.iter().enumerate() {
        message.push_str(&format!("\nPart {}:\n{}\n", idx + 1, note));
    }
    message
}

pub struct ChatAnalyzer {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    chunk_chars: usize,
    chunk_overlap_chars: usize,
}

impl ChatAnalyzer {
    pub fn new(
        section: &AnalyzerSection,
        api_key: String,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self {
            http: Client::builder().build()?,
            endpoint: format!(
                "{}/chat/completions",
                section.base_url.trim_end_matches('/')
            ),
            api_key,
            model: section.model.clone(),
            temperature: section.temperature,
            chunk_chars: section.chunk_chars,
            chunk_overlap_chars: section.chunk_overlap_chars,
        })
    }

    pub fn new_from_env(
        section: &AnalyzerSection,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();
        match env::var("OPENAI_API_KEY") {
            Ok(api_key) => {
                tracing::info!(
                    model = %section.model,
                    endpoint = %section.base_url,
                    "Initialized ChatAnalyzer from environment"
                );
                Self::new(section, api_key)
            }
            Err(e) => {
                tracing::error!(error = ?e, "OPENAI_API_KEY missing in environment");
                Err(Box::new(e))
            }
        }
    }

    async fn complete(
        &self,
        corpus: &Corpus,
        system: &str,
        user: &str,
    ) -> Result<String, AnalyzerError> {
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalyzerError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            tracing::error!(status = %status, repository = %corpus.repository, "Analyzer returned error. Response body: {text}");
            return Err(AnalyzerError::Request(format!("status {status}")));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::Response(e.to_string()))?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AnalyzerError::Response("no choices in reply".to_string()))
    }
}

#[async_trait]
impl Analyzer for ChatAnalyzer {
    /// Small documents go out in one request. Larger ones are split into overlapping
    /// chunks; each chunk is summarised in order and the notes are combined in a final
    /// request.
    async fn analyze(&self, corpus: &Corpus, instruction: &str) -> Result<String, AnalyzerError> {
        let document = corpus.document();
        let chunks = chunk_chars(&document, self.chunk_chars, self.chunk_overlap_chars);
        if chunks.len() == 1 {
            return self.complete(corpus, instruction, &document).await;
        }

        tracing::info!(
            repository = %corpus.repository,
            chunks = chunks.len(),
            chunk_chars = self.chunk_chars,
            "Corpus document split for analysis"
        );
        let mut notes = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            let system = part_instruction(instruction, idx + 1, chunks.len());
            let note = self.complete(corpus, &system, chunk).await?;
            tracing::debug!(repository = %corpus.repository, part = idx + 1, "Chunk analysed");
            notes.push(note);
        }
        let combined = combined_notes(&corpus.repository.name, &notes);
        self.complete(corpus, instruction, &combined).await
    }
}
