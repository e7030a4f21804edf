//! Remote narrative generation with per-category fallback.
//!
//! [`Narrator`] is the async seam for any text-generation backend.
//! [`GeminiNarrator`] implements it over the Gemini `generateContent` API.
//! [`attach_narratives`] fans out one request per category and fills every
//! aggregate's `analysis`, substituting [`narrative::narrate`] for any
//! category whose request fails or times out.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Instrument};

use crate::config::NarratorConfig;
use crate::models::CategoryAggregate;
use crate::narrative;

const SAMPLE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeRequest {
    pub category: String,
    pub feedback_texts: Vec<String>,
    pub negative_percentage: f64,
}

impl NarrativeRequest {
    pub fn from_aggregate(aggregate: &CategoryAggregate) -> Self {
        Self {
            category: aggregate.category.clone(),
            feedback_texts: aggregate.feedback_texts.clone(),
            negative_percentage: aggregate.negative_percentage,
        }
    }

    fn fallback(&self) -> String {
        narrative::narrate(&self.category, &self.feedback_texts, self.negative_percentage)
    }
}

#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, request: &NarrativeRequest) -> Result<String>;
}

pub fn build_prompt(request: &NarrativeRequest) -> String {
    let samples = request
        .feedback_texts
        .iter()
        .take(SAMPLE_LIMIT)
        .map(|text| format!("• {text}"))
        .collect::<Vec<_>>()
        .join("\n");
    let category = &request.category;

    format!(
        "Analyze this {category} feedback and provide a business-focused summary:\n\n\
         Feedback Type: {category}\n\
         Negative Percentage: {percentage:.1}%\n\
         Number of Feedback Entries: {count}\n\n\
         Feedback Samples:\n{samples}\n\n\
         Please provide a concise analysis in this format:\n\n\
         📊 **{category} Feedback Analysis**\n\n\
         [Priority Level: High/Medium/Low based on negative percentage]\n\n\
         🎯 **Key Issues Identified:**\n• [List 3-4 main problems]\n\n\
         ⚠️ **Business Impact:**\n• [How this affects operations/customer satisfaction]\n\n\
         💡 **Immediate Actions Required:**\n• [3-4 specific, actionable recommendations]\n\n\
         🔍 **Root Cause Analysis:**\n• [What's causing these issues]\n\n\
         Keep the response focused, actionable, and business-oriented.\n",
        percentage = request.negative_percentage,
        count = request.feedback_texts.len(),
    )
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

fn first_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .map(|part| part.text)
        .filter(|text| !text.trim().is_empty())
}

pub struct GeminiNarrator {
    client: reqwest::Client,
    config: NarratorConfig,
}

impl GeminiNarrator {
    pub fn new(config: NarratorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("failed to build narrative HTTP client")?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Narrator for GeminiNarrator {
    async fn narrate(&self, request: &NarrativeRequest) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(request),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            },
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("X-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send narrative request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Narrative request failed with status {}: {}", status, body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse narrative response: {}", e))?;

        first_text(parsed).ok_or_else(|| anyhow!("Narrative response had no text candidates"))
    }
}

/// Fills `analysis` on every aggregate. Remote failures fall back per category.
pub async fn attach_narratives(
    aggregates: &mut [CategoryAggregate],
    narrator: Option<Arc<dyn Narrator>>,
    timeout: Duration,
) {
    let Some(narrator) = narrator else {
        for aggregate in aggregates.iter_mut() {
            aggregate.analysis = Some(NarrativeRequest::from_aggregate(aggregate).fallback());
        }
        debug!(categories = aggregates.len(), "Narrator disabled, used fallback narratives");
        return;
    };

    let mut tasks = Vec::with_capacity(aggregates.len());
    for aggregate in aggregates.iter() {
        let request = NarrativeRequest::from_aggregate(aggregate);
        let narrator = Arc::clone(&narrator);
        let span = tracing::info_span!("narrate", category = %request.category);
        let task = tokio::spawn(
            async move {
                match tokio::time::timeout(timeout, narrator.narrate(&request)).await {
                    Ok(result) => result,
                    Err(_) => Err(anyhow!("timed out after {:?}", timeout)),
                }
            }
            .instrument(span),
        );
        tasks.push(task);
    }

    let mut remote = 0usize;
    for (aggregate, task) in aggregates.iter_mut().zip(tasks) {
        let outcome = match task.await {
            Ok(result) => result,
            Err(e) => Err(anyhow!("narrative task failed: {}", e)),
        };
        let text = match outcome {
            Ok(text) => {
                remote += 1;
                text
            }
            Err(e) => {
                warn!(category = %aggregate.category, error = %e, "Remote narrative failed, using fallback");
                NarrativeRequest::from_aggregate(aggregate).fallback()
            }
        };
        aggregate.analysis = Some(text);
    }

    info!(
        categories = aggregates.len(),
        remote,
        fallback = aggregates.len() - remote,
        "Narratives attached"
    );
}
