//! Local template-based generator
//!
//! Stands in for a real inference backend: waits a randomized delay, then
//! fills a per-type template from the prompt and settings.

use super::{GenerationRequest, Generator, ResearchReply};
use crate::catalog::{ContentType, GenerationSettings, ResearchType};
use crate::error::{CopydeskError, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Model label reported when none is configured
pub const DEFAULT_MODEL: &str = "copydesk-template";

/// Generator that renders canned templates after a simulated delay
#[derive(Debug, Clone)]
pub struct TemplateGenerator {
    model: String,
    min_delay: Duration,
    max_delay: Duration,
}

impl TemplateGenerator {
    /// Create a generator with a delay drawn from `min_delay..=max_delay`
    ///
    /// A reversed range is swapped rather than rejected.
    pub fn new(model: impl Into<String>, min_delay: Duration, max_delay: Duration) -> Self {
        let (min_delay, max_delay) = if min_delay <= max_delay {
            (min_delay, max_delay)
        } else {
            (max_delay, min_delay)
        };
        Self {
            model: model.into(),
            min_delay,
            max_delay,
        }
    }

    /// A generator that answers immediately
    pub fn instant() -> Self {
        Self::new(DEFAULT_MODEL, Duration::ZERO, Duration::ZERO)
    }

    fn pick_delay(&self) -> Duration {
        if self.min_delay == self.max_delay {
            return self.min_delay;
        }
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    async fn simulate_latency(&self) {
        let delay = self.pick_delay();
        debug!(delay_ms = delay.as_millis() as u64, "Simulating generation latency");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for TemplateGenerator {
    fn default() -> Self {
        Self::new(
            DEFAULT_MODEL,
            Duration::from_millis(1000),
            Duration::from_millis(2000),
        )
    }
}

#[async_trait]
impl Generator for TemplateGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(CopydeskError::Generation("empty prompt".to_string()).into());
        }
        self.simulate_latency().await;
        Ok(render_content(&request.content_type, prompt, &request.settings))
    }

    async fn research(&self, research_type: &ResearchType, query: &str) -> Result<ResearchReply> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CopydeskError::Generation("empty question".to_string()).into());
        }
        self.simulate_latency().await;
        Ok(ResearchReply::new(
            render_research(research_type, query),
            self.model.clone(),
        ))
    }
}

fn audience_clause(settings: &GenerationSettings) -> String {
    let audience = settings.target_audience.trim();
    if audience.is_empty() {
        String::new()
    } else {
        format!(" for {}", audience)
    }
}

fn keyword_line(settings: &GenerationSettings) -> Option<String> {
    let keywords: Vec<&str> = settings
        .keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        None
    } else {
        Some(format!("Keywords: {}", keywords.join(", ")))
    }
}

fn render_content(content_type: &ContentType, prompt: &str, settings: &GenerationSettings) -> String {
    let audience = audience_clause(settings);
    let tone = settings.tone;
    let mut body = match content_type {
        ContentType::BlogPost => format!(
            "# {prompt}\n\n\
             ## Introduction\n\n\
             In this {tone} post{audience}, we explore {prompt}. \
             Here is what you need to know and why it matters now.\n\n\
             ## Key Points\n\n\
             - Why {prompt} deserves your attention\n\
             - Practical steps you can take today\n\
             - Common mistakes and how to avoid them\n\n\
             ## Conclusion\n\n\
             {prompt} is worth the investment. Start small, measure results, and keep iterating."
        ),
        ContentType::SocialCaption => format!(
            "{prompt} ✨\n\n\
             Tell us what you think in the comments{audience}! 👇\n\n\
             #marketing #content"
        ),
        ContentType::EmailCopy => format!(
            "Subject: {prompt}\n\n\
             Hi there,\n\n\
             We wanted to share something {tone}{audience}: {prompt}.\n\n\
             Click below to learn more.\n\n\
             Best regards,\nThe Team"
        ),
        ContentType::ProductDescription => format!(
            "{prompt}\n\n\
             Designed{audience} with care, it combines quality and value.\n\n\
             Features:\n\
             - Built to last\n\
             - Easy to use\n\
             - Backed by our satisfaction guarantee"
        ),
        ContentType::AdCopy => format!(
            "{prompt}. Don't miss out{audience}. Act now!"
        ),
        ContentType::VideoScript => format!(
            "[OPENING SHOT]\n\
             NARRATOR ({tone}): {prompt}.\n\n\
             [SCENE 1]\n\
             Show the problem{audience}.\n\n\
             [SCENE 2]\n\
             Introduce the solution.\n\n\
             [CLOSING]\n\
             NARRATOR: Learn more today."
        ),
        ContentType::Other(_) => format!(
            "{label}: {prompt}\n\n\
             A {tone} piece{audience} about {prompt}.",
            label = content_type.label()
        ),
    };

    if let Some(line) = keyword_line(settings) {
        body.push_str("\n\n");
        body.push_str(&line);
    }
    body
}

fn render_research(research_type: &ResearchType, query: &str) -> String {
    let mut out = format!("## {}: {}\n", research_type.label(), query);
    for (index, area) in research_type.focus_areas().iter().enumerate() {
        out.push_str(&format!(
            "\n### {}. {}\n\nFindings on {} as they relate to \"{}\".\n",
            index + 1,
            capitalize(area),
            area,
            query
        ));
    }
    out.push_str("\n### Recommendation\n\nValidate these findings against your own data before acting.");
    out
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
