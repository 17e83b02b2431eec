//! Content generation seam.
//!
//! Schedules, answer summaries and personal reports come from an external
//! language model. This module defines the contract, the reply parsing shared
//! by real implementations and the placeholder used when no model is
//! configured or a call fails.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::report::{
    Mentoring, NextAction, ReportContent, ReportInput, Social, StarItem, Story, TimelineEntry,
};
use crate::models::slot::{QuestionDraft, SlotDraft, SlotType};

/// Tag used when the generator returns none.
pub const FALLBACK_TAG: &str = "general";

const MAX_TAGS: usize = 3;
const SUMMARY_LINES: usize = 2;
const SNIPPET_CHARS: usize = 80;

/// Error type for content generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Content generator is not configured")]
    NotConfigured,

    #[error("Content generator unavailable: {0}")]
    Unavailable(String),

    #[error("Content generator returned invalid output: {0}")]
    InvalidResponse(String),

    #[error("Content generator returned an empty reply")]
    Empty,
}

/// One slot as proposed by the generator. Times are free-form strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedSlot {
    #[serde(default)]
    pub t_at: Option<String>,
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "type", default)]
    pub slot_type: SlotType,
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
    #[serde(default)]
    pub announce: Option<String>,
}

/// A proposed timetable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProposedSchedule {
    #[serde(default)]
    pub slots: Vec<ProposedSlot>,
}

impl ProposedSchedule {
    /// Converts proposals into drafts. Times that do not parse fall back to
    /// `fallback`; naive times are read in `offset`.
    pub fn into_drafts(self, fallback: DateTime<Utc>, offset: FixedOffset) -> Vec<SlotDraft> {
        self.slots
            .into_iter()
            .filter(|s| !s.title.trim().is_empty())
            .map(|s| {
                let t_at = s
                    .t_at
                    .as_deref()
                    .and_then(|raw| parse_proposed_time(raw, offset))
                    .unwrap_or(fallback);
                SlotDraft {
                    t_at: Some(t_at),
                    title: s.title,
                    desc: s.desc,
                    slot_type: s.slot_type,
                    questions: s
                        .questions
                        .into_iter()
                        .filter(|q| !q.text.trim().is_empty())
                        .collect(),
                    announce: s.announce,
                }
            })
            .collect()
    }
}

/// Parses `YYYY-MM-DD HH:MM` (read in `offset`) or an RFC 3339 timestamp.
pub fn parse_proposed_time(raw: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Two-line summary and a few tags for one answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSummary {
    #[serde(default)]
    pub summary_2: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl AnswerSummary {
    /// Forces exactly two summary lines and one to three distinct tags.
    /// Missing lines are filled from `source`.
    pub fn normalize(mut self, source: &str) -> Self {
        self.summary_2 = self
            .summary_2
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .take(SUMMARY_LINES)
            .collect();
        while self.summary_2.len() < SUMMARY_LINES {
            let filler = match self.summary_2.len() {
                0 => snippet(source),
                _ => format!("{} characters submitted.", source.chars().count()),
            };
            self.summary_2.push(filler);
        }

        let mut tags: Vec<String> = Vec::with_capacity(MAX_TAGS);
        for tag in self.tags {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
            if tags.len() == MAX_TAGS {
                break;
            }
        }
        if tags.is_empty() {
            tags.push(FALLBACK_TAG.to_string());
        }
        self.tags = tags;
        self
    }
}

/// An audio answer to transcribe.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

/// Content generator trait.
#[async_trait::async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Short identifier stored alongside generated reports.
    fn name(&self) -> &'static str;

    /// Whether an external model is behind this generator.
    fn is_configured(&self) -> bool;

    /// Proposes a timetable from brochure text. A reply that does not parse
    /// is an error.
    async fn propose_slots(&self, text: &str) -> Result<ProposedSchedule, GeneratorError>;

    async fn summarize_answer(&self, text: &str) -> Result<AnswerSummary, GeneratorError>;

    async fn generate_report(&self, input: &ReportInput) -> Result<ReportContent, GeneratorError>;

    async fn transcribe(&self, clip: &AudioClip) -> Result<String, GeneratorError>;
}

/// Parses a model reply as JSON, tolerating a Markdown code fence around it.
pub fn parse_json_reply<T: DeserializeOwned>(raw: &str) -> Result<T, GeneratorError> {
    let mut body = raw.trim();
    if let Some(rest) = body.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        body = rest.trim_end().strip_suffix("```").unwrap_or(rest).trim();
    }
    if body.is_empty() {
        return Err(GeneratorError::Empty);
    }
    serde_json::from_str(body).map_err(|e| GeneratorError::InvalidResponse(e.to_string()))
}

/// Cuts `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    let cut = truncate_chars(trimmed, SNIPPET_CHARS);
    if cut.len() < trimmed.len() {
        format!("{}...", cut)
    } else {
        cut.to_string()
    }
}

/// Summary used when the generator is missing or fails.
pub fn placeholder_summary(text: &str) -> AnswerSummary {
    AnswerSummary {
        summary_2: vec![snippet(text)],
        tags: vec![FALLBACK_TAG.to_string()],
    }
    .normalize(text)
}

/// Report used when the generator is missing or fails.
///
/// Built only from the participant's own answers, so it is deterministic.
pub fn placeholder_report(input: &ReportInput) -> ReportContent {
    let timeline = input
        .answers
        .iter()
        .map(|a| TimelineEntry {
            slot_title: a.slot_title.clone(),
            snap: snippet(&a.answer.text),
            photo: a.answer.photo_url.clone(),
        })
        .collect();

    let mut top_tags: Vec<(&String, &u32)> = input.tag_frequency.iter().collect();
    top_tags.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let strengths = top_tags
        .iter()
        .take(MAX_TAGS)
        .map(|(tag, count)| format!("{} ({})", tag, count))
        .collect();

    let first = input.answers.first().map(|a| snippet(&a.answer.text));
    let last = input.answers.last().map(|a| snippet(&a.answer.text));

    ReportContent {
        timeline,
        story: Story {
            problem: first.clone().unwrap_or_default(),
            solution: last.clone().unwrap_or_default(),
            validation: String::new(),
        },
        mentoring: Mentoring::default(),
        strengths,
        improvements: Vec::new(),
        next30: vec![NextAction {
            task: format!("Review your {} answers from {}", input.answers.len(), input.event_name),
            due: String::new(),
            priority: 1,
        }],
        star: vec![StarItem {
            s: input.event_name.clone(),
            t: first.unwrap_or_default(),
            a: String::new(),
            r: last.unwrap_or_default(),
        }],
        social: Social {
            linkedin3: format!(
                "{} ({}) took part in {}.",
                input.participant.nickname, input.participant.team, input.event_name
            ),
        },
    }
}

/// Generator used when no model is configured.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderGenerator;

impl PlaceholderGenerator {
    pub fn new() -> Self {
        Self
    }

    fn default_schedule() -> ProposedSchedule {
        let ask = |title: &str, question: &str| ProposedSlot {
            t_at: None,
            title: title.to_string(),
            desc: String::new(),
            slot_type: SlotType::Ask,
            questions: vec![QuestionDraft {
                text: question.to_string(),
                kind: Default::default(),
                required: false,
            }],
            announce: None,
        };

        ProposedSchedule {
            slots: vec![
                ask("Kickoff", "What problem are you solving?"),
                ask("Mentoring", "What changed after mentoring?"),
                ask("Final pitch", "What will you do next?"),
            ],
        }
    }
}

#[async_trait::async_trait]
impl ContentGenerator for PlaceholderGenerator {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn propose_slots(&self, text: &str) -> Result<ProposedSchedule, GeneratorError> {
        tracing::debug!(chars = text.chars().count(), "Placeholder schedule proposed");
        Ok(Self::default_schedule())
    }

    async fn summarize_answer(&self, text: &str) -> Result<AnswerSummary, GeneratorError> {
        Ok(placeholder_summary(text))
    }

    async fn generate_report(&self, input: &ReportInput) -> Result<ReportContent, GeneratorError> {
        Ok(placeholder_report(input))
    }

    async fn transcribe(&self, _clip: &AudioClip) -> Result<String, GeneratorError> {
        Err(GeneratorError::NotConfigured)
    }
}
