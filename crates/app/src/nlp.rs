//! The NLP thing: four result properties, each fed by one analysis action.
//!
//! | action                | property     |
//! |-----------------------|--------------|
//! | `sentiment_analysis`  | `sentiments` |
//! | `word_tokenize`       | `words`      |
//! | `keywords_extraction` | `keywords`   |
//! | `summary_extraction`  | `summary`    |
//!
//! The analysis itself is delegated to a [`TextAnalyzer`] and runs on a
//! blocking thread.

use std::sync::Arc;

use nlpthing_domain::error::{
    ActionExecutionError, AnalysisError, DefinitionError, ValidationError,
};
use nlpthing_domain::property::PropertyMetadata;
use nlpthing_domain::schema::{FieldSchema, InputSchema};
use nlpthing_domain::thing::ThingInfo;
use nlpthing_domain::value::{PropertyValue, ValueType};

use crate::action::ActionContext;
use crate::action_registry::ActionDescriptor;
use crate::ports::TextAnalyzer;
use crate::thing::{Thing, ThingBuilder};

pub const DEFAULT_THING_ID: &str = "urn:dev:ops:nlp-thing";
pub const DEFAULT_THING_TITLE: &str = "NLP Thing";
pub const THING_TYPE: &str = "NLP";
pub const THING_DESCRIPTION: &str = "A web connected nlp thing";

/// Result count used when an invocation carries no `limit`.
pub const DEFAULT_LIMIT: usize = 5;

pub const SENTIMENTS: &str = "sentiments";
pub const WORDS: &str = "words";
pub const KEYWORDS: &str = "keywords";
pub const SUMMARY: &str = "summary";

pub const SENTIMENT_ANALYSIS: &str = "sentiment_analysis";
pub const WORD_TOKENIZE: &str = "word_tokenize";
pub const KEYWORDS_EXTRACTION: &str = "keywords_extraction";
pub const SUMMARY_EXTRACTION: &str = "summary_extraction";

/// Identity of an NLP thing.
///
/// # Errors
///
/// Returns [`ValidationError`] if `id` or `title` is empty.
pub fn thing_info(
    id: impl Into<String>,
    title: impl Into<String>,
) -> Result<ThingInfo, ValidationError> {
    ThingInfo::builder()
        .id(id)
        .title(title)
        .semantic_type(THING_TYPE)
        .description(THING_DESCRIPTION)
        .build()
}

/// A [`ThingBuilder`] with every NLP property and action defined.
///
/// The caller still chooses the executor configuration and runtime before
/// calling [`ThingBuilder::build`].
///
/// # Errors
///
/// Returns [`DefinitionError`] if a built-in definition is incoherent.
pub fn nlp_thing(
    info: ThingInfo,
    analyzer: Arc<dyn TextAnalyzer>,
) -> Result<ThingBuilder, DefinitionError> {
    let sentiments = PropertyMetadata::builder(ValueType::Number)
        .semantic_type("SentimentsProperty")
        .title("Sentiments")
        .description("Latest sentiments response from NLP")
        .minimum(0.0)
        .maximum(1.0)
        .build()?;

    let mut builder = Thing::builder(info).property(SENTIMENTS, 1_i64, sentiments);
    for (name, semantic_type, title, what) in [
        (WORDS, "WordsProperty", "Words", "words"),
        (KEYWORDS, "KeyWordsProperty", "KeyWords", "keywords"),
        (SUMMARY, "SummaryProperty", "Summary", "summary"),
    ] {
        let metadata = PropertyMetadata::builder(ValueType::Array)
            .semantic_type(semantic_type)
            .title(title)
            .description(format!("Latest {what} response from NLP"))
            .items(ValueType::String)
            .build()?;
        builder = builder.property(name, PropertyValue::Array(Vec::new()), metadata);
    }

    let text_only = InputSchema::builder()
        .required("text", FieldSchema::new(ValueType::String))
        .build();
    let text_and_limit = InputSchema::builder()
        .required("text", FieldSchema::new(ValueType::String))
        .required("limit", FieldSchema::new(ValueType::Integer).minimum(1.0))
        .build();

    let sentiment = Arc::clone(&analyzer);
    let tokenizer = Arc::clone(&analyzer);
    let extractor = Arc::clone(&analyzer);
    let summarizer = analyzer;

    Ok(builder
        .action(
            ActionDescriptor::builder(SENTIMENT_ANALYSIS)
                .title("Sentiment analysis")
                .description("Send text to the NLP thing and judge its sentiment")
                .input(text_only.clone())
                .handler(move |ctx| run_sentiment(ctx, Arc::clone(&sentiment)))
                .build()?,
        )
        .action(
            ActionDescriptor::builder(WORD_TOKENIZE)
                .title("Word tokenize")
                .description("Send text to the NLP thing and get its words back")
                .input(text_only)
                .handler(move |ctx| run_words(ctx, Arc::clone(&tokenizer)))
                .build()?,
        )
        .action(
            ActionDescriptor::builder(KEYWORDS_EXTRACTION)
                .title("Keywords extraction")
                .description("Send text to the NLP thing and extract its keywords")
                .input(text_and_limit.clone())
                .handler(move |ctx| run_keywords(ctx, Arc::clone(&extractor)))
                .build()?,
        )
        .action(
            ActionDescriptor::builder(SUMMARY_EXTRACTION)
                .title("Summary extraction")
                .description("Send text to the NLP thing and extract a summary")
                .input(text_and_limit)
                .handler(move |ctx| run_summary(ctx, Arc::clone(&summarizer)))
                .build()?,
        ))
}

async fn run_sentiment(
    ctx: ActionContext,
    analyzer: Arc<dyn TextAnalyzer>,
) -> Result<(), ActionExecutionError> {
    let text = ctx.str_field("text")?.to_string();
    let score = analyze(&ctx, move || analyzer.sentiment(&text)).await?;
    ctx.write_property(SENTIMENTS, score)
}

async fn run_words(
    ctx: ActionContext,
    analyzer: Arc<dyn TextAnalyzer>,
) -> Result<(), ActionExecutionError> {
    let text = ctx.str_field("text")?.to_string();
    let words = analyze(&ctx, move || analyzer.words(&text)).await?;
    ctx.write_property(WORDS, words)
}

async fn run_keywords(
    ctx: ActionContext,
    analyzer: Arc<dyn TextAnalyzer>,
) -> Result<(), ActionExecutionError> {
    let text = ctx.str_field("text")?.to_string();
    let limit = limit_of(&ctx);
    let keywords = analyze(&ctx, move || analyzer.keywords(&text, limit)).await?;
    ctx.write_property(KEYWORDS, keywords)
}

async fn run_summary(
    ctx: ActionContext,
    analyzer: Arc<dyn TextAnalyzer>,
) -> Result<(), ActionExecutionError> {
    let text = ctx.str_field("text")?.to_string();
    let limit = limit_of(&ctx);
    let summary = analyze(&ctx, move || analyzer.summary(&text, limit)).await?;
    ctx.write_property(SUMMARY, summary)
}

fn limit_of(ctx: &ActionContext) -> usize {
    ctx.u64_field("limit")
        .map_or(DEFAULT_LIMIT, |limit| usize::try_from(limit).unwrap_or(usize::MAX))
}

/// Run `work` on the blocking pool, with cancellation checks on both sides.
async fn analyze<T, F>(ctx: &ActionContext, work: F) -> Result<T, ActionExecutionError>
where
    F: FnOnce() -> Result<T, AnalysisError> + Send + 'static,
    T: Send + 'static,
{
    ctx.checkpoint()?;
    let result = tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| {
            if err.is_panic() {
                ActionExecutionError::Panicked
            } else {
                ActionExecutionError::Aborted
            }
        })?;
    ctx.checkpoint()?;
    Ok(result?)
}
