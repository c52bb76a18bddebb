use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use apify_client::ApifyClient;
use gemini_client::GeminiClient;
use personagen_common::Config;
use personagen_pipeline::media::{describe_photos, MediaPreparer};
use personagen_pipeline::persona::extract_persona;
use personagen_pipeline::sources::{FacebookAdapter, InstagramAdapter, LinkedInAdapter, XAdapter};
use personagen_pipeline::{AggregationRequest, Aggregator, SourceAdapter};

const PERSONA_PROMPT: &str = "\
You are an expert in understanding human behavior. A person has posted the \
following images on their social media accounts. Build a persona profile of \
that person from the images. Answer with exactly one labeled line per field, \
in the form `Label: value`, using these labels: Interests, Personality \
Traits, Hobbies, Skills, Values, Emotions, Age Group, Gender, Experiences, \
Transcribed Text (any text visible in the images), Confidence (0-100). \
List-valued fields are comma-separated.";

#[derive(Parser, Debug)]
#[command(name = "personagen", about = "Aggregate social posts and extract a persona")]
struct Args {
    /// X/Twitter handle
    #[arg(long)]
    x: Option<String>,

    /// Instagram username
    #[arg(long)]
    instagram: Option<String>,

    /// Facebook page username
    #[arg(long)]
    facebook: Option<String>,

    /// LinkedIn profile slug (requires LINKEDIN_COOKIES)
    #[arg(long)]
    linkedin: Option<String>,

    /// Maximum posts per platform
    #[arg(long, default_value_t = 10)]
    limit: u32,

    /// Only include posts newer than this date (default: 7 days ago)
    #[arg(long)]
    newer_than: Option<NaiveDate>,

    /// Output file for the merged post list
    #[arg(long, default_value = "output.json")]
    out: PathBuf,

    /// Run the photo subset through the persona pipeline
    #[arg(long)]
    persona: bool,

    /// Subject identifier stamped on the persona record
    #[arg(long, default_value = "anonymous")]
    user_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("personagen=info".parse()?))
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    config.log_redacted();

    let apify = Arc::new(ApifyClient::new(config.apify_token.clone()));

    let mut adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(XAdapter::new(Arc::clone(&apify))),
        Arc::new(InstagramAdapter::new(Arc::clone(&apify))),
        Arc::new(FacebookAdapter::new(Arc::clone(&apify))),
    ];
    match &config.linkedin_cookies {
        Some(cookies) => {
            adapters.push(Arc::new(LinkedInAdapter::new(Arc::clone(&apify), cookies)?));
        }
        None => {
            if args.linkedin.is_some() {
                warn!("LinkedIn handle given but LINKEDIN_COOKIES is not set; skipping LinkedIn");
            }
        }
    }

    // Cutoff evaluated here, per invocation.
    let newer_than = args
        .newer_than
        .unwrap_or_else(|| Utc::now().date_naive() - Duration::days(7));

    let request = AggregationRequest {
        x_handle: args.x,
        instagram_username: args.instagram,
        facebook_username: args.facebook,
        linkedin_username: args.linkedin,
        newer_than,
        max_posts: args.limit,
    };

    let aggregator = Aggregator::new(adapters, config.fetch_concurrency);
    let posts = aggregator.aggregate(&request).await?;

    let file = File::create(&args.out)
        .with_context(|| format!("Failed to create {}", args.out.display()))?;
    serde_json::to_writer_pretty(file, &posts)?;
    info!(count = posts.len(), out = %args.out.display(), "Wrote merged post list");

    if args.persona {
        let gemini = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_image_model.clone());
        let (texts, report) =
            describe_photos(&gemini, &MediaPreparer::new(), PERSONA_PROMPT, &posts).await?;
        info!(
            prepared = report.prepared,
            failed = report.failures.len(),
            "Media preparation finished"
        );

        if texts.is_empty() {
            warn!("No generator output; skipping persona extraction");
        } else {
            let combined = texts.join("\n");
            let persona = extract_persona(&combined, &args.user_id)?;
            println!("{}", serde_json::to_string_pretty(&persona)?);
        }
    }

    Ok(())
}
