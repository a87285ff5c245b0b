use crate::api::ValidationRequest;
use crate::app::backend::Backend;
use crate::app::status::{render_platforms, render_result, render_review};
use crate::cli::{Cli, Commands, FieldAssignment, ReviewAction};
use crate::config::Config;
use crate::content::{FieldEdit, GeneratedContent, HashtagSet, PlatformKey};
use crate::review::ReviewSession;
use anyhow::{Context, Result, bail};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Platforms { offline } => list_platforms(&config, offline).await,
        Commands::Hashtags { raw } => {
            let set = HashtagSet::parse(&raw);
            println!("{}", serde_json::to_string(&set)?);
            Ok(())
        }
        Commands::Validate {
            platform,
            title,
            description,
            hashtags,
            offline,
        } => {
            let request = ValidationRequest {
                platform: PlatformKey::from(platform),
                title,
                description,
                hashtags: HashtagSet::parse(&hashtags).into(),
            };
            validate_draft(&config, offline, &request).await
        }
        Commands::Review {
            file,
            deselect,
            assignments,
            action,
            json,
            offline,
        } => {
            let plan = ReviewPlan {
                deselect: deselect.into_iter().map(PlatformKey::from).collect(),
                assignments,
                action,
                json,
            };
            run_review(&config, offline, &file, plan).await
        }
    }
}

async fn list_platforms(config: &Config, offline: bool) -> Result<()> {
    let backend = Backend::from_config(config, offline);
    let catalog = backend.load_catalog().await?;
    println!("{}", render_platforms(&catalog));
    Ok(())
}

async fn validate_draft(config: &Config, offline: bool, request: &ValidationRequest) -> Result<()> {
    let backend = Backend::from_config(config, offline);
    let catalog = backend.load_catalog().await?;
    if !catalog.contains(&request.platform) {
        bail!("unknown platform `{}`", request.platform);
    }
    let result = backend
        .validator(&catalog)
        .validate(request)
        .await
        .context("validation failed")?;
    println!("{}", render_result(&result));
    Ok(())
}

struct ReviewPlan {
    deselect: Vec<PlatformKey>,
    assignments: Vec<FieldAssignment>,
    action: Option<ReviewAction>,
    json: bool,
}

async fn read_generated(path: &Path) -> Result<GeneratedContent> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse generated content in {}", path.display()))
}

async fn run_review(config: &Config, offline: bool, file: &Path, plan: ReviewPlan) -> Result<()> {
    let generated = read_generated(file).await?;
    let backend = Backend::from_config(config, offline);
    let catalog = backend.load_catalog().await?;

    let session = ReviewSession::new(
        Arc::clone(&catalog),
        backend.validator(&catalog),
        Arc::clone(&backend.publisher),
        config.validation_quiet_period(),
    );
    if session.initialize(generated)? == 0 {
        bail!("generated content has no copy for any known platform");
    }

    for platform in &plan.deselect {
        if !session.set_platform_selected(platform, false)? {
            tracing::warn!(%platform, "cannot deselect platform without a draft");
        }
    }
    for assignment in plan.assignments {
        let edit = FieldEdit::from_raw(assignment.field, &assignment.value);
        if session.edit_field(&assignment.platform, edit)?.is_none() {
            tracing::warn!(platform = %assignment.platform, "no draft to edit");
        }
    }
    session.settle().await;

    let outcome = match plan.action {
        None => None,
        Some(ReviewAction::Approve) => {
            let payload = session.approve().await?;
            Some(format!("approved {} platform(s)", payload.len()))
        }
        Some(ReviewAction::Reject) => {
            session.reject().await?;
            Some("content rejected".to_string())
        }
        Some(ReviewAction::Regenerate) => {
            session.regenerate().await?;
            Some("regeneration requested".to_string())
        }
    };

    if plan.json {
        let report = json!({
            "session": session.id(),
            "platforms": session.reports(),
            "readiness": session.readiness(),
            "outcome": outcome,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_review(&session.reports(), &session.readiness()));
        if let Some(outcome) = outcome {
            println!("\n{outcome}");
        }
    }
    Ok(())
}
