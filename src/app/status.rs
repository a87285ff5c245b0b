use crate::review::{
    GatePhase, PlatformCatalog, PlatformReport, Readiness, ValidationResult, ValidationStatus,
};

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn hashtag_limit_label(limit: usize) -> String {
    if limit == 0 {
        "unlimited".into()
    } else {
        limit.to_string()
    }
}

pub fn render_platforms(catalog: &PlatformCatalog) -> String {
    let mut lines = vec![format!("◆ Platforms ({})", catalog.len()), String::new()];
    for (key, platform) in catalog.iter() {
        lines.push(format!(
            "  {key:<12} {:<14} title ≤{:<5} description ≤{:<6} hashtags {}",
            platform.kind,
            platform.limits.title_max_length,
            platform.limits.description_max_length,
            hashtag_limit_label(platform.limits.hashtag_limit),
        ));
        if !platform.features.is_empty() {
            lines.push(format!("  {:<12} features: {}", "", platform.features.join(", ")));
        }
    }
    lines.join("\n")
}

pub fn render_result(result: &ValidationResult) -> String {
    let counts = &result.character_counts;
    let mut lines = vec![
        format!(
            "{} {}",
            if result.valid { "✓" } else { "✗" },
            result.platform
        ),
        format!(
            "   title {} chars · description {} chars · {} hashtags",
            counts.title, counts.description, counts.hashtag_count
        ),
    ];
    for issue in &result.issues {
        lines.push(format!("   - {}: {}", issue.field, issue.issue));
    }
    lines.join("\n")
}

fn status_marker(status: ValidationStatus) -> &'static str {
    match status {
        ValidationStatus::Fresh => "●",
        ValidationStatus::Stale => "◐",
        ValidationStatus::Pending => "○",
        ValidationStatus::Failed => "!",
    }
}

pub fn render_review(reports: &[PlatformReport], readiness: &Readiness) -> String {
    let mut lines = vec!["◆ Review".to_string(), String::new()];

    for report in reports {
        lines.push(format!(
            "{} {:<12} selected: {:<3} {} ({})",
            status_marker(report.status),
            report.platform,
            yes_no(report.selected),
            report.status,
            report.version,
        ));
        lines.push(format!("     title:       {}", report.draft.title));
        lines.push(format!("     description: {}", report.draft.description));
        lines.push(format!("     hashtags:    {}", report.draft.hashtags));
        if let Some(result) = &report.result {
            for issue in &result.issues {
                lines.push(format!("     ✗ {}: {}", issue.field, issue.issue));
            }
        }
        if let Some(error) = &report.error {
            lines.push(format!("     ! validation error: {error}"));
        }
    }

    lines.push(String::new());
    lines.push(format!("  phase        {}", readiness.phase));
    lines.push(format!("  approve      {}", yes_no(readiness.can_approve)));
    lines.push(format!("  reject       {}", yes_no(readiness.can_reject)));
    lines.push(format!("  regenerate   {}", yes_no(readiness.can_regenerate)));
    for blocker in &readiness.blockers {
        lines.push(format!("   · {blocker}"));
    }
    if readiness.phase == GatePhase::Closed {
        lines.push("  session closed".to_string());
    }
    lines.join("\n")
}
