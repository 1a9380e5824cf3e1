//! One-shot subcommands run against an assembled session.
//!
//! Every command returns the text to print so the binary stays a thin
//! dispatcher.
use anyhow::{Context, Result};

use client_frontend_core::{
    MessageLog, SessionFrame, ShareConfig, format::format_count, share_intent_url, share_text,
};
use game_content::{CatalogProvider, StaticCatalogProvider};
use runtime::{CommandOutcome, SessionController, SessionView};

use crate::console::render_frame;

/// `status [--json]`
pub fn status(controller: &SessionController, json: bool) -> Result<String> {
    let view = controller.view();
    if json {
        return serde_json::to_string_pretty(&view).context("Failed to serialize session view");
    }
    Ok(frame_text(controller, &view))
}

/// `start <amount> [--guess NAME]`
pub async fn start(
    controller: &SessionController,
    amount: &str,
    first_guess: Option<&str>,
) -> Result<String> {
    let outcome = controller.start_game(amount, first_guess).await?;
    Ok(report(controller, "Start", &outcome))
}

/// `guess <NAME>`
pub async fn guess(controller: &SessionController, name: &str) -> Result<String> {
    let outcome = controller.submit_guess(name).await?;
    Ok(report(controller, "Guess", &outcome))
}

/// `claim`
pub async fn claim(controller: &SessionController) -> Result<String> {
    let outcome = controller.claim_reward().await?;
    Ok(report(controller, "Claim", &outcome))
}

/// `search <TERM>`: catalog matches, one per line.
pub fn search(controller: &SessionController, term: &str) -> String {
    let matches = controller.catalog().search(term);
    if matches.is_empty() {
        return format!("No profiles match \"{}\".", term.trim());
    }

    matches
        .into_iter()
        .map(|profile| {
            let attributes = &profile.attributes;
            format!(
                "{} ({}) - {}, {}, {} followers",
                profile.name,
                profile.handle,
                attributes.association,
                attributes.ecosystem,
                format_count(attributes.followers)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `share`: spoiler-free result grid plus a post link.
pub fn share(controller: &SessionController, config: &ShareConfig) -> String {
    let view = controller.view();
    let text = share_text(
        view.game_id,
        view.attempts,
        view.guesses.iter().map(|record| record.hints.as_ref()),
    );
    let url = share_intent_url(&text, &config.play_url);
    format!("{text} {}\n\n{url}", config.play_url)
}

/// `target [--round N]`: catalog target for a round, or for today.
pub async fn target(controller: &SessionController, round: Option<u64>) -> Result<String> {
    let provider = StaticCatalogProvider::new(controller.catalog().clone());
    let (label, profile) = match round {
        Some(round) => (format!("round {round}"), provider.target_for_round(round).await?),
        None => ("today".to_string(), provider.target_for_today().clone()),
    };
    Ok(format!("Target for {label}: {} ({})", profile.name, profile.handle))
}

fn report(controller: &SessionController, action: &str, outcome: &CommandOutcome) -> String {
    let headline = match outcome {
        CommandOutcome::Confirmed(tx) => format!("{action} confirmed ({tx})."),
        CommandOutcome::StillPending(tx) => {
            format!("{action} still pending ({tx}). Check again with `cypher status`.")
        }
        CommandOutcome::Ignored => format!("{action} ignored: nothing to do right now."),
    };
    format!("{headline}\n{}", frame_text(controller, &controller.view()))
}

fn frame_text(controller: &SessionController, view: &SessionView) -> String {
    let frame = SessionFrame::from_view(view, &MessageLog::new(1), 0);
    render_frame(&frame, controller.config().game_config.token_decimals)
}
