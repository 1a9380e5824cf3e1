//! Plain-text presentation and the notice-printing `watch` frontend.
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;

use client_frontend_core::{
    EventConsumer, Frontend, FrontendConfig, MessageEntry, MessageLog, NoticeCollector, Screen,
    SessionFrame, format::format_amount,
};
use runtime::{BlockingCondition, Event, NoticeLevel, SessionController, SessionView};

/// One line describing where the session stands.
pub fn render_screen(screen: &Screen, decimals: u8) -> String {
    match screen {
        Screen::Blocked(BlockingCondition::WalletDisconnected) => {
            "Wallet not connected. Set CYPHER_ACCOUNT to play.".to_string()
        }
        Screen::Blocked(BlockingCondition::WrongNetwork { expected, actual }) => {
            format!("Wrong network: switch to chain {expected} (currently {actual}).")
        }
        Screen::Loading => "Loading round...".to_string(),
        Screen::StartPrompt => {
            "No game this round yet. Start one with `cypher start <amount>`.".to_string()
        }
        Screen::Playing { attempts, max } => {
            format!("Playing: {} of {max} attempts left.", max.saturating_sub(*attempts))
        }
        Screen::AwaitingResults => "Your round is over. Waiting for results.".to_string(),
        Screen::Won { winnings } => format!(
            "You won {}. Claim it with `cypher claim`.",
            format_amount(*winnings, decimals)
        ),
        Screen::RoundOver => "Round finalized. Nothing to claim.".to_string(),
    }
}

/// Full multi-line status block.
pub fn render_frame(frame: &SessionFrame, decimals: u8) -> String {
    let header = &frame.header;
    let game = header
        .game_id
        .map_or_else(|| "?".to_string(), |id| id.to_string());
    let wallet = header.wallet.as_deref().unwrap_or("disconnected");

    let mut lines = vec![
        format!(
            "Cypher #{game}  {}/{}  wallet {wallet}",
            header.attempts, header.max_attempts
        ),
        render_screen(&frame.screen, decimals),
    ];

    for row in &frame.guesses {
        let mut line = format!("{:>2}. {} ({})", row.attempt, row.name, row.handle);
        if row.pending {
            line.push_str(" [pending]");
        }
        if !row.cells.is_empty() {
            let cells: Vec<String> = row
                .cells
                .iter()
                .map(|cell| format!("{}: {} {}", cell.label, cell.value, cell.symbol))
                .collect();
            line.push_str("\n    ");
            line.push_str(&cells.join(" | "));
        }
        lines.push(line);
    }

    if frame.is_loading {
        lines.push("Working...".to_string());
    }
    if frame.stalled > 0 {
        lines.push(format!("{} transaction(s) still pending.", frame.stalled));
    }
    if let Some(error) = &frame.error {
        lines.push(format!("Error: {error}"));
    }

    lines.join("\n")
}

pub fn render_entry(entry: &MessageEntry) -> String {
    let level = match entry.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "warn",
        NoticeLevel::Error => "error",
    };
    let time = entry
        .timestamp
        .and_then(|ms| chrono::DateTime::from_timestamp_millis(ms as i64))
        .map(|time| time.format("%H:%M:%S ").to_string())
        .unwrap_or_default();
    format!("{time}[{level}] {}", entry.text)
}

fn now_ms() -> Option<u64> {
    u64::try_from(chrono::Utc::now().timestamp_millis()).ok()
}

/// Prints notices and screen changes until Ctrl-C.
pub struct ConsoleFrontend {
    config: FrontendConfig,
    collector: NoticeCollector,
    decimals: u8,
}

impl ConsoleFrontend {
    pub fn new(config: FrontendConfig, decimals: u8) -> Self {
        let collector = NoticeCollector::new(config.messages.clone()).with_clock(now_ms);
        Self {
            config,
            collector,
            decimals,
        }
    }

    pub fn config(&self) -> &FrontendConfig {
        &self.config
    }

    /// File `event` and return the line to print, if any.
    fn on_event(&mut self, event: &Event) -> Option<String> {
        if !self.collector.on_event(event).requires_redraw {
            return None;
        }
        self.collector.message_log().recent(1).next().map(render_entry)
    }

    fn frame(&self, view: &SessionView) -> SessionFrame {
        SessionFrame::from_view(view, self.collector.message_log(), 0)
    }
}

#[async_trait]
impl Frontend for ConsoleFrontend {
    async fn run(&mut self, controller: SessionController) -> Result<()> {
        let mut notices = controller.subscribe_notices();
        let mut transactions = controller.subscribe_transactions();
        let mut views = controller.subscribe();

        let initial = self.frame(&views.borrow_and_update());
        println!("{}", render_frame(&initial, self.decimals));
        let mut last_screen = initial.screen;
        let mut last_guesses = initial.guesses;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            let event = tokio::select! {
                _ = &mut ctrl_c => break,
                event = notices.recv() => event,
                event = transactions.recv() => event,
                changed = views.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let frame = self.frame(&views.borrow_and_update());
                    if frame.screen != last_screen || frame.guesses != last_guesses {
                        println!("{}", render_frame(&frame, self.decimals));
                        last_screen = frame.screen;
                        last_guesses = frame.guesses;
                    }
                    continue;
                }
            };

            match event {
                Ok(event) => {
                    if let Some(line) = self.on_event(&event) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Console lagged behind by {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }

        tracing::info!("Watch stopped");
        Ok(())
    }
}
