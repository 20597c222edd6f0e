//! Line commands read from stdin.

use clap::{Parser, Subcommand};
use respawn_core::RespawnService;

use crate::messages;

#[derive(Parser)]
#[command(name = "respawn", about = "boss respawn timers")]
struct Line {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Mark a boss as killed now.
    Kill {
        #[arg(required = true)]
        boss: Vec<String>,
    },
    /// Time left for one boss, or for every active boss.
    Time { boss: Vec<String> },
    /// Every active timer, soonest first.
    List,
    /// Known bosses and their respawn intervals.
    Bosses,
    Quit,
}

pub enum Reply {
    Text(String),
    Quit,
}

/// Parse and run one line. `Err` carries text for the user (parse errors, help),
/// always newline-terminated.
pub async fn respond(line: &str, service: &RespawnService) -> Result<Reply, String> {
    let mut args = shlex::split(line).ok_or_else(|| terminated("error: Invalid quoting"))?;
    args.insert(0, "respawn".to_string());
    let parsed = Line::try_parse_from(args).map_err(|e| terminated(&e.to_string()))?;

    let text = match parsed.command {
        Some(Command::Kill { boss }) => match service.register_kill(&boss.join(" ")).await {
            Ok(receipt) => messages::render_receipt(&receipt),
            Err(err) => messages::render_error(&err),
        },
        Some(Command::Time { boss }) if boss.is_empty() => {
            messages::render_all(&service.all_remaining().await)
        }
        Some(Command::Time { boss }) => match service.remaining(&boss.join(" ")).await {
            Ok((id, remaining)) => messages::render_remaining(&id, remaining),
            Err(err) => messages::render_error(&err),
        },
        Some(Command::List) => messages::render_all(&service.all_remaining().await),
        Some(Command::Bosses) => messages::render_roster(&service.roster().await),
        Some(Command::Quit) => return Ok(Reply::Quit),
        None => String::new(),
    };
    Ok(Reply::Text(text))
}

fn terminated(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use respawn_core::RespawnBuilder;
    use respawn_core::domain::BossRoster;
    use respawn_core::impls::InMemoryTimerStore;
    use respawn_core::ports::{Clock, FixedClock};

    use super::*;

    fn start(clock: Arc<FixedClock>) -> RespawnService {
        RespawnBuilder::new(BossRoster::from_hours([("venatus", 10), ("lady_daliah", 18)]))
            .warnings(&[10, 5])
            .store(InMemoryTimerStore::new())
            .clock(clock as Arc<dyn Clock>)
            .start()
            .unwrap()
    }

    async fn text(line: &str, service: &RespawnService) -> String {
        match respond(line, service).await {
            Ok(Reply::Text(text)) => text,
            Ok(Reply::Quit) => "<quit>".to_string(),
            Err(err) => format!("<err> {err}"),
        }
    }

    #[tokio::test]
    async fn kill_then_time() {
        let clock = Arc::new(FixedClock::at_epoch());
        let service = start(Arc::clone(&clock));

        let reply = text("kill lady daliah", &service).await;
        assert!(reply.starts_with("LADY DALIAH registered"), "{reply}");

        clock.advance(chrono::Duration::minutes(90));
        assert_eq!(
            text("time \"Lady Daliah\"", &service).await,
            "⏳ LADY DALIAH respawns in 16h 30m"
        );
        assert_eq!(
            text("kill lady_daliah", &service).await,
            "❌ LADY DALIAH is already dead. Respawn at 1970-01-01 18:00 UTC."
        );
        service.shutdown().await;
    }

    #[tokio::test]
    async fn time_without_boss_lists_all() {
        let service = start(Arc::new(FixedClock::at_epoch()));
        assert_eq!(text("time", &service).await, "No active timers.");
        text("kill venatus", &service).await;
        assert!(text("list", &service).await.starts_with("VENATUS"));
        assert_eq!(text("time venatus", &service).await, "⏳ VENATUS respawns in 10h 0m");
        service.shutdown().await;
    }

    #[tokio::test]
    async fn rejects_unknown_and_inactive() {
        let service = start(Arc::new(FixedClock::at_epoch()));
        assert_eq!(text("kill zakum", &service).await, "❌ Unknown boss: zakum");
        assert_eq!(
            text("time venatus", &service).await,
            "❌ VENATUS is not active."
        );
        assert!(text("bogus", &service).await.starts_with("<err>"));
        assert_eq!(
            text("kill 'unterminated", &service).await,
            "<err> error: Invalid quoting\n"
        );
        service.shutdown().await;
    }

    #[tokio::test]
    async fn bosses_and_quit() {
        let service = start(Arc::new(FixedClock::at_epoch()));
        let roster = text("bosses", &service).await;
        assert!(roster.contains("VENATUS"));
        assert!(roster.contains("LADY DALIAH"));
        assert_eq!(text("quit", &service).await, "<quit>");
        service.shutdown().await;
    }
}
