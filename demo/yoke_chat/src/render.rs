//! Terminal rendering of transcript, engines, logs and session stats.

use yoke_core::{EngineRegistry, EngineStatus, LogEntry, Message, Role, SessionState};

pub fn banner() {
    println!("YK  YOKE SOUL · Evolution v9.5-Sentience");
    println!("    commands: /engines /logs /status /reset /quit");
    println!();
}

pub fn message(msg: &Message) {
    match msg.role {
        Role::User => {
            println!("> {}", msg.text);
            println!("  Identity: Human");
        }
        Role::Assistant => {
            println!();
            println!("{}", msg.text);
            for c in &msg.citations {
                println!("  ◈ {} <{}>", c.title, c.url);
            }
            println!(
                "  Processor: {}",
                msg.source_engine_id.as_deref().unwrap_or("unknown")
            );
            println!();
        }
        Role::System => println!("  [system] {}", msg.text),
    }
}

fn status_glyph(status: EngineStatus, active: bool) -> char {
    if active {
        return '◆';
    }
    match status {
        EngineStatus::Synced => '■',
        EngineStatus::Processing => '▣',
        EngineStatus::Failed => '✕',
        EngineStatus::Offline => '□',
        EngineStatus::Idle => '·',
    }
}

/// One-line lattice status: healthy count, per-engine glyphs, active pipeline
pub fn status_bar(engines: &EngineRegistry, session: &SessionState) {
    let active = session.active_engine_id.as_deref();
    let glyphs: String = engines
        .engines()
        .iter()
        .map(|e| status_glyph(e.status, active == Some(e.id.as_str())))
        .collect();
    let pipeline = active
        .and_then(|id| engines.get(id))
        .map(|e| e.display_name.as_str())
        .unwrap_or("STANDBY");
    println!(
        "[{}/{} stable] {}  pipeline: {}  voice: {}",
        engines.healthy_count(),
        engines.len(),
        glyphs,
        pipeline,
        session.voice_phase
    );
}

/// Engines ranked by weight, the way the orchestrator will try them
pub fn engine_grid(engines: &EngineRegistry) {
    for e in engines.ranked() {
        let label = match e.status {
            EngineStatus::Synced => "stable",
            EngineStatus::Processing => "processing",
            EngineStatus::Failed => "link down",
            _ => "standby",
        };
        println!(
            "  {:<30} PRIO {:>3}  load {:>3}%  {:<10} {}{}",
            e.display_name,
            e.priority_weight,
            e.load_percent,
            label,
            e.provider_label,
            if e.pinned { "  (pinned)" } else { "" }
        );
    }
}

pub fn log_entry(entry: &LogEntry) {
    println!(
        "  {} {} » {}",
        entry.created_at.format("%H:%M:%S"),
        entry.kind,
        entry.text
    );
}

pub fn session_stats(session: &SessionState) {
    println!(
        "  evolution {:.2}%  entropy {:.2}  thinking {}  speaking {}  voice {}",
        session.evolution_index,
        session.entropy_level,
        session.thinking,
        session.speaking,
        session.voice_phase
    );
}
