//! Timed notification queue.
//!
//! Simulation systems emit [`GameMessage`] events (crimes, escalating-event
//! stage text, external cheat activations); they are collected into a
//! [`MessageLog`] whose entries expire on their own tick timers. The HUD
//! layer only ever reads the log.

use bevy::prelude::*;

use crate::config::MESSAGE_TICKS;

/// Event emitted by other systems to surface a message to the player.
#[derive(Event, Debug, Clone)]
pub struct GameMessage {
    pub text: String,
    pub duration_ticks: u32,
}

impl GameMessage {
    /// A message with the default 3-second display time.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            duration_ticks: MESSAGE_TICKS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MessageEntry {
    pub text: String,
    pub remaining: u32,
}

#[derive(Resource, Default)]
pub struct MessageLog {
    pub entries: Vec<MessageEntry>,
}

impl MessageLog {
    pub fn active_texts(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.text.clone()).collect()
    }
}

pub fn collect_messages(mut events: EventReader<GameMessage>, mut log: ResMut<MessageLog>) {
    for msg in events.read() {
        log.entries.push(MessageEntry {
            text: msg.text.clone(),
            remaining: msg.duration_ticks,
        });
    }
}

pub fn expire_messages(mut log: ResMut<MessageLog>) {
    for entry in log.entries.iter_mut() {
        entry.remaining = entry.remaining.saturating_sub(1);
    }
    log.entries.retain(|e| e.remaining > 0);
}

pub struct NotificationsPlugin;

impl Plugin for NotificationsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<GameMessage>().init_resource::<MessageLog>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_expire_on_their_own_timers() {
        let mut log = MessageLog::default();
        log.entries.push(MessageEntry {
            text: "short".into(),
            remaining: 2,
        });
        log.entries.push(MessageEntry {
            text: "long".into(),
            remaining: 5,
        });
        expire_once(&mut log);
        expire_once(&mut log);
        assert_eq!(log.active_texts(), vec!["long".to_string()]);
    }

    fn expire_once(log: &mut MessageLog) {
        for entry in log.entries.iter_mut() {
            entry.remaining = entry.remaining.saturating_sub(1);
        }
        log.entries.retain(|e| e.remaining > 0);
    }

    #[test]
    fn test_default_duration() {
        let msg = GameMessage::new("hey");
        assert_eq!(msg.duration_ticks, MESSAGE_TICKS);
    }
}
