use super::Member;
use crate::shared::EventLog;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberEvent {
    Created { member: Member },
}

impl MemberEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "member_created",
        }
    }
}

/// Fire-and-forget delivery of member events.
pub trait NotificationSink {
    fn send(&self, event: &MemberEvent);
}

#[derive(Debug, Clone)]
pub struct LogNotifications {
    log: EventLog,
}

impl LogNotifications {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl NotificationSink for LogNotifications {
    fn send(&self, event: &MemberEvent) {
        match event {
            MemberEvent::Created { member } => self.log.info(
                "member.created",
                &format!(
                    "member={} project={} principal={} roles={}",
                    member.id,
                    member.project_id,
                    member.principal.name,
                    member
                        .roles
                        .iter()
                        .map(|role| role.name.as_str())
                        .collect::<Vec<_>>()
                        .join(",")
                ),
            ),
        }
    }
}

/// Keeps every event in memory; used by embedders that inspect deliveries.
#[derive(Debug, Default)]
pub struct RecordingNotifications {
    events: Mutex<Vec<MemberEvent>>,
}

impl RecordingNotifications {
    pub fn events(&self) -> Vec<MemberEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for RecordingNotifications {
    fn send(&self, event: &MemberEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
