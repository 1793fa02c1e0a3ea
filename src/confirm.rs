//! Confirm-then-submit for actions that post to the server.

use crate::config::types::Labels;

/// A form post the server will act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    ToggleAlarm { character_id: u64 },
    MarkAsRead { character_id: u64 },
    /// One post flipping every character's alarm.
    ToggleAllAlarms,
    SaveSkillset {
        character_id: u64,
        skills: Vec<String>,
    },
}

impl Submission {
    /// Character id used in the endpoint path; 0 addresses all characters.
    pub fn target_id(&self) -> u64 {
        match self {
            Self::ToggleAlarm { character_id }
            | Self::MarkAsRead { character_id }
            | Self::SaveSkillset { character_id, .. } => *character_id,
            Self::ToggleAllAlarms => 0,
        }
    }
}

/// What the operator is asked to confirm, and what confirming will send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub description: String,
    pub submission: Submission,
}

impl PendingConfirmation {
    pub fn toggle_alarm(labels: &Labels, character_id: u64, character_name: &str) -> Self {
        Self {
            description: Labels::format(&labels.confirm_toggle_alarm, character_name),
            submission: Submission::ToggleAlarm { character_id },
        }
    }

    pub fn mark_as_read(labels: &Labels, character_id: u64, character_name: &str) -> Self {
        Self {
            description: Labels::format(&labels.confirm_mark_as_read, character_name),
            submission: Submission::MarkAsRead { character_id },
        }
    }

    pub fn toggle_all(labels: &Labels) -> Self {
        Self {
            description: labels.confirm_toggle_all.clone(),
            submission: Submission::ToggleAllAlarms,
        }
    }

    pub fn save_skillset(
        labels: &Labels,
        character_id: u64,
        character_name: &str,
        skills: Vec<String>,
    ) -> Self {
        Self {
            description: Labels::format(&labels.confirm_save_skillset, character_name),
            submission: Submission::SaveSkillset {
                character_id,
                skills,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfirmState {
    #[default]
    Idle,
    Pending(PendingConfirmation),
}

#[derive(Debug, Clone, Default)]
pub struct ActionConfirmer {
    state: ConfirmState,
}

impl ActionConfirmer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for confirmation, replacing anything captured earlier.
    pub fn request(&mut self, pending: PendingConfirmation) {
        tracing::debug!(description = %pending.description, "confirmation requested");
        self.state = ConfirmState::Pending(pending);
    }

    pub fn pending(&self) -> Option<&PendingConfirmation> {
        match &self.state {
            ConfirmState::Pending(p) => Some(p),
            ConfirmState::Idle => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending().is_some()
    }

    /// Hand out the captured submission exactly once.
    pub fn confirm(&mut self) -> Option<Submission> {
        match std::mem::take(&mut self.state) {
            ConfirmState::Pending(p) => Some(p.submission),
            ConfirmState::Idle => None,
        }
    }

    pub fn cancel(&mut self) {
        self.state = ConfirmState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_returns_captured_submission_once() {
        let labels = Labels::default();
        let mut c = ActionConfirmer::new();
        c.request(PendingConfirmation::toggle_alarm(&labels, 42, "Farmer One"));
        assert_eq!(
            c.pending().map(|p| p.description.as_str()),
            Some("Are you sure you want to toggle the alarm for Farmer One?")
        );
        assert_eq!(c.confirm(), Some(Submission::ToggleAlarm { character_id: 42 }));
        assert!(!c.is_pending());
        assert_eq!(c.confirm(), None);
    }

    #[test]
    fn mark_as_read_targets_one_character() {
        let pending = PendingConfirmation::mark_as_read(&Labels::default(), 7, "Farmer Two");
        assert_eq!(
            pending.description,
            "Are you sure you want to toggle mark as read for Farmer Two?"
        );
        assert_eq!(pending.submission.target_id(), 7);
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut c = ActionConfirmer::new();
        c.request(PendingConfirmation::toggle_all(&Labels::default()));
        c.cancel();
        assert_eq!(c.confirm(), None);
    }

    #[test]
    fn new_request_replaces_previous() {
        let labels = Labels::default();
        let mut c = ActionConfirmer::new();
        c.request(PendingConfirmation::toggle_alarm(&labels, 1, "A"));
        c.request(PendingConfirmation::save_skillset(
            &labels,
            2,
            "B",
            vec!["Drones".to_owned()],
        ));
        assert_eq!(
            c.confirm(),
            Some(Submission::SaveSkillset {
                character_id: 2,
                skills: vec!["Drones".to_owned()],
            })
        );
    }

    #[test]
    fn bulk_toggle_is_one_submission_for_everyone() {
        let p = PendingConfirmation::toggle_all(&Labels::default());
        assert_eq!(p.submission.target_id(), 0);
    }
}
