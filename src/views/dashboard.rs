//! Keyboard and engine-event handling for the dashboard, kept free of any
//! rendering so it can be driven directly from tests.

use chrono::{DateTime, Utc};
use iocraft::prelude::{KeyCode, KeyModifiers};

use crate::config::types::{AppConfig, Labels, TableSource};
use crate::confirm::{ActionConfirmer, PendingConfirmation, Submission};
use crate::engine::{Endpoint, Event};
use crate::skillset::SkillSetEditor;
use crate::types::{Character, RosterPayload};
use crate::views::detail::DetailModal;
use crate::views::rows::{TableRenderer, TableView, ViewConfig, ViewId};

/// Something the dashboard wants done outside itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fetch(Endpoint),
    Submit {
        submission: Submission,
        description: String,
    },
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

/// The skill-set dialog for one character.
#[derive(Debug, Clone)]
pub struct EditorSession {
    pub character_id: u64,
    pub character_name: String,
    pub editor: SkillSetEditor,
}

#[derive(Debug, Clone, Default)]
pub enum Mode {
    #[default]
    Normal,
    Search,
    /// Waiting for y/n. A skill-set save keeps its dialog so that `n`
    /// returns to it with the edits intact.
    Confirm { resume: Option<EditorSession> },
    Editor(EditorSession),
    Detail(DetailModal),
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    source: TableSource,
    labels: Labels,
    renderer: TableRenderer,
    roster: Option<RosterPayload>,
    active: ViewId,
    mode: Mode,
    confirmer: ActionConfirmer,
    status: Option<Status>,
    details_in_flight: bool,
    roster_in_flight: bool,
    last_fetch: Option<DateTime<Utc>>,
}

impl Dashboard {
    pub fn new(config: ViewConfig, source: TableSource, inactive_days: u32) -> Self {
        Self {
            source,
            labels: config.labels.clone(),
            renderer: TableRenderer::new(config, inactive_days),
            roster: None,
            active: ViewId::Details,
            mode: Mode::Normal,
            confirmer: ActionConfirmer::new(),
            status: None,
            details_in_flight: false,
            roster_in_flight: false,
            last_fetch: None,
        }
    }

    pub fn from_config(config: &AppConfig, view: ViewConfig) -> Self {
        Self::new(view, config.server.table_source, config.server.inactive_days)
    }

    // -- accessors -----------------------------------------------------------

    pub fn active(&self) -> ViewId {
        self.active
    }

    pub fn view(&self) -> &TableView {
        self.renderer.view(self.active)
    }

    pub fn renderer(&self) -> &TableRenderer {
        &self.renderer
    }

    pub fn roster(&self) -> Option<&RosterPayload> {
        self.roster.as_ref()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn confirmer(&self) -> &ActionConfirmer {
        &self.confirmer
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn is_loading(&self) -> bool {
        match self.source {
            TableSource::Details => self.details_in_flight,
            TableSource::Roster => self.roster_in_flight,
        }
    }

    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }

    // -- fetching ------------------------------------------------------------

    /// Empty both views and ask for fresh data.
    pub fn start(&mut self) -> Vec<Command> {
        self.renderer.clear();
        self.roster = None;
        let mut commands = Vec::with_capacity(2);
        if self.source == TableSource::Details {
            self.details_in_flight = true;
            commands.push(Command::Fetch(Endpoint::Details));
        }
        // The roster also backs the detail modal and the skill-set editor.
        self.roster_in_flight = true;
        commands.push(Command::Fetch(Endpoint::Roster));
        commands
    }

    pub fn apply_event(&mut self, event: Event, now: DateTime<Utc>) -> Vec<Command> {
        match event {
            Event::DetailsFetched { payload } => {
                self.details_in_flight = false;
                if self.source != TableSource::Details {
                    return Vec::new();
                }
                match self.renderer.render_details(&payload) {
                    Ok(()) => self.last_fetch = Some(now),
                    Err(e) => {
                        tracing::warn!("details payload rejected: {e}");
                        self.set_error(format!("details: {e}"));
                    }
                }
                Vec::new()
            }
            Event::RosterFetched { payload } => {
                self.roster_in_flight = false;
                if self.source == TableSource::Roster {
                    match self.renderer.render_roster(&payload, now) {
                        Ok(()) => self.last_fetch = Some(now),
                        Err(e) => {
                            tracing::warn!("roster payload rejected: {e}");
                            self.set_error(format!("roster: {e}"));
                            return Vec::new();
                        }
                    }
                }
                self.roster = Some(payload);
                Vec::new()
            }
            Event::FetchError { endpoint, message } => {
                match endpoint {
                    Endpoint::Details => self.details_in_flight = false,
                    Endpoint::Roster => self.roster_in_flight = false,
                }
                tracing::warn!("fetching {endpoint} failed: {message}");
                self.set_error(format!("{endpoint}: {message}"));
                Vec::new()
            }
            Event::SubmissionSent { description } => {
                self.set_info(format!("Sent: {description}"));
                self.start()
            }
            Event::SubmissionError {
                description,
                message,
            } => {
                self.set_error(format!("{description} failed: {message}"));
                Vec::new()
            }
        }
    }

    // -- keys ----------------------------------------------------------------

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Vec<Command> {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Command::Quit];
        }
        match std::mem::take(&mut self.mode) {
            Mode::Normal => self.normal_key(code),
            Mode::Search => {
                self.search_key(code);
                Vec::new()
            }
            Mode::Confirm { resume } => self.confirm_key(code, resume),
            Mode::Editor(session) => self.editor_key(code, modifiers, session),
            Mode::Detail(modal) => {
                self.detail_key(code, modal);
                Vec::new()
            }
        }
    }

    fn normal_key(&mut self, code: KeyCode) -> Vec<Command> {
        let view = self.renderer.view_mut(self.active);
        match code {
            KeyCode::Char('q') => return vec![Command::Quit],
            KeyCode::Tab
            | KeyCode::BackTab
            | KeyCode::Char('h' | 'l')
            | KeyCode::Left
            | KeyCode::Right => {
                self.active = self.active.other();
            }
            KeyCode::Down | KeyCode::Char('j') => view.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => view.move_cursor(-1),
            KeyCode::PageDown | KeyCode::Char('n') => view.next_page(),
            KeyCode::PageUp | KeyCode::Char('p') => view.prev_page(),
            KeyCode::Char('s') => view.cycle_sort(),
            KeyCode::Char('S') => view.flip_direction(),
            KeyCode::Char('/') => self.mode = Mode::Search,
            KeyCode::Char('a') => self.request_for_selected(PendingConfirmation::toggle_alarm),
            KeyCode::Char('m') => self.request_for_selected(PendingConfirmation::mark_as_read),
            KeyCode::Char('A') => {
                self.confirmer
                    .request(PendingConfirmation::toggle_all(&self.labels));
                self.mode = Mode::Confirm { resume: None };
            }
            KeyCode::Char('e') => self.open_editor(),
            KeyCode::Enter => self.open_detail(),
            KeyCode::Char('r') => {
                self.status = None;
                return self.start();
            }
            _ => {}
        }
        Vec::new()
    }

    fn search_key(&mut self, code: KeyCode) {
        let view = self.renderer.view_mut(self.active);
        match code {
            KeyCode::Esc => view.search(""),
            KeyCode::Enter => {}
            KeyCode::Backspace => {
                let mut term = view.search_term().to_owned();
                term.pop();
                view.search(&term);
                self.mode = Mode::Search;
            }
            KeyCode::Char(c) => {
                let term = format!("{}{c}", view.search_term());
                view.search(&term);
                self.mode = Mode::Search;
            }
            _ => self.mode = Mode::Search,
        }
    }

    fn confirm_key(&mut self, code: KeyCode, resume: Option<EditorSession>) -> Vec<Command> {
        match code {
            KeyCode::Char('y' | 'Y') => {
                let description = self
                    .confirmer
                    .pending()
                    .map(|p| p.description.clone())
                    .unwrap_or_default();
                match self.confirmer.confirm() {
                    Some(submission) => {
                        self.set_info(format!("Submitting: {description}"));
                        vec![Command::Submit {
                            submission,
                            description,
                        }]
                    }
                    None => Vec::new(),
                }
            }
            KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                self.confirmer.cancel();
                self.set_info("Cancelled".to_owned());
                if let Some(session) = resume {
                    self.mode = Mode::Editor(session);
                }
                Vec::new()
            }
            _ => {
                self.mode = Mode::Confirm { resume };
                Vec::new()
            }
        }
    }

    fn editor_key(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        mut session: EditorSession,
    ) -> Vec<Command> {
        let editor = &mut session.editor;
        match code {
            KeyCode::Esc => return Vec::new(),
            KeyCode::Char('s') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.confirmer.request(PendingConfirmation::save_skillset(
                    &self.labels,
                    session.character_id,
                    &session.character_name,
                    editor.submission(),
                ));
                self.mode = Mode::Confirm {
                    resume: Some(session),
                };
                return Vec::new();
            }
            KeyCode::Tab | KeyCode::BackTab => editor.toggle_focus(),
            KeyCode::Down => editor.move_cursor(1),
            KeyCode::Up => editor.move_cursor(-1),
            KeyCode::Enter => {
                editor.activate();
            }
            KeyCode::Backspace => {
                let mut term = editor.search().to_owned();
                term.pop();
                editor.apply_search(&term);
            }
            KeyCode::Char(c) => {
                let term = format!("{}{c}", editor.search());
                editor.apply_search(&term);
            }
            _ => {}
        }
        self.mode = Mode::Editor(session);
        Vec::new()
    }

    fn detail_key(&mut self, code: KeyCode, mut modal: DetailModal) {
        match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => return,
            KeyCode::Down | KeyCode::Char('j') => modal.scroll(1),
            KeyCode::Up | KeyCode::Char('k') => modal.scroll(-1),
            KeyCode::Tab | KeyCode::BackTab => modal.toggle_section(),
            KeyCode::Char('s') => modal.cycle_sort(),
            KeyCode::Char('S') => modal.flip_direction(),
            _ => {}
        }
        self.mode = Mode::Detail(modal);
    }

    // -- actions on the selected row -------------------------------------------

    /// Ask to confirm a per-character post built by `build` for the selected row.
    fn request_for_selected(&mut self, build: fn(&Labels, u64, &str) -> PendingConfirmation) {
        let Some(row) = self.view().selected() else {
            return;
        };
        let Some(character_id) = row.character_id else {
            let msg = format!("no character id for {}", row.name);
            self.set_error(msg);
            return;
        };
        let pending = build(&self.labels, character_id, &row.name);
        self.confirmer.request(pending);
        self.mode = Mode::Confirm { resume: None };
    }

    fn open_editor(&mut self) {
        let Some((character, known)) = self.selected_roster_character().map(|(c, r)| {
            let known = r.known_skills(c.character_id).to_vec();
            (c.clone(), known)
        }) else {
            return;
        };
        let known = if known.is_empty() {
            character.skills.iter().map(|s| s.name.clone()).collect()
        } else {
            known
        };
        self.mode = Mode::Editor(EditorSession {
            character_id: character.character_id,
            character_name: character.character_name.clone(),
            editor: SkillSetEditor::open(known, &character.skillset),
        });
    }

    fn open_detail(&mut self) {
        let Some(modal) = self
            .selected_roster_character()
            .map(|(c, _)| DetailModal::open(c))
        else {
            return;
        };
        self.mode = Mode::Detail(modal);
    }

    /// The roster record behind the selected row, reporting why there is
    /// none on the status line.
    fn selected_roster_character(&mut self) -> Option<(&Character, &RosterPayload)> {
        let row = self.renderer.view(self.active).selected()?;
        let (id, name) = (row.character_id, row.name.clone());
        let Some(id) = id else {
            self.set_error(format!("no character id for {name}"));
            return None;
        };
        if self.roster.is_none() {
            let msg = if self.roster_in_flight {
                format!("{name}: roster still loading")
            } else {
                format!("{name}: roster not available")
            };
            self.set_error(msg);
            return None;
        }
        let roster = self.roster.as_ref()?;
        match roster.character(id) {
            Some(character) => Some((character, roster)),
            None => {
                self.status = Some(Status {
                    kind: StatusKind::Error,
                    text: format!("{name}: not in roster"),
                });
                None
            }
        }
    }

    fn set_info(&mut self, text: String) {
        self.status = Some(Status {
            kind: StatusKind::Info,
            text,
        });
    }

    fn set_error(&mut self, text: String) {
        self.status = Some(Status {
            kind: StatusKind::Error,
            text,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DetailsPayload, RosterGroup, Skill};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn character(id: u64, name: &str) -> Character {
        Character {
            character_id: id,
            character_name: name.to_owned(),
            notification: false,
            last_update: Some(now()),
            skillset: vec!["Cybernetics".to_owned()],
            skills: vec![Skill {
                name: "Cybernetics".to_owned(),
                level: 5,
                trained_sp: 256_000,
                end_sp: 256_000,
                start_sp: 0,
            }],
            skillqueue: Vec::new(),
        }
    }

    fn roster(characters: Vec<Character>) -> RosterPayload {
        RosterPayload {
            groups: vec![RosterGroup {
                skills: vec!["Cybernetics".to_owned(), "Gunnery".to_owned()],
                characters,
            }],
        }
    }

    fn key(d: &mut Dashboard, code: KeyCode) -> Vec<Command> {
        d.handle_key(code, KeyModifiers::NONE)
    }

    fn roster_dashboard() -> Dashboard {
        let mut d = Dashboard::new(ViewConfig::default(), TableSource::Roster, 3);
        assert_eq!(d.start(), vec![Command::Fetch(Endpoint::Roster)]);
        d.apply_event(
            Event::RosterFetched {
                payload: roster(vec![character(1, "Alpha"), character(2, "Bravo")]),
            },
            now(),
        );
        d
    }

    #[test]
    fn start_fetches_both_endpoints_for_detail_source() {
        let mut d = Dashboard::new(ViewConfig::default(), TableSource::Details, 3);
        assert_eq!(
            d.start(),
            vec![
                Command::Fetch(Endpoint::Details),
                Command::Fetch(Endpoint::Roster)
            ]
        );
        assert!(d.is_loading());
        assert!(!d.view().is_loaded());
    }

    #[test]
    fn roster_event_fills_active_view() {
        let d = roster_dashboard();
        assert_eq!(d.view().len(), 2);
        assert!(!d.is_loading());
        assert_eq!(d.last_fetch(), Some(now()));
    }

    #[test]
    fn fetch_error_leaves_views_empty_and_reports() {
        let mut d = Dashboard::new(ViewConfig::default(), TableSource::Details, 3);
        d.start();
        d.apply_event(
            Event::FetchError {
                endpoint: Endpoint::Details,
                message: "boom".to_owned(),
            },
            now(),
        );
        assert!(!d.view().is_loaded());
        let status = d.status().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "details: boom");
    }

    #[test]
    fn empty_details_payload_renders_empty_views() {
        let mut d = Dashboard::new(ViewConfig::default(), TableSource::Details, 3);
        d.start();
        d.apply_event(
            Event::DetailsFetched {
                payload: DetailsPayload::default(),
            },
            now(),
        );
        assert!(d.view().is_loaded());
        assert!(d.view().is_empty());
    }

    #[test]
    fn toggle_alarm_confirm_yields_submission() {
        let mut d = roster_dashboard();
        assert!(key(&mut d, KeyCode::Char('a')).is_empty());
        assert!(matches!(d.mode(), Mode::Confirm { .. }));
        let commands = key(&mut d, KeyCode::Char('y'));
        assert_eq!(
            commands,
            vec![Command::Submit {
                submission: Submission::ToggleAlarm { character_id: 1 },
                description: "Are you sure you want to toggle the alarm for Alpha?".to_owned(),
            }]
        );
        assert!(matches!(d.mode(), Mode::Normal));
        assert!(!d.confirmer().is_pending());
    }

    #[test]
    fn mark_as_read_confirm_yields_submission() {
        let mut d = roster_dashboard();
        key(&mut d, KeyCode::Char('j'));
        assert!(key(&mut d, KeyCode::Char('m')).is_empty());
        assert_eq!(
            d.confirmer().pending().map(|p| p.description.as_str()),
            Some("Are you sure you want to toggle mark as read for Bravo?")
        );
        assert_eq!(
            key(&mut d, KeyCode::Char('y')),
            vec![Command::Submit {
                submission: Submission::MarkAsRead { character_id: 2 },
                description: "Are you sure you want to toggle mark as read for Bravo?".to_owned(),
            }]
        );
    }

    #[test]
    fn cancel_sends_nothing() {
        let mut d = roster_dashboard();
        key(&mut d, KeyCode::Char('A'));
        assert!(key(&mut d, KeyCode::Char('n')).is_empty());
        assert!(matches!(d.mode(), Mode::Normal));
        assert!(!d.confirmer().is_pending());
    }

    #[test]
    fn toggle_all_targets_everyone() {
        let mut d = roster_dashboard();
        key(&mut d, KeyCode::Char('A'));
        let commands = key(&mut d, KeyCode::Char('y'));
        assert!(matches!(
            commands.as_slice(),
            [Command::Submit {
                submission: Submission::ToggleAllAlarms,
                ..
            }]
        ));
    }

    #[test]
    fn submission_sent_clears_and_refetches() {
        let mut d = roster_dashboard();
        let commands = d.apply_event(
            Event::SubmissionSent {
                description: "x".to_owned(),
            },
            now(),
        );
        assert_eq!(commands, vec![Command::Fetch(Endpoint::Roster)]);
        assert!(!d.view().is_loaded());
        assert!(d.roster().is_none());
    }

    #[test]
    fn editor_save_goes_through_confirmation_and_cancel_returns_to_editor() {
        let mut d = roster_dashboard();
        key(&mut d, KeyCode::Char('e'));
        let Mode::Editor(session) = d.mode() else {
            panic!("editor not open");
        };
        assert_eq!(session.editor.selected(), ["Cybernetics"]);

        for c in "gun".chars() {
            key(&mut d, KeyCode::Char(c));
        }
        key(&mut d, KeyCode::Enter);
        d.handle_key(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(matches!(d.mode(), Mode::Confirm { resume: Some(_) }));

        key(&mut d, KeyCode::Esc);
        let Mode::Editor(session) = d.mode() else {
            panic!("editor not restored");
        };
        assert_eq!(session.editor.selected(), ["Cybernetics", "Gunnery"]);

        d.handle_key(KeyCode::Char('s'), KeyModifiers::CONTROL);
        let commands = key(&mut d, KeyCode::Char('y'));
        assert_eq!(
            commands,
            vec![Command::Submit {
                submission: Submission::SaveSkillset {
                    character_id: 1,
                    skills: vec!["Cybernetics".to_owned(), "Gunnery".to_owned()],
                },
                description: "Save the skill set for Alpha?".to_owned(),
            }]
        );
        assert!(matches!(d.mode(), Mode::Normal));
    }

    #[test]
    fn editor_escape_discards_edits() {
        let mut d = roster_dashboard();
        key(&mut d, KeyCode::Char('e'));
        key(&mut d, KeyCode::Tab);
        key(&mut d, KeyCode::Enter);
        key(&mut d, KeyCode::Esc);
        assert!(matches!(d.mode(), Mode::Normal));
        assert!(!d.confirmer().is_pending());
    }

    #[test]
    fn detail_modal_opens_for_selected_row() {
        let mut d = roster_dashboard();
        key(&mut d, KeyCode::Char('j'));
        key(&mut d, KeyCode::Enter);
        let Mode::Detail(modal) = d.mode() else {
            panic!("modal not open");
        };
        assert_eq!(modal.title, "Bravo");
        key(&mut d, KeyCode::Esc);
        assert!(matches!(d.mode(), Mode::Normal));
    }

    #[test]
    fn detail_without_roster_reports_status() {
        let mut d = Dashboard::new(ViewConfig::default(), TableSource::Details, 3);
        d.start();
        d.apply_event(
            Event::FetchError {
                endpoint: Endpoint::Roster,
                message: "down".to_owned(),
            },
            now(),
        );
        let payload: DetailsPayload = serde_json::from_str(
            r#"{"details": {"1": {
                "character": {"character_html": "<b>Alpha</b>", "character_id": 1},
                "details": {"progress": 50, "is_extraction_ready": "", "last_update": null, "is_filter": false},
                "actions": ""
            }}, "inactive": {}}"#,
        )
        .unwrap();
        d.apply_event(Event::DetailsFetched { payload }, now());
        assert_eq!(d.view().len(), 1);

        key(&mut d, KeyCode::Enter);
        assert!(matches!(d.mode(), Mode::Normal));
        assert_eq!(d.status().unwrap().text, "Alpha: roster not available");
    }

    #[test]
    fn search_filters_active_view_and_escape_clears() {
        let mut d = roster_dashboard();
        key(&mut d, KeyCode::Char('/'));
        key(&mut d, KeyCode::Char('b'));
        key(&mut d, KeyCode::Char('r'));
        assert_eq!(d.view().visible_len(), 1);
        key(&mut d, KeyCode::Enter);
        assert!(matches!(d.mode(), Mode::Normal));
        assert_eq!(d.view().search_term(), "br");

        key(&mut d, KeyCode::Char('/'));
        key(&mut d, KeyCode::Esc);
        assert_eq!(d.view().visible_len(), 2);
    }

    #[test]
    fn tab_switches_between_views() {
        let mut d = roster_dashboard();
        assert_eq!(d.active(), ViewId::Details);
        key(&mut d, KeyCode::Tab);
        assert_eq!(d.active(), ViewId::Inactive);
        assert!(d.view().is_empty());
    }

    #[test]
    fn quit_keys() {
        let mut d = roster_dashboard();
        assert_eq!(key(&mut d, KeyCode::Char('q')), vec![Command::Quit]);
        assert_eq!(
            d.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            vec![Command::Quit]
        );
    }
}
