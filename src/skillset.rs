//! Working set behind the skill-set filter editor.
//!
//! The editor owns its selection until it is submitted or dropped; nothing
//! is written back to the character it was opened for.

use crate::filter::filter_names;

/// Split the roster's comma-joined skill-set field into an ordered list
/// without blanks or repeats.
pub fn parse_skillset(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !out.iter().any(|n| n == name) {
            out.push(name.to_owned());
        }
    }
    out
}

/// Which list keyboard navigation acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorFocus {
    #[default]
    Candidates,
    Selected,
}

#[derive(Debug, Clone, Default)]
pub struct SkillSetEditor {
    known: Vec<String>,
    selected: Vec<String>,
    search: String,
    /// Indices into `known` that match the search and are not selected.
    visible: Vec<usize>,
    focus: EditorFocus,
    candidate_cursor: usize,
    selected_cursor: usize,
}

impl SkillSetEditor {
    pub fn new(known: Vec<String>) -> Self {
        let mut editor = Self {
            known,
            ..Self::default()
        };
        editor.recompute();
        editor
    }

    /// Editor opened for a character whose current filter is `initial`.
    pub fn open(known: Vec<String>, initial: &[String]) -> Self {
        let mut editor = Self::new(known);
        editor.reset(initial);
        editor
    }

    /// Discard unsaved edits and the search term; start over from `initial`.
    /// Names outside the known list are dropped, as `select` would.
    pub fn reset(&mut self, initial: &[String]) {
        self.selected.clear();
        for name in initial.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if !self.is_selected(name) && self.known.iter().any(|k| k == name) {
                self.selected.push(name.to_owned());
            }
        }
        self.search.clear();
        self.focus = EditorFocus::Candidates;
        self.candidate_cursor = 0;
        self.selected_cursor = 0;
        self.recompute();
    }

    pub fn apply_search(&mut self, term: &str) {
        term.clone_into(&mut self.search);
        self.recompute();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn visible_candidates(&self) -> Vec<&str> {
        self.visible.iter().map(|&i| self.known[i].as_str()).collect()
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|s| s == name)
    }

    /// Append `name` unless it is blank, unknown or already selected.
    /// Returns whether the selection changed.
    pub fn select(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.is_selected(name) || !self.known.iter().any(|k| k == name) {
            return false;
        }
        self.selected.push(name.to_owned());
        self.recompute();
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|s| s != name);
        if self.selected.len() == before {
            return false;
        }
        self.recompute();
        true
    }

    /// Names to submit, in selection order.
    pub fn submission(&self) -> Vec<String> {
        self.selected
            .iter()
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .collect()
    }

    pub fn into_submission(self) -> Vec<String> {
        self.submission()
    }

    // -- keyboard navigation -------------------------------------------------

    pub fn focus(&self) -> EditorFocus {
        self.focus
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            EditorFocus::Candidates => EditorFocus::Selected,
            EditorFocus::Selected => EditorFocus::Candidates,
        };
    }

    /// Cursor position within the focused list.
    pub fn cursor(&self) -> usize {
        match self.focus {
            EditorFocus::Candidates => self.candidate_cursor,
            EditorFocus::Selected => self.selected_cursor,
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let (cursor, len) = match self.focus {
            EditorFocus::Candidates => (&mut self.candidate_cursor, self.visible.len()),
            EditorFocus::Selected => (&mut self.selected_cursor, self.selected.len()),
        };
        if len == 0 {
            *cursor = 0;
            return;
        }
        *cursor = cursor.saturating_add_signed(delta).min(len - 1);
    }

    pub fn select_at_cursor(&mut self) -> bool {
        let Some(&idx) = self.visible.get(self.candidate_cursor) else {
            return false;
        };
        let name = self.known[idx].clone();
        self.select(&name)
    }

    pub fn remove_at_cursor(&mut self) -> bool {
        let Some(name) = self.selected.get(self.selected_cursor).cloned() else {
            return false;
        };
        self.remove(&name)
    }

    /// Select or remove the entry under the cursor, depending on focus.
    pub fn activate(&mut self) -> bool {
        match self.focus {
            EditorFocus::Candidates => self.select_at_cursor(),
            EditorFocus::Selected => self.remove_at_cursor(),
        }
    }

    fn recompute(&mut self) {
        self.visible = filter_names(&self.known, &self.search)
            .into_iter()
            .filter(|&i| !self.is_selected(&self.known[i]))
            .collect();
        self.candidate_cursor = self
            .candidate_cursor
            .min(self.visible.len().saturating_sub(1));
        self.selected_cursor = self
            .selected_cursor
            .min(self.selected.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> Vec<String> {
        ["Drones", "Drone Interfacing", "Gunnery", "Navigation"]
            .iter()
            .map(|s| (*s).to_owned())
            .collect()
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn parse_skillset_drops_blanks_and_repeats() {
        assert_eq!(parse_skillset("A, B,,A"), names(&["A", "B"]));
        assert!(parse_skillset("").is_empty());
        assert!(parse_skillset(" , ").is_empty());
    }

    #[test]
    fn select_then_remove_round_trips() {
        let mut ed = SkillSetEditor::open(known(), &names(&["Gunnery"]));
        let before = ed.selected().to_vec();
        assert!(ed.select("Drones"));
        assert!(ed.remove("Drones"));
        assert_eq!(ed.selected(), before.as_slice());
    }

    #[test]
    fn select_is_idempotent() {
        let mut ed = SkillSetEditor::open(known(), &names(&["Gunnery", "Drones"]));
        assert!(!ed.select("Gunnery"));
        assert_eq!(ed.selected(), names(&["Gunnery", "Drones"]).as_slice());
    }

    #[test]
    fn blank_and_unknown_names_are_ignored() {
        let mut ed = SkillSetEditor::new(known());
        assert!(!ed.select("   "));
        assert!(!ed.select("Cooking"));
        assert!(ed.selected().is_empty());
    }

    #[test]
    fn search_filters_candidates_without_touching_selection() {
        let mut ed = SkillSetEditor::open(known(), &names(&["Drones"]));
        ed.apply_search("DRONE");
        assert_eq!(ed.visible_candidates(), vec!["Drone Interfacing"]);
        assert_eq!(ed.selected(), names(&["Drones"]).as_slice());

        // Removed skill reappears when it matches the search.
        ed.remove("Drones");
        assert_eq!(ed.visible_candidates(), vec!["Drones", "Drone Interfacing"]);
    }

    #[test]
    fn reset_discards_edits_and_search() {
        let mut ed = SkillSetEditor::open(known(), &names(&["Gunnery"]));
        ed.select("Navigation");
        ed.apply_search("nav");
        ed.reset(&names(&["Drones", " ", "Drones"]));
        assert_eq!(ed.selected(), names(&["Drones"]).as_slice());
        assert_eq!(ed.search(), "");
        assert_eq!(ed.visible_candidates().len(), 3);
    }

    #[test]
    fn reset_drops_unknown_names() {
        let ed = SkillSetEditor::open(known(), &names(&["Cooking", "Gunnery", "Cooking"]));
        assert_eq!(ed.selected(), names(&["Gunnery"]).as_slice());
        assert_eq!(ed.into_submission(), names(&["Gunnery"]));
    }

    #[test]
    fn submission_keeps_insertion_order() {
        let mut ed = SkillSetEditor::new(known());
        ed.select("Navigation");
        ed.select("Drones");
        assert_eq!(ed.into_submission(), names(&["Navigation", "Drones"]));
    }

    #[test]
    fn cursor_drives_selection() {
        let mut ed = SkillSetEditor::new(known());
        ed.move_cursor(2);
        assert!(ed.activate());
        assert_eq!(ed.selected(), names(&["Gunnery"]).as_slice());

        ed.move_cursor(10);
        assert_eq!(ed.cursor(), 2);

        ed.toggle_focus();
        assert_eq!(ed.focus(), EditorFocus::Selected);
        assert!(ed.activate());
        assert!(ed.selected().is_empty());
        assert!(!ed.activate());
    }
}
