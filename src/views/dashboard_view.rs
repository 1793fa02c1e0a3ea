use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use iocraft::prelude::*;

use crate::color::ColorDepth;
use crate::components::footer::{self, Footer, RenderedFooter};
use crate::components::modal::{
    Modal, ModalBuildConfig, ModalPane, RenderedModal, modal_inner_width, modal_size,
};
use crate::components::tab_bar::{RenderedTabBar, Tab, TabBar};
use crate::components::table::{Column, RenderedTable, Row, ScrollableTable, TableBuildConfig};
use crate::components::text_input::{RenderedTextInput, TextInput};
use crate::config::types::AppConfig;
use crate::engine::{Endpoint, EngineHandle, Event, Request};
use crate::skillset::EditorFocus;
use crate::theme::ResolvedTheme;
use crate::views::dashboard::{Command, Dashboard, EditorSession, Mode, StatusKind};
use crate::views::detail::{DetailModal, ModalSection};
use crate::views::rows::{RowHighlight, SortDirection, ViewConfig, ViewId, character_columns};

#[derive(Default, Props)]
pub struct DashboardViewProps<'a> {
    pub config: Option<&'a AppConfig>,
    pub engine: Option<&'a EngineHandle>,
    pub theme: Option<&'a ResolvedTheme>,
    pub color_depth: ColorDepth,
    pub width: u16,
    pub height: u16,
    pub should_exit: Option<State<bool>>,
}

#[component]
pub fn DashboardView<'a>(
    props: &DashboardViewProps<'a>,
    mut hooks: Hooks,
) -> impl Into<AnyElement<'a>> {
    let theme = props.theme.cloned().unwrap_or_else(super::default_theme);
    let config = props.config.cloned().unwrap_or_default();
    let depth = props.color_depth;

    let dashboard = hooks.use_state({
        let config = config.clone();
        let theme = theme.clone();
        move || Dashboard::from_config(&config, ViewConfig::new(&config, &theme))
    });

    // Event channel: the engine answers every request on this sender.
    let event_channel = hooks.use_state(|| {
        let (tx, rx) = std::sync::mpsc::channel::<Event>();
        (tx, Arc::new(Mutex::new(rx)))
    });
    let (event_tx, event_rx) = event_channel.read().clone();
    let engine: Option<EngineHandle> = props.engine.cloned();

    let mut started = hooks.use_state(|| false);
    if !started.get() {
        started.set(true);
        let commands = update(dashboard, Dashboard::start);
        dispatch(commands, engine.as_ref(), &event_tx, props.should_exit);
    }

    // Poll engine events.
    {
        let engine = engine.clone();
        let event_tx = event_tx.clone();
        let should_exit = props.should_exit;
        hooks.use_future(async move {
            loop {
                smol::Timer::after(std::time::Duration::from_millis(100)).await;
                let events: Vec<Event> = match event_rx.lock() {
                    Ok(rx) => rx.try_iter().collect(),
                    Err(_) => break,
                };
                for event in events {
                    let commands = update(dashboard, |d| d.apply_event(event, Utc::now()));
                    dispatch(commands, engine.as_ref(), &event_tx, should_exit);
                }
            }
        });
    }

    hooks.use_terminal_events({
        let engine = engine.clone();
        let event_tx = event_tx.clone();
        let should_exit = props.should_exit;
        move |event| match event {
            TerminalEvent::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) if kind != KeyEventKind::Release => {
                let commands = update(dashboard, |d| d.handle_key(code, modifiers));
                dispatch(commands, engine.as_ref(), &event_tx, should_exit);
            }
            _ => {}
        }
    });

    let state = dashboard.read();
    let view = state.view();
    let labels = state.labels();

    // -- tab bar ---------------------------------------------------------------

    let tabs: Vec<Tab> = [
        (ViewId::Details, &labels.details_tab),
        (ViewId::Inactive, &labels.inactive_tab),
    ]
    .into_iter()
    .map(|(id, title)| {
        let v = state.renderer().view(id);
        Tab {
            title: title.clone(),
            count: v.is_loaded().then_some(v.len()),
        }
    })
    .collect();
    let active_idx = match state.active() {
        ViewId::Details => 0,
        ViewId::Inactive => 1,
    };
    let rendered_tab_bar = RenderedTabBar::build(
        &tabs,
        active_idx,
        depth,
        Some(theme.border_primary),
        Some(theme.text_faint),
        Some(theme.border_faint),
    );

    // -- table -----------------------------------------------------------------

    let columns = character_columns();
    let rows = view.page_cells();
    let backgrounds: Vec<_> = view
        .page_rows()
        .iter()
        .map(|r| match r.highlight() {
            RowHighlight::None => None,
            RowHighlight::Warning => Some(theme.bg_row_warning),
            RowHighlight::Alert => Some(theme.bg_row_alert),
        })
        .collect();
    let (sort_col, sort_dir) = view.sort();
    let empty_message = if state.is_loading() || !view.is_loaded() {
        labels.loading.as_str()
    } else {
        labels.no_rows.as_str()
    };
    let rendered_table = RenderedTable::build(&TableBuildConfig {
        columns: &columns,
        rows: &rows,
        row_backgrounds: &backgrounds,
        cursor: view.cursor(),
        sort: Some((sort_col.column_id(), sort_dir == SortDirection::Ascending)),
        total_width: props.width,
        depth,
        selected_bg: Some(theme.bg_selected),
        header_color: Some(theme.text_secondary),
        border_color: Some(theme.border_faint),
        show_separator: theme.show_separator,
        empty_message: Some(empty_message),
    });

    // -- prompt ----------------------------------------------------------------

    let rendered_text_input = match state.mode() {
        Mode::Search => Some(RenderedTextInput::build(
            "/",
            view.search_term(),
            depth,
            Some(theme.text_primary),
            Some(theme.text_secondary),
            Some(theme.border_faint),
        )),
        Mode::Confirm { .. } => state.confirmer().pending().map(|p| {
            RenderedTextInput::prompt_only(
                &format!("{} (y/n)", p.description),
                depth,
                Some(theme.text_primary),
                Some(theme.text_warning),
                Some(theme.border_faint),
            )
        }),
        _ => None,
    };

    // -- overlay ---------------------------------------------------------------

    let date_format = config.defaults.date_format.as_str();
    let rendered_modal = match state.mode() {
        Mode::Detail(modal) => Some(detail_overlay(
            modal,
            &theme,
            depth,
            props.width,
            date_format,
            &labels.mastered,
        )),
        Mode::Editor(session) | Mode::Confirm { resume: Some(session) } => Some(editor_overlay(
            session,
            &theme,
            depth,
            props.height,
        )),
        _ => None,
    };

    // -- footer ----------------------------------------------------------------

    let (context_text, context_color) = match state.status() {
        Some(status) => (
            status.text.clone(),
            Some(match status.kind {
                StatusKind::Info => theme.text_success,
                StatusKind::Error => theme.text_error,
            }),
        ),
        None => (position_text(&state), None),
    };
    let rendered_footer = RenderedFooter::build(
        context_text,
        footer::format_updated_ago(state.last_fetch(), Utc::now()),
        depth,
        context_color,
        Some(theme.text_faint),
        Some(theme.border_faint),
    );

    drop(state);

    let width = u32::from(props.width);
    let height = u32::from(props.height);

    element! {
        View(flex_direction: FlexDirection::Column, width, height) {
            TabBar(tab_bar: rendered_tab_bar)

            View(flex_grow: 1.0, flex_direction: FlexDirection::Column, overflow: Overflow::Hidden) {
                ScrollableTable(table: rendered_table)
            }

            TextInput(input: rendered_text_input)
            Footer(footer: rendered_footer)
            Modal(modal: rendered_modal, width: props.width, height: props.height)
        }
    }
}

/// Run `f` against a copy of the dashboard and store the result.
fn update<R>(mut state: State<Dashboard>, f: impl FnOnce(&mut Dashboard) -> R) -> R {
    let mut dashboard = state.read().clone();
    let out = f(&mut dashboard);
    state.set(dashboard);
    out
}

/// Forward dashboard commands to the engine.
fn dispatch(
    commands: Vec<Command>,
    engine: Option<&EngineHandle>,
    reply_tx: &Sender<Event>,
    should_exit: Option<State<bool>>,
) {
    for command in commands {
        match command {
            Command::Quit => {
                if let Some(mut exit) = should_exit {
                    exit.set(true);
                }
            }
            Command::Fetch(endpoint) => {
                let Some(engine) = engine else { continue };
                let reply_tx = reply_tx.clone();
                engine.send(match endpoint {
                    Endpoint::Details => Request::FetchDetails { reply_tx },
                    Endpoint::Roster => Request::FetchRoster { reply_tx },
                });
            }
            Command::Submit {
                submission,
                description,
            } => {
                let Some(engine) = engine else { continue };
                engine.send(Request::Submit {
                    submission,
                    description,
                    reply_tx: reply_tx.clone(),
                });
            }
        }
    }
}

fn position_text(state: &Dashboard) -> String {
    let view = state.view();
    if !view.is_loaded() {
        return String::new();
    }
    let visible = view.visible_len();
    let position = if visible == 0 {
        0
    } else {
        view.page() * view.page_size() + view.cursor() + 1
    };
    let mut text = format!("{position}/{visible}");
    if !view.search_term().is_empty() {
        text.push_str(&format!(" (filtered from {})", view.len()));
    }
    if view.page_count() > 1 {
        text.push_str(&format!("  page {}/{}", view.page() + 1, view.page_count()));
    }
    text
}

fn detail_overlay(
    modal: &DetailModal,
    theme: &ResolvedTheme,
    depth: ColorDepth,
    width: u16,
    date_format: &str,
    mastered_marker: &str,
) -> RenderedModal {
    let inner = modal_inner_width(width);
    let focus = modal.focus();

    let (queue_sort, queue_dir) = modal.queue_sort();
    let queue_focused = focus == ModalSection::Queue;
    let mut panes = vec![ModalPane::Table {
        heading: format!("Skill queue ({})", modal.queue().len()),
        focused: queue_focused,
        table: section_table(&SectionTable {
            columns: &DetailModal::queue_columns(),
            rows: modal.queue_cells(date_format),
            scroll: queue_focused.then_some(modal.scroll_offset()),
            sort: (queue_sort.column_id(), queue_dir == SortDirection::Ascending),
            width: inner,
            theme,
            depth,
        }),
    }];
    match modal.skill_cells(mastered_marker) {
        Some(rows) => {
            let (skill_sort, skill_dir) = modal.skill_sort();
            let focused = focus == ModalSection::Skills;
            panes.push(ModalPane::Table {
                heading: format!("Skills ({})", rows.len()),
                focused,
                table: section_table(&SectionTable {
                    columns: &DetailModal::skill_columns(),
                    rows,
                    scroll: focused.then_some(modal.scroll_offset()),
                    sort: (skill_sort.column_id(), skill_dir == SortDirection::Ascending),
                    width: inner,
                    theme,
                    depth,
                }),
            });
        }
        None => panes.push(ModalPane::Note("No trained skills".to_owned())),
    }

    RenderedModal::build(ModalBuildConfig {
        title: modal.title.clone(),
        subtitle: modal.filter_summary.clone(),
        hint: "Tab section  s/S sort  Esc close".to_owned(),
        panes,
        horizontal: false,
        depth,
        title_color: Some(theme.text_primary),
        text_color: Some(theme.text_secondary),
        faint_color: Some(theme.text_faint),
        focus_color: Some(theme.border_primary),
        selected_bg: Some(theme.bg_selected),
        border_color: Some(theme.border_primary),
    })
}

struct SectionTable<'a> {
    columns: &'a [Column],
    rows: Vec<Row>,
    /// Scroll offset of the focused section; `None` draws no cursor.
    scroll: Option<usize>,
    sort: (&'a str, bool),
    width: u16,
    theme: &'a ResolvedTheme,
    depth: ColorDepth,
}

fn section_table(s: &SectionTable<'_>) -> RenderedTable {
    let rows = &s.rows[s.scroll.unwrap_or(0).min(s.rows.len())..];
    RenderedTable::build(&TableBuildConfig {
        columns: s.columns,
        rows,
        row_backgrounds: &[],
        cursor: if s.scroll.is_some() { 0 } else { usize::MAX },
        sort: Some(s.sort),
        total_width: s.width,
        depth: s.depth,
        selected_bg: Some(s.theme.bg_selected),
        header_color: Some(s.theme.text_secondary),
        border_color: Some(s.theme.border_faint),
        show_separator: s.theme.show_separator,
        empty_message: Some("-"),
    })
}

fn editor_overlay(
    session: &EditorSession,
    theme: &ResolvedTheme,
    depth: ColorDepth,
    height: u16,
) -> RenderedModal {
    let editor = &session.editor;
    // Title bar, headings and borders take about eight lines.
    let max_rows = usize::from(modal_size(0, height).1.saturating_sub(8));
    let candidates = editor.visible_candidates();
    let selected: Vec<&str> = editor.selected().iter().map(String::as_str).collect();
    let on_candidates = editor.focus() == EditorFocus::Candidates;

    let panes = vec![
        ModalPane::list(
            &format!("Available ({})", candidates.len()),
            on_candidates,
            &candidates,
            if on_candidates { editor.cursor() } else { 0 },
            max_rows,
            "No matching skills",
        ),
        ModalPane::list(
            &format!("Selected ({})", selected.len()),
            !on_candidates,
            &selected,
            if on_candidates { 0 } else { editor.cursor() },
            max_rows,
            "No filter",
        ),
    ];

    RenderedModal::build(ModalBuildConfig {
        title: format!("Skill set: {}", session.character_name),
        subtitle: Some(format!("search: {}\u{2588}", editor.search())),
        hint: "Tab switch  \u{23ce} add/remove  ^S save  Esc discard".to_owned(),
        panes,
        horizontal: true,
        depth,
        title_color: Some(theme.text_primary),
        text_color: Some(theme.text_secondary),
        faint_color: Some(theme.text_faint),
        focus_color: Some(theme.border_primary),
        selected_bg: Some(theme.bg_selected),
        border_color: Some(theme.border_primary),
    })
}
