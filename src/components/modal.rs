use iocraft::prelude::*;

use crate::color::{Color as AppColor, ColorDepth};
use crate::components::table::{RenderedTable, ScrollableTable};

// ---------------------------------------------------------------------------
// Modal overlay (character detail, skill-set editor)
// ---------------------------------------------------------------------------

/// Outer size of the overlay for a terminal of `width` x `height`.
pub fn modal_size(width: u16, height: u16) -> (u16, u16) {
    let w = (width.saturating_mul(4) / 5).max(40).min(width.saturating_sub(2));
    let h = (height.saturating_mul(4) / 5).max(10).min(height.saturating_sub(2));
    (w, h)
}

/// Width left for content inside the border and padding.
pub fn modal_inner_width(width: u16) -> u16 {
    modal_size(width, 0).0.saturating_sub(4)
}

pub struct ListItem {
    pub label: String,
    pub is_cursor: bool,
}

pub enum ModalPane {
    Table {
        heading: String,
        focused: bool,
        table: RenderedTable,
    },
    List {
        heading: String,
        focused: bool,
        items: Vec<ListItem>,
        empty_message: String,
    },
    /// A single line of text, e.g. a search box or an empty-section notice.
    Note(String),
}

impl ModalPane {
    /// A list window of at most `max_rows` items that keeps `cursor` in view.
    /// The cursor is only drawn when the pane has focus.
    pub fn list(
        heading: &str,
        focused: bool,
        items: &[&str],
        cursor: usize,
        max_rows: usize,
        empty_message: &str,
    ) -> Self {
        let max_rows = max_rows.max(1);
        let start = (cursor + 1).saturating_sub(max_rows);
        let items = items
            .iter()
            .enumerate()
            .skip(start)
            .take(max_rows)
            .map(|(i, label)| ListItem {
                label: (*label).to_owned(),
                is_cursor: focused && i == cursor,
            })
            .collect();
        Self::List {
            heading: heading.to_owned(),
            focused,
            items,
            empty_message: empty_message.to_owned(),
        }
    }
}

pub struct RenderedModal {
    pub title: String,
    pub subtitle: Option<String>,
    pub hint: String,
    pub panes: Vec<ModalPane>,
    /// Lay panes out side by side instead of stacked.
    pub horizontal: bool,
    pub title_fg: Color,
    pub text_fg: Color,
    pub faint_fg: Color,
    pub focus_fg: Color,
    pub cursor_bg: Color,
    pub border_fg: Color,
}

pub struct ModalBuildConfig {
    pub title: String,
    pub subtitle: Option<String>,
    pub hint: String,
    pub panes: Vec<ModalPane>,
    pub horizontal: bool,
    pub depth: ColorDepth,
    pub title_color: Option<AppColor>,
    pub text_color: Option<AppColor>,
    pub faint_color: Option<AppColor>,
    pub focus_color: Option<AppColor>,
    pub selected_bg: Option<AppColor>,
    pub border_color: Option<AppColor>,
}

impl RenderedModal {
    pub fn build(cfg: ModalBuildConfig) -> Self {
        let depth = cfg.depth;
        let pick = |c: Option<AppColor>, fallback: Color| c.map_or(fallback, |c| c.to_crossterm_color(depth));
        Self {
            title: cfg.title,
            subtitle: cfg.subtitle,
            hint: cfg.hint,
            panes: cfg.panes,
            horizontal: cfg.horizontal,
            title_fg: pick(cfg.title_color, Color::White),
            text_fg: pick(cfg.text_color, Color::Grey),
            faint_fg: pick(cfg.faint_color, Color::DarkGrey),
            focus_fg: pick(cfg.focus_color, Color::Cyan),
            cursor_bg: pick(cfg.selected_bg, Color::DarkGrey),
            border_fg: pick(cfg.border_color, Color::DarkGrey),
        }
    }
}

#[derive(Default, Props)]
pub struct ModalProps {
    pub modal: Option<RenderedModal>,
    pub width: u16,
    pub height: u16,
}

#[component]
pub fn Modal(props: &mut ModalProps) -> impl Into<AnyElement<'static>> {
    let Some(modal) = props.modal.take() else {
        return element! { View }.into_any();
    };

    let (overlay_width, overlay_height) = modal_size(props.width, props.height);
    let width = u32::from(props.width);
    let height = u32::from(props.height);
    let pad_left = width.saturating_sub(u32::from(overlay_width)) / 2;
    let pad_top = height.saturating_sub(u32::from(overlay_height)) / 2;

    let text_fg = modal.text_fg;
    let faint_fg = modal.faint_fg;
    let focus_fg = modal.focus_fg;
    let cursor_bg = modal.cursor_bg;
    let direction = if modal.horizontal {
        FlexDirection::Row
    } else {
        FlexDirection::Column
    };

    element! {
        View(width, height, position: Position::Absolute) {
            View(
                margin_left: pad_left,
                margin_top: pad_top,
                width: u32::from(overlay_width),
                height: u32::from(overlay_height),
                flex_direction: FlexDirection::Column,
                border_style: BorderStyle::Round,
                border_color: modal.border_fg,
                background_color: Color::Reset,
                overflow: Overflow::Hidden,
            ) {
                View(
                    border_style: BorderStyle::Single,
                    border_edges: Edges::Bottom,
                    border_color: modal.border_fg,
                    padding_left: 1,
                    padding_right: 1,
                ) {
                    Text(
                        content: modal.title,
                        color: modal.title_fg,
                        weight: Weight::Bold,
                        wrap: TextWrap::NoWrap,
                    )
                    #(modal.subtitle.map(|s| element! {
                        Text(content: format!("  {s}"), color: faint_fg, wrap: TextWrap::NoWrap)
                    }))
                    View(flex_grow: 1.0)
                    Text(content: modal.hint, color: faint_fg, wrap: TextWrap::NoWrap)
                }

                View(
                    flex_grow: 1.0,
                    flex_direction: direction,
                    padding_left: 1,
                    padding_right: 1,
                    overflow: Overflow::Hidden,
                ) {
                    #(modal.panes.into_iter().enumerate().map(|(i, pane)| match pane {
                        ModalPane::Note(text) => element! {
                            View(key: i) {
                                Text(content: text, color: text_fg, wrap: TextWrap::NoWrap)
                            }
                        }.into_any(),
                        ModalPane::Table { heading, focused, table } => element! {
                            View(key: i, flex_direction: FlexDirection::Column, margin_top: 1, overflow: Overflow::Hidden) {
                                Text(
                                    content: heading,
                                    color: if focused { focus_fg } else { text_fg },
                                    weight: if focused { Weight::Bold } else { Weight::Normal },
                                    wrap: TextWrap::NoWrap,
                                )
                                ScrollableTable(table: Some(table))
                            }
                        }.into_any(),
                        ModalPane::List { heading, focused, items, empty_message } => element! {
                            View(key: i, flex_grow: 1.0, flex_direction: FlexDirection::Column, margin_top: 1, overflow: Overflow::Hidden) {
                                Text(
                                    content: heading,
                                    color: if focused { focus_fg } else { text_fg },
                                    weight: if focused { Weight::Bold } else { Weight::Normal },
                                    wrap: TextWrap::NoWrap,
                                )
                                #((items.is_empty()).then(|| element! {
                                    Text(content: empty_message.clone(), color: faint_fg, wrap: TextWrap::NoWrap)
                                }))
                                #(items.into_iter().enumerate().map(|(j, item)| {
                                    let bg = if item.is_cursor { cursor_bg } else { Color::Reset };
                                    let marker = if item.is_cursor { "\u{25b6} " } else { "  " };
                                    element! {
                                        View(key: j, background_color: bg) {
                                            Text(
                                                content: format!("{marker}{}", item.label),
                                                color: text_fg,
                                                wrap: TextWrap::NoWrap,
                                            )
                                        }
                                    }
                                }))
                            }
                        }.into_any(),
                    }))
                }
            }
        }
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_window_follows_cursor() {
        let items = ["a", "b", "c", "d", "e"];
        let ModalPane::List { items, .. } = ModalPane::list("Skills", true, &items, 4, 2, "-") else {
            panic!("not a list");
        };
        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, ["d", "e"]);
        assert!(items[1].is_cursor);
    }

    #[test]
    fn unfocused_list_draws_no_cursor() {
        let ModalPane::List { items, .. } = ModalPane::list("Skills", false, &["a", "b"], 0, 5, "-") else {
            panic!("not a list");
        };
        assert!(items.iter().all(|i| !i.is_cursor));
    }

    #[test]
    fn modal_fits_small_terminals() {
        assert_eq!(modal_size(100, 50), (80, 40));
        assert_eq!(modal_size(30, 8), (28, 6));
    }
}
