use iocraft::prelude::*;

use crate::color::{Color as AppColor, ColorDepth};

/// A tab title plus the row count shown beside it once loaded.
#[derive(Debug, Clone)]
pub struct Tab {
    pub title: String,
    pub count: Option<usize>,
}

pub struct RenderedTabBar {
    pub tabs: Vec<RenderedTab>,
    pub active_fg: Color,
    pub inactive_fg: Color,
    pub border_fg: Color,
}

pub struct RenderedTab {
    pub label: String,
    pub is_active: bool,
}

impl RenderedTabBar {
    pub fn build(
        tabs: &[Tab],
        active: usize,
        depth: ColorDepth,
        active_color: Option<AppColor>,
        inactive_color: Option<AppColor>,
        border_color: Option<AppColor>,
    ) -> Self {
        let active_fg = active_color.map_or(Color::Cyan, |c| c.to_crossterm_color(depth));
        let inactive_fg = inactive_color.map_or(Color::DarkGrey, |c| c.to_crossterm_color(depth));
        let border_fg = border_color.map_or(Color::DarkGrey, |c| c.to_crossterm_color(depth));

        let tabs = tabs
            .iter()
            .enumerate()
            .map(|(i, tab)| RenderedTab {
                label: tab_label(tab),
                is_active: i == active,
            })
            .collect();

        Self {
            tabs,
            active_fg,
            inactive_fg,
            border_fg,
        }
    }
}

fn tab_label(tab: &Tab) -> String {
    match tab.count {
        Some(count) => format!(" {} ({count}) ", tab.title),
        None => format!(" {} ", tab.title),
    }
}

#[derive(Default, Props)]
pub struct TabBarProps {
    pub tab_bar: Option<RenderedTabBar>,
}

#[component]
pub fn TabBar(props: &mut TabBarProps) -> impl Into<AnyElement<'static>> {
    let Some(tb) = props.tab_bar.take() else {
        return element! { View }.into_any();
    };

    let active_fg = tb.active_fg;
    let inactive_fg = tb.inactive_fg;

    element! {
        View(
            border_style: BorderStyle::Single,
            border_edges: Edges::Bottom,
            border_color: tb.border_fg,
            padding_left: 1,
        ) {
            #(tb.tabs.into_iter().enumerate().map(|(i, tab)| {
                let (fg, bg, weight) = if tab.is_active {
                    (Color::White, Some(active_fg), Weight::Bold)
                } else {
                    (inactive_fg, None, Weight::Normal)
                };

                element! {
                    View(key: i, padding_right: 1, background_color: bg.unwrap_or(Color::Reset)) {
                        Text(content: tab.label, color: fg, weight, wrap: TextWrap::NoWrap)
                    }
                }
            }))
        }
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_appears_only_once_loaded() {
        let tabs = [
            Tab {
                title: "Details".to_owned(),
                count: Some(3),
            },
            Tab {
                title: "Inactive".to_owned(),
                count: None,
            },
        ];
        let bar = RenderedTabBar::build(&tabs, 1, ColorDepth::Color256, None, None, None);
        assert_eq!(bar.tabs[0].label, " Details (3) ");
        assert_eq!(bar.tabs[1].label, " Inactive ");
        assert!(!bar.tabs[0].is_active);
        assert!(bar.tabs[1].is_active);
    }
}
