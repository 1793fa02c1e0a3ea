use std::collections::HashMap;

use iocraft::prelude::*;

use crate::color::{Color as AppColor, ColorDepth};
use crate::util::truncate_to_width;

// ---------------------------------------------------------------------------
// Column definition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Column {
    /// Unique identifier (e.g., "character", "progress", "updated").
    pub id: String,
    pub header: String,
    /// Share of the width left after fixed columns (0.0..1.0).
    pub default_width_pct: f32,
    /// Exact width in cells, taking precedence over the percentage.
    pub fixed_width: Option<u16>,
    pub align: TextAlign,
}

impl Column {
    pub fn new(id: &str, header: &str, default_width_pct: f32) -> Self {
        Self {
            id: id.to_owned(),
            header: header.to_owned(),
            default_width_pct,
            fixed_width: None,
            align: TextAlign::Left,
        }
    }

    pub fn fixed(mut self, width: u16) -> Self {
        self.fixed_width = Some(width);
        self
    }

    pub fn right(mut self) -> Self {
        self.align = TextAlign::Right;
        self
    }
}

/// A single cell value to display.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub color: Option<AppColor>,
    pub bold: bool,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            bold: false,
        }
    }

    pub fn colored(text: impl Into<String>, color: AppColor) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            bold: true,
        }
    }
}

/// A complete row of cells indexed by column id.
pub type Row = HashMap<String, Cell>;

// ---------------------------------------------------------------------------
// Pre-rendered table data (all owned)
// ---------------------------------------------------------------------------

/// Owned table data that can move into `element!` without lifetimes.
pub struct RenderedTable {
    pub header_cells: Vec<HeaderCell>,
    pub body_rows: Vec<RenderedRow>,
    pub total_width: u32,
    pub show_separator: bool,
    pub header_fg: Color,
    pub border_fg: Color,
    pub empty_message: Option<String>,
}

pub struct HeaderCell {
    pub text: String,
    pub width: u32,
    pub align: TextAlign,
}

pub struct RenderedRow {
    pub key: usize,
    pub bg: Option<Color>,
    pub cells: Vec<RenderedCell>,
}

pub struct RenderedCell {
    pub text: String,
    pub fg: Color,
    pub weight: Weight,
    pub width: u32,
    pub align: TextAlign,
}

pub struct TableBuildConfig<'a> {
    pub columns: &'a [Column],
    /// Rows of the current page, in display order.
    pub rows: &'a [Row],
    /// Background per row (readiness highlight); shorter slices mean none.
    pub row_backgrounds: &'a [Option<AppColor>],
    /// Cursor within `rows`.
    pub cursor: usize,
    /// Sorted column id and whether the order is ascending.
    pub sort: Option<(&'a str, bool)>,
    pub total_width: u16,
    pub depth: ColorDepth,
    pub selected_bg: Option<AppColor>,
    pub header_color: Option<AppColor>,
    pub border_color: Option<AppColor>,
    pub show_separator: bool,
    pub empty_message: Option<&'a str>,
}

impl RenderedTable {
    pub fn build(cfg: &TableBuildConfig<'_>) -> Self {
        let columns: Vec<&Column> = cfg.columns.iter().collect();
        let col_widths = compute_column_widths(&columns, cfg.total_width);

        let header_fg = cfg
            .header_color
            .map_or(Color::White, |c| c.to_crossterm_color(cfg.depth));
        let border_fg = cfg
            .border_color
            .map_or(Color::DarkGrey, |c| c.to_crossterm_color(cfg.depth));
        let selected_bg = cfg.selected_bg.map(|c| c.to_crossterm_color(cfg.depth));

        let header_cells = columns
            .iter()
            .zip(&col_widths)
            .map(|(col, &w)| {
                let marker = match cfg.sort {
                    Some((id, true)) if id == col.id => " \u{25b2}",
                    Some((id, false)) if id == col.id => " \u{25bc}",
                    _ => "",
                };
                HeaderCell {
                    text: format!("{}{marker}", col.header),
                    width: u32::from(w),
                    align: col.align,
                }
            })
            .collect();

        let body_rows = cfg
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                // Selection wins over the readiness highlight.
                let bg = if i == cfg.cursor {
                    selected_bg
                } else {
                    cfg.row_backgrounds
                        .get(i)
                        .copied()
                        .flatten()
                        .map(|c| c.to_crossterm_color(cfg.depth))
                };
                let cells = columns
                    .iter()
                    .zip(&col_widths)
                    .map(|(col, &w)| {
                        let cell = row.get(&col.id);
                        RenderedCell {
                            text: cell.map_or_else(String::new, |c| {
                                truncate_to_width(&c.text, usize::from(w.saturating_sub(1)))
                            }),
                            fg: cell
                                .and_then(|c| c.color)
                                .map_or(Color::Reset, |c| c.to_crossterm_color(cfg.depth)),
                            weight: if cell.is_some_and(|c| c.bold) {
                                Weight::Bold
                            } else {
                                Weight::Normal
                            },
                            width: u32::from(w),
                            align: col.align,
                        }
                    })
                    .collect();
                RenderedRow { key: i, bg, cells }
            })
            .collect();

        Self {
            header_cells,
            body_rows,
            total_width: u32::from(cfg.total_width),
            show_separator: cfg.show_separator,
            header_fg,
            border_fg,
            empty_message: if cfg.rows.is_empty() {
                cfg.empty_message.map(String::from)
            } else {
                None
            },
        }
    }
}

// ---------------------------------------------------------------------------
// ScrollableTable component
// ---------------------------------------------------------------------------

#[derive(Default, Props)]
pub struct ScrollableTableProps {
    pub table: Option<RenderedTable>,
}

#[component]
pub fn ScrollableTable(props: &mut ScrollableTableProps) -> impl Into<AnyElement<'static>> {
    let Some(table) = props.table.take() else {
        return element! { View }.into_any();
    };

    element! {
        View(flex_direction: FlexDirection::Column, width: table.total_width) {
            View(
                border_style: if table.show_separator { BorderStyle::Single } else { BorderStyle::None },
                border_edges: Edges::Bottom,
                border_color: table.border_fg,
            ) {
                #(table.header_cells.into_iter().enumerate().map(|(i, hc)| {
                    element! {
                        View(key: i, width: hc.width) {
                            Text(
                                content: hc.text,
                                weight: Weight::Bold,
                                color: table.header_fg,
                                wrap: TextWrap::NoWrap,
                                align: hc.align,
                            )
                        }
                    }
                }))
            }

            #(table.empty_message.into_iter().map(|msg| {
                element! {
                    View(padding_top: 1, padding_left: 2) {
                        Text(content: msg, color: Color::DarkGrey)
                    }
                }
            }))
            #(table.body_rows.into_iter().map(|row| {
                element! {
                    View(key: row.key, background_color: row.bg) {
                        #(row.cells.into_iter().enumerate().map(|(ci, cell)| {
                            element! {
                                View(key: ci, width: cell.width) {
                                    Text(
                                        content: cell.text,
                                        color: cell.fg,
                                        weight: cell.weight,
                                        wrap: TextWrap::NoWrap,
                                        align: cell.align,
                                    )
                                }
                            }
                        }))
                    }
                }
            }))
        }
    }
    .into_any()
}

// ---------------------------------------------------------------------------
// Column width computation
// ---------------------------------------------------------------------------

fn compute_column_widths(columns: &[&Column], total: u16) -> Vec<u16> {
    let fixed_total: u16 = columns.iter().filter_map(|c| c.fixed_width).sum();
    let remaining = total.saturating_sub(fixed_total);
    let flexible_pct: f32 = columns
        .iter()
        .filter(|c| c.fixed_width.is_none())
        .map(|c| c.default_width_pct)
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let flexible_count = columns.iter().filter(|c| c.fixed_width.is_none()).count() as f32;

    columns
        .iter()
        .map(|col| {
            if let Some(w) = col.fixed_width {
                return w;
            }
            let ratio = if flexible_pct > 0.0 {
                col.default_width_pct / flexible_pct
            } else {
                1.0 / flexible_count
            };
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let w = (f32::from(remaining) * ratio).round() as u16;
            w.max(1)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_columns() -> Vec<Column> {
        vec![
            Column::new("character", "Character", 0.40),
            Column::new("progress", "Progress", 0.20).right(),
            Column::new("filter", "Filter", 0.0).fixed(8),
            Column::new("updated", "Updated", 0.20),
        ]
    }

    fn make_row(name: &str) -> Row {
        [("character".to_owned(), Cell::plain(name))]
            .into_iter()
            .collect()
    }

    #[test]
    fn fixed_columns_keep_their_width() {
        let cols = make_columns();
        let refs: Vec<&Column> = cols.iter().collect();
        let widths = compute_column_widths(&refs, 108);
        assert_eq!(widths[2], 8);
        let flexible: u16 = widths[0] + widths[1] + widths[3];
        assert!((99..=101).contains(&flexible), "got {flexible}");
        assert!(widths[0] > widths[1]);
    }

    #[test]
    fn selected_row_overrides_highlight() {
        let cols = make_columns();
        let rows = vec![make_row("A"), make_row("B")];
        let highlight = [Some(AppColor::Ansi256(52)), Some(AppColor::Ansi256(58))];
        let table = RenderedTable::build(&TableBuildConfig {
            columns: &cols,
            rows: &rows,
            row_backgrounds: &highlight,
            cursor: 0,
            sort: Some(("character", true)),
            total_width: 80,
            depth: ColorDepth::Color256,
            selected_bg: Some(AppColor::Ansi256(237)),
            header_color: None,
            border_color: None,
            show_separator: true,
            empty_message: Some("nothing"),
        });
        assert_eq!(table.body_rows[0].bg, Some(Color::AnsiValue(237)));
        assert_eq!(table.body_rows[1].bg, Some(Color::AnsiValue(58)));
        assert!(table.header_cells[0].text.ends_with('\u{25b2}'));
        assert!(table.empty_message.is_none());
    }

    #[test]
    fn empty_rows_show_message() {
        let cols = make_columns();
        let table = RenderedTable::build(&TableBuildConfig {
            columns: &cols,
            rows: &[],
            row_backgrounds: &[],
            cursor: 0,
            sort: None,
            total_width: 80,
            depth: ColorDepth::TrueColor,
            selected_bg: None,
            header_color: None,
            border_color: None,
            show_separator: false,
            empty_message: Some("No characters"),
        });
        assert!(table.body_rows.is_empty());
        assert_eq!(table.empty_message.as_deref(), Some("No characters"));
    }
}
