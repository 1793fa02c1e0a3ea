use chrono::{DateTime, Utc};
use iocraft::prelude::*;

use crate::color::{Color as AppColor, ColorDepth};

const KEY_HINT: &str = "/ search  a alarm  m read  e skills  \u{23ce} detail  q quit";

pub struct RenderedFooter {
    pub context_text: String,
    pub context_fg: Color,
    pub updated_text: String,
    pub hint: String,
    pub text_fg: Color,
    pub border_fg: Color,
}

impl RenderedFooter {
    /// `context_color` overrides the text color of the context area, used
    /// for error messages.
    pub fn build(
        context_text: String,
        updated_text: String,
        depth: ColorDepth,
        context_color: Option<AppColor>,
        text_color: Option<AppColor>,
        border_color: Option<AppColor>,
    ) -> Self {
        let text_fg = text_color.map_or(Color::DarkGrey, |c| c.to_crossterm_color(depth));
        Self {
            context_text,
            context_fg: context_color.map_or(text_fg, |c| c.to_crossterm_color(depth)),
            updated_text,
            hint: KEY_HINT.to_owned(),
            text_fg,
            border_fg: border_color.map_or(Color::DarkGrey, |c| c.to_crossterm_color(depth)),
        }
    }
}

/// "Updated ~Xs ago", or nothing before the first successful fetch.
pub fn format_updated_ago(last_fetch: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(t) = last_fetch else {
        return String::new();
    };
    let elapsed = (now - t).num_seconds().max(0);
    if elapsed < 60 {
        format!("Updated ~{elapsed}s ago")
    } else if elapsed < 3600 {
        format!("Updated ~{}m ago", elapsed / 60)
    } else {
        format!("Updated ~{}h ago", elapsed / 3600)
    }
}

#[derive(Default, Props)]
pub struct FooterProps {
    pub footer: Option<RenderedFooter>,
}

#[component]
pub fn Footer(props: &mut FooterProps) -> impl Into<AnyElement<'static>> {
    let Some(f) = props.footer.take() else {
        return element! { View }.into_any();
    };

    let mut contents = Vec::new();
    if !f.context_text.is_empty() {
        contents.push(MixedTextContent::new(&f.context_text).color(f.context_fg));
    }
    if !f.context_text.is_empty() && !f.updated_text.is_empty() {
        contents.push(MixedTextContent::new("  \u{2022}  ").color(f.text_fg));
    }
    if !f.updated_text.is_empty() {
        contents.push(MixedTextContent::new(&f.updated_text).color(f.text_fg));
    }

    element! {
        View(
            border_style: BorderStyle::Single,
            border_edges: Edges::Top,
            border_color: f.border_fg,
            padding_left: 1,
            padding_right: 1,
        ) {
            View(flex_grow: 1.0) {
                MixedText(contents, wrap: TextWrap::NoWrap)
            }
            Text(content: " \u{2502} ", color: f.text_fg, wrap: TextWrap::NoWrap)
            Text(content: f.hint.clone(), color: f.text_fg, wrap: TextWrap::NoWrap)
        }
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn updated_ago_buckets() {
        let now = Utc::now();
        assert_eq!(format_updated_ago(None, now), "");
        assert_eq!(format_updated_ago(Some(now - Duration::seconds(5)), now), "Updated ~5s ago");
        assert_eq!(format_updated_ago(Some(now - Duration::minutes(3)), now), "Updated ~3m ago");
        assert_eq!(format_updated_ago(Some(now - Duration::hours(2)), now), "Updated ~2h ago");
    }

    #[test]
    fn context_color_defaults_to_text_color() {
        let f = RenderedFooter::build(
            "Row 1/2".to_owned(),
            String::new(),
            ColorDepth::Color256,
            None,
            Some(AppColor::Ansi256(8)),
            None,
        );
        assert_eq!(f.context_fg, f.text_fg);
    }
}
