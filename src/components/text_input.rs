use iocraft::prelude::*;

use crate::color::{Color as AppColor, ColorDepth};

/// One-line prompt used for the search box and the y/n confirmation.
pub struct RenderedTextInput {
    pub prompt: String,
    pub text: String,
    pub text_fg: Color,
    pub prompt_fg: Color,
    pub border_fg: Color,
}

impl RenderedTextInput {
    /// An editable line; a block cursor is appended to `text`.
    pub fn build(
        prompt: &str,
        text: &str,
        depth: ColorDepth,
        text_color: Option<AppColor>,
        prompt_color: Option<AppColor>,
        border_color: Option<AppColor>,
    ) -> Self {
        let mut input = Self::prompt_only(prompt, depth, text_color, prompt_color, border_color);
        input.text = format!("{text}\u{2588}");
        input
    }

    /// A question with no editable text.
    pub fn prompt_only(
        prompt: &str,
        depth: ColorDepth,
        text_color: Option<AppColor>,
        prompt_color: Option<AppColor>,
        border_color: Option<AppColor>,
    ) -> Self {
        Self {
            prompt: prompt.to_owned(),
            text: String::new(),
            text_fg: text_color.map_or(Color::White, |c| c.to_crossterm_color(depth)),
            prompt_fg: prompt_color.map_or(Color::Cyan, |c| c.to_crossterm_color(depth)),
            border_fg: border_color.map_or(Color::DarkGrey, |c| c.to_crossterm_color(depth)),
        }
    }
}

#[derive(Default, Props)]
pub struct TextInputProps {
    pub input: Option<RenderedTextInput>,
}

#[component]
pub fn TextInput(props: &mut TextInputProps) -> impl Into<AnyElement<'static>> {
    let Some(input) = props.input.take() else {
        return element! { View }.into_any();
    };

    element! {
        View(
            border_style: BorderStyle::Single,
            border_edges: Edges::Top,
            border_color: input.border_fg,
            padding_left: 1,
            padding_right: 1,
        ) {
            Text(content: input.prompt, color: input.prompt_fg, wrap: TextWrap::NoWrap)
            Text(content: " ", color: input.text_fg)
            Text(content: input.text, color: input.text_fg, wrap: TextWrap::NoWrap)
        }
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editable_line_gets_block_cursor() {
        let input = RenderedTextInput::build("/", "alp", ColorDepth::TrueColor, None, None, None);
        assert_eq!(input.text, "alp\u{2588}");
        assert_eq!(input.prompt_fg, Color::Cyan);
    }

    #[test]
    fn prompt_only_has_no_cursor() {
        let input = RenderedTextInput::prompt_only("Sure? (y/n)", ColorDepth::TrueColor, None, None, None);
        assert!(input.text.is_empty());
    }
}
