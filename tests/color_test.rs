use crossterm::style::Color as CtColor;

use skillfarm_board::color::{Color, ColorDepth};
use skillfarm_board::config::loader::parse_config;
use skillfarm_board::theme::{Background, ResolvedTheme};

#[test]
fn parse_hex_6_digit() {
    let c = Color::parse("#c0caf5", "test_field").unwrap();
    assert_eq!(
        c,
        Color::Hex {
            r: 0xc0,
            g: 0xca,
            b: 0xf5
        }
    );
}

#[test]
fn parse_hex_3_digit() {
    // #f0a -> r=0xff, g=0x00, b=0xaa
    let c = Color::parse("#f0a", "test_field").unwrap();
    assert_eq!(
        c,
        Color::Hex {
            r: 0xff,
            g: 0x00,
            b: 0xaa
        }
    );
}

#[test]
fn parse_ansi_index() {
    assert_eq!(Color::parse("245", "f").unwrap(), Color::Ansi256(245));
    assert!(Color::parse("256", "f").is_err());
}

#[test]
fn parse_error_names_the_field() {
    let err = Color::parse("#12345", "text.primary").unwrap_err();
    assert_eq!(err.field, "text.primary");
    assert!(err.to_string().contains("#12345"));
}

#[test]
fn display_round_trips_through_from_str() {
    let c: Color = "#0a0b0c".parse().unwrap();
    assert_eq!(c.to_string(), "#0a0b0c");
}

#[test]
fn low_indices_map_to_named_colors() {
    assert_eq!(Color::Ansi256(1).to_crossterm_color(ColorDepth::Color256), CtColor::DarkRed);
    assert_eq!(
        Color::Ansi256(237).to_crossterm_color(ColorDepth::Color256),
        CtColor::AnsiValue(237)
    );
}

#[test]
fn hex_downsamples_by_depth() {
    let red = Color::Hex { r: 255, g: 0, b: 0 };
    assert_eq!(
        red.to_crossterm_color(ColorDepth::TrueColor),
        CtColor::Rgb { r: 255, g: 0, b: 0 }
    );
    assert_eq!(red.to_crossterm_color(ColorDepth::Color256), CtColor::AnsiValue(196));
    assert_eq!(red.to_crossterm_color(ColorDepth::Color16), CtColor::Red);
}

#[test]
fn theme_overrides_win_over_background_defaults() {
    let config = parse_config(
        r#"
[theme.colors.background]
selected = "236"
"#,
    )
    .unwrap();
    let dark = ResolvedTheme::resolve(&config.theme, Background::Dark);
    let light = ResolvedTheme::resolve(&config.theme, Background::Light);
    assert_eq!(dark.bg_selected, Color::Ansi256(236));
    assert_eq!(light.bg_selected, Color::Ansi256(236));
    assert_ne!(dark.text_primary, light.text_primary);
}
