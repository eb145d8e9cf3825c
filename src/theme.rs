use catppuccin::PALETTE;
use ratatui::style::Color;
use ratatui::widgets::BorderType;

const fn rgb(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Colors used by the diary screens and dialogs.
///
/// Only the slice of the Catppuccin palette the interface draws with is
/// kept. Semantic accessors (`error`, `backdrop`, ...) map onto it so that
/// widgets never pick palette entries by name.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub base: Color,
    pub surface0: Color,
    pub surface1: Color,
    pub surface2: Color,
    pub overlay0: Color,
    pub overlay1: Color,
    pub text: Color,
    pub subtext0: Color,
    pub mauve: Color,
    pub red: Color,
    pub peach: Color,
    pub green: Color,
    pub sky: Color,
    pub lavender: Color,

    pub border_type: BorderType,
}

macro_rules! colors {
    ($($name:ident => $field:ident),* $(,)?) => {
        $(
            #[must_use]
            pub const fn $name(&self) -> Color {
                self.$field
            }
        )*
    };
}

impl Theme {
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: rgb(&c.base),
            surface0: rgb(&c.surface0),
            surface1: rgb(&c.surface1),
            surface2: rgb(&c.surface2),
            overlay0: rgb(&c.overlay0),
            overlay1: rgb(&c.overlay1),
            text: rgb(&c.text),
            subtext0: rgb(&c.subtext0),
            mauve: rgb(&c.mauve),
            red: rgb(&c.red),
            peach: rgb(&c.peach),
            green: rgb(&c.green),
            sky: rgb(&c.sky),
            lavender: rgb(&c.lavender),
            border_type: BorderType::Rounded,
        }
    }

    #[must_use]
    pub fn catppuccin_mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    #[must_use]
    pub fn catppuccin_macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }

    #[must_use]
    pub fn catppuccin_frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    #[must_use]
    pub fn catppuccin_latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }

    colors! {
        base => base,
        surface0 => surface0,
        surface2 => surface2,
        overlay0 => overlay0,
        overlay1 => overlay1,
        text => text,
        subtext0 => subtext0,
        mauve => mauve,
        red => red,
        peach => peach,
        green => green,
        lavender => lavender,
    }

    // Semantic colors
    colors! {
        success => green,
        error => red,
        info => sky,
        border => surface1,
        border_focused => lavender,
        selection_bg => surface1,
        // Dims everything under an open dialog.
        backdrop => overlay0,
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

/// A built-in theme as listed in the theme selector.
#[derive(Debug, Clone)]
pub struct ThemeInfo {
    pub name: &'static str,
    pub theme: Theme,
}

impl std::fmt::Display for ThemeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

pub fn available_themes() -> Vec<ThemeInfo> {
    [
        ("Catppuccin Mocha", Theme::catppuccin_mocha()),
        ("Catppuccin Macchiato", Theme::catppuccin_macchiato()),
        ("Catppuccin Frappé", Theme::catppuccin_frappe()),
        ("Catppuccin Latte", Theme::catppuccin_latte()),
    ]
    .into_iter()
    .map(|(name, theme)| ThemeInfo { name, theme })
    .collect()
}

/// Look up a theme by name, falling back to Mocha.
pub fn theme_from_name(name: &str) -> Theme {
    available_themes()
        .into_iter()
        .find(|t| t.name == name)
        .map(|t| t.theme)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_name() {
        let latte = theme_from_name("Catppuccin Latte");
        assert_eq!(latte.base, Theme::catppuccin_latte().base);
    }

    #[test]
    fn test_unknown_theme_falls_back_to_mocha() {
        assert_eq!(theme_from_name("Solarized").base, Theme::default().base);
    }
}
