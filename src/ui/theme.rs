//! cliclack theme: green for a clean verdict, red for a relocation failure

use cliclack::ThemeState;
use console::Style;

#[derive(Debug, Clone, Default)]
pub struct RelocheckTheme;

impl cliclack::Theme for RelocheckTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().blue(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().blue().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().blue(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green(),
        }
    }
}

/// Install the theme globally; call once before any cliclack output
pub fn init_theme() {
    cliclack::set_theme(RelocheckTheme);
}
