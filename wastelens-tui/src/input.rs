use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Simulate a new record batch and re-run the analysis
    Regenerate,
    /// Ask the advisor again for the current district stats
    RefreshInsights,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Tab, Up};

    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    // While typing a search, letters belong to the query
    if app.editing_search {
        match key.code {
            Char(character)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                app.push_search(character);
            }
            Backspace => app.pop_search(),
            Enter | Esc | Tab => app.editing_search = false,
            _ => {}
        }
        return Action::None;
    }

    match key.code {
        Char('q') => return Action::Quit,
        Char('r') => return Action::Regenerate,
        Char('i') => return Action::RefreshInsights,
        Tab => app.toggle_screen(),
        _ => {}
    }

    if app.screen == Screen::Households {
        match key.code {
            Up | Char('k') => app.select_previous(),
            Down | Char('j') => app.select_next(),
            Char('/') => app.editing_search = true,
            Char('d') => app.cycle_district(),
            Esc => {
                app.filter.search.clear();
                app.filter.district = None;
                app.household_index = 0;
            }
            _ => {}
        }
    }

    Action::None
}
