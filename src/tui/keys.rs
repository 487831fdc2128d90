use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Gallery commands reachable from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleHelp,
    PreviousPage,
    NextPage,
    FirstPage,
    LastPage,
    EditSearch,
    CycleStatus,
    CycleGender,
    ClearFilters,
}

/// Key binding configuration
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub keys: Vec<KeyCode>,
    pub modifiers: KeyModifiers,
    pub label: String,
    pub description: String,
    pub action: Action,
}

impl KeyBinding {
    pub fn new(
        keys: &[KeyCode],
        modifiers: KeyModifiers,
        label: &str,
        description: &str,
        action: Action,
    ) -> Self {
        Self {
            keys: keys.to_vec(),
            modifiers,
            label: label.to_string(),
            description: description.to_string(),
            action,
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        if !self.keys.contains(&event.code) {
            return false;
        }
        // Shifted characters like '?' arrive with SHIFT on some terminals
        event.modifiers == self.modifiers
            || (self.modifiers == KeyModifiers::NONE && event.modifiers == KeyModifiers::SHIFT)
    }
}

/// Application key mappings
#[derive(Debug, Clone)]
pub struct KeyMap {
    pub bindings: Vec<KeyBinding>,
}

impl Default for KeyMap {
    fn default() -> Self {
        use KeyCode::{Char, End, Home, Left, Right};

        let bind = |keys: &[KeyCode], label: &str, description: &str, action| {
            KeyBinding::new(keys, KeyModifiers::NONE, label, description, action)
        };
        Self {
            bindings: vec![
                KeyBinding::new(
                    &[Char('c')],
                    KeyModifiers::CONTROL,
                    "Ctrl+C",
                    "Quit",
                    Action::Quit,
                ),
                bind(&[Char('q')], "q", "Quit", Action::Quit),
                bind(&[Char('?')], "?", "Show/hide help", Action::ToggleHelp),
                bind(&[Left, Char('h')], "← / h", "Previous page", Action::PreviousPage),
                bind(&[Right, Char('l')], "→ / l", "Next page", Action::NextPage),
                bind(&[Home], "Home", "First page", Action::FirstPage),
                bind(&[End], "End", "Last known page (loads more)", Action::LastPage),
                bind(&[Char('/')], "/", "Search by name", Action::EditSearch),
                bind(&[Char('s')], "s", "Cycle status filter", Action::CycleStatus),
                bind(&[Char('g')], "g", "Cycle gender filter", Action::CycleGender),
                bind(&[Char('c')], "c", "Clear filters", Action::ClearFilters),
            ],
        }
    }
}

impl KeyMap {
    /// Action bound to `event`, if any
    pub fn action(&self, event: &KeyEvent) -> Option<Action> {
        self.bindings.iter().find(|binding| binding.matches(event)).map(|binding| binding.action)
    }

    /// Get help text for all key bindings
    pub fn help_text(&self) -> String {
        self.bindings
            .iter()
            .map(|binding| format!("{:<8} {}", binding.label, binding.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
