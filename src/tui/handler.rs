use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which surface currently owns the keyboard. Popups take precedence
/// over the table in the order listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Notice,
    Help,
    DatePicker,
    CellEdit,
    UrlInput,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    AddBookmark,
    OpenInBrowser,
    DeleteBookmark,
    UpdateDueDate,
    CycleSort,
    Reload,
    EditCell,
    ShowHelp,
    HideHelp,
    DismissNotice,
    // URL input actions
    UrlInputChar(char),
    UrlInputBackspace,
    UrlInputConfirm,
    UrlInputCancel,
    // Date picker actions
    PickerMoveDays(i64),
    PickerMoveMonths(i32),
    PickerToday,
    PickerConfirm,
    PickerCancel,
    // Cell edit actions
    EditChar(char),
    EditBackspace,
    EditNextColumn,
    EditConfirm,
    EditCancel,
}

pub fn handle_key_event(key: KeyEvent, mode: InputMode) -> Option<AppAction> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(AppAction::Quit);
    }

    match mode {
        // Notices and help are modal, any key closes them
        InputMode::Notice => Some(AppAction::DismissNotice),
        InputMode::Help => Some(AppAction::HideHelp),

        InputMode::DatePicker => match key.code {
            KeyCode::Enter => Some(AppAction::PickerConfirm),
            KeyCode::Esc => Some(AppAction::PickerCancel),
            KeyCode::Left | KeyCode::Char('h') => Some(AppAction::PickerMoveDays(-1)),
            KeyCode::Right | KeyCode::Char('l') => Some(AppAction::PickerMoveDays(1)),
            KeyCode::Up | KeyCode::Char('k') => Some(AppAction::PickerMoveDays(-7)),
            KeyCode::Down | KeyCode::Char('j') => Some(AppAction::PickerMoveDays(7)),
            KeyCode::PageUp | KeyCode::Char('<') => Some(AppAction::PickerMoveMonths(-1)),
            KeyCode::PageDown | KeyCode::Char('>') => Some(AppAction::PickerMoveMonths(1)),
            KeyCode::Char('t') => Some(AppAction::PickerToday),
            _ => None,
        },

        InputMode::CellEdit => match key.code {
            KeyCode::Enter => Some(AppAction::EditConfirm),
            KeyCode::Esc => Some(AppAction::EditCancel),
            KeyCode::Tab => Some(AppAction::EditNextColumn),
            KeyCode::Backspace => Some(AppAction::EditBackspace),
            KeyCode::Char(c) => Some(AppAction::EditChar(c)),
            _ => None,
        },

        InputMode::UrlInput => match key.code {
            KeyCode::Enter => Some(AppAction::UrlInputConfirm),
            KeyCode::Esc => Some(AppAction::UrlInputCancel),
            KeyCode::Backspace => Some(AppAction::UrlInputBackspace),
            KeyCode::Char(c) => Some(AppAction::UrlInputChar(c)),
            _ => None,
        },

        InputMode::Normal => match key.code {
            KeyCode::Char('q') => Some(AppAction::Quit),

            KeyCode::Char('j') | KeyCode::Down => Some(AppAction::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(AppAction::MoveUp),
            KeyCode::Char('<') | KeyCode::Home => Some(AppAction::MoveToTop),
            KeyCode::Char('>') | KeyCode::End => Some(AppAction::MoveToBottom),

            KeyCode::Char('a') => Some(AppAction::AddBookmark),
            KeyCode::Char('o') | KeyCode::Enter => Some(AppAction::OpenInBrowser),
            KeyCode::Char('d') => Some(AppAction::DeleteBookmark),
            KeyCode::Char('u') => Some(AppAction::UpdateDueDate),
            KeyCode::Char('s') => Some(AppAction::CycleSort),
            KeyCode::Char('r') => Some(AppAction::Reload),
            KeyCode::Char('e') => Some(AppAction::EditCell),

            KeyCode::Char('?') => Some(AppAction::ShowHelp),

            _ => None,
        },
    }
}
