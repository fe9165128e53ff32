use chrono::{Local, NaiveDate};

use crate::config::Config;
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{parse_due_date, Bookmark, NewBookmark, SortKey};
use crate::services::PageFetcher;
use crate::tui::{AppAction, DatePicker, InputMode, PickerPurpose};

/// A row action bound to its target when the key is pressed, so a reload
/// between render and dispatch can never redirect it to another row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowCommand {
    Open { url: String },
    Delete { id: i64 },
    UpdateDueDate { id: i64, due_date: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Pending,
    Overdue,
    Invalid,
}

#[derive(Debug, Clone)]
pub struct BookmarkRow {
    pub bookmark: Bookmark,
    pub due_status: DueStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditColumn {
    Url,
    Title,
    Summary,
}

impl EditColumn {
    pub fn next(self) -> Self {
        match self {
            EditColumn::Url => EditColumn::Title,
            EditColumn::Title => EditColumn::Summary,
            EditColumn::Summary => EditColumn::Url,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EditColumn::Url => "URL",
            EditColumn::Title => "Title",
            EditColumn::Summary => "Summary",
        }
    }

    fn value(self, bookmark: &Bookmark) -> &str {
        match self {
            EditColumn::Url => &bookmark.url,
            EditColumn::Title => &bookmark.title,
            EditColumn::Summary => &bookmark.summary,
        }
    }
}

/// Cell edits live only in the displayed rows and are never written back.
#[derive(Debug, Clone)]
pub struct CellEdit {
    pub row_id: i64,
    pub column: EditColumn,
    pub buffer: String,
}

struct PendingSave {
    url: String,
    due_date: String,
}

pub struct App {
    // Data
    pub rows: Vec<BookmarkRow>,

    // UI State
    pub selected_index: usize,
    pub sort: SortKey,
    pub show_help: bool,
    pub url_input_active: bool,
    pub url_input: String,
    pub date_picker: Option<DatePicker>,
    pub cell_edit: Option<CellEdit>,
    pub notice: Option<Notice>,

    // Save in flight: drawn once as "Fetching..." before it runs
    pub is_fetching: bool,
    pending_save: Option<PendingSave>,

    // Services
    pub repository: Repository,
    fetcher: PageFetcher,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        let fetcher = PageFetcher::new(config)?;

        let mut app = Self {
            rows: Vec::new(),
            selected_index: 0,
            sort: config.default_sort,
            show_help: false,
            url_input_active: false,
            url_input: String::new(),
            date_picker: None,
            cell_edit: None,
            notice: None,
            is_fetching: false,
            pending_save: None,
            repository,
            fetcher,
        };
        app.reload_rows().await?;

        Ok(app)
    }

    pub fn input_mode(&self) -> InputMode {
        if self.notice.is_some() {
            InputMode::Notice
        } else if self.show_help {
            InputMode::Help
        } else if self.date_picker.is_some() {
            InputMode::DatePicker
        } else if self.cell_edit.is_some() {
            InputMode::CellEdit
        } else if self.url_input_active {
            InputMode::UrlInput
        } else {
            InputMode::Normal
        }
    }

    pub fn selected_row(&self) -> Option<&BookmarkRow> {
        self.rows.get(self.selected_index)
    }

    pub fn overdue_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.due_status == DueStatus::Overdue)
            .count()
    }

    /// Returns `Ok(true)` when the app should quit. Failures of the action
    /// itself end up in a notice; only terminal-level errors escape.
    pub async fn handle_action(&mut self, action: AppAction) -> Result<bool> {
        match self.apply(action).await {
            Ok(quit) => Ok(quit),
            Err(e) if e.is_action_error() => {
                self.show_error(e.to_string());
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn apply(&mut self, action: AppAction) -> Result<bool> {
        match action {
            AppAction::Quit => return Ok(true),

            AppAction::MoveUp => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }

            AppAction::MoveDown => {
                let len = self.rows.len();
                if len > 0 && self.selected_index < len - 1 {
                    self.selected_index += 1;
                }
            }

            AppAction::MoveToTop => {
                self.selected_index = 0;
            }

            AppAction::MoveToBottom => {
                self.selected_index = self.rows.len().saturating_sub(1);
            }

            AppAction::AddBookmark => {
                self.url_input_active = true;
                self.url_input.clear();
            }

            AppAction::OpenInBrowser => {
                if let Some(row) = self.selected_row() {
                    let url = row.bookmark.url.clone();
                    self.dispatch(RowCommand::Open { url }).await?;
                }
            }

            AppAction::DeleteBookmark => {
                if let Some(row) = self.selected_row() {
                    let id = row.bookmark.id;
                    self.dispatch(RowCommand::Delete { id }).await?;
                }
            }

            AppAction::UpdateDueDate => {
                if let Some(row) = self.selected_row() {
                    let id = row.bookmark.id;
                    let start = parse_due_date(&row.bookmark.due_date).unwrap_or_else(|_| today());
                    self.date_picker =
                        Some(DatePicker::new(start, PickerPurpose::UpdateDueDate { id }));
                }
            }

            AppAction::CycleSort => {
                self.sort = self.sort.cycle();
                self.selected_index = 0;
                self.reload_rows().await?;
            }

            AppAction::Reload => {
                self.reload_rows().await?;
            }

            AppAction::EditCell => {
                if let Some(row) = self.selected_row() {
                    let column = EditColumn::Title;
                    self.cell_edit = Some(CellEdit {
                        row_id: row.bookmark.id,
                        column,
                        buffer: column.value(&row.bookmark).to_string(),
                    });
                }
            }

            AppAction::ShowHelp => {
                self.show_help = true;
            }

            AppAction::HideHelp => {
                self.show_help = false;
            }

            AppAction::DismissNotice => {
                self.notice = None;
            }

            AppAction::UrlInputChar(c) => {
                self.url_input.push(c);
            }

            AppAction::UrlInputBackspace => {
                self.url_input.pop();
            }

            AppAction::UrlInputConfirm => {
                let url = validate_url(&self.url_input)?;
                self.url_input_active = false;
                self.date_picker = Some(DatePicker::new(today(), PickerPurpose::NewBookmark { url }));
            }

            AppAction::UrlInputCancel => {
                self.url_input_active = false;
                self.url_input.clear();
            }

            AppAction::PickerMoveDays(days) => {
                if let Some(picker) = self.date_picker.as_mut() {
                    picker.move_days(days);
                }
            }

            AppAction::PickerMoveMonths(months) => {
                if let Some(picker) = self.date_picker.as_mut() {
                    picker.move_months(months);
                }
            }

            AppAction::PickerToday => {
                if let Some(picker) = self.date_picker.as_mut() {
                    picker.selected = today();
                }
            }

            AppAction::PickerConfirm => {
                if let Some(picker) = self.date_picker.take() {
                    let due_date = picker.due_date();
                    match picker.purpose {
                        PickerPurpose::NewBookmark { url } => {
                            self.pending_save = Some(PendingSave { url, due_date });
                            self.is_fetching = true;
                        }
                        PickerPurpose::UpdateDueDate { id } => {
                            self.dispatch(RowCommand::UpdateDueDate { id, due_date }).await?;
                        }
                    }
                }
            }

            AppAction::PickerCancel => {
                self.date_picker = None;
            }

            AppAction::EditChar(c) => {
                if let Some(edit) = self.cell_edit.as_mut() {
                    edit.buffer.push(c);
                }
            }

            AppAction::EditBackspace => {
                if let Some(edit) = self.cell_edit.as_mut() {
                    edit.buffer.pop();
                }
            }

            AppAction::EditNextColumn => {
                if let Some(edit) = self.cell_edit.as_mut() {
                    edit.column = edit.column.next();
                    if let Some(row) = self.rows.iter().find(|r| r.bookmark.id == edit.row_id) {
                        edit.buffer = edit.column.value(&row.bookmark).to_string();
                    }
                }
            }

            AppAction::EditConfirm => {
                if let Some(edit) = self.cell_edit.take() {
                    self.apply_cell_edit(edit);
                }
            }

            AppAction::EditCancel => {
                self.cell_edit = None;
            }
        }

        Ok(false)
    }

    pub async fn dispatch(&mut self, command: RowCommand) -> Result<()> {
        match command {
            RowCommand::Open { url } => {
                if let Err(e) = open::that(&url) {
                    tracing::warn!("Failed to open {} in browser: {}", url, e);
                }
            }

            RowCommand::Delete { id } => {
                self.repository.delete(id).await?;
                self.reload_rows().await?;
                self.show_success("Bookmark deleted successfully.");
                let len = self.rows.len();
                if len > 0 && self.selected_index >= len {
                    self.selected_index = len - 1;
                }
            }

            RowCommand::UpdateDueDate { id, due_date } => {
                parse_due_date(&due_date)?;
                self.repository.update_due_date(id, &due_date).await?;
                self.reload_rows().await?;
                self.show_success("Due date updated successfully.");
            }
        }
        Ok(())
    }

    /// Runs a save queued by the date picker. Called by the event loop after
    /// the "Fetching..." frame has been drawn.
    pub async fn run_pending_save(&mut self) -> Result<()> {
        let Some(pending) = self.pending_save.take() else {
            return Ok(());
        };

        let result = self.save_bookmark(&pending.url, &pending.due_date).await;
        self.is_fetching = false;

        match result {
            Ok(_) => {
                self.url_input.clear();
                self.reload_rows().await.or_else(|e| self.report(e))?;
                self.show_success("Bookmark saved successfully.");
            }
            Err(e) => self.report(e)?,
        }
        Ok(())
    }

    /// Fetch the page, then store it. Nothing is written unless the fetch
    /// succeeds.
    pub async fn save_bookmark(&self, url: &str, due_date: &str) -> Result<i64> {
        let url = validate_url(url)?;
        parse_due_date(due_date).map_err(|_| {
            AppError::Input(format!("Due date must be YYYY-MM-DD, got \"{due_date}\"."))
        })?;

        let page = self.fetcher.fetch(&url).await?;

        let id = self
            .repository
            .insert(NewBookmark {
                url: url.clone(),
                title: page.title,
                summary: page.summary,
                stored_date: Local::now().naive_local(),
                due_date: due_date.to_string(),
            })
            .await?;
        tracing::info!("Saved bookmark {} for {}", id, url);

        Ok(id)
    }

    /// Full re-read from the store. Visual cell edits are discarded. On
    /// failure the current rows are kept as they were.
    pub async fn reload_rows(&mut self) -> Result<()> {
        let bookmarks = self.repository.list_sorted(self.sort).await?;
        let today = today();

        let mut invalid = Vec::new();
        self.rows = bookmarks
            .into_iter()
            .map(|bookmark| {
                let due_status = match bookmark.is_overdue(today) {
                    Ok(true) => DueStatus::Overdue,
                    Ok(false) => DueStatus::Pending,
                    Err(e) => {
                        invalid.push(format!("bookmark {}: {}", bookmark.id, e));
                        DueStatus::Invalid
                    }
                };
                BookmarkRow {
                    bookmark,
                    due_status,
                }
            })
            .collect();
        self.cell_edit = None;

        if self.selected_index >= self.rows.len() {
            self.selected_index = self.rows.len().saturating_sub(1);
        }

        if !invalid.is_empty() {
            tracing::warn!("Unparsable due dates: {}", invalid.join(", "));
            self.show_error(invalid.join("\n"));
        }

        Ok(())
    }

    fn apply_cell_edit(&mut self, edit: CellEdit) {
        let Some(row) = self.rows.iter_mut().find(|r| r.bookmark.id == edit.row_id) else {
            return;
        };
        let target = match edit.column {
            EditColumn::Url => &mut row.bookmark.url,
            EditColumn::Title => &mut row.bookmark.title,
            EditColumn::Summary => &mut row.bookmark.summary,
        };
        *target = edit.buffer;
    }

    fn report(&mut self, e: AppError) -> Result<()> {
        if e.is_action_error() {
            self.show_error(e.to_string());
            Ok(())
        } else {
            Err(e)
        }
    }

    fn show_error(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        });
    }

    /// An error raised while the action finished (e.g. by the reload) stays
    /// visible, with the success line in front of it.
    fn show_success(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.notice = Some(match self.notice.take() {
            Some(Notice {
                kind: NoticeKind::Error,
                message: error,
            }) => Notice {
                kind: NoticeKind::Error,
                message: format!("{message}\n\n{error}"),
            },
            _ => Notice {
                kind: NoticeKind::Success,
                message,
            },
        });
    }
}

fn validate_url(input: &str) -> Result<String> {
    let url = input.trim();
    if url.is_empty() {
        return Err(AppError::Input("URL cannot be empty.".to_string()));
    }
    Ok(url.to_string())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
