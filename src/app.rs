use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tracing::{error, info};

use crate::config::Config;
use crate::models::{TreeItem, TreeTarget};
use crate::parser::build_tree_items;
use crate::session::{FillSession, SessionCommand, TemplateDraft};
use crate::store::Store;
use crate::system::{edit_text, set_clipboard};

const DOUBLE_CLICK_MS: u128 = 400;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum View {
    List,
    Fill,
    Editor,
    Error,
}

#[derive(Clone, Debug)]
pub(crate) struct StatusMessage {
    pub(crate) text: String,
    pub(crate) since: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PromptPurpose {
    NewCategory,
    ImportPath,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ConfirmAction {
    DeleteTemplate(u32),
    DeleteCategory(u32),
    Initialize,
}

#[derive(Clone, Debug)]
pub(crate) enum Dialog {
    Prompt { purpose: PromptPurpose, input: String },
    Confirm { action: ConfirmAction, message: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EditorFocus {
    Title,
    Category,
    Content,
    Params,
}

impl EditorFocus {
    fn next(self) -> Self {
        match self {
            EditorFocus::Title => EditorFocus::Category,
            EditorFocus::Category => EditorFocus::Content,
            EditorFocus::Content => EditorFocus::Params,
            EditorFocus::Params => EditorFocus::Title,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct EditorState {
    pub(crate) draft: TemplateDraft,
    pub(crate) focus: EditorFocus,
    pub(crate) param_index: usize,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FillState {
    pub(crate) session: FillSession,
    pub(crate) active_field: usize,
    pub(crate) field_scroll: usize,
}

#[derive(Debug)]
pub(crate) struct App {
    pub(crate) config: Config,
    pub(crate) store: Option<Store>,
    pub(crate) tree_items: Vec<TreeItem>,
    pub(crate) list_state: ListState,
    pub(crate) list_scroll: usize,
    pub(crate) view: View,
    pub(crate) fill: FillState,
    pub(crate) editor: Option<EditorState>,
    pub(crate) dialog: Option<Dialog>,
    pub(crate) error_message: Option<String>,
    pub(crate) last_click: Option<(usize, Instant)>,
    pub(crate) tree_area: Rect,
    pub(crate) should_quit: bool,
    pub(crate) status: Option<StatusMessage>,
    pub(crate) needs_redraw: bool,
}

impl App {
    pub(crate) fn load(config: Config) -> Self {
        let mut app = Self {
            config,
            store: None,
            tree_items: Vec::new(),
            list_state: ListState::default(),
            list_scroll: 0,
            view: View::List,
            fill: FillState::default(),
            editor: None,
            dialog: None,
            error_message: None,
            last_click: None,
            tree_area: Rect::default(),
            should_quit: false,
            status: None,
            needs_redraw: false,
        };
        match Store::open(&app.config.data_file) {
            Ok(store) => {
                app.store = Some(store);
                app.refresh_tree(None);
            }
            Err(err) => {
                error!(error = %err, "failed to open template store");
                app.view = View::Error;
                app.error_message = Some(err.to_string());
            }
        }
        app
    }

    pub(crate) fn status_text(&self) -> Option<&str> {
        let duration = Duration::from_millis(self.config.status_duration_ms);
        self.status
            .as_ref()
            .filter(|message| message.since.elapsed() <= duration)
            .map(|message| message.text.as_str())
    }

    pub(crate) fn selected_target(&self) -> Option<TreeTarget> {
        let index = self.list_state.selected()?;
        self.tree_items.get(index).map(|item| item.target)
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent) {
        if self.dialog.is_some() {
            self.on_key_dialog(key);
            return;
        }
        match self.view {
            View::List => self.on_key_list(key),
            View::Fill => self.on_key_fill(key),
            View::Editor => self.on_key_editor(key),
            View::Error => self.on_key_error(key),
        }
    }

    pub(crate) fn on_mouse(&mut self, mouse: MouseEvent) {
        if self.view == View::List && self.dialog.is_none() {
            self.on_mouse_list(mouse);
        }
    }

    fn on_key_error(&mut self, key: KeyEvent) {
        if let KeyCode::Char('q') | KeyCode::Esc = key.code {
            self.should_quit = true;
        }
    }

    fn on_key_list(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.move_list(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_list(-1),
            KeyCode::Enter => self.open_selected_template(),
            KeyCode::Char('n') => self.open_new_template(),
            KeyCode::Char('e') => self.open_selected_in_editor(),
            KeyCode::Char('d') => self.confirm_delete_selected(),
            KeyCode::Char('c') => self.open_prompt(PromptPurpose::NewCategory),
            KeyCode::Char('i') => self.open_prompt(PromptPurpose::ImportPath),
            KeyCode::Char('x') => self.export(),
            KeyCode::Char('I') => {
                self.dialog = Some(Dialog::Confirm {
                    action: ConfirmAction::Initialize,
                    message: "Delete all templates and categories?".to_string(),
                });
            }
            _ => {}
        }
    }

    fn on_mouse_list(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if let Some(index) = self.index_from_mouse(mouse) {
            self.list_state.select(Some(index));
            let now = Instant::now();
            if let Some((last_index, last_time)) = self.last_click {
                if last_index == index && last_time.elapsed().as_millis() <= DOUBLE_CLICK_MS {
                    self.open_selected_template();
                }
            }
            self.last_click = Some((index, now));
        }
    }

    fn on_key_fill(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let fill = &mut self.fill;
        let count = fill.session.params().len();
        match key.code {
            KeyCode::Esc => {
                if fill.session.focused().is_some() {
                    fill.session.apply(SessionCommand::Blur);
                } else {
                    self.view = View::List;
                }
            }
            KeyCode::Tab | KeyCode::Down => {
                if count > 0 {
                    fill.active_field = match fill.session.focused() {
                        Some(index) => (index + 1) % count,
                        None => fill.active_field.min(count - 1),
                    };
                    fill.session.apply(SessionCommand::Focus(fill.active_field));
                }
            }
            KeyCode::BackTab | KeyCode::Up => {
                if count > 0 {
                    fill.active_field = match fill.session.focused() {
                        Some(0) => count - 1,
                        Some(index) => index - 1,
                        None => fill.active_field.min(count - 1),
                    };
                    fill.session.apply(SessionCommand::Focus(fill.active_field));
                }
            }
            KeyCode::Backspace => fill.session.backspace(fill.active_field),
            KeyCode::Char('c') if ctrl => self.copy_rendered(),
            KeyCode::Char('l') if ctrl => {
                fill.session.apply(SessionCommand::Clear);
                fill.active_field = 0;
                self.set_status("Cleared");
            }
            KeyCode::Char('e') if ctrl => {
                if let Some(template) = fill.session.template() {
                    self.editor = Some(EditorState::new(TemplateDraft::from_template(template)));
                    self.view = View::Editor;
                }
            }
            KeyCode::Char(ch) if !ctrl => {
                if !fill.session.push_char(fill.active_field, ch) && count > 0 {
                    let kind = fill.session.params()[fill.active_field.min(count - 1)].kind;
                    self.set_status(&format!("`{ch}` is not valid for a {} field", kind.as_str()));
                }
            }
            _ => {}
        }
    }

    fn on_key_editor(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let category_ids: Vec<Option<u32>> = std::iter::once(None)
            .chain(
                self.store
                    .iter()
                    .flat_map(|store| store.categories().iter().map(|category| Some(category.id))),
            )
            .collect();
        let Some(editor) = self.editor.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Esc => {
                self.editor = None;
                self.view = View::List;
                self.set_status("Discarded changes");
            }
            KeyCode::Tab => editor.focus = editor.focus.next(),
            KeyCode::Char('s') if ctrl => self.save_editor(),
            KeyCode::Char('e') if ctrl => self.edit_content_externally(),
            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                match editor.focus {
                    EditorFocus::Category => {
                        editor.draft.category_id =
                            cycle(&category_ids, editor.draft.category_id, forward);
                    }
                    EditorFocus::Params => {
                        if let Some(param) = editor.draft.params.get(editor.param_index) {
                            let kind = if forward {
                                param.kind.next()
                            } else {
                                param.kind.prev()
                            };
                            editor.draft.set_param_type(editor.param_index, kind);
                        }
                    }
                    _ => {}
                }
            }
            KeyCode::Up if editor.focus == EditorFocus::Params => {
                editor.param_index = editor.param_index.saturating_sub(1);
            }
            KeyCode::Down if editor.focus == EditorFocus::Params => {
                if editor.param_index + 1 < editor.draft.params.len() {
                    editor.param_index += 1;
                }
            }
            KeyCode::Enter if editor.focus == EditorFocus::Content => {
                editor.draft.push_content('\n');
            }
            KeyCode::Backspace => match editor.focus {
                EditorFocus::Title => {
                    editor.draft.title.pop();
                }
                EditorFocus::Content => {
                    editor.draft.pop_content();
                    editor.clamp_param_index();
                }
                _ => {}
            },
            KeyCode::Char(ch) if !ctrl => match editor.focus {
                EditorFocus::Title => editor.draft.title.push(ch),
                EditorFocus::Content => {
                    editor.draft.push_content(ch);
                    editor.clamp_param_index();
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn on_key_dialog(&mut self, key: KeyEvent) {
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };
        match dialog {
            Dialog::Prompt { purpose, input } => match key.code {
                KeyCode::Esc => self.dialog = None,
                KeyCode::Enter => {
                    let purpose = *purpose;
                    let input = input.trim().to_string();
                    self.dialog = None;
                    self.submit_prompt(purpose, &input);
                }
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(ch) => input.push(ch),
                _ => {}
            },
            Dialog::Confirm { action, .. } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    let action = *action;
                    self.dialog = None;
                    self.run_confirmed(action);
                }
                KeyCode::Char('n') | KeyCode::Esc => self.dialog = None,
                _ => {}
            },
        }
    }

    fn move_list(&mut self, delta: isize) {
        let len = self.tree_items.len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, (len - 1) as isize) as usize;
        self.list_state.select(Some(next));
    }

    fn open_selected_template(&mut self) {
        let Some(TreeTarget::Template(id)) = self.selected_target() else {
            return;
        };
        let Some(template) = self.store.as_ref().and_then(|store| store.template(id)) else {
            return;
        };
        self.fill.session.apply(SessionCommand::Select(template.clone()));
        self.fill.active_field = 0;
        self.fill.field_scroll = 0;
        if !self.fill.session.params().is_empty() {
            self.fill.session.apply(SessionCommand::Focus(0));
        }
        self.view = View::Fill;
    }

    fn open_new_template(&mut self) {
        let category_id = match self.selected_target() {
            Some(TreeTarget::Category(id)) => id,
            Some(TreeTarget::Template(id)) => self
                .store
                .as_ref()
                .and_then(|store| store.template(id))
                .and_then(|template| template.category_id),
            None => None,
        };
        self.editor = Some(EditorState::new(TemplateDraft::new(category_id)));
        self.view = View::Editor;
    }

    fn open_selected_in_editor(&mut self) {
        let Some(TreeTarget::Template(id)) = self.selected_target() else {
            self.set_status("Select a template to edit");
            return;
        };
        let Some(template) = self.store.as_ref().and_then(|store| store.template(id)) else {
            return;
        };
        self.editor = Some(EditorState::new(TemplateDraft::from_template(template)));
        self.view = View::Editor;
    }

    fn confirm_delete_selected(&mut self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let dialog = match self.selected_target() {
            Some(TreeTarget::Template(id)) => store.template(id).map(|template| Dialog::Confirm {
                action: ConfirmAction::DeleteTemplate(id),
                message: format!("Delete template `{}`?", template.title),
            }),
            Some(TreeTarget::Category(Some(id))) => store.category(id).map(|category| Dialog::Confirm {
                action: ConfirmAction::DeleteCategory(id),
                message: format!(
                    "Delete category `{}`? Its {} template(s) become uncategorized.",
                    category.name,
                    store.templates_in(Some(id)).len()
                ),
            }),
            _ => None,
        };
        self.dialog = dialog;
    }

    fn open_prompt(&mut self, purpose: PromptPurpose) {
        self.dialog = Some(Dialog::Prompt {
            purpose,
            input: String::new(),
        });
    }

    fn submit_prompt(&mut self, purpose: PromptPurpose, input: &str) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        match purpose {
            PromptPurpose::NewCategory => match store.insert_category(input) {
                Ok(id) => {
                    self.refresh_tree(Some(TreeTarget::Category(Some(id))));
                    self.set_status("Category added");
                }
                Err(err) => self.set_status(&err.to_string()),
            },
            PromptPurpose::ImportPath => {
                if input.is_empty() {
                    return;
                }
                match store.import_from(&PathBuf::from(input)) {
                    Ok(summary) => {
                        self.refresh_tree(None);
                        self.set_status(&format!(
                            "Imported {} categories and {} templates",
                            summary.categories, summary.templates
                        ));
                    }
                    Err(err) => {
                        error!(error = %err, "import failed");
                        self.set_status(&format!("Import failed: {err}"));
                    }
                }
            }
        }
    }

    fn run_confirmed(&mut self, action: ConfirmAction) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        let (result, done) = match action {
            ConfirmAction::DeleteTemplate(id) => (store.delete_template(id), "Template deleted"),
            ConfirmAction::DeleteCategory(id) => (store.delete_category(id), "Category deleted"),
            ConfirmAction::Initialize => (store.initialize(), "All data deleted"),
        };
        match result {
            Ok(()) => {
                self.refresh_tree(None);
                self.set_status(done);
            }
            Err(err) => self.set_status(&err.to_string()),
        }
    }

    fn export(&mut self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        match store.export_to(&self.config.export_dir) {
            Ok(path) => self.set_status(&format!("Exported to {}", path.display())),
            Err(err) => {
                error!(error = %err, "export failed");
                self.set_status(&format!("Export failed: {err}"));
            }
        }
    }

    fn copy_rendered(&mut self) {
        match set_clipboard(&self.fill.session.copy_text()) {
            Ok(()) => self.set_status("Copied"),
            Err(err) => {
                error!(error = %err, "copy failed");
                self.set_status(&err.to_string());
            }
        }
    }

    fn save_editor(&mut self) {
        let (Some(editor), Some(store)) = (self.editor.as_ref(), self.store.as_mut()) else {
            return;
        };
        match store.save_template(&editor.draft) {
            Ok(id) => {
                info!(id, "template saved from editor");
                if let Some(template) = store.template(id) {
                    if self.fill.session.template().is_some_and(|open| open.id == id) {
                        self.fill.session.apply(SessionCommand::Select(template.clone()));
                        self.fill.active_field = 0;
                    }
                }
                self.editor = None;
                self.view = View::List;
                self.refresh_tree(Some(TreeTarget::Template(id)));
                self.set_status("Saved");
            }
            Err(err) => self.set_status(&err.to_string()),
        }
    }

    fn edit_content_externally(&mut self) {
        let Some(command) = self.config.editor_command() else {
            self.set_status("Set `editor` in config.toml or the EDITOR variable");
            return;
        };
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        self.needs_redraw = true;
        match edit_text(&command, &editor.draft.content) {
            Ok(content) => {
                editor.draft.set_content(content);
                editor.clamp_param_index();
            }
            Err(err) => {
                error!(error = %err, "external editor failed");
                self.set_status(&err.to_string());
            }
        }
    }

    fn refresh_tree(&mut self, select: Option<TreeTarget>) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let previous = self.selected_target();
        self.tree_items = build_tree_items(store.categories(), store.templates());
        let wanted = select.or(previous);
        let index = wanted
            .and_then(|target| self.tree_items.iter().position(|item| item.target == target))
            .or_else(|| {
                let current = self.list_state.selected().unwrap_or(0);
                (!self.tree_items.is_empty()).then(|| current.min(self.tree_items.len() - 1))
            });
        self.list_state.select(index);
    }

    fn set_status(&mut self, text: &str) {
        self.status = Some(StatusMessage {
            text: text.to_string(),
            since: Instant::now(),
        });
    }

    fn index_from_mouse(&self, mouse: MouseEvent) -> Option<usize> {
        let area = self.tree_area;
        if area.width == 0 || area.height == 0 {
            return None;
        }
        if mouse.column < area.x
            || mouse.column >= area.x + area.width
            || mouse.row < area.y
            || mouse.row >= area.y + area.height
        {
            return None;
        }
        let row_offset = (mouse.row - area.y) as usize;
        let index = self.list_scroll + row_offset;
        if index >= self.tree_items.len() {
            return None;
        }
        Some(index)
    }
}

impl EditorState {
    fn new(draft: TemplateDraft) -> Self {
        Self {
            draft,
            focus: EditorFocus::Title,
            param_index: 0,
        }
    }

    fn clamp_param_index(&mut self) {
        self.param_index = self
            .param_index
            .min(self.draft.params.len().saturating_sub(1));
    }
}

fn cycle(options: &[Option<u32>], current: Option<u32>, forward: bool) -> Option<u32> {
    if options.is_empty() {
        return current;
    }
    let index = options.iter().position(|option| *option == current).unwrap_or(0);
    let next = if forward {
        (index + 1) % options.len()
    } else {
        (index + options.len() - 1) % options.len()
    };
    options[next]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char(ch))
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.on_key(key(KeyCode::Char(ch)));
        }
    }

    fn temp_app() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::defaults(dir.path());
        let app = App::load(config);
        (dir, app)
    }

    #[test]
    fn cycle_wraps_in_both_directions() {
        let options = [None, Some(1), Some(2)];
        assert_eq!(cycle(&options, None, true), Some(1));
        assert_eq!(cycle(&options, Some(2), true), None);
        assert_eq!(cycle(&options, None, false), Some(2));
        assert_eq!(cycle(&options, Some(9), true), Some(1));
    }

    #[test]
    fn opening_the_sample_starts_a_focused_session() {
        let (_dir, mut app) = temp_app();
        assert_eq!(app.view, View::List);
        assert_eq!(app.selected_target(), Some(TreeTarget::Category(Some(1))));

        app.on_key(key(KeyCode::Char('j')));
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.view, View::Fill);
        assert_eq!(app.fill.session.focused(), Some(0));

        type_text(&mut app, "Ann");
        app.on_key(key(KeyCode::Tab));
        type_text(&mut app, "4x2");
        let rendered = app.fill.session.rendered();
        assert!(rendered.copy_text.starts_with("Hello Ann,"));
        assert!(rendered.copy_text.contains("order 42."));
        assert!(rendered.display_html.contains("<span class=\"focus\">42</span>"));

        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.fill.session.focused(), None);
        assert_eq!(app.view, View::Fill);
        app.on_key(ctrl('l'));
        assert!(app.fill.session.rendered().copy_text.starts_with("Hello {name},"));
        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.view, View::List);
    }

    #[test]
    fn editor_creates_a_template_in_the_selected_category() {
        let (_dir, mut app) = temp_app();
        app.on_key(key(KeyCode::Char('n')));
        assert_eq!(app.view, View::Editor);
        type_text(&mut app, "Reminder");
        app.on_key(key(KeyCode::Tab));
        app.on_key(key(KeyCode::Tab));
        type_text(&mut app, "See {who} at {when}");
        app.on_key(key(KeyCode::Tab));
        app.on_key(key(KeyCode::Down));
        app.on_key(key(KeyCode::Right));
        app.on_key(key(KeyCode::Right));
        app.on_key(key(KeyCode::Right));
        app.on_key(ctrl('s'));

        assert_eq!(app.view, View::List);
        let store = app.store.as_ref().unwrap();
        let template = store.templates().last().unwrap();
        assert_eq!(template.title, "Reminder");
        assert_eq!(template.category_id, Some(1));
        assert_eq!(template.params.len(), 2);
        assert_eq!(template.params[1].kind.as_str(), "time");
        assert_eq!(app.selected_target(), Some(TreeTarget::Template(template.id)));
    }

    #[test]
    fn editor_refuses_to_save_without_title() {
        let (_dir, mut app) = temp_app();
        app.on_key(key(KeyCode::Char('n')));
        app.on_key(ctrl('s'));
        assert_eq!(app.view, View::Editor);
        assert_eq!(app.status_text(), Some("title is required"));
        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.view, View::List);
        assert_eq!(app.store.as_ref().unwrap().templates().len(), 1);
    }

    #[test]
    fn categories_are_added_and_deleted_through_dialogs() {
        let (_dir, mut app) = temp_app();
        app.on_key(key(KeyCode::Char('c')));
        type_text(&mut app, "Work");
        app.on_key(key(KeyCode::Enter));
        assert!(app.dialog.is_none());
        assert_eq!(app.selected_target(), Some(TreeTarget::Category(Some(2))));

        app.on_key(key(KeyCode::Char('d')));
        assert!(matches!(app.dialog, Some(Dialog::Confirm { .. })));
        app.on_key(key(KeyCode::Char('y')));
        assert_eq!(app.store.as_ref().unwrap().categories().len(), 1);
    }

    #[test]
    fn export_writes_into_the_configured_directory() {
        let (dir, mut app) = temp_app();
        app.on_key(key(KeyCode::Char('x')));
        let exports: Vec<_> = std::fs::read_dir(dir.path().join("exports"))
            .unwrap()
            .collect();
        assert_eq!(exports.len(), 1);
        assert!(app.status_text().unwrap().starts_with("Exported to"));
    }

    #[test]
    fn unreadable_store_shows_the_error_view() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::defaults(dir.path());
        std::fs::write(&config.data_file, "not json").unwrap();
        let mut app = App::load(config);
        assert_eq!(app.view, View::Error);
        assert!(app.error_message.is_some());
        app.on_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }
}
