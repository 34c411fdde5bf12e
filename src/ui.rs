use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, List, ListItem, ListState, Paragraph, Wrap};

use crate::app::{App, Dialog, EditorFocus, EditorState, FillState, PromptPurpose, View};
use crate::models::{TreeItem, TreeTarget};
use crate::parser::{Piece, byte_size, format_timestamp, full_width_count};
use crate::session::SessionPhase;

const ICON_FOLDER: &str = "";
const ICON_TEMPLATE: &str = "󰈙";
const SELECTED_MARKER: &str = " ";
const UNSELECTED_MARKER: &str = "  ";
const TREE_BRANCH: &str = "├─ ";
const TREE_LAST: &str = "└─ ";
const TREE_PIPE: &str = "│  ";
const TREE_EMPTY: &str = "   ";
const CURSOR: char = '|';

pub(crate) fn render_app(frame: &mut Frame, app: &mut App) {
    match app.view {
        View::List => render_list(frame, app),
        View::Fill => render_fill(frame, app),
        View::Editor => render_editor(frame, app),
        View::Error => render_error(frame, app),
    }
    if let Some(dialog) = app.dialog.as_ref() {
        render_dialog(frame, dialog);
    }
}

fn render_error(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let message = app
        .error_message
        .clone()
        .unwrap_or_else(|| "Unknown error".to_string());
    let message = format!("{message}\n\nData file: {}\nPress q to quit.", app.config.data_file.display());
    let paragraph = Paragraph::new(message)
        .block(Block::bordered().title("Error"))
        .style(Style::new().fg(Color::Red))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_list(frame: &mut Frame, app: &mut App) {
    let [list_area, help_area] = split_status(frame.area());

    let count = app.store.as_ref().map_or(0, |store| store.templates().len());
    let block = Block::bordered().title(format!("Templates ({count})"));
    let inner = inner_rect(list_area);
    app.tree_area = inner;

    let view_height = inner.height as usize;
    app.list_scroll = ensure_visible(
        app.list_scroll,
        app.list_state.selected().unwrap_or(0),
        app.tree_items.len(),
        view_height,
    );

    let start = app.list_scroll;
    let end = (start + view_height).min(app.tree_items.len());
    let tree_lines = build_tree_lines(&app.tree_items);
    let selected = app.list_state.selected().unwrap_or(0);

    let items: Vec<ListItem> = tree_lines[start..end]
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let marker = if start + idx == selected {
                SELECTED_MARKER
            } else {
                UNSELECTED_MARKER
            };
            ListItem::new(format!("{marker}{line}"))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::new().bg(Color::Blue).fg(Color::White));

    let mut state = ListState::default();
    if let Some(selected) = app.list_state.selected() {
        if selected >= start && selected < end {
            state.select(Some(selected - start));
        }
    }
    frame.render_stateful_widget(list, list_area, &mut state);

    let mut help =
        "↑↓/j k move  Enter open  n new  e edit  d delete  c category  x export  i import  I reset  q quit"
            .to_string();
    if let Some(TreeTarget::Template(id)) = app.selected_target() {
        let updated = app
            .store
            .as_ref()
            .and_then(|store| store.template(id))
            .map(|template| format_timestamp(template.updated_at))
            .unwrap_or_default();
        if !updated.is_empty() {
            help.push_str("  |  updated ");
            help.push_str(&updated);
        }
    }
    push_status(&mut help, app.status_text());
    frame.render_widget(
        Paragraph::new(help).style(Style::new().fg(Color::DarkGray)),
        help_area,
    );
}

fn render_fill(frame: &mut Frame, app: &mut App) {
    let title = app
        .fill
        .session
        .template()
        .map(|template| format!("Preview: {}", template.title))
        .unwrap_or_else(|| "Preview".to_string());
    let title = match app.fill.session.phase() {
        SessionPhase::InputChanged => format!("{title} (edited)"),
        _ => title,
    };
    let status = app.status_text().map(str::to_string);

    let [content_area, status_area] = split_status(frame.area());
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(content_area);

    render_fields(frame, &mut app.fill, horizontal[0]);
    let preview = Paragraph::new(preview_lines(&app.fill.session.pieces()))
        .block(Block::bordered().title(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(preview, horizontal[1]);

    let mut help = "Esc blur/back  Tab/↑↓ move  Ctrl+C copy  Ctrl+L clear  Ctrl+E edit".to_string();
    push_status(&mut help, status.as_deref());
    frame.render_widget(
        Paragraph::new(help).style(Style::new().fg(Color::DarkGray)),
        status_area,
    );
}

fn render_fields(frame: &mut Frame, fill: &mut FillState, area: Rect) {
    let block = Block::bordered().title("Parameters");
    let inner = inner_rect(area);
    frame.render_widget(block, area);

    let params = fill.session.params();
    if params.is_empty() {
        let empty = Paragraph::new("This template has no {placeholders}.")
            .style(Style::new().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let field_height: u16 = 3;
    let view_capacity = (inner.height / field_height) as usize;
    fill.field_scroll = ensure_visible(
        fill.field_scroll,
        fill.active_field,
        params.len(),
        view_capacity,
    );

    let start = fill.field_scroll;
    let end = (start + view_capacity).min(params.len());
    for (idx, param) in params[start..end].iter().enumerate() {
        let is_active = start + idx == fill.active_field;
        let border_style = if param.is_focus {
            Style::new().fg(Color::Blue)
        } else {
            Style::new().fg(Color::DarkGray)
        };
        let label = format!("{} · {}", param.value, param.kind.as_str());
        let line = if param.input_text.is_empty() && !is_active {
            Line::from(Span::styled(
                param.kind.hint(),
                Style::new().fg(Color::DarkGray),
            ))
        } else {
            let mut value = param.input_text.clone();
            if is_active {
                value.push(CURSOR);
            }
            Line::from(value)
        };
        let field_area = Rect {
            x: inner.x,
            y: inner.y + (idx as u16) * field_height,
            width: inner.width,
            height: field_height,
        };
        let field_block = Block::bordered().title(label).border_style(border_style);
        frame.render_widget(Paragraph::new(line).block(field_block), field_area);
    }
}

fn preview_lines<'a>(pieces: &[Piece<'a>]) -> Vec<Line<'a>> {
    let focus_style = Style::new().bg(Color::Blue).fg(Color::White);
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'a>> = Vec::new();
    for piece in pieces {
        let (text, style) = match *piece {
            Piece::Text(text) => (text, Style::new()),
            Piece::Placeholder { token, focused: true } => (token, focus_style),
            Piece::Placeholder { token, .. } => (token, Style::new().fg(Color::Yellow)),
            Piece::Value { text, focused: true } => (text, focus_style),
            Piece::Value { text, .. } => (text, Style::new().fg(Color::Green)),
        };
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            if !first.is_empty() {
                spans.push(Span::styled(first, style));
            }
        }
        for part in parts {
            lines.push(Line::from(std::mem::take(&mut spans)));
            if !part.is_empty() {
                spans.push(Span::styled(part, style));
            }
        }
    }
    lines.push(Line::from(spans));
    lines
}

fn render_editor(frame: &mut Frame, app: &mut App) {
    let status = app.status_text().map(str::to_string);
    let category_name = |id: Option<u32>| {
        id.and_then(|id| app.store.as_ref().and_then(|store| store.category(id)))
            .map(|category| category.name.clone())
            .unwrap_or_else(|| "(none)".to_string())
    };
    let Some(editor) = app.editor.as_ref() else {
        return;
    };
    let category = category_name(editor.draft.category_id);

    let [content_area, status_area] = split_status(frame.area());
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(content_area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Fill(1),
        ])
        .split(horizontal[0]);

    let heading = if editor.draft.id.is_some() {
        "Title (editing)"
    } else {
        "Title (new)"
    };
    let title = with_cursor(&editor.draft.title, editor.focus == EditorFocus::Title);
    frame.render_widget(
        Paragraph::new(title).block(region_block(heading, editor, EditorFocus::Title)),
        left[0],
    );
    frame.render_widget(
        Paragraph::new(format!("◀ {category} ▶"))
            .block(region_block("Category", editor, EditorFocus::Category)),
        left[1],
    );
    render_param_list(frame, editor, left[2]);

    let content = with_cursor(&editor.draft.content, editor.focus == EditorFocus::Content);
    frame.render_widget(
        Paragraph::new(content)
            .block(region_block("Content", editor, EditorFocus::Content))
            .wrap(Wrap { trim: false }),
        horizontal[1],
    );

    let mut help = format!(
        "Tab region  ←→ change  Ctrl+E external editor  Ctrl+S save  Esc discard  |  {} bytes",
        byte_size(&editor.draft.content)
    );
    push_status(&mut help, status.as_deref());
    frame.render_widget(
        Paragraph::new(help).style(Style::new().fg(Color::DarkGray)),
        status_area,
    );
}

fn render_param_list(frame: &mut Frame, editor: &EditorState, area: Rect) {
    let block = region_block("Parameters", editor, EditorFocus::Params);
    let width = editor
        .draft
        .params
        .iter()
        .map(|param| full_width_count(&param.value) * 2)
        .max()
        .unwrap_or(0);
    let items: Vec<ListItem> = editor
        .draft
        .params
        .iter()
        .map(|param| {
            let pad = width.saturating_sub(full_width_count(&param.value) * 2);
            ListItem::new(format!(
                "{}{}  ◀ {} ▶",
                param.value,
                " ".repeat(pad),
                param.kind.as_str()
            ))
        })
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::new().bg(Color::Blue).fg(Color::White));
    let mut state = ListState::default();
    if editor.focus == EditorFocus::Params && !editor.draft.params.is_empty() {
        state.select(Some(editor.param_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn region_block<'a>(title: &'a str, editor: &EditorState, region: EditorFocus) -> Block<'a> {
    let style = if editor.focus == region {
        Style::new().fg(Color::Blue).add_modifier(Modifier::BOLD)
    } else {
        Style::new().fg(Color::DarkGray)
    };
    Block::bordered().title(title).border_style(style)
}

fn render_dialog(frame: &mut Frame, dialog: &Dialog) {
    let area = centered_rect(frame.area(), 60, 5);
    frame.render_widget(Clear, area);
    let (title, body) = match dialog {
        Dialog::Prompt { purpose, input } => {
            let title = match purpose {
                PromptPurpose::NewCategory => "New category name",
                PromptPurpose::ImportPath => "Import from JSON file",
            };
            (title, format!("{}\nEnter confirm  Esc cancel", with_cursor(input, true)))
        }
        Dialog::Confirm { message, .. } => ("Confirm", format!("{message}\ny yes  n no")),
    };
    let paragraph = Paragraph::new(body)
        .block(Block::bordered().title(title).border_style(Style::new().fg(Color::Yellow)))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn with_cursor(text: &str, active: bool) -> String {
    let mut value = text.to_string();
    if active {
        value.push(CURSOR);
    }
    value
}

fn push_status(help: &mut String, status: Option<&str>) {
    if let Some(text) = status {
        help.push_str("  |  ");
        help.push_str(text);
    }
}

fn split_status(area: Rect) -> [Rect; 2] {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(1)])
        .split(area);
    [layout[0], layout[1]]
}

fn centered_rect(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = area.width * percent_x / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn inner_rect(area: Rect) -> Rect {
    let mut inner = area;
    if inner.width >= 2 {
        inner.x += 1;
        inner.width -= 2;
    }
    if inner.height >= 2 {
        inner.y += 1;
        inner.height -= 2;
    }
    inner
}

fn ensure_visible(current_scroll: usize, selected: usize, total: usize, view_height: usize) -> usize {
    if total == 0 || view_height == 0 {
        return 0;
    }
    let mut scroll = current_scroll.min(total.saturating_sub(1));
    if selected < scroll {
        scroll = selected;
    } else if selected >= scroll + view_height {
        scroll = selected + 1 - view_height;
    }
    scroll
}

fn build_tree_lines(items: &[TreeItem]) -> Vec<String> {
    let mut lines = Vec::with_capacity(items.len());
    let mut branches: Vec<bool> = Vec::new();
    for (index, item) in items.iter().enumerate() {
        branches.truncate(item.depth);
        let is_last = is_last_sibling(items, index);
        let icon = match item.target {
            TreeTarget::Category(_) => ICON_FOLDER,
            TreeTarget::Template(_) => ICON_TEMPLATE,
        };

        let mut line = String::new();
        for has_next in &branches {
            line.push_str(if *has_next { TREE_PIPE } else { TREE_EMPTY });
        }
        line.push_str(if is_last { TREE_LAST } else { TREE_BRANCH });
        line.push_str(icon);
        line.push(' ');
        line.push_str(&item.label);
        lines.push(line);

        branches.push(!is_last);
    }
    lines
}

fn is_last_sibling(items: &[TreeItem], index: usize) -> bool {
    let depth = items[index].depth;
    for item in &items[index + 1..] {
        if item.depth <= depth {
            return item.depth < depth;
        }
    }
    true
}
