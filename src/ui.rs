use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};

use crate::chunked::ChunkedJournal;
use crate::commands::{parse_command, CommandResponse, ViewerCommand};
use crate::cursor::JournalCursor;
use crate::search::{search_records, SearchState};
use crate::server::CommandRequest;
use crate::stream::JournalStream;

#[derive(Default)]
struct UiState {
    search: SearchState,
    /// `Some` while the `:` command prompt is active.
    prompt: Option<String>,
    /// Transient message shown in place of the position status.
    status: Option<String>,
}

#[derive(Debug, PartialEq)]
enum UiAction {
    None,
    Quit,
}

/// Restores the terminal even when the event loop unwinds.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
    }
}

/// Fullscreen pager loop. Pull-based: every repaint re-requests the
/// visible window from the cache. Remote-control requests are drained
/// between input polls and answered on their back-channel.
pub fn run<S: JournalStream>(
    journal: &mut ChunkedJournal<S>,
    command_rx: async_channel::Receiver<CommandRequest>,
) -> io::Result<()> {
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let _guard = TerminalGuard;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    journal.seek_to_start();
    let mut state = UiState::default();

    loop {
        terminal.draw(|frame| render(frame, journal, &state))?;

        let page = page_height(&terminal)?;
        while let Ok(request) = command_rx.try_recv() {
            let response = apply_command(journal, &mut state, request.command, page);
            let _ = request.response_tx.send(response);
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }

        let action = if state.prompt.is_some() {
            handle_prompt_key(journal, &mut state, key, page)
        } else {
            handle_key(journal, &mut state, key, page)
        };
        if action == UiAction::Quit {
            break;
        }
    }

    Ok(())
}

fn page_height(terminal: &Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<i64> {
    // one row is reserved for the modeline
    Ok(i64::from(terminal.size()?.height.saturating_sub(1).max(1)))
}

fn handle_key<S: JournalStream>(
    journal: &mut ChunkedJournal<S>,
    state: &mut UiState,
    key: KeyEvent,
    page: i64,
) -> UiAction {
    state.status = None;
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('q') if !ctrl => return UiAction::Quit,
        KeyCode::Up => journal.scroll_lines(-1),
        KeyCode::Char('p') if ctrl => journal.scroll_lines(-1),
        KeyCode::Down => journal.scroll_lines(1),
        KeyCode::Char('n') if ctrl => journal.scroll_lines(1),
        KeyCode::PageUp => journal.scroll_lines(-page),
        KeyCode::Char('b') if !ctrl => journal.scroll_lines(-page),
        KeyCode::PageDown => journal.scroll_lines(page),
        KeyCode::Char('f') if !ctrl => journal.scroll_lines(page),
        KeyCode::Char('v') if ctrl => journal.scroll_lines(page),
        KeyCode::Char(' ') => journal.scroll_lines(page),
        KeyCode::Home => journal.seek_to_start(),
        KeyCode::Char('g') if !ctrl => journal.seek_to_start(),
        KeyCode::End => journal.seek_to_end(),
        KeyCode::Char('G') => journal.seek_to_end(),
        KeyCode::Char(':') => state.prompt = Some(String::new()),
        KeyCode::Esc => state.search.clear(),
        _ => {}
    }
    UiAction::None
}

fn handle_prompt_key<S: JournalStream>(
    journal: &mut ChunkedJournal<S>,
    state: &mut UiState,
    key: KeyEvent,
    page: i64,
) -> UiAction {
    match key.code {
        KeyCode::Esc => {
            state.prompt = None;
        }
        KeyCode::Enter => {
            let line = state.prompt.take().unwrap_or_default();
            if line.trim().is_empty() {
                return UiAction::None;
            }
            let response = match parse_command(&line) {
                Ok(command) => apply_command(journal, state, command, page),
                Err(e) => CommandResponse::Error(e),
            };
            state.status = Some(response.to_string());
        }
        KeyCode::Backspace => {
            if let Some(input) = state.prompt.as_mut() {
                input.pop();
            }
        }
        KeyCode::Char(c) if !c.is_control() => {
            if let Some(input) = state.prompt.as_mut() {
                input.push(c);
            }
        }
        _ => {}
    }
    UiAction::None
}

fn apply_command<S: JournalStream>(
    journal: &mut ChunkedJournal<S>,
    state: &mut UiState,
    command: ViewerCommand,
    page: i64,
) -> CommandResponse {
    match command {
        ViewerCommand::Top => {
            journal.seek_to_start();
            CommandResponse::Ok(None)
        }
        ViewerCommand::Bottom => {
            journal.seek_to_end();
            CommandResponse::Ok(None)
        }
        ViewerCommand::Scroll { lines } => {
            journal.scroll_lines(lines);
            CommandResponse::Ok(None)
        }
        ViewerCommand::Position => {
            let mut detail = journal.position_string();
            if let Some(record) = journal.current_line() {
                detail.push_str("; ");
                detail.push_str(&record.timestamp_utc());
                detail.push_str("; cursor ");
                detail.push_str(&JournalCursor::from_record(record).to_string());
            }
            CommandResponse::Ok(Some(detail))
        }
        ViewerCommand::Search { pattern } => {
            if let Err(e) = state.search.set_pattern(&pattern) {
                return CommandResponse::Error(e);
            }
            let matches = match &state.search.pattern {
                Some(regex) => search_records(regex, journal.get_lines(page as usize)),
                None => Vec::new(),
            };
            let detail = match matches.first() {
                Some(first) => format!(
                    "{} matches in view; first at line {}, col {}",
                    matches.len(),
                    first.line_index + 1,
                    first.start_col + 1
                ),
                None => "no matches in view".to_string(),
            };
            CommandResponse::Ok(Some(detail))
        }
        ViewerCommand::Goto { cursor } => match JournalCursor::parse(&cursor) {
            Ok(parsed) => {
                if journal.jump_to(parsed.identity) {
                    CommandResponse::Ok(Some(journal.position_string()))
                } else {
                    CommandResponse::Error("cursor does not address a cached record".to_string())
                }
            }
            Err(e) => CommandResponse::Error(e.to_string()),
        },
    }
}

fn render<S: JournalStream>(frame: &mut Frame<'_>, journal: &ChunkedJournal<S>, state: &UiState) {
    let [body, modeline] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    let records = journal.get_lines(body.height as usize);
    let lines: Vec<Line> = records
        .iter()
        .map(|record| highlighted_line(&record.text, &state.search))
        .collect();
    frame.render_widget(Paragraph::new(Text::from(lines)), body);

    match &state.prompt {
        Some(input) => {
            frame.render_widget(Paragraph::new(format!(":{}", input)), modeline);
        }
        None => {
            let status = match &state.status {
                Some(message) => message.clone(),
                None => status_line(journal, state),
            };
            frame.render_widget(
                Paragraph::new(status).style(Style::default().add_modifier(Modifier::REVERSED)),
                modeline,
            );
        }
    }
}

fn status_line<S: JournalStream>(journal: &ChunkedJournal<S>, state: &UiState) -> String {
    let mut status = journal.position_string();
    if let Some(record) = journal.current_line() {
        status.push_str("; cursor ");
        status.push_str(&JournalCursor::from_record(record).to_string());
    }
    if state.search.is_active() {
        status.push_str("; /");
        status.push_str(&state.search.pattern_str);
    }
    status
}

fn highlighted_line<'a>(text: &'a str, search: &SearchState) -> Line<'a> {
    let spans = search.match_spans(text);
    if spans.is_empty() {
        return Line::from(text);
    }

    let mut parts: Vec<Span> = Vec::new();
    let mut pos = 0;
    for (start, end) in spans {
        if start > pos {
            parts.push(Span::raw(&text[pos..start]));
        }
        parts.push(Span::styled(
            &text[start..end],
            Style::default().add_modifier(Modifier::REVERSED),
        ));
        pos = end;
    }
    if pos < text.len() {
        parts.push(Span::raw(&text[pos..]));
    }
    Line::from(parts)
}
