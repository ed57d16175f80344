//! TUI state and input handling, kept free of terminal I/O.

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskdeck_core::{TaskBoard, TaskId};
use taskdeck_sync::{SyncEnvelope, SyncEvent, SyncRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Title,
    Description,
    List,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Title => Focus::Description,
            Focus::Description => Focus::List,
            Focus::List => Focus::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Title => Focus::List,
            Focus::Description => Focus::Title,
            Focus::List => Focus::Description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

#[derive(Debug, PartialEq)]
pub enum KeyOutcome {
    Continue,
    Quit,
    Send(SyncEnvelope),
}

#[derive(Debug)]
pub struct App {
    pub board: TaskBoard,
    pub focus: Focus,
    pub notice: Option<Notice>,
    /// Selection follows the task, not the row.
    selected: Option<TaskId>,
    in_flight: usize,
    next_request_id: u64,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            board: TaskBoard::new(),
            focus: Focus::Title,
            notice: None,
            selected: None,
            in_flight: 0,
            next_request_id: 1,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected.as_ref().and_then(|id| self.board.position(id))
    }

    pub fn selected_id(&self) -> Option<&TaskId> {
        self.selected.as_ref().filter(|id| self.board.get(id).is_some())
    }

    /// Wrap a request for the worker. It counts as in flight once the worker
    /// reports it started.
    pub fn request(&mut self, request: SyncRequest) -> SyncEnvelope {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        SyncEnvelope { request_id, request }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyOutcome::Quit;
        }

        match key.code {
            KeyCode::Esc => return KeyOutcome::Quit,
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return KeyOutcome::Continue;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return KeyOutcome::Continue;
            }
            _ => {}
        }

        match self.focus {
            Focus::Title | Focus::Description => self.handle_form_key(key),
            Focus::List => self.handle_list_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.code == KeyCode::Enter {
            return self.submit_draft();
        }

        let focus = self.focus;
        let draft = self.board.draft_mut();
        let field = match focus {
            Focus::Title => &mut draft.title,
            _ => &mut draft.description,
        };
        match key.code {
            KeyCode::Char(c) => field.push(c),
            KeyCode::Backspace => {
                field.pop();
            }
            _ => {}
        }
        KeyOutcome::Continue
    }

    fn submit_draft(&mut self) -> KeyOutcome {
        match self.board.draft().to_new_task() {
            Ok(body) => KeyOutcome::Send(self.request(SyncRequest::Create(body))),
            Err(e) => {
                self.notice = Some(Notice::Error(format!("Cannot add task: {e}")));
                KeyOutcome::Continue
            }
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> KeyOutcome {
        match key.code {
            KeyCode::Char('q') => KeyOutcome::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
                KeyOutcome::Continue
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
                KeyOutcome::Continue
            }
            KeyCode::Char('r') => KeyOutcome::Send(self.request(SyncRequest::Load)),
            KeyCode::Char(' ') | KeyCode::Char('t') => {
                let Some(task) = self.selected_id().and_then(|id| self.board.get(id)) else {
                    return KeyOutcome::Continue;
                };
                let request = SyncRequest::SetStatus {
                    id: task.id.clone(),
                    status: task.status.toggled(),
                };
                KeyOutcome::Send(self.request(request))
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let Some(id) = self.selected_id().cloned() else {
                    return KeyOutcome::Continue;
                };
                KeyOutcome::Send(self.request(SyncRequest::Delete(id)))
            }
            _ => KeyOutcome::Continue,
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.board.len();
        if len == 0 {
            self.selected = None;
            return;
        }
        let next = match self.selected_index() {
            Some(i) => (i as isize + delta).clamp(0, len as isize - 1) as usize,
            None => 0,
        };
        self.selected = Some(self.board.tasks()[next].id.clone());
    }

    /// Fold a worker event into the board. Failures only touch the notice line.
    pub fn apply_event(&mut self, event: SyncEvent, now: DateTime<Utc>) {
        let result = match event {
            SyncEvent::Started { .. } => {
                self.in_flight += 1;
                return;
            }
            SyncEvent::Finished { result, .. } => result,
        };
        self.in_flight = self.in_flight.saturating_sub(1);

        let prev_index = self.selected_index();
        match result {
            Ok(outcome) => {
                let summary = outcome.summary();
                let changed = outcome.apply(&mut self.board, now);
                self.notice = Some(if changed {
                    Notice::Info(summary)
                } else {
                    Notice::Error("Task no longer listed".to_string())
                });
            }
            Err(e) => {
                self.notice = Some(Notice::Error(e.short()));
            }
        }
        self.repair_selection(prev_index);
    }

    /// If the selected task vanished, select whatever now sits in its row.
    fn repair_selection(&mut self, prev_index: Option<usize>) {
        if self.selected.is_none() || self.selected_id().is_some() {
            return;
        }
        let len = self.board.len();
        self.selected = if len == 0 {
            None
        } else {
            let i = prev_index.unwrap_or(0).min(len - 1);
            Some(self.board.tasks()[i].id.clone())
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_core::{Draft, Task, TaskStatus};
    use taskdeck_sync::{SyncError, SyncOutcome};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            assert_eq!(app.handle_key(key(KeyCode::Char(c))), KeyOutcome::Continue);
        }
    }

    fn finished(request_id: u64, outcome: SyncOutcome) -> SyncEvent {
        SyncEvent::Finished {
            request_id,
            result: Ok(outcome),
        }
    }

    fn loaded_app() -> App {
        let mut app = App::new();
        app.request(SyncRequest::Load);
        app.apply_event(
            finished(
                1,
                SyncOutcome::Loaded(vec![
                    Task::new("1", "A"),
                    Task::new("2", "B").with_status(TaskStatus::Completed),
                    Task::new("3", "C"),
                ]),
            ),
            Utc::now(),
        );
        app.focus = Focus::List;
        app
    }

    #[test]
    fn typing_fills_focused_field() {
        let mut app = App::new();
        type_str(&mut app, "Buy milkk");
        app.handle_key(key(KeyCode::Backspace));
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, "2 litres");

        assert_eq!(app.board.draft(), &Draft::new("Buy milk", "2 litres"));
        assert_eq!(app.focus, Focus::Description);
    }

    #[test]
    fn enter_with_blank_description_shows_error_and_sends_nothing() {
        let mut app = App::new();
        type_str(&mut app, "Buy milk");

        assert_eq!(app.handle_key(key(KeyCode::Enter)), KeyOutcome::Continue);
        assert!(matches!(app.notice, Some(Notice::Error(ref m)) if m.contains("description")));
        assert_eq!(app.in_flight(), 0);
    }

    #[test]
    fn enter_with_full_draft_sends_create() {
        let mut app = App::new();
        type_str(&mut app, "A");
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, "d");

        let KeyOutcome::Send(env) = app.handle_key(key(KeyCode::Enter)) else {
            panic!("expected a create request");
        };
        assert!(matches!(env.request, SyncRequest::Create(ref b) if b.title == "A" && b.description == "d"));
        // Draft stays until the server accepts it.
        assert_eq!(app.board.draft().title, "A");
    }

    #[test]
    fn q_types_in_form_but_quits_from_list() {
        let mut app = App::new();
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), KeyOutcome::Continue);
        assert_eq!(app.board.draft().title, "q");

        app.focus = Focus::List;
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), KeyOutcome::Quit);
    }

    #[test]
    fn ctrl_c_quits_anywhere() {
        let mut app = App::new();
        let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.handle_key(ev), KeyOutcome::Quit);
    }

    #[test]
    fn toggle_requests_flipped_status_of_selected() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected_index(), Some(1));

        let KeyOutcome::Send(env) = app.handle_key(key(KeyCode::Char(' '))) else {
            panic!("expected a status request");
        };
        assert_eq!(
            env.request,
            SyncRequest::SetStatus {
                id: TaskId::new("2"),
                status: TaskStatus::Pending
            }
        );
    }

    #[test]
    fn list_keys_without_selection_send_nothing() {
        let mut app = loaded_app();
        assert_eq!(app.handle_key(key(KeyCode::Char('d'))), KeyOutcome::Continue);
        assert_eq!(app.handle_key(key(KeyCode::Char('t'))), KeyOutcome::Continue);
    }

    #[test]
    fn delete_moves_selection_to_next_row() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));

        let KeyOutcome::Send(env) = app.handle_key(key(KeyCode::Char('d'))) else {
            panic!("expected a delete request");
        };
        app.apply_event(finished(env.request_id, SyncOutcome::Deleted(TaskId::new("2"))), Utc::now());

        assert_eq!(app.board.len(), 2);
        assert_eq!(app.selected_id(), Some(&TaskId::new("3")));
        assert_eq!(app.notice, Some(Notice::Info("Task deleted".to_string())));
        assert_eq!(app.in_flight(), 0);
    }

    #[test]
    fn in_flight_counts_started_until_finished() {
        let mut app = loaded_app();
        app.apply_event(SyncEvent::Started { request_id: 2 }, Utc::now());
        app.apply_event(SyncEvent::Started { request_id: 3 }, Utc::now());
        assert_eq!(app.in_flight(), 2);

        app.apply_event(finished(2, SyncOutcome::Loaded(vec![])), Utc::now());
        assert_eq!(app.in_flight(), 1);
    }

    #[test]
    fn late_status_for_deleted_task_is_not_reported_as_success() {
        let mut app = loaded_app();
        app.apply_event(finished(2, SyncOutcome::Deleted(TaskId::new("1"))), Utc::now());
        app.apply_event(
            finished(
                3,
                SyncOutcome::StatusSet {
                    id: TaskId::new("1"),
                    status: TaskStatus::Completed,
                },
            ),
            Utc::now(),
        );

        assert_eq!(app.board.len(), 2);
        assert_eq!(app.notice, Some(Notice::Error("Task no longer listed".to_string())));
    }

    #[test]
    fn created_event_resets_draft() {
        let mut app = App::new();
        *app.board.draft_mut() = Draft::new("A", "d");
        let body = app.board.draft().to_new_task().unwrap();
        app.request(SyncRequest::Create(body));

        app.apply_event(
            finished(1, SyncOutcome::Created(Task::new("9", "A").with_description("d"))),
            Utc::now(),
        );

        assert!(app.board.draft().is_empty());
        assert_eq!(app.board.len(), 1);
    }

    #[test]
    fn failed_event_surfaces_error_and_keeps_board() {
        let mut app = loaded_app();
        *app.board.draft_mut() = Draft::new("A", "d");
        app.request(SyncRequest::Delete(TaskId::new("1")));

        app.apply_event(
            SyncEvent::Finished {
                request_id: 2,
                result: Err(SyncError::UnknownTask(TaskId::new("1"))),
            },
            Utc::now(),
        );

        assert_eq!(app.board.len(), 3);
        assert_eq!(app.board.draft(), &Draft::new("A", "d"));
        assert!(matches!(app.notice, Some(Notice::Error(_))));
    }
}
