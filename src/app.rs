use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::ApiClient;

/// A single to-do entry as held by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub label: String,
    pub done: bool,
}

/// Task-list state plus one named handler per key binding.
///
/// The task vector is the client-side source of truth: `ui::draw` derives the
/// whole frame from it every tick, so the handlers can be exercised without a
/// terminal.
pub struct App {
    pub server_url: String,
    pub tasks: Vec<Task>,
    pub selected: usize,
    /// Add-task input line; `Some` while the input popup is open.
    pub input: Option<String>,
    pub last_refresh: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(server_url: String) -> Self {
        Self {
            server_url,
            tasks: Vec::new(),
            selected: 0,
            input: None,
            last_refresh: None,
            error_message: None,
            should_quit: false,
        }
    }

    /// Initial fetch. A failure reloads exactly once; if the reload also
    /// fails the list stays empty with the error in the status bar.
    pub async fn load(&mut self, api: &ApiClient) {
        if let Err(e) = self.try_refresh(api).await {
            warn!("Task fetching error: {e:#}");
            self.reload(api).await;
        }
    }

    /// Clear-and-refetch. The task vector is replaced wholesale; a failed
    /// fetch leaves it empty rather than partially rendered.
    pub async fn reload(&mut self, api: &ApiClient) {
        if let Err(e) = self.try_refresh(api).await {
            self.tasks.clear();
            self.selected = 0;
            self.error_message = Some(format!("Task list: {e:#}"));
        }
    }

    async fn try_refresh(&mut self, api: &ApiClient) -> anyhow::Result<()> {
        self.tasks = api.fetch_tasks().await?;
        self.selected = self.selected.min(self.tasks.len().saturating_sub(1));
        self.last_refresh = Some(Utc::now());
        self.error_message = None;
        Ok(())
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected)
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if !self.tasks.is_empty() {
            self.selected = (self.selected + 1).min(self.tasks.len() - 1);
        }
    }

    /// Flip the selected task's done flag and notify the server.
    ///
    /// The flag is client truth: it stays flipped even when the PATCH never
    /// reaches the server, and the strike-through style follows the flag
    /// rather than any server-confirmed value.
    pub async fn toggle_selected(&mut self, api: &ApiClient) {
        let Some(task) = self.tasks.get_mut(self.selected) else {
            return;
        };
        task.done = !task.done;
        let id = task.id;
        if let Err(e) = api.toggle_task(id).await {
            warn!("Task update error: {e:#}");
        }
    }

    /// Delete the selected task server-side, then drop it from the list once
    /// the request completes. A transport failure leaves the entry in place.
    pub async fn delete_selected(&mut self, api: &ApiClient) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id;
        if api.delete_task(id).await.is_ok() {
            self.tasks.retain(|t| t.id != id);
            self.selected = self.selected.min(self.tasks.len().saturating_sub(1));
        }
    }

    /// Open the add-task input line.
    pub fn open_input(&mut self) {
        self.input = Some(String::new());
    }

    pub fn cancel_input(&mut self) {
        self.input = None;
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(input) = &mut self.input {
            input.push(c);
        }
    }

    pub fn input_backspace(&mut self) {
        if let Some(input) = &mut self.input {
            input.pop();
        }
    }

    /// Submit the input line as a new task, then reload. Empty input just
    /// closes the popup without a request.
    pub async fn submit_input(&mut self, api: &ApiClient) {
        let Some(label) = self.input.take() else {
            return;
        };
        let label = label.trim().to_string();
        if label.is_empty() {
            return;
        }
        match api.add_task(&label).await {
            Ok(()) => self.reload(api).await,
            Err(e) => self.error_message = Some(format!("Add task: {e:#}")),
        }
    }

    /// End the session. The logout outcome is ignored; the list reloads
    /// regardless.
    pub async fn log_out(&mut self, api: &ApiClient) {
        if let Err(e) = api.logout().await {
            debug!("Logout error: {e:#}");
        }
        self.reload(api).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_tasks(tasks: Vec<Task>) -> App {
        let mut app = App::new("http://localhost:5000".to_string());
        app.tasks = tasks;
        app
    }

    fn task(id: u64, label: &str) -> Task {
        Task {
            id,
            label: label.to_string(),
            done: false,
        }
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut app = app_with_tasks(vec![task(1, "a"), task(2, "b"), task(3, "c")]);

        app.select_next();
        app.select_next();
        app.select_next();
        assert_eq!(app.selected, 2);

        app.select_prev();
        app.select_prev();
        app.select_prev();
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn selection_on_empty_list_is_a_noop() {
        let mut app = app_with_tasks(Vec::new());

        app.select_next();
        app.select_prev();
        assert_eq!(app.selected, 0);
        assert!(app.selected_task().is_none());
    }

    #[test]
    fn selected_task_follows_cursor() {
        let mut app = app_with_tasks(vec![task(1, "a"), task(2, "b")]);

        app.select_next();
        assert_eq!(app.selected_task().map(|t| t.id), Some(2));
    }

    #[test]
    fn input_line_editing() {
        let mut app = app_with_tasks(Vec::new());
        assert!(app.input.is_none());

        app.open_input();
        app.input_char('h');
        app.input_char('i');
        app.input_backspace();
        assert_eq!(app.input.as_deref(), Some("h"));

        app.cancel_input();
        assert!(app.input.is_none());
    }

    #[test]
    fn input_editing_ignored_while_closed() {
        let mut app = app_with_tasks(Vec::new());
        app.input_char('x');
        app.input_backspace();
        assert!(app.input.is_none());
    }
}
