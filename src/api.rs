use anyhow::Context;
use serde_json::Value;

use crate::app::Task;

/// HTTP client for the todo REST API.
///
/// One method per endpoint. PATCH/DELETE/POST/logout treat any HTTP response
/// as completion; only a transport failure is an error. The response bodies
/// of mutating calls are unused.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Fetch the full task collection.
    ///
    /// The server returns rows as JSON arrays `[id, label, doneFlag, ...]`.
    /// Trailing columns are ignored and rows without a numeric id are
    /// dropped.
    pub async fn fetch_tasks(&self) -> anyhow::Result<Vec<Task>> {
        let url = format!("{}/api/task", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch task list")?;

        let rows: Vec<Value> = response.json().await.context("Failed to parse task list")?;

        Ok(rows.iter().filter_map(task_from_row).collect())
    }

    /// Toggle a task's done flag server-side.
    pub async fn toggle_task(&self, id: u64) -> anyhow::Result<()> {
        let url = format!("{}/api/task/{}", self.base_url, id);
        self.client
            .patch(&url)
            .send()
            .await
            .context("Failed to send task update")?;
        Ok(())
    }

    /// Delete a task server-side.
    pub async fn delete_task(&self, id: u64) -> anyhow::Result<()> {
        let url = format!("{}/api/task/{}", self.base_url, id);
        self.client
            .delete(&url)
            .send()
            .await
            .context("Failed to send task delete")?;
        Ok(())
    }

    /// Create a task. The server takes a form field named `task` and answers
    /// with a redirect, which is ignored.
    pub async fn add_task(&self, label: &str) -> anyhow::Result<()> {
        let url = format!("{}/api/task", self.base_url);
        self.client
            .post(&url)
            .form(&[("task", label)])
            .send()
            .await
            .context("Failed to create task")?;
        Ok(())
    }

    /// End the session.
    pub async fn logout(&self) -> anyhow::Result<()> {
        let url = format!("{}/api/logout", self.base_url);
        self.client
            .get(&url)
            .send()
            .await
            .context("Failed to send logout")?;
        Ok(())
    }
}

/// Convert one server row into a `Task`. doneFlag is the integer 1 for done;
/// anything else (including absence) means not done.
fn task_from_row(row: &Value) -> Option<Task> {
    let id = row.get(0)?.as_u64()?;
    let label = row
        .get(1)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let done = row.get(2).and_then(Value::as_i64) == Some(1);
    Some(Task { id, label, done })
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;
    use serde_json::json;

    use super::*;

    #[test]
    fn row_with_trailing_columns_parses_as_triple() {
        let row = json!([7, "buy milk", 1, 42]);
        let task = task_from_row(&row).unwrap();
        assert_eq!(task.id, 7);
        assert_eq!(task.label, "buy milk");
        assert!(task.done);
    }

    #[test]
    fn done_flag_must_be_one() {
        assert!(!task_from_row(&json!([1, "a", 0])).unwrap().done);
        assert!(!task_from_row(&json!([1, "a", 2])).unwrap().done);
        assert!(!task_from_row(&json!([1, "a", true])).unwrap().done);
        assert!(!task_from_row(&json!([1, "a"])).unwrap().done);
        assert!(task_from_row(&json!([1, "a", 1])).unwrap().done);
    }

    #[test]
    fn row_without_numeric_id_is_dropped() {
        assert!(task_from_row(&json!(["x", "bad", 1])).is_none());
        assert!(task_from_row(&json!([-3, "bad", 1])).is_none());
        assert!(task_from_row(&json!([])).is_none());
    }

    #[tokio::test]
    async fn fetch_tasks_parses_server_rows() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/task");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"[[1, "write report", 0, 9], [2, "buy milk", 1, 9]]"#);
        });

        let api = ApiClient::new(&server.base_url());
        let tasks = api.fetch_tasks().await.unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, 1);
        assert!(!tasks[0].done);
        assert_eq!(tasks[1].id, 2);
        assert!(tasks[1].done);
    }

    #[tokio::test]
    async fn fetch_tasks_invalid_body_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/task");
            then.status(200).body("<html>login</html>");
        });

        let api = ApiClient::new(&server.base_url());
        let err = api.fetch_tasks().await.unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[tokio::test]
    async fn fetch_tasks_connection_failure_is_an_error() {
        let api = ApiClient::new("http://127.0.0.1:1");
        let err = api.fetch_tasks().await.unwrap_err();
        assert!(err.to_string().contains("fetch"));
    }

    #[tokio::test]
    async fn toggle_task_patches_matching_id() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(PATCH).path("/api/task/42");
            then.status(200);
        });

        let api = ApiClient::new(&server.base_url());
        api.toggle_task(42).await.unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn toggle_task_completes_on_http_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PATCH).path("/api/task/42");
            then.status(500);
        });

        let api = ApiClient::new(&server.base_url());
        assert!(api.toggle_task(42).await.is_ok());
    }

    #[tokio::test]
    async fn delete_task_deletes_matching_id() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(DELETE).path("/api/task/7");
            then.status(200);
        });

        let api = ApiClient::new(&server.base_url());
        api.delete_task(7).await.unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn add_task_posts_form_field() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/api/task")
                .header("content-type", "application/x-www-form-urlencoded")
                .body("task=buy+milk");
            then.status(200);
        });

        let api = ApiClient::new(&server.base_url());
        api.add_task("buy milk").await.unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn logout_hits_endpoint() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/api/logout");
            then.status(200);
        });

        let api = ApiClient::new(&server.base_url());
        api.logout().await.unwrap();
        m.assert();
    }
}
