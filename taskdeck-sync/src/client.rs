use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Response, Url};
use std::time::Duration;
use taskdeck_core::{NewTask, StatusPatch, Task, TaskId, TaskStatus};
use tracing::debug;

use crate::error::SyncError;

const COLLECTION_PATH: &str = "api/tasks";

/// Thin HTTP wrapper over the `/api/tasks` collection. No state, no retries.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    collection: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let invalid = |reason: String| SyncError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };

        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a base url".to_string()));
        }
        let collection = base
            .join(COLLECTION_PATH)
            .map_err(|e| invalid(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self { http, collection })
    }

    pub fn collection_url(&self) -> &Url {
        &self.collection
    }

    /// `{collection}/{id}`, with the id percent-encoded as a single segment.
    pub fn item_url(&self, id: &TaskId) -> Result<Url, SyncError> {
        let mut url = self.collection.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::InvalidUrl {
                url: self.collection.to_string(),
                reason: "not a base url".to_string(),
            })?
            .push(id.as_str());
        Ok(url)
    }

    /// `GET /api/tasks`
    pub async fn list_tasks(&self) -> Result<Vec<Task>, SyncError> {
        let url = self.collection.clone();
        debug!(%url, "listing tasks");
        let resp = self
            .http
            .get(url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|source| transport("GET", &url, source))?;
        let resp = ensure_success("GET", &url, resp).await?;
        resp.json().await.map_err(|source| SyncError::Decode {
            method: "GET",
            url: url.to_string(),
            source,
        })
    }

    /// `POST /api/tasks`. The server's copy (with its id) is returned.
    pub async fn create_task(&self, body: &NewTask) -> Result<Task, SyncError> {
        let url = self.collection.clone();
        debug!(%url, title = %body.title, "creating task");
        let resp = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|source| transport("POST", &url, source))?;
        let resp = ensure_success("POST", &url, resp).await?;
        resp.json().await.map_err(|source| SyncError::Decode {
            method: "POST",
            url: url.to_string(),
            source,
        })
    }

    /// `PUT /api/tasks/{id}` with `{status}`. The response body is ignored.
    pub async fn set_status(&self, id: &TaskId, status: TaskStatus) -> Result<(), SyncError> {
        let url = self.item_url(id)?;
        debug!(%url, %status, "updating task status");
        let resp = self
            .http
            .put(url.clone())
            .json(&StatusPatch { status })
            .send()
            .await
            .map_err(|source| transport("PUT", &url, source))?;
        ensure_success("PUT", &url, resp).await?;
        Ok(())
    }

    /// `DELETE /api/tasks/{id}`. The response body is ignored.
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), SyncError> {
        let url = self.item_url(id)?;
        debug!(%url, "deleting task");
        let resp = self
            .http
            .delete(url.clone())
            .send()
            .await
            .map_err(|source| transport("DELETE", &url, source))?;
        ensure_success("DELETE", &url, resp).await?;
        Ok(())
    }
}

fn transport(method: &'static str, url: &Url, source: reqwest::Error) -> SyncError {
    SyncError::Transport {
        method,
        url: url.to_string(),
        source,
    }
}

async fn ensure_success(method: &'static str, url: &Url, resp: Response) -> Result<Response, SyncError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SyncError::Rejected {
        method,
        url: url.to_string(),
        status,
        body: body.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn collection_url_ignores_trailing_slash() {
        assert_eq!(client("http://localhost:5000").collection_url().as_str(), "http://localhost:5000/api/tasks");
        assert_eq!(client("http://localhost:5000/").collection_url().as_str(), "http://localhost:5000/api/tasks");
    }

    #[test]
    fn collection_url_keeps_base_path() {
        let c = client("https://example.com/todo");
        assert_eq!(c.collection_url().as_str(), "https://example.com/todo/api/tasks");
    }

    #[test]
    fn item_url_encodes_id_as_one_segment() {
        let c = client("http://localhost:5000");
        let url = c.item_url(&TaskId::new("a/b c")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/tasks/a%2Fb%20c");
    }

    #[test]
    fn rejects_garbage_base_url() {
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(1)),
            Err(SyncError::InvalidUrl { .. })
        ));
    }
}
