//! HTTP client for a running teamgrid server.
//!
//! [`HttpGateway`] is the grid controller's production gateway and also
//! carries the admin calls the CLI needs (users, projects, members, sprints).

use crate::controller::AvailabilityGateway;
use crate::error::{GridError, Result};
use crate::event::{BroadcastEvent, FrameDecoder};
use crate::member::{NewUser, User};
use crate::project::{NewProject, Project, ProjectDetail, ProjectPatch};
use crate::record::{AvailabilityRecord, AvailabilityWrite, CellPosition};
use crate::types::Status;
use chrono::NaiveDate;
use futures::{Stream, StreamExt};
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberBody<'a> {
    user_id: &'a str,
}

#[derive(Serialize)]
struct SprintBody {
    date: String,
}

#[derive(Clone)]
pub struct HttpGateway {
    base_url: String,
    client: Client,
}

impl HttpGateway {
    /// `base_url` is the server origin, e.g. `http://127.0.0.1:7878`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send and decode a JSON response, turning `{ "error": ... }` bodies
    /// into [`GridError::Api`].
    async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
        let resp = checked(req.send().await?).await?;
        Ok(resp.json().await?)
    }

    // ---------------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------------

    pub async fn list_users(&self) -> Result<Vec<User>> {
        Self::send(self.client.get(self.url("/api/users"))).await
    }

    pub async fn create_user(&self, body: &NewUser) -> Result<User> {
        Self::send(self.client.post(self.url("/api/users")).json(body)).await
    }

    // ---------------------------------------------------------------------------
    // Projects
    // ---------------------------------------------------------------------------

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        Self::send(self.client.get(self.url("/api/projects"))).await
    }

    pub async fn create_project(&self, body: &NewProject) -> Result<Project> {
        Self::send(self.client.post(self.url("/api/projects")).json(body)).await
    }

    pub async fn get_project(&self, id: &str) -> Result<ProjectDetail> {
        Self::send(self.client.get(self.url(&format!("/api/projects/{id}")))).await
    }

    pub async fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<Project> {
        Self::send(
            self.client
                .patch(self.url(&format!("/api/projects/{id}")))
                .json(patch),
        )
        .await
    }

    pub async fn add_member(&self, project_id: &str, user_id: &str) -> Result<ProjectDetail> {
        Self::send(
            self.client
                .post(self.url(&format!("/api/projects/{project_id}/members")))
                .json(&MemberBody { user_id }),
        )
        .await
    }

    pub async fn remove_member(&self, project_id: &str, user_id: &str) -> Result<ProjectDetail> {
        Self::send(
            self.client
                .delete(self.url(&format!("/api/projects/{project_id}/members/{user_id}"))),
        )
        .await
    }

    pub async fn list_sprints(&self, project_id: &str) -> Result<Vec<NaiveDate>> {
        Self::send(
            self.client
                .get(self.url(&format!("/api/projects/{project_id}/sprints"))),
        )
        .await
    }

    pub async fn add_sprint(&self, project_id: &str, start: NaiveDate) -> Result<Vec<NaiveDate>> {
        Self::send(
            self.client
                .post(self.url(&format!("/api/projects/{project_id}/sprints")))
                .json(&SprintBody {
                    date: start.format("%Y-%m-%d").to_string(),
                }),
        )
        .await
    }

    pub async fn remove_sprint(
        &self,
        project_id: &str,
        start: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        Self::send(
            self.client
                .delete(self.url(&format!("/api/projects/{project_id}/sprints")))
                .query(&[("date", start.format("%Y-%m-%d").to_string())]),
        )
        .await
    }

    // ---------------------------------------------------------------------------
    // Live updates
    // ---------------------------------------------------------------------------

    /// Subscribe to the broadcast stream. The stream ends when the server
    /// closes the connection.
    pub async fn events(&self) -> Result<impl Stream<Item = Result<BroadcastEvent>> + Send + 'static> {
        let resp = self
            .client
            .get(self.url("/api/availability-updates"))
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;
        let resp = checked(resp).await?;
        let mut decoder = FrameDecoder::new();
        Ok(resp.bytes_stream().flat_map(move |chunk| {
            let items = match chunk {
                Ok(bytes) => decoder.push(&bytes[..]),
                Err(e) => vec![Err(GridError::from(e))],
            };
            futures::stream::iter(items)
        }))
    }
}

async fn checked(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|b| b.error)
        .unwrap_or(text);
    Err(GridError::Api {
        status: status.as_u16(),
        message,
    })
}

impl AvailabilityGateway for HttpGateway {
    async fn fetch(&self, project_id: &str) -> Result<Vec<AvailabilityRecord>> {
        Self::send(
            self.client
                .get(self.url("/api/availability"))
                .query(&[("projectId", project_id)]),
        )
        .await
    }

    async fn upsert(&self, cell: &CellPosition, status: Status) -> Result<AvailabilityRecord> {
        let body = AvailabilityWrite::new(cell, status);
        Self::send(self.client.post(self.url("/api/availability")).json(&body)).await
    }

    async fn publish(&self, event: &BroadcastEvent) -> Result<()> {
        let resp = self
            .client
            .post(self.url("/api/availability-updates"))
            .json(event)
            .send()
            .await?;
        checked(resp).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DayPart;
    use mockito::Matcher;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn fetch_queries_by_project() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/availability")
            .match_query(Matcher::UrlEncoded("projectId".into(), "apollo".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"id":"r1","userId":"alice","date":"2024-01-08","dayPart":"MORNING","status":"FREE"}]"#,
            )
            .create_async()
            .await;

        let gw = HttpGateway::new(server.url());
        let records = gw.fetch("apollo").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_deref(), Some("r1"));
        assert_eq!(records[0].status, Status::Free);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upsert_sends_wire_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/availability")
            .match_body(Matcher::Json(serde_json::json!({
                "userId": "alice",
                "date": "2024-01-05",
                "dayPart": "AFTERNOON",
                "status": "NOT_WORKING",
            })))
            .with_status(200)
            .with_body(
                r#"{"id":"r9","userId":"alice","date":"2024-01-05","dayPart":"AFTERNOON","status":"NOT_WORKING"}"#,
            )
            .create_async()
            .await;

        let gw = HttpGateway::new(format!("{}/", server.url()));
        let cell = CellPosition::new("alice", d("2024-01-05"), DayPart::Afternoon);
        let record = gw.upsert(&cell, Status::NotWorking).await.unwrap();
        assert!(record.is_at(&cell));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_body_becomes_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/projects/zeus")
            .with_status(404)
            .with_body(r#"{"error":"project not found: zeus"}"#)
            .create_async()
            .await;

        let gw = HttpGateway::new(server.url());
        match gw.get_project("zeus").await {
            Err(GridError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "project not found: zeus");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn publish_posts_event() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/availability-updates")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "projectId": "apollo",
                "status": "FREE",
            })))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let gw = HttpGateway::new(server.url());
        let event = BroadcastEvent {
            project_id: "apollo".into(),
            user_id: "alice".into(),
            date: d("2024-01-05"),
            day_part: DayPart::Morning,
            status: Status::Free,
        };
        gw.publish(&event).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn events_decode_stream_body() {
        let mut server = mockito::Server::new_async().await;
        let body = concat!(
            ": keep-alive\n\n",
            "data: {\"projectId\":\"apollo\",\"userId\":\"alice\",\"date\":\"2024-01-05\",",
            "\"dayPart\":\"MORNING\",\"status\":\"FREE\"}\n\n",
        );
        server
            .mock("GET", "/api/availability-updates")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let gw = HttpGateway::new(server.url());
        let events: Vec<_> = gw.events().await.unwrap().collect().await;
        assert_eq!(events.len(), 1);
        let event = events[0].as_ref().unwrap();
        assert_eq!(event.project_id, "apollo");
        assert_eq!(event.day_part, DayPart::Morning);
    }
}
