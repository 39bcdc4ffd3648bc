//! Blocking HTTP implementation of [`RemoteClient`].
//!
//! Endpoints (relative to the configured host):
//!
//! ```text
//! POST /api/auth/login                  {email, password} -> {token}
//! GET  /api/invites                     -> {invites: [...]}
//! POST /api/invites/<id>/accept
//! GET  /api/projects                    -> {projects: [...]}
//! GET  /api/projects/<id>/download/zip  -> application/zip
//! POST /api/auth/logout
//! ```
//!
//! The bearer token lives in [`HttpSession`]; the client itself is stateless.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use leafsync_core::{
    ArchiveStream, Invite, InviteId, Project, ProjectId, RemoteClient, RemoteError,
};

const TIMEOUT: Duration = Duration::from_secs(120);

pub struct HttpClient {
    host: String,
    agent: ureq::Agent,
}

/// Authenticated session returned by [`HttpClient::authenticate`].
#[derive(Debug)]
pub struct HttpSession {
    token: String,
}

impl HttpClient {
    pub fn new(host: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(TIMEOUT)
            .user_agent(concat!("leafsync/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            host: host.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    fn get(&self, session: &HttpSession, path: &str) -> Result<ureq::Response, RemoteError> {
        let url = self.url(path);
        self.agent
            .get(&url)
            .set("Authorization", &bearer(session))
            .call()
            .map_err(|e| request_error(&url, e))
    }

    fn post(&self, session: &HttpSession, path: &str) -> Result<ureq::Response, RemoteError> {
        let url = self.url(path);
        self.agent
            .post(&url)
            .set("Authorization", &bearer(session))
            .call()
            .map_err(|e| request_error(&url, e))
    }
}

impl RemoteClient for HttpClient {
    type Session = HttpSession;

    fn authenticate(&self, email: &str, password: &str) -> Result<HttpSession, RemoteError> {
        let url = self.url("/api/auth/login");
        let response = self
            .agent
            .post(&url)
            .send_json(json!({ "email": email, "password": password }))
            .map_err(|e| login_error(&url, e))?;
        let body: LoginResponse = decode(&url, response)?;
        Ok(HttpSession { token: body.token })
    }

    fn list_invites(&self, session: &HttpSession) -> Result<Vec<Invite>, RemoteError> {
        let path = "/api/invites";
        let body: InviteList = decode(&self.url(path), self.get(session, path)?)?;
        Ok(body.invites.into_iter().map(Into::into).collect())
    }

    fn accept_invite(&self, session: &HttpSession, invite: &Invite) -> Result<(), RemoteError> {
        self.post(session, &format!("/api/invites/{}/accept", invite.id))?;
        Ok(())
    }

    fn list_projects(&self, session: &HttpSession) -> Result<Vec<Project>, RemoteError> {
        let path = "/api/projects";
        let body: ProjectList = decode(&self.url(path), self.get(session, path)?)?;
        Ok(body.projects.into_iter().map(Into::into).collect())
    }

    fn download_project_archive(
        &self,
        session: &HttpSession,
        project: &Project,
    ) -> Result<ArchiveStream, RemoteError> {
        let response = self.get(session, &format!("/api/projects/{}/download/zip", project.id))?;
        Ok(Box::new(response.into_reader()))
    }

    fn end_session(&self, session: HttpSession) -> Result<(), RemoteError> {
        self.post(&session, "/api/auth/logout")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ProjectList {
    projects: Vec<ProjectDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectDto {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    name: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    trashed: bool,
}

impl From<ProjectDto> for Project {
    fn from(dto: ProjectDto) -> Self {
        Project {
            id: ProjectId(dto.id),
            name: dto.name,
            tags: dto.tags.into_iter().collect(),
            last_updated: dto.last_updated,
            archived: dto.archived,
            trashed: dto.trashed,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InviteList {
    invites: Vec<InviteDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InviteDto {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    project_name: String,
}

impl From<InviteDto> for Invite {
    fn from(dto: InviteDto) -> Self {
        Invite {
            id: InviteId(dto.id),
            project_name: dto.project_name,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn bearer(session: &HttpSession) -> String {
    format!("Bearer {}", session.token)
}

fn decode<T: serde::de::DeserializeOwned>(
    url: &str,
    response: ureq::Response,
) -> Result<T, RemoteError> {
    response.into_json().map_err(|e| RemoteError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn request_error(url: &str, err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::Status(status, _) => RemoteError::Status {
            url: url.to_string(),
            status,
        },
        ureq::Error::Transport(t) => RemoteError::Transport {
            url: url.to_string(),
            message: t.to_string(),
        },
    }
}

/// Like [`request_error`], but rejected credentials become
/// [`RemoteError::Authentication`].
fn login_error(url: &str, err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::Status(status @ (400 | 401 | 403), _) => RemoteError::Authentication {
            message: format!("login rejected with HTTP {status}"),
        },
        other => match request_error(url, other) {
            RemoteError::Status { status, .. } => RemoteError::Authentication {
                message: format!("login failed with HTTP {status}"),
            },
            RemoteError::Transport { message, .. } => RemoteError::Authentication { message },
            err => err,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_trailing_slash_is_trimmed() {
        let client = HttpClient::new("https://latex.example.org/");
        assert_eq!(
            client.url("/api/projects"),
            "https://latex.example.org/api/projects"
        );
    }

    #[test]
    fn project_list_decodes_service_shape() {
        let body = r#"{
            "projects": [
                {"_id": "64a1", "name": "Thesis", "tags": ["phd"],
                 "lastUpdated": "2024-03-01T12:00:00Z", "archived": false, "trashed": false},
                {"id": "77", "name": "Bare"}
            ]
        }"#;
        let list: ProjectList = serde_json::from_str(body).expect("decode");
        let projects: Vec<Project> = list.projects.into_iter().map(Into::into).collect();

        assert_eq!(projects[0].id, ProjectId::from("64a1"));
        assert!(projects[0].tags.contains("phd"));
        assert!(projects[0].last_updated.is_some());
        assert_eq!(projects[1].id, ProjectId::from("77"));
        assert!(projects[1].last_updated.is_none());
        assert!(projects[1].is_live());
    }

    #[test]
    fn invite_list_decodes() {
        let body = r#"{"invites": [{"_id": "i1", "projectName": "Shared Paper"}]}"#;
        let list: InviteList = serde_json::from_str(body).expect("decode");
        let invite: Invite = list.invites.into_iter().next().expect("one").into();
        assert_eq!(invite.id, InviteId::from("i1"));
        assert_eq!(invite.project_name, "Shared Paper");
    }

    #[test]
    fn rejected_login_is_authentication_error() {
        let response = ureq::Response::new(401, "Unauthorized", "").expect("response");
        let err = login_error("https://h/api/auth/login", ureq::Error::Status(401, response));
        assert!(matches!(err, RemoteError::Authentication { .. }));
    }

    #[test]
    fn other_status_keeps_url_and_code() {
        let response = ureq::Response::new(503, "Unavailable", "").expect("response");
        let err = request_error("https://h/api/projects", ureq::Error::Status(503, response));
        match err {
            RemoteError::Status { url, status } => {
                assert_eq!(url, "https://h/api/projects");
                assert_eq!(status, 503);
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
