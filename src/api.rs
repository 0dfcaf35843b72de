use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::types::{
    Contest, JoinRequest, JoinResponse, Language, LeaderboardEntry, Problem, Submission,
    SubmissionRequest, SubmissionResponse, User,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The resource does not exist on the backend; not retried.
    #[error("not found: {0}")]
    NotFound(String),
    /// The backend refused the request; its message is passed through verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("unreadable response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Everything the client asks of the contest backend. Components take this
/// as a trait object so tests can substitute a scripted backend.
#[async_trait]
pub trait ContestApi: Send + Sync {
    async fn submit(&self, request: &SubmissionRequest) -> ApiResult<SubmissionResponse>;
    async fn submission(&self, submission_id: &str) -> ApiResult<Submission>;
    async fn user_contest_submissions(
        &self,
        user_id: i64,
        contest_id: i64,
    ) -> ApiResult<Vec<Submission>>;
    async fn supported_languages(&self) -> ApiResult<Vec<Language>>;

    async fn join_contest(&self, request: &JoinRequest) -> ApiResult<JoinResponse>;
    async fn is_participant(&self, contest_id: i64, user_id: i64) -> ApiResult<bool>;
    async fn leaderboard(&self, contest_id: i64) -> ApiResult<Vec<LeaderboardEntry>>;

    async fn contests(&self) -> ApiResult<Vec<Contest>>;
    async fn contest(&self, contest_id: i64) -> ApiResult<Contest>;
    async fn problem(&self, problem_id: i64) -> ApiResult<Problem>;
    async fn check_user(&self, username: &str) -> ApiResult<User>;
}

fn default_headers() -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    [
        ("Accept", header::HeaderValue::from_static("application/json")),
        ("Connection", header::HeaderValue::from_static("keep-alive")),
    ]
    .into_iter()
    .for_each(|(k, v)| {
        headers.insert(k, v);
    });
    headers
}

/// REST client for the contest backend.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: std::time::Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .default_headers(default_headers())
                .build()?,
            base_url: base_url.to_string(),
        })
    }

    pub fn get_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            return path.into();
        }
        let mut url = self.base_url.clone();
        if !url.ends_with('/') {
            url.push('/');
        }
        url.push_str(path.strip_prefix('/').unwrap_or(path));
        url
    }

    async fn read<T: DeserializeOwned>(path: &str, resp: reqwest::Response) -> ApiResult<T> {
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                format!("request to {} failed with status {}", path, status)
            } else {
                body
            };
            return Err(ApiError::Rejected(message));
        }
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let resp = self.client.get(self.get_url(path)).send().await?;
        Self::read(path, resp).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let resp = self.client.post(self.get_url(path)).json(body).send().await?;
        Self::read(path, resp).await
    }
}

#[async_trait]
impl ContestApi for HttpApi {
    async fn submit(&self, request: &SubmissionRequest) -> ApiResult<SubmissionResponse> {
        self.post("submissions", request).await
    }

    async fn submission(&self, submission_id: &str) -> ApiResult<Submission> {
        self.get(&format!("submissions/{submission_id}")).await
    }

    async fn user_contest_submissions(
        &self,
        user_id: i64,
        contest_id: i64,
    ) -> ApiResult<Vec<Submission>> {
        self.get(&format!("submissions/user/{user_id}/contest/{contest_id}"))
            .await
    }

    async fn supported_languages(&self) -> ApiResult<Vec<Language>> {
        self.get("submissions/languages").await
    }

    async fn join_contest(&self, request: &JoinRequest) -> ApiResult<JoinResponse> {
        self.post("contests/join", request).await
    }

    async fn is_participant(&self, contest_id: i64, user_id: i64) -> ApiResult<bool> {
        self.get(&format!("contests/{contest_id}/participants/{user_id}"))
            .await
    }

    async fn leaderboard(&self, contest_id: i64) -> ApiResult<Vec<LeaderboardEntry>> {
        self.get(&format!("contests/{contest_id}/leaderboard")).await
    }

    async fn contests(&self) -> ApiResult<Vec<Contest>> {
        self.get("contests").await
    }

    async fn contest(&self, contest_id: i64) -> ApiResult<Contest> {
        self.get(&format!("contests/{contest_id}")).await
    }

    async fn problem(&self, problem_id: i64) -> ApiResult<Problem> {
        self.get(&format!("problems/{problem_id}")).await
    }

    async fn check_user(&self, username: &str) -> ApiResult<User> {
        self.get(&format!("users/check/{username}")).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn url_joining() {
        let api = HttpApi::new("http://localhost:8080/api", Duration::from_secs(10)).unwrap();
        assert_eq!(api.get_url("contests"), "http://localhost:8080/api/contests");
        assert_eq!(
            api.get_url("/submissions/abc"),
            "http://localhost:8080/api/submissions/abc"
        );
        assert_eq!(api.get_url("http://other/x"), "http://other/x");

        let api = HttpApi::new("http://localhost:8080/api/", Duration::from_secs(10)).unwrap();
        assert_eq!(api.get_url("contests"), "http://localhost:8080/api/contests");
    }

    #[test]
    fn rejected_error_passes_message_through() {
        let err = ApiError::Rejected("Contest is not active".into());
        assert_eq!(err.to_string(), "Contest is not active");
    }

    fn response_with(status: u16, body: &str) -> reqwest::Response {
        http::Response::builder()
            .status(status)
            .body(body.to_string())
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn missing_resource_maps_to_not_found() {
        let err = HttpApi::read::<Submission>("submissions/x", response_with(404, ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(path) if path == "submissions/x"));
    }

    #[tokio::test]
    async fn rejection_body_is_surfaced_verbatim() {
        let err = HttpApi::read::<JoinResponse>(
            "contests/join",
            response_with(409, "Contest is not active"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Rejected(msg) if msg == "Contest is not active"));
    }

    #[tokio::test]
    async fn empty_rejection_body_gets_a_synthesized_message() {
        let err = HttpApi::read::<JoinResponse>("contests/join", response_with(409, ""))
            .await
            .unwrap_err();
        match err {
            ApiError::Rejected(msg) => {
                assert!(msg.contains("contests/join"));
                assert!(msg.contains("409"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparseable_success_body_maps_to_decode() {
        let err = HttpApi::read::<Submission>("submissions/x", response_with(200, "<html>"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
