//! HTTP client for the quiz server.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::instrument;

use kjappe_core::datekey::canonical_key;
use kjappe_core::model::{DailySummary, QuizData, Submission, SubmissionAck, WeeklySummary};
use kjappe_core::traits::{QuestionSource, SubmissionSink, SummarySource};

use crate::error::ClientError;

/// Talks to the quiz server's `/api` routes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClientError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn map_send_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            ClientError::Network(format!("quiz server not reachable at {}", self.base_url))
        } else {
            ClientError::Network(e.to_string())
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, message });
        }
        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(
        response: reqwest::Response,
        endpoint: &str,
    ) -> Result<T, ClientError> {
        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response).await?;
        Self::parse(response, path).await
    }
}

#[async_trait]
impl QuestionSource for ApiClient {
    fn name(&self) -> &str {
        "api"
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn quiz(&self, date: NaiveDate) -> anyhow::Result<Option<QuizData>> {
        let path = format!("/api/questions?date={}", canonical_key(date));
        let response = self
            .client
            .get(self.url(&path))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if response.status().as_u16() == 404 {
            tracing::debug!("no quiz on the server for {date}");
            return Ok(None);
        }
        let response = Self::check_status(response).await?;
        Ok(Some(Self::parse(response, "/api/questions").await?))
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn available_dates(&self) -> anyhow::Result<Vec<String>> {
        let mut dates: Vec<String> = self.get_json("/api/available-dates").await?;
        dates.sort();
        Ok(dates)
    }
}

#[async_trait]
impl SubmissionSink for ApiClient {
    #[instrument(skip_all, fields(number_of_correct = submission.number_of_correct))]
    async fn submit(&self, submission: &Submission) -> anyhow::Result<SubmissionAck> {
        let response = self
            .client
            .post(self.url("/api/submit"))
            .json(submission)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response).await?;
        Ok(Self::parse(response, "/api/submit").await?)
    }
}

#[async_trait]
impl SummarySource for ApiClient {
    #[instrument(skip(self))]
    async fn daily_summary(&self) -> anyhow::Result<DailySummary> {
        Ok(self.get_json("/api/summary").await?)
    }

    #[instrument(skip(self))]
    async fn weekly_summary(&self) -> anyhow::Result<WeeklySummary> {
        Ok(self.get_json("/api/weeklySummary").await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), 5).unwrap()
    }

    #[tokio::test]
    async fn fetches_quiz_by_canonical_key() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "theme": "Geografi",
            "questions": [
                {"question": "Capital of Norway?", "answer": "Oslo", "aliases": ["Christiania"]}
            ]
        });

        Mock::given(method("GET"))
            .and(path("/api/questions"))
            .and(query_param("date", "20240307"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let quiz = client(&server)
            .await
            .quiz(date(2024, 3, 7))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz.theme.as_deref(), Some("Geografi"));
        assert_eq!(quiz.questions[0].aliases, vec!["Christiania"]);
    }

    #[tokio::test]
    async fn bare_question_array_is_accepted() {
        let server = MockServer::start().await;

        let body = serde_json::json!([
            {"question": "Q1", "answer": "A1"},
            {"question": "Q2", "answer": "A2"}
        ]);

        Mock::given(method("GET"))
            .and(path("/api/questions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let quiz = client(&server)
            .await
            .quiz(date(2024, 3, 7))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(quiz.len(), 2);
        assert!(quiz.theme.is_none());
    }

    #[tokio::test]
    async fn missing_quiz_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/questions"))
            .respond_with(ResponseTemplate::new(404).set_body_json(
                serde_json::json!({"message": "Questions for this date are not available."}),
            ))
            .mount(&server)
            .await;

        let quiz = client(&server).await.quiz(date(2024, 3, 7)).await.unwrap();
        assert!(quiz.is_none());
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/questions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .quiz(date(2024, 3, 7))
            .await
            .unwrap_err();
        let client_err = err.downcast_ref::<ClientError>().unwrap();
        assert!(matches!(client_err, ClientError::Status { status: 500, .. }));
        assert!(client_err.is_transient());
    }

    #[tokio::test]
    async fn available_dates_sorted() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/available-dates"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!(["20240308", "20240301"])),
            )
            .mount(&server)
            .await;

        let dates = client(&server).await.available_dates().await.unwrap();
        assert_eq!(dates, vec!["20240301", "20240308"]);
    }

    #[tokio::test]
    async fn submit_posts_camel_case_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/submit"))
            .and(body_json(serde_json::json!({
                "answers": ["Mozart", "Oslo"],
                "numberOfCorrect": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "abc123",
                "message": "Submission stored successfully."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ack = client(&server)
            .await
            .submit(&Submission {
                answers: vec!["Mozart".into(), "Oslo".into()],
                number_of_correct: 2,
            })
            .await
            .unwrap();
        assert_eq!(ack.id.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn summaries() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/summary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "averageCorrect": "0.64",
                "totalSubmissions": 25
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/weeklySummary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "weeklyAverage": 0.58,
                "totalSubmissions": 120,
                "dailyAverageStats": {"2024-03-04": 2.5, "2024-03-05": 3.1},
                "startDate": "2024-03-04",
                "endDate": "2024-03-08"
            })))
            .mount(&server)
            .await;

        let api = client(&server).await;
        let daily = api.daily_summary().await.unwrap();
        assert_eq!(daily.average_correct, 0.64);
        assert_eq!(daily.total_submissions, Some(25));

        let weekly = api.weekly_summary().await.unwrap();
        assert_eq!(weekly.total_submissions, 120);
        assert_eq!(weekly.daily_average_stats["2024-03-05"], 3.1);
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/weeklySummary"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server).await.weekly_summary().await.unwrap_err();
        assert!(err.to_string().contains("invalid response from /api/weeklySummary"));
    }

    #[tokio::test]
    async fn unreachable_server() {
        let api = ApiClient::new("http://127.0.0.1:1", 2).unwrap();
        let err = api.daily_summary().await.unwrap_err();
        assert!(err.downcast_ref::<ClientError>().unwrap().is_transient());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = ApiClient::new("https://quiz.example/", 5).unwrap();
        assert_eq!(api.base_url(), "https://quiz.example");
        assert_eq!(api.url("/api/summary"), "https://quiz.example/api/summary");
    }
}
