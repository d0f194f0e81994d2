//! Thin client for the LeetCode GraphQL API.
//!
//! Queries are trimmed to the fields the sync engine consumes. One client is
//! constructed per process and shared across all sync activity.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use leettrack_config::MAX_FETCH_LIMIT;
use leettrack_domain::{Difficulty, LeetCodeHandle, SubmissionRecord};

const GRAPHQL_URL: &str = "https://leetcode.com/graphql";

// LeetCode rejects requests without a browser-style agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const RECENT_AC_SUBMISSIONS_QUERY: &str = r#"
query recentAcSubmissions($username: String!, $limit: Int!) {
    recentAcSubmissionList(username: $username, limit: $limit) {
        id
        title
        titleSlug
        timestamp
        lang
    }
}"#;

const PROBLEM_DIFFICULTY_QUERY: &str = r#"
query problemDifficulty($titleSlug: String!) {
    question(titleSlug: $titleSlug) {
        difficulty
    }
}"#;

const MATCHED_USER_QUERY: &str = r#"
query matchedUser($username: String!) {
    matchedUser(username: $username) {
        username
    }
}"#;

/// Errors surfaced by the LeetCode client. A GraphQL `errors` list inside an
/// otherwise-200 response is an error like any other.
#[derive(Debug, Error)]
pub enum LeetCodeClientError {
    #[error("LeetCode request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LeetCode GraphQL error: {0}")]
    Api(String),
}

/// Boundary for the external problem platform.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeetCodeApi: Send + Sync {
    /// Fetches a user's most recent accepted submissions, newest first.
    /// `limit` is clamped to 1..=100 to respect upstream rate limits.
    async fn recent_accepted_submissions(
        &self,
        handle: &LeetCodeHandle,
        limit: u32,
    ) -> Result<Vec<SubmissionRecord>, LeetCodeClientError>;

    /// Resolves a problem's difficulty by its title slug.
    async fn problem_difficulty(&self, slug: &str) -> Result<Difficulty, LeetCodeClientError>;

    /// Checks whether a username exists on the platform.
    async fn handle_exists(&self, handle: &LeetCodeHandle)
    -> Result<bool, LeetCodeClientError>;
}

/// Production [`LeetCodeApi`] implementation over reqwest.
#[derive(Clone)]
pub struct LeetCodeGraphqlClient {
    client: Client,
}

impl LeetCodeGraphqlClient {
    /// Builds the shared HTTP session with a bounded per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, LeetCodeClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, LeetCodeClientError> {
        let response = self
            .client
            .post(GRAPHQL_URL)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?
            .error_for_status()?;

        let body: GraphqlResponse<T> = response.json().await?;
        if !body.errors.is_empty() {
            let messages = body
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(LeetCodeClientError::Api(messages));
        }

        body.data
            .ok_or_else(|| LeetCodeClientError::Api("response carried no data".to_string()))
    }
}

#[async_trait]
impl LeetCodeApi for LeetCodeGraphqlClient {
    async fn recent_accepted_submissions(
        &self,
        handle: &LeetCodeHandle,
        limit: u32,
    ) -> Result<Vec<SubmissionRecord>, LeetCodeClientError> {
        let limit = limit.clamp(1, MAX_FETCH_LIMIT);
        let data: RecentAcSubmissionsData = self
            .execute(
                RECENT_AC_SUBMISSIONS_QUERY,
                json!({ "username": handle.as_str(), "limit": limit }),
            )
            .await?;

        Ok(data
            .recent_ac_submission_list
            .unwrap_or_default()
            .into_iter()
            .map(RawSubmission::into_record)
            .collect())
    }

    async fn problem_difficulty(&self, slug: &str) -> Result<Difficulty, LeetCodeClientError> {
        let data: QuestionData = self
            .execute(PROBLEM_DIFFICULTY_QUERY, json!({ "titleSlug": slug }))
            .await?;

        Ok(data
            .question
            .and_then(|q| q.difficulty)
            .map(|d| Difficulty::from_api(&d))
            .unwrap_or_default())
    }

    async fn handle_exists(
        &self,
        handle: &LeetCodeHandle,
    ) -> Result<bool, LeetCodeClientError> {
        let data: MatchedUserData = self
            .execute(MATCHED_USER_QUERY, json!({ "username": handle.as_str() }))
            .await?;

        Ok(data
            .matched_user
            .is_some_and(|user| !user.username.trim().is_empty()))
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentAcSubmissionsData {
    recent_ac_submission_list: Option<Vec<RawSubmission>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubmission {
    #[serde(default)]
    id: Option<String>,
    title: String,
    title_slug: String,
    // The API serializes this as a string; tolerate a bare number too.
    #[serde(deserialize_with = "string_or_number")]
    timestamp: String,
    #[serde(default)]
    lang: Option<String>,
}

impl RawSubmission {
    fn into_record(self) -> SubmissionRecord {
        SubmissionRecord {
            submission_id: self.id,
            title: self.title,
            title_slug: self.title_slug,
            timestamp: self.timestamp,
            lang: self.lang,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuestionData {
    question: Option<QuestionNode>,
}

#[derive(Debug, Deserialize)]
struct QuestionNode {
    #[serde(default)]
    difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchedUserData {
    matched_user: Option<MatchedUserNode>,
}

#[derive(Debug, Deserialize)]
struct MatchedUserNode {
    username: String,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(value) => value,
        StringOrNumber::Number(value) => value.to_string(),
    })
}
