use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use quiz_core::model::Question;

use crate::error::FetchError;

/// Name of the question resource under the content base URL.
pub const QUESTIONS_RESOURCE: &str = "questions.json";

/// Read-only supplier of the question deck. One fetch per call, no caching.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `FetchError` if the deck cannot be fetched or fails validation.
    async fn load(&self) -> Result<Vec<Question>, FetchError>;
}

/// Parses and validates a JSON array of question records.
///
/// # Errors
///
/// Returns `FetchError::Parse` for malformed JSON or an invalid question.
pub fn parse_questions(json: &str) -> Result<Vec<Question>, FetchError> {
    Ok(serde_json::from_str(json)?)
}

/// Fetches `{base}/questions.json` over HTTP.
#[derive(Clone)]
pub struct HttpQuestionSource {
    client: Client,
    url: Url,
}

impl HttpQuestionSource {
    /// # Errors
    ///
    /// Returns `FetchError::Url` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_client(Client::new(), base_url)
    }

    /// # Errors
    ///
    /// Returns `FetchError::Url` if `base_url` is not an absolute URL.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, FetchError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let url = base.join(QUESTIONS_RESOURCE)?;
        Ok(Self { client, url })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    async fn load(&self) -> Result<Vec<Question>, FetchError> {
        let response = self.client.get(self.url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status()));
        }
        let body = response.text().await?;
        let questions = parse_questions(&body)?;
        tracing::debug!(url = %self.url, count = questions.len(), "questions fetched");
        Ok(questions)
    }
}

/// Reads the question deck from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileQuestionSource {
    path: PathBuf,
}

impl FileQuestionSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuestionSource for FileQuestionSource {
    async fn load(&self) -> Result<Vec<Question>, FetchError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.clone(),
                source,
            })?;
        let questions = parse_questions(&body)?;
        tracing::debug!(path = %self.path.display(), count = questions.len(), "questions loaded");
        Ok(questions)
    }
}

/// Fixed in-memory deck, mainly for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticQuestionSource {
    questions: Vec<Question>,
}

impl StaticQuestionSource {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

#[async_trait]
impl QuestionSource for StaticQuestionSource {
    async fn load(&self) -> Result<Vec<Question>, FetchError> {
        Ok(self.questions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_resource_onto_base_path() {
        let source = HttpQuestionSource::new("https://example.com/static").unwrap();
        assert_eq!(source.url().as_str(), "https://example.com/static/questions.json");

        let source = HttpQuestionSource::new("https://example.com/").unwrap();
        assert_eq!(source.url().as_str(), "https://example.com/questions.json");
    }

    #[test]
    fn relative_base_is_rejected() {
        assert!(matches!(
            HttpQuestionSource::new("static/"),
            Err(FetchError::Url(_))
        ));
    }

    #[test]
    fn parse_rejects_invalid_question() {
        let json = r#"[{"id": 1, "question": "Q?", "options": ["A", "B"], "answer": "Z"}]"#;
        assert!(matches!(parse_questions(json), Err(FetchError::Parse(_))));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let source = FileQuestionSource::new("/definitely/not/here/questions.json");
        assert!(matches!(source.load().await, Err(FetchError::Io { .. })));
    }
}
