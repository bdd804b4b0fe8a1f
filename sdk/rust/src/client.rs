use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Course {
    pub code: String,
    pub name: String,
    pub instructor: String,
    pub semester: String,
    pub schedule: String,
    pub classroom: String,
    pub prerequisites: String,
    pub grading: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub version: String,
    pub status: String,
    pub error_count: u64,
    pub catalog_access_count: u64,
    pub required_fields: String, // "minimal" or "strict"
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Every course, in catalog order.
    pub async fn list_courses(&self) -> Result<Vec<Course>, Box<dyn std::error::Error>> {
        let resp = self.client
            .get(format!("{}/api/courses", self.base_url))
            .send()
            .await?;
        Self::decode(resp).await
    }

    /// The course with `code`, or `None` when the catalog has no such course.
    pub async fn get_course(&self, code: &str) -> Result<Option<Course>, Box<dyn std::error::Error>> {
        let mut url = reqwest::Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| format!("base URL {} cannot take a path", self.base_url))?
            .pop_if_empty()
            .extend(["api", "courses", code]);

        let resp = self.client.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::decode(resp).await.map(Some)
    }

    /// Submit a new course. Validation failures come back as errors.
    pub async fn add_course(&self, course: &Course) -> Result<Course, Box<dyn std::error::Error>> {
        let resp = self.client
            .post(format!("{}/api/courses", self.base_url))
            .json(course)
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn status(&self) -> Result<StatusReport, Box<dyn std::error::Error>> {
        let resp = self.client
            .get(format!("{}/api/status", self.base_url))
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, Box<dyn std::error::Error>> {
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(format!("Catalog returned error status {}: {}", status, message).into());
        }

        Ok(serde_json::from_str::<T>(&text)?)
    }
}
