//! PostgREST-backed implementation of [`PresentationStore`].

use crate::artifact::{NewPresentation, NewSlide, Presentation, PresentationPatch, SlideRow};
use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::store::PresentationStore;
use async_trait::async_trait;

/// Talks to the backend's `/rest/v1/` tables with apikey + bearer auth.
///
/// Writes ask for `return=representation` so assigned ids come back in the
/// same round trip.
#[derive(Debug, Clone)]
pub struct PostgrestStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PostgrestStore {
    /// Creates a store client for the given backend.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Creates a store client from a pipeline configuration.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.base_url.clone(), config.api_key.clone())
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, PipelineError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(PipelineError::Persistence {
            message: format!("HTTP {}: {}", status.as_u16(), body),
        })
    }
}

fn persistence_error(err: impl std::fmt::Display) -> PipelineError {
    PipelineError::Persistence {
        message: err.to_string(),
    }
}

#[async_trait]
impl PresentationStore for PostgrestStore {
    async fn create_presentation(
        &self,
        new: NewPresentation,
    ) -> Result<Presentation, PipelineError> {
        let response = self
            .request(self.http.post(self.table_url("presentations")))
            .header("Prefer", "return=representation")
            .json(&new)
            .send()
            .await
            .map_err(persistence_error)?;
        let rows: Vec<Presentation> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(persistence_error)?;
        rows.into_iter().next().ok_or_else(|| {
            persistence_error("la inserción no devolvió ninguna fila")
        })
    }

    async fn insert_slides(&self, rows: Vec<NewSlide>) -> Result<Vec<SlideRow>, PipelineError> {
        let response = self
            .request(self.http.post(self.table_url("slides")))
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await
            .map_err(persistence_error)?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(persistence_error)
    }

    async fn update_presentation(
        &self,
        id: &str,
        patch: PresentationPatch,
    ) -> Result<(), PipelineError> {
        let response = self
            .request(self.http.patch(self.table_url("presentations")))
            .query(&[("id", format!("eq.{id}"))])
            .json(&patch)
            .send()
            .await
            .map_err(persistence_error)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn get_presentation(&self, id: &str) -> Result<Option<Presentation>, PipelineError> {
        let response = self
            .request(self.http.get(self.table_url("presentations")))
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_string())])
            .send()
            .await
            .map_err(persistence_error)?;
        let rows: Vec<Presentation> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(persistence_error)?;
        Ok(rows.into_iter().next())
    }

    async fn get_slides(&self, presentation_id: &str) -> Result<Vec<SlideRow>, PipelineError> {
        let response = self
            .request(self.http.get(self.table_url("slides")))
            .query(&[
                ("presentation_id", format!("eq.{presentation_id}")),
                ("select", "*".to_string()),
                ("order", "slide_number.asc".to_string()),
            ])
            .send()
            .await
            .map_err(persistence_error)?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(persistence_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_urls_tolerate_trailing_slash() {
        let store = PostgrestStore::new("https://backend.example/", "key");
        assert_eq!(
            store.table_url("slides"),
            "https://backend.example/rest/v1/slides"
        );
    }
}
