//! Typed client for the project-tree endpoints.
//!
//! Every call is made as the identity currently held by the
//! [`SessionStore`]; with no live session it fails with
//! [`CoreError::Unauthorized`] before any request is sent.

use std::sync::Arc;

use labelhub_core::entities::{
    Annotation, CreateAnnotation, CreateDataset, CreateImage, CreateProject, Dataset, Image,
    Project, ProjectOverview, UpdateAnnotation, UpdateDataset, UpdateImage, UpdateProject,
};
use labelhub_core::error::CoreError;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::http::ApiClient;
use crate::session::SessionStore;

#[derive(Debug, Deserialize)]
struct DataResponse<T> {
    data: T,
}

/// Which entity a request targets, for mapping 404s.
#[derive(Clone, Copy)]
struct Target<'a> {
    entity: &'static str,
    id: &'a str,
}

#[derive(Clone)]
pub struct DataClient {
    api: ApiClient,
    session: Arc<SessionStore>,
}

impl DataClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self, CoreError> {
        Ok(Self {
            api: ApiClient::new(config)?,
            session,
        })
    }

    pub fn with_client(client: reqwest::Client, api_url: &str, session: Arc<SessionStore>) -> Self {
        Self {
            api: ApiClient::with_client(client, api_url),
            session,
        }
    }

    // ---- projects ----

    pub async fn list_projects(&self) -> Result<Vec<Project>, CoreError> {
        self.get("/projects", Target { entity: "Project", id: "" })
            .await
    }

    pub async fn get_project(&self, id: &str) -> Result<Project, CoreError> {
        self.get(&format!("/projects/{}", segment(id)), Target { entity: "Project", id })
            .await
    }

    pub async fn create_project(&self, input: &CreateProject) -> Result<Project, CoreError> {
        self.send_json(Method::POST, "/projects", input, Target { entity: "Project", id: "" })
            .await
    }

    pub async fn update_project(&self, id: &str, input: &UpdateProject) -> Result<Project, CoreError> {
        self.send_json(
            Method::PUT,
            &format!("/projects/{}", segment(id)),
            input,
            Target { entity: "Project", id },
        )
        .await
    }

    pub async fn delete_project(&self, id: &str) -> Result<(), CoreError> {
        self.delete(&format!("/projects/{}", segment(id)), Target { entity: "Project", id })
            .await
    }

    pub async fn project_overview(&self, id: &str) -> Result<ProjectOverview, CoreError> {
        self.get(
            &format!("/projects/{}/overview", segment(id)),
            Target { entity: "Project", id },
        )
        .await
    }

    // ---- datasets ----

    pub async fn list_datasets(&self, project_id: &str) -> Result<Vec<Dataset>, CoreError> {
        self.get(
            &format!("/projects/{}/datasets", segment(project_id)),
            Target { entity: "Project", id: project_id },
        )
        .await
    }

    pub async fn create_dataset(
        &self,
        project_id: &str,
        input: &CreateDataset,
    ) -> Result<Dataset, CoreError> {
        self.send_json(
            Method::POST,
            &format!("/projects/{}/datasets", segment(project_id)),
            input,
            Target { entity: "Project", id: project_id },
        )
        .await
    }

    pub async fn get_dataset(&self, id: &str) -> Result<Dataset, CoreError> {
        self.get(&format!("/datasets/{}", segment(id)), Target { entity: "Dataset", id })
            .await
    }

    pub async fn update_dataset(&self, id: &str, input: &UpdateDataset) -> Result<Dataset, CoreError> {
        self.send_json(
            Method::PUT,
            &format!("/datasets/{}", segment(id)),
            input,
            Target { entity: "Dataset", id },
        )
        .await
    }

    pub async fn delete_dataset(&self, id: &str) -> Result<(), CoreError> {
        self.delete(&format!("/datasets/{}", segment(id)), Target { entity: "Dataset", id })
            .await
    }

    // ---- images ----

    pub async fn list_images(&self, dataset_id: &str) -> Result<Vec<Image>, CoreError> {
        self.get(
            &format!("/datasets/{}/images", segment(dataset_id)),
            Target { entity: "Dataset", id: dataset_id },
        )
        .await
    }

    pub async fn create_image(&self, dataset_id: &str, input: &CreateImage) -> Result<Image, CoreError> {
        self.send_json(
            Method::POST,
            &format!("/datasets/{}/images", segment(dataset_id)),
            input,
            Target { entity: "Dataset", id: dataset_id },
        )
        .await
    }

    pub async fn get_image(&self, id: &str) -> Result<Image, CoreError> {
        self.get(&format!("/images/{}", segment(id)), Target { entity: "Image", id })
            .await
    }

    pub async fn update_image(&self, id: &str, input: &UpdateImage) -> Result<Image, CoreError> {
        self.send_json(
            Method::PUT,
            &format!("/images/{}", segment(id)),
            input,
            Target { entity: "Image", id },
        )
        .await
    }

    pub async fn delete_image(&self, id: &str) -> Result<(), CoreError> {
        self.delete(&format!("/images/{}", segment(id)), Target { entity: "Image", id })
            .await
    }

    // ---- annotations ----

    pub async fn list_annotations(&self, image_id: &str) -> Result<Vec<Annotation>, CoreError> {
        self.get(
            &format!("/images/{}/annotations", segment(image_id)),
            Target { entity: "Image", id: image_id },
        )
        .await
    }

    pub async fn create_annotation(
        &self,
        image_id: &str,
        input: &CreateAnnotation,
    ) -> Result<Annotation, CoreError> {
        self.send_json(
            Method::POST,
            &format!("/images/{}/annotations", segment(image_id)),
            input,
            Target { entity: "Image", id: image_id },
        )
        .await
    }

    pub async fn get_annotation(&self, id: &str) -> Result<Annotation, CoreError> {
        self.get(&format!("/annotations/{}", segment(id)), Target { entity: "Annotation", id })
            .await
    }

    pub async fn update_annotation(
        &self,
        id: &str,
        input: &UpdateAnnotation,
    ) -> Result<Annotation, CoreError> {
        self.send_json(
            Method::PUT,
            &format!("/annotations/{}", segment(id)),
            input,
            Target { entity: "Annotation", id },
        )
        .await
    }

    pub async fn delete_annotation(&self, id: &str) -> Result<(), CoreError> {
        self.delete(&format!("/annotations/{}", segment(id)), Target { entity: "Annotation", id })
            .await
    }

    // ---- private helpers ----

    fn token(&self) -> Result<String, CoreError> {
        self.session
            .session()
            .map(|s| s.access_token)
            .ok_or_else(|| CoreError::Unauthorized("Not signed in".into()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, target: Target<'_>) -> Result<T, CoreError> {
        let request = self.api.request(Method::GET, path, Some(&self.token()?));
        self.execute(request, target).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        target: Target<'_>,
    ) -> Result<T, CoreError> {
        let request = self.api.request(method, path, Some(&self.token()?)).json(body);
        self.execute(request, target).await
    }

    async fn delete(&self, path: &str, target: Target<'_>) -> Result<(), CoreError> {
        let request = self.api.request(Method::DELETE, path, Some(&self.token()?));
        self.api
            .send(request)
            .await?
            .map_err(|failure| map_failure(failure, target))?;
        Ok(())
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        target: Target<'_>,
    ) -> Result<T, CoreError> {
        let response = self
            .api
            .send(request)
            .await?
            .map_err(|failure| map_failure(failure, target))?;
        let envelope: DataResponse<T> = ApiClient::parse(response).await?;
        Ok(envelope.data)
    }
}

/// Percent-encode an id for use as one path segment, so it can never add
/// segments or start a query.
fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}

fn map_failure(failure: crate::http::ApiFailure, target: Target<'_>) -> CoreError {
    if failure.status == 404 {
        CoreError::not_found(target.entity, target.id)
    } else {
        failure.into_core_error()
    }
}
