//! HTTP client for the PetFriends REST API
//!
//! Every operation is a single round-trip that returns the raw status and
//! parsed body. Rejections by the service are returned, not raised; only
//! transport failures and unreadable photo files become errors.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use url::Url;

use crate::common::{Error, Result};

use super::types::{ApiResponse, Body, PetFields, PetFilter, SessionKey};

/// Header carrying the session key on authenticated calls
const AUTH_HEADER: &str = "auth_key";

/// Client for one PetFriends deployment
#[derive(Debug, Clone)]
pub struct PetFriendsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PetFriendsClient {
    /// Create a client for `base_url` using the HTTP library's default timeouts
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Create a client with an optional per-request timeout
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| Error::invalid_url(base_url, e))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::invalid_url(base_url.as_str(), "not a base URL"));
        }
        // Url::join drops the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder().user_agent("petfriends-api-tests");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Request a session key for `email`/`password`
    ///
    /// Valid credentials answer 200 with a `key` field; anything else is a
    /// non-200 status without one.
    pub async fn get_api_key(&self, email: &str, password: &str) -> Result<ApiResponse> {
        let request = self
            .request(Method::GET, "api/key")?
            .header("email", email)
            .header("password", password);
        self.send("api/key", request).await
    }

    /// List pets, either all of them or only the caller's own
    pub async fn get_list_of_pets(
        &self,
        key: &SessionKey,
        filter: PetFilter,
    ) -> Result<ApiResponse> {
        let request = self
            .authed(Method::GET, "api/pets", key)?
            .query(&[("filter", filter.as_query())]);
        self.send("api/pets", request).await
    }

    /// Create a pet with a photo (multipart upload)
    pub async fn add_new_pet(
        &self,
        key: &SessionKey,
        pet: &PetFields,
        photo: &Path,
    ) -> Result<ApiResponse> {
        let form = Form::new()
            .text("name", pet.name.clone())
            .text("animal_type", pet.animal_type.clone())
            .text("age", pet.age.clone())
            .part("pet_photo", photo_part(photo).await?);

        let request = self.authed(Method::POST, "api/pets", key)?.multipart(form);
        self.send("api/pets", request).await
    }

    /// Create a pet without a photo (form-encoded)
    pub async fn add_new_pet_without_photo(
        &self,
        key: &SessionKey,
        pet: &PetFields,
    ) -> Result<ApiResponse> {
        let request = self
            .authed(Method::POST, "api/create_pet_simple", key)?
            .form(pet);
        self.send("api/create_pet_simple", request).await
    }

    /// Replace the photo of an existing pet
    ///
    /// Acceptance depends on the image format and is decided by the service.
    pub async fn update_pet_photo(
        &self,
        key: &SessionKey,
        pet_id: &str,
        photo: &Path,
    ) -> Result<ApiResponse> {
        let path = format!("api/pets/set_photo/{}", pet_id);
        let form = Form::new().part("pet_photo", photo_part(photo).await?);

        let request = self.authed(Method::POST, &path, key)?.multipart(form);
        self.send(&path, request).await
    }

    /// Update name, type and age of an existing pet
    pub async fn update_pet_info(
        &self,
        key: &SessionKey,
        pet_id: &str,
        pet: &PetFields,
    ) -> Result<ApiResponse> {
        let path = format!("api/pets/{}", pet_id);
        let request = self.authed(Method::PUT, &path, key)?.form(pet);
        self.send(&path, request).await
    }

    /// Delete a pet by id
    pub async fn delete_pet(&self, key: &SessionKey, pet_id: &str) -> Result<ApiResponse> {
        let path = format!("api/pets/{}", pet_id);
        let request = self.authed(Method::DELETE, &path, key)?;
        self.send(&path, request).await
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| Error::invalid_url(path, e))?;
        Ok(self.http.request(method, url))
    }

    fn authed(&self, method: Method, path: &str, key: &SessionKey) -> Result<RequestBuilder> {
        Ok(self.request(method, path)?.header(AUTH_HEADER, key.as_str()))
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<ApiResponse> {
        let request = request.build()?;
        let method = request.method().clone();

        let response = self.http.execute(request).await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "request failed");
            e
        })?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        tracing::debug!(%method, path, status, bytes = text.len(), "response received");

        Ok(ApiResponse::new(status, Body::parse(text)))
    }
}

/// Build the `pet_photo` file part from a local image
async fn photo_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::file_read(path, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());

    Ok(Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(photo_mime(path))?)
}

/// MIME type sent for a photo, by file extension
pub fn photo_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
