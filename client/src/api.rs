//! Typed endpoints of the PIPO API.
//!
//! Every method goes through [`ApiClient::send`], so all of them share the
//! bearer token and the refresh-on-401 behavior. Forms are validated and
//! normalized before anything is sent; a rejected form fails with
//! [`ApiError::Validation`] and makes no request.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::ApiRequest;
use pipo_console_core::forms::{
    GuestRequestEdit, NewGuestRequest, NewPass, NewUser, PassEdit, UserEdit,
};
use pipo_console_core::validation::normalize_plate;
use pipo_console_core::{EntryAction, EntryLog, GuestRequest, Pass, UserProfile};
use serde::Serialize;
use uuid::Uuid;

/// Page size the admin screens fetch at once.
pub const CONSOLE_PAGE_SIZE: u32 = 500;

/// Paging and soft-delete options for list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Include soft-deleted records (`includeDeleted=true`).
    pub include_deleted: bool,
    /// Maximum number of records; the server default when `None`.
    pub limit: Option<u32>,
    /// Records to skip.
    pub offset: Option<u32>,
}

impl ListQuery {
    /// Server defaults: live records only.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include_deleted: false,
            limit: None,
            offset: None,
        }
    }

    /// What the admin screens load: everything, deleted included, in one page.
    #[must_use]
    pub const fn console() -> Self {
        Self {
            include_deleted: true,
            limit: Some(CONSOLE_PAGE_SIZE),
            offset: None,
        }
    }

    /// Include or exclude soft-deleted records.
    #[must_use]
    pub const fn with_deleted(mut self, include_deleted: bool) -> Self {
        self.include_deleted = include_deleted;
        self
    }

    /// Set the page size.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the page offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    fn apply(self, mut request: ApiRequest) -> ApiRequest {
        if self.include_deleted {
            request = request.with_query("includeDeleted", true);
        }
        if let Some(limit) = self.limit {
            request = request.with_query("limit", limit);
        }
        if let Some(offset) = self.offset {
            request = request.with_query("offset", offset);
        }
        request
    }
}

#[derive(Serialize)]
struct EntryComment<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

// ═══════════════════════════════════════════════════════════════════════
// Users
// ═══════════════════════════════════════════════════════════════════════

impl ApiClient {
    /// `GET /users`
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send_json`]
    pub async fn list_users(&self, query: ListQuery) -> Result<Vec<UserProfile>, ApiError> {
        self.send_json(query.apply(ApiRequest::get("/users"))).await
    }

    /// `GET /users/{id}`
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send_json`]
    pub async fn get_user(&self, id: Uuid) -> Result<UserProfile, ApiError> {
        self.send_json(ApiRequest::get(format!("/users/{id}"))).await
    }

    /// `POST /users`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a rejected form, otherwise errors
    /// from [`ApiClient::send_json`]
    pub async fn create_user(&self, form: NewUser) -> Result<UserProfile, ApiError> {
        let form = form.validate()?;
        self.send_json(ApiRequest::post("/users").with_json(&form)?).await
    }

    /// `PATCH /users/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a rejected form, otherwise errors
    /// from [`ApiClient::send_json`]
    pub async fn update_user(&self, id: Uuid, form: UserEdit) -> Result<UserProfile, ApiError> {
        let form = form.validate()?;
        self.send_json(ApiRequest::patch(format!("/users/{id}")).with_json(&form)?)
            .await
    }

    /// `DELETE /users/{id}` (soft delete)
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send`]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), ApiError> {
        self.send_empty(ApiRequest::delete(format!("/users/{id}"))).await
    }

    /// `POST /users/{id}/restore`
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send`]
    pub async fn restore_user(&self, id: Uuid) -> Result<(), ApiError> {
        self.post_action(format!("/users/{id}/restore")).await
    }

    /// `POST /users/{id}/block`
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send`]
    pub async fn block_user(&self, id: Uuid) -> Result<(), ApiError> {
        self.post_action(format!("/users/{id}/block")).await
    }

    /// `POST /users/{id}/unblock`
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send`]
    pub async fn unblock_user(&self, id: Uuid) -> Result<(), ApiError> {
        self.post_action(format!("/users/{id}/unblock")).await
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Passes
// ═══════════════════════════════════════════════════════════════════════

impl ApiClient {
    /// `GET /passes`
    ///
    /// Admins get every pass, residents only their own.
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send_json`]
    pub async fn list_passes(&self, query: ListQuery) -> Result<Vec<Pass>, ApiError> {
        self.send_json(query.apply(ApiRequest::get("/passes"))).await
    }

    /// `GET /passes/search?plate=`
    ///
    /// The plate is normalized first. A blank plate matches nothing and is
    /// not sent.
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send_json`]
    pub async fn search_passes(&self, plate: &str) -> Result<Vec<Pass>, ApiError> {
        let plate = normalize_plate(plate);
        if plate.is_empty() {
            return Ok(Vec::new());
        }
        self.send_json(ApiRequest::get("/passes/search").with_query("plate", plate))
            .await
    }

    /// `GET /passes/{id}`
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send_json`]
    pub async fn get_pass(&self, id: Uuid) -> Result<Pass, ApiError> {
        self.send_json(ApiRequest::get(format!("/passes/{id}"))).await
    }

    /// `POST /passes`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a rejected form, otherwise errors
    /// from [`ApiClient::send_json`]
    pub async fn create_pass(&self, form: NewPass) -> Result<Pass, ApiError> {
        let form = form.validate()?;
        self.send_json(ApiRequest::post("/passes").with_json(&form)?).await
    }

    /// `PATCH /passes/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a rejected form, otherwise errors
    /// from [`ApiClient::send_json`]
    pub async fn update_pass(&self, id: Uuid, form: PassEdit) -> Result<Pass, ApiError> {
        let form = form.validate()?;
        self.send_json(ApiRequest::patch(format!("/passes/{id}")).with_json(&form)?)
            .await
    }

    /// `DELETE /passes/{id}` (soft delete)
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send`]
    pub async fn delete_pass(&self, id: Uuid) -> Result<(), ApiError> {
        self.send_empty(ApiRequest::delete(format!("/passes/{id}"))).await
    }

    /// `POST /passes/{id}/restore`
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send`]
    pub async fn restore_pass(&self, id: Uuid) -> Result<(), ApiError> {
        self.post_action(format!("/passes/{id}/restore")).await
    }

    /// `POST /passes/{id}/entry`
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send_json`]
    pub async fn record_entry(&self, pass: Uuid, comment: Option<&str>) -> Result<EntryLog, ApiError> {
        self.record_gate_action(pass, EntryAction::Entry, comment).await
    }

    /// `POST /passes/{id}/exit`
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send_json`]
    pub async fn record_exit(&self, pass: Uuid, comment: Option<&str>) -> Result<EntryLog, ApiError> {
        self.record_gate_action(pass, EntryAction::Exit, comment).await
    }

    async fn record_gate_action(
        &self,
        pass: Uuid,
        action: EntryAction,
        comment: Option<&str>,
    ) -> Result<EntryLog, ApiError> {
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());
        let request = ApiRequest::post(format!("/passes/{pass}/{}", action.as_str()))
            .with_json(&EntryComment { comment })?;
        let log: EntryLog = self.send_json(request).await?;
        tracing::info!(pass_id = %pass, action = action.as_str(), "Gate action recorded");
        Ok(log)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Guest requests
// ═══════════════════════════════════════════════════════════════════════

impl ApiClient {
    /// `GET /guest-requests`
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send_json`]
    pub async fn list_guest_requests(&self, query: ListQuery) -> Result<Vec<GuestRequest>, ApiError> {
        self.send_json(query.apply(ApiRequest::get("/guest-requests"))).await
    }

    /// `GET /guest-requests/{id}`
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send_json`]
    pub async fn get_guest_request(&self, id: Uuid) -> Result<GuestRequest, ApiError> {
        self.send_json(ApiRequest::get(format!("/guest-requests/{id}"))).await
    }

    /// `POST /guest-requests`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a rejected form, otherwise errors
    /// from [`ApiClient::send_json`]
    pub async fn create_guest_request(&self, form: NewGuestRequest) -> Result<GuestRequest, ApiError> {
        let form = form.validate()?;
        self.send_json(ApiRequest::post("/guest-requests").with_json(&form)?)
            .await
    }

    /// `PATCH /guest-requests/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a rejected form, otherwise errors
    /// from [`ApiClient::send_json`]
    pub async fn update_guest_request(
        &self,
        id: Uuid,
        form: GuestRequestEdit,
    ) -> Result<GuestRequest, ApiError> {
        let form = form.validate()?;
        self.send_json(ApiRequest::patch(format!("/guest-requests/{id}")).with_json(&form)?)
            .await
    }

    /// `DELETE /guest-requests/{id}` (soft delete)
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send`]
    pub async fn delete_guest_request(&self, id: Uuid) -> Result<(), ApiError> {
        self.send_empty(ApiRequest::delete(format!("/guest-requests/{id}")))
            .await
    }

    /// `POST /guest-requests/{id}/restore`
    ///
    /// # Errors
    ///
    /// Returns errors from [`ApiClient::send`]
    pub async fn restore_guest_request(&self, id: Uuid) -> Result<(), ApiError> {
        self.post_action(format!("/guest-requests/{id}/restore")).await
    }

    // State transitions post an empty object and ignore the status reply.
    async fn post_action(&self, path: String) -> Result<(), ApiError> {
        let request = ApiRequest::post(path).with_json(&serde_json::json!({}))?;
        self.send_empty(request).await
    }
}
