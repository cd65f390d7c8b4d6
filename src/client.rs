//! HTTP client for the course catalog backend.
//!
//! Every endpoint speaks JSON inside the `{success, message?, ...}`
//! envelope; authentication is a server-issued session cookie that rides
//! the client's cookie store after [`CatalogClient::login`]. Mutations are
//! never retried, and a failed mutation leaves whatever the caller was
//! displaying untouched.

use rand::Rng;
use reqwest::multipart;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::ReferenceCache;
use crate::envelope::{self, Ack};
use crate::error::CatalogError;
use crate::filter::FilterSelection;
use crate::types::{
    AccountUpdate, CourseDraft, CourseRecord, EnrollmentRecord, EnrollmentStatus, ImportReport,
    NewAccount, Profile, ProfileUpdate, SearchOutcome, UserAccount,
};

/// Client-side ceiling on import uploads, enforced before any bytes move.
pub const IMPORT_MAX_BYTES: u64 = 300 * 1024 * 1024;

/// Spreadsheet extensions the import endpoint accepts.
pub const IMPORT_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

/// Configuration for the catalog client.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the backend, e.g. `http://127.0.0.1:5000`
    pub base_url: String,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Overall per-request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            user_agent: format!("campusreg/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Identity echoed back by a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginIdentity {
    pub user_id: i64,
    pub username: String,
    pub role: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// Admin account listing, pre-split by role as the server sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountListing {
    #[serde(default)]
    pub users: Vec<UserAccount>,
    #[serde(default)]
    pub students: Vec<UserAccount>,
    #[serde(default)]
    pub admins: Vec<UserAccount>,
}

// Per-endpoint payloads behind the envelope.
#[derive(Deserialize)]
struct DepartmentsPayload {
    departments: Vec<String>,
}

#[derive(Deserialize)]
struct SemestersPayload {
    semesters: Vec<String>,
}

#[derive(Deserialize)]
struct CoursesPayload {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    items: Vec<CourseRecord>,
}

#[derive(Deserialize)]
struct CoursePayload {
    course: CourseRecord,
}

#[derive(Deserialize)]
struct EnrollmentsPayload {
    #[serde(default)]
    items: Vec<EnrollmentRecord>,
}

#[derive(Deserialize)]
struct ProfilePayload {
    profile: Profile,
}

#[derive(Deserialize)]
struct UserPayload {
    user: UserAccount,
}

#[derive(Deserialize)]
struct ImportPayload {
    #[serde(default)]
    count: u64,
}

/// Typed client over the catalog REST API.
pub struct CatalogClient {
    client: Client,
    config: CatalogConfig,
    reference: ReferenceCache,
}

impl CatalogClient {
    /// Creates a client with default configuration.
    pub fn new() -> Result<Self, CatalogError> {
        Self::with_config(CatalogConfig::default())
    }

    /// Creates a client with custom configuration.
    pub fn with_config(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogError::Network {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            config,
            reference: ReferenceCache::with_default_ttl(),
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        let base = Url::parse(&self.config.base_url)?;
        Ok(base.join(path)?)
    }

    /// Issues one request and unwraps the envelope.
    ///
    /// Both failure kinds funnel through here: transport problems become
    /// `Network`/`UnexpectedResponse`, `success: false` becomes `Api`.
    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<(T, Option<String>), CatalogError> {
        let correlation_id = generate_correlation_id();
        debug!(
            correlation_id = %correlation_id,
            method = %method,
            url = %url,
            "Issuing request"
        );

        let mut builder = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(
                correlation_id = %correlation_id,
                status = %status,
                "Request failed before envelope"
            );
            return Err(CatalogError::UnexpectedResponse {
                message: format!("{method} {url} returned status {status}"),
            });
        }

        let value: Value = response.json().await?;
        let result = envelope::unwrap(value);
        if let Err(err) = &result {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Request failed"
            );
        }
        result
    }

    async fn get_payload<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(T, Option<String>), CatalogError> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        self.request(Method::GET, url, None).await
    }

    async fn ack(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<String, CatalogError> {
        let url = self.endpoint(path)?;
        let (_, message) = self.request::<Ack>(method, url, body).await?;
        Ok(message.unwrap_or_default())
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Logs in; the session cookie lands in the cookie store and rides
    /// every later request.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginIdentity, CatalogError> {
        let url = self.endpoint("/api/login")?;
        let body = serde_json::json!({ "username": username, "password": password });
        let (identity, _) = self
            .request::<LoginIdentity>(Method::POST, url, Some(body))
            .await?;
        info!(username = %identity.username, role = %identity.role, "Logged in");
        Ok(identity)
    }

    pub async fn logout(&self) -> Result<String, CatalogError> {
        self.ack(Method::POST, "/api/logout", None).await
    }

    // ------------------------------------------------------------------
    // Reference data
    // ------------------------------------------------------------------

    /// Department list, cached between calls.
    pub async fn departments(&self) -> Result<Vec<String>, CatalogError> {
        if let Some(cached) = self.reference.get("departments") {
            debug!("Returning cached department list");
            return Ok(cached);
        }
        let (payload, _) = self
            .get_payload::<DepartmentsPayload>("/api/departments", &[])
            .await?;
        self.reference
            .insert("departments", payload.departments.clone());
        Ok(payload.departments)
    }

    /// Semester list, cached between calls.
    pub async fn semesters(&self) -> Result<Vec<String>, CatalogError> {
        if let Some(cached) = self.reference.get("semesters") {
            debug!("Returning cached semester list");
            return Ok(cached);
        }
        let (payload, _) = self
            .get_payload::<SemestersPayload>("/api/semesters", &[])
            .await?;
        self.reference
            .insert("semesters", payload.semesters.clone());
        Ok(payload.semesters)
    }

    /// Fetches both reference lists concurrently.
    pub async fn reference_data(&self) -> Result<(Vec<String>, Vec<String>), CatalogError> {
        futures::try_join!(self.departments(), self.semesters())
    }

    /// Drops cached reference lists, forcing the next call to refetch.
    pub fn invalidate_reference_data(&self) {
        self.reference.clear();
    }

    // ------------------------------------------------------------------
    // Courses
    // ------------------------------------------------------------------

    /// Searches courses with the given filter state.
    ///
    /// `FilterSelection::serialize` is the only bridge between filter
    /// state and the query string.
    pub async fn search_courses(
        &self,
        filters: &FilterSelection,
    ) -> Result<SearchOutcome, CatalogError> {
        let params = filters.serialize();
        info!(criteria = params.len(), "Searching courses");
        let (payload, _) = self
            .get_payload::<CoursesPayload>("/api/courses", &params)
            .await?;
        info!(count = payload.count, "Search finished");
        Ok(SearchOutcome {
            count: payload.count,
            items: payload.items,
            fetched_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    pub async fn course(&self, course_id: i64) -> Result<CourseRecord, CatalogError> {
        let (payload, _) = self
            .get_payload::<CoursePayload>(&format!("/api/courses/{course_id}"), &[])
            .await?;
        Ok(payload.course)
    }

    pub async fn create_course(&self, draft: &CourseDraft) -> Result<String, CatalogError> {
        let body = serde_json::to_value(draft)?;
        self.ack(Method::POST, "/api/courses", Some(body)).await
    }

    pub async fn update_course(
        &self,
        course_id: i64,
        draft: &CourseDraft,
    ) -> Result<String, CatalogError> {
        let body = serde_json::to_value(draft)?;
        self.ack(Method::PUT, &format!("/api/courses/{course_id}"), Some(body))
            .await
    }

    pub async fn delete_course(&self, course_id: i64) -> Result<String, CatalogError> {
        self.ack(Method::DELETE, &format!("/api/courses/{course_id}"), None)
            .await
    }

    /// Uploads a course spreadsheet for a semester.
    ///
    /// Extension and size are checked before anything leaves the machine,
    /// matching the original upload form's client-side gate.
    pub async fn import_courses(
        &self,
        file: &Path,
        semester: &str,
    ) -> Result<ImportReport, CatalogError> {
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let size = tokio::fs::metadata(file)
            .await
            .map_err(|e| CatalogError::InvalidInput {
                message: format!("無法讀取檔案 {}: {e}", file.display()),
            })?
            .len();
        validate_import_file(&file_name, size)?;

        if semester.trim().is_empty() {
            return Err(CatalogError::InvalidInput {
                message: "請指定學期".to_string(),
            });
        }

        let bytes = tokio::fs::read(file)
            .await
            .map_err(|e| CatalogError::InvalidInput {
                message: format!("無法讀取檔案 {}: {e}", file.display()),
            })?;

        info!(file = %file_name, size, semester, "Uploading course import");
        let form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(file_name))
            .text("semester", semester.to_string());

        let url = self.endpoint("/api/import-courses")?;
        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::UnexpectedResponse {
                message: format!("import returned status {status}"),
            });
        }
        let value: Value = response.json().await?;
        let (payload, message) = envelope::unwrap::<ImportPayload>(value)?;
        // imported lists may shift reference data (new semester)
        self.invalidate_reference_data();
        Ok(ImportReport {
            count: payload.count,
            message: message.unwrap_or_default(),
        })
    }

    // ------------------------------------------------------------------
    // Enrollment
    // ------------------------------------------------------------------

    /// Creates an enrollment relationship (favorite or preselect).
    pub async fn enroll(
        &self,
        course_id: i64,
        status: EnrollmentStatus,
    ) -> Result<String, CatalogError> {
        let body = serde_json::json!({ "course_id": course_id, "status": status });
        self.ack(Method::POST, "/api/enroll", Some(body)).await
    }

    /// Removes an enrollment relationship by its own identity.
    pub async fn drop_enrollment(&self, enrollment_id: i64) -> Result<String, CatalogError> {
        self.ack(Method::DELETE, &format!("/api/enroll/{enrollment_id}"), None)
            .await
    }

    /// The caller's enrollments, optionally narrowed to one status.
    pub async fn my_courses(
        &self,
        status: Option<EnrollmentStatus>,
    ) -> Result<Vec<EnrollmentRecord>, CatalogError> {
        let query: Vec<(&str, String)> = status
            .map(|s| vec![("status", s.as_str().to_string())])
            .unwrap_or_default();
        let (payload, _) = self
            .get_payload::<EnrollmentsPayload>("/api/my-courses", &query)
            .await?;
        Ok(payload.items)
    }

    // ------------------------------------------------------------------
    // Profile
    // ------------------------------------------------------------------

    pub async fn profile(&self) -> Result<Profile, CatalogError> {
        let (payload, _) = self
            .get_payload::<ProfilePayload>("/api/profile", &[])
            .await?;
        Ok(payload.profile)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<String, CatalogError> {
        let body = serde_json::to_value(update)?;
        self.ack(Method::PUT, "/api/profile", Some(body)).await
    }

    /// Changes the caller's password; confirmation mismatches never reach
    /// the server.
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<String, CatalogError> {
        if new_password.is_empty() || confirm_password.is_empty() {
            return Err(CatalogError::InvalidInput {
                message: "請輸入新密碼".to_string(),
            });
        }
        if new_password != confirm_password {
            return Err(CatalogError::InvalidInput {
                message: "新密碼與確認密碼不一致".to_string(),
            });
        }
        let body = serde_json::json!({
            "old_password": old_password,
            "new_password": new_password,
            "confirm_password": confirm_password,
        });
        self.ack(Method::POST, "/api/change-password", Some(body))
            .await
    }

    // ------------------------------------------------------------------
    // Accounts (admin)
    // ------------------------------------------------------------------

    pub async fn accounts(&self) -> Result<AccountListing, CatalogError> {
        let (payload, _) = self
            .get_payload::<AccountListing>("/api/users", &[])
            .await?;
        Ok(payload)
    }

    pub async fn account(&self, user_id: i64) -> Result<UserAccount, CatalogError> {
        let (payload, _) = self
            .get_payload::<UserPayload>(&format!("/api/users/{user_id}"), &[])
            .await?;
        Ok(payload.user)
    }

    pub async fn create_account(&self, account: &NewAccount) -> Result<String, CatalogError> {
        let body = serde_json::to_value(account)?;
        self.ack(Method::POST, "/api/users", Some(body)).await
    }

    pub async fn update_account(
        &self,
        user_id: i64,
        update: &AccountUpdate,
    ) -> Result<String, CatalogError> {
        let body = serde_json::to_value(update)?;
        self.ack(Method::PUT, &format!("/api/users/{user_id}"), Some(body))
            .await
    }

    pub async fn delete_account(&self, user_id: i64) -> Result<String, CatalogError> {
        self.ack(Method::DELETE, &format!("/api/users/{user_id}"), None)
            .await
    }

    /// Resets an account's password to the server-side default.
    pub async fn reset_password(&self, user_id: i64) -> Result<String, CatalogError> {
        self.ack(
            Method::POST,
            &format!("/api/users/{user_id}/reset-password"),
            None,
        )
        .await
    }
}

/// Client-side gate for import uploads.
pub fn validate_import_file(file_name: &str, size: u64) -> Result<(), CatalogError> {
    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase());
    match extension {
        Some(ext) if IMPORT_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => {
            return Err(CatalogError::InvalidInput {
                message: "只接受 .csv .xlsx .xls 檔案".to_string(),
            })
        }
    }
    if size > IMPORT_MAX_BYTES {
        return Err(CatalogError::InvalidInput {
            message: "檔案太大！請上傳小於 300 MB 的檔案".to_string(),
        });
    }
    Ok(())
}

/// Generates a unique correlation ID for request tracing.
fn generate_correlation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp & 0xFFFFFFFF, random)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_import_file_extensions() {
        assert!(validate_import_file("courses.csv", 1024).is_ok());
        assert!(validate_import_file("113-1.XLSX", 1024).is_ok());
        assert!(validate_import_file("old.xls", 1024).is_ok());
        assert!(validate_import_file("courses.pdf", 1024).is_err());
        assert!(validate_import_file("no_extension", 1024).is_err());
    }

    #[test]
    fn test_validate_import_file_size_limit() {
        assert!(validate_import_file("ok.csv", IMPORT_MAX_BYTES).is_ok());
        let err = validate_import_file("big.csv", IMPORT_MAX_BYTES + 1).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput { .. }));
    }

    #[test]
    fn test_default_config() {
        let config = CatalogConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert!(config.timeout > config.connect_timeout);
    }

    #[test]
    fn test_correlation_ids_are_unique() {
        let a = generate_correlation_id();
        let b = generate_correlation_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_endpoint_join() {
        let client = CatalogClient::new().unwrap();
        let url = client.endpoint("/api/courses").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/courses");
    }
}
