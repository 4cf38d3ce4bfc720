//! Service account key API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiError, HttpClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceAccountKey {
    pub id: String,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListKeysResponse {
    pub items: Vec<ServiceAccountKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateKeyRequest {
    pub project_id: String,
    pub email: String,
    pub payload: CreateKeyPayload,
}

#[async_trait(?Send)]
pub trait ServiceAccountApi {
    async fn list_keys(&self, project_id: &str, email: &str)
        -> Result<ListKeysResponse, ApiError>;
    async fn get_key(
        &self,
        project_id: &str,
        email: &str,
        key_id: &str,
    ) -> Result<ServiceAccountKey, ApiError>;
    /// Returns the key document as sent by the API, credentials included.
    async fn create_key(&self, request: &CreateKeyRequest) -> Result<Value, ApiError>;
    async fn delete_key(&self, project_id: &str, email: &str, key_id: &str)
        -> Result<(), ApiError>;
}

pub struct HttpServiceAccountClient {
    http: HttpClient,
}

impl HttpServiceAccountClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait(?Send)]
impl ServiceAccountApi for HttpServiceAccountClient {
    async fn list_keys(
        &self,
        project_id: &str,
        email: &str,
    ) -> Result<ListKeysResponse, ApiError> {
        self.http
            .get(&["v2", "projects", project_id, "service-accounts", email, "keys"])
            .await
    }

    async fn get_key(
        &self,
        project_id: &str,
        email: &str,
        key_id: &str,
    ) -> Result<ServiceAccountKey, ApiError> {
        self.http
            .get(&[
                "v2",
                "projects",
                project_id,
                "service-accounts",
                email,
                "keys",
                key_id,
            ])
            .await
    }

    async fn create_key(&self, request: &CreateKeyRequest) -> Result<Value, ApiError> {
        self.http
            .post(
                &[
                    "v2",
                    "projects",
                    &request.project_id,
                    "service-accounts",
                    &request.email,
                    "keys",
                ],
                &request.payload,
            )
            .await
    }

    async fn delete_key(
        &self,
        project_id: &str,
        email: &str,
        key_id: &str,
    ) -> Result<(), ApiError> {
        self.http
            .delete(&[
                "v2",
                "projects",
                project_id,
                "service-accounts",
                email,
                "keys",
                key_id,
            ])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn create_payload_serializes_rfc3339_validity() {
        let payload = CreateKeyPayload {
            valid_until: Some(Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap()),
            public_key: None,
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"validUntil":"2024-01-31T12:00:00Z"}"#
        );
    }

    #[test]
    fn key_deserializes_without_optional_fields() {
        let key: ServiceAccountKey = serde_json::from_str(
            r#"{"id":"k1","active":true,"createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(key.active);
        assert_eq!(key.valid_until, None);
        assert!(key.created_at.is_some());
    }
}
