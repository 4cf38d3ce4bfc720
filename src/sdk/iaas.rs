//! Public IP API of the infrastructure service.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ApiError, HttpClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicIp {
    pub id: String,
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListPublicIpsResponse {
    pub items: Vec<PublicIp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPublicIpsRequest {
    pub project_id: String,
    pub label_selector: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListPublicIpsQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    label_selector: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePublicIpPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePublicIpRequest {
    pub project_id: String,
    pub payload: CreatePublicIpPayload,
}

/// Changes to a public IP. `network_interface: Some(None)` sends an explicit
/// null, which detaches the address.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePublicIpPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_interface: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatePublicIpRequest {
    pub project_id: String,
    pub public_ip_id: String,
    pub payload: UpdatePublicIpPayload,
}

#[async_trait(?Send)]
pub trait IaasApi {
    async fn list_public_ips(
        &self,
        request: &ListPublicIpsRequest,
    ) -> Result<ListPublicIpsResponse, ApiError>;
    async fn get_public_ip(&self, project_id: &str, public_ip_id: &str)
        -> Result<PublicIp, ApiError>;
    async fn create_public_ip(&self, request: &CreatePublicIpRequest)
        -> Result<PublicIp, ApiError>;
    async fn update_public_ip(&self, request: &UpdatePublicIpRequest)
        -> Result<PublicIp, ApiError>;
    async fn delete_public_ip(&self, project_id: &str, public_ip_id: &str)
        -> Result<(), ApiError>;
}

pub struct HttpIaasClient {
    http: HttpClient,
}

impl HttpIaasClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait(?Send)]
impl IaasApi for HttpIaasClient {
    async fn list_public_ips(
        &self,
        request: &ListPublicIpsRequest,
    ) -> Result<ListPublicIpsResponse, ApiError> {
        let query = ListPublicIpsQuery {
            label_selector: request.label_selector.as_deref(),
        };
        self.http
            .get_with_query(&["v1", "projects", &request.project_id, "public-ips"], &query)
            .await
    }

    async fn get_public_ip(
        &self,
        project_id: &str,
        public_ip_id: &str,
    ) -> Result<PublicIp, ApiError> {
        self.http
            .get(&["v1", "projects", project_id, "public-ips", public_ip_id])
            .await
    }

    async fn create_public_ip(
        &self,
        request: &CreatePublicIpRequest,
    ) -> Result<PublicIp, ApiError> {
        self.http
            .post(
                &["v1", "projects", &request.project_id, "public-ips"],
                &request.payload,
            )
            .await
    }

    async fn update_public_ip(
        &self,
        request: &UpdatePublicIpRequest,
    ) -> Result<PublicIp, ApiError> {
        self.http
            .patch(
                &[
                    "v1",
                    "projects",
                    &request.project_id,
                    "public-ips",
                    &request.public_ip_id,
                ],
                &request.payload,
            )
            .await
    }

    async fn delete_public_ip(
        &self,
        project_id: &str,
        public_ip_id: &str,
    ) -> Result<(), ApiError> {
        self.http
            .delete(&["v1", "projects", project_id, "public-ips", public_ip_id])
            .await
    }
}
