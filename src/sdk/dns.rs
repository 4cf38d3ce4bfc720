//! DNS zone API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ApiError, HttpClient};
use crate::wait::WaitState;

pub const STATE_CREATE_SUCCEEDED: &str = "CREATE_SUCCEEDED";
pub const STATE_CREATE_FAILED: &str = "CREATE_FAILED";
pub const STATE_UPDATE_SUCCEEDED: &str = "UPDATE_SUCCEEDED";
pub const STATE_UPDATE_FAILED: &str = "UPDATE_FAILED";
pub const STATE_DELETE_SUCCEEDED: &str = "DELETE_SUCCEEDED";
pub const STATE_DELETE_FAILED: &str = "DELETE_FAILED";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub state: String,
    #[serde(rename = "type")]
    pub zone_type: String,
    pub dns_name: String,
    pub record_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_ttl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primaries: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_cache: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_reverse_zone: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_started: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_finished: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListZonesRequest {
    pub project_id: String,
    pub page: i64,
    pub page_size: i64,
    pub include_deleted: bool,
    pub label_selector: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListZonesQuery<'a> {
    page: i64,
    page_size: i64,
    #[serde(rename = "state[neq]", skip_serializing_if = "Option::is_none")]
    state_neq: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label_selector: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListZonesResponse {
    pub zones: Vec<Zone>,
    pub total_pages: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateZonePayload {
    pub name: String,
    pub dns_name: String,
    #[serde(rename = "defaultTTL", skip_serializing_if = "Option::is_none")]
    pub default_ttl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primaries: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_cache: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_reverse_zone: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateZoneRequest {
    pub project_id: String,
    pub payload: CreateZonePayload,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialUpdateZonePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "defaultTTL", skip_serializing_if = "Option::is_none")]
    pub default_ttl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primaries: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_cache: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialUpdateZoneRequest {
    pub project_id: String,
    pub zone_id: String,
    pub payload: PartialUpdateZonePayload,
}

#[derive(Debug, Deserialize)]
struct ZoneResponse {
    zone: Zone,
}

#[async_trait(?Send)]
pub trait DnsApi {
    async fn list_zones(&self, request: &ListZonesRequest) -> Result<ListZonesResponse, ApiError>;
    async fn get_zone(&self, project_id: &str, zone_id: &str) -> Result<Zone, ApiError>;
    async fn create_zone(&self, request: &CreateZoneRequest) -> Result<Zone, ApiError>;
    async fn partial_update_zone(&self, request: &PartialUpdateZoneRequest)
        -> Result<Zone, ApiError>;
    async fn delete_zone(&self, project_id: &str, zone_id: &str) -> Result<(), ApiError>;
}

/// Wait classifier for zone operations ending in `done` or `failed`.
pub fn zone_state(done: &'static str, failed: &'static str) -> impl Fn(&Zone) -> WaitState {
    move |zone| {
        if zone.state == done {
            WaitState::Done
        } else if zone.state == failed {
            WaitState::Failed(format!("zone is in state {}", zone.state))
        } else {
            WaitState::Pending
        }
    }
}

pub struct HttpDnsClient {
    http: HttpClient,
}

impl HttpDnsClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait(?Send)]
impl DnsApi for HttpDnsClient {
    async fn list_zones(&self, request: &ListZonesRequest) -> Result<ListZonesResponse, ApiError> {
        let query = ListZonesQuery {
            page: request.page,
            page_size: request.page_size,
            state_neq: (!request.include_deleted).then_some(STATE_DELETE_SUCCEEDED),
            label_selector: request.label_selector.as_deref(),
        };
        self.http
            .get_with_query(&["v1", "projects", &request.project_id, "zones"], &query)
            .await
    }

    async fn get_zone(&self, project_id: &str, zone_id: &str) -> Result<Zone, ApiError> {
        let response: ZoneResponse = self
            .http
            .get(&["v1", "projects", project_id, "zones", zone_id])
            .await?;
        Ok(response.zone)
    }

    async fn create_zone(&self, request: &CreateZoneRequest) -> Result<Zone, ApiError> {
        let response: ZoneResponse = self
            .http
            .post(&["v1", "projects", &request.project_id, "zones"], &request.payload)
            .await?;
        Ok(response.zone)
    }

    async fn partial_update_zone(
        &self,
        request: &PartialUpdateZoneRequest,
    ) -> Result<Zone, ApiError> {
        let response: ZoneResponse = self
            .http
            .patch(
                &["v1", "projects", &request.project_id, "zones", &request.zone_id],
                &request.payload,
            )
            .await?;
        Ok(response.zone)
    }

    async fn delete_zone(&self, project_id: &str, zone_id: &str) -> Result<(), ApiError> {
        self.http
            .delete(&["v1", "projects", project_id, "zones", zone_id])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_deserializes_from_camel_case() {
        let zone: Zone = serde_json::from_str(
            r#"{"id":"z1","name":"widgets","state":"CREATE_SUCCEEDED","type":"primary",
                "dnsName":"w.example.com","recordCount":3,"defaultTTL":null}"#,
        )
        .unwrap();
        assert_eq!(zone.zone_type, "primary");
        assert_eq!(zone.dns_name, "w.example.com");
        assert_eq!(zone.record_count, 3);
    }

    #[test]
    fn create_payload_omits_unset_fields() {
        let payload = CreateZonePayload {
            name: "w1".into(),
            dns_name: "w1.example.com".into(),
            default_ttl: Some(1000),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"name":"w1","dnsName":"w1.example.com","defaultTTL":1000}"#
        );
    }

    #[test]
    fn list_query_filters_deleted_zones() {
        let query = ListZonesQuery {
            page: 1,
            page_size: 100,
            state_neq: Some(STATE_DELETE_SUCCEEDED),
            label_selector: None,
        };
        assert_eq!(
            serde_urlencoded::to_string(&query).unwrap(),
            "page=1&pageSize=100&state%5Bneq%5D=DELETE_SUCCEEDED"
        );
    }

    #[test]
    fn zone_state_classifies_terminal_states() {
        let classify = zone_state(STATE_CREATE_SUCCEEDED, STATE_CREATE_FAILED);
        let mut zone = Zone {
            state: "CREATING".into(),
            ..Default::default()
        };
        assert_eq!(classify(&zone), WaitState::Pending);
        zone.state = STATE_CREATE_SUCCEEDED.into();
        assert_eq!(classify(&zone), WaitState::Done);
        zone.state = STATE_CREATE_FAILED.into();
        assert!(matches!(classify(&zone), WaitState::Failed(_)));
    }
}
