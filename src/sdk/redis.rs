//! Redis instance API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ApiError, HttpClient};
use crate::wait::WaitState;

pub const OPERATION_CREATE: &str = "create";
pub const OPERATION_UPDATE: &str = "update";
pub const OPERATION_DELETE: &str = "delete";

const STATE_SUCCEEDED: &str = "succeeded";
const STATE_FAILED: &str = "failed";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Offering {
    pub name: String,
    pub version: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<bool>,
    pub plans: Vec<Plan>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListOfferingsResponse {
    pub offerings: Vec<Offering>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LastOperation {
    #[serde(rename = "type")]
    pub operation_type: String,
    pub state: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_monitoring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_frequency: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring_instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sgw_acl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syslog: Option<Vec<String>>,
}

impl InstanceParameters {
    pub fn is_empty(&self) -> bool {
        self == &InstanceParameters::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Instance {
    #[serde(rename = "instanceId")]
    pub id: String,
    pub name: String,
    pub plan_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_operation: Option<LastOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<InstanceParameters>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListInstancesResponse {
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstancePayload {
    pub instance_name: String,
    pub plan_id: String,
    #[serde(skip_serializing_if = "InstanceParameters::is_empty")]
    pub parameters: InstanceParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateInstanceRequest {
    pub project_id: String,
    pub payload: CreateInstancePayload,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateInstanceResponse {
    pub instance_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialUpdateInstancePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(skip_serializing_if = "InstanceParameters::is_empty")]
    pub parameters: InstanceParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialUpdateInstanceRequest {
    pub project_id: String,
    pub instance_id: String,
    pub payload: PartialUpdateInstancePayload,
}

#[async_trait(?Send)]
pub trait RedisApi {
    async fn list_offerings(&self, project_id: &str) -> Result<ListOfferingsResponse, ApiError>;
    async fn list_instances(&self, project_id: &str) -> Result<ListInstancesResponse, ApiError>;
    async fn get_instance(&self, project_id: &str, instance_id: &str)
        -> Result<Instance, ApiError>;
    async fn create_instance(
        &self,
        request: &CreateInstanceRequest,
    ) -> Result<CreateInstanceResponse, ApiError>;
    async fn partial_update_instance(
        &self,
        request: &PartialUpdateInstanceRequest,
    ) -> Result<(), ApiError>;
    async fn delete_instance(&self, project_id: &str, instance_id: &str) -> Result<(), ApiError>;
}

/// Wait classifier for the last operation of an instance.
pub fn instance_state(operation: &'static str) -> impl Fn(&Instance) -> WaitState {
    move |instance| match &instance.last_operation {
        Some(last) if last.operation_type == operation => match last.state.as_str() {
            STATE_SUCCEEDED => WaitState::Done,
            STATE_FAILED => WaitState::Failed(if last.description.is_empty() {
                format!("{operation} operation failed")
            } else {
                last.description.clone()
            }),
            _ => WaitState::Pending,
        },
        _ => WaitState::Pending,
    }
}

/// Wait classifier for deletion: an instance that is gone is deleted.
pub fn deleted_state(instance: &Option<Instance>) -> WaitState {
    match instance {
        None => WaitState::Done,
        Some(instance) => instance_state(OPERATION_DELETE)(instance),
    }
}

pub struct HttpRedisClient {
    http: HttpClient,
}

impl HttpRedisClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait(?Send)]
impl RedisApi for HttpRedisClient {
    async fn list_offerings(&self, project_id: &str) -> Result<ListOfferingsResponse, ApiError> {
        self.http
            .get(&["v1", "projects", project_id, "offerings"])
            .await
    }

    async fn list_instances(&self, project_id: &str) -> Result<ListInstancesResponse, ApiError> {
        self.http
            .get(&["v1", "projects", project_id, "instances"])
            .await
    }

    async fn get_instance(
        &self,
        project_id: &str,
        instance_id: &str,
    ) -> Result<Instance, ApiError> {
        self.http
            .get(&["v1", "projects", project_id, "instances", instance_id])
            .await
    }

    async fn create_instance(
        &self,
        request: &CreateInstanceRequest,
    ) -> Result<CreateInstanceResponse, ApiError> {
        self.http
            .post(
                &["v1", "projects", &request.project_id, "instances"],
                &request.payload,
            )
            .await
    }

    async fn partial_update_instance(
        &self,
        request: &PartialUpdateInstanceRequest,
    ) -> Result<(), ApiError> {
        let _: serde::de::IgnoredAny = self
            .http
            .patch(
                &[
                    "v1",
                    "projects",
                    &request.project_id,
                    "instances",
                    &request.instance_id,
                ],
                &request.payload,
            )
            .await?;
        Ok(())
    }

    async fn delete_instance(&self, project_id: &str, instance_id: &str) -> Result<(), ApiError> {
        self.http
            .delete(&["v1", "projects", project_id, "instances", instance_id])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(operation: &str, state: &str) -> Instance {
        Instance {
            id: "i1".into(),
            last_operation: Some(LastOperation {
                operation_type: operation.into(),
                state: state.into(),
                description: String::new(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn instance_state_follows_the_matching_operation() {
        let classify = instance_state(OPERATION_CREATE);
        assert_eq!(classify(&instance("create", "in progress")), WaitState::Pending);
        assert_eq!(classify(&instance("create", "succeeded")), WaitState::Done);
        assert_eq!(classify(&instance("update", "succeeded")), WaitState::Pending);
        assert_eq!(
            classify(&instance("create", "failed")),
            WaitState::Failed("create operation failed".into())
        );
    }

    #[test]
    fn missing_instance_counts_as_deleted() {
        assert_eq!(deleted_state(&None), WaitState::Done);
        assert_eq!(
            deleted_state(&Some(instance("delete", "in progress"))),
            WaitState::Pending
        );
    }

    #[test]
    fn create_payload_skips_empty_parameters() {
        let payload = CreateInstancePayload {
            instance_name: "db".into(),
            plan_id: "p1".into(),
            parameters: InstanceParameters::default(),
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"instanceName":"db","planId":"p1"}"#
        );

        let payload = PartialUpdateInstancePayload {
            plan_id: None,
            parameters: InstanceParameters {
                sgw_acl: Some("1.2.3.0/24".into()),
                ..Default::default()
            },
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"parameters":{"sgwAcl":"1.2.3.0/24"}}"#
        );
    }

    #[test]
    fn create_response_reads_the_instance_id() {
        let response: CreateInstanceResponse =
            serde_json::from_str(r#"{"instanceId":"X"}"#).unwrap();
        assert_eq!(response.instance_id, "X");
    }
}
