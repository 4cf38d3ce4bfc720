//! In-memory service clients for tests.
//!
//! Each fake shares its state through `Rc<RefCell<_>>`, so a test keeps a
//! handle after the factory boxed a clone for the command, then inspects the
//! recorded calls.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{
    dns::{
        CreateZoneRequest, DnsApi, ListZonesRequest, ListZonesResponse, PartialUpdateZoneRequest,
        Zone,
    },
    iaas::{
        CreatePublicIpRequest, IaasApi, ListPublicIpsRequest, ListPublicIpsResponse, PublicIp,
        UpdatePublicIpRequest,
    },
    redis::{
        CreateInstanceRequest, CreateInstanceResponse, Instance, LastOperation, RedisApi,
        ListInstancesResponse, ListOfferingsResponse, Offering, PartialUpdateInstanceRequest,
    },
    service_account::{CreateKeyRequest, ListKeysResponse, ServiceAccountApi, ServiceAccountKey},
    ApiError, ClientFactory,
};
use crate::error::CliError;

#[derive(Debug, Default)]
pub struct DnsState {
    pub zones: Vec<Zone>,
    pub calls: Vec<String>,
    pub list_requests: Vec<ListZonesRequest>,
    pub created: Option<CreateZoneRequest>,
    pub updated: Option<PartialUpdateZoneRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeDns(pub Rc<RefCell<DnsState>>);

impl FakeDns {
    pub fn with_zones(zones: Vec<Zone>) -> Self {
        let fake = Self::default();
        fake.0.borrow_mut().zones = zones;
        fake
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.borrow().calls.clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.0.borrow_mut().calls.push(call.into());
    }
}

#[async_trait(?Send)]
impl DnsApi for FakeDns {
    async fn list_zones(&self, request: &ListZonesRequest) -> Result<ListZonesResponse, ApiError> {
        self.record(format!("list_zones page={}", request.page));
        let mut state = self.0.borrow_mut();
        state.list_requests.push(request.clone());
        let size = request.page_size.max(1) as usize;
        let start = (request.page.max(1) as usize - 1) * size;
        let zones = state.zones.iter().skip(start).take(size).cloned().collect();
        Ok(ListZonesResponse {
            zones,
            total_pages: None,
        })
    }

    async fn get_zone(&self, _project_id: &str, zone_id: &str) -> Result<Zone, ApiError> {
        self.record(format!("get_zone {zone_id}"));
        self.0
            .borrow()
            .zones
            .iter()
            .find(|zone| zone.id == zone_id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_zone(&self, request: &CreateZoneRequest) -> Result<Zone, ApiError> {
        self.record("create_zone");
        let zone = Zone {
            id: "new-zone".into(),
            name: request.payload.name.clone(),
            dns_name: request.payload.dns_name.clone(),
            state: "CREATE_SUCCEEDED".into(),
            ..Default::default()
        };
        let mut state = self.0.borrow_mut();
        state.created = Some(request.clone());
        state.zones.push(zone.clone());
        Ok(zone)
    }

    async fn partial_update_zone(
        &self,
        request: &PartialUpdateZoneRequest,
    ) -> Result<Zone, ApiError> {
        self.record(format!("partial_update_zone {}", request.zone_id));
        let mut state = self.0.borrow_mut();
        state.updated = Some(request.clone());
        let zone = state
            .zones
            .iter_mut()
            .find(|zone| zone.id == request.zone_id)
            .ok_or(ApiError::NotFound)?;
        zone.state = "UPDATE_SUCCEEDED".into();
        Ok(zone.clone())
    }

    async fn delete_zone(&self, _project_id: &str, zone_id: &str) -> Result<(), ApiError> {
        self.record(format!("delete_zone {zone_id}"));
        let mut state = self.0.borrow_mut();
        let zone = state
            .zones
            .iter_mut()
            .find(|zone| zone.id == zone_id)
            .ok_or(ApiError::NotFound)?;
        zone.state = "DELETE_SUCCEEDED".into();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RedisState {
    pub offerings: Vec<Offering>,
    pub instances: Vec<Instance>,
    pub calls: Vec<String>,
    pub created: Option<CreateInstanceRequest>,
    pub updated: Option<PartialUpdateInstanceRequest>,
    pub created_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct FakeRedis(pub Rc<RefCell<RedisState>>);

impl FakeRedis {
    pub fn with_offerings(offerings: Vec<Offering>) -> Self {
        let fake = Self::default();
        {
            let mut state = fake.0.borrow_mut();
            state.offerings = offerings;
            state.created_id = "X".into();
        }
        fake
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.borrow().calls.clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.0.borrow_mut().calls.push(call.into());
    }
}

fn succeeded(operation: &str) -> Option<LastOperation> {
    Some(LastOperation {
        operation_type: operation.into(),
        state: "succeeded".into(),
        description: String::new(),
    })
}

#[async_trait(?Send)]
impl RedisApi for FakeRedis {
    async fn list_offerings(&self, _project_id: &str) -> Result<ListOfferingsResponse, ApiError> {
        self.record("list_offerings");
        Ok(ListOfferingsResponse {
            offerings: self.0.borrow().offerings.clone(),
        })
    }

    async fn list_instances(&self, _project_id: &str) -> Result<ListInstancesResponse, ApiError> {
        self.record("list_instances");
        Ok(ListInstancesResponse {
            instances: self.0.borrow().instances.clone(),
        })
    }

    async fn get_instance(
        &self,
        _project_id: &str,
        instance_id: &str,
    ) -> Result<Instance, ApiError> {
        self.record(format!("get_instance {instance_id}"));
        self.0
            .borrow()
            .instances
            .iter()
            .find(|instance| instance.id == instance_id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_instance(
        &self,
        request: &CreateInstanceRequest,
    ) -> Result<CreateInstanceResponse, ApiError> {
        self.record("create_instance");
        let mut state = self.0.borrow_mut();
        let instance_id = state.created_id.clone();
        state.created = Some(request.clone());
        state.instances.push(Instance {
            id: instance_id.clone(),
            name: request.payload.instance_name.clone(),
            plan_id: request.payload.plan_id.clone(),
            last_operation: succeeded("create"),
            ..Default::default()
        });
        Ok(CreateInstanceResponse { instance_id })
    }

    async fn partial_update_instance(
        &self,
        request: &PartialUpdateInstanceRequest,
    ) -> Result<(), ApiError> {
        self.record(format!("partial_update_instance {}", request.instance_id));
        let mut state = self.0.borrow_mut();
        state.updated = Some(request.clone());
        if let Some(instance) = state
            .instances
            .iter_mut()
            .find(|instance| instance.id == request.instance_id)
        {
            instance.last_operation = succeeded("update");
        }
        Ok(())
    }

    async fn delete_instance(&self, _project_id: &str, instance_id: &str) -> Result<(), ApiError> {
        self.record(format!("delete_instance {instance_id}"));
        self.0
            .borrow_mut()
            .instances
            .retain(|instance| instance.id != instance_id);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct IaasState {
    pub public_ips: Vec<PublicIp>,
    pub calls: Vec<String>,
    pub list_requests: Vec<ListPublicIpsRequest>,
    pub created: Option<CreatePublicIpRequest>,
    pub updated: Option<UpdatePublicIpRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeIaas(pub Rc<RefCell<IaasState>>);

impl FakeIaas {
    pub fn with_public_ips(public_ips: Vec<PublicIp>) -> Self {
        let fake = Self::default();
        fake.0.borrow_mut().public_ips = public_ips;
        fake
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.borrow().calls.clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.0.borrow_mut().calls.push(call.into());
    }
}

#[async_trait(?Send)]
impl IaasApi for FakeIaas {
    async fn list_public_ips(
        &self,
        request: &ListPublicIpsRequest,
    ) -> Result<ListPublicIpsResponse, ApiError> {
        self.record("list_public_ips");
        let mut state = self.0.borrow_mut();
        state.list_requests.push(request.clone());
        Ok(ListPublicIpsResponse {
            items: state.public_ips.clone(),
        })
    }

    async fn get_public_ip(
        &self,
        _project_id: &str,
        public_ip_id: &str,
    ) -> Result<PublicIp, ApiError> {
        self.record(format!("get_public_ip {public_ip_id}"));
        self.0
            .borrow()
            .public_ips
            .iter()
            .find(|ip| ip.id == public_ip_id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_public_ip(
        &self,
        request: &CreatePublicIpRequest,
    ) -> Result<PublicIp, ApiError> {
        self.record("create_public_ip");
        let public_ip = PublicIp {
            id: "new-ip".into(),
            ip: "198.51.100.10".into(),
            network_interface: request.payload.network_interface.clone(),
            labels: request.payload.labels.clone(),
        };
        let mut state = self.0.borrow_mut();
        state.created = Some(request.clone());
        state.public_ips.push(public_ip.clone());
        Ok(public_ip)
    }

    async fn update_public_ip(
        &self,
        request: &UpdatePublicIpRequest,
    ) -> Result<PublicIp, ApiError> {
        self.record(format!("update_public_ip {}", request.public_ip_id));
        let mut state = self.0.borrow_mut();
        state.updated = Some(request.clone());
        let public_ip = state
            .public_ips
            .iter_mut()
            .find(|ip| ip.id == request.public_ip_id)
            .ok_or(ApiError::NotFound)?;
        if let Some(network_interface) = &request.payload.network_interface {
            public_ip.network_interface = network_interface.clone();
        }
        if let Some(labels) = &request.payload.labels {
            public_ip.labels = Some(labels.clone());
        }
        Ok(public_ip.clone())
    }

    async fn delete_public_ip(
        &self,
        _project_id: &str,
        public_ip_id: &str,
    ) -> Result<(), ApiError> {
        self.record(format!("delete_public_ip {public_ip_id}"));
        self.0
            .borrow_mut()
            .public_ips
            .retain(|ip| ip.id != public_ip_id);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ServiceAccountState {
    pub keys: Vec<ServiceAccountKey>,
    pub calls: Vec<String>,
    pub created: Option<CreateKeyRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeServiceAccount(pub Rc<RefCell<ServiceAccountState>>);

impl FakeServiceAccount {
    pub fn with_keys(keys: Vec<ServiceAccountKey>) -> Self {
        let fake = Self::default();
        fake.0.borrow_mut().keys = keys;
        fake
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.borrow().calls.clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.0.borrow_mut().calls.push(call.into());
    }
}

#[async_trait(?Send)]
impl ServiceAccountApi for FakeServiceAccount {
    async fn list_keys(
        &self,
        _project_id: &str,
        email: &str,
    ) -> Result<ListKeysResponse, ApiError> {
        self.record(format!("list_keys {email}"));
        Ok(ListKeysResponse {
            items: self.0.borrow().keys.clone(),
        })
    }

    async fn get_key(
        &self,
        _project_id: &str,
        _email: &str,
        key_id: &str,
    ) -> Result<ServiceAccountKey, ApiError> {
        self.record(format!("get_key {key_id}"));
        self.0
            .borrow()
            .keys
            .iter()
            .find(|key| key.id == key_id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_key(&self, request: &CreateKeyRequest) -> Result<Value, ApiError> {
        self.record("create_key");
        self.0.borrow_mut().created = Some(request.clone());
        Ok(json!({
            "id": "new-key",
            "active": true,
            "validUntil": request.payload.valid_until,
        }))
    }

    async fn delete_key(
        &self,
        _project_id: &str,
        _email: &str,
        key_id: &str,
    ) -> Result<(), ApiError> {
        self.record(format!("delete_key {key_id}"));
        self.0.borrow_mut().keys.retain(|key| key.id != key_id);
        Ok(())
    }
}

/// Factory handing out clones of the fakes it holds.
#[derive(Debug, Clone, Default)]
pub struct FakeClients {
    pub dns: FakeDns,
    pub redis: FakeRedis,
    pub iaas: FakeIaas,
    pub service_account: FakeServiceAccount,
}

impl ClientFactory for FakeClients {
    fn dns(&self) -> Result<Box<dyn DnsApi>, CliError> {
        Ok(Box::new(self.dns.clone()))
    }

    fn redis(&self) -> Result<Box<dyn RedisApi>, CliError> {
        Ok(Box::new(self.redis.clone()))
    }

    fn iaas(&self) -> Result<Box<dyn IaasApi>, CliError> {
        Ok(Box::new(self.iaas.clone()))
    }

    fn service_account(&self) -> Result<Box<dyn ServiceAccountApi>, CliError> {
        Ok(Box::new(self.service_account.clone()))
    }
}
