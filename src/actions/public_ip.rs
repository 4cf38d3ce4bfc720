//! `nimbus public-ip` executors.
//!
//! Public IP operations complete synchronously, so none of these commands
//! waits.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{cell, single_arg};
use crate::{
    commands::params::{
        PARAMETER_ASSOCIATED_RESOURCE_ID, PARAMETER_LABELS, PARAMETER_LABEL_SELECTOR,
        PARAMETER_LIMIT,
    },
    context::ExecutionContext,
    error::CliError,
    executor::{confirm, label_or_id, truncate},
    flags::Flags,
    globalflags::GlobalOptions,
    sdk::iaas::{
        CreatePublicIpPayload, CreatePublicIpRequest, IaasApi, ListPublicIpsRequest, PublicIp,
        UpdatePublicIpPayload, UpdatePublicIpRequest,
    },
    tables::Table,
};

fn labels_cell(labels: &Option<BTreeMap<String, String>>) -> String {
    labels
        .as_ref()
        .map(|labels| {
            labels
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default()
}

/// Input of the commands addressing one public IP.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicIpInput {
    #[serde(flatten)]
    pub globals: GlobalOptions,
    pub public_ip_id: String,
    pub associated_resource_id: Option<String>,
    pub labels: Option<BTreeMap<String, String>>,
}

pub fn parse_public_ip_input(
    ctx: &mut ExecutionContext,
    flags: &Flags<'_>,
) -> Result<PublicIpInput, CliError> {
    let globals = ctx.globals.clone();
    globals.require_project_id()?;
    let model = PublicIpInput {
        globals,
        public_ip_id: single_arg(flags),
        associated_resource_id: flags
            .uuid(PARAMETER_ASSOCIATED_RESOURCE_ID)?
            .map(|id| id.to_string()),
        labels: flags.string_map(PARAMETER_LABELS)?,
    };
    ctx.printer.debug_input_model(&model);
    Ok(model)
}

async fn lookup_ip_address(
    ctx: &mut ExecutionContext,
    api: &dyn IaasApi,
    project_id: &str,
    public_ip_id: &str,
) -> String {
    label_or_id(ctx, "get public IP", public_ip_id, async {
        api.get_public_ip(project_id, public_ip_id)
            .await
            .map(|public_ip| public_ip.ip)
    })
    .await
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateInput {
    #[serde(flatten)]
    pub globals: GlobalOptions,
    pub associated_resource_id: Option<String>,
    pub labels: Option<BTreeMap<String, String>>,
}

pub fn parse_create_input(
    ctx: &mut ExecutionContext,
    flags: &Flags<'_>,
) -> Result<CreateInput, CliError> {
    let globals = ctx.globals.clone();
    globals.require_project_id()?;
    let model = CreateInput {
        globals,
        associated_resource_id: flags
            .uuid(PARAMETER_ASSOCIATED_RESOURCE_ID)?
            .map(|id| id.to_string()),
        labels: flags.string_map(PARAMETER_LABELS)?,
    };
    ctx.printer.debug_input_model(&model);
    Ok(model)
}

pub fn build_create_request(model: &CreateInput) -> CreatePublicIpRequest {
    CreatePublicIpRequest {
        project_id: model.globals.project_id.clone(),
        payload: CreatePublicIpPayload {
            network_interface: model.associated_resource_id.clone(),
            labels: model.labels.clone(),
        },
    }
}

pub async fn create(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_create_input(ctx, &flags)?;
    let client = ctx.clients.iaas()?;
    let project_label = model.globals.project_id.clone();

    let request = build_create_request(&model);
    confirm(
        ctx,
        &format!("Are you sure you want to create a public IP for project \"{project_label}\"?"),
    )?;

    let public_ip = ctx
        .call("create public IP", client.create_public_ip(&request))
        .await?;

    let format = ctx.printer.output_format();
    ctx.printer.output_result(format, &public_ip, |p| {
        p.outputln(format!(
            "Created public IP for project \"{project_label}\". Public IP ID: {}",
            public_ip.id
        ))
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListInput {
    #[serde(flatten)]
    pub globals: GlobalOptions,
    pub label_selector: Option<String>,
    pub limit: Option<i64>,
}

pub fn parse_list_input(ctx: &mut ExecutionContext, flags: &Flags<'_>) -> Result<ListInput, CliError> {
    let globals = ctx.globals.clone();
    globals.require_project_id()?;
    let model = ListInput {
        globals,
        label_selector: flags.optional_string(PARAMETER_LABEL_SELECTOR),
        limit: flags.positive(PARAMETER_LIMIT)?,
    };
    ctx.printer.debug_input_model(&model);
    Ok(model)
}

pub async fn list(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_list_input(ctx, &flags)?;
    let client = ctx.clients.iaas()?;
    let request = ListPublicIpsRequest {
        project_id: model.globals.project_id.clone(),
        label_selector: model.label_selector.clone(),
    };
    let response = ctx
        .call("list public IPs", client.list_public_ips(&request))
        .await?;
    let mut public_ips = response.items;
    truncate(&mut public_ips, model.limit);

    let format = ctx.printer.output_format();
    if public_ips.is_empty() && !format.is_structured() {
        return ctx.printer.outputln(format!(
            "No public IPs found for project \"{}\"",
            model.globals.project_id
        ));
    }
    ctx.printer.output_result(format, &public_ips, |p| {
        let mut table = Table::new();
        table.set_header(["ID", "IP ADDRESS", "USED BY"]);
        for public_ip in &public_ips {
            table.add_row([
                public_ip.id.clone(),
                public_ip.ip.clone(),
                cell(&public_ip.network_interface),
            ]);
        }
        table.display(p)
    })
}

pub async fn describe(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_public_ip_input(ctx, &flags)?;
    let client = ctx.clients.iaas()?;
    let public_ip = ctx
        .call(
            "read public IP",
            client.get_public_ip(&model.globals.project_id, &model.public_ip_id),
        )
        .await?;

    let format = ctx.printer.output_format();
    ctx.printer
        .output_result(format, &public_ip, |p| public_ip_details(&public_ip).display(p))
}

fn public_ip_details(public_ip: &PublicIp) -> Table {
    let mut table = Table::new();
    table.add_row(["ID".to_string(), public_ip.id.clone()]);
    table.add_separator();
    table.add_row(["IP ADDRESS".to_string(), public_ip.ip.clone()]);
    table.add_separator();
    table.add_row(["USED BY".to_string(), cell(&public_ip.network_interface)]);
    table.add_separator();
    table.add_row(["LABELS".to_string(), labels_cell(&public_ip.labels)]);
    table
}

pub fn build_update_request(
    model: &PublicIpInput,
    network_interface: Option<Option<String>>,
    labels: Option<BTreeMap<String, String>>,
) -> UpdatePublicIpRequest {
    UpdatePublicIpRequest {
        project_id: model.globals.project_id.clone(),
        public_ip_id: model.public_ip_id.clone(),
        payload: UpdatePublicIpPayload {
            network_interface,
            labels,
        },
    }
}

/// Shared flow of update, associate and disassociate.
async fn change(
    ctx: &mut ExecutionContext,
    model: &PublicIpInput,
    request: UpdatePublicIpRequest,
    prompt: impl FnOnce(&str) -> String,
    done: impl FnOnce(&str) -> String,
) -> Result<(), CliError> {
    let client = ctx.clients.iaas()?;
    let api = client.as_ref();
    let label = lookup_ip_address(ctx, api, &model.globals.project_id, &model.public_ip_id).await;

    confirm(ctx, &prompt(&label))?;
    ctx.call("update public IP", api.update_public_ip(&request))
        .await?;

    ctx.printer.info(done(&label));
    Ok(())
}

pub async fn update(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_public_ip_input(ctx, &flags)?;
    if model.labels.is_none() {
        return Err(CliError::EmptyUpdate);
    }
    let request = build_update_request(&model, None, model.labels.clone());
    change(
        ctx,
        &model,
        request,
        |label| format!("Are you sure you want to update public IP \"{label}\"?"),
        |label| format!("Updated public IP \"{label}\""),
    )
    .await
}

pub async fn associate(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_public_ip_input(ctx, &flags)?;
    let resource_id = model.associated_resource_id.clone().unwrap_or_default();
    let request = build_update_request(&model, Some(Some(resource_id.clone())), None);
    change(
        ctx,
        &model,
        request,
        |label| {
            format!(
                "Are you sure you want to associate public IP \"{label}\" with resource \"{resource_id}\"?"
            )
        },
        |label| format!("Associated public IP \"{label}\" with resource \"{resource_id}\""),
    )
    .await
}

pub async fn disassociate(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_public_ip_input(ctx, &flags)?;
    let request = build_update_request(&model, Some(None), None);
    change(
        ctx,
        &model,
        request,
        |label| {
            format!(
                "Are you sure you want to disassociate public IP \"{label}\" from the associated resource?"
            )
        },
        |label| format!("Disassociated public IP \"{label}\" from the associated resource"),
    )
    .await
}

pub async fn delete(ctx: &mut ExecutionContext, flags: Flags<'_>) -> Result<(), CliError> {
    let model = parse_public_ip_input(ctx, &flags)?;
    let client = ctx.clients.iaas()?;
    let api = client.as_ref();
    let project_id = model.globals.project_id.as_str();
    let public_ip_id = model.public_ip_id.as_str();

    let label = lookup_ip_address(ctx, api, project_id, public_ip_id).await;
    confirm(
        ctx,
        &format!("Are you sure you want to delete public IP \"{label}\"? (This cannot be undone)"),
    )?;

    ctx.call("delete public IP", api.delete_public_ip(project_id, public_ip_id))
        .await?;

    ctx.printer.info(format!("Deleted public IP \"{label}\""));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::{ID_A, ID_B, UNKNOWN_ID};
    use crate::cli::testing::{argv_from_model, invoke, parse_leaf};
    use crate::sdk::fake::{FakeClients, FakeIaas};

    fn public_ip(id: &str, ip: &str, network_interface: Option<&str>) -> PublicIp {
        PublicIp {
            id: id.into(),
            ip: ip.into(),
            network_interface: network_interface.map(str::to_string),
            labels: None,
        }
    }

    fn clients() -> FakeClients {
        FakeClients {
            iaas: FakeIaas::with_public_ips(vec![
                public_ip(ID_A, "203.0.113.7", Some(ID_B)),
                public_ip(ID_B, "203.0.113.8", None),
            ]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_prints_the_new_id() {
        let clients = clients();
        let outcome = invoke(
            &clients,
            "",
            &[
                "public-ip", "create", "--project-id", "P", "--labels", "env=prod,team=db",
                "--associated-resource-id", ID_B, "-y",
            ],
        )
        .await;
        assert!(outcome.result.is_ok(), "{:?}", outcome.result);
        assert_eq!(
            outcome.stdout(),
            "Created public IP for project \"P\". Public IP ID: new-ip\n"
        );
        let created = clients.iaas.0.borrow().created.clone().unwrap();
        assert_eq!(created.payload.network_interface.as_deref(), Some(ID_B));
        let labels = created.payload.labels.unwrap();
        assert_eq!(labels.get("team").map(String::as_str), Some("db"));
    }

    #[tokio::test]
    async fn create_prints_the_resource_in_yaml() {
        let outcome = invoke(
            &clients(),
            "",
            &["public-ip", "create", "--project-id", "P", "-y", "--output-format", "yaml"],
        )
        .await;
        assert!(outcome.result.is_ok());
        assert!(outcome.stdout().contains("id: new-ip"));
        assert!(outcome.stdout().contains("198.51.100.10"));
    }

    #[tokio::test]
    async fn list_shows_the_attached_interface() {
        let clients = clients();
        let outcome = invoke(
            &clients,
            "",
            &["public-ip", "list", "--project-id", "P", "--label-selector", "env=prod"],
        )
        .await;
        assert!(outcome.result.is_ok());
        let stdout = outcome.stdout();
        assert!(stdout.contains("IP ADDRESS"));
        assert!(stdout.contains("203.0.113.8"));
        assert_eq!(
            clients.iaas.0.borrow().list_requests[0].label_selector.as_deref(),
            Some("env=prod")
        );
    }

    #[tokio::test]
    async fn empty_list_prints_a_message() {
        let outcome = invoke(
            &FakeClients::default(),
            "",
            &["public-ip", "list", "--project-id", "P"],
        )
        .await;
        assert_eq!(outcome.stdout(), "No public IPs found for project \"P\"\n");
    }

    #[tokio::test]
    async fn update_requires_labels() {
        let outcome = invoke(
            &clients(),
            "",
            &["public-ip", "update", ID_A, "--project-id", "P"],
        )
        .await;
        assert!(matches!(outcome.result, Err(CliError::EmptyUpdate)));
    }

    #[tokio::test]
    async fn update_prompts_with_the_address() {
        let clients = clients();
        let outcome = invoke(
            &clients,
            "y\n",
            &["public-ip", "update", ID_A, "--project-id", "P", "--labels", "env=dev"],
        )
        .await;
        assert!(outcome.result.is_ok(), "{:?}", outcome.result);
        assert_eq!(
            outcome.stdout(),
            "Are you sure you want to update public IP \"203.0.113.7\"? [y/N] "
        );
        assert_eq!(outcome.stderr(), "Updated public IP \"203.0.113.7\"\n");
        let updated = clients.iaas.0.borrow().updated.clone().unwrap();
        assert_eq!(updated.payload.network_interface, None);
    }

    #[tokio::test]
    async fn associate_sets_the_interface() {
        let clients = clients();
        let outcome = invoke(
            &clients,
            "",
            &[
                "public-ip", "associate", ID_B, "--project-id", "P", "--associated-resource-id",
                ID_A, "-y",
            ],
        )
        .await;
        assert!(outcome.result.is_ok(), "{:?}", outcome.result);
        assert_eq!(
            outcome.stderr(),
            format!("Associated public IP \"203.0.113.8\" with resource \"{ID_A}\"\n")
        );
        assert_eq!(
            clients.iaas.0.borrow().public_ips[1].network_interface.as_deref(),
            Some(ID_A)
        );
    }

    #[tokio::test]
    async fn associate_requires_a_resource() {
        let outcome = invoke(
            &clients(),
            "",
            &["public-ip", "associate", ID_B, "--project-id", "P"],
        )
        .await;
        assert!(matches!(outcome.result, Err(CliError::MissingRequiredFlags { .. })));
    }

    #[tokio::test]
    async fn disassociate_sends_an_explicit_null() {
        let clients = clients();
        let outcome = invoke(
            &clients,
            "",
            &["public-ip", "disassociate", ID_A, "--project-id", "P", "-y"],
        )
        .await;
        assert!(outcome.result.is_ok(), "{:?}", outcome.result);
        let updated = clients.iaas.0.borrow().updated.clone().unwrap();
        assert_eq!(updated.payload.network_interface, Some(None));
        assert_eq!(
            serde_json::to_string(&updated.payload).unwrap(),
            r#"{"networkInterface":null}"#
        );
        assert_eq!(clients.iaas.0.borrow().public_ips[0].network_interface, None);
    }

    #[tokio::test]
    async fn delete_removes_the_address() {
        let clients = clients();
        let outcome = invoke(
            &clients,
            "",
            &["public-ip", "delete", ID_B, "--project-id", "P", "-y"],
        )
        .await;
        assert!(outcome.result.is_ok(), "{:?}", outcome.result);
        assert_eq!(outcome.stderr(), "Deleted public IP \"203.0.113.8\"\n");
        assert_eq!(clients.iaas.0.borrow().public_ips.len(), 1);
    }

    #[tokio::test]
    async fn describe_unknown_address_fails() {
        let outcome = invoke(
            &clients(),
            "",
            &["public-ip", "describe", UNKNOWN_ID, "--project-id", "P"],
        )
        .await;
        assert_eq!(
            outcome.stderr(),
            "error: read public IP: resource not found\n"
        );
    }

    #[test]
    fn labels_render_as_pairs() {
        let mut labels = BTreeMap::new();
        labels.insert("b".to_string(), "2".to_string());
        labels.insert("a".to_string(), "1".to_string());
        assert_eq!(labels_cell(&Some(labels)), "a=1,b=2");
        assert_eq!(labels_cell(&None), "");
    }

    #[test]
    fn parsed_create_input_survives_a_reparse() {
        let args: Vec<String> = [
            "public-ip", "create", "--project-id", "P", "--associated-resource-id", ID_A,
            "--labels", "env=dev,team=net", "--labels", "env=prod",
        ]
        .iter()
        .map(|word| word.to_string())
        .collect();
        let first = parse_leaf(&args, parse_create_input);
        assert_eq!(
            first.labels.as_ref().and_then(|labels| labels.get("env")).map(String::as_str),
            Some("prod")
        );

        let replayed = argv_from_model(&["public-ip", "create"], &first, &[]);
        let second = parse_leaf(&replayed, parse_create_input);
        assert_eq!(first, second);
    }
}
