use crate::{
    client::KubeClient,
    core::{graph::PolicyAnnotator, graph::ServiceNode, Inventory, LabelConfig},
    k8s::Selector,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::{io, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[clap(
    name = "mesh-inventory",
    about = "Inspects the workloads of a namespace and the mesh policies that apply to them"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "mesh_inventory=info,warn",
        env = "MESH_INVENTORY_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    /// The pod label that names a workload's service.
    #[clap(
        long,
        default_value = mesh_inventory_core::DEFAULT_SERVICE_LABEL,
        env = "MESH_INVENTORY_SERVICE_LABEL"
    )]
    service_label: String,

    /// The pod label that names a workload's version.
    #[clap(
        long,
        default_value = mesh_inventory_core::DEFAULT_VERSION_LABEL,
        env = "MESH_INVENTORY_VERSION_LABEL"
    )]
    version_label: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lists the cluster's namespaces.
    Namespaces,

    /// Lists the services, pods and deployments in a namespace.
    Services {
        #[clap(long, short = 'n')]
        namespace: String,
    },

    /// Describes a service: its endpoints, pods, deployments and autoscalers.
    Service {
        #[clap(long, short = 'n')]
        namespace: String,

        name: String,
    },

    /// Lists pods, either by selector or as the instances of a service.
    Pods {
        #[clap(long, short = 'n')]
        namespace: String,

        /// Selects pods by label, e.g. `app=reviews,version=v1`.
        #[clap(long, short = 'l', value_parser = parse_selector, conflicts_with = "service")]
        selector: Option<Selector>,

        #[clap(long, required_unless_present = "selector")]
        service: Option<String>,

        /// Narrows a service's pods to a single version.
        #[clap(long, requires = "service", default_value = "")]
        version: String,
    },

    /// Flags the nodes of a service graph that are subject to circuit breakers or route rules.
    ///
    /// The graph is read as a JSON array of service trees and written back out annotated.
    Annotate {
        #[clap(long, short = 'n')]
        namespace: String,

        /// Reads the graph from a file instead of stdin.
        #[clap(long)]
        graph: Option<PathBuf>,
    },
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            service_label,
            version_label,
            command,
        } = self;

        log_format
            .try_init(log_level)
            .context("failed to initialize logging")?;

        let client = KubeClient::from(client.try_client().await?);
        let labels = LabelConfig {
            service_label,
            version_label,
        };

        match command {
            Command::Namespaces => {
                let inventory = Inventory::new(client, labels);
                print(&inventory.namespaces().await?)
            }

            Command::Services { namespace } => {
                let inventory = Inventory::new(client, labels);
                let (view, error) = inventory.namespace_services(&namespace).await;
                print(&view)?;
                if let Some(error) = error {
                    warn!(%namespace, "Namespace listing is incomplete");
                    return Err(error).context("failed to list namespace");
                }
                Ok(())
            }

            Command::Service { namespace, name } => {
                let inventory = Inventory::new(client, labels);
                let details = inventory
                    .service_details(&namespace, &name)
                    .await
                    .with_context(|| format!("failed to describe service {namespace}/{name}"))?;
                info!(
                    pods = details.pods.len(),
                    deployments = details.deployments.len(),
                    autoscalers = details.deployment_autoscalers().len(),
                    "Described service"
                );
                print(&details)
            }

            Command::Pods {
                namespace,
                selector,
                service,
                version,
            } => {
                let inventory = Inventory::new(client, labels);
                let pods = match (selector, service) {
                    (Some(selector), _) => inventory.pods(&namespace, &selector).await?,
                    (None, Some(service)) => {
                        inventory
                            .service_pods(&namespace, &service, &version)
                            .await?
                    }
                    (None, None) => bail!("either a selector or a service must be specified"),
                };
                print(&pods)
            }

            Command::Annotate { namespace, graph } => {
                let mut trees = read_graph(graph)?;
                PolicyAnnotator::new(client, labels)
                    .annotate(&mut trees, &namespace)
                    .await
                    .context("failed to annotate graph")?;
                print(&trees)
            }
        }
    }
}

fn read_graph(path: Option<PathBuf>) -> Result<Vec<ServiceNode>> {
    let json = match path {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => io::read_to_string(io::stdin()).context("failed to read stdin")?,
    };
    serde_json::from_str(&json).context("invalid service graph")
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    io::Write::write_all(&mut stdout, b"\n")?;
    Ok(())
}

fn parse_selector(s: &str) -> Result<Selector> {
    let mut selector = Selector::default();
    for term in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match term.split_once('=') {
            Some((k, v)) if !k.is_empty() => selector.insert(k.trim(), v.trim()),
            _ => bail!("invalid selector term: {term}"),
        }
    }
    Ok(selector)
}
