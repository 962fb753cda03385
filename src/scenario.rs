//! Scenario configuration and execution.
//!
//! Type-safe YAML structures describing routers, network segments, member
//! devices, an optional planner graph and the scripted actions to run
//! against them, plus the runner that executes a scenario and collects a
//! serializable decision report. This is the demo harness around the core;
//! the core contract itself is purely the in-process API of the other
//! modules.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use color_eyre::eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::error::NetError;
use crate::network::{Device, Network, Resolution};
use crate::planner::{self, Graph};
use crate::router::{Delivery, Packet, Router};

/// Top-level scenario file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// Routers keyed by id.
    #[serde(default)]
    pub routers: BTreeMap<String, RouterConfig>,
    /// Network segments keyed by name.
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
    /// Optional planner input; costs are computed before any action runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphConfig>,
    /// Scripted steps, executed in order.
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// Static configuration for one router.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub interfaces: Vec<InterfaceConfig>,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceConfig {
    pub name: String,
    pub ip: String,
    pub mask: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub destination: String,
    pub next_hop: String,
    pub interface: String,
    pub mask: String,
}

/// One network segment and the devices joining it, in join order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub address: String,
    pub mask: String,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    /// Explicit physical address; omitted means a generated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_address: Option<String>,
}

/// Planner input: a weighted graph and the node to plan from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    pub source: String,
    pub edges: Graph,
}

/// One planner-derived route, installed only if the planner reached `node`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteInstallConfig {
    pub node: String,
    pub destination: String,
    pub next_hop: String,
    pub interface: String,
    pub mask: String,
}

/// One scripted step of the scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Ask a router for a forwarding decision.
    Forward {
        router: String,
        destination_ip: String,
    },
    /// Hand a router a packet and classify local delivery.
    Receive {
        router: String,
        destination_ip: String,
    },
    /// Resolve a peer's physical address on a segment.
    Resolve {
        network: String,
        device: String,
        target_ip: String,
    },
    /// Translate planner costs into static routes on a router.
    ///
    /// Each mapping is installed through the router's normal route
    /// configuration when the planner reached its node, and skipped
    /// otherwise; the planner itself never touches the router.
    InstallRoutes {
        router: String,
        routes: Vec<RouteInstallConfig>,
    },
}

/// Serializable record of what one action produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    Forwarded {
        router: String,
        destination_ip: String,
        next_hop: String,
        iface: String,
    },
    NoRoute {
        router: String,
        destination_ip: String,
    },
    DeliveredLocally {
        router: String,
        destination_ip: String,
        iface: String,
    },
    NotLocal {
        router: String,
        destination_ip: String,
    },
    Resolved {
        network: String,
        device: String,
        target_ip: String,
        physical_address: String,
    },
    NoAnswer {
        network: String,
        device: String,
        target_ip: String,
    },
    RoutesInstalled {
        router: String,
        /// Nodes whose mappings were installed, in mapping order.
        installed: Vec<String>,
        /// Nodes the planner never reached; their mappings are skipped.
        skipped: Vec<String>,
    },
}

/// Address assignment recorded for one device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceAssignment {
    pub device: String,
    pub ip: String,
    pub physical_address: String,
}

/// Full report of a scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Per-network device assignments, in join order.
    pub assignments: BTreeMap<String, Vec<DeviceAssignment>>,
    /// Planner costs, when the scenario supplied a graph.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub costs: Option<BTreeMap<String, i64>>,
    /// One entry per scripted action, in execution order.
    pub outcomes: Vec<ActionOutcome>,
}

/// Load a scenario from a YAML file.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let contents = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read scenario file {:?}", path))?;
    let scenario: Scenario = serde_yaml::from_str(&contents)
        .wrap_err_with(|| format!("failed to parse scenario file {:?}", path))?;
    Ok(scenario)
}

impl Scenario {
    /// Build every router and network, run the planner if a graph was
    /// given, then execute the scripted actions in order.
    ///
    /// Recoverable core outcomes (no route, no resolution answer) land in
    /// the report; configuration mistakes (bad addresses, unknown names)
    /// fail the run.
    pub fn run(&self) -> Result<ScenarioReport> {
        let mut routers: BTreeMap<String, Router> = BTreeMap::new();
        for (id, config) in &self.routers {
            let mut router = Router::new(id.clone());
            for iface in &config.interfaces {
                router
                    .add_interface(&iface.name, &iface.ip, &iface.mask)
                    .wrap_err_with(|| format!("router {}: bad interface {}", id, iface.name))?;
            }
            for route in &config.routes {
                router
                    .configure_route(&route.destination, &route.next_hop, &route.interface, &route.mask)
                    .wrap_err_with(|| format!("router {}: bad route to {}", id, route.destination))?;
            }
            routers.insert(id.clone(), router);
        }

        let mut networks: BTreeMap<String, Network> = BTreeMap::new();
        let mut assignments: BTreeMap<String, Vec<DeviceAssignment>> = BTreeMap::new();
        for (name, config) in &self.networks {
            let mut network = Network::new(&config.address, &config.mask)
                .wrap_err_with(|| format!("bad network {}", name))?;
            let mut assigned = Vec::new();
            for device_config in &config.devices {
                let device = match &device_config.physical_address {
                    Some(physical) => {
                        Device::with_physical_address(&device_config.name, physical.clone())
                    }
                    None => Device::new(&device_config.name),
                };
                let ip = network
                    .assign_address(device)
                    .wrap_err_with(|| format!("network {}: cannot join {}", name, device_config.name))?;
                let physical_address = network
                    .device(&device_config.name)
                    .map(|d| d.physical_address().to_string())
                    .unwrap_or_default();
                assigned.push(DeviceAssignment {
                    device: device_config.name.clone(),
                    ip: ip.to_string(),
                    physical_address,
                });
            }
            networks.insert(name.clone(), network);
            assignments.insert(name.clone(), assigned);
        }

        let costs = match &self.graph {
            Some(graph) => Some(
                planner::compute_shortest_paths(&graph.edges, &graph.source)
                    .wrap_err("shortest-path planning failed")?,
            ),
            None => None,
        };

        let mut outcomes = Vec::new();
        for action in &self.actions {
            outcomes.push(run_action(action, &mut routers, &mut networks, costs.as_ref())?);
        }

        Ok(ScenarioReport {
            assignments,
            costs,
            outcomes,
        })
    }
}

fn run_action(
    action: &Action,
    routers: &mut BTreeMap<String, Router>,
    networks: &mut BTreeMap<String, Network>,
    costs: Option<&BTreeMap<String, i64>>,
) -> Result<ActionOutcome> {
    match action {
        Action::Forward {
            router,
            destination_ip,
        } => {
            let r = routers
                .get(router)
                .ok_or_else(|| eyre!("action references unknown router '{}'", router))?;
            match r.forward(&Packet::to(destination_ip.clone())) {
                Ok(decision) => Ok(ActionOutcome::Forwarded {
                    router: router.clone(),
                    destination_ip: destination_ip.clone(),
                    next_hop: decision.next_hop.to_string(),
                    iface: decision.iface,
                }),
                Err(NetError::NoRouteFound { .. }) => Ok(ActionOutcome::NoRoute {
                    router: router.clone(),
                    destination_ip: destination_ip.clone(),
                }),
                Err(other) => Err(other).wrap_err("forward action failed"),
            }
        }
        Action::Receive {
            router,
            destination_ip,
        } => {
            let r = routers
                .get(router)
                .ok_or_else(|| eyre!("action references unknown router '{}'", router))?;
            match r.receive(&Packet::to(destination_ip.clone()))? {
                Delivery::Local { iface } => Ok(ActionOutcome::DeliveredLocally {
                    router: router.clone(),
                    destination_ip: destination_ip.clone(),
                    iface,
                }),
                Delivery::NotLocal => Ok(ActionOutcome::NotLocal {
                    router: router.clone(),
                    destination_ip: destination_ip.clone(),
                }),
            }
        }
        Action::Resolve {
            network,
            device,
            target_ip,
        } => {
            let segment = networks
                .get_mut(network)
                .ok_or_else(|| eyre!("action references unknown network '{}'", network))?;
            match segment.send_request(device, target_ip)? {
                Resolution::Resolved {
                    physical_address, ..
                } => Ok(ActionOutcome::Resolved {
                    network: network.clone(),
                    device: device.clone(),
                    target_ip: target_ip.clone(),
                    physical_address,
                }),
                Resolution::NoAnswer => Ok(ActionOutcome::NoAnswer {
                    network: network.clone(),
                    device: device.clone(),
                    target_ip: target_ip.clone(),
                }),
            }
        }
        Action::InstallRoutes { router, routes } => {
            let r = routers
                .get_mut(router)
                .ok_or_else(|| eyre!("action references unknown router '{}'", router))?;
            let costs = costs
                .ok_or_else(|| eyre!("install_routes requires a scenario graph"))?;
            let mut installed = Vec::new();
            let mut skipped = Vec::new();
            for route in routes {
                if costs.contains_key(&route.node) {
                    r.configure_route(&route.destination, &route.next_hop, &route.interface, &route.mask)
                        .wrap_err_with(|| {
                            format!("router {}: bad planner route to {}", router, route.destination)
                        })?;
                    log::info!(
                        "router {}: installed planner route {} via {} (node {}, cost {})",
                        router,
                        route.destination,
                        route.next_hop,
                        route.node,
                        costs[&route.node]
                    );
                    installed.push(route.node.clone());
                } else {
                    log::debug!(
                        "router {}: planner never reached {}, skipping route {}",
                        router,
                        route.node,
                        route.destination
                    );
                    skipped.push(route.node.clone());
                }
            }
            Ok(ActionOutcome::RoutesInstalled {
                router: router.clone(),
                installed,
                skipped,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
routers:
  router1:
    interfaces:
      - name: eth0
        ip: 192.168.1.1
        mask: 255.255.255.0
      - name: eth1
        ip: 10.0.0.1
        mask: 255.255.255.0
    routes:
      - destination: 192.168.2.0
        next_hop: 192.168.1.2
        interface: eth0
        mask: 255.255.255.0
networks:
  lan1:
    address: 192.168.1.0
    mask: 255.255.255.0
    devices:
      - name: device1
      - name: device2
        physical_address: "00:11:22:33:44:55"
graph:
  source: A
  edges:
    A: { B: 1, C: 4 }
    B: { C: 1 }
actions:
  - type: forward
    router: router1
    destination_ip: 192.168.2.10
  - type: forward
    router: router1
    destination_ip: 172.16.0.5
  - type: receive
    router: router1
    destination_ip: 192.168.1.1
  - type: resolve
    network: lan1
    device: device1
    target_ip: 192.168.1.2
"#;

    #[test]
    fn parses_sample_scenario() {
        let scenario: Scenario = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(scenario.routers.len(), 1);
        assert_eq!(scenario.networks["lan1"].devices.len(), 2);
        assert_eq!(scenario.actions.len(), 4);
        assert!(scenario.graph.is_some());
    }

    #[test]
    fn runs_sample_scenario_end_to_end() {
        let scenario: Scenario = serde_yaml::from_str(SAMPLE).unwrap();
        let report = scenario.run().unwrap();

        let lan1 = &report.assignments["lan1"];
        assert_eq!(lan1[0].ip, "192.168.1.1");
        assert_eq!(lan1[1].ip, "192.168.1.2");
        assert_eq!(lan1[1].physical_address, "00:11:22:33:44:55");

        let costs = report.costs.as_ref().unwrap();
        assert_eq!(costs["A"], 0);
        assert_eq!(costs["B"], 1);
        assert_eq!(costs["C"], 2);

        assert_eq!(
            report.outcomes[0],
            ActionOutcome::Forwarded {
                router: "router1".to_string(),
                destination_ip: "192.168.2.10".to_string(),
                next_hop: "192.168.1.2".to_string(),
                iface: "eth0".to_string(),
            }
        );
        assert_eq!(
            report.outcomes[1],
            ActionOutcome::NoRoute {
                router: "router1".to_string(),
                destination_ip: "172.16.0.5".to_string(),
            }
        );
        assert_eq!(
            report.outcomes[2],
            ActionOutcome::DeliveredLocally {
                router: "router1".to_string(),
                destination_ip: "192.168.1.1".to_string(),
                iface: "eth0".to_string(),
            }
        );
        assert_eq!(
            report.outcomes[3],
            ActionOutcome::Resolved {
                network: "lan1".to_string(),
                device: "device1".to_string(),
                target_ip: "192.168.1.2".to_string(),
                physical_address: "00:11:22:33:44:55".to_string(),
            }
        );
    }

    const INSTALL_SAMPLE: &str = r#"
routers:
  router1:
    interfaces:
      - name: eth0
        ip: 192.168.1.1
        mask: 255.255.255.0
graph:
  source: A
  edges:
    A: { B: 1 }
    B: { C: 1 }
actions:
  - type: install_routes
    router: router1
    routes:
      - node: C
        destination: 192.168.3.0
        next_hop: 192.168.1.3
        interface: eth0
        mask: 255.255.255.0
      - node: Z
        destination: 192.168.9.0
        next_hop: 192.168.1.9
        interface: eth0
        mask: 255.255.255.0
  - type: forward
    router: router1
    destination_ip: 192.168.3.7
  - type: forward
    router: router1
    destination_ip: 192.168.9.7
"#;

    #[test]
    fn installs_planner_routes_when_asked() {
        let scenario: Scenario = serde_yaml::from_str(INSTALL_SAMPLE).unwrap();
        let report = scenario.run().unwrap();

        assert_eq!(
            report.outcomes[0],
            ActionOutcome::RoutesInstalled {
                router: "router1".to_string(),
                installed: vec!["C".to_string()],
                skipped: vec!["Z".to_string()],
            }
        );
        // the reachable node's route now answers forwards
        assert_eq!(
            report.outcomes[1],
            ActionOutcome::Forwarded {
                router: "router1".to_string(),
                destination_ip: "192.168.3.7".to_string(),
                next_hop: "192.168.1.3".to_string(),
                iface: "eth0".to_string(),
            }
        );
        // the unreachable node's mapping was never installed
        assert_eq!(
            report.outcomes[2],
            ActionOutcome::NoRoute {
                router: "router1".to_string(),
                destination_ip: "192.168.9.7".to_string(),
            }
        );
    }

    #[test]
    fn install_routes_without_graph_fails_the_run() {
        let scenario: Scenario = serde_yaml::from_str(
            r#"
routers:
  router1:
    interfaces:
      - name: eth0
        ip: 192.168.1.1
        mask: 255.255.255.0
actions:
  - type: install_routes
    router: router1
    routes:
      - node: C
        destination: 192.168.3.0
        next_hop: 192.168.1.3
        interface: eth0
        mask: 255.255.255.0
"#,
        )
        .unwrap();
        assert!(scenario.run().is_err());
    }

    #[test]
    fn unknown_router_in_action_fails_the_run() {
        let scenario: Scenario = serde_yaml::from_str(
            "actions:\n  - type: forward\n    router: nope\n    destination_ip: 1.2.3.4\n",
        )
        .unwrap();
        assert!(scenario.run().is_err());
    }

    #[test]
    fn report_serializes_to_json() {
        let scenario: Scenario = serde_yaml::from_str(SAMPLE).unwrap();
        let report = scenario.run().unwrap();
        let json = serde_json::to_string_pretty(&report).unwrap();
        assert!(json.contains("\"outcome\": \"forwarded\""));
        assert!(json.contains("\"outcome\": \"no_route\""));
    }
}
