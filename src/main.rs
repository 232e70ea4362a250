use clap::Parser;
use log::{error, info};
use serde::Serialize;
use virtual_energy_bridge::config::{self, Config};
use virtual_energy_bridge::device::BridgedDevice;
use virtual_energy_bridge::error::Result;
use virtual_energy_bridge::matter::clusters::BridgedHandler;
use virtual_energy_bridge::matter::{AttributeReport, ClusterRegistry, on_cluster_init};

#[derive(Parser)]
#[command(name = "virtual-energy-bridge")]
#[command(about = "Expose a virtual energy meter and a bridged device as Matter attributes")]
struct Cli {
    /// Endpoint for the ElectricalPowerMeasurement cluster
    #[arg(long)]
    endpoint: Option<u16>,

    /// Node id of the bridged device (decimal or 0x-prefixed hex)
    #[arg(long, value_parser = parse_node_id_arg)]
    node_id: Option<u64>,

    /// Display name of the bridged device
    #[arg(long)]
    name: Option<String>,

    /// Mark the bridged device as reachable
    #[arg(long)]
    reachable: bool,

    /// Print attributes as JSON
    #[arg(long)]
    json: bool,
}

fn parse_node_id_arg(s: &str) -> std::result::Result<u64, String> {
    config::parse_node_id(s).ok_or_else(|| format!("invalid node id: {s}"))
}

#[derive(Serialize)]
struct Snapshot {
    energy_endpoint: u16,
    energy: Vec<AttributeReport>,
    bridged_endpoint: u16,
    bridged: Vec<AttributeReport>,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();
    config::load_dotenv();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env();
    if let Some(endpoint) = cli.endpoint {
        config.energy.endpoint_id = endpoint;
    }
    if let Some(node_id) = cli.node_id {
        config.bridged.node_id = node_id;
    }
    if let Some(name) = cli.name {
        config.bridged.device_name = name;
    }

    info!("Starting Virtual Energy Bridge");
    info!("  Energy endpoint: {}", config.energy.endpoint_id);
    info!("  Bridged node: 0x{:016X}", config.bridged.node_id);

    let mut registry = ClusterRegistry::new(config.energy.endpoint_id);
    let energy = on_cluster_init(&mut registry, config.energy.endpoint_id)?.snapshot()?;

    let mut device = BridgedDevice::new(config.bridged.node_id);
    device.set_endpoint_id(config.bridged.endpoint_id);
    device.set_parent_endpoint_id(config.energy.endpoint_id);
    device.set_attributes(config.bridged.attributes());
    device.set_name(&config.bridged.device_name);
    device.set_reachable(cli.reachable);

    let snapshot = Snapshot {
        energy_endpoint: config.energy.endpoint_id,
        energy,
        bridged_endpoint: device.endpoint_id(),
        bridged: BridgedHandler::new(&device).snapshot(),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_reports("ElectricalPowerMeasurement", snapshot.energy_endpoint, &snapshot.energy)?;
        print_reports(
            "BridgedDeviceBasicInformation",
            snapshot.bridged_endpoint,
            &snapshot.bridged,
        )?;
    }

    Ok(())
}

fn print_reports(cluster: &str, endpoint: u16, reports: &[AttributeReport]) -> Result<()> {
    println!("{} (endpoint {}):", cluster, endpoint);
    for report in reports {
        println!(
            "  {} (0x{:04X}) = {}",
            report.name,
            report.id,
            serde_json::to_string(&report.value)?
        );
    }
    Ok(())
}
