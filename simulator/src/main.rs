use std::{fs, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Context, Result};
use avm_simulator::{
    gadgets::UnsupportedBlackBox, state::InMemoryHost, util::init_logger, AvmSimulator,
    ExecutionEnvironment, Fr, Gas, SimulatorConfig,
};
use clap::Parser;
use tracing::info;

/// Runs AVM bytecode against an empty in-memory world state.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Hex-encoded bytecode of the contract to run.
    bytecode: PathBuf,

    /// Calldata, one decimal field element per value.
    #[arg(long, value_delimiter = ',', value_parser = parse_field)]
    calldata: Vec<Fr>,

    /// Address the contract is deployed at.
    #[arg(long, default_value = "1", value_parser = parse_field)]
    address: Fr,

    /// Extra contracts for nested calls, as `ADDRESS=FILE`.
    #[arg(long = "deploy", value_parser = parse_deployment)]
    deployments: Vec<(Fr, PathBuf)>,

    #[arg(long, default_value_t = 1_000_000)]
    l2_gas: u32,

    #[arg(long, default_value_t = 1_000_000)]
    da_gas: u32,

    #[arg(long, default_value_t = SimulatorConfig::default().max_call_depth)]
    max_call_depth: u32,

    /// Run as a static call.
    #[arg(long = "static")]
    is_static: bool,

    /// Print per-opcode statistics.
    #[arg(long)]
    stats: bool,
}

fn parse_field(value: &str) -> Result<Fr> {
    Fr::from_str(value).map_err(|_| anyhow!("{value:?} is not a field element"))
}

fn parse_deployment(value: &str) -> Result<(Fr, PathBuf)> {
    let (address, path) = value
        .split_once('=')
        .ok_or_else(|| anyhow!("expected ADDRESS=FILE, got {value:?}"))?;
    Ok((parse_field(address)?, PathBuf::from(path)))
}

fn read_bytecode(path: &PathBuf) -> Result<Vec<u8>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let text = text.trim();
    hex::decode(text.strip_prefix("0x").unwrap_or(text))
        .with_context(|| format!("decoding hex in {}", path.display()))
}

fn main() -> Result<()> {
    let _guard = init_logger()?;
    let args = Args::parse();

    let mut host = InMemoryHost::new();
    host.deploy(args.address, read_bytecode(&args.bytecode)?);
    for (address, path) in &args.deployments {
        host.deploy(*address, read_bytecode(path)?);
    }

    let config = SimulatorConfig {
        max_call_depth: args.max_call_depth,
        collect_stats: args.stats,
    };
    let blackbox = UnsupportedBlackBox;
    let simulator = AvmSimulator::with_config(&host, &blackbox, config);
    let env = ExecutionEnvironment {
        address: args.address,
        storage_address: args.address,
        is_static_call: args.is_static,
        calldata: args.calldata,
        ..Default::default()
    };
    let result = simulator.execute(env, Gas::new(args.l2_gas, args.da_gas))?;

    info!(reverted = result.reverted, gas_left = %result.gas_left, "done");
    for entry in result.trace.ordered_entries() {
        println!("{entry:?}");
    }
    for (address, slot, value) in result.public_storage_writes.sorted_entries() {
        println!("storage[{address}][{slot}] = {value}");
    }
    if args.stats {
        print!("{}", result.stats);
    }
    match result.into_result() {
        Ok(output) => {
            let output = output.iter().map(Fr::to_string).collect::<Vec<_>>();
            println!("returned [{}]", output.join(", "));
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
