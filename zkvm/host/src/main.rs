use std::io::Read;

use agent_messages_zkvm_host::{config, ProveRequest, Prover};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agent-messages-zkvm-host", about = "Shielded message prover")]
struct Cli {
    /// Hex signing key seed; falls back to $AGENT_MESSAGES_PROVER_SEED
    #[arg(long, global = true)]
    seed: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Prove a message and print the attestation as JSON
    Prove {
        /// Read `{agent_id, message_number, content, security_code}` from stdin
        #[arg(long)]
        stdin: bool,
        #[arg(long, default_value = config::DEFAULT_CIRCUIT)]
        circuit: String,
    },
    /// Print the image id of an allowlisted circuit
    ImageId {
        #[arg(long, default_value = config::DEFAULT_CIRCUIT)]
        circuit: String,
    },
    /// Print the prover's public key, for pinning in an acceptance policy
    ProverKey,
}

#[derive(serde::Deserialize)]
struct JsonProveRequest {
    agent_id: u32,
    message_number: u32,
    content: String,
    security_code: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("agent_messages_zkvm_host=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Prove {
        stdin: false,
        circuit: config::DEFAULT_CIRCUIT.to_string(),
    });

    match command {
        Command::Prove { stdin, circuit } => {
            let request = if stdin {
                parse_request_from_stdin()?
            } else {
                agent_messages_zkvm_host::default_prove_request()
            }
            .with_circuit(circuit);

            tracing::info!(
                agent_id = request.agent_id,
                message_number = request.message_number,
                circuit = %request.circuit,
                "proving message"
            );
            let prover = load_prover(cli.seed)?;
            let output = agent_messages_zkvm_host::prove_cli_output(&prover, &request)?;
            println!("{output}");
        }
        Command::ImageId { circuit } => print_image_id(&circuit)?,
        Command::ProverKey => {
            let prover = load_prover(cli.seed)?;
            println!("{}", hex::encode(prover.prover_key()));
        }
    }

    Ok(())
}

fn parse_request_from_stdin() -> Result<ProveRequest> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let json: JsonProveRequest = serde_json::from_str(&input).context("invalid JSON input")?;

    Ok(ProveRequest::new(
        json.agent_id,
        json.message_number,
        json.content,
        json.security_code,
    ))
}

fn load_prover(seed: Option<String>) -> Result<Prover> {
    let seed = match seed {
        Some(seed) => seed,
        None => std::env::var(config::PROVER_SEED_ENV).with_context(|| {
            format!("no prover seed: pass --seed or set {}", config::PROVER_SEED_ENV)
        })?,
    };
    Ok(Prover::from_seed_hex(&seed)?)
}

fn print_image_id(circuit: &str) -> Result<()> {
    let trusted = config::require_allowlisted_circuit(circuit)?;
    let image_id = trusted.image_id();

    println!("=== Image ID ({}) ===\n", trusted.circuit.name);

    print!("const TRUSTED_IMAGE_ID: [u8; IMAGE_ID_LEN] = [\n    ");
    for (i, byte) in image_id.iter().enumerate() {
        if i > 0 && i % 11 == 0 {
            print!("\n    ");
        } else if i > 0 {
            print!(", ");
        }
        print!("{byte}");
    }
    println!(",\n];\n");

    println!("// Hex: {}", hex::encode(image_id));

    Ok(())
}
