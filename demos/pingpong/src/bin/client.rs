//! Plays a few rounds against a running ping-pong server.

use std::net::SocketAddr;

use clap::Parser;

use telerpc::Value;
use telerun::stub::Stub;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address of the ping-pong server.
    #[arg(long, default_value = "127.0.0.1:7710")]
    address: SocketAddr,

    /// Number of rounds to play.
    #[arg(long, default_value_t = 4)]
    rounds: i32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let stub = Stub::new(pingpong::contract(), cli.address)?;

    let mut successes = 0;
    let mut failures = 0;

    for i in 0..cli.rounds {
        match stub.call("ping", &[Value::I32(i)]).await {
            Ok(Value::Str(pong)) if pong == format!("Pong {}", i) => {
                println!("{}", pong);
                successes += 1;
            }
            Ok(other) => {
                eprintln!("unexpected response: {:?}", other);
                failures += 1;
            }
            Err(error) => {
                eprintln!("round {} failed: {}", i, error);
                failures += 1;
            }
        }
    }

    println!("{} rounds completed, {} rounds failed", successes, failures);
    Ok(())
}
