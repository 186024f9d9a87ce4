//! Hosts the ping-pong service until interrupted.

use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;

use pingpong::PingPong;
use telerun::skeleton::Skeleton;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Interface to listen on.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on; 0 lets the system pick one.
    #[arg(long, default_value_t = 7710)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let skeleton = Skeleton::with_address(
        pingpong::contract(),
        Arc::new(PingPong),
        SocketAddr::new(cli.host, cli.port),
    )?;
    skeleton.start().await?;

    println!(
        "ping-pong server listening at {}",
        skeleton.address().expect("started skeleton has an address")
    );

    tokio::signal::ctrl_c().await?;
    skeleton.stop().await;
    println!("stopped");

    Ok(())
}
