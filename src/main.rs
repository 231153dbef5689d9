use boundring::{Node, Ring, RingConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Optional JSON config as first argument
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)?;
            RingConfig::from_json(&raw)?
        }
        None => RingConfig::default(),
    };
    info!(
        "Ring config: {} virtual nodes, load factor {:.2}",
        config.replicas, config.load_factor
    );

    let ring = Ring::new(config);
    for i in 1..=5 {
        ring.add_node(Node::new(format!("server{}", i), format!("192.168.1.{}:8080", i)))?;
    }

    for i in 0..50 {
        ring.assign_key(&format!("user:{}", i))?;
    }

    info!("Removing server3 to simulate a failure");
    ring.remove_node("server3")?;

    println!("{}", serde_json::to_string_pretty(&ring.stats())?);
    Ok(())
}
