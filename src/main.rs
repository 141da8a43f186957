use ring_store::client;
use ring_store::config::NodeConfig;
use ring_store::node::{NodeActor, StartupMode};
use ring_store::protocol::{Address, ClientResponse};
use ring_store::transport::{remote, Network};
use std::net::SocketAddr;

const USAGE: &str = "
Usage: ring-store COMMAND [arguments]

Launch a node of the ring, or talk to a running one.

Node commands (settings come from NODE_ID, STORAGE_PATH, LISTEN_ADDR,
READ_QUORUM, WRITE_QUORUM, REPLICATION_FACTOR, QUORUM_TIMEOUT_MS):
   bootstrap                  Found a new ring with this node
   join <host:port>           Join the ring through a running member
   recover <host:port>        Rejoin after a crash, keeping local records

Client commands:
   client <host:port> read <key>
   client <host:port> update <key> <value>
   client <host:port> leave
";

fn usage_and_exit() -> ! {
    eprintln!("{}", USAGE);
    std::process::exit(2);
}

fn parse_remote(arg: Option<&String>) -> SocketAddr {
    let Some(raw) = arg else {
        usage_and_exit();
    };
    match raw.parse() {
        Ok(addr) => addr,
        Err(_) => {
            eprintln!("invalid node address: {}", raw);
            usage_and_exit();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage_and_exit();
    }

    match args[1].as_str() {
        "bootstrap" => {
            if args.len() != 2 {
                usage_and_exit();
            }
            run_node(StartupMode::Bootstrap).await
        }
        "join" => {
            let remote = parse_remote(args.get(2));
            run_node(StartupMode::Join {
                remote: Address::new(remote.to_string()),
            })
            .await
        }
        "recover" => {
            let remote = parse_remote(args.get(2));
            run_node(StartupMode::Recover {
                remote: Address::new(remote.to_string()),
            })
            .await
        }
        "client" => run_client(&args[2..]).await,
        _ => usage_and_exit(),
    }
}

async fn run_node(mode: StartupMode) -> anyhow::Result<()> {
    let config = NodeConfig::from_env()?;

    let net = Network::new();
    let bridge = remote::attach(net.clone(), config.listen).await?;
    let address = Address::new(bridge.local_addr().to_string());

    tracing::info!(
        "starting node [{}] at {} (R={}, W={}, N={})",
        config.id,
        address,
        config.quorum.read_quorum,
        config.quorum.write_quorum,
        config.quorum.replication
    );

    let actor = match mode {
        StartupMode::Bootstrap => NodeActor::bootstrap(
            config.id,
            &config.storage_dir,
            config.quorum.clone(),
            net.clone(),
            address,
        )?,
        StartupMode::Join { remote } => NodeActor::join(
            config.id,
            &config.storage_dir,
            remote,
            config.quorum.clone(),
            net.clone(),
            address,
        )?,
        StartupMode::Recover { remote } => NodeActor::recover(
            config.id,
            &config.storage_dir,
            remote,
            config.quorum.clone(),
            net.clone(),
            address,
        )?,
    };

    // The loop returns when a client asks this node to leave the ring.
    actor.run().await;
    Ok(())
}

async fn run_client(args: &[String]) -> anyhow::Result<()> {
    if args.len() < 2 {
        usage_and_exit();
    }
    let remote = parse_remote(args.first());

    let response = match args[1].as_str() {
        "read" => {
            let key = parse_key(args.get(2));
            client::read(remote, key).await?
        }
        "update" => {
            let key = parse_key(args.get(2));
            let Some(value) = args.get(3) else {
                usage_and_exit();
            };
            client::update(remote, key, value.clone()).await?
        }
        "leave" => client::leave(remote).await?,
        _ => usage_and_exit(),
    };

    match response {
        ClientResponse::Read { node, key, value } => match value {
            Some(value) => println!("node [{}]: key [{}] = \"{}\"", node, key, value),
            None => println!("node [{}]: key [{}] not found", node, key),
        },
        ClientResponse::Update { node, key, item } => {
            println!(
                "node [{}]: key [{}] updated to \"{}\" (version {})",
                node, key, item.value, item.version
            );
        }
        ClientResponse::Leave { node } => {
            println!("node [{}] left the ring", node);
        }
        ClientResponse::Error { node, reason } => {
            eprintln!("node [{}] rejected the operation: {}", node, reason);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn parse_key(arg: Option<&String>) -> u64 {
    let Some(raw) = arg else {
        usage_and_exit();
    };
    match raw.parse() {
        Ok(key) => key,
        Err(_) => {
            eprintln!("invalid key (expected a non-negative integer): {}", raw);
            usage_and_exit();
        }
    }
}
