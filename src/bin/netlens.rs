use std::net::IpAddr;

use clap::Parser;
use netlens::NetlensConfig;
use tracing::{debug, Level};

mod commands;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// configuration file path, by default $HOME/.netlens/netlens.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// Output results as JSON instead of tables
    #[clap(long)]
    json: bool,

    /// FQDN of the target host to scan DNS records for
    #[clap(long)]
    fqdn: Option<String>,

    /// Nameserver to use for DNS queries (only meaningful with --fqdn)
    #[clap(long)]
    nameserver: Option<IpAddr>,

    /// IP/subnet address of the target host (reserved; not wired to a
    /// pipeline yet)
    #[clap(long)]
    subnet: Option<String>,

    /// Target host to scan including the port number, for example
    /// 10.0.0.1:80 (reserved; not wired to a pipeline yet)
    #[clap(long, value_name = "HOST:PORT")]
    target_host: Option<String>,

    /// ASN or IP prefix to look up in public routing data
    #[clap(long, value_name = "ASN-OR-PREFIX")]
    bgp: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();
    }

    if cli.fqdn.is_none()
        && cli.nameserver.is_none()
        && cli.subnet.is_none()
        && cli.target_host.is_none()
        && cli.bgp.is_none()
    {
        println!("No arguments provided. Use --help for more information.");
        return;
    }

    let config = match NetlensConfig::new(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return;
        }
    };

    // Flat priority dispatch: an FQDN wins over a routing token. --subnet and
    // --target-host are accepted but reserved; they route nowhere.
    if let Some(domain) = cli.fqdn {
        commands::fqdn::run(&config, domain, cli.nameserver, cli.json);
    } else if let Some(token) = cli.bgp {
        commands::bgp::run(&config, &token, cli.json);
    } else {
        debug!("only reserved arguments supplied; nothing to run");
    }
}
