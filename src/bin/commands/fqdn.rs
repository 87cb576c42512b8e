use std::net::IpAddr;
use std::time::Duration;

use netlens::lens::dns::{DnsLens, DnsQuery};
use netlens::NetlensConfig;
use serde_json::json;
use tabled::settings::Style;
use tabled::Table;

pub fn run(config: &NetlensConfig, domain: String, nameserver: Option<IpAddr>, json: bool) {
    let lens = DnsLens::with_timeout(Duration::from_secs(config.dns_timeout_secs));

    let mut query = DnsQuery::new(domain);
    if let Some(ns) = nameserver {
        query = query.with_nameserver(ns);
    }

    match lens.resolve(&query) {
        Ok(scan) => {
            if json {
                let value = json!({
                    "fqdn": query.domain,
                    "nameserver": scan.nameserver,
                    "records": scan.records,
                });
                if let Err(e) = serde_json::to_writer_pretty(std::io::stdout(), &value) {
                    eprintln!("Error writing JSON to stdout: {}", e);
                }
                return;
            }

            println!("FQDN: {}, Nameserver: {}", query.domain, scan.nameserver);
            println!(
                "DNS Records for {} using nameserver: {}",
                query.domain, scan.nameserver
            );
            println!("{}", Table::new(&scan.records).with(Style::rounded()));
        }
        Err(e) => {
            eprintln!("ERROR: unable to scan DNS records: {}", e);
        }
    }
}
