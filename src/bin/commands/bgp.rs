use std::time::Duration;

use netlens::lens::routing::{RoutingLens, RoutingLensError, RoutingReport};
use netlens::NetlensConfig;
use serde_json::json;
use tabled::settings::Style;
use tabled::Table;

pub fn run(config: &NetlensConfig, token: &str, json: bool) {
    let lens = RoutingLens::with_base_url_and_timeout(
        config.api_base_url.clone(),
        Duration::from_secs(config.http_timeout_secs),
    );

    match lens.lookup(token) {
        Ok(RoutingReport::Asn { asn, prefixes }) => {
            if json {
                let value = json!({
                    "asn": asn,
                    "prefixes": prefixes,
                });
                if let Err(e) = serde_json::to_writer_pretty(std::io::stdout(), &value) {
                    eprintln!("Error writing JSON to stdout: {}", e);
                }
                return;
            }

            println!("BGP ASN: {}", asn);
            println!("ASN {} Information", asn);
            println!("{}", Table::new(&prefixes).with(Style::rounded()));
        }
        Ok(RoutingReport::Prefix {
            prefix,
            summary,
            upstreams,
        }) => {
            if json {
                let value = json!({
                    "prefix": prefix.to_string(),
                    "summary": summary,
                    "upstreams": upstreams,
                });
                if let Err(e) = serde_json::to_writer_pretty(std::io::stdout(), &value) {
                    eprintln!("Error writing JSON to stdout: {}", e);
                }
                return;
            }

            let summary_rows: Vec<_> = summary.into_iter().collect();
            println!("Prefix {} Information", prefix);
            println!("{}", Table::new(&summary_rows).with(Style::rounded()));
            println!("ASN Information for {}", prefix);
            println!("{}", Table::new(&upstreams).with(Style::rounded()));
        }
        Err(e @ RoutingLensError::InvalidIdentifier(_)) => {
            eprintln!("{}", e);
        }
        Err(e) => {
            eprintln!("ERROR: unable to retrieve routing data: {}", e);
        }
    }
}
