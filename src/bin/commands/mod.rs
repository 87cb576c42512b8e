pub mod bgp;
pub mod fqdn;
