//! Ingress address lookup

use serde_json::Value;

/// First load balancer IP of an ingress, from `kubectl get ingress -o json` output
pub fn parse_ingress_ip(ingress_json: &str) -> Option<String> {
    let ingress: Value = serde_json::from_str(ingress_json).ok()?;
    ingress
        .get("status")?
        .get("loadBalancer")?
        .get("ingress")?
        .get(0)?
        .get("ip")?
        .as_str()
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}
