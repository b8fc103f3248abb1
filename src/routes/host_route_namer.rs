use sha2::{Digest, Sha256};

/// Number of hex characters of the host digest kept in a route name (4 bits each).
pub const HOST_HASH_LENGTH: usize = 6;

/// Name of the route serving `host` for the ingress identified by `owner_id`.
///
/// Only [`HOST_HASH_LENGTH`] hex characters of the host's SHA-256 digest are kept, so two hosts of the same
/// owner can share a name once an owner carries thousands of hosts.
pub fn route_name(owner_id: &str, host: &str) -> String {
    format!("route-{owner_id}-{}", host_hash(host))
}

fn host_hash(host: &str) -> String {
    let mut hash = format!("{:x}", Sha256::digest(host.as_bytes()));
    hash.truncate(HOST_HASH_LENGTH);
    hash
}
