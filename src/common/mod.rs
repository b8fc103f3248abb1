mod resource_key;

pub use resource_key::ResourceKey;

pub fn create_id(name: &str, namespace: &str) -> String {
    format!("{namespace}.{name}")
}
