use std::fmt::Display;

use kube::ResourceExt;

use super::create_id;
use crate::resources::{Ingress, Route};

pub const DEFAULT_NAMESPACE_NAME: &str = "default";
pub const INGRESS_KIND_NAME: &str = "Ingress";
pub const ROUTE_KIND_NAME: &str = "Route";

#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ResourceKey {
    pub namespace: String,
    pub name: String,
    pub kind: String,
}

impl ResourceKey {
    fn from_meta<R: ResourceExt>(resource: &R, kind: &str) -> Self {
        Self {
            namespace: resource.namespace().unwrap_or(DEFAULT_NAMESPACE_NAME.to_owned()),
            name: resource.name_any(),
            kind: kind.to_owned(),
        }
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, create_id(&self.name, &self.namespace))
    }
}

impl From<&Ingress> for ResourceKey {
    fn from(ingress: &Ingress) -> Self {
        Self::from_meta(ingress, INGRESS_KIND_NAME)
    }
}

impl From<&Route> for ResourceKey {
    fn from(route: &Route) -> Self {
        Self::from_meta(route, ROUTE_KIND_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::ResourceKey;
    use crate::resources::Ingress;

    #[test]
    pub fn test_ingress_key() {
        let m = r"
apiVersion: networking.internal.knative.dev/v1alpha1
kind: Ingress
metadata:
  name: hello
spec: {}
";
        let ingress: Ingress = serde_yaml::from_str(m).unwrap();
        let key = ResourceKey::from(&ingress);
        assert_eq!(key.namespace, "default");
        assert_eq!(key.to_string(), "Ingress/default.hello");
    }
}
