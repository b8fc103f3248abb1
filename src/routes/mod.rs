mod host_route_namer;
mod route_factory;

pub use host_route_namer::{route_name, HOST_HASH_LENGTH};
pub use route_factory::{parse_internal_domain, timeout_annotation_value, BackendService, RouteFactory};
use thiserror::Error;
use tracing::{info, instrument};
use typed_builder::TypedBuilder;

use crate::{
    common::ResourceKey,
    configuration::Configuration,
    resources::{Ingress, IngressVisibility, Route},
};

pub const TIMEOUT_ANNOTATION: &str = "haproxy.router.openshift.io/timeout";
pub const DISABLE_ROUTE_ANNOTATION: &str = "serving.knative.openshift.io/disableRoute";
pub const INGRESS_LABEL_KEY: &str = "networking.internal.knative.dev/ingress";
/// Port name the edge router targets on the Kourier gateway service.
pub const KOURIER_HTTP_PORT: &str = "http2";
pub const ROUTE_TARGET_KIND: &str = "Service";
pub const ROUTE_WEIGHT: i32 = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("unable to find Ingress LoadBalancer with DomainInternal set")]
    NoValidLoadBalancerDomain,
}

impl RouteError {
    /// The load balancer status is usually filled in by a later reconciliation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RouteError::NoValidLoadBalancerDomain)
    }
}

/// Hosts resolving inside the cluster (`name.namespace.svc...`) and bare names with fewer than three labels are
/// never exposed.
pub fn is_external_host(host: &str) -> bool {
    host.split('.').nth(2).is_some_and(|label| label != "svc")
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct RouteSetBuilder {
    route_factory: RouteFactory,
}

impl RouteSetBuilder {
    pub fn from_configuration(configuration: &Configuration) -> Self {
        Self::builder().route_factory(RouteFactory::from_configuration(configuration)).build()
    }

    /// Routes for every exposed host of `ingress`, in rule and host order.
    ///
    /// Either all routes are produced or the first error is returned.
    #[instrument(level = "debug", skip_all, fields(ingress = %ResourceKey::from(ingress)))]
    pub fn make_routes(&self, ingress: &Ingress) -> Result<Vec<Route>, RouteError> {
        let routes = ingress
            .spec
            .rules
            .iter()
            .filter(|rule| rule.visibility != IngressVisibility::ClusterLocal)
            .flat_map(|rule| rule.hosts.iter().filter(|host| is_external_host(host)).map(move |host| (rule, host)))
            .filter_map(|(rule, host)| self.route_factory.make_route(ingress, host, rule).transpose())
            .collect::<Result<Vec<_>, _>>()?;
        info!("Generated {} routes for {}", routes.len(), ResourceKey::from(ingress));
        Ok(routes)
    }
}
