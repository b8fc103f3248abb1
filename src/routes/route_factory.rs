use std::time::Duration;

use k8s_openapi::apimachinery::pkg::{apis::meta::v1::ObjectMeta, util::intstr::IntOrString};
use kube::{core::Duration as KubeDuration, ResourceExt};
use tracing::{debug, warn};
use typed_builder::TypedBuilder;

use super::{
    route_name, RouteError, DISABLE_ROUTE_ANNOTATION, INGRESS_LABEL_KEY, KOURIER_HTTP_PORT, ROUTE_TARGET_KIND, ROUTE_WEIGHT,
    TIMEOUT_ANNOTATION,
};
use crate::{
    configuration::Configuration,
    resources::{
        InsecureEdgeTerminationPolicy, Ingress, IngressRule, IngressVisibility, Route, RoutePort, RouteSpec, RouteTargetReference,
        TlsConfig, TlsTermination, WildcardPolicy,
    },
};

/// Router timeout annotation value, `<seconds>s`.
///
/// Seconds are written the way Go's `%v` prints a float: shortest decimal form, switching to exponent form
/// (`5e-05`) below 1e-4 and from 1e21 on. Negative timeouts keep their sign.
pub fn timeout_annotation_value(timeout: impl Into<KubeDuration>) -> String {
    let timeout = timeout.into();
    let seconds = Duration::from(timeout).as_secs_f64();
    let seconds = if timeout.is_negative() { -seconds } else { seconds };
    format!("{}s", format_seconds(seconds))
}

fn format_seconds(seconds: f64) -> String {
    let scientific = format!("{seconds:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return seconds.to_string();
    };
    match exponent.parse::<i32>() {
        Ok(exponent) if !(-4..21).contains(&exponent) => {
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        },
        _ => seconds.to_string(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendService {
    pub name: String,
    pub namespace: String,
}

/// Splits `<service>.<namespace>.svc.<cluster domain>` into its service and namespace.
pub fn parse_internal_domain(domain: &str) -> Option<BackendService> {
    if domain.is_empty() {
        return None;
    }
    let parts: Vec<_> = domain.split('.').collect();
    match parts.as_slice() {
        [name, namespace, "svc", ..] => Some(BackendService { name: (*name).to_owned(), namespace: (*namespace).to_owned() }),
        _ => None,
    }
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct RouteFactory {
    /// Annotation value used for paths without a timeout of their own.
    #[builder(setter(transform = |timeout: Duration| timeout_annotation_value(timeout)))]
    default_timeout: String,
}

impl RouteFactory {
    pub fn from_configuration(configuration: &Configuration) -> Self {
        Self::builder().default_timeout(configuration.default_max_revision_timeout()).build()
    }

    pub fn default_timeout(&self) -> &str {
        &self.default_timeout
    }

    /// Builds the route exposing `host` of `rule`.
    ///
    /// `Ok(None)` means the host is deliberately not exposed: the rule is cluster-local or the ingress carries
    /// the disable annotation.
    pub fn make_route(&self, ingress: &Ingress, host: &str, rule: &IngressRule) -> Result<Option<Route>, RouteError> {
        if rule.visibility == IngressVisibility::ClusterLocal {
            debug!("Skipping cluster-local host {host}");
            return Ok(None);
        }

        let mut annotations = ingress.annotations().clone();
        if annotations.contains_key(DISABLE_ROUTE_ANNOTATION) {
            debug!("Skipping host {host}, routes disabled by {DISABLE_ROUTE_ANNOTATION}");
            return Ok(None);
        }
        if let Some(timeout) = self.rule_timeout(host, rule) {
            annotations.insert(TIMEOUT_ANNOTATION.to_owned(), timeout);
        }

        let mut labels = ingress.labels().clone();
        labels.insert(INGRESS_LABEL_KEY.to_owned(), ingress.name_any());

        let backend = resolve_backend(ingress).ok_or(RouteError::NoValidLoadBalancerDomain)?;
        let name = route_name(&ingress.uid().unwrap_or_default(), host);
        debug!("Route {name} for host {host} -> {}/{}", backend.namespace, backend.name);

        Ok(Some(Route {
            metadata: ObjectMeta {
                name: Some(name),
                namespace: Some(backend.namespace),
                labels: Some(labels),
                annotations: Some(annotations),
                ..Default::default()
            },
            spec: RouteSpec {
                host: Some(host.to_owned()),
                path: None,
                to: RouteTargetReference { kind: ROUTE_TARGET_KIND.to_owned(), name: backend.name, weight: Some(ROUTE_WEIGHT) },
                alternate_backends: vec![],
                port: Some(RoutePort { target_port: IntOrString::String(KOURIER_HTTP_PORT.to_owned()) }),
                tls: Some(TlsConfig {
                    termination: TlsTermination::Edge,
                    insecure_edge_termination_policy: Some(InsecureEdgeTerminationPolicy::Allow),
                }),
                wildcard_policy: Some(WildcardPolicy::None),
            },
        }))
    }

    /// A route carries a single timeout, so the last path of the rule decides it.
    fn rule_timeout(&self, host: &str, rule: &IngressRule) -> Option<String> {
        let mut timeouts: Vec<_> = rule
            .http
            .as_ref()?
            .paths
            .iter()
            .map(|path| path.deprecated_timeout.map_or_else(|| self.default_timeout.clone(), timeout_annotation_value))
            .collect();
        let timeout = timeouts.pop()?;
        if timeouts.iter().any(|other| *other != timeout) {
            warn!("Host {host} has paths with different timeouts, using {timeout} from the last path");
        }
        Some(timeout)
    }
}

/// The last public load balancer entry with a usable internal domain wins.
fn resolve_backend(ingress: &Ingress) -> Option<BackendService> {
    ingress
        .status
        .as_ref()?
        .public_load_balancer
        .as_ref()?
        .ingress
        .iter()
        .filter_map(|load_balancer| parse_internal_domain(&load_balancer.domain_internal))
        .last()
        .filter(|backend| !backend.name.is_empty() && !backend.namespace.is_empty())
}
