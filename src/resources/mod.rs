mod ingress;
mod route;

pub use ingress::{
    HeaderMatch, HttpIngressPath, HttpIngressRuleValue, HttpOption, Ingress, IngressBackendSplit, IngressCondition, IngressRule,
    IngressSpec, IngressStatus, IngressVisibility, LoadBalancerIngressStatus, LoadBalancerStatus,
};
pub use route::{InsecureEdgeTerminationPolicy, Route, RoutePort, RouteSpec, RouteTargetReference, TlsConfig, TlsTermination, WildcardPolicy};
