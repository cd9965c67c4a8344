//! Constraints on the generated resource types that carry port lists.
use k8s_openapi::api::{
    core::v1::{Container, EndpointSubset, Endpoints, Pod, PodSpec, Service, ServiceSpec},
    discovery::v1::EndpointSlice,
};

use crate::{
    evaluator::Evaluator,
    path::FieldPath,
    ports::{validate_ports, Naming},
    validate::{validate_each, Validate},
};

impl Validate for EndpointSubset {
    fn validate_into(&self, path: &FieldPath, ev: &mut Evaluator<'_>) {
        validate_ports(self.ports.as_deref(), Naming::Required, &path.child("ports"), ev);
    }
}

impl Validate for Endpoints {
    fn validate_into(&self, path: &FieldPath, ev: &mut Evaluator<'_>) {
        validate_each(self.subsets.as_deref(), &path.child("subsets"), ev);
    }
}

impl Validate for ServiceSpec {
    fn validate_into(&self, path: &FieldPath, ev: &mut Evaluator<'_>) {
        validate_ports(self.ports.as_deref(), Naming::Required, &path.child("ports"), ev);
    }
}

impl Validate for Service {
    fn validate_into(&self, path: &FieldPath, ev: &mut Evaluator<'_>) {
        self.spec.validate_into(&path.child("spec"), ev);
    }
}

// slice ports may be unnamed, as the apiserver allows, but names must not repeat
impl Validate for EndpointSlice {
    fn validate_into(&self, path: &FieldPath, ev: &mut Evaluator<'_>) {
        validate_ports(self.ports.as_deref(), Naming::Optional, &path.child("ports"), ev);
    }
}

// container port names are optional even when a container exposes several ports
impl Validate for Container {
    fn validate_into(&self, path: &FieldPath, ev: &mut Evaluator<'_>) {
        validate_ports(self.ports.as_deref(), Naming::Optional, &path.child("ports"), ev);
    }
}

impl Validate for PodSpec {
    fn validate_into(&self, path: &FieldPath, ev: &mut Evaluator<'_>) {
        validate_each(Some(self.containers.as_slice()), &path.child("containers"), ev);
        validate_each(self.init_containers.as_deref(), &path.child("initContainers"), ev);
    }
}

impl Validate for Pod {
    fn validate_into(&self, path: &FieldPath, ev: &mut Evaluator<'_>) {
        self.spec.validate_into(&path.child("spec"), ev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{params::ValidationParams, rule::Reason};
    use serde_json::json;

    fn endpoints(subsets: serde_json::Value) -> Endpoints {
        serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Endpoints",
            "metadata": { "name": "web" },
            "subsets": subsets,
        }))
        .unwrap()
    }

    #[test]
    fn endpoints_with_named_ports() {
        let ep = endpoints(json!([
            { "ports": [{ "name": "a", "port": 80 }, { "name": "b", "port": 81 }] }
        ]));
        assert!(ep.validate().is_ok());
    }

    #[test]
    fn endpoints_without_subsets_or_ports() {
        assert!(Endpoints::default().validate().is_ok());
        assert!(endpoints(json!([{ "addresses": [{ "ip": "10.0.0.1" }] }])).validate().is_ok());
    }

    #[test]
    fn single_unnamed_endpoint_port() {
        let ep = endpoints(json!([{ "ports": [{ "port": 80 }] }]));
        assert!(ep.validate().is_ok());
    }

    #[test]
    fn duplicate_names_in_second_subset() {
        let ep = endpoints(json!([
            { "ports": [{ "name": "a", "port": 80 }] },
            { "ports": [{ "name": "a", "port": 80 }, { "name": "a", "port": 81 }] },
        ]));
        let violations = ep.validate().unwrap_err();
        assert_eq!(violations.len(), 1);
        let v = violations.iter().next().unwrap();
        assert_eq!(v.rule, "has_unique_port_names");
        assert_eq!(v.field.as_str(), "subsets[1].ports");
        assert_eq!(v.reason, Reason::FieldValueDuplicate);
    }

    #[test]
    fn unnamed_port_in_pair() {
        let ep = endpoints(json!([
            { "ports": [{ "port": 80 }, { "name": "b", "port": 81 }] }
        ]));
        let violations = ep.validate().unwrap_err();
        assert_eq!(violations.rules().collect::<Vec<_>>(), ["has_non_null_port_names"]);
        assert_eq!(violations.iter().next().unwrap().field.as_str(), "subsets[0].ports");
    }

    #[test]
    fn entry_formats() {
        let ep = endpoints(json!([
            { "ports": [
                { "name": "HTTP", "port": 80 },
                { "name": "b", "port": 0, "protocol": "ICMP" },
            ] }
        ]));
        let violations = ep.validate().unwrap_err();
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, [
            "subsets[0].ports[0].name",
            "subsets[0].ports[1].port",
            "subsets[0].ports[1].protocol",
        ]);

        let structural = ValidationParams::default().skip_formats();
        assert!(ep.validate_with(&structural).is_ok());
    }

    #[test]
    fn fail_fast_reports_one() {
        let ep = endpoints(json!([
            { "ports": [{ "port": 80 }, { "port": 80 }] },
            { "ports": [{ "name": "x", "port": 1 }, { "name": "x", "port": 2 }] },
        ]));
        assert_eq!(ep.validate().unwrap_err().len(), 2);
        let params = ValidationParams::default().fail_fast();
        assert_eq!(ep.validate_with(&params).unwrap_err().len(), 1);
    }

    #[test]
    fn service_ports() {
        let svc: Service = serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": { "name": "web" },
            "spec": {
                "ports": [
                    { "name": "http", "port": 80, "protocol": "TCP" },
                    { "name": "http", "port": 443, "protocol": "TCP" },
                ]
            }
        }))
        .unwrap();
        let violations = svc.validate().unwrap_err();
        assert_eq!(violations.iter().next().unwrap().field.as_str(), "spec.ports");
        assert!(Service::default().validate().is_ok());
    }

    #[test]
    fn endpoint_slice_ports() {
        let slice: EndpointSlice = serde_json::from_value(json!({
            "apiVersion": "discovery.k8s.io/v1",
            "kind": "EndpointSlice",
            "metadata": { "name": "web-abc" },
            "addressType": "IPv4",
            "endpoints": [],
            "ports": [{ "name": "http" }, { "port": 443 }, { "name": "http", "port": 8080 }]
        }))
        .unwrap();
        let violations = slice.validate().unwrap_err();
        assert_eq!(violations.rules().collect::<Vec<_>>(), ["has_unique_port_names"]);

        let mut unnamed = slice.clone();
        unnamed.ports.as_mut().unwrap().pop();
        assert!(unnamed.validate().is_ok());
    }

    #[test]
    fn container_ports_only_need_unique_names() {
        let pod: Pod = serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "name": "web" },
            "spec": {
                "containers": [
                    { "name": "app", "ports": [{ "containerPort": 8080 }, { "containerPort": 9090 }] },
                    { "name": "sidecar", "ports": [
                        { "name": "metrics", "containerPort": 9100 },
                        { "name": "metrics", "containerPort": 9101 },
                    ] },
                ],
                "initContainers": [
                    { "name": "init", "ports": [{ "containerPort": 70000 }] }
                ]
            }
        }))
        .unwrap();
        let violations = pod.validate().unwrap_err();
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, [
            "spec.containers[1].ports",
            "spec.initContainers[0].ports[0].containerPort",
        ]);
    }
}
