//! Port entries and the rules attached to lists of them.
use std::{collections::HashSet, fmt, str::FromStr, sync::LazyLock};

use k8s_openapi::api::{
    core::v1::{ContainerPort, EndpointPort, ServicePort},
    discovery::v1 as discoveryv1,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    error::ConstraintViolation,
    evaluator::Evaluator,
    path::FieldPath,
    rule::{Reason, Rule},
};

/// A lowercase RFC 1123 label, the format Kubernetes requires for port names
const RFC_1123_LABEL_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?";
const RFC_1123_LABEL_MAX_LENGTH: usize = 63;
const RFC_1123_LABEL_ERROR_MSG: &str = "a lowercase RFC 1123 label must consist of lower case alphanumeric characters or '-', and must start and end with an alphanumeric character";

static RFC_1123_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{RFC_1123_LABEL_FMT}$")).expect("failed to compile RFC 1123 label regex")
});

/// Valid port numbers
pub const PORT_RANGE: std::ops::RangeInclusive<i32> = 1..=65535;

/// Accessor trait for a single entry of a port list.
///
/// Implemented for the generated port types that carry naming constraints.
pub trait PortEntry {
    /// JSON name of the field holding the port number
    const NUMBER_FIELD: &'static str = "port";

    /// The optional port name
    fn name(&self) -> Option<&str>;
    /// The port number, if the type carries one
    fn number(&self) -> Option<i32>;
    /// The raw protocol string, if set
    fn protocol(&self) -> Option<&str>;
}

impl PortEntry for EndpointPort {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn number(&self) -> Option<i32> {
        Some(self.port)
    }

    fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }
}

impl PortEntry for discoveryv1::EndpointPort {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn number(&self) -> Option<i32> {
        self.port
    }

    fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }
}

impl PortEntry for ServicePort {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn number(&self) -> Option<i32> {
        Some(self.port)
    }

    fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }
}

impl PortEntry for ContainerPort {
    const NUMBER_FIELD: &'static str = "containerPort";

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn number(&self) -> Option<i32> {
        Some(self.container_port)
    }

    fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }
}

/// Network protocols supported for ports
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// TCP, the default when unset
    #[default]
    #[serde(rename = "TCP")]
    Tcp,
    /// UDP
    #[serde(rename = "UDP")]
    Udp,
    /// SCTP
    #[serde(rename = "SCTP")]
    Sctp,
}

impl Protocol {
    /// All supported values
    pub const ALL: [Protocol; 3] = [Protocol::Tcp, Protocol::Udp, Protocol::Sctp];

    /// The protocol as written in a manifest
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Sctp => "SCTP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed to parse a [`Protocol`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported protocol {0:?}: supported values: \"TCP\", \"UDP\", \"SCTP\"")]
pub struct ParseProtocolError(pub String);

impl FromStr for Protocol {
    type Err = ParseProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Protocol::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParseProtocolError(s.to_string()))
    }
}

/// Returns false if two entries share a non-null name.
///
/// Entries without a name are never compared against each other.
pub fn has_unique_port_names<P: PortEntry>(subset: &[P]) -> bool {
    let mut seen = HashSet::with_capacity(subset.len());
    subset.iter().filter_map(|p| p.name()).all(|name| seen.insert(name))
}

/// Returns false if a list of more than one entry has an entry without a name.
///
/// A lone port needs no disambiguating name, so lists of zero or one entry pass.
pub fn has_non_null_port_names<P: PortEntry>(subset: &[P]) -> bool {
    subset.len() <= 1 || subset.iter().all(|p| p.name().is_some())
}

/// Rule form of [`has_unique_port_names`]
pub fn unique_port_names<P: PortEntry>() -> Rule<[P]> {
    Rule::new("has_unique_port_names", has_unique_port_names::<P>)
        .reason(Reason::FieldValueDuplicate)
        .message("port names must be unique")
}

/// Rule form of [`has_non_null_port_names`]
pub fn non_null_port_names<P: PortEntry>() -> Rule<[P]> {
    Rule::new("has_non_null_port_names", has_non_null_port_names::<P>)
        .reason(Reason::FieldValueRequired)
        .message("port names are required when more than one port is specified")
}

/// Returns the violation for a port number outside [`PORT_RANGE`]
pub fn port_number_in_range(number: i32, field: &FieldPath) -> Result<(), ConstraintViolation> {
    if PORT_RANGE.contains(&number) {
        return Ok(());
    }
    Err(ConstraintViolation {
        rule: "port_number_in_range".into(),
        field: field.clone(),
        reason: Reason::FieldValueInvalid,
        detail: format!("{number}: must be between 1 and 65535, inclusive"),
    })
}

/// Returns the violation for a protocol that is not a [`Protocol`]
pub fn protocol_supported(protocol: &str, field: &FieldPath) -> Result<(), ConstraintViolation> {
    match protocol.parse::<Protocol>() {
        Ok(_) => Ok(()),
        Err(err) => Err(ConstraintViolation {
            rule: "protocol_supported".into(),
            field: field.clone(),
            reason: Reason::FieldValueNotSupported,
            detail: err.to_string(),
        }),
    }
}

/// Returns the violation for a name that is not a lowercase RFC 1123 label
pub fn port_name_format(name: &str, field: &FieldPath) -> Result<(), ConstraintViolation> {
    let detail = if name.len() > RFC_1123_LABEL_MAX_LENGTH {
        format!("{name:?}: must be no more than {RFC_1123_LABEL_MAX_LENGTH} characters")
    } else if !RFC_1123_LABEL_REGEX.is_match(name) {
        format!(
            "{name:?}: {RFC_1123_LABEL_ERROR_MSG} (e.g. \"http\", regex used for validation is {RFC_1123_LABEL_FMT:?})"
        )
    } else {
        return Ok(());
    };
    Err(ConstraintViolation {
        rule: "port_name_format".into(),
        field: field.clone(),
        reason: Reason::FieldValueInvalid,
        detail,
    })
}

/// Which list-level rules apply to a port list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Naming {
    /// Names must be unique, and present once there is more than one port
    Required,
    /// Names are optional but must be unique when present
    Optional,
}

/// Evaluate the list rules and the per-entry format rules for a port list at `path`
pub(crate) fn validate_ports<P: PortEntry>(
    ports: Option<&[P]>,
    naming: Naming,
    path: &FieldPath,
    ev: &mut Evaluator<'_>,
) {
    let ports = ports.unwrap_or_default();
    ev.check(&unique_port_names::<P>(), ports, path);
    if naming == Naming::Required {
        ev.check(&non_null_port_names::<P>(), ports, path);
    }

    if !ev.params().check_formats {
        return;
    }
    for (i, port) in ports.iter().enumerate() {
        let entry = path.index(i);
        if let Some(name) = port.name() {
            ev.record(port_name_format(name, &entry.child("name")));
        }
        if let Some(number) = port.number() {
            ev.record(port_number_in_range(number, &entry.child(P::NUMBER_FIELD)));
        }
        if let Some(protocol) = port.protocol() {
            ev.record(protocol_supported(protocol, &entry.child("protocol")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(name: Option<&str>, port: i32) -> EndpointPort {
        EndpointPort {
            name: name.map(String::from),
            port,
            ..EndpointPort::default()
        }
    }

    #[test]
    fn distinct_names_pass_both_rules() {
        let ports = [port(Some("a"), 80), port(Some("b"), 81)];
        assert!(has_unique_port_names(&ports));
        assert!(has_non_null_port_names(&ports));
    }

    #[test]
    fn duplicate_names_fail_uniqueness() {
        let ports = [port(Some("a"), 80), port(Some("a"), 81)];
        assert!(!has_unique_port_names(&ports));

        let longer = [port(Some("a"), 80), port(Some("b"), 81), port(Some("c"), 82), port(Some("b"), 83)];
        assert!(!has_unique_port_names(&longer));
    }

    #[test]
    fn null_names_are_not_duplicates() {
        let ports = [port(None, 80), port(None, 81), port(Some("a"), 82)];
        assert!(has_unique_port_names(&ports));
        assert!(!has_non_null_port_names(&ports));
    }

    #[test]
    fn single_entry_is_exempt_from_names() {
        let ports = [port(None, 80)];
        assert!(has_non_null_port_names(&ports));
        assert!(has_unique_port_names(&ports));

        let empty: [EndpointPort; 0] = [];
        assert!(has_non_null_port_names(&empty));
        assert!(has_unique_port_names(&empty));
    }

    #[test]
    fn missing_name_in_pair_fails() {
        let ports = [port(None, 80), port(Some("b"), 81)];
        assert!(!has_non_null_port_names(&ports));
        assert!(has_unique_port_names(&ports));
    }

    #[test]
    fn rules_report_list_path() {
        let ports = [port(Some("a"), 80), port(Some("a"), 81)];
        let path = FieldPath::from("subsets[0].ports");
        let err = unique_port_names().check(&ports[..], &path).unwrap_err();
        assert_eq!(err.rule, "has_unique_port_names");
        assert_eq!(err.field, path);
        assert_eq!(err.reason, Reason::FieldValueDuplicate);
        assert!(non_null_port_names().check(&ports[..], &path).is_ok());
    }

    #[test]
    fn protocols() {
        assert_eq!("SCTP".parse::<Protocol>(), Ok(Protocol::Sctp));
        assert_eq!(Protocol::default().to_string(), "TCP");
        assert!("tcp".parse::<Protocol>().is_err());

        let field = FieldPath::from("ports[0].protocol");
        let err = protocol_supported("HTTP", &field).unwrap_err();
        assert_eq!(err.reason, Reason::FieldValueNotSupported);
        assert!(protocol_supported("UDP", &field).is_ok());
    }

    #[test]
    fn port_number_bounds() {
        let field = FieldPath::from("ports[0].port");
        assert!(port_number_in_range(1, &field).is_ok());
        assert!(port_number_in_range(65535, &field).is_ok());
        assert!(port_number_in_range(0, &field).is_err());
        assert!(port_number_in_range(65536, &field).is_err());
    }

    #[test]
    fn number_field_follows_json_name() {
        assert_eq!(<EndpointPort as PortEntry>::NUMBER_FIELD, "port");
        assert_eq!(<ServicePort as PortEntry>::NUMBER_FIELD, "port");
        assert_eq!(<discoveryv1::EndpointPort as PortEntry>::NUMBER_FIELD, "port");
        assert_eq!(<ContainerPort as PortEntry>::NUMBER_FIELD, "containerPort");

        let ports = [ContainerPort {
            container_port: 70000,
            ..ContainerPort::default()
        }];
        let params = crate::params::ValidationParams::default();
        let mut ev = Evaluator::new(&params);
        validate_ports(Some(&ports[..]), Naming::Optional, &"ports".into(), &mut ev);
        let violations = ev.finish().unwrap_err();
        let v = violations.iter().next().unwrap();
        assert_eq!(v.rule, "port_number_in_range");
        assert_eq!(v.field.as_str(), "ports[0].containerPort");
    }

    #[test]
    fn port_name_formats() {
        let field = FieldPath::from("ports[0].name");
        for valid in ["http", "https-8443", "a", "dns-tcp", "9000"] {
            assert!(port_name_format(valid, &field).is_ok(), "{valid} should be accepted");
        }
        for invalid in ["", "HTTP", "-http", "http-", "web_ui", "a.b"] {
            assert!(port_name_format(invalid, &field).is_err(), "{invalid} should be rejected");
        }
        let too_long = "a".repeat(64);
        let err = port_name_format(&too_long, &field).unwrap_err();
        assert!(err.detail.contains("no more than 63"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        fn port_entries() -> impl Strategy<Value = Vec<(Option<String>, i32)>> {
            prop::collection::vec((prop::option::of("[a-d]{1,2}"), 1..=65535i32), 0..8)
        }

        fn build(entries: &[(Option<String>, i32)]) -> Vec<EndpointPort> {
            entries
                .iter()
                .map(|(name, port)| EndpointPort {
                    name: name.clone(),
                    port: *port,
                    ..EndpointPort::default()
                })
                .collect()
        }

        fn names_distinct(entries: &[(Option<String>, i32)]) -> bool {
            let names: Vec<_> = entries.iter().filter_map(|(n, _)| n.as_deref()).collect();
            names.iter().collect::<HashSet<_>>().len() == names.len()
        }

        proptest! {
            #[test]
            fn uniqueness_matches_distinct_non_null_names(entries in port_entries()) {
                prop_assert_eq!(has_unique_port_names(&build(&entries)), names_distinct(&entries));
            }

            #[test]
            fn repeated_name_is_a_duplicate(mut entries in port_entries(), name in "[a-d]{1,2}", at in any::<prop::sample::Index>()) {
                entries.push((Some(name.clone()), 80));
                let i = at.index(entries.len());
                entries.insert(i, (Some(name), 81));
                prop_assert!(!has_unique_port_names(&build(&entries)));
            }

            #[test]
            fn short_lists_never_need_names(entries in prop::collection::vec((prop::option::of("[a-d]"), 1..=65535i32), 0..=1)) {
                prop_assert!(has_non_null_port_names(&build(&entries)));
            }

            #[test]
            fn unnamed_entry_in_longer_list_fails(mut entries in port_entries(), at in any::<prop::sample::Index>()) {
                entries.push((Some("x".into()), 80));
                let i = at.index(entries.len());
                entries.insert(i, (None, 81));
                prop_assert!(!has_non_null_port_names(&build(&entries)));
            }

            #[test]
            fn all_named_lists_pass_non_null(names in prop::collection::vec("[a-z]{1,4}", 0..8)) {
                let entries: Vec<_> = names.into_iter().map(|n| (Some(n), 80)).collect();
                prop_assert!(has_non_null_port_names(&build(&entries)));
            }
        }
    }
}
