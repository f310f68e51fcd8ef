use super::hooks::{
    autoscaling_filter_values, renumber_filter_values, strip_member_segment, ExemptionPredicate,
    KeyRewrite,
};
use crate::model::Protocol;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceId {
    AutoScaling,
    Backup,
    CloudTrail,
    CloudWatch,
    DirectConnect,
    Ec2,
    Efs,
    Eks,
    LegacyEks,
    Elb,
    Iam,
    Paas,
    Route53,
}

/// How CLI parameters become request arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Flat keys go onto the query-protocol wire unchanged.
    LegacyFlat,
    /// Decoded; the listed top-level keys become integers, the rest stay strings.
    LegacyNamedIntegers(&'static [&'static str]),
    /// Decoded and coerced against the operation's input shape. Falls back to
    /// heuristic guessing when no model is installed and `fallback` allows it.
    Schema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Xml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Default,
    /// Privileged services sign with the base account's access key.
    Base,
}

/// Wire settings used when no service model is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireDefaults {
    pub protocol: Protocol,
    pub api_version: &'static str,
    pub signing_name: &'static str,
    pub target_prefix: Option<&'static str>,
    pub json_version: &'static str,
}

#[derive(Clone, Copy)]
pub struct ServiceConfig {
    pub id: ServiceId,
    pub program: &'static str,
    /// Service-model file name, also the default signing name.
    pub api: &'static str,
    pub endpoint_var: &'static str,
    pub mode: Mode,
    pub output: OutputFormat,
    pub credentials: CredentialKind,
    pub fallback: Option<WireDefaults>,
    pub rewrites: &'static [KeyRewrite],
    pub exempt: Option<ExemptionPredicate>,
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("id", &self.id)
            .field("program", &self.program)
            .field("api", &self.api)
            .field("mode", &self.mode)
            .field("rewrites", &self.rewrites.len())
            .field("exempt", &self.exempt.is_some())
            .finish()
    }
}

impl ServiceConfig {
    pub fn get(id: ServiceId) -> &'static ServiceConfig {
        SERVICES
            .iter()
            .find(|service| service.id == id)
            .unwrap_or_else(|| unreachable!("service {:?} missing from table", id))
    }

    pub fn by_program(program: &str) -> Option<&'static ServiceConfig> {
        SERVICES.iter().find(|service| service.program == program)
    }

    pub fn is_exempt(&self, key: &str) -> bool {
        self.exempt.is_some_and(|exempt| exempt(key))
    }
}

const CLOUDTRAIL_INTEGERS: &[&str] = &["MaxResults", "StartTime", "EndTime"];

pub static SERVICES: &[ServiceConfig] = &[
    ServiceConfig {
        id: ServiceId::AutoScaling,
        program: "c2-as",
        api: "autoscaling",
        endpoint_var: "AUTO_SCALING_URL",
        mode: Mode::Schema,
        output: OutputFormat::Json,
        credentials: CredentialKind::Default,
        fallback: Some(WireDefaults {
            protocol: Protocol::Query,
            api_version: "2011-01-01",
            signing_name: "autoscaling",
            target_prefix: None,
            json_version: "1.0",
        }),
        rewrites: &[strip_member_segment, renumber_filter_values],
        exempt: Some(autoscaling_filter_values),
    },
    ServiceConfig {
        id: ServiceId::Backup,
        program: "c2-bs",
        api: "backup",
        endpoint_var: "BACKUP_URL",
        mode: Mode::Schema,
        output: OutputFormat::Json,
        credentials: CredentialKind::Default,
        fallback: None,
        rewrites: &[],
        exempt: None,
    },
    ServiceConfig {
        id: ServiceId::CloudTrail,
        program: "c2-ct",
        api: "cloudtrail",
        endpoint_var: "AWS_CLOUDTRAIL_URL",
        mode: Mode::LegacyNamedIntegers(CLOUDTRAIL_INTEGERS),
        output: OutputFormat::Json,
        credentials: CredentialKind::Default,
        fallback: Some(WireDefaults {
            protocol: Protocol::Json,
            api_version: "2013-11-01",
            signing_name: "cloudtrail",
            target_prefix: Some("com.amazonaws.cloudtrail.v20131101.CloudTrail_20131101"),
            json_version: "1.1",
        }),
        rewrites: &[],
        exempt: None,
    },
    ServiceConfig {
        id: ServiceId::CloudWatch,
        program: "c2-cw",
        api: "monitoring",
        endpoint_var: "AWS_CLOUDWATCH_URL",
        mode: Mode::LegacyFlat,
        output: OutputFormat::Xml,
        credentials: CredentialKind::Default,
        fallback: Some(WireDefaults {
            protocol: Protocol::Query,
            api_version: "2010-08-01",
            signing_name: "monitoring",
            target_prefix: None,
            json_version: "1.0",
        }),
        rewrites: &[],
        exempt: None,
    },
    ServiceConfig {
        id: ServiceId::DirectConnect,
        program: "c2-dc",
        api: "directconnect",
        endpoint_var: "DIRECT_CONNECT_URL",
        mode: Mode::Schema,
        output: OutputFormat::Json,
        credentials: CredentialKind::Default,
        fallback: Some(WireDefaults {
            protocol: Protocol::Json,
            api_version: "2012-10-25",
            signing_name: "directconnect",
            target_prefix: Some("OvertureService"),
            json_version: "1.1",
        }),
        rewrites: &[],
        exempt: None,
    },
    ServiceConfig {
        id: ServiceId::Ec2,
        program: "c2-ec2",
        api: "ec2",
        endpoint_var: "EC2_URL",
        mode: Mode::LegacyFlat,
        output: OutputFormat::Xml,
        credentials: CredentialKind::Default,
        fallback: Some(WireDefaults {
            protocol: Protocol::Ec2,
            api_version: "2016-11-15",
            signing_name: "ec2",
            target_prefix: None,
            json_version: "1.0",
        }),
        rewrites: &[renumber_filter_values],
        exempt: None,
    },
    ServiceConfig {
        id: ServiceId::Efs,
        program: "c2-efs",
        api: "efs",
        endpoint_var: "EFS_URL",
        mode: Mode::Schema,
        output: OutputFormat::Json,
        credentials: CredentialKind::Default,
        fallback: None,
        rewrites: &[],
        exempt: None,
    },
    ServiceConfig {
        id: ServiceId::Eks,
        program: "c2-eks",
        api: "eks",
        endpoint_var: "EKS_URL",
        mode: Mode::Schema,
        output: OutputFormat::Json,
        credentials: CredentialKind::Default,
        fallback: None,
        rewrites: &[],
        exempt: None,
    },
    ServiceConfig {
        id: ServiceId::LegacyEks,
        program: "c2-eks-legacy",
        api: "eks-legacy",
        endpoint_var: "LEGACY_EKS_URL",
        mode: Mode::Schema,
        output: OutputFormat::Json,
        credentials: CredentialKind::Default,
        fallback: None,
        rewrites: &[],
        exempt: None,
    },
    ServiceConfig {
        id: ServiceId::Elb,
        program: "c2-elb",
        api: "elbv2",
        endpoint_var: "ELB_URL",
        mode: Mode::Schema,
        output: OutputFormat::Json,
        credentials: CredentialKind::Default,
        fallback: Some(WireDefaults {
            protocol: Protocol::Query,
            api_version: "2015-12-01",
            signing_name: "elasticloadbalancing",
            target_prefix: None,
            json_version: "1.0",
        }),
        rewrites: &[strip_member_segment],
        exempt: None,
    },
    ServiceConfig {
        id: ServiceId::Iam,
        program: "c2-iam",
        api: "iam",
        endpoint_var: "IAM_URL",
        mode: Mode::Schema,
        output: OutputFormat::Json,
        credentials: CredentialKind::Base,
        fallback: Some(WireDefaults {
            protocol: Protocol::Query,
            api_version: "2010-05-08",
            signing_name: "iam",
            target_prefix: None,
            json_version: "1.0",
        }),
        rewrites: &[strip_member_segment],
        exempt: None,
    },
    ServiceConfig {
        id: ServiceId::Paas,
        program: "c2-paas",
        api: "paas",
        endpoint_var: "PAAS_URL",
        mode: Mode::Schema,
        output: OutputFormat::Json,
        credentials: CredentialKind::Default,
        fallback: None,
        rewrites: &[],
        exempt: None,
    },
    ServiceConfig {
        id: ServiceId::Route53,
        program: "c2-route53",
        api: "route53",
        endpoint_var: "ROUTE53_URL",
        mode: Mode::Schema,
        output: OutputFormat::Json,
        credentials: CredentialKind::Default,
        fallback: None,
        rewrites: &[],
        exempt: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_id_has_one_entry() {
        let ids: HashSet<_> = SERVICES.iter().map(|s| format!("{:?}", s.id)).collect();
        assert_eq!(ids.len(), SERVICES.len());
        assert_eq!(ServiceConfig::get(ServiceId::Ec2).program, "c2-ec2");
        assert_eq!(ServiceConfig::get(ServiceId::LegacyEks).endpoint_var, "LEGACY_EKS_URL");
    }

    #[test]
    fn test_programs_are_unique() {
        let programs: HashSet<_> = SERVICES.iter().map(|s| s.program).collect();
        assert_eq!(programs.len(), SERVICES.len());
        assert_eq!(
            ServiceConfig::by_program("c2-as").map(|s| s.id),
            Some(ServiceId::AutoScaling)
        );
        assert!(ServiceConfig::by_program("c2-nope").is_none());
    }

    #[test]
    fn test_legacy_services_have_wire_defaults() {
        for service in SERVICES.iter().filter(|s| s.mode != Mode::Schema) {
            assert!(service.fallback.is_some(), "{}", service.program);
        }
    }

    #[test]
    fn test_rest_services_have_no_fallback() {
        for service in SERVICES {
            if let Some(defaults) = service.fallback {
                assert!(!defaults.protocol.is_rest(), "{}", service.program);
            }
        }
    }

    #[test]
    fn test_exemption_lookup() {
        let autoscaling = ServiceConfig::get(ServiceId::AutoScaling);
        assert!(autoscaling.is_exempt("Filters.1.Values.1"));
        assert!(!autoscaling.is_exempt("MaxRecords"));
        assert!(!ServiceConfig::get(ServiceId::Elb).is_exempt("Filters.1.Values.1"));
    }
}
