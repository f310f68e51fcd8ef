#![allow(dead_code)]

use async_trait::async_trait;
use c2client::config::{Credentials, Settings};
use c2client::transport::{ApiTransport, HttpRequest, HttpResponse, TransportResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use url::Url;

/// Answers every request with one canned response and keeps what it was sent.
pub struct RecordingTransport {
    response: HttpResponse,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub fn replying(status: u16, body: &str) -> Self {
        RecordingTransport {
            response: HttpResponse {
                status,
                headers: BTreeMap::new(),
                body: body.to_string(),
            },
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn only_request(&self) -> HttpRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().unwrap()
    }
}

#[async_trait]
impl ApiTransport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}

pub fn settings(models_dir: &Path) -> Settings {
    Settings {
        endpoint: Url::parse("https://api.cloud.example/").unwrap(),
        credentials: Credentials {
            access_key_id: "project:user@example".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: None,
        },
        region: "croc".to_string(),
        models_dir: models_dir.to_path_buf(),
        verify_ssl: true,
    }
}

/// Installs `model` as `<dir>/<api>.json`.
pub fn install_model(dir: &Path, api: &str, model: &serde_json::Value) -> PathBuf {
    let path = dir.join(format!("{}.json", api));
    fs::write(&path, model.to_string()).unwrap();
    path
}

/// Form body of a query-protocol request as key/value pairs.
pub fn form_fields(body: &str) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(body.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

pub fn autoscaling_model() -> serde_json::Value {
    serde_json::json!({
        "metadata": {
            "apiVersion": "2011-01-01",
            "endpointPrefix": "autoscaling",
            "protocol": "query",
            "signingName": "autoscaling"
        },
        "operations": {
            "DescribeAutoScalingGroups": {
                "name": "DescribeAutoScalingGroups",
                "http": {"method": "POST", "requestUri": "/"},
                "input": {"shape": "AutoScalingGroupNamesType"}
            },
            "SetDesiredCapacity": {
                "name": "SetDesiredCapacity",
                "http": {"method": "POST", "requestUri": "/"},
                "input": {"shape": "SetDesiredCapacityType"}
            }
        },
        "shapes": {
            "AutoScalingGroupNamesType": {
                "type": "structure",
                "members": {
                    "AutoScalingGroupNames": {"shape": "AutoScalingGroupNames"},
                    "MaxRecords": {"shape": "MaxRecords"},
                    "Filters": {"shape": "Filters"}
                }
            },
            "AutoScalingGroupNames": {"type": "list", "member": {"shape": "ResourceName"}},
            "Filters": {"type": "list", "member": {"shape": "Filter"}},
            "Filter": {
                "type": "structure",
                "members": {
                    "Name": {"shape": "XmlString"},
                    "Values": {"shape": "Values"}
                }
            },
            "Values": {"type": "list", "member": {"shape": "XmlString"}},
            "SetDesiredCapacityType": {
                "type": "structure",
                "required": ["AutoScalingGroupName", "DesiredCapacity"],
                "members": {
                    "AutoScalingGroupName": {"shape": "ResourceName"},
                    "DesiredCapacity": {"shape": "AutoScalingGroupDesiredCapacity"},
                    "HonorCooldown": {"shape": "HonorCooldown"}
                }
            },
            "AutoScalingGroupDesiredCapacity": {"type": "integer"},
            "HonorCooldown": {"type": "boolean"},
            "MaxRecords": {"type": "integer"},
            "ResourceName": {"type": "string"},
            "XmlString": {"type": "string"}
        }
    })
}

pub fn eks_model() -> serde_json::Value {
    serde_json::json!({
        "metadata": {
            "apiVersion": "2017-11-01",
            "endpointPrefix": "eks",
            "protocol": "rest-json",
            "signingName": "eks"
        },
        "operations": {
            "DescribeCluster": {
                "name": "DescribeCluster",
                "http": {"method": "GET", "requestUri": "/clusters/{name}"},
                "input": {"shape": "DescribeClusterRequest"},
                "output": {"shape": "DescribeClusterResponse"}
            }
        },
        "shapes": {
            "DescribeClusterRequest": {
                "type": "structure",
                "required": ["name"],
                "members": {
                    "name": {"shape": "String", "location": "uri", "locationName": "name"}
                }
            },
            "DescribeClusterResponse": {
                "type": "structure",
                "members": {"cluster": {"shape": "Cluster"}}
            },
            "Cluster": {
                "type": "structure",
                "members": {
                    "name": {"shape": "String"},
                    "status": {"shape": "String"},
                    "createdAt": {"shape": "Timestamp"}
                }
            },
            "String": {"type": "string"},
            "Timestamp": {"type": "timestamp"}
        }
    })
}

pub fn route53_model() -> serde_json::Value {
    serde_json::json!({
        "metadata": {
            "apiVersion": "2013-04-01",
            "endpointPrefix": "route53",
            "protocol": "rest-xml"
        },
        "operations": {
            "ListHostedZones": {
                "name": "ListHostedZones",
                "http": {"method": "GET", "requestUri": "/2013-04-01/hostedzone"},
                "input": {"shape": "ListHostedZonesRequest"},
                "output": {"shape": "ListHostedZonesResponse"}
            }
        },
        "shapes": {
            "ListHostedZonesRequest": {
                "type": "structure",
                "members": {
                    "MaxItems": {"shape": "PageMaxItems", "location": "querystring", "locationName": "maxitems"}
                }
            },
            "ListHostedZonesResponse": {
                "type": "structure",
                "members": {
                    "HostedZones": {"shape": "HostedZones"},
                    "IsTruncated": {"shape": "PageTruncated"}
                }
            },
            "HostedZones": {"type": "list", "member": {"shape": "HostedZone", "locationName": "HostedZone"}},
            "HostedZone": {
                "type": "structure",
                "members": {
                    "Id": {"shape": "ResourceId"},
                    "Name": {"shape": "DNSName"}
                }
            },
            "PageMaxItems": {"type": "string"},
            "PageTruncated": {"type": "boolean"},
            "ResourceId": {"type": "string"},
            "DNSName": {"type": "string"}
        }
    })
}
