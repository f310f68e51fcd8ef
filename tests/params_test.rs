use c2client::model::{OperationRegistry, ServiceModel};
use c2client::params::{coerce, decode, FlatParams, ParamsError};
use serde_json::{json, Value};

fn ec2_model() -> ServiceModel {
    let text = json!({
        "metadata": {"apiVersion": "2016-11-15", "protocol": "ec2", "endpointPrefix": "ec2"},
        "operations": {
            "DescribeInstances": {
                "name": "DescribeInstances",
                "http": {"method": "POST", "requestUri": "/"},
                "input": {"shape": "DescribeInstancesRequest"}
            }
        },
        "shapes": {
            "DescribeInstancesRequest": {
                "type": "structure",
                "members": {
                    "Filter": {"shape": "FilterList"},
                    "InstanceId": {"shape": "InstanceIdStringList"},
                    "MaxResults": {"shape": "Integer"},
                    "DryRun": {"shape": "Boolean"}
                }
            },
            "FilterList": {"type": "list", "member": {"shape": "Filter", "locationName": "Filter"}},
            "Filter": {
                "type": "structure",
                "members": {
                    "Name": {"shape": "String"},
                    "Value": {"shape": "ValueStringList"}
                }
            },
            "ValueStringList": {"type": "list", "member": {"shape": "String", "locationName": "item"}},
            "InstanceIdStringList": {"type": "list", "member": {"shape": "String", "locationName": "InstanceId"}},
            "Boolean": {"type": "boolean"},
            "Integer": {"type": "integer"},
            "String": {"type": "string"}
        }
    })
    .to_string();
    ServiceModel::from_json(&text).unwrap()
}

fn call_arguments(action: &str, args: &[&str]) -> Result<Value, ParamsError> {
    let model = ec2_model();
    let registry = OperationRegistry::new(&model);
    let operation = registry.lookup(action).unwrap();
    let input = model.input_shape(operation).unwrap();

    let flat = FlatParams::from_pairs(args);
    let doc = coerce(decode(&flat)?, input, &model)?;
    Ok(Value::from(doc))
}

#[test]
fn test_describe_instances_filter() {
    let args = call_arguments(
        "DescribeInstances",
        &["Filter.1.Name", "instance-state-name", "Filter.1.Value.1", "running"],
    )
    .unwrap();

    assert_eq!(
        args,
        json!({"Filter": [{"Name": "instance-state-name", "Value": ["running"]}]})
    );
}

#[test]
fn test_snake_case_action_and_typed_scalars() {
    let args = call_arguments(
        "describe_instances",
        &[
            "InstanceId.1", "i-1",
            "InstanceId.2", "i-2",
            "MaxResults", "5",
            "DryRun", "False",
        ],
    )
    .unwrap();

    assert_eq!(
        args,
        json!({"InstanceId": ["i-1", "i-2"], "MaxResults": 5, "DryRun": false})
    );
}

#[test]
fn test_scalar_for_list_member_is_rejected() {
    let err = call_arguments("DescribeInstances", &["InstanceId", "i-1"]).unwrap_err();
    assert!(matches!(err, ParamsError::InvalidArgumentShape { .. }));
}

#[test]
fn test_gap_in_indices_is_rejected() {
    let err = call_arguments("DescribeInstances", &["InstanceId.1", "i-1", "InstanceId.3", "i-3"])
        .unwrap_err();
    assert!(matches!(err, ParamsError::MalformedParameters { .. }));
}

#[test]
fn test_unknown_member_passes_through() {
    let args = call_arguments("DescribeInstances", &["Owner.1", "self", "MaxResults", "7"]).unwrap();
    assert_eq!(args, json!({"Owner": ["self"], "MaxResults": 7}));
}
