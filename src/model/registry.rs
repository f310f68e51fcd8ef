use super::errors::{ModelError, ModelResult};
use super::service::{OperationDef, ServiceModel};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref ACRONYM_BOUNDARY: Regex = Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap();
    static ref WORD_BOUNDARY: Regex = Regex::new(r"([a-z\d])([A-Z])").unwrap();
}

/// `DescribeDBInstances` -> `describe_db_instances`.
pub fn to_snake_case(name: &str) -> String {
    let name = ACRONYM_BOUNDARY.replace_all(name, "${1}_${2}");
    let name = WORD_BOUNDARY.replace_all(&name, "${1}_${2}");
    name.replace('-', "_").to_lowercase()
}

/// `lookup_events` -> `LookupEvents`. Names without underscores are
/// returned unchanged; acronyms come out capitalized (`describe_db_instances`
/// -> `DescribeDbInstances`).
pub fn to_pascal_case(name: &str) -> String {
    if !name.contains('_') {
        return name.to_string();
    }
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Operations of one service, addressable by their API name
/// (`DescribeInstances`) or its snake_case form (`describe_instances`).
pub struct OperationRegistry<'m> {
    operations: HashMap<String, &'m OperationDef>,
}

impl<'m> OperationRegistry<'m> {
    pub fn new(model: &'m ServiceModel) -> Self {
        let operations = model
            .operations
            .values()
            .map(|operation| (to_snake_case(&operation.name), operation))
            .collect();
        OperationRegistry { operations }
    }

    pub fn lookup(&self, action: &str) -> ModelResult<&'m OperationDef> {
        self.operations
            .get(&to_snake_case(action))
            .copied()
            .ok_or_else(|| ModelError::unknown_operation(action))
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
