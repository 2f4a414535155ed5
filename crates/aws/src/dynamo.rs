use std::collections::HashMap;

use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_json::{Map, Value};
use tokio::runtime::Runtime;

use crate::error::AwsError;

/// A table that accepts whole records.
pub trait RecordStore {
    fn put_record(&self, record: &Map<String, Value>) -> Result<(), AwsError>;
}

/// DynamoDB table written with `PutItem`, one record per call.
pub struct DynamoStore {
    client: Client,
    table_name: String,
    runtime: Runtime,
}

impl DynamoStore {
    /// `endpoint_url` overrides the service endpoint (e.g. a local
    /// DynamoDB).
    pub fn connect(table_name: &str, region: &str, endpoint_url: Option<&str>) -> Result<Self, AwsError> {
        let runtime = crate::runtime()?;
        let sdk_config = crate::load_sdk_config(&runtime);

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config)
            .region(Region::new(region.to_string()));
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            table_name: table_name.to_string(),
            runtime,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

impl RecordStore for DynamoStore {
    fn put_record(&self, record: &Map<String, Value>) -> Result<(), AwsError> {
        let item: HashMap<String, AttributeValue> = record
            .iter()
            .map(|(k, v)| (k.clone(), json_to_attribute(v)))
            .collect();

        self.runtime
            .block_on(
                self.client
                    .put_item()
                    .table_name(&self.table_name)
                    .set_item(Some(item))
                    .send(),
            )
            .map_err(|e| AwsError::service("PutItem", e))?;
        Ok(())
    }
}

/// Convert a JSON value to its DynamoDB attribute. Numbers keep their
/// textual form.
pub fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(json_to_attribute).collect()),
        Value::Object(obj) => AttributeValue::M(
            obj.iter()
                .map(|(k, v)| (k.clone(), json_to_attribute(v)))
                .collect(),
        ),
    }
}
