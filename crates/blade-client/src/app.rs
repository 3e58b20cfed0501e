//! # App Registration and Contract Reads

use serde_json::{json, Map, Value};

use crate::config::{ClientConfig, ContractConfig};

/// Remote methods for app-level calls.
pub mod methods {
    pub const NEW_APP: &str = "newApp";
    pub const CALL: &str = "call";
    pub const ACCOUNTS: &str = "accounts";
}

/// `newApp` params for one contract:
/// `[app, version, ctr, artifact path, condition map]`.
///
/// The condition map names the condition script only when the contract
/// lists `cond_type`; otherwise it is empty.
pub fn registration_params(config: &ClientConfig, contract: &ContractConfig, cond_type: &str) -> Value {
    let mut condition = Map::new();
    if contract.has_condition(cond_type) {
        let script = config.condition_path(&contract.ctr_name, cond_type);
        condition.insert(
            cond_type.to_string(),
            Value::String(script.to_string_lossy().into_owned()),
        );
    }

    json!([
        config.app_name,
        config.version,
        contract.ctr_name,
        config.artifact_path(&contract.ctr_name).to_string_lossy(),
        condition,
    ])
}

/// Params for a read-only `call`.
pub fn call_params(app_name: &str, contract: &str, call_name: &str, args: Vec<Value>) -> Value {
    json!({
        "appName": app_name,
        "ctrName": contract,
        "callName": call_name,
        "args": args,
    })
}
