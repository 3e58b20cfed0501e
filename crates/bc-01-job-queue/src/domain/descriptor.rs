//! # Call Descriptor
//!
//! Canonical form of a contract call as the node's compiler expects it.
//!
//! Positional arguments are named `arg<i>` and the names are sorted as text,
//! so eleven arguments order as `arg0, arg1, arg10, arg2, ... arg9`. The name
//! list and the name→value map both derive from the one sorted pair list.

use serde_json::{Map, Value};
use shared_types::{Address, U256};

/// Caller sent to the node when no account is linked.
pub const CALLER_UNSET: &str = "0x";

/// Caller-facing request for one contract call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractCall {
    pub contract: String,
    pub call: String,
    /// Positional arguments
    pub args: Vec<Value>,
    /// Value in wei attached to the call
    pub amount: Option<U256>,
    /// Gas limit for this call only
    pub gas_limit: Option<u64>,
}

impl ContractCall {
    pub fn new(contract: impl Into<String>, call: impl Into<String>) -> Self {
        Self {
            contract: contract.into(),
            call: call.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn args<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn amount(mut self, wei: U256) -> Self {
        self.amount = Some(wei);
        self
    }

    pub fn gas_limit(mut self, gas: u64) -> Self {
        self.gas_limit = Some(gas);
        self
    }
}

/// Fully resolved call, ready for `getTkObj`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallDescriptor {
    pub app_name: String,
    pub contract_name: String,
    pub call_name: String,
    /// `(name, value)` pairs in text order of the names
    pub args: Vec<(String, Value)>,
    pub caller: Option<Address>,
    pub amount: Option<U256>,
    pub gas_override: Option<u64>,
}

impl CallDescriptor {
    pub fn build(app_name: &str, call: ContractCall, caller: Option<Address>) -> Self {
        let mut args: Vec<(String, Value)> = call
            .args
            .into_iter()
            .enumerate()
            .map(|(i, value)| (format!("arg{}", i), value))
            .collect();
        args.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            app_name: app_name.to_string(),
            contract_name: call.contract,
            call_name: call.call,
            args,
            caller,
            amount: call.amount,
            gas_override: call.gas_limit,
        }
    }

    pub fn ordered_names(&self) -> Vec<&str> {
        self.args.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn arg_map(&self) -> Map<String, Value> {
        self.args
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    pub fn caller_text(&self) -> String {
        self.caller
            .map(|a| a.to_hex())
            .unwrap_or_else(|| CALLER_UNSET.to_string())
    }

    /// Positional params of `getTkObj`.
    ///
    /// `[app, contract, call, names, caller, amount, argMap]`, plus the gas
    /// override as an eighth element only when one is set. Amounts go out as
    /// decimal strings, a missing amount as `null`.
    pub fn to_params(&self) -> Value {
        let names: Vec<Value> = self
            .ordered_names()
            .into_iter()
            .map(|n| Value::String(n.to_string()))
            .collect();
        let amount = self
            .amount
            .map(|a| Value::String(a.to_string()))
            .unwrap_or(Value::Null);

        let mut params = vec![
            Value::String(self.app_name.clone()),
            Value::String(self.contract_name.clone()),
            Value::String(self.call_name.clone()),
            Value::Array(names),
            Value::String(self.caller_text()),
            amount,
            Value::Object(self.arg_map()),
        ];
        if let Some(gas) = self.gas_override {
            params.push(Value::from(gas));
        }
        Value::Array(params)
    }
}
