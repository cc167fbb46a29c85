//! evok JSON-RPC adapter.
//!
//! Implements [`IoBackend`] against the `/rpc` endpoint of the UniPi evok
//! daemon.  Requests are JSON-RPC 2.0 with positional parameters:
//!
//! ```text
//!  → {"id": 7, "jsonrpc": "2.0", "method": "relay_get", "params": ["al_pump"]}
//!  ← {"id": 7, "jsonrpc": "2.0", "result": [1, false]}
//!  ← {"id": 7, "jsonrpc": "2.0", "error": {"code": -32000, "message": "..."}}
//! ```
//!
//! The reply decoders are public and independent of the transport so they
//! can be fuzzed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::{debug, trace};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::app::ports::{IoBackend, SensorReading};
use crate::error::{Error, Result};

/// Per-request HTTP timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct EvokClient {
    url: String,
    http: reqwest::blocking::Client,
    counter: AtomicU64,
}

impl EvokClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            url: url.into(),
            http,
            counter: AtomicU64::new(0),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn call(&self, method: &'static str, params: Value) -> Result<Value> {
        let id = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let request = json!({
            "id": id,
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        trace!("rpc -> {request}");
        let body = self
            .http
            .post(&self.url)
            .json(&request)
            .send()?
            .error_for_status()?
            .bytes()?;
        let result = parse_response(method, &body)?;
        trace!("rpc <- {method}: {result}");
        Ok(result)
    }
}

impl IoBackend for EvokClient {
    fn get_relay_state(&self, alias: &str) -> Result<bool> {
        decode_relay(&self.call("relay_get", json!([alias]))?)
    }

    fn set_relay_state(&self, alias: &str, on: bool) -> Result<()> {
        debug!("relay_set {alias} = {on}");
        self.call("relay_set", json!([alias, on]))?;
        Ok(())
    }

    fn get_input_state(&self, alias: &str) -> Result<bool> {
        decode_input(&self.call("input_get", json!([alias]))?)
    }

    fn get_sensor_reading(&self, alias: &str) -> Result<SensorReading> {
        decode_sensor(&self.call("sensor_get", json!([alias]))?)
    }
}

// ---------------------------------------------------------------------------
// Reply decoding
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Unwrap a JSON-RPC reply body into its `result`, or the error it carries.
///
/// A `null` result is valid (`relay_set` answers with one); a reply with
/// neither member is not.
pub fn parse_response(method: &'static str, body: &[u8]) -> Result<Value> {
    let decode = |detail: String| Error::Decode { method, detail };
    let mut resp: serde_json::Map<String, Value> =
        serde_json::from_slice(body).map_err(|e| decode(e.to_string()))?;

    match resp.remove("error") {
        None | Some(Value::Null) => {}
        Some(err) => {
            let err: RpcError =
                serde_json::from_value(err).map_err(|e| decode(e.to_string()))?;
            return Err(Error::Protocol {
                code: err.code,
                message: err.message,
            });
        }
    }
    resp.remove("result")
        .ok_or_else(|| decode("neither result nor error present".into()))
}

/// Relay state: `[value, ...]` for relays, a bare value for user LEDs.
pub fn decode_relay(result: &Value) -> Result<bool> {
    let value = match result {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    value
        .and_then(as_bool)
        .ok_or_else(|| decode_error("relay_get", result))
}

/// Input state: `[value, ...]`.
pub fn decode_input(result: &Value) -> Result<bool> {
    result
        .as_array()
        .and_then(|items| items.first())
        .and_then(as_bool)
        .ok_or_else(|| decode_error("input_get", result))
}

/// 1-Wire sensor: `[value, lost, time, interval]`.
pub fn decode_sensor(result: &Value) -> Result<SensorReading> {
    let items = result
        .as_array()
        .filter(|items| items.len() >= 4)
        .ok_or_else(|| decode_error("sensor_get", result))?;
    let field = |i: usize| items[i].as_f64().ok_or_else(|| decode_error("sensor_get", result));
    let lost = as_bool(&items[1]).ok_or_else(|| decode_error("sensor_get", result))?;
    Ok(SensorReading {
        value: field(0)? as f32,
        lost,
        timestamp: field(2)?,
        interval: field(3)?,
    })
}

/// evok reports digital levels as `0`/`1` or as JSON booleans.
fn as_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        _ => None,
    }
}

fn decode_error(method: &'static str, result: &Value) -> Error {
    Error::Decode {
        method,
        detail: format!("unexpected result {result}"),
    }
}
