// Plan model: an ordered list of operations, each pairing the requests
// that perform a change with the requests that undo it. Plans are value
// objects; they are built once by a generator and then only read.

use crate::error::PlanError;
use anyhow::{Context, Result};
use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Which half of every operation a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Apply,
    Revert,
}

/// Opaque JSON request body. The bytes are kept exactly as generated or
/// loaded, so a literal `null` body stays distinct from an absent one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Body(Box<RawValue>);

impl Body {
    /// Serialize `value` into a compact JSON body.
    pub fn from_value<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        serde_json::value::to_raw_value(value).map(Body)
    }

    /// Wrap an existing JSON document without reformatting it.
    pub fn from_json(json: impl Into<String>) -> serde_json::Result<Self> {
        RawValue::from_string(json.into()).map(Body)
    }

    /// The raw JSON text, byte for byte.
    pub fn get(&self) -> &str {
        self.0.get()
    }

    /// Re-render the body with two-space indentation for display.
    pub fn pretty(&self) -> serde_json::Result<String> {
        let value: serde_json::Value = serde_json::from_str(self.get())?;
        serde_json::to_string_pretty(&value)
    }
}

impl PartialEq for Body {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl Eq for Body {}

// A present `body` key always yields `Some`, even when its value is `null`.
fn present_body<'de, D>(deserializer: D) -> Result<Option<Body>, D::Error>
where
    D: Deserializer<'de>,
{
    Body::deserialize(deserializer).map(Some)
}

/// A single server-relative HTTP call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    path: String,
    method: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_body"
    )]
    body: Option<Body>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>, body: Option<Body>) -> Self {
        Request {
            path: path.into(),
            method: method.as_str().to_owned(),
            body,
        }
    }

    /// Path relative to the server root, including any query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Parse the stored verb for execution.
    pub fn http_method(&self) -> Result<Method, PlanError> {
        Method::from_bytes(self.method.as_bytes())
            .map_err(|_| PlanError::InvalidMethod(self.method.clone()))
    }
}

/// One reversible unit: `revert[i]` undoes `apply[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    apply: Vec<Request>,
    revert: Vec<Request>,
}

impl Operation {
    /// An operation made of a single request and its inverse.
    pub fn new(apply: Request, revert: Request) -> Self {
        Operation {
            apply: vec![apply],
            revert: vec![revert],
        }
    }

    pub fn apply(&self) -> &[Request] {
        &self.apply
    }

    pub fn revert(&self) -> &[Request] {
        &self.revert
    }

    pub fn requests(&self, direction: Direction) -> &[Request] {
        match direction {
            Direction::Apply => &self.apply,
            Direction::Revert => &self.revert,
        }
    }

    fn validate(&self, index: usize) -> Result<(), PlanError> {
        if self.apply.is_empty() {
            return Err(PlanError::EmptyOperation(index));
        }
        if self.apply.len() != self.revert.len() {
            return Err(PlanError::UnpairedOperation {
                index,
                apply: self.apply.len(),
                revert: self.revert.len(),
            });
        }
        for request in self.apply.iter().chain(&self.revert) {
            request.http_method()?;
        }
        Ok(())
    }
}

/// Ordered operations. The stored order is the apply order; reverting
/// walks it backwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    operations: Vec<Operation>,
}

impl Plan {
    pub fn new(operations: Vec<Operation>) -> Self {
        Plan { operations }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Total number of requests a run in `direction` would issue.
    pub fn request_count(&self, direction: Direction) -> usize {
        self.operations
            .iter()
            .map(|op| op.requests(direction).len())
            .sum()
    }

    /// Operations in execution order for `direction`, each with its index
    /// in the stored plan.
    pub fn execution_order(&self, direction: Direction) -> Vec<(usize, &Operation)> {
        let mut ordered: Vec<_> = self.operations.iter().enumerate().collect();
        if direction == Direction::Revert {
            ordered.reverse();
        }
        ordered
    }

    /// Parse a plan document and check every operation is well formed.
    pub fn from_json(json: &str) -> Result<Self> {
        let plan: Plan = serde_json::from_str(json).context("decoding plan")?;
        for (index, op) in plan.operations.iter().enumerate() {
            op.validate(index)?;
        }
        Ok(plan)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut json = String::new();
        reader
            .read_to_string(&mut json)
            .context("reading plan")?;
        Plan::from_json(&json)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("opening plan file {}", path.display()))?;
        Plan::from_reader(file).with_context(|| format!("loading plan from {}", path.display()))
    }

    /// Two-space indented JSON, without a trailing newline.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("encoding plan")
    }

    /// Write the pretty document followed by a newline.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        let json = self.to_json_pretty()?;
        writeln!(writer, "{json}").context("writing plan")?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("creating plan file {}", path.display()))?;
        self.to_writer(file)
            .with_context(|| format!("saving plan to {}", path.display()))
    }
}
