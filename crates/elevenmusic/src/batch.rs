//! Sequential batch processing with abort-or-continue failure handling.
//!
//! Items run one at a time, in input order. Each output carries the index
//! of the item it came from.

use crate::adapter::{OperationOutput, RequestAdapter};
use crate::error::{BatchError, MusicError};
use crate::params::ItemParams;
use crate::transport::MusicTransport;
use serde::Serialize;
use serde_json::Value;

/// What to do when an item fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureMode {
    /// Stop at the first failure and return it.
    #[default]
    Abort,
    /// Record `{error}` for the item and move on.
    Continue,
}

impl FailureMode {
    pub fn from_continue_flag(continue_on_fail: bool) -> Self {
        if continue_on_fail {
            FailureMode::Continue
        } else {
            FailureMode::Abort
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemRecord {
    Success(OperationOutput),
    Failure(ErrorRecord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairedItem {
    pub item: usize,
}

/// One output entry: `{json, pairedItem: {item}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutput {
    pub json: ItemRecord,
    pub paired_item: PairedItem,
}

impl ItemOutput {
    pub fn is_error(&self) -> bool {
        matches!(self.json, ItemRecord::Failure(_))
    }
}

pub struct BatchRunner<'a, T> {
    adapter: &'a RequestAdapter<T>,
    mode: FailureMode,
}

impl<'a, T: MusicTransport> BatchRunner<'a, T> {
    pub fn new(adapter: &'a RequestAdapter<T>, mode: FailureMode) -> Self {
        Self { adapter, mode }
    }

    /// Run raw JSON items. A malformed item fails like any other.
    #[tracing::instrument(skip_all, fields(items = items.len(), mode = ?self.mode))]
    pub async fn run(&self, items: Vec<Value>) -> Result<Vec<ItemOutput>, BatchError> {
        let mut outputs = Vec::with_capacity(items.len());

        for (index, item) in items.into_iter().enumerate() {
            let outcome = match ItemParams::from_value(item) {
                Ok(params) => self.adapter.execute(&params).await,
                Err(e) => Err(e),
            };
            outputs.push(self.settle(index, outcome)?);
        }

        Ok(outputs)
    }

    /// Run already-parsed items.
    pub async fn run_params(&self, items: &[ItemParams]) -> Result<Vec<ItemOutput>, BatchError> {
        let mut outputs = Vec::with_capacity(items.len());

        for (index, params) in items.iter().enumerate() {
            let outcome = self.adapter.execute(params).await;
            outputs.push(self.settle(index, outcome)?);
        }

        Ok(outputs)
    }

    fn settle(
        &self,
        index: usize,
        outcome: Result<OperationOutput, MusicError>,
    ) -> Result<ItemOutput, BatchError> {
        let paired_item = PairedItem { item: index };
        match outcome {
            Ok(output) => Ok(ItemOutput {
                json: ItemRecord::Success(output),
                paired_item,
            }),
            Err(source) if self.mode == FailureMode::Continue => {
                tracing::warn!(item = index, error = %source, "item failed, continuing");
                Ok(ItemOutput {
                    json: ItemRecord::Failure(ErrorRecord {
                        error: source.to_string(),
                    }),
                    paired_item,
                })
            }
            Err(source) => Err(BatchError {
                item: index,
                source,
            }),
        }
    }
}
