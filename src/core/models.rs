// @file: up_proxy/src/core/models.rs
// @description: Upstream wire models and the flattened rows served to analytics tools.
// @author: LAS.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNCATEGORIZED: &str = "Uncategorized";


//
// UPSTREAM WIRE MODELS
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPage {
    pub data: Vec<RawTransaction>,
    #[serde(default)]
    pub links: PageLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(default)] pub prev: Option<String>,
    #[serde(default)] pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    pub id: String,
    pub attributes: TransactionAttributes,
    #[serde(default)]
    pub relationships: TransactionRelationships,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAttributes {
    pub created_at: String,
    #[serde(default)]
    pub description: String,
    pub amount: MoneyObject,

    // Carried for snapshots, not flattened
    #[serde(default)] pub status: Option<String>,
    #[serde(default)] pub raw_text: Option<String>,
    #[serde(default)] pub message: Option<String>,
    #[serde(default)] pub settled_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyObject {
    pub currency_code: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionRelationships {
    #[serde(default)]
    pub category: Option<Relationship>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<ResourceIdentifier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub id: String,
}

impl RawTransaction {
    pub fn category_id(&self) -> Option<&str> {
        self.relationships
            .category
            .as_ref()
            .and_then(|rel| rel.data.as_ref())
            .map(|data| data.id.as_str())
    }
}


//
// FLATTENED ROWS
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatTransaction {
    pub id: String,
    pub created_at: String,
    pub description: String,
    pub amount: f64,
    pub currency: String,
    pub category: String,
}


//
// SERVICE CONFIGURATION ENUMS
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AmountPolicy {
    /// Malformed amounts become NaN and the batch goes through.
    #[default]
    Lenient,
    /// A single malformed amount fails the whole batch.
    Strict,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    #[default]
    Live,
    LocalFile,
}


//
// RESPONSE ENVELOPES
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsEnvelope<'a> {
    pub count: usize,
    pub fetched_at: DateTime<Utc>,
    pub data: &'a [FlatTransaction],
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}
