// @file: up_proxy/src/core/flatten.rs
// @description: Maps upstream transaction resources onto flat analytics rows.
// @author: LAS.

use crate::core::error::ProxyError;
use crate::core::models::{AmountPolicy, FlatTransaction, RawTransaction, UNCATEGORIZED};

//
// PUBLIC INTERFACE
//

/// Flattens a batch in order. Output length always equals input length;
/// under `AmountPolicy::Strict` the first malformed amount aborts the batch.
pub fn flatten(
    rows: Vec<RawTransaction>,
    policy: AmountPolicy,
) -> Result<Vec<FlatTransaction>, ProxyError> {
    let mut flat: Vec<FlatTransaction> = Vec::with_capacity(rows.len());

    for raw in rows {
        flat.push(flatten_one(raw, policy)?);
    }

    Ok(flat)
}

pub fn flatten_one(raw: RawTransaction, policy: AmountPolicy) -> Result<FlatTransaction, ProxyError> {
    // #1. Resolve category before attributes are moved out
    let category: String = raw.category_id().unwrap_or(UNCATEGORIZED).to_string();

    // #2. Parse amount according to policy
    let amount: f64 = match (parse_amount(&raw.attributes.amount.value), policy) {
        (Some(value), _) => value,
        (None, AmountPolicy::Lenient) => f64::NAN,
        (None, AmountPolicy::Strict) => {
            return Err(ProxyError::MalformedAmount {
                id: raw.id,
                value: raw.attributes.amount.value,
            });
        }
    };

    let attrs = raw.attributes;

    Ok(FlatTransaction {
        id: raw.id,
        created_at: attrs.created_at,
        description: attrs.description,
        amount,
        currency: attrs.amount.currency_code,
        category,
    })
}

//
// INTERNAL HELPERS
//

fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}
