use std::str::FromStr as _;

use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::{PaymentKey, PaymentMeta, PaymentState};

use super::{amount_model::AmountModel, iso_date_model::ISODateModel};

/// Stored payment document. Legacy entries are a bare boolean; current ones
/// are an object carrying the snapshot taken when the payment was marked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum PaymentModel {
    Flag(bool),
    Record(PaymentRecordModel),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentRecordModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) key: Option<String>,
    #[serde(default)]
    pub(crate) is_paid: bool,
    #[serde(default)]
    pub(crate) amount: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) athlete_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) parent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) payment_date: Option<String>,
}

impl PaymentModel {
    pub(crate) fn into_state(self) -> PaymentState {
        match self {
            PaymentModel::Flag(false) => PaymentState::Unpaid,
            PaymentModel::Flag(true) => PaymentState::Paid {
                amount: None,
                meta: PaymentMeta::default(),
            },
            PaymentModel::Record(r) if !r.is_paid => PaymentState::Unpaid,
            PaymentModel::Record(r) => PaymentState::Paid {
                amount: AmountModel::lenient(&r.amount),
                meta: PaymentMeta {
                    athlete_name: r.athlete_name,
                    parent_name: r.parent_name,
                    department: r.department,
                    payment_date: r
                        .payment_date
                        .and_then(|d| ISODateModel::from_str(&d).ok())
                        .map(Into::into),
                },
            },
        }
    }

    pub(crate) fn from_state(key: &PaymentKey, state: &PaymentState) -> Self {
        match state {
            PaymentState::Unpaid => PaymentModel::Record(PaymentRecordModel {
                key: Some(key.to_string()),
                ..Default::default()
            }),
            PaymentState::Paid { amount, meta } => PaymentModel::Record(PaymentRecordModel {
                key: Some(key.to_string()),
                is_paid: true,
                amount: amount.map_or(Value::Null, Value::from),
                athlete_name: meta.athlete_name.clone(),
                parent_name: meta.parent_name.clone(),
                department: meta.department.clone(),
                payment_date: meta.payment_date.as_ref().map(ISODateModel::format),
            }),
        }
    }
}
