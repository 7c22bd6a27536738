use std::str::FromStr as _;

use fractic_server_error::ServerError;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    entities::{FinancialRecord, NewRecord, RecordCategory, RecordId, RecordType},
    errors::MissingRequiredField,
};

use super::{amount_model::AmountModel, iso_date_model::ISODateModel};

/// Financial record document, as stored and as received from callers. Every
/// field is optional here; `into_new_record` validates command input while
/// `into_entity_lenient` tolerates whatever the store holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecordModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub(crate) record_type: Option<String>,
    #[serde(default)]
    pub(crate) amount: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) transaction_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) category: Option<String>,
}

impl RecordModel {
    pub(crate) fn into_new_record(self) -> Result<NewRecord, ServerError> {
        let record_type: RecordType = self
            .record_type
            .as_deref()
            .ok_or_else(|| MissingRequiredField::new("type"))?
            .parse()?;
        if self.amount.is_null() {
            return Err(MissingRequiredField::new("amount"));
        }
        let amount: f64 = AmountModel::from_json(&self.amount)?.into();
        let reason = self
            .reason
            .ok_or_else(|| MissingRequiredField::new("reason"))?;
        let date = ISODateModel::from_str(
            self.date
                .as_deref()
                .ok_or_else(|| MissingRequiredField::new("date"))?,
        )?
        .into();
        let transaction_date = self
            .transaction_date
            .as_deref()
            .map(ISODateModel::from_str)
            .transpose()?
            .map(Into::into);
        Ok(NewRecord {
            id: self.id.filter(|id| !id.is_empty()).map(RecordId),
            record_type,
            amount,
            reason,
            date,
            transaction_date,
            category: self.category.as_deref().map(RecordCategory::from),
        })
    }

    /// Returns `None` for documents missing an id, a type or a readable date.
    pub(crate) fn into_entity_lenient(self) -> Option<FinancialRecord> {
        Some(FinancialRecord {
            id: RecordId(self.id?),
            record_type: RecordType::from_str(self.record_type.as_deref()?).ok()?,
            amount: AmountModel::lenient(&self.amount).unwrap_or(0.0),
            reason: self.reason.unwrap_or_default(),
            date: ISODateModel::from_str(self.date.as_deref()?).ok()?.into(),
            transaction_date: self
                .transaction_date
                .and_then(|d| ISODateModel::from_str(&d).ok())
                .map(Into::into),
            category: self
                .category
                .as_deref()
                .map(RecordCategory::from)
                .unwrap_or_default(),
        })
    }

    pub(crate) fn from_entity(record: &FinancialRecord) -> Self {
        RecordModel {
            id: Some(record.id.0.clone()),
            record_type: Some(record.record_type.as_str().to_string()),
            amount: Value::from(record.amount),
            reason: Some(record.reason.clone()),
            date: Some(ISODateModel::format(&record.date)),
            transaction_date: record.transaction_date.as_ref().map(ISODateModel::format),
            category: Some(record.category.as_str().to_string()),
        }
    }
}
