use serde::{Deserialize as _, Deserializer};
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::entities::{Athlete, AthleteId, Section, SectionId};

use super::amount_model::AmountModel;

/// Stored section document. Older documents may use `name` instead of
/// `title`; unknown fields (database ids, version counters) are ignored.
/// One unreadable athlete never hides the rest of the section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SectionModel {
    pub(crate) id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub(crate) title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing)]
    pub(crate) name: Option<String>,
    #[serde(default, deserialize_with = "lenient_players")]
    pub(crate) players: Vec<AthleteModel>,
}

/// Every field tolerates `null`, and text fields also accept numbers
/// (phone numbers are often stored that way).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct AthleteModel {
    #[serde(default, deserialize_with = "lenient_text")]
    pub(crate) id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub(crate) name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub(crate) parent: Option<String>,
    #[serde(
        default,
        rename = "parentName",
        deserialize_with = "lenient_text",
        skip_serializing
    )]
    pub(crate) parent_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub(crate) phone: Option<String>,
    #[serde(default)]
    pub(crate) price: Value,
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Anything but an array reads as no athletes; an entry that is not an
/// object reads as an athlete without an id.
fn lenient_players<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<AthleteModel>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(values) => values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl SectionModel {
    pub(crate) fn into_entity(self, default_price: f64) -> Section {
        let title = non_empty(self.title).or(self.name).unwrap_or_default();
        let section_id = self.id;
        let players = self
            .players
            .into_iter()
            .filter_map(|p| {
                let athlete = p.into_entity(default_price);
                if athlete.is_none() {
                    warn!(section = %section_id, "Skipping athlete without an id.");
                }
                athlete
            })
            .collect();
        Section {
            id: SectionId(section_id),
            title,
            players,
        }
    }

    pub(crate) fn from_entity(section: &Section) -> Self {
        SectionModel {
            id: section.id.0.clone(),
            title: Some(section.title.clone()),
            name: None,
            players: section.players.iter().map(AthleteModel::from_entity).collect(),
        }
    }
}

impl AthleteModel {
    /// A missing price means the default price; an unreadable one makes the
    /// athlete inactive (price 0). Without an id there is no athlete.
    fn into_entity(self, default_price: f64) -> Option<Athlete> {
        let id = non_empty(self.id)?;
        Some(Athlete {
            id: AthleteId(id),
            name: self.name.unwrap_or_default(),
            parent: non_empty(self.parent)
                .or(self.parent_name)
                .unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            price: AmountModel::lenient(&self.price).unwrap_or(default_price),
        })
    }

    fn from_entity(athlete: &Athlete) -> Self {
        AthleteModel {
            id: Some(athlete.id.0.clone()),
            name: Some(athlete.name.clone()),
            parent: Some(athlete.parent.clone()),
            parent_name: None,
            phone: Some(athlete.phone.clone()),
            price: Value::from(athlete.price),
        }
    }
}
