use std::collections::HashSet;

use fractic_server_error::ServerError;

use crate::{
    entities::{ElevatedAction, Section, DEFAULT_ELEVATED_ACTIONS},
    errors::ElevatedAuthorizationRejected,
};

/// Single place where the secondary PIN is checked. Commands call
/// `authorize` once, before touching storage, so a rejection never reveals
/// whether the targeted resource exists.
#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    pin: String,
    elevated: HashSet<ElevatedAction>,
}

impl AuthorizationPolicy {
    pub fn new(pin: impl Into<String>, elevated: impl IntoIterator<Item = ElevatedAction>) -> Self {
        Self {
            pin: pin.into(),
            elevated: elevated.into_iter().collect(),
        }
    }

    pub fn with_default_actions(pin: impl Into<String>) -> Self {
        Self::new(pin, DEFAULT_ELEVATED_ACTIONS)
    }

    pub fn requires_elevated_auth(&self, action: ElevatedAction) -> bool {
        self.elevated.contains(&action)
    }

    pub fn authorize(&self, action: ElevatedAction, pin: Option<&str>) -> Result<(), ServerError> {
        if !self.requires_elevated_auth(action) {
            return Ok(());
        }
        match pin {
            Some(p) if !self.pin.is_empty() && p == self.pin => Ok(()),
            _ => Err(ElevatedAuthorizationRejected::new()),
        }
    }

    pub fn authorize_all(
        &self,
        actions: impl IntoIterator<Item = ElevatedAction>,
        pin: Option<&str>,
    ) -> Result<(), ServerError> {
        actions
            .into_iter()
            .try_for_each(|action| self.authorize(action, pin))
    }
}

/// Actions implied by replacing `existing` with `updated` wholesale.
pub fn actions_for_section_replacement(
    existing: Option<&Section>,
    updated: &Section,
) -> Vec<ElevatedAction> {
    let Some(existing) = existing else {
        return if updated.players.is_empty() {
            vec![]
        } else {
            vec![ElevatedAction::AddAthlete]
        };
    };
    let mut actions = Vec::new();
    if updated
        .players
        .iter()
        .any(|a| existing.athlete(&a.id).is_none())
    {
        actions.push(ElevatedAction::AddAthlete);
    }
    if existing
        .players
        .iter()
        .any(|a| updated.athlete(&a.id).is_none())
    {
        actions.push(ElevatedAction::DeleteAthlete);
    }
    if updated.players.iter().any(|a| {
        existing
            .athlete(&a.id)
            .is_some_and(|old| old.price != a.price)
    }) {
        actions.push(ElevatedAction::EditPrice);
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Athlete, AthleteId, SectionId};

    fn athlete(id: &str, price: f64) -> Athlete {
        Athlete {
            id: AthleteId::from(id),
            name: id.into(),
            parent: "parent".into(),
            phone: "6900000000".into(),
            price,
        }
    }

    fn section(players: Vec<Athlete>) -> Section {
        Section {
            id: SectionId::from("junior"),
            title: "Junior".into(),
            players,
        }
    }

    #[test]
    fn default_policy_gates_every_action() {
        let policy = AuthorizationPolicy::with_default_actions("2003");
        for action in [
            ElevatedAction::MarkPaid,
            ElevatedAction::MarkUnpaid,
            ElevatedAction::AddAthlete,
            ElevatedAction::DeleteAthlete,
            ElevatedAction::EditPrice,
        ] {
            assert!(policy.requires_elevated_auth(action));
            assert!(policy.authorize(action, None).is_err());
            assert!(policy.authorize(action, Some("2003")).is_ok());
        }
    }

    #[test]
    fn narrowed_policy_lets_ungated_actions_through() {
        let policy = AuthorizationPolicy::new("2003", [ElevatedAction::DeleteAthlete]);
        assert!(policy.authorize(ElevatedAction::MarkPaid, None).is_ok());
        assert!(policy.authorize(ElevatedAction::DeleteAthlete, None).is_err());
    }

    #[test]
    fn wrong_or_missing_pin_is_rejected() {
        let policy = AuthorizationPolicy::with_default_actions("2003");
        assert!(policy.authorize(ElevatedAction::EditPrice, Some("2003")).is_ok());
        assert!(policy.authorize(ElevatedAction::EditPrice, Some("0000")).is_err());
        assert!(policy.authorize(ElevatedAction::EditPrice, None).is_err());
    }

    #[test]
    fn empty_configured_pin_never_authorizes() {
        let policy = AuthorizationPolicy::with_default_actions("");
        assert!(policy.authorize(ElevatedAction::EditPrice, Some("")).is_err());
    }

    #[test]
    fn section_replacement_detects_implied_actions() {
        let before = section(vec![athlete("a", 50.0), athlete("b", 50.0)]);
        let after = section(vec![athlete("a", 60.0), athlete("c", 50.0)]);
        let actions = actions_for_section_replacement(Some(&before), &after);
        assert_eq!(
            actions,
            vec![
                ElevatedAction::AddAthlete,
                ElevatedAction::DeleteAthlete,
                ElevatedAction::EditPrice
            ]
        );
        assert!(actions_for_section_replacement(Some(&before), &before).is_empty());
        assert_eq!(
            actions_for_section_replacement(None, &after),
            vec![ElevatedAction::AddAthlete]
        );
    }
}
