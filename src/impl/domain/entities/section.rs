use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AthleteId(pub String);

/// Roster entry with its current monthly subscription price.
#[derive(Debug, Clone, PartialEq)]
pub struct Athlete {
    pub id: AthleteId,
    pub name: String,
    /// Parent or guardian.
    pub parent: String,
    pub phone: String,
    /// Current default monthly subscription amount. Athletes priced at zero
    /// (or below) are treated as inactive.
    pub price: f64,
}

/// Age-group grouping of athletes.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    pub players: Vec<Athlete>,
}

#[derive(Debug, Clone, Default)]
pub struct AthleteDraft {
    pub name: String,
    pub parent: String,
    pub phone: String,
    /// Falls back to the configured default price when absent.
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct AthleteUpdate {
    pub name: Option<String>,
    pub parent: Option<String>,
    pub phone: Option<String>,
    pub price: Option<f64>,
    /// Transient override, folded into `price` and never stored on its own.
    /// Takes precedence over `price` when both are given.
    pub manual_price: Option<f64>,
}

// --

impl Athlete {
    pub fn is_active(&self) -> bool {
        self.price > 0.0
    }
}

impl Section {
    pub fn athlete(&self, id: &AthleteId) -> Option<&Athlete> {
        self.players.iter().find(|a| &a.id == id)
    }

    pub fn athlete_mut(&mut self, id: &AthleteId) -> Option<&mut Athlete> {
        self.players.iter_mut().find(|a| &a.id == id)
    }
}

impl AthleteUpdate {
    pub fn effective_price(&self) -> Option<f64> {
        self.manual_price.or(self.price)
    }
}

/// Finds the first section (in roster order) containing the given athlete.
pub fn locate_athlete<'a>(
    sections: &'a [Section],
    athlete_id: &AthleteId,
) -> Option<(&'a Section, &'a Athlete)> {
    sections
        .iter()
        .find_map(|s| s.athlete(athlete_id).map(|a| (s, a)))
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AthleteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SectionId {
    fn from(s: &str) -> Self {
        SectionId(s.to_string())
    }
}

impl From<&str> for AthleteId {
    fn from(s: &str) -> Self {
        AthleteId(s.to_string())
    }
}
