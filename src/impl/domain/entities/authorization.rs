/// Commands that may be gated behind the secondary security PIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde_derive::Deserialize)]
pub enum ElevatedAction {
    MarkPaid,
    MarkUnpaid,
    AddAthlete,
    DeleteAthlete,
    EditPrice,
}

/// Gated unless configured otherwise: every roster change and every
/// payment toggle.
pub const DEFAULT_ELEVATED_ACTIONS: [ElevatedAction; 5] = [
    ElevatedAction::MarkPaid,
    ElevatedAction::MarkUnpaid,
    ElevatedAction::AddAthlete,
    ElevatedAction::DeleteAthlete,
    ElevatedAction::EditPrice,
];
