//! Form state for the two planning modes
//!
//! Pure data plus submit-gating; cursor and focus handling live with the
//! rendering layer. Zero transport preferences is a local validation failure
//! that never reaches the network: the submit control is simply inert.

/// Pace of the trip, passed through to the synthesis service verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TravelStyle {
    Leisurely,
    #[default]
    Balanced,
    ActionPacked,
    BudgetFocused,
}

impl TravelStyle {
    pub const ALL: [TravelStyle; 4] = [
        TravelStyle::Leisurely,
        TravelStyle::Balanced,
        TravelStyle::ActionPacked,
        TravelStyle::BudgetFocused,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Leisurely => "Leisurely",
            Self::Balanced => "Balanced",
            Self::ActionPacked => "Action-Packed",
            Self::BudgetFocused => "Budget-Focused",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Leisurely => Self::Balanced,
            Self::Balanced => Self::ActionPacked,
            Self::ActionPacked => Self::BudgetFocused,
            Self::BudgetFocused => Self::Leisurely,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Leisurely => Self::BudgetFocused,
            Self::Balanced => Self::Leisurely,
            Self::ActionPacked => Self::Balanced,
            Self::BudgetFocused => Self::ActionPacked,
        }
    }
}

/// Inputs for a multi-day trip
#[derive(Debug, Clone)]
pub struct TripFormState {
    pub from: String,
    pub to: String,
    pub style: TravelStyle,
    pub prefer_train: bool,
    pub prefer_bus: bool,
}

impl Default for TripFormState {
    fn default() -> Self {
        Self {
            from: "Delhi".to_string(),
            to: "Goa".to_string(),
            style: TravelStyle::default(),
            prefer_train: true,
            prefer_bus: true,
        }
    }
}

impl TripFormState {
    /// Both endpoints present and at least one transport preference selected
    pub fn can_submit(&self) -> bool {
        !self.from.trim().is_empty() && !self.to.trim().is_empty() && (self.prefer_train || self.prefer_bus)
    }

    pub fn preferences(&self) -> Vec<String> {
        preference_list(self.prefer_train, self.prefer_bus)
    }
}

/// Inputs for a point-to-point route
#[derive(Debug, Clone)]
pub struct TransportFormState {
    pub from: String,
    pub to: String,
    pub prefer_train: bool,
    pub prefer_bus: bool,
}

impl Default for TransportFormState {
    fn default() -> Self {
        Self {
            from: "Mumbai".to_string(),
            to: "Pune".to_string(),
            prefer_train: true,
            prefer_bus: true,
        }
    }
}

impl TransportFormState {
    pub fn can_submit(&self) -> bool {
        !self.from.trim().is_empty() && !self.to.trim().is_empty() && (self.prefer_train || self.prefer_bus)
    }

    pub fn preferences(&self) -> Vec<String> {
        preference_list(self.prefer_train, self.prefer_bus)
    }
}

fn preference_list(train: bool, bus: bool) -> Vec<String> {
    let mut prefs = Vec::new();
    if train {
        prefs.push("Train".to_string());
    }
    if bus {
        prefs.push("Bus".to_string());
    }
    prefs
}
