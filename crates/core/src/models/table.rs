use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::services::derivation;

use super::holding::HoldingRecord;
use super::query::{HoldingFilter, SortDirection, SortField};

/// Sort + filter state of one holdings table widget.
///
/// Selecting the active field again flips the direction; selecting another
/// field switches to it with the table's own default direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableState {
    pub field: SortField,
    pub direction: SortDirection,
    /// Direction applied whenever a new field is selected
    pub default_direction: SortDirection,
    pub filter: HoldingFilter,
}

impl TableState {
    pub fn new(field: SortField, default_direction: SortDirection) -> Self {
        Self {
            field,
            direction: default_direction,
            default_direction,
            filter: HoldingFilter::All,
        }
    }

    /// Deposits table: soonest maturity first, new columns ascending.
    pub fn deposits() -> Self {
        Self::new(SortField::MaturityDate, SortDirection::Ascending)
    }

    /// Metals table: most valuable lot first, new columns descending.
    pub fn metals() -> Self {
        Self::new(SortField::CurrentValue, SortDirection::Descending)
    }

    pub fn select(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = self.default_direction;
        }
    }

    pub fn set_filter(&mut self, filter: HoldingFilter) {
        self.filter = filter;
    }

    /// Rows to display: filtered, then sorted.
    pub fn apply<'a>(&self, records: &'a [HoldingRecord]) -> Result<Vec<&'a HoldingRecord>, CoreError> {
        let filtered = derivation::filter_by_status_or_type(records, &self.filter);
        derivation::sort_refs(filtered, self.field, self.direction)
    }
}
