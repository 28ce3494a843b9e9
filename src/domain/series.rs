//! Ordered daily price series for a single ticker.

use crate::domain::bar::DailyBar;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Price history sorted ascending by date, at most one bar per date.
///
/// Gaps over weekends and holidays are expected; continuity is not enforced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<DailyBar>,
}

impl PriceSeries {
    /// Build a series from bars in any order. When two bars share a date the
    /// one supplied later in the input wins.
    pub fn from_bars<I>(bars: I) -> Self
    where
        I: IntoIterator<Item = DailyBar>,
    {
        let mut by_date: BTreeMap<NaiveDate, DailyBar> = BTreeMap::new();
        for bar in bars {
            by_date.insert(bar.date, bar);
        }
        Self {
            bars: by_date.into_values().collect(),
        }
    }

    /// Merge freshly fetched bars onto this series. On a date collision the
    /// fetched bar replaces the stored one.
    pub fn merged_with<I>(&self, fetched: I) -> Self
    where
        I: IntoIterator<Item = DailyBar>,
    {
        Self::from_bars(self.bars.iter().cloned().chain(fetched))
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}
