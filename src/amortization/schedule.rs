//! Materialized amortization schedules and payoff analysis

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Advisory;

/// Which repayment track to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    /// Contractual payment only
    Baseline,
    /// Payment plus extra principal
    Accelerated,
}

/// Balances after a given month (month 0 = before any payment)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub month: u32,
    pub baseline_balance: f64,
    pub accelerated_balance: f64,
    /// Interest paid in this month on each track
    pub baseline_interest: f64,
    pub accelerated_interest: f64,
}

impl AmortizationRow {
    pub fn initial(balance: f64) -> Self {
        Self {
            month: 0,
            baseline_balance: balance,
            accelerated_balance: balance,
            baseline_interest: 0.0,
            accelerated_interest: 0.0,
        }
    }

    pub fn balance(&self, track: Track) -> f64 {
        match track {
            Track::Baseline => self.baseline_balance,
            Track::Accelerated => self.accelerated_balance,
        }
    }

    fn interest(&self, track: Track) -> f64 {
        match track {
            Track::Baseline => self.baseline_interest,
            Track::Accelerated => self.accelerated_interest,
        }
    }
}

/// A two-series chart point (months for loans, years for projections)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: u32,
    pub baseline: f64,
    pub accelerated: f64,
}

/// How a track's simulation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "month", rename_all = "camelCase")]
pub enum Termination {
    /// Balance reached zero in this month
    PaidOff(u32),
    /// Month cap reached with a balance outstanding
    Capped(u32),
}

/// Payoff comparison between the two tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffSummary {
    /// Month the balance reaches zero, `None` if it never does within the cap
    pub baseline_payoff_month: Option<u32>,
    pub accelerated_payoff_month: Option<u32>,
    pub baseline_years: f64,
    pub accelerated_years: f64,
    pub baseline_interest: f64,
    pub accelerated_interest: f64,
    pub interest_saved: f64,
    pub months_saved: u32,
}

/// Month-by-month balances for both tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationSchedule {
    pub rows: Vec<AmortizationRow>,
    pub monthly_payment: f64,
    pub extra_monthly: f64,
    /// Month limit the simulation ran against
    pub cap_months: u32,
    /// Payment does not cover first-month interest on the baseline track
    pub non_amortizing: bool,
    #[serde(default)]
    pub advisories: Vec<Advisory>,
}

impl AmortizationSchedule {
    /// Schedule with no rows, returned for malformed input
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            monthly_payment: 0.0,
            extra_monthly: 0.0,
            cap_months: 0,
            non_amortizing: false,
            advisories: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Last simulated month
    pub fn last_month(&self) -> u32 {
        self.rows.last().map(|r| r.month).unwrap_or(0)
    }

    /// First month the track's balance is zero
    pub fn payoff_month(&self, track: Track) -> Option<u32> {
        self.rows
            .iter()
            .find(|r| r.balance(track) <= 0.0)
            .map(|r| r.month)
    }

    /// Why the track stopped
    pub fn termination(&self, track: Track) -> Termination {
        match self.payoff_month(track) {
            Some(month) => Termination::PaidOff(month),
            None => Termination::Capped(self.last_month()),
        }
    }

    /// Balance after `month` payments
    ///
    /// Past the end of the schedule this is the final balance: zero when the
    /// loan was repaid, the remaining balance when the cap stopped it.
    pub fn balance_at_month(&self, track: Track, month: u32) -> Option<f64> {
        self.rows
            .get(month as usize)
            .or_else(|| self.rows.last())
            .map(|r| r.balance(track))
    }

    /// Total interest paid on a track
    pub fn total_interest(&self, track: Track) -> f64 {
        self.rows.iter().map(|r| r.interest(track)).sum()
    }

    /// Calendar date of payoff for loans starting on `start`
    pub fn payoff_date(&self, track: Track, start: NaiveDate) -> Option<NaiveDate> {
        self.payoff_month(track)
            .and_then(|m| start.checked_add_months(Months::new(m)))
    }

    /// Compare time to payoff and interest between the tracks
    pub fn payoff_summary(&self) -> PayoffSummary {
        let last = self.last_month();
        let baseline_payoff_month = self.payoff_month(Track::Baseline);
        let accelerated_payoff_month = self.payoff_month(Track::Accelerated);
        let baseline_months = baseline_payoff_month.unwrap_or(last);
        let accelerated_months = accelerated_payoff_month.unwrap_or(last);

        let baseline_interest = self.total_interest(Track::Baseline);
        let accelerated_interest = self.total_interest(Track::Accelerated);

        PayoffSummary {
            baseline_payoff_month,
            accelerated_payoff_month,
            baseline_years: baseline_months as f64 / 12.0,
            accelerated_years: accelerated_months as f64 / 12.0,
            baseline_interest,
            accelerated_interest,
            interest_saved: (baseline_interest - accelerated_interest).max(0.0),
            months_saved: baseline_months.saturating_sub(accelerated_months),
        }
    }

    /// Downsampled points for charting
    ///
    /// Keeps month 0, every `interval`-th month, each track's payoff month and
    /// the final month.
    pub fn chart_points(&self, interval: u32) -> Vec<ChartPoint> {
        let interval = interval.max(1);
        let baseline_payoff = self.payoff_month(Track::Baseline);
        let accelerated_payoff = self.payoff_month(Track::Accelerated);
        let last = self.last_month();

        self.rows
            .iter()
            .filter(|r| {
                r.month % interval == 0
                    || Some(r.month) == baseline_payoff
                    || Some(r.month) == accelerated_payoff
                    || r.month == last
            })
            .map(|r| ChartPoint {
                x: r.month,
                baseline: r.baseline_balance,
                accelerated: r.accelerated_balance,
            })
            .collect()
    }
}
