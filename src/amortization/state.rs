//! Running state of one repayment track

/// Balances below this are treated as repaid (sub-cent floating residue)
pub const PAYOFF_EPSILON: f64 = 1e-6;

/// Amounts applied in a single month
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthStep {
    pub interest: f64,
    pub principal: f64,
}

/// Balance and running totals for one track (baseline or accelerated)
#[derive(Debug, Clone)]
pub struct TrackState {
    /// Remaining balance, never negative
    pub balance: f64,

    /// Monthly payment applied on this track
    pub payment: f64,

    /// Extra principal added on top of the payment
    pub extra: f64,

    /// Interest paid so far
    pub total_interest: f64,

    /// First month the balance reached zero
    pub paid_off_month: Option<u32>,
}

impl TrackState {
    pub fn new(balance: f64, payment: f64, extra: f64) -> Self {
        Self {
            balance,
            payment,
            extra,
            total_interest: 0.0,
            paid_off_month: if balance <= 0.0 { Some(0) } else { None },
        }
    }

    pub fn is_paid_off(&self) -> bool {
        self.balance <= 0.0
    }

    /// Apply one monthly payment at `monthly_rate`
    ///
    /// Principal is clamped to `[0, balance]`: the last payment covers only what
    /// is left, and a payment short of interest leaves the balance unchanged.
    pub fn step(&mut self, month: u32, monthly_rate: f64) -> MonthStep {
        if self.is_paid_off() {
            return MonthStep::default();
        }

        let interest = self.balance * monthly_rate;
        let mut principal = (self.payment + self.extra - interest).clamp(0.0, self.balance);
        if self.balance - principal < PAYOFF_EPSILON {
            principal = self.balance;
        }

        let interest_paid = interest.min(self.payment + self.extra).max(0.0);
        self.total_interest += interest_paid;

        self.balance = if principal >= self.balance {
            0.0
        } else {
            self.balance - principal
        };
        if self.balance == 0.0 {
            self.paid_off_month = Some(month);
        }

        MonthStep {
            interest: interest_paid,
            principal,
        }
    }
}
