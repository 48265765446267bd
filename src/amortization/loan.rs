//! Loan and property records

use serde::{Deserialize, Serialize};

use super::payment::standard_payment;

/// Linked bucket id meaning "no bucket supplies extra principal"
pub const NO_LINKED_BUCKET: i64 = -1;

/// Appreciation assumed when a property omits it (percent per year)
pub const DEFAULT_APPRECIATION_RATE: f64 = 3.0;

fn default_linked_bucket() -> i64 {
    NO_LINKED_BUCKET
}

fn default_appreciation_rate() -> f64 {
    DEFAULT_APPRECIATION_RATE
}

/// An amortizing loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    /// Outstanding balance
    #[serde(alias = "mortgageBalance")]
    pub balance: f64,

    /// Annual interest rate in percent (6.5 = 6.5%)
    #[serde(alias = "interestRate")]
    pub annual_interest_rate: f64,

    /// Remaining term; `None` when unknown
    #[serde(default, alias = "term")]
    pub term_years: Option<u32>,

    /// Contractual monthly payment; 0 means derive it from the term
    #[serde(default)]
    pub monthly_payment: f64,
}

impl Loan {
    pub fn new(balance: f64, annual_interest_rate: f64, term_years: u32, monthly_payment: f64) -> Self {
        Self {
            balance,
            annual_interest_rate,
            term_years: Some(term_years),
            monthly_payment,
        }
    }

    /// Loan whose payment is the standard payment for its term
    pub fn with_standard_payment(balance: f64, annual_interest_rate: f64, term_years: u32) -> Self {
        let payment = standard_payment(balance, annual_interest_rate, term_years);
        Self::new(balance, annual_interest_rate, term_years, payment)
    }

    /// Monthly interest rate as a decimal
    pub fn monthly_rate(&self) -> f64 {
        self.annual_interest_rate / 100.0 / 12.0
    }

    /// Payment actually used: the contractual one, else the standard payment
    pub fn effective_payment(&self) -> f64 {
        if self.monthly_payment > 0.0 {
            return self.monthly_payment;
        }
        match self.term_years {
            Some(term) if term > 0 => standard_payment(self.balance, self.annual_interest_rate, term),
            _ => self.monthly_payment,
        }
    }
}

/// A primary home (or the shared part of a rental)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(default)]
    pub name: String,

    /// Current market value
    #[serde(alias = "homeValue")]
    pub value: f64,

    #[serde(flatten)]
    pub loan: Loan,

    /// Annual value growth in percent, independent of the loan
    #[serde(default = "default_appreciation_rate")]
    pub appreciation_rate: f64,

    /// Bucket supplying extra principal, or [`NO_LINKED_BUCKET`]
    #[serde(default = "default_linked_bucket")]
    pub linked_bucket_id: i64,
}

impl Property {
    pub fn new(name: impl Into<String>, value: f64, loan: Loan) -> Self {
        Self {
            name: name.into(),
            value,
            loan,
            appreciation_rate: DEFAULT_APPRECIATION_RATE,
            linked_bucket_id: NO_LINKED_BUCKET,
        }
    }

    pub fn linked_to(mut self, bucket_id: i64) -> Self {
        self.linked_bucket_id = bucket_id;
        self
    }

    pub fn with_appreciation(mut self, rate: f64) -> Self {
        self.appreciation_rate = rate;
        self
    }

    pub fn linked_bucket(&self) -> Option<i64> {
        (self.linked_bucket_id != NO_LINKED_BUCKET).then_some(self.linked_bucket_id)
    }

    /// Market value after `years` of compound appreciation
    pub fn value_after(&self, years: u32) -> f64 {
        self.value * (1.0 + self.appreciation_rate / 100.0).powi(years as i32)
    }
}

/// A rental property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    pub id: i64,

    #[serde(flatten)]
    pub property: Property,

    /// Monthly rent
    pub rent: f64,

    /// Operating expenses as a percent of rent
    #[serde(default)]
    pub expense_ratio: f64,
}

impl Rental {
    pub fn new(id: i64, property: Property, rent: f64, expense_ratio: f64) -> Self {
        Self {
            id,
            property,
            rent,
            expense_ratio,
        }
    }

    /// Monthly operating expenses
    pub fn monthly_expenses(&self) -> f64 {
        self.rent * (self.expense_ratio / 100.0)
    }

    /// Monthly rent less expenses and mortgage payment
    pub fn monthly_net_cash_flow(&self) -> f64 {
        self.rent - self.monthly_expenses() - self.property.loan.effective_payment()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn condo() -> Rental {
        let loan = Loan::new(180_000.0, 7.0, 30, 1197.0);
        Rental::new(101, Property::new("Downtown Condo", 250_000.0, loan), 1800.0, 40.0)
    }

    #[test]
    fn test_rental_cash_flow() {
        let rental = condo();
        assert_abs_diff_eq!(rental.monthly_expenses(), 720.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rental.monthly_net_cash_flow(), -117.0, epsilon = 1e-9);
    }

    #[test]
    fn test_effective_payment_falls_back_to_standard() {
        let loan = Loan::new(350_000.0, 6.5, 30, 0.0);
        assert_abs_diff_eq!(loan.effective_payment(), 2212.24, epsilon = 0.01);

        let no_term = Loan {
            term_years: None,
            ..loan
        };
        assert_eq!(no_term.effective_payment(), 0.0);
    }

    #[test]
    fn test_value_after_appreciation() {
        let home = Property::new("Home", 100_000.0, Loan::new(0.0, 0.0, 30, 0.0));
        assert_abs_diff_eq!(home.value_after(2), 106_090.0, epsilon = 1e-6);
        assert_eq!(home.linked_bucket(), None);
        assert_eq!(home.linked_to(3).linked_bucket(), Some(3));
    }

    #[test]
    fn test_rental_deserializes_flat_record() {
        let json = r#"{
            "id": 101, "name": "Downtown Condo", "value": 250000,
            "mortgageBalance": 180000, "interestRate": 7.0, "monthlyPayment": 1197,
            "rent": 1800, "expenseRatio": 40, "linkedBucketId": -1, "term": 30
        }"#;
        let rental: Rental = serde_json::from_str(json).unwrap();
        assert_eq!(rental.property.name, "Downtown Condo");
        assert_eq!(rental.property.loan.balance, 180_000.0);
        assert_eq!(rental.property.loan.term_years, Some(30));
        assert_eq!(rental.property.appreciation_rate, DEFAULT_APPRECIATION_RATE);
    }

    #[test]
    fn test_home_deserializes_home_value() {
        let json = r#"{
            "homeValue": 450000, "mortgageBalance": 350000, "interestRate": 6.5,
            "appreciationRate": 3.0, "monthlyPayment": 2212, "linkedBucketId": 3
        }"#;
        let home: Property = serde_json::from_str(json).unwrap();
        assert_eq!(home.value, 450_000.0);
        assert_eq!(home.linked_bucket(), Some(3));
        assert_eq!(home.loan.term_years, None);
    }
}
