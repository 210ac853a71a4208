use serde::{Deserialize, Serialize};

use crate::decimal::Money;

/// bounds applied by the validation layer
///
/// Defaults mirror what the back office accepts on paper forms; callers with
/// different house rules construct their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationLimits {
    pub name_min_len: usize,
    pub name_max_len: usize,
    pub description_max_len: usize,
    pub address_max_len: usize,
    pub notes_max_len: usize,
    pub plan_name_max_len: usize,
    pub phone_min_len: usize,
    pub phone_max_len: usize,
    pub max_amount: Money,
    pub max_monthly_fee: Money,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            name_min_len: 2,
            name_max_len: 100,
            description_max_len: 200,
            address_max_len: 200,
            notes_max_len: 500,
            plan_name_max_len: 100,
            phone_min_len: 7,
            phone_max_len: 20,
            max_amount: Money::from_major(999_999_999),
            max_monthly_fee: Money::from_major(999_999),
        }
    }
}
