//! Ledger rules for magic accounts.
//!
//! Everything in this module is pure arithmetic over integer minor units
//! (cents). Services load the rows, call these functions, and persist
//! whatever comes back. Nothing here touches the database or the clock.
//!
//! # Balances
//!
//! An account holds two stored values:
//! - `deposit_cents`: raw money the user deposited and has not spent or withdrawn
//! - `promo_cents`: promotional credit granted by an administrator
//!
//! The spendable balance is derived on every read:
//!
//! ```text
//! spendable = deposit_cents * multiplier + promo_cents
//! ```

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Utc};
use serde::Deserialize;

/// Payments open at 12:00:00 local time (seconds from midnight).
pub const PAYMENT_WINDOW_OPENS: u32 = 12 * 3600;

/// Payments close at 23:59:59 local time (exclusive).
pub const PAYMENT_WINDOW_CLOSES: u32 = 23 * 3600 + 59 * 60 + 59;

/// Default multiplier seeded into the `config` table.
pub const DEFAULT_MULTIPLIER: i64 = 3;

/// Default max balance (500 kr) seeded into the `config` table.
pub const DEFAULT_MAX_BALANCE_CENTS: i64 = 50_000;

/// Default max daily deposit (100 kr) seeded into the `config` table.
pub const DEFAULT_MAX_DAILY_CENTS: i64 = 10_000;

/// Snapshot of the admin-controlled settings, read once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerSettings {
    pub multiplier: i64,
    pub max_balance_cents: i64,
    pub max_daily_cents: i64,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_MULTIPLIER,
            max_balance_cents: DEFAULT_MAX_BALANCE_CENTS,
            max_daily_cents: DEFAULT_MAX_DAILY_CENTS,
        }
    }
}

/// The two stored balances of a magic account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Balances {
    pub deposit_cents: i64,
    pub promo_cents: i64,
}

impl Balances {
    pub fn new(deposit_cents: i64, promo_cents: i64) -> Self {
        Self {
            deposit_cents,
            promo_cents,
        }
    }

    /// Deposit-derived value after the multiplier, without promo.
    pub fn multiplied(&self, multiplier: i64) -> i64 {
        self.deposit_cents.saturating_mul(multiplier)
    }

    /// Amount available for payments.
    pub fn spendable(&self, multiplier: i64) -> i64 {
        spendable_balance(self.deposit_cents, self.promo_cents, multiplier)
    }
}

/// How much of a payment was drawn from each balance.
///
/// Stored on the payment row so a failed settlement can be reversed exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaymentSplit {
    pub promo_used_cents: i64,
    pub deposit_used_cents: i64,
}

/// A business rule rejected the operation.
///
/// The display strings are shown to end users as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("You must deposit more than 0kr")]
    NonPositiveDeposit,

    #[error("Amount must be more than 0kr")]
    NonPositiveAmount,

    #[error(
        "You cannot deposit more than {}kr per day. You may only deposit {}kr more today",
        kr(.max_daily_cents),
        kr(.remaining_cents)
    )]
    DailyLimitExceeded {
        max_daily_cents: i64,
        remaining_cents: i64,
    },

    #[error("You can only deposit a maximum of {}kr", kr(.max_deposit_cents))]
    MaxBalanceExceeded { max_deposit_cents: i64 },

    #[error("Magic funds cannot be spent before noon or after midnight.")]
    OutsidePaymentWindow,

    #[error("Not enough funds available. Please add funds.")]
    InsufficientFunds,

    #[error("You only have {}kr available to withdraw.", kr(.available_cents))]
    WithdrawExceedsDeposit { available_cents: i64 },
}

/// How a new promotion is applied to existing accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionPolicy {
    /// Every account's promo value is replaced by the promotion amount.
    #[default]
    Overwrite,
    /// The promotion amount is added on top of the current promo value.
    Stack,
}

impl PromotionPolicy {
    pub fn apply(&self, current_promo_cents: i64, amount_cents: i64) -> i64 {
        match self {
            PromotionPolicy::Overwrite => amount_cents,
            PromotionPolicy::Stack => current_promo_cents.saturating_add(amount_cents),
        }
    }
}

/// `deposit * multiplier + promo`.
pub fn spendable_balance(deposit_cents: i64, promo_cents: i64, multiplier: i64) -> i64 {
    deposit_cents
        .saturating_mul(multiplier)
        .saturating_add(promo_cents)
}

/// Validate a deposit and return the balances after it.
///
/// Checks, in order: positive amount, daily cap, max balance.
/// Reaching the daily cap exactly is allowed.
pub fn apply_deposit(
    balances: Balances,
    amount_cents: i64,
    todays_total_cents: i64,
    settings: &LedgerSettings,
) -> Result<Balances, LedgerError> {
    if amount_cents <= 0 {
        return Err(LedgerError::NonPositiveDeposit);
    }

    if amount_cents.saturating_add(todays_total_cents) > settings.max_daily_cents {
        return Err(LedgerError::DailyLimitExceeded {
            max_daily_cents: settings.max_daily_cents,
            remaining_cents: settings
                .max_daily_cents
                .saturating_sub(todays_total_cents)
                .max(0),
        });
    }

    let room = settings
        .max_balance_cents
        .saturating_sub(balances.spendable(settings.multiplier));

    if amount_cents.saturating_mul(settings.multiplier) > room {
        return Err(LedgerError::MaxBalanceExceeded {
            max_deposit_cents: room.max(0) / settings.multiplier,
        });
    }

    Ok(Balances {
        deposit_cents: balances.deposit_cents + amount_cents,
        ..balances
    })
}

/// Validate a payment and return the balances after it, plus the split.
///
/// Promo credit is consumed first. Whatever is left is converted back to raw
/// deposit units, rounding up so the account never spends more value than it
/// gives up.
pub fn apply_payment(
    balances: Balances,
    amount_cents: i64,
    multiplier: i64,
    time_of_day: NaiveTime,
) -> Result<(Balances, PaymentSplit), LedgerError> {
    if !is_within_payment_window(time_of_day) {
        return Err(LedgerError::OutsidePaymentWindow);
    }

    if amount_cents <= 0 {
        return Err(LedgerError::NonPositiveAmount);
    }

    if balances.spendable(multiplier) < amount_cents {
        return Err(LedgerError::InsufficientFunds);
    }

    let promo_used_cents = amount_cents.min(balances.promo_cents.max(0));
    let left_to_pay = amount_cents - promo_used_cents;
    let deposit_used_cents = div_ceil(left_to_pay, multiplier);

    let split = PaymentSplit {
        promo_used_cents,
        deposit_used_cents,
    };
    let after = Balances {
        deposit_cents: balances.deposit_cents - deposit_used_cents,
        promo_cents: balances.promo_cents - promo_used_cents,
    };

    Ok((after, split))
}

/// Validate a withdrawal. Only raw deposited money can leave the account.
pub fn apply_withdraw(balances: Balances, amount_cents: i64) -> Result<Balances, LedgerError> {
    if amount_cents <= 0 {
        return Err(LedgerError::NonPositiveAmount);
    }

    if amount_cents > balances.deposit_cents {
        return Err(LedgerError::WithdrawExceedsDeposit {
            available_cents: balances.deposit_cents,
        });
    }

    Ok(Balances {
        deposit_cents: balances.deposit_cents - amount_cents,
        ..balances
    })
}

/// Reverse a payment that the processor reported as failed.
pub fn refund_payment(balances: Balances, split: PaymentSplit) -> Balances {
    Balances {
        deposit_cents: balances.deposit_cents + split.deposit_used_cents,
        promo_cents: balances.promo_cents + split.promo_used_cents,
    }
}

/// Multipliers below 1 would shrink deposits.
pub fn clamp_multiplier(value: i64) -> i64 {
    value.max(1)
}

/// `[12:00:00, 23:59:59)`
pub fn is_within_payment_window(time_of_day: NaiveTime) -> bool {
    let secs = time_of_day.num_seconds_from_midnight();
    (PAYMENT_WINDOW_OPENS..PAYMENT_WINDOW_CLOSES).contains(&secs)
}

/// The instant the local calendar day of `now` began, in UTC.
///
/// Built from the local date rather than by subtracting the time of day, so
/// days with a daylight saving change still start at their real midnight.
/// When a transition skips midnight, the day starts at the first local time
/// that exists.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let tz = now.timezone();
    let midnight = now.date_naive().and_time(NaiveTime::MIN);

    (0..24 * 60)
        .map(|minutes| midnight + Duration::minutes(minutes))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .unwrap_or_else(|| now.clone())
        .with_timezone(&Utc)
}

/// Render minor units as kronor: `10000` → `"100"`, `1250` → `"12.50"`.
pub fn format_kr(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let (whole, frac) = (abs / 100, abs % 100);

    if frac == 0 {
        format!("{sign}{whole}")
    } else {
        format!("{sign}{whole}.{frac:02}")
    }
}

fn kr(cents: &i64) -> String {
    format_kr(*cents)
}

// Callers only pass non-negative numerators and multipliers >= 1.
fn div_ceil(numerator: i64, denominator: i64) -> i64 {
    if numerator <= 0 {
        return 0;
    }
    numerator / denominator + i64::from(numerator % denominator != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn settings(multiplier: i64, max_balance: i64, max_daily: i64) -> LedgerSettings {
        LedgerSettings {
            multiplier,
            max_balance_cents: max_balance,
            max_daily_cents: max_daily,
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn spendable_is_deposit_times_multiplier_plus_promo() {
        assert_eq!(spendable_balance(100, 50, 3), 350);
        assert_eq!(Balances::new(0, 0).spendable(3), 0);
        assert_eq!(Balances::new(40, 0).multiplied(3), 120);
    }

    #[test]
    fn deposit_rejects_zero_and_negative_amounts() {
        let s = settings(3, 500, 100);
        assert_eq!(
            apply_deposit(Balances::default(), 0, 0, &s),
            Err(LedgerError::NonPositiveDeposit)
        );
        assert_eq!(
            apply_deposit(Balances::default(), -5, 0, &s),
            Err(LedgerError::NonPositiveDeposit)
        );
    }

    #[test]
    fn deposit_daily_cap_boundary() {
        let s = settings(3, 10_000, 100);

        let err = apply_deposit(Balances::default(), 30, 80, &s).unwrap_err();
        assert_eq!(
            err,
            LedgerError::DailyLimitExceeded {
                max_daily_cents: 100,
                remaining_cents: 20
            }
        );

        let after = apply_deposit(Balances::default(), 20, 80, &s).unwrap();
        assert_eq!(after.deposit_cents, 20);
    }

    #[test]
    fn daily_cap_remaining_never_negative() {
        // Cap lowered below what was already deposited today.
        let s = settings(3, 10_000, 50);
        let err = apply_deposit(Balances::default(), 10, 80, &s).unwrap_err();
        assert_eq!(
            err,
            LedgerError::DailyLimitExceeded {
                max_daily_cents: 50,
                remaining_cents: 0
            }
        );
    }

    #[test]
    fn deposit_max_balance_reports_floor_of_room() {
        let s = settings(3, 500, 1_000);
        // 160 * 3 = 480 spendable, 20 of room left.
        let balances = Balances::new(160, 0);

        let err = apply_deposit(balances, 15, 0, &s).unwrap_err();
        assert_eq!(
            err,
            LedgerError::MaxBalanceExceeded {
                max_deposit_cents: 6
            }
        );

        assert!(apply_deposit(balances, 10, 0, &s).is_err());

        let after = apply_deposit(balances, 6, 0, &s).unwrap();
        assert_eq!(after.deposit_cents, 166);
        assert_eq!(after.spendable(3), 498);
    }

    #[test]
    fn max_balance_counts_promo_and_uses_configured_multiplier() {
        let s = settings(4, 500, 1_000);
        let balances = Balances::new(100, 90);

        // 400 + 90 = 490, room 10, 10 / 4 = 2.
        let err = apply_deposit(balances, 3, 0, &s).unwrap_err();
        assert_eq!(
            err,
            LedgerError::MaxBalanceExceeded {
                max_deposit_cents: 2
            }
        );
    }

    #[test]
    fn max_balance_room_clamped_when_promo_overshoots() {
        let s = settings(3, 500, 1_000);
        let err = apply_deposit(Balances::new(0, 600), 1, 0, &s).unwrap_err();
        assert_eq!(
            err,
            LedgerError::MaxBalanceExceeded {
                max_deposit_cents: 0
            }
        );
    }

    #[test]
    fn deposit_adds_raw_amount_only() {
        let s = settings(3, 500, 100);
        let after = apply_deposit(Balances::new(10, 5), 20, 0, &s).unwrap();
        assert_eq!(after, Balances::new(30, 5));
    }

    #[test]
    fn payment_uses_promo_first() {
        let balances = Balances::new(100, 50);

        let (after, split) = apply_payment(balances, 30, 3, at(18, 0, 0)).unwrap();
        assert_eq!(after, Balances::new(100, 20));
        assert_eq!(split.promo_used_cents, 30);
        assert_eq!(split.deposit_used_cents, 0);

        let (after, split) = apply_payment(balances, 80, 3, at(18, 0, 0)).unwrap();
        assert_eq!(after, Balances::new(90, 0));
        assert_eq!(split.promo_used_cents, 50);
        assert_eq!(split.deposit_used_cents, 10);
    }

    #[test]
    fn payment_remainder_rounds_up_in_raw_units() {
        let (after, split) = apply_payment(Balances::new(10, 0), 10, 3, at(13, 0, 0)).unwrap();
        assert_eq!(split.deposit_used_cents, 4);
        assert_eq!(after.deposit_cents, 6);
    }

    #[test]
    fn payment_can_spend_entire_balance() {
        let (after, _) = apply_payment(Balances::new(10, 5), 35, 3, at(12, 0, 0)).unwrap();
        assert_eq!(after, Balances::new(0, 0));
    }

    #[test]
    fn payment_with_insufficient_funds() {
        assert_eq!(
            apply_payment(Balances::new(10, 5), 36, 3, at(20, 0, 0)),
            Err(LedgerError::InsufficientFunds)
        );
    }

    #[test]
    fn payment_window_is_checked_before_funds() {
        let rich = Balances::new(1_000, 1_000);
        for time in [at(0, 0, 0), at(9, 30, 0), at(11, 59, 59), at(23, 59, 59)] {
            assert_eq!(
                apply_payment(rich, 1, 3, time),
                Err(LedgerError::OutsidePaymentWindow)
            );
        }
        assert_eq!(
            apply_payment(Balances::default(), 1, 3, at(2, 0, 0)),
            Err(LedgerError::OutsidePaymentWindow)
        );
    }

    #[test]
    fn payment_window_bounds() {
        assert!(is_within_payment_window(at(12, 0, 0)));
        assert!(is_within_payment_window(at(23, 59, 58)));
        assert!(!is_within_payment_window(at(23, 59, 59)));
        assert!(!is_within_payment_window(at(11, 59, 59)));
    }

    #[test]
    fn payment_rejects_non_positive_amount() {
        assert_eq!(
            apply_payment(Balances::new(10, 0), 0, 3, at(15, 0, 0)),
            Err(LedgerError::NonPositiveAmount)
        );
    }

    #[test]
    fn withdraw_only_touches_deposit() {
        let after = apply_withdraw(Balances::new(100, 70), 100).unwrap();
        assert_eq!(after, Balances::new(0, 70));

        assert_eq!(
            apply_withdraw(Balances::new(100, 70), 101),
            Err(LedgerError::WithdrawExceedsDeposit {
                available_cents: 100
            })
        );
        assert_eq!(
            apply_withdraw(Balances::new(100, 70), -1),
            Err(LedgerError::NonPositiveAmount)
        );
    }

    #[test]
    fn refund_restores_the_split() {
        let before = Balances::new(100, 50);
        let (after, split) = apply_payment(before, 80, 3, at(14, 0, 0)).unwrap();
        assert_eq!(refund_payment(after, split), before);
    }

    #[test]
    fn promotion_policies() {
        assert_eq!(PromotionPolicy::Overwrite.apply(300, 100), 100);
        assert_eq!(PromotionPolicy::Stack.apply(300, 100), 400);
        assert_eq!(PromotionPolicy::default(), PromotionPolicy::Overwrite);
    }

    #[test]
    fn multiplier_floor_is_one() {
        assert_eq!(clamp_multiplier(0), 1);
        assert_eq!(clamp_multiplier(-4), 1);
        assert_eq!(clamp_multiplier(5), 5);
    }

    #[test]
    fn start_of_day_uses_local_midnight() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 6, 1, 1, 30, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 5, 31, 22, 0, 0).unwrap();
        assert_eq!(start_of_day(&now), expected);
    }

    #[test]
    fn start_of_day_on_daylight_saving_changes() {
        use chrono_tz::{America::Santiago, Europe::Stockholm};

        // Autumn: midnight was still CEST (+02:00).
        let now = Stockholm.with_ymd_and_hms(2024, 10, 27, 10, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 10, 26, 22, 0, 0).unwrap();
        assert_eq!(start_of_day(&now), expected);

        // Spring: midnight was still CET (+01:00).
        let now = Stockholm.with_ymd_and_hms(2024, 3, 31, 10, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 30, 23, 0, 0).unwrap();
        assert_eq!(start_of_day(&now), expected);

        // Clocks jump from 00:00 to 01:00 (-03:00); the day starts at 01:00.
        let now = Santiago.with_ymd_and_hms(2024, 9, 8, 10, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 9, 8, 4, 0, 0).unwrap();
        assert_eq!(start_of_day(&now), expected);
    }

    #[test]
    fn huge_multiplier_still_charges_the_deposit() {
        let (after, split) = apply_payment(Balances::new(1, 0), 5, i64::MAX, at(13, 0, 0)).unwrap();
        assert_eq!(split.deposit_used_cents, 1);
        assert_eq!(after, Balances::new(0, 0));

        assert_eq!(div_ceil(i64::MAX, i64::MAX), 1);
        assert_eq!(div_ceil(i64::MAX - 1, i64::MAX), 1);
        assert_eq!(div_ceil(7, 3), 3);
        assert_eq!(div_ceil(6, 3), 2);
    }

    #[test]
    fn daily_cap_remaining_does_not_overflow() {
        let s = LedgerSettings {
            max_daily_cents: i64::MIN,
            ..LedgerSettings::default()
        };
        assert_eq!(
            apply_deposit(Balances::default(), 100, 500, &s),
            Err(LedgerError::DailyLimitExceeded {
                max_daily_cents: i64::MIN,
                remaining_cents: 0,
            })
        );
    }

    #[test]
    fn messages_render_kronor() {
        assert_eq!(format_kr(10_000), "100");
        assert_eq!(format_kr(1_250), "12.50");
        assert_eq!(format_kr(-5), "-0.05");
        assert_eq!(
            LedgerError::DailyLimitExceeded {
                max_daily_cents: 10_000,
                remaining_cents: 2_000
            }
            .to_string(),
            "You cannot deposit more than 100kr per day. You may only deposit 20kr more today"
        );
    }
}
