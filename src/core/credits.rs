//! Credit store: free/premium balances and general-question amortization.
//!
//! ## Accounting Rules
//!
//! - A **specific** message costs one credit. Without credits it is denied
//!   and the state is left untouched.
//! - A **general** message bumps a counter. Every
//!   `general_questions_per_credit`-th general message costs one credit and
//!   resets the counter; the others are free.
//! - Credits are drawn from the free balance first, then premium.
//! - The daily reset restores the free balance only; premium credits are
//!   purchased and persist.
//!
//! The counter always stays in `[0, general_questions_per_credit)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::classifier::{Classification, PatternMatch, QueryClass, QueryClassifier};
use crate::core::reset_clock::{ResetClock, ResetCountdown};
use crate::error::{KolgateError, Result};

/// Free credits restored by each daily reset.
pub const DEFAULT_DAILY_FREE_CREDITS: u32 = 5;
/// General messages amortized into one credit.
pub const DEFAULT_GENERAL_QUESTIONS_PER_CREDIT: u32 = 3;

// =============================================================================
// State
// =============================================================================

/// Persisted per-session quota state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditState {
    pub free_credits: u32,
    #[serde(default)]
    pub premium_credits: u32,
    pub general_question_counter: u32,
    pub last_reset: DateTime<Utc>,
}

impl CreditState {
    /// Fresh state with `free_credits` as of `now`.
    #[must_use]
    pub const fn new(free_credits: u32, now: DateTime<Utc>) -> Self {
        Self {
            free_credits,
            premium_credits: 0,
            general_question_counter: 0,
            last_reset: now,
        }
    }

    /// Total credits available across both balances.
    #[must_use]
    pub const fn credits_left(&self) -> u32 {
        self.free_credits.saturating_add(self.premium_credits)
    }

    /// Bring the general-question counter back below `per_credit`.
    ///
    /// A counter at or past the threshold (a stale file, or a threshold
    /// lowered in config) becomes `per_credit - 1`, so the next general
    /// message is charged. Returns whether the counter changed.
    pub const fn clamp_counter(&mut self, per_credit: u32) -> bool {
        let max = per_credit.saturating_sub(1);
        if self.general_question_counter > max {
            self.general_question_counter = max;
            true
        } else {
            false
        }
    }
}

// =============================================================================
// Policy
// =============================================================================

/// Quota parameters shared by all sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditPolicy {
    pub daily_free_credits: u32,
    pub general_questions_per_credit: u32,
    pub clock: ResetClock,
}

impl CreditPolicy {
    /// Build a policy, rejecting a zero amortization threshold.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if `general_questions_per_credit` is 0.
    pub fn new(
        daily_free_credits: u32,
        general_questions_per_credit: u32,
        clock: ResetClock,
    ) -> Result<Self> {
        if general_questions_per_credit == 0 {
            return Err(KolgateError::ConfigInvalid {
                key: "credits.general_questions_per_credit".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(Self {
            daily_free_credits,
            general_questions_per_credit,
            clock,
        })
    }
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            daily_free_credits: DEFAULT_DAILY_FREE_CREDITS,
            general_questions_per_credit: DEFAULT_GENERAL_QUESTIONS_PER_CREDIT,
            clock: ResetClock::default(),
        }
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Which balance paid for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditBalance {
    Free,
    Premium,
}

/// Result of `consume`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeOutcome {
    pub allowed: bool,
    /// Balance a credit was taken from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charged: Option<CreditBalance>,
    pub state: CreditState,
}

/// Result of `process_message`: refresh, classify and consume in one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageOutcome {
    pub class: QueryClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<PatternMatch>,
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charged: Option<CreditBalance>,
    /// Whether a daily reset was applied before consuming.
    pub was_reset: bool,
    pub resets_in: ResetCountdown,
    pub state: CreditState,
}

// =============================================================================
// Store
// =============================================================================

/// Owned credit store for a single session.
#[derive(Debug, Clone)]
pub struct CreditStore {
    state: CreditState,
    policy: CreditPolicy,
}

impl CreditStore {
    /// Wrap existing state.
    #[must_use]
    pub const fn new(state: CreditState, policy: CreditPolicy) -> Self {
        Self { state, policy }
    }

    /// New session holding the daily free allowance.
    #[must_use]
    pub const fn fresh(policy: CreditPolicy, now: DateTime<Utc>) -> Self {
        Self::new(CreditState::new(policy.daily_free_credits, now), policy)
    }

    #[must_use]
    pub const fn state(&self) -> &CreditState {
        &self.state
    }

    #[must_use]
    pub const fn policy(&self) -> &CreditPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn credits_left(&self) -> u32 {
        self.state.credits_left()
    }

    /// Take one credit, free balance first. `None` if both are empty.
    fn take_credit(&mut self) -> Option<CreditBalance> {
        if self.state.free_credits > 0 {
            self.state.free_credits -= 1;
            Some(CreditBalance::Free)
        } else if self.state.premium_credits > 0 {
            self.state.premium_credits -= 1;
            Some(CreditBalance::Premium)
        } else {
            None
        }
    }

    /// Apply one classified message to the balances.
    pub fn consume(&mut self, class: QueryClass) -> ConsumeOutcome {
        let charged = match class {
            QueryClass::Specific => {
                let charged = self.take_credit();
                if charged.is_none() {
                    return self.deny(class);
                }
                charged
            }
            QueryClass::General => {
                let next = self.state.general_question_counter.saturating_add(1);
                if next >= self.policy.general_questions_per_credit {
                    let charged = self.take_credit();
                    if charged.is_none() {
                        return self.deny(class);
                    }
                    self.state.general_question_counter = 0;
                    charged
                } else {
                    self.state.general_question_counter = next;
                    None
                }
            }
        };

        tracing::debug!(
            %class,
            ?charged,
            free = self.state.free_credits,
            premium = self.state.premium_credits,
            counter = self.state.general_question_counter,
            "Message allowed"
        );

        ConsumeOutcome {
            allowed: true,
            charged,
            state: self.state.clone(),
        }
    }

    fn deny(&self, class: QueryClass) -> ConsumeOutcome {
        tracing::info!(%class, "Message denied: no credits left");
        ConsumeOutcome {
            allowed: false,
            charged: None,
            state: self.state.clone(),
        }
    }

    /// Restore free credits to `amount` and restart the counter.
    pub fn reset(&mut self, amount: u32, now: DateTime<Utc>) {
        tracing::info!(amount, %now, "Resetting free credits");
        self.state.free_credits = amount;
        self.state.general_question_counter = 0;
        self.state.last_reset = now;
    }

    /// Overwrite the free balance.
    pub fn set(&mut self, amount: u32) {
        tracing::debug!(amount, "Setting free credits");
        self.state.free_credits = amount;
    }

    /// Add to the free balance (saturating).
    pub fn add(&mut self, amount: u32) {
        self.state.free_credits = self.state.free_credits.saturating_add(amount);
        tracing::debug!(amount, total = self.state.free_credits, "Added free credits");
    }

    /// Add purchased credits (saturating).
    pub fn add_premium(&mut self, amount: u32) {
        self.state.premium_credits = self.state.premium_credits.saturating_add(amount);
        tracing::debug!(
            amount,
            total = self.state.premium_credits,
            "Added premium credits"
        );
    }

    /// Whether the stored state is stale at `now`.
    #[must_use]
    pub fn needs_reset(&self, now: DateTime<Utc>) -> bool {
        self.policy.clock.should_reset(self.state.last_reset, now)
    }

    /// Apply the daily reset if due. Returns whether it was applied.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> bool {
        if self.needs_reset(now) {
            self.reset(self.policy.daily_free_credits, now);
            true
        } else {
            false
        }
    }

    /// Countdown to the next daily reset.
    #[must_use]
    pub fn time_until_reset(&self, now: DateTime<Utc>) -> ResetCountdown {
        self.policy.clock.time_until_reset(now)
    }

    /// Refresh, classify and consume a message.
    pub fn process_message(
        &mut self,
        classifier: &QueryClassifier,
        message: &str,
        now: DateTime<Utc>,
    ) -> MessageOutcome {
        let was_reset = self.refresh(now);
        let Classification { class, matched } = classifier.classify(message);
        let ConsumeOutcome {
            allowed,
            charged,
            state,
        } = self.consume(class);

        MessageOutcome {
            class,
            matched,
            allowed,
            charged,
            was_reset,
            resets_in: self.time_until_reset(now),
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn policy(per_credit: u32) -> CreditPolicy {
        CreditPolicy::new(5, per_credit, ResetClock::new(4).unwrap()).unwrap()
    }

    fn store(free: u32, per_credit: u32) -> CreditStore {
        CreditStore::new(CreditState::new(free, now()), policy(per_credit))
    }

    #[test]
    fn specific_consumes_one_credit() {
        let mut store = store(1, 3);
        let outcome = store.consume(QueryClass::Specific);
        assert!(outcome.allowed);
        assert_eq!(outcome.charged, Some(CreditBalance::Free));
        assert_eq!(outcome.state.free_credits, 0);
    }

    #[test]
    fn specific_without_credits_is_denied_and_unchanged() {
        let mut store = store(0, 3);
        let before = store.state().clone();
        let outcome = store.consume(QueryClass::Specific);
        assert!(!outcome.allowed);
        assert_eq!(outcome.charged, None);
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn general_rollover_with_threshold_two() {
        let mut store = store(3, 2);

        let first = store.consume(QueryClass::General);
        assert!(first.allowed);
        assert_eq!(first.charged, None);
        assert_eq!(first.state.free_credits, 3);
        assert_eq!(first.state.general_question_counter, 1);

        let second = store.consume(QueryClass::General);
        assert!(second.allowed);
        assert_eq!(second.charged, Some(CreditBalance::Free));
        assert_eq!(second.state.free_credits, 2);
        assert_eq!(second.state.general_question_counter, 0);
    }

    #[test]
    fn general_at_threshold_without_credits_is_denied() {
        let mut store = store(0, 2);
        assert!(store.consume(QueryClass::General).allowed);
        let before = store.state().clone();
        let outcome = store.consume(QueryClass::General);
        assert!(!outcome.allowed);
        assert_eq!(store.state(), &before);
        assert_eq!(store.state().general_question_counter, 1);
    }

    #[test]
    fn threshold_of_one_charges_every_general_message() {
        let mut store = store(2, 1);
        let outcome = store.consume(QueryClass::General);
        assert_eq!(outcome.charged, Some(CreditBalance::Free));
        assert_eq!(outcome.state.general_question_counter, 0);
    }

    #[test]
    fn counter_stays_below_threshold() {
        let mut store = store(100, 3);
        for _ in 0..20 {
            let outcome = store.consume(QueryClass::General);
            assert!(outcome.state.general_question_counter < 3);
        }
    }

    #[test]
    fn premium_used_after_free() {
        let mut store = store(1, 3);
        store.add_premium(1);
        assert_eq!(store.credits_left(), 2);
        assert_eq!(
            store.consume(QueryClass::Specific).charged,
            Some(CreditBalance::Free)
        );
        assert_eq!(
            store.consume(QueryClass::Specific).charged,
            Some(CreditBalance::Premium)
        );
        assert!(!store.consume(QueryClass::Specific).allowed);
    }

    #[test]
    fn reset_restores_free_but_keeps_premium() {
        let mut store = store(0, 3);
        store.add_premium(4);
        store.consume(QueryClass::General);
        let later = now() + chrono::Duration::days(1);
        store.reset(5, later);
        assert_eq!(store.state().free_credits, 5);
        assert_eq!(store.state().premium_credits, 4);
        assert_eq!(store.state().general_question_counter, 0);
        assert_eq!(store.state().last_reset, later);
    }

    #[test]
    fn set_and_add() {
        let mut store = store(2, 3);
        store.set(7);
        assert_eq!(store.state().free_credits, 7);
        store.add(3);
        assert_eq!(store.state().free_credits, 10);
        store.add(u32::MAX);
        assert_eq!(store.state().free_credits, u32::MAX);
    }

    #[test]
    fn refresh_applies_daily_reset_once() {
        let mut store = store(0, 3);
        assert!(!store.refresh(now()));
        let next_day = Utc.with_ymd_and_hms(2025, 3, 11, 4, 30, 0).unwrap();
        assert!(store.refresh(next_day));
        assert_eq!(store.state().free_credits, 5);
        assert!(!store.refresh(next_day));
    }

    #[test]
    fn zero_threshold_policy_is_rejected() {
        assert!(CreditPolicy::new(5, 0, ResetClock::default()).is_err());
    }

    #[test]
    fn process_message_specific_scenario() {
        let classifier = QueryClassifier::builtin().unwrap();
        let mut store = store(1, 3);

        let outcome = store.process_message(&classifier, "find me a fashion creator", now());
        assert_eq!(outcome.class, QueryClass::Specific);
        assert!(outcome.allowed);
        assert_eq!(outcome.state.free_credits, 0);
        assert!(!outcome.was_reset);

        let before = store.state().clone();
        let denied = store.process_message(&classifier, "find me a fashion creator", now());
        assert!(!denied.allowed);
        assert_eq!(store.state(), &before);
        assert_eq!(denied.resets_in.to_string(), "16h 0m");
    }

    #[test]
    fn saturated_counter_charges_instead_of_overflowing() {
        let mut state = CreditState::new(1, now());
        state.general_question_counter = u32::MAX;
        let mut store = CreditStore::new(state, policy(3));

        let outcome = store.consume(QueryClass::General);
        assert!(outcome.allowed);
        assert_eq!(outcome.charged, Some(CreditBalance::Free));
        assert_eq!(outcome.state.general_question_counter, 0);
    }

    #[test]
    fn clamp_counter_keeps_counter_below_threshold() {
        let mut state = CreditState::new(1, now());
        state.general_question_counter = 7;
        assert!(state.clamp_counter(3));
        assert_eq!(state.general_question_counter, 2);
        assert!(!state.clamp_counter(3));
        assert_eq!(state.general_question_counter, 2);
    }

    #[test]
    fn state_serializes_camel_case() {
        let state = CreditState::new(2, now());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["freeCredits"], 2);
        assert_eq!(json["generalQuestionCounter"], 0);
        assert!(json.get("lastReset").is_some());
    }

    #[test]
    fn missing_premium_defaults_to_zero() {
        let json = r#"{"freeCredits":1,"generalQuestionCounter":0,"lastReset":"2025-03-10T12:00:00Z"}"#;
        let state: CreditState = serde_json::from_str(json).unwrap();
        assert_eq!(state.premium_credits, 0);
    }
}
