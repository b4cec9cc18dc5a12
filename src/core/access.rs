//! Feature gating and post-login redirects.
//!
//! Decisions are pure functions of an [`AccessContext`] and are recomputed
//! on every check. Unknown features and unauthenticated users are denied.

use serde::{Deserialize, Serialize};

/// Login page for unauthenticated users.
pub const LOGIN_PATH: &str = "/login";
/// Landing page once authenticated and onboarded.
pub const DASHBOARD_PATH: &str = "/dashboard";
/// Onboarding root; role-specific paths hang below it.
pub const ONBOARDING_PATH: &str = "/onboarding";

// =============================================================================
// Roles and Features
// =============================================================================

/// Platform user role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Advertiser running campaigns.
    Brand,
    /// Creator (Key Opinion Leader).
    Kol,
    Admin,
}

impl Role {
    pub const ALL: &'static [Self] = &[Self::Brand, Self::Kol, Self::Admin];

    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "brand" => Some(Self::Brand),
            "kol" => Some(Self::Kol),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Kol => "kol",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gated features. The set is closed; anything else is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Search,
    Campaigns,
    Analytics,
    Contracts,
}

impl Feature {
    pub const ALL: &'static [Self] = &[
        Self::Search,
        Self::Campaigns,
        Self::Analytics,
        Self::Contracts,
    ];

    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "search" => Some(Self::Search),
            "campaigns" => Some(Self::Campaigns),
            "analytics" => Some(Self::Analytics),
            "contracts" => Some(Self::Contracts),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Campaigns => "campaigns",
            Self::Analytics => "analytics",
            Self::Contracts => "contracts",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Onboarding progress reported by the profile service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnboardingStatus {
    #[default]
    Missing,
    Incomplete,
    Complete,
}

impl OnboardingStatus {
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "missing" | "none" => Some(Self::Missing),
            "incomplete" | "pending" => Some(Self::Incomplete),
            "complete" | "completed" | "done" => Some(Self::Complete),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Incomplete => "incomplete",
            Self::Complete => "complete",
        }
    }
}

// =============================================================================
// Redirects
// =============================================================================

/// Where a user should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "role", rename_all = "lowercase")]
pub enum Redirect {
    Login,
    Onboarding(Option<Role>),
    Dashboard,
}

impl Redirect {
    /// URL path for this redirect.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => LOGIN_PATH.to_string(),
            Self::Onboarding(Some(role)) => format!("{ONBOARDING_PATH}/{role}"),
            Self::Onboarding(None) => ONBOARDING_PATH.to_string(),
            Self::Dashboard => DASHBOARD_PATH.to_string(),
        }
    }
}

// =============================================================================
// Context
// =============================================================================

/// Everything an access decision depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessContext {
    pub is_authenticated: bool,
    pub role: Option<Role>,
    pub credits_left: u32,
    pub onboarding: OnboardingStatus,
}

impl AccessContext {
    /// Context for a signed-out visitor.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            role: None,
            credits_left: 0,
            onboarding: OnboardingStatus::Missing,
        }
    }

    /// Authenticated user with a role and credit balance.
    #[must_use]
    pub const fn authenticated(role: Option<Role>, credits_left: u32) -> Self {
        Self {
            is_authenticated: true,
            role,
            credits_left,
            onboarding: OnboardingStatus::Complete,
        }
    }

    #[must_use]
    pub const fn with_onboarding(mut self, onboarding: OnboardingStatus) -> Self {
        self.onboarding = onboarding;
        self
    }

    /// Decide whether a typed feature is usable.
    #[must_use]
    pub fn allows(&self, feature: Feature) -> bool {
        if !self.is_authenticated {
            return false;
        }
        match feature {
            Feature::Search => self.credits_left > 0,
            Feature::Campaigns | Feature::Analytics => {
                matches!(self.role, Some(Role::Brand | Role::Admin))
            }
            Feature::Contracts => {
                matches!(self.role, Some(Role::Brand | Role::Kol | Role::Admin))
            }
        }
    }

    /// Decide whether a feature named by string is usable. Unknown names are denied.
    #[must_use]
    pub fn can_access_feature(&self, feature: &str) -> bool {
        let allowed = Feature::from_arg(feature).is_some_and(|f| self.allows(f));
        tracing::trace!(feature, allowed, role = ?self.role, "Access check");
        allowed
    }

    /// All features this context may use.
    #[must_use]
    pub fn accessible_features(&self) -> Vec<Feature> {
        Feature::ALL
            .iter()
            .copied()
            .filter(|f| self.allows(*f))
            .collect()
    }

    /// Authentication first, then onboarding, then the dashboard.
    #[must_use]
    pub const fn redirect(&self) -> Redirect {
        if !self.is_authenticated {
            Redirect::Login
        } else if !self.onboarding.is_complete() {
            Redirect::Onboarding(self.role)
        } else {
            Redirect::Dashboard
        }
    }

    #[must_use]
    pub fn redirect_path(&self) -> String {
        self.redirect().path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_is_always_denied() {
        let ctx = AccessContext {
            is_authenticated: false,
            role: Some(Role::Admin),
            credits_left: 10,
            onboarding: OnboardingStatus::Complete,
        };
        for feature in Feature::ALL {
            assert!(!ctx.allows(*feature), "{feature} should be denied");
        }
    }

    #[test]
    fn kol_without_credits() {
        let ctx = AccessContext::authenticated(Some(Role::Kol), 0);
        assert!(!ctx.can_access_feature("search"));
        assert!(ctx.can_access_feature("contracts"));
        assert!(!ctx.can_access_feature("campaigns"));
        assert!(!ctx.can_access_feature("analytics"));
    }

    #[test]
    fn search_requires_credits_not_role() {
        assert!(AccessContext::authenticated(None, 1).can_access_feature("search"));
        assert!(!AccessContext::authenticated(Some(Role::Admin), 0).can_access_feature("search"));
    }

    #[test]
    fn brand_and_admin_reach_campaigns_and_analytics() {
        for role in [Role::Brand, Role::Admin] {
            let ctx = AccessContext::authenticated(Some(role), 0);
            assert!(ctx.can_access_feature("campaigns"));
            assert!(ctx.can_access_feature("analytics"));
            assert!(ctx.can_access_feature("contracts"));
        }
    }

    #[test]
    fn unknown_feature_is_denied_for_everyone() {
        let mut contexts = vec![AccessContext::anonymous(), AccessContext::authenticated(None, 9)];
        contexts.extend(
            Role::ALL
                .iter()
                .map(|r| AccessContext::authenticated(Some(*r), 9)),
        );
        for ctx in contexts {
            assert!(!ctx.can_access_feature("unknown-feature"));
            assert!(!ctx.can_access_feature(""));
        }
    }

    #[test]
    fn feature_names_are_case_insensitive() {
        let ctx = AccessContext::authenticated(Some(Role::Brand), 0);
        assert!(ctx.can_access_feature("Campaigns"));
        assert!(ctx.can_access_feature(" ANALYTICS "));
    }

    #[test]
    fn checks_are_idempotent() {
        let ctx = AccessContext::authenticated(Some(Role::Kol), 3);
        for feature in ["search", "campaigns", "contracts", "nope"] {
            assert_eq!(ctx.can_access_feature(feature), ctx.can_access_feature(feature));
        }
    }

    #[test]
    fn accessible_features_for_kol() {
        let ctx = AccessContext::authenticated(Some(Role::Kol), 2);
        assert_eq!(
            ctx.accessible_features(),
            vec![Feature::Search, Feature::Contracts]
        );
    }

    #[test]
    fn redirect_precedence() {
        // Unauthenticated never sees onboarding, even with onboarding missing.
        assert_eq!(AccessContext::anonymous().redirect_path(), "/login");

        let incomplete = AccessContext::authenticated(Some(Role::Kol), 0)
            .with_onboarding(OnboardingStatus::Incomplete);
        assert_eq!(incomplete.redirect_path(), "/onboarding/kol");

        let missing = AccessContext::authenticated(Some(Role::Brand), 0)
            .with_onboarding(OnboardingStatus::Missing);
        assert_eq!(missing.redirect_path(), "/onboarding/brand");

        let no_role =
            AccessContext::authenticated(None, 0).with_onboarding(OnboardingStatus::Missing);
        assert_eq!(no_role.redirect_path(), "/onboarding");

        assert_eq!(
            AccessContext::authenticated(Some(Role::Admin), 0).redirect_path(),
            "/dashboard"
        );
    }

    #[test]
    fn role_parsing() {
        assert_eq!(Role::from_arg("KOL"), Some(Role::Kol));
        assert_eq!(Role::from_arg("guest"), None);
        assert_eq!(OnboardingStatus::from_arg("done"), Some(OnboardingStatus::Complete));
    }
}
