//! # Shipping
//!
//! Value-range rules for domestic orders, country zones for international
//! ones, and a free-shipping threshold that overrides domestic rules.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{errors::CommerceError, types::context::RequestContext};

/// Domestic rate for subtotals in `[min_order_value, max_order_value]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRule {
    /// Inclusive lower bound.
    pub min_order_value: u64,
    /// Inclusive upper bound; unbounded when unset.
    pub max_order_value: Option<u64>,
    /// Shipping cost.
    pub cost:            u64,
}

impl ShippingRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(min_order_value: u64, max_order_value: Option<u64>, cost: u64) -> Self {
        Self { min_order_value, max_order_value, cost }
    }

    /// Whether the rule covers `subtotal`.
    #[must_use]
    pub fn matches(&self, subtotal: u64) -> bool {
        self.min_order_value <= subtotal && self.max_order_value.map_or(true, |max| subtotal <= max)
    }
}

/// Group of countries sharing one international rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingZone {
    /// Zone name.
    pub name:      String,
    /// Country codes (ISO 3166-1 alpha-2).
    pub countries: Vec<String>,
    /// Flat cost for the zone.
    pub cost:      u64,
}

impl ShippingZone {
    /// Whether the zone covers `country` (case-insensitive).
    #[must_use]
    pub fn covers(&self, country: &str) -> bool {
        self.countries.iter().any(|c| c.eq_ignore_ascii_case(country.trim()))
    }
}

/// Singleton shipping settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingSettings {
    /// Country treated as domestic.
    pub domestic_country:        String,
    /// Domestic subtotal at or above which shipping is free.
    pub free_shipping_threshold: Option<u64>,
    /// Domestic cost when no rule matches.
    pub flat_rate:               u64,
    /// Whether orders outside the domestic country are accepted.
    pub international_enabled:   bool,
    /// Domestic rules, first match wins.
    pub rules:                   Vec<ShippingRule>,
    /// International zones, first match wins.
    pub zones:                   Vec<ShippingZone>,
}

impl Default for ShippingSettings {
    fn default() -> Self {
        Self {
            domestic_country:        "BD".to_string(),
            free_shipping_threshold: None,
            flat_rate:               0,
            international_enabled:   false,
            rules:                   Vec::new(),
            zones:                   Vec::new(),
        }
    }
}

impl ShippingSettings {
    /// Checks rule bounds and zone definitions.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.domestic_country.trim().is_empty() {
            return Err(CommerceError::ValidationError("domestic country is required".to_string()));
        }
        for rule in &self.rules {
            if rule.max_order_value.is_some_and(|max| max < rule.min_order_value) {
                return Err(CommerceError::ValidationError(format!(
                    "shipping rule upper bound below lower bound ({})",
                    rule.min_order_value
                )));
            }
        }
        for zone in &self.zones {
            if zone.name.trim().is_empty() || zone.countries.is_empty() {
                return Err(CommerceError::ValidationError(
                    "shipping zones need a name and at least one country".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Resolves where an address country ships to.
    #[must_use]
    pub fn destination_for(&self, country: &str) -> ShippingDestination {
        if country.trim().eq_ignore_ascii_case(self.domestic_country.trim()) {
            ShippingDestination::Domestic
        } else {
            ShippingDestination::International(country.trim().to_uppercase())
        }
    }

    /// Shipping cost for `subtotal` sent to `destination`.
    ///
    /// # Errors
    /// `InternationalShippingDisabled` or `NoZoneMatch` for international
    /// destinations that cannot be served.
    pub fn quote(
        &self, subtotal: u64, destination: &ShippingDestination,
    ) -> Result<u64, CommerceError> {
        match destination {
            ShippingDestination::Domestic => {
                if self.free_shipping_threshold.is_some_and(|threshold| subtotal >= threshold) {
                    return Ok(0);
                }
                Ok(self
                    .rules
                    .iter()
                    .find(|rule| rule.matches(subtotal))
                    .map_or(self.flat_rate, |rule| rule.cost))
            },
            ShippingDestination::International(country) => {
                if !self.international_enabled {
                    return Err(CommerceError::InternationalShippingDisabled);
                }
                self.zones
                    .iter()
                    .find(|zone| zone.covers(country))
                    .map(|zone| zone.cost)
                    .ok_or_else(|| CommerceError::NoZoneMatch(country.clone()))
            },
        }
    }
}

/// Where an order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShippingDestination {
    /// Inside the domestic country.
    Domestic,
    /// Abroad, with the destination country code.
    International(String),
}

/// Holds the shipping settings singleton.
#[derive(Debug, Default)]
pub struct ShippingService {
    settings: Arc<Mutex<ShippingSettings>>,
}

impl ShippingService {
    /// Creates a service with the given settings.
    #[must_use]
    pub fn new(settings: ShippingSettings) -> Self {
        Self { settings: Arc::new(Mutex::new(settings)) }
    }

    /// Current settings.
    pub fn settings(&self) -> Result<ShippingSettings, CommerceError> {
        self.settings.lock().map(|s| s.clone()).map_err(|_| CommerceError::LockError)
    }

    /// Replaces the settings, rules and zones included, in one step.
    pub fn replace_settings(
        &self, ctx: &RequestContext, settings: ShippingSettings,
    ) -> Result<ShippingSettings, CommerceError> {
        ctx.require_admin()?;
        settings.validate()?;

        let mut current = self.settings.lock().map_err(|_| CommerceError::LockError)?;
        *current = settings.clone();
        info!(
            rules = settings.rules.len(),
            zones = settings.zones.len(),
            "shipping settings replaced"
        );
        Ok(settings)
    }

    /// Quotes against the current settings.
    pub fn quote(
        &self, subtotal: u64, destination: &ShippingDestination,
    ) -> Result<u64, CommerceError> {
        self.settings.lock().map_err(|_| CommerceError::LockError)?.quote(subtotal, destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::context::UserId;

    fn settings() -> ShippingSettings {
        ShippingSettings {
            domestic_country:        "BD".to_string(),
            free_shipping_threshold: Some(2000),
            flat_rate:               150,
            international_enabled:   true,
            rules:                   vec![
                ShippingRule::new(0, Some(1000), 60),
                ShippingRule::new(1001, Some(2000), 100),
                ShippingRule::new(2001, None, 120),
            ],
            zones:                   vec![
                ShippingZone {
                    name:      "South Asia".to_string(),
                    countries: vec!["IN".to_string(), "NP".to_string()],
                    cost:      900,
                },
                ShippingZone {
                    name:      "Gulf".to_string(),
                    countries: vec!["AE".to_string(), "SA".to_string()],
                    cost:      1500,
                },
            ],
        }
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let settings = settings();
        assert_eq!(settings.quote(500, &ShippingDestination::Domestic), Ok(60));
        assert_eq!(settings.quote(1000, &ShippingDestination::Domestic), Ok(60));
        assert_eq!(settings.quote(1800, &ShippingDestination::Domestic), Ok(100));
    }

    #[test]
    fn test_free_threshold_overrides_rules() {
        let settings = settings();
        assert_eq!(settings.quote(2000, &ShippingDestination::Domestic), Ok(0));
        assert_eq!(settings.quote(2500, &ShippingDestination::Domestic), Ok(0));
    }

    #[test]
    fn test_flat_rate_when_no_rule_matches() {
        let mut settings = settings();
        settings.rules = vec![ShippingRule::new(5000, None, 10)];
        settings.free_shipping_threshold = None;
        assert_eq!(settings.quote(100, &ShippingDestination::Domestic), Ok(150));
    }

    #[test]
    fn test_international_zone_match() {
        let settings = settings();
        let destination = settings.destination_for("np");
        assert_eq!(destination, ShippingDestination::International("NP".to_string()));
        assert_eq!(settings.quote(2500, &destination), Ok(900));
    }

    #[test]
    fn test_international_without_zone_fails() {
        let settings = settings();
        let result = settings.quote(100, &ShippingDestination::International("US".to_string()));
        assert_eq!(result, Err(CommerceError::NoZoneMatch("US".to_string())));
    }

    #[test]
    fn test_international_disabled() {
        let mut settings = settings();
        settings.international_enabled = false;
        let result = settings.quote(100, &ShippingDestination::International("IN".to_string()));
        assert_eq!(result, Err(CommerceError::InternationalShippingDisabled));
    }

    #[test]
    fn test_domestic_destination_is_case_insensitive() {
        assert_eq!(settings().destination_for(" bd "), ShippingDestination::Domestic);
    }

    #[test]
    fn test_replace_settings_validates_and_swaps() {
        let service = ShippingService::new(ShippingSettings::default());
        let admin = RequestContext::admin(UserId::new("a"), "a@shop.test", "A");

        let mut bad = settings();
        bad.rules.push(ShippingRule::new(500, Some(100), 1));
        assert!(matches!(
            service.replace_settings(&admin, bad),
            Err(CommerceError::ValidationError(_))
        ));
        assert!(service.settings().expect("settings").rules.is_empty());

        service.replace_settings(&admin, settings()).expect("replace");
        assert_eq!(service.settings().expect("settings").rules.len(), 3);
        assert_eq!(service.quote(1800, &ShippingDestination::Domestic), Ok(100));
    }

    #[test]
    fn test_replace_settings_requires_admin() {
        let service = ShippingService::default();
        let result = service.replace_settings(&RequestContext::guest(), settings());
        assert_eq!(result, Err(CommerceError::NotAuthenticated));
    }
}
