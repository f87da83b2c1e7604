//! Site settings model, typed patch, and public projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use saltbox_core::CurrencyCode;

/// The site settings record.
///
/// Exactly one row exists; it is created at process startup and only ever
/// updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub site_name: String,
    pub site_description: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub currency: CurrencyCode,
    pub timezone: String,
    pub maintenance_mode: bool,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for settings.
///
/// Only `Some` fields are applied. `None` leaves the stored value
/// untouched; an explicit empty string is a legal update, and
/// `maintenance_mode: Some(false)` switches maintenance off.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub site_name: Option<String>,
    pub site_description: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub currency: Option<CurrencyCode>,
    pub timezone: Option<String>,
    pub maintenance_mode: Option<bool>,
}

impl Settings {
    /// Merge a patch over this record, consuming it.
    ///
    /// `updated_at` is left to the database.
    #[must_use]
    pub fn apply(mut self, patch: SettingsPatch) -> Self {
        if let Some(site_name) = patch.site_name {
            self.site_name = site_name;
        }
        if let Some(site_description) = patch.site_description {
            self.site_description = site_description;
        }
        if let Some(contact_email) = patch.contact_email {
            self.contact_email = contact_email;
        }
        if let Some(contact_phone) = patch.contact_phone {
            self.contact_phone = contact_phone;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(timezone) = patch.timezone {
            self.timezone = timezone;
        }
        if let Some(maintenance_mode) = patch.maintenance_mode {
            self.maintenance_mode = maintenance_mode;
        }
        self
    }
}

/// The safe subset exposed to unauthenticated clients.
///
/// The contact phone stays admin-only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSettings {
    pub site_name: String,
    pub site_description: String,
    pub contact_email: String,
    pub currency: CurrencyCode,
    pub timezone: String,
    pub maintenance_mode: bool,
}

impl From<Settings> for PublicSettings {
    fn from(settings: Settings) -> Self {
        Self {
            site_name: settings.site_name,
            site_description: settings.site_description,
            contact_email: settings.contact_email,
            currency: settings.currency,
            timezone: settings.timezone,
            maintenance_mode: settings.maintenance_mode,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            site_name: "Saltbox".to_string(),
            site_description: "A small marketplace".to_string(),
            contact_email: "support@saltbox.sh".to_string(),
            contact_phone: "+1 555 0100".to_string(),
            currency: CurrencyCode::USD,
            timezone: "UTC".to_string(),
            maintenance_mode: false,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_patch_applies_only_provided_fields() {
        let before = settings();
        let after = before.clone().apply(SettingsPatch {
            site_name: Some("Saltbox Market".to_string()),
            ..SettingsPatch::default()
        });

        assert_eq!(after.site_name, "Saltbox Market");
        assert_eq!(after.site_description, before.site_description);
        assert_eq!(after.contact_email, before.contact_email);
        assert_eq!(after.contact_phone, before.contact_phone);
        assert_eq!(after.currency, before.currency);
        assert_eq!(after.timezone, before.timezone);
        assert_eq!(after.maintenance_mode, before.maintenance_mode);
    }

    #[test]
    fn test_patch_applies_explicit_empty_string() {
        let after = settings().apply(SettingsPatch {
            site_description: Some(String::new()),
            ..SettingsPatch::default()
        });
        assert_eq!(after.site_description, "");
    }

    #[test]
    fn test_maintenance_mode_false_is_applied() {
        let mut before = settings();
        before.maintenance_mode = true;
        let after = before.apply(SettingsPatch {
            maintenance_mode: Some(false),
            ..SettingsPatch::default()
        });
        assert!(!after.maintenance_mode);
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let before = settings();
        let after = before.clone().apply(SettingsPatch::default());
        assert_eq!(after, before);
    }

    #[test]
    fn test_public_projection_excludes_contact_phone() {
        let json = serde_json::to_value(PublicSettings::from(settings())).unwrap();
        assert!(json.get("contactPhone").is_none());
        assert_eq!(json["siteName"], "Saltbox");
        assert_eq!(json["currency"], "USD");
    }
}
