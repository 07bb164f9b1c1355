use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Booking window/duration policy, threaded into the create-booking checks.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingPolicy {
    pub min_duration_hours: i64,
    pub max_duration_hours: i64,
    pub advance_window_days: i64,
    pub cancellation_grace_minutes: i64,
    pub cancellation_penalty_percent: f64,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            min_duration_hours: 1,
            max_duration_hours: 24 * 31,
            advance_window_days: 30,
            cancellation_grace_minutes: 60,
            cancellation_penalty_percent: 10.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotificationSettings {
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub booking_reminders: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_enabled: true,
            sms_enabled: false,
            booking_reminders: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaymentPolicy {
    pub currency: String,
    pub tax_rate: f64,
    pub late_fee_cents: i64,
}

impl Default for PaymentPolicy {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            tax_rate: 0.0,
            late_fee_cents: 500,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityPolicy {
    pub session_timeout_minutes: i64,
    pub password_min_length: usize,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            session_timeout_minutes: 60,
            password_min_length: 8,
        }
    }
}

/// Per-deployment settings. File/env configuration supplies the defaults;
/// persisted overrides are merged key-wise on top at startup and whenever
/// an admin updates them.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SystemSettings {
    pub maintenance_mode: bool,
    pub maintenance_message: Option<String>,
    pub booking: BookingPolicy,
    pub notifications: NotificationSettings,
    pub payment: PaymentPolicy,
    pub security: SecurityPolicy,
}

impl SystemSettings {
    /// Apply one persisted override. Unknown keys are ignored so stale rows
    /// cannot poison startup.
    pub fn apply_override(&mut self, key: &str, value: &Value) {
        match key {
            "maintenance_mode" => {
                if let Some(b) = value.as_bool() {
                    self.maintenance_mode = b;
                }
            }
            "maintenance_message" => {
                if let Some(s) = value.as_str() {
                    self.maintenance_message = Some(s.to_string());
                }
            }
            "booking.min_duration_hours" => {
                if let Some(v) = value.as_i64() {
                    self.booking.min_duration_hours = v;
                }
            }
            "booking.max_duration_hours" => {
                if let Some(v) = value.as_i64() {
                    self.booking.max_duration_hours = v;
                }
            }
            "booking.advance_window_days" => {
                if let Some(v) = value.as_i64() {
                    self.booking.advance_window_days = v;
                }
            }
            "booking.cancellation_grace_minutes" => {
                if let Some(v) = value.as_i64() {
                    self.booking.cancellation_grace_minutes = v;
                }
            }
            "booking.cancellation_penalty_percent" => {
                if let Some(v) = value.as_f64() {
                    self.booking.cancellation_penalty_percent = v;
                }
            }
            "notifications.email_enabled" => {
                if let Some(b) = value.as_bool() {
                    self.notifications.email_enabled = b;
                }
            }
            "notifications.sms_enabled" => {
                if let Some(b) = value.as_bool() {
                    self.notifications.sms_enabled = b;
                }
            }
            "notifications.booking_reminders" => {
                if let Some(b) = value.as_bool() {
                    self.notifications.booking_reminders = b;
                }
            }
            "payment.currency" => {
                if let Some(s) = value.as_str() {
                    self.payment.currency = s.to_string();
                }
            }
            "payment.tax_rate" => {
                if let Some(v) = value.as_f64() {
                    self.payment.tax_rate = v;
                }
            }
            "payment.late_fee_cents" => {
                if let Some(v) = value.as_i64() {
                    self.payment.late_fee_cents = v;
                }
            }
            "security.session_timeout_minutes" => {
                if let Some(v) = value.as_i64() {
                    self.security.session_timeout_minutes = v;
                }
            }
            "security.password_min_length" => {
                if let Some(v) = value.as_u64() {
                    self.security.password_min_length = v as usize;
                }
            }
            _ => {
                tracing::debug!(key, "ignoring unknown settings override");
            }
        }
    }

    pub fn apply_overrides<'a, I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        for (key, value) in overrides {
            self.apply_override(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = SystemSettings::default();
        assert!(!settings.maintenance_mode);
        assert_eq!(settings.booking.min_duration_hours, 1);
        assert_eq!(settings.payment.currency, "USD");
    }

    #[test]
    fn test_apply_overrides_keywise() {
        let mut settings = SystemSettings::default();
        let tax = json!(0.18);
        let mode = json!(true);
        let window = json!(14);

        settings.apply_overrides([
            ("payment.tax_rate", &tax),
            ("maintenance_mode", &mode),
            ("booking.advance_window_days", &window),
        ]);

        assert!((settings.payment.tax_rate - 0.18).abs() < f64::EPSILON);
        assert!(settings.maintenance_mode);
        assert_eq!(settings.booking.advance_window_days, 14);
        // Untouched keys keep their defaults.
        assert_eq!(settings.booking.min_duration_hours, 1);
    }

    #[test]
    fn test_unknown_and_mistyped_overrides_ignored() {
        let mut settings = SystemSettings::default();
        let bogus = json!("not a number");
        settings.apply_override("payment.tax_rate", &bogus);
        settings.apply_override("no.such.key", &json!(1));
        assert_eq!(settings.payment.tax_rate, 0.0);
    }
}
