//! User profiles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Validation, ValidationResult};

/// Number of facets counted by [`UserProfile::completeness`]
const PROFILE_FACETS: usize = 7;

/// Style preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    #[serde(default)]
    pub style: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub occasions: Vec<String>,
}

/// Body measurements, metric units
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Measurements {
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub chest_cm: Option<f64>,
    #[serde(default)]
    pub waist_cm: Option<f64>,
    #[serde(default)]
    pub hips_cm: Option<f64>,
    #[serde(default)]
    pub shoe_size: Option<String>,
}

impl Measurements {
    fn validate(&self) -> ValidationResult<()> {
        let checks = [
            ("measurements.height_cm", self.height_cm, 50.0, 272.0),
            ("measurements.weight_kg", self.weight_kg, 20.0, 400.0),
            ("measurements.chest_cm", self.chest_cm, 30.0, 250.0),
            ("measurements.waist_cm", self.waist_cm, 30.0, 250.0),
            ("measurements.hips_cm", self.hips_cm, 30.0, 250.0),
        ];
        for (field, value, min, max) in checks {
            if let Some(v) = value {
                if !v.is_finite() || v < min || v > max {
                    return Err(Validation::new(
                        field,
                        format!("must be between {} and {}", min, max),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// A user's profile document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub measurements: Measurements,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Create an empty profile for a user
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            display_name: None,
            email: None,
            avatar_url: None,
            bio: None,
            location: None,
            body_type: None,
            preferences: Preferences::default(),
            measurements: Measurements::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Fraction of profile facets that are filled in, in `[0, 1]`
    pub fn completeness(&self) -> f64 {
        let filled = [
            is_filled(&self.display_name),
            is_filled(&self.avatar_url),
            is_filled(&self.bio),
            is_filled(&self.location),
            is_filled(&self.body_type),
            !self.preferences.style.is_empty(),
            self.measurements.height_cm.is_some(),
        ]
        .iter()
        .filter(|f| **f)
        .count();

        filled as f64 / PROFILE_FACETS as f64
    }

    pub fn is_complete(&self) -> bool {
        self.completeness() >= 1.0
    }

    /// Apply a partial update. List fields are replaced wholesale.
    pub fn apply_patch(&mut self, patch: ProfilePatch) -> ValidationResult<()> {
        if let Some(v) = patch.display_name {
            if v.chars().count() > 80 {
                return Err(Validation::new(
                    "display_name",
                    "Display name exceeds maximum length of 80 characters",
                ));
            }
            self.display_name = non_blank(v);
        }
        if let Some(v) = patch.email {
            let v = v.trim().to_string();
            if !v.is_empty() && !v.contains('@') {
                return Err(Validation::new("email", "Email address is not valid"));
            }
            self.email = non_blank(v);
        }
        if let Some(v) = patch.avatar_url {
            self.avatar_url = non_blank(v);
        }
        if let Some(v) = patch.bio {
            if v.chars().count() > 500 {
                return Err(Validation::new(
                    "bio",
                    "Bio exceeds maximum length of 500 characters",
                ));
            }
            self.bio = non_blank(v);
        }
        if let Some(v) = patch.location {
            self.location = non_blank(v);
        }
        if let Some(v) = patch.body_type {
            self.body_type = non_blank(v);
        }
        if let Some(prefs) = patch.preferences {
            if let Some(style) = prefs.style {
                self.preferences.style = style;
            }
            if let Some(colors) = prefs.colors {
                self.preferences.colors = colors;
            }
            if let Some(occasions) = prefs.occasions {
                self.preferences.occasions = occasions;
            }
        }
        if let Some(m) = patch.measurements {
            m.validate()?;
            self.measurements = m;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false)
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Partial preferences update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesPatch {
    pub style: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub occasions: Option<Vec<String>>,
}

/// Partial profile update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub body_type: Option<String>,
    pub preferences: Option<PreferencesPatch>,
    pub measurements: Option<Measurements>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_patch() -> ProfilePatch {
        ProfilePatch {
            display_name: Some("Ada".to_string()),
            avatar_url: Some("https://cdn.example.com/a.png".to_string()),
            bio: Some("Minimalist".to_string()),
            location: Some("Lisbon".to_string()),
            body_type: Some("athletic".to_string()),
            preferences: Some(PreferencesPatch {
                style: Some(vec!["minimal".to_string()]),
                ..Default::default()
            }),
            measurements: Some(Measurements {
                height_cm: Some(170.0),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_profile_completeness() {
        let profile = UserProfile::new("u1");
        assert_eq!(profile.completeness(), 0.0);
        assert!(!profile.is_complete());
    }

    #[test]
    fn test_complete_profile() {
        let mut profile = UserProfile::new("u1");
        profile.apply_patch(complete_patch()).unwrap();
        assert!(profile.is_complete());
    }

    #[test]
    fn test_blank_fields_do_not_count() {
        let mut profile = UserProfile::new("u1");
        profile
            .apply_patch(ProfilePatch {
                display_name: Some("   ".to_string()),
                bio: Some("Hi".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(profile.display_name, None);
        assert!((profile.completeness() - 1.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_measurements_rejected() {
        let mut profile = UserProfile::new("u1");
        let err = profile
            .apply_patch(ProfilePatch {
                measurements: Some(Measurements {
                    height_cm: Some(12.0),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.field, "measurements.height_cm");
    }

    #[test]
    fn test_invalid_email_rejected() {
        let mut profile = UserProfile::new("u1");
        let result = profile.apply_patch(ProfilePatch {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
