//! Statutory leave policy table.
//!
//! The table is built once at startup and shared read-only. Limits follow the
//! Employment Act 2007; a deployment may adjust them through a JSON policy file
//! but can never add or remove a category.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

use super::error::ComplianceError;

/// Share of `max_days` above which a request is reported as near the limit.
pub const DEFAULT_WARNING_PERCENT: u32 = 80;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveCategory {
    Annual,
    Sick,
    Maternity,
    Paternity,
    Compassionate,
    Study,
}

impl LeaveCategory {
    pub fn parse(id: &str) -> Result<Self, ComplianceError> {
        id.trim()
            .parse()
            .map_err(|_| ComplianceError::UnknownCategory(id.to_string()))
    }

    pub fn label(self) -> &'static str {
        match self {
            LeaveCategory::Annual => "Annual Leave",
            LeaveCategory::Sick => "Sick Leave",
            LeaveCategory::Maternity => "Maternity Leave",
            LeaveCategory::Paternity => "Paternity Leave",
            LeaveCategory::Compassionate => "Compassionate Leave",
            LeaveCategory::Study => "Study Leave",
        }
    }
}

impl TryFrom<String> for LeaveCategory {
    type Error = ComplianceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LeaveCategory::parse(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeavePolicy {
    #[schema(example = "annual")]
    pub category: LeaveCategory,
    #[schema(example = 21)]
    pub max_days: u32,
    #[schema(example = 80)]
    pub warning_percent: u32,
    pub requires_certificate_above_days: Option<u32>,
    #[schema(example = "Annual leave (minimum 21 working days per year)")]
    pub description: String,
    #[schema(example = "Employment Act 2007, Section 28")]
    pub law_reference: String,
}

impl LeavePolicy {
    fn statutory(
        category: LeaveCategory,
        max_days: u32,
        certificate_above: Option<u32>,
        description: &str,
        law_reference: &str,
    ) -> Self {
        Self {
            category,
            max_days,
            warning_percent: DEFAULT_WARNING_PERCENT,
            requires_certificate_above_days: certificate_above,
            description: description.to_string(),
            law_reference: law_reference.to_string(),
        }
    }

    pub fn exceeds_limit(&self, days: u32) -> bool {
        days > self.max_days
    }

    /// `days > warning_percent% of max_days`, compared without rounding.
    /// Taking exactly the full entitlement is not "approaching" it.
    pub fn near_limit(&self, days: u32) -> bool {
        days < self.max_days
            && u64::from(days) * 100 > u64::from(self.warning_percent) * u64::from(self.max_days)
    }

    pub fn needs_certificate(&self, days: u32) -> bool {
        self.requires_certificate_above_days
            .is_some_and(|threshold| days > threshold)
    }

    fn check(&self) -> Result<(), ComplianceError> {
        let invalid = |reason: &str| ComplianceError::InvalidPolicy {
            category: self.category.to_string(),
            reason: reason.to_string(),
        };

        if self.max_days == 0 {
            return Err(invalid("max_days must be positive"));
        }
        if !(1..=100).contains(&self.warning_percent) {
            return Err(invalid("warning_percent must be between 1 and 100"));
        }
        if self.requires_certificate_above_days.is_some() && self.category != LeaveCategory::Sick {
            return Err(invalid("only sick leave can require a certificate"));
        }
        Ok(())
    }
}

/// Partial entry read from the policy file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyOverride {
    pub max_days: Option<u32>,
    pub warning_percent: Option<u32>,
    pub requires_certificate_above_days: Option<u32>,
    pub description: Option<String>,
    pub law_reference: Option<String>,
}

static STATUTORY: Lazy<PolicyTable> = Lazy::new(|| {
    use LeaveCategory::*;

    let entries = LeaveCategory::iter()
        .map(|category| match category {
            Annual => LeavePolicy::statutory(
                Annual,
                21,
                None,
                "Annual leave (minimum 21 working days per year)",
                "Employment Act 2007, Section 28",
            ),
            Sick => LeavePolicy::statutory(
                Sick,
                7,
                Some(3),
                "Sick leave (7 days, medical certificate beyond 3 days)",
                "Employment Act 2007, Section 29",
            ),
            Maternity => LeavePolicy::statutory(
                Maternity,
                90,
                None,
                "Maternity leave (3 months total)",
                "Employment Act 2007, Section 30",
            ),
            Paternity => LeavePolicy::statutory(
                Paternity,
                14,
                None,
                "Paternity leave (maximum 14 consecutive days)",
                "Employment Act 2007, Section 30A",
            ),
            Compassionate => LeavePolicy::statutory(
                Compassionate,
                7,
                None,
                "Compassionate leave (up to 7 days for family bereavement)",
                "Employment Act 2007, Section 31",
            ),
            Study => LeavePolicy::statutory(
                Study,
                30,
                None,
                "Study leave (up to 30 days per year with employer approval)",
                "Employment Act 2007, Section 32",
            ),
        })
        .collect();

    PolicyTable { entries }
});

/// One entry per [`LeaveCategory`], stored in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    entries: Vec<LeavePolicy>,
}

impl PolicyTable {
    pub fn statutory() -> &'static PolicyTable {
        &STATUTORY
    }

    /// Statutory table, adjusted by `path` when one is configured.
    pub fn load(path: Option<&Path>) -> anyhow::Result<PolicyTable> {
        let Some(path) = path else {
            return Ok(Self::statutory().clone());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading leave policy file {}", path.display()))?;
        let table = Self::statutory()
            .with_json_overrides(&raw)
            .with_context(|| format!("applying leave policy file {}", path.display()))?;

        Ok(table)
    }

    pub fn get(&self, category: LeaveCategory) -> &LeavePolicy {
        &self.entries[category as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LeavePolicy> {
        self.entries.iter()
    }

    pub fn with_json_overrides(&self, raw: &str) -> Result<PolicyTable, ComplianceError> {
        let overrides: BTreeMap<String, PolicyOverride> =
            serde_json::from_str(raw).map_err(|e| ComplianceError::InvalidPolicy {
                category: "*".to_string(),
                reason: e.to_string(),
            })?;
        self.with_overrides(overrides)
    }

    pub fn with_overrides(
        &self,
        overrides: BTreeMap<String, PolicyOverride>,
    ) -> Result<PolicyTable, ComplianceError> {
        let mut table = self.clone();

        for (id, patch) in overrides {
            let category = LeaveCategory::parse(&id)?;
            let entry = &mut table.entries[category as usize];

            if let Some(max_days) = patch.max_days {
                entry.max_days = max_days;
            }
            if let Some(percent) = patch.warning_percent {
                entry.warning_percent = percent;
            }
            if let Some(threshold) = patch.requires_certificate_above_days {
                entry.requires_certificate_above_days = Some(threshold);
            }
            if let Some(description) = patch.description {
                entry.description = description;
            }
            if let Some(reference) = patch.law_reference {
                entry.law_reference = reference;
            }

            entry.check()?;
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statutory_table_covers_every_category_once() {
        let table = PolicyTable::statutory();
        let categories: Vec<_> = table.iter().map(|p| p.category).collect();
        assert_eq!(categories, LeaveCategory::iter().collect::<Vec<_>>());
        assert!(table.iter().all(|p| p.max_days > 0));
    }

    #[test]
    fn statutory_limits() {
        let table = PolicyTable::statutory();
        assert_eq!(table.get(LeaveCategory::Annual).max_days, 21);
        assert_eq!(table.get(LeaveCategory::Sick).max_days, 7);
        assert_eq!(table.get(LeaveCategory::Maternity).max_days, 90);
        assert_eq!(table.get(LeaveCategory::Paternity).max_days, 14);
        assert_eq!(table.get(LeaveCategory::Compassionate).max_days, 7);
        assert_eq!(table.get(LeaveCategory::Study).max_days, 30);
        assert_eq!(
            table.get(LeaveCategory::Sick).requires_certificate_above_days,
            Some(3)
        );
        assert_eq!(
            table.get(LeaveCategory::Annual).requires_certificate_above_days,
            None
        );
    }

    #[test]
    fn parse_identifier_then_get() {
        let table = PolicyTable::statutory();
        let paternity = LeaveCategory::parse("paternity").unwrap();
        assert_eq!(table.get(paternity).max_days, 14);
        assert_eq!(LeaveCategory::parse(" annual "), Ok(LeaveCategory::Annual));
        assert_eq!(
            LeaveCategory::parse("sabbatical"),
            Err(ComplianceError::UnknownCategory("sabbatical".to_string()))
        );
    }

    #[test]
    fn near_limit_uses_exact_fraction() {
        let annual = PolicyTable::statutory().get(LeaveCategory::Annual);
        // 80% of 21 is 16.8
        assert!(!annual.near_limit(16));
        assert!(annual.near_limit(17));

        let maternity = PolicyTable::statutory().get(LeaveCategory::Maternity);
        // 80% of 90 is exactly 72
        assert!(!maternity.near_limit(72));
        assert!(maternity.near_limit(73));
    }

    #[test]
    fn overrides_adjust_existing_entries() {
        let raw = r#"{
            "annual": { "max_days": 24, "warning_percent": 75 },
            "sick": { "requires_certificate_above_days": 2 }
        }"#;
        let table = PolicyTable::statutory().with_json_overrides(raw).unwrap();

        let annual = table.get(LeaveCategory::Annual);
        assert_eq!(annual.max_days, 24);
        assert_eq!(annual.warning_percent, 75);
        assert_eq!(
            table.get(LeaveCategory::Sick).requires_certificate_above_days,
            Some(2)
        );
        // untouched categories keep statutory values
        assert_eq!(table.get(LeaveCategory::Paternity).max_days, 14);
        // the shared statutory table is not mutated
        assert_eq!(PolicyTable::statutory().get(LeaveCategory::Annual).max_days, 21);
    }

    #[test]
    fn overrides_reject_unknown_category() {
        let err = PolicyTable::statutory()
            .with_json_overrides(r#"{ "sabbatical": { "max_days": 60 } }"#)
            .unwrap_err();
        assert_eq!(err, ComplianceError::UnknownCategory("sabbatical".to_string()));
    }

    #[test]
    fn overrides_reject_bad_values() {
        let table = PolicyTable::statutory();
        assert!(matches!(
            table.with_json_overrides(r#"{ "annual": { "max_days": 0 } }"#),
            Err(ComplianceError::InvalidPolicy { .. })
        ));
        assert!(matches!(
            table.with_json_overrides(r#"{ "annual": { "warning_percent": 120 } }"#),
            Err(ComplianceError::InvalidPolicy { .. })
        ));
        assert!(matches!(
            table.with_json_overrides(r#"{ "annual": { "requires_certificate_above_days": 5 } }"#),
            Err(ComplianceError::InvalidPolicy { .. })
        ));
        assert!(matches!(
            table.with_json_overrides(r#"{ "annual": { "max_dayz": 5 } }"#),
            Err(ComplianceError::InvalidPolicy { .. })
        ));
    }

    #[test]
    fn load_without_file_is_statutory() {
        let table = PolicyTable::load(None).unwrap();
        assert_eq!(&table, PolicyTable::statutory());
    }
}
