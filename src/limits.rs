/// Subscription tier limits
///
/// Pure lookup tables keyed by tier. The UI consumes these read-only to
/// draw usage bars and gate actions; nothing in here mutates.

use serde::{Deserialize, Serialize};

/// Named subscription level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Casual,
    Pro,
    Battle,
}

/// Numeric caps and feature flags for one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLimits {
    pub max_paints: u32,
    pub max_projects: u32,
    pub max_photos_per_project: u32,
    pub history_retention_days: u32,
    pub photo_sharing: bool,
    pub battle_reports: bool,
    pub csv_export: bool,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Free, Tier::Casual, Tier::Pro, Tier::Battle];

    pub fn from_name(name: &str) -> Option<Tier> {
        match name {
            "free" => Some(Tier::Free),
            "casual" => Some(Tier::Casual),
            "pro" => Some(Tier::Pro),
            "battle" => Some(Tier::Battle),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Casual => "casual",
            Tier::Pro => "pro",
            Tier::Battle => "battle",
        }
    }

    pub fn limits(self) -> &'static TierLimits {
        match self {
            Tier::Free => &FREE,
            Tier::Casual => &CASUAL,
            Tier::Pro => &PRO,
            Tier::Battle => &BATTLE,
        }
    }
}

const FREE: TierLimits = TierLimits {
    max_paints: 50,
    max_projects: 3,
    max_photos_per_project: 10,
    history_retention_days: 30,
    photo_sharing: false,
    battle_reports: false,
    csv_export: false,
};

const CASUAL: TierLimits = TierLimits {
    max_paints: 200,
    max_projects: 10,
    max_photos_per_project: 25,
    history_retention_days: 90,
    photo_sharing: true,
    battle_reports: false,
    csv_export: false,
};

const PRO: TierLimits = TierLimits {
    max_paints: 1000,
    max_projects: 50,
    max_photos_per_project: 100,
    history_retention_days: 365,
    photo_sharing: true,
    battle_reports: false,
    csv_export: true,
};

const BATTLE: TierLimits = TierLimits {
    max_paints: 5000,
    max_projects: 200,
    max_photos_per_project: 250,
    history_retention_days: 730,
    photo_sharing: true,
    battle_reports: true,
    csv_export: true,
};

/// Usage-bar percentage for a numeric cap, clamped to [0, 100]
pub fn usage_percent(used: u32, cap: u32) -> f32 {
    if cap == 0 {
        return 100.0;
    }
    (used as f32 / cap as f32 * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_names_round_trip() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_name(tier.name()), Some(tier));
        }
        assert_eq!(Tier::from_name("platinum"), None);
    }

    #[test]
    fn caps_grow_with_tier() {
        let mut previous = 0;
        for tier in Tier::ALL {
            let limits = tier.limits();
            assert!(limits.max_photos_per_project > previous);
            previous = limits.max_photos_per_project;
        }
    }

    #[test]
    fn feature_flags_are_monotonic() {
        // A feature unlocked by a tier stays unlocked above it
        let sharing: Vec<bool> = Tier::ALL.iter().map(|t| t.limits().photo_sharing).collect();
        assert_eq!(sharing, vec![false, true, true, true]);

        let battle: Vec<bool> = Tier::ALL.iter().map(|t| t.limits().battle_reports).collect();
        assert_eq!(battle, vec![false, false, false, true]);
    }

    #[test]
    fn usage_percent_clamps() {
        assert_eq!(usage_percent(0, 10), 0.0);
        assert_eq!(usage_percent(5, 10), 50.0);
        assert_eq!(usage_percent(25, 10), 100.0);
        assert_eq!(usage_percent(1, 0), 100.0);
    }
}
