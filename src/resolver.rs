//! Selector configuration for a (platform, sheet), read off the rule table.

use serde::Serialize;

use crate::data::model::Platform;
use crate::rules::{AxisRule, rule_for};

// ---------------------------------------------------------------------------
// Resolved selector configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisOption {
    pub label: String,
    pub value: String,
    pub disabled: bool,
}

/// Options, default and visibility of one axis selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisOptionSet {
    pub options: Vec<AxisOption>,
    pub default: Option<String>,
    pub visible: bool,
}

impl AxisOptionSet {
    pub fn hidden() -> Self {
        Self {
            options: Vec::new(),
            default: None,
            visible: false,
        }
    }

    fn from_rule(rule: &AxisRule) -> Self {
        Self {
            options: rule
                .options
                .iter()
                .map(|(label, value)| AxisOption {
                    label: label.to_string(),
                    value: value.to_string(),
                    disabled: rule.disabled,
                })
                .collect(),
            default: Some(rule.default.to_string()),
            visible: true,
        }
    }

    /// Whether a user may pick `value` on this selector.
    pub fn accepts(&self, value: &str) -> bool {
        self.visible
            && self
                .options
                .iter()
                .any(|o| o.value == value && !o.disabled)
    }

    pub fn label_of(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisSlot {
    X1,
    Y1,
    X2,
    Y2,
}

impl AxisSlot {
    pub const ALL: [AxisSlot; 4] = [AxisSlot::X1, AxisSlot::Y1, AxisSlot::X2, AxisSlot::Y2];
}

/// Everything the selector panel needs for one (platform, sheet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOptions {
    pub comparison_visible: bool,
    pub primary_pane_visible: bool,
    pub secondary_pane_visible: bool,
    pub x1: AxisOptionSet,
    pub y1: AxisOptionSet,
    pub x2: AxisOptionSet,
    pub y2: AxisOptionSet,
}

impl ResolvedOptions {
    /// Nothing selectable. Both chart panes stay up and show empty charts.
    pub fn hidden() -> Self {
        Self {
            comparison_visible: false,
            primary_pane_visible: true,
            secondary_pane_visible: true,
            x1: AxisOptionSet::hidden(),
            y1: AxisOptionSet::hidden(),
            x2: AxisOptionSet::hidden(),
            y2: AxisOptionSet::hidden(),
        }
    }

    pub fn axis(&self, slot: AxisSlot) -> &AxisOptionSet {
        match slot {
            AxisSlot::X1 => &self.x1,
            AxisSlot::Y1 => &self.y1,
            AxisSlot::X2 => &self.x2,
            AxisSlot::Y2 => &self.y2,
        }
    }
}

/// Resolve the selector configuration for `(platform, sheet)`.
///
/// Unknown sheets and `None` resolve to [`ResolvedOptions::hidden`]; this
/// never fails. Options come from the static rule table, not from the data.
pub fn resolve(platform: Platform, sheet: Option<&str>) -> ResolvedOptions {
    let Some(rule) = sheet.and_then(|s| rule_for(platform, s)) else {
        return ResolvedOptions::hidden();
    };

    let (x2, y2) = match &rule.second {
        Some((x2, y2)) => (AxisOptionSet::from_rule(x2), AxisOptionSet::from_rule(y2)),
        None => (AxisOptionSet::hidden(), AxisOptionSet::hidden()),
    };

    ResolvedOptions {
        comparison_visible: true,
        primary_pane_visible: true,
        secondary_pane_visible: true,
        x1: AxisOptionSet::from_rule(&rule.x1),
        y1: AxisOptionSet::from_rule(&rule.y1),
        x2,
        y2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{NO_INTERACTION, RULES};

    #[test]
    fn resolved_options_serialize_for_inspection() {
        let json = serde_json::to_value(resolve(Platform::Facebook, Some("限動"))).unwrap();
        assert_eq!(json["comparison_visible"], true);
        assert_eq!(json["x2"]["visible"], true);
        assert_eq!(json["x2"]["default"], NO_INTERACTION);
        assert_eq!(json["x2"]["options"][0]["value"], NO_INTERACTION);
        assert_eq!(json["x2"]["options"][0]["disabled"], true);

        let hidden = serde_json::to_value(ResolvedOptions::hidden()).unwrap();
        assert_eq!(hidden["y1"]["default"], serde_json::Value::Null);
        assert_eq!(hidden["primary_pane_visible"], true);
    }

    #[test]
    fn unsupported_or_missing_sheet_is_all_hidden() {
        let cases = [
            (Platform::Facebook, None),
            (Platform::Facebook, Some("圖文")),
            (Platform::Instagram, Some("貼文")),
            (Platform::Instagram, Some("Reels")),
            (Platform::Facebook, Some("")),
        ];
        for (platform, sheet) in cases {
            let resolved = resolve(platform, sheet);
            assert!(!resolved.comparison_visible, "{platform} {sheet:?}");
            for slot in AxisSlot::ALL {
                assert_eq!(*resolved.axis(slot), AxisOptionSet::hidden());
            }
        }
    }

    #[test]
    fn visible_defaults_are_listed_options() {
        for rule in &RULES {
            let resolved = resolve(rule.platform, Some(rule.sheet));
            assert!(resolved.comparison_visible);
            for slot in AxisSlot::ALL {
                let set = resolved.axis(slot);
                if !set.visible {
                    continue;
                }
                let default = set.default.as_deref().unwrap();
                assert!(
                    set.options.iter().any(|o| o.value == default),
                    "{}/{} {slot:?}",
                    rule.platform,
                    rule.sheet
                );
            }
        }
    }

    #[test]
    fn fb_post_defaults() {
        let resolved = resolve(Platform::Facebook, Some("貼文"));
        assert!(resolved.comparison_visible);
        assert_eq!(resolved.x1.default.as_deref(), Some("發布日期"));
        assert_eq!(resolved.y1.default.as_deref(), Some("留言"));
        assert_eq!(resolved.x2.default.as_deref(), Some("類別"));
        assert_eq!(resolved.y2.default.as_deref(), Some("總點擊次數"));
        assert_eq!(resolved.x1.options.len(), 3);
        assert_eq!(resolved.y1.options.len(), 6);
    }

    #[test]
    fn fb_story_second_pair_is_a_single_disabled_option() {
        let resolved = resolve(Platform::Facebook, Some("限動"));
        for set in [&resolved.x2, &resolved.y2] {
            assert!(set.visible);
            assert_eq!(set.options.len(), 1);
            assert!(set.options[0].disabled);
            assert_eq!(set.default.as_deref(), Some(NO_INTERACTION));
            assert!(!set.accepts(NO_INTERACTION));
        }
    }

    #[test]
    fn ig_post_hides_second_pair() {
        let resolved = resolve(Platform::Instagram, Some("圖文"));
        assert!(resolved.comparison_visible);
        assert!(resolved.x1.visible && resolved.y1.visible);
        assert!(!resolved.x2.visible && !resolved.y2.visible);
        assert!(resolved.secondary_pane_visible);
    }

    #[test]
    fn video_metric_label_differs_from_value() {
        let resolved = resolve(Platform::Facebook, Some("影片"));
        assert_eq!(resolved.y1.label_of("影片觀看 3 秒以上的次數"), Some("3秒觀看數"));
        assert_eq!(resolved.y2.default.as_deref(), Some("觸及人數"));
    }
}
