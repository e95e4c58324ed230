//! The dispatch table behind the axis selectors and the chart builder.
//!
//! One [`SheetRule`] per supported (platform, sheet) pair. Sheets without a
//! rule are unsupported: they resolve to hidden selectors and empty charts.

use crate::chart::builder::{self, Axes};
use crate::chart::spec::ChartSpec;
use crate::data::model::{Platform, Table};
use crate::error::BuildError;

/// Builds the primary and secondary chart of one sheet type.
pub type BuildFn = fn(&Table, &Axes<'_>) -> Result<(ChartSpec, ChartSpec), BuildError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    FbPost,
    FbVideo,
    FbStory,
    IgPost,
    IgStory,
}

impl SheetKind {
    /// Column counted by the category breakdown, if the sheet has one.
    pub fn category_column(self) -> Option<&'static str> {
        match self {
            SheetKind::FbPost => Some("類別"),
            SheetKind::IgPost => Some("分類"),
            SheetKind::FbVideo | SheetKind::FbStory | SheetKind::IgStory => None,
        }
    }
}

/// Static option list of one selector. Options are `(label, value)`.
#[derive(Debug)]
pub struct AxisRule {
    pub options: &'static [(&'static str, &'static str)],
    pub default: &'static str,
    /// Shown but not selectable.
    pub disabled: bool,
}

const fn axis(options: &'static [(&'static str, &'static str)], default: &'static str) -> AxisRule {
    AxisRule {
        options,
        default,
        disabled: false,
    }
}

pub struct SheetRule {
    pub kind: SheetKind,
    pub platform: Platform,
    pub sheet: &'static str,
    pub x1: AxisRule,
    pub y1: AxisRule,
    /// The second selector pair, `None` when it is hidden.
    pub second: Option<(AxisRule, AxisRule)>,
    pub build: BuildFn,
}

/// Value of the placeholder option on sheets with no second chart.
pub const NO_INTERACTION: &str = "none";
const NO_INTERACTION_OPTION: &[(&str, &str)] = &[("無特殊交互事項", NO_INTERACTION)];

const FB_VIDEO_METRICS: &[(&str, &str)] = &[
    ("3秒觀看數", "影片觀看 3 秒以上的次數"),
    ("觸及人數", "觸及人數"),
    ("留言", "留言"),
    ("分享", "分享"),
];

pub static RULES: [SheetRule; 5] = [
    SheetRule {
        kind: SheetKind::FbPost,
        platform: Platform::Facebook,
        sheet: "貼文",
        x1: axis(
            &[("發布日期", "發布日期"), ("發布時間", "發布時間"), ("類別", "類別")],
            "發布日期",
        ),
        y1: axis(
            &[
                ("觸及人數", "觸及人數"),
                ("心情", "心情"),
                ("留言", "留言"),
                ("分享", "分享"),
                ("總點擊次數", "總點擊次數"),
                ("連結點擊次數", "連結點擊次數"),
            ],
            "留言",
        ),
        second: Some((
            axis(
                &[("心情", "心情"), ("發布時間", "發布時間"), ("類別", "類別")],
                "類別",
            ),
            axis(
                &[
                    ("留言", "留言"),
                    ("分享", "分享"),
                    ("總點擊次數", "總點擊次數"),
                    ("連結點擊次數", "連結點擊次數"),
                ],
                "總點擊次數",
            ),
        )),
        build: builder::fb_post,
    },
    SheetRule {
        kind: SheetKind::FbVideo,
        platform: Platform::Facebook,
        sheet: "影片",
        x1: axis(&[("心情", "心情")], "心情"),
        y1: axis(FB_VIDEO_METRICS, "影片觀看 3 秒以上的次數"),
        second: Some((
            axis(&[("發布時間", "發布時間")], "發布時間"),
            axis(FB_VIDEO_METRICS, "觸及人數"),
        )),
        build: builder::fb_video,
    },
    SheetRule {
        kind: SheetKind::FbStory,
        platform: Platform::Facebook,
        sheet: "限動",
        x1: axis(&[("發布時間", "發布時間")], "發布時間"),
        y1: axis(
            &[
                ("觸及人數", "觸及人數"),
                ("讚數", "讚數"),
                ("回覆數", "回覆數"),
                ("分享數", "分享數"),
            ],
            "觸及人數",
        ),
        second: Some((
            AxisRule {
                options: NO_INTERACTION_OPTION,
                default: NO_INTERACTION,
                disabled: true,
            },
            AxisRule {
                options: NO_INTERACTION_OPTION,
                default: NO_INTERACTION,
                disabled: true,
            },
        )),
        build: builder::fb_story,
    },
    SheetRule {
        kind: SheetKind::IgPost,
        platform: Platform::Instagram,
        sheet: "圖文",
        x1: axis(&[("發布小時", "發布小時"), ("分類", "分類")], "發布小時"),
        y1: axis(
            &[
                ("觸及數量", "觸及數量"),
                ("按讚數量", "按讚數量"),
                ("分享數量", "分享數量"),
                ("留言數量", "留言數量"),
                ("珍藏次數", "珍藏次數"),
            ],
            "觸及數量",
        ),
        second: None,
        build: builder::ig_post,
    },
    SheetRule {
        kind: SheetKind::IgStory,
        platform: Platform::Instagram,
        sheet: "限時動態",
        x1: axis(&[("張貼時間", "張貼時間"), ("觸及數量", "觸及數量")], "張貼時間"),
        y1: axis(
            &[
                ("引導率", "引導率"),
                ("觸及數量", "觸及數量"),
                ("按讚數量", "按讚數量"),
                ("分享率別", "分享率別"),
            ],
            "引導率",
        ),
        second: Some((
            axis(&[("張貼時間", "張貼時間")], "張貼時間"),
            axis(
                &[
                    ("觸及數量", "觸及數量"),
                    ("按讚數量", "按讚數量"),
                    ("分享率別", "分享率別"),
                    ("引導率", "引導率"),
                ],
                "按讚數量",
            ),
        )),
        build: builder::ig_story,
    },
];

/// The rule for `(platform, sheet)`, if that sheet type is supported.
pub fn rule_for(platform: Platform, sheet: &str) -> Option<&'static SheetRule> {
    RULES
        .iter()
        .find(|rule| rule.platform == platform && rule.sheet == sheet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_default_is_one_of_its_options() {
        for rule in &RULES {
            let mut axes = vec![&rule.x1, &rule.y1];
            if let Some((x2, y2)) = &rule.second {
                axes.push(x2);
                axes.push(y2);
            }
            for axis in axes {
                assert!(
                    axis.options.iter().any(|(_, v)| *v == axis.default),
                    "{}/{}: default {} missing",
                    rule.platform,
                    rule.sheet,
                    axis.default
                );
            }
        }
    }

    #[test]
    fn lookup_is_keyed_by_platform_and_sheet() {
        assert_eq!(rule_for(Platform::Facebook, "貼文").map(|r| r.kind), Some(SheetKind::FbPost));
        assert!(rule_for(Platform::Instagram, "貼文").is_none());
        assert!(rule_for(Platform::Facebook, "圖文").is_none());
    }
}
