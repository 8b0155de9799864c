use serde::{Deserialize, Serialize};

/// Retention window choices offered to the user.
///
/// Each label maps to a millisecond threshold. `AllTime` and `Forever` sit
/// one unit apart at the top of the range so that `age > threshold` never
/// fires for `Forever`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Duration {
    #[serde(rename = "Now")]
    Now,
    #[serde(rename = "One Second")]
    OneSecond,
    #[serde(rename = "One Minute")]
    OneMinute,
    #[serde(rename = "One Hour")]
    OneHour,
    #[serde(rename = "One Day")]
    OneDay,
    #[serde(rename = "One Week")]
    OneWeek,
    #[serde(rename = "One Month")]
    OneMonth,
    #[serde(rename = "Three Months")]
    ThreeMonths,
    #[serde(rename = "Six Months")]
    SixMonths,
    #[serde(rename = "One Year")]
    OneYear,
    #[serde(rename = "Two Years")]
    TwoYears,
    #[serde(rename = "Three Years")]
    ThreeYears,
    #[serde(rename = "All Time")]
    AllTime,
    #[serde(rename = "Forever")]
    Forever,
}

impl Duration {
    pub const ALL: [Duration; 14] = [
        Duration::Now,
        Duration::OneSecond,
        Duration::OneMinute,
        Duration::OneHour,
        Duration::OneDay,
        Duration::OneWeek,
        Duration::OneMonth,
        Duration::ThreeMonths,
        Duration::SixMonths,
        Duration::OneYear,
        Duration::TwoYears,
        Duration::ThreeYears,
        Duration::AllTime,
        Duration::Forever,
    ];

    pub fn threshold_ms(self) -> i64 {
        match self {
            Duration::Now => 1,
            Duration::OneSecond => 1_000,
            Duration::OneMinute => 60_000,
            Duration::OneHour => 3_600_000,
            Duration::OneDay => 86_400_000,
            Duration::OneWeek => 604_800_000,
            Duration::OneMonth => 2_592_000_000,
            Duration::ThreeMonths => 7_776_000_000,
            Duration::SixMonths => 15_552_000_000,
            Duration::OneYear => 31_536_000_000,
            Duration::TwoYears => 63_072_000_000,
            Duration::ThreeYears => 94_608_000_000,
            Duration::AllTime => i64::MAX - 1,
            Duration::Forever => i64::MAX,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Duration::Now => "Now",
            Duration::OneSecond => "One Second",
            Duration::OneMinute => "One Minute",
            Duration::OneHour => "One Hour",
            Duration::OneDay => "One Day",
            Duration::OneWeek => "One Week",
            Duration::OneMonth => "One Month",
            Duration::ThreeMonths => "Three Months",
            Duration::SixMonths => "Six Months",
            Duration::OneYear => "One Year",
            Duration::TwoYears => "Two Years",
            Duration::ThreeYears => "Three Years",
            Duration::AllTime => "All Time",
            Duration::Forever => "Forever",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }

    pub fn is_forever(self) -> bool {
        self == Duration::Forever
    }
}
