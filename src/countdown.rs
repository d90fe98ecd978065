use chrono::NaiveDateTime;

/// Accepted format for the target timestamp, local wall-clock time.
pub const TARGET_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    /// The target string does not parse as `YYYY-MM-DD HH:MM:SS`.
    Invalid,
    /// The target moment has passed (or is now).
    Reached,
    Remaining {
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
    },
}

/// Strict parse of a target timestamp. chrono tolerates leading
/// whitespace and unpadded fields, so the parsed value is rendered back
/// through the format and must reproduce the input byte for byte.
pub fn parse_target(target: &str) -> Option<NaiveDateTime> {
    let parsed = NaiveDateTime::parse_from_str(target, TARGET_DATE_FORMAT).ok()?;
    if parsed.format(TARGET_DATE_FORMAT).to_string() != target {
        return None;
    }
    Some(parsed)
}

/// Breaks the whole-second delta between `now` and `target` into the
/// displayed fields. Pure; called once per tick.
pub fn compute(target: &str, now: NaiveDateTime) -> CountdownState {
    let Some(target) = parse_target(target) else {
        return CountdownState::Invalid;
    };
    if now >= target {
        return CountdownState::Reached;
    }
    let total = (target - now).num_seconds();
    CountdownState::Remaining {
        days: total / SECONDS_PER_DAY,
        hours: (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR,
        minutes: (total % SECONDS_PER_HOUR) / 60,
        seconds: total % 60,
    }
}

impl CountdownState {
    pub fn label(&self) -> String {
        match self {
            Self::Invalid => "日期格式错误".to_owned(),
            Self::Reached => "时间已到！".to_owned(),
            Self::Remaining {
                days,
                hours,
                minutes,
                seconds,
            } => format!("{days}天 {hours:02}小时 {minutes:02}分 {seconds:02}秒"),
        }
    }
}
