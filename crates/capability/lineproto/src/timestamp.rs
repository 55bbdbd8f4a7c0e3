//! 源时间戳换算。

use chrono::{DateTime, Local, Utc};

/// UTC 源时间戳 → 本地时区的 epoch 毫秒。
///
/// 取浮点 epoch 秒乘以 1000 后向零截断。
pub fn to_local_epoch_millis(utc: DateTime<Utc>) -> i64 {
    let local = utc.with_timezone(&Local);
    let seconds = local.timestamp() as f64 + f64::from(local.timestamp_subsec_nanos()) / 1e9;
    (seconds * 1000.0).trunc() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn whole_and_fractional_seconds() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(to_local_epoch_millis(whole), 1_704_067_200_000);

        let fractional = whole + chrono::Duration::milliseconds(250);
        assert_eq!(to_local_epoch_millis(fractional), 1_704_067_200_250);
    }

    #[test]
    fn sub_millisecond_part_is_truncated() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let instant = base + chrono::Duration::microseconds(500);
        assert_eq!(to_local_epoch_millis(instant), 1_704_067_200_000);
    }
}
