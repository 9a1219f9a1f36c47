//! 전송 통계
//!
//! 세션별 처리율 측정. I/O 없이 호출자가 넘겨주는 `Instant` 기준으로만 동작.

use std::fmt;
use std::time::{Duration, Instant};

/// 처리율 보고
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThroughputReport {
    /// 주기 보고 (순간 속도 + 평균 속도, bytes/sec)
    Interval { instantaneous: f64, average: f64 },

    /// 세션 종료 시 1회 평균 속도 보고 (주기 보고가 없었을 때만)
    Final { average: f64, total_bytes: u64, elapsed: Duration },
}

impl fmt::Display for ThroughputReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThroughputReport::Interval {
                instantaneous,
                average,
            } => write!(
                f,
                "Instantaneous speed: {:.2} B/s, Average speed: {:.2} B/s",
                instantaneous, average
            ),
            ThroughputReport::Final {
                average,
                total_bytes,
                elapsed,
            } => write!(
                f,
                "Average speed: {:.2} B/s ({} bytes in {:.2}s)",
                average,
                total_bytes,
                elapsed.as_secs_f64()
            ),
        }
    }
}

/// 세션 처리율 측정기
#[derive(Debug, Clone)]
pub struct ThroughputMeter {
    /// 세션 시작 시간
    start_time: Instant,

    /// 마지막 보고 시간 (초기값 = 시작 시간)
    last_report_time: Instant,

    /// 마지막 보고 이후 수신 바이트
    bytes_since_last_report: u64,

    /// 총 수신 바이트 (리셋 없음)
    total_bytes: u64,

    /// 보고 주기
    interval: Duration,

    /// 발생한 주기 보고 수
    interval_reports: u64,
}

impl ThroughputMeter {
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(Instant::now(), interval)
    }

    pub fn starting_at(start_time: Instant, interval: Duration) -> Self {
        Self {
            start_time,
            last_report_time: start_time,
            bytes_since_last_report: 0,
            total_bytes: 0,
            interval,
            interval_reports: 0,
        }
    }

    /// 청크 수신 기록, 보고 주기가 지났으면 주기 보고 반환
    pub fn record(&mut self, bytes: usize, now: Instant) -> Option<ThroughputReport> {
        self.total_bytes += bytes as u64;
        self.bytes_since_last_report += bytes as u64;

        let since_last = now.saturating_duration_since(self.last_report_time);
        if since_last < self.interval {
            return None;
        }

        let report = ThroughputReport::Interval {
            instantaneous: rate(self.bytes_since_last_report, since_last),
            average: rate(self.total_bytes, now.saturating_duration_since(self.start_time)),
        };

        self.last_report_time = now;
        self.bytes_since_last_report = 0;
        self.interval_reports += 1;

        Some(report)
    }

    /// 세션 종료 처리
    ///
    /// 주기 보고가 한 번도 없었던 세션에만 평균 속도 보고 1회
    pub fn finish(&self, now: Instant) -> Option<ThroughputReport> {
        if self.interval_reports > 0 {
            return None;
        }

        let elapsed = now.saturating_duration_since(self.start_time);
        Some(ThroughputReport::Final {
            average: rate(self.total_bytes, elapsed),
            total_bytes: self.total_bytes,
            elapsed,
        })
    }

    /// 총 수신 바이트
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// 주기 보고 수
    pub fn interval_reports(&self) -> u64 {
        self.interval_reports
    }

    /// 경과 시간
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start_time)
    }
}

/// bytes/sec 계산 (경과 시간 0이면 0.0)
fn rate(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        return 0.0;
    }
    bytes as f64 / secs
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(3000);

    /// `secs`초 동안 `step` 간격으로 청크를 기록하고 주기 보고 수를 센다
    fn run_session(secs: u64, step: Duration, chunk: usize) -> (ThroughputMeter, u64, Instant) {
        let start = Instant::now();
        let mut meter = ThroughputMeter::starting_at(start, INTERVAL);
        let end = start + Duration::from_secs(secs);

        let mut reports = 0;
        let mut now = start + step;
        while now <= end {
            if meter.record(chunk, now).is_some() {
                reports += 1;
            }
            now += step;
        }
        (meter, reports, end)
    }

    #[test]
    fn test_interval_report_count() {
        for secs in [0, 1, 2, 3, 5, 6, 7, 10, 31] {
            let (meter, reports, end) = run_session(secs, Duration::from_millis(100), 4096);
            assert_eq!(reports, secs / 3, "secs={secs}");
            assert_eq!(meter.interval_reports(), secs / 3);

            let final_report = meter.finish(end);
            if secs < 3 {
                assert!(matches!(final_report, Some(ThroughputReport::Final { .. })));
            } else {
                assert!(final_report.is_none(), "secs={secs}");
            }
        }
    }

    #[test]
    fn test_interval_rates() {
        let start = Instant::now();
        let mut meter = ThroughputMeter::starting_at(start, INTERVAL);

        assert!(meter.record(3000, start + Duration::from_secs(1)).is_none());
        let report = meter.record(3000, start + Duration::from_secs(3)).unwrap();
        assert_eq!(
            report,
            ThroughputReport::Interval {
                instantaneous: 2000.0,
                average: 2000.0,
            }
        );

        // 두 번째 윈도우: 1500바이트 / 3초, 평균 7500 / 6초
        let report = meter.record(1500, start + Duration::from_secs(6)).unwrap();
        assert_eq!(
            report,
            ThroughputReport::Interval {
                instantaneous: 500.0,
                average: 1250.0,
            }
        );
        assert_eq!(meter.total_bytes(), 7500);
    }

    #[test]
    fn test_window_resets_after_report() {
        let start = Instant::now();
        let mut meter = ThroughputMeter::starting_at(start, INTERVAL);

        meter.record(10, start + Duration::from_millis(3000)).unwrap();
        // 직전 보고 기준 3초 미만
        assert!(meter.record(10, start + Duration::from_millis(5999)).is_none());
        assert!(meter.record(10, start + Duration::from_millis(6000)).is_some());
    }

    #[test]
    fn test_short_session_final_report() {
        let start = Instant::now();
        let mut meter = ThroughputMeter::starting_at(start, INTERVAL);
        meter.record(1000, start + Duration::from_millis(200));
        meter.record(1000, start + Duration::from_millis(400));

        let report = meter.finish(start + Duration::from_millis(500)).unwrap();
        assert_eq!(
            report,
            ThroughputReport::Final {
                average: 4000.0,
                total_bytes: 2000,
                elapsed: Duration::from_millis(500),
            }
        );
    }

    #[test]
    fn test_zero_elapsed() {
        let start = Instant::now();
        let meter = ThroughputMeter::starting_at(start, INTERVAL);
        let report = meter.finish(start).unwrap();
        assert!(matches!(report, ThroughputReport::Final { average, .. } if average == 0.0));
    }

    #[test]
    fn test_report_display() {
        let report = ThroughputReport::Interval {
            instantaneous: 1.0,
            average: 2.5,
        };
        assert_eq!(
            report.to_string(),
            "Instantaneous speed: 1.00 B/s, Average speed: 2.50 B/s"
        );
    }
}
