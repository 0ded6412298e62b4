//! Pure latency/throughput math, isolated from the network code so it can be
//! unit-tested without a live stream.

use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct StreamTimestamps {
    pub t_start: Instant,
    pub t_first: Option<Instant>,
    pub t_end: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamTiming {
    pub total_latency_ms: f64,
    pub ttft_ms: Option<f64>,
    pub tps: Option<f64>,
}

pub fn compute_timing(ts: StreamTimestamps, output_tokens: i64) -> StreamTiming {
    let total_latency_ms = ts.t_end.saturating_duration_since(ts.t_start).as_secs_f64() * 1000.0;

    let ttft_ms = ts
        .t_first
        .map(|t_first| t_first.saturating_duration_since(ts.t_start).as_secs_f64() * 1000.0);

    let tps = match (ts.t_first, output_tokens > 1) {
        (Some(t_first), true) => {
            let window = ts.t_end.saturating_duration_since(t_first).as_secs_f64();
            if window > 0.0 {
                Some((output_tokens - 1) as f64 / window)
            } else {
                None
            }
        }
        _ => None,
    };

    StreamTiming {
        total_latency_ms,
        ttft_ms,
        tps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn no_first_token_yields_no_ttft_and_no_tps() {
        let t_start = Instant::now();
        sleep(Duration::from_millis(5));
        let t_end = Instant::now();
        let timing = compute_timing(
            StreamTimestamps { t_start, t_first: None, t_end },
            0,
        );
        assert!(timing.ttft_ms.is_none());
        assert!(timing.tps.is_none());
        assert!(timing.total_latency_ms > 0.0);
    }

    #[test]
    fn single_output_token_yields_ttft_but_no_tps() {
        let t_start = Instant::now();
        sleep(Duration::from_millis(2));
        let t_first = Instant::now();
        sleep(Duration::from_millis(2));
        let t_end = Instant::now();
        let timing = compute_timing(
            StreamTimestamps { t_start, t_first: Some(t_first), t_end },
            1,
        );
        assert!(timing.ttft_ms.unwrap() > 0.0);
        assert!(timing.tps.is_none(), "tps requires output_tokens > 1");
    }

    #[test]
    fn ttft_never_exceeds_total_latency() {
        let t_start = Instant::now();
        sleep(Duration::from_millis(2));
        let t_first = Instant::now();
        sleep(Duration::from_millis(5));
        let t_end = Instant::now();
        let timing = compute_timing(
            StreamTimestamps { t_start, t_first: Some(t_first), t_end },
            5,
        );
        assert!(timing.ttft_ms.unwrap() <= timing.total_latency_ms);
        assert!(timing.tps.unwrap() > 0.0);
    }
}
