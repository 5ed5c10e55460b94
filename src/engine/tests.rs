use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::aggregate::{merge, tally};
use super::pacer::{Pacer, tick_period};
use super::*;
use crate::scenario::Validate;
use crate::test_support::{run_async_test, spawn_http_server, unreachable_url};

fn scenario(name: &str, url: &str, count: u64, throughput: f64) -> Scenario {
    Scenario {
        name: name.to_owned(),
        url: url.to_owned(),
        count: Some(count),
        throughput,
        validates: vec![Validate::status_code(200)],
        ..Scenario::default()
    }
}

fn config(workers: usize) -> Result<EngineConfig, String> {
    Ok(EngineConfig {
        workers: NonZeroUsize::new(workers).ok_or_else(|| "workers must be > 0".to_owned())?,
        request_timeout: Duration::from_secs(5),
    })
}

fn expect_report(actual: &ScenarioReport, expected: ScenarioReport) -> Result<(), String> {
    if *actual != expected {
        return Err(format!("Expected {:?}, got {:?}", expected, actual));
    }
    Ok(())
}

#[test]
fn tick_period_follows_rate() -> Result<(), String> {
    if tick_period(10.0) != Duration::from_millis(100) {
        return Err(format!("Unexpected period: {:?}", tick_period(10.0)));
    }
    if tick_period(f64::MAX).is_zero() {
        return Err("Period must never be zero".to_owned());
    }
    if tick_period(f64::MIN_POSITIVE) > Duration::from_secs(31_536_000) {
        return Err("Period must stay bounded".to_owned());
    }
    Ok(())
}

#[test]
fn pacer_does_not_run_ahead_of_schedule() -> Result<(), String> {
    run_async_test(async {
        let cancel = CancellationToken::new();
        let mut pacer = Pacer::spawn(20.0, &cancel);
        let window = Duration::from_millis(500);
        let started = Instant::now();
        let mut ticks: u64 = 0;
        while started.elapsed() < window {
            match tokio::time::timeout(window.saturating_sub(started.elapsed()), pacer.tick())
                .await
            {
                Ok(Some(())) => ticks = ticks.saturating_add(1),
                Ok(None) => return Err("Pacer ended without cancellation".to_owned()),
                Err(_) => break,
            }
        }
        // ceil(20 * 0.5) + 1
        if ticks > 11 {
            return Err(format!("Pacer emitted {} ticks in 500ms at 20/s", ticks));
        }
        if ticks == 0 {
            return Err("Pacer emitted no ticks".to_owned());
        }
        Ok(())
    })
}

#[test]
fn pacer_does_not_bank_ticks_for_slow_consumers() -> Result<(), String> {
    run_async_test(async {
        let cancel = CancellationToken::new();
        let mut pacer = Pacer::spawn(100.0, &cancel);
        tokio::time::sleep(Duration::from_millis(300)).await;
        let started = Instant::now();
        let mut immediate: u64 = 0;
        for _ in 0..5 {
            if pacer.tick().await.is_none() {
                return Err("Pacer ended without cancellation".to_owned());
            }
            if started.elapsed() < Duration::from_millis(5) {
                immediate = immediate.saturating_add(1);
            }
        }
        if immediate > 2 {
            return Err(format!("{} ticks were available at once", immediate));
        }
        Ok(())
    })
}

#[test]
fn pacer_stops_after_cancellation() -> Result<(), String> {
    run_async_test(async {
        let cancel = CancellationToken::new();
        let mut pacer = Pacer::spawn(1000.0, &cancel);
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        if pacer.tick().await.is_some() {
            return Err("Pacer produced a tick after cancellation".to_owned());
        }
        Ok(())
    })
}

#[test]
fn merge_waits_for_every_worker() -> Result<(), String> {
    run_async_test(async {
        let mut senders = Vec::new();
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (tx, rx) = mpsc::channel(4);
            senders.push(tx);
            receivers.push(rx);
        }
        let merged = merge(receivers);
        let producer = tokio::spawn(async move {
            for (index, tx) in senders.into_iter().enumerate() {
                let outcome = match index {
                    0 => Outcome::Success,
                    1 => Outcome::ValidationFailed,
                    _ => Outcome::RequestFailed,
                };
                tokio::time::sleep(Duration::from_millis(10)).await;
                for _ in 0..=index {
                    if tx.send(outcome).await.is_err() {
                        return;
                    }
                }
            }
        });
        let report = tally(merged).await;
        producer
            .await
            .map_err(|err| format!("Producer failed: {}", err))?;
        expect_report(
            &report,
            ScenarioReport {
                success: 1,
                validation_failed: 2,
                request_failed: 3,
            },
        )
    })
}

#[test]
fn zero_count_completes_with_empty_report() -> Result<(), String> {
    run_async_test(async {
        let cancel = CancellationToken::new();
        let scenario = scenario("empty", "http://127.0.0.1:9/", 0, 10.0);
        let report = tokio::time::timeout(
            Duration::from_secs(1),
            run_scenario(&scenario, &config(4)?, &cancel),
        )
        .await
        .map_err(|_| "Zero-count scenario blocked".to_owned())?
        .map_err(|err| err.to_string())?;
        expect_report(&report, ScenarioReport::default())
    })
}

#[test]
fn every_dispatch_yields_one_outcome() -> Result<(), String> {
    run_async_test(async {
        let server = spawn_http_server(200, Duration::ZERO).await?;
        let cancel = CancellationToken::new();
        let scenario = scenario("ok", &server.url, 25, 200.0);
        let report = run_scenario(&scenario, &config(4)?, &cancel)
            .await
            .map_err(|err| err.to_string())?;
        expect_report(
            &report,
            ScenarioReport {
                success: 25,
                validation_failed: 0,
                request_failed: 0,
            },
        )?;
        if server.requests() != 25 {
            return Err(format!("Server saw {} requests", server.requests()));
        }
        Ok(())
    })
}

#[test]
fn status_mismatch_counts_as_validation_failure() -> Result<(), String> {
    run_async_test(async {
        let server = spawn_http_server(500, Duration::ZERO).await?;
        let cancel = CancellationToken::new();
        let scenario = scenario("broken", &server.url, 10, 200.0);
        let report = run_scenario(&scenario, &config(3)?, &cancel)
            .await
            .map_err(|err| err.to_string())?;
        expect_report(
            &report,
            ScenarioReport {
                success: 0,
                validation_failed: 10,
                request_failed: 0,
            },
        )
    })
}

#[test]
fn unreachable_target_counts_as_request_failure() -> Result<(), String> {
    run_async_test(async {
        let cancel = CancellationToken::new();
        let scenario = scenario("down", &unreachable_url()?, 10, 200.0);
        let report = run_scenario(&scenario, &config(3)?, &cancel)
            .await
            .map_err(|err| err.to_string())?;
        expect_report(
            &report,
            ScenarioReport {
                success: 0,
                validation_failed: 0,
                request_failed: 10,
            },
        )
    })
}

#[test]
fn cancellation_before_start_dispatches_nothing() -> Result<(), String> {
    run_async_test(async {
        let server = spawn_http_server(200, Duration::ZERO).await?;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let scenario = scenario("cancelled", &server.url, 50, 100.0);
        let report = run_scenario(&scenario, &config(4)?, &cancel)
            .await
            .map_err(|err| err.to_string())?;
        expect_report(&report, ScenarioReport::default())?;
        if server.requests() != 0 {
            return Err(format!("Server saw {} requests", server.requests()));
        }
        Ok(())
    })
}

#[test]
fn cancellation_mid_run_keeps_partial_counts() -> Result<(), String> {
    run_async_test(async {
        let server = spawn_http_server(200, Duration::ZERO).await?;
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(350)).await;
            trigger.cancel();
        });
        let scenario = scenario("partial", &server.url, 100, 20.0);
        let report = run_scenario(&scenario, &config(4)?, &cancel)
            .await
            .map_err(|err| err.to_string())?;
        let total = report.total();
        if total == 0 || total >= 100 {
            return Err(format!("Expected a partial run, got {:?}", report));
        }
        if total != server.requests() {
            return Err(format!(
                "Report counts {} but server saw {} requests",
                total,
                server.requests()
            ));
        }
        Ok(())
    })
}

#[test]
fn cancellation_does_not_abort_in_flight_requests() -> Result<(), String> {
    run_async_test(async {
        let server = spawn_http_server(200, Duration::from_millis(500)).await?;
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            trigger.cancel();
        });
        let scenario = scenario("in-flight", &server.url, 3, 100.0);
        let report = run_scenario(&scenario, &config(3)?, &cancel)
            .await
            .map_err(|err| err.to_string())?;
        expect_report(
            &report,
            ScenarioReport {
                success: 3,
                validation_failed: 0,
                request_failed: 0,
            },
        )
    })
}

#[test]
fn supervisor_isolates_failing_scenarios() -> Result<(), String> {
    run_async_test(async {
        let server = spawn_http_server(200, Duration::ZERO).await?;
        let cancel = CancellationToken::new();
        let mut bad = scenario("bad", "not a url", 5, 100.0);
        bad.validates.clear();
        let scenarios = vec![
            scenario("good", &server.url, 5, 100.0),
            bad,
            scenario("good", &server.url, 5, 100.0),
        ];
        let reports = run_scenarios(scenarios, &config(2)?, &cancel).await;

        match reports.get("good") {
            Some(Ok(report)) if report.success == 5 => {}
            other => return Err(format!("Unexpected report for good: {:?}", other)),
        }
        if !matches!(reports.get("bad"), Some(Err(ScenarioError::InvalidUrl { .. }))) {
            return Err(format!("Expected InvalidUrl for bad: {:?}", reports.get("bad")));
        }
        if !matches!(
            reports.get("good#2"),
            Some(Err(ScenarioError::DuplicateName { .. }))
        ) {
            return Err(format!("Expected DuplicateName: {:?}", reports.get("good#2")));
        }
        if reports.len() != 3 {
            return Err(format!("Expected 3 entries, got {}", reports.len()));
        }
        Ok(())
    })
}

#[test]
fn duplicate_key_skips_configured_names() -> Result<(), String> {
    run_async_test(async {
        let server = spawn_http_server(200, Duration::ZERO).await?;
        let cancel = CancellationToken::new();
        let scenarios = vec![
            scenario("a", &server.url, 2, 100.0),
            scenario("a", &server.url, 2, 100.0),
            scenario("a#2", &server.url, 3, 100.0),
        ];
        let reports = run_scenarios(scenarios, &config(2)?, &cancel).await;

        if reports.len() != 3 {
            return Err(format!("Expected 3 entries, got {:?}", reports));
        }
        match reports.get("a") {
            Some(Ok(report)) if report.success == 2 => {}
            other => return Err(format!("Unexpected report for a: {:?}", other)),
        }
        match reports.get("a#2") {
            Some(Ok(report)) if report.success == 3 => {}
            other => return Err(format!("Unexpected report for a#2: {:?}", other)),
        }
        if !matches!(
            reports.get("a#3"),
            Some(Err(ScenarioError::DuplicateName { .. }))
        ) {
            return Err(format!("Expected DuplicateName under a#3: {:?}", reports.get("a#3")));
        }
        Ok(())
    })
}
