//! Integration tests for the scheduler, driven by a simulated clock

use chrono::{TimeZone, Utc};
use metar_clock::Clock;
use metar_clock::hal::{MockClock, MockLink, MockMetar, MockNetwork, MockStore};
use metar_clock::scheduler::{HOUSEKEEPING_INTERVAL_MS, REFRESH_INTERVAL_MS, TICK_MS};
use metar_clock::{
    Brightness, DisplayConfig, FetchError, Observation, Panel, Scheduler, TickReport, TimeOfDay,
    WifiCredentials,
};

type TestScheduler = Scheduler<MockLink, MockClock, MockMetar, MockNetwork, MockStore>;

/// Observation reported at `HH:MM` on the mock clock's day (2024-01-15 UTC).
fn observation_at(hhmm: &str) -> Observation {
    Observation::from_json(&format!(
        r#"[{{"icaoId":"KLWC","reportTime":"2024-01-15T{hhmm}:00Z","wdir":270,"wspd":8,"temp":4.0,"dewp":-1.0,"altim":1013.2}}]"#
    ))
    .unwrap()
}

fn build(clock: MockClock, metar: MockMetar, network: MockNetwork, config: DisplayConfig) -> TestScheduler {
    Scheduler::new(
        Panel::new(MockLink::new()),
        clock,
        metar,
        network,
        MockStore::new(),
        config,
    )
}

fn online(metar: MockMetar) -> TestScheduler {
    build(MockClock::new(), metar, MockNetwork::online(), DisplayConfig::default())
}

/// Tick every 500 ms up to and including `until_ms`, collecting reports.
fn run_until(s: &mut TestScheduler, until_ms: u64) -> Vec<(u64, TickReport)> {
    let mut reports = Vec::new();
    while s.clock().now_ms() < until_ms {
        s.clock_mut().advance(u64::from(TICK_MS));
        let now = s.clock().now_ms();
        reports.push((now, s.tick()));
    }
    reports
}

fn times(reports: &[(u64, TickReport)], pick: fn(&TickReport) -> bool) -> Vec<u64> {
    reports
        .iter()
        .filter(|(_, r)| pick(r))
        .map(|(t, _)| *t)
        .collect()
}

// ============================================================================
// Cadence
// ============================================================================

#[test]
fn housekeeping_every_five_seconds_refresh_every_five_minutes() {
    let mut s = online(MockMetar::always(observation_at("11:53")));
    let reports = run_until(&mut s, 600_000);

    let housekeeping = times(&reports, |r| r.housekeeping);
    assert_eq!(&housekeeping[..3], &[5_000, 10_000, 15_000]);
    assert_eq!(housekeeping.len() as u64, 600_000 / HOUSEKEEPING_INTERVAL_MS);

    assert_eq!(times(&reports, |r| r.refresh), vec![300_000, 600_000]);
    assert_eq!(s.metar().requested.len() as u64, 600_000 / REFRESH_INTERVAL_MS);
}

#[test]
fn command_runs_everything_and_resets_both_timers() {
    let mut s = online(MockMetar::always(observation_at("11:53")));
    run_until(&mut s, 6_500);

    s.panel_mut().link_mut().push_frame("SPU");
    let at_command = run_until(&mut s, 7_000);
    assert_eq!(
        at_command,
        vec![(
            7_000,
            TickReport {
                housekeeping: true,
                refresh: true,
                command: true
            }
        )]
    );
    assert_eq!(s.last_housekeeping_ms(), 7_000);
    assert_eq!(s.last_refresh_ms(), 7_000);

    let after = run_until(&mut s, 310_000);
    let housekeeping = times(&after, |r| r.housekeeping);
    assert_eq!(&housekeeping[..2], &[12_000, 17_000]);
    assert_eq!(times(&after, |r| r.refresh), vec![307_000]);
}

#[test]
fn command_on_refresh_boundary_fetches_once() {
    let mut s = online(MockMetar::always(observation_at("11:53")));
    run_until(&mut s, 299_500);
    assert!(s.metar().requested.is_empty());

    s.panel_mut().link_mut().push_frame("SPU");
    let reports = run_until(&mut s, 300_000);

    assert_eq!(reports.len(), 1);
    assert!(reports[0].1.command);
    assert_eq!(s.metar().requested.len(), 1);
    assert_eq!(s.last_refresh_ms(), 300_000);
}

#[test]
fn rejected_command_does_not_reset_timers() {
    let mut s = online(MockMetar::new());
    s.panel_mut().link_mut().push_frame("XYZ123");

    let reports = run_until(&mut s, 500);
    assert_eq!(reports[0].1, TickReport::default());
    assert_eq!(s.last_housekeeping_ms(), 0);
    assert_eq!(s.store().saves, 0);
}

// ============================================================================
// Backlight
// ============================================================================

#[test]
fn dim_is_written_once_while_state_is_unchanged() {
    let config = DisplayConfig::default()
        .with_bright_start(TimeOfDay::new(8, 0))
        .with_dim_start(TimeOfDay::new(20, 0))
        .with_levels(100, 10);
    let evening = MockClock::at(Utc.with_ymd_and_hms(2024, 1, 15, 21, 0, 0).unwrap());
    let mut s = build(evening, MockMetar::new(), MockNetwork::online(), config);

    s.housekeeping();
    s.housekeeping();
    run_until(&mut s, 20_000);

    assert_eq!(s.state().brightness, Some(Brightness::Dim));
    assert_eq!(s.panel().link().frames_starting_with("dim="), vec!["dim=10"]);
}

#[test]
fn level_change_rewrites_backlight_in_same_state() {
    let mut s = online(MockMetar::new());
    s.housekeeping();

    s.panel_mut().link_mut().push_frame("BRV80");
    run_until(&mut s, 500);

    assert_eq!(
        s.panel().link().frames_starting_with("dim="),
        vec!["dim=100", "dim=80"]
    );
}

#[test]
fn crossing_into_dim_window_switches_backlight() {
    let config = DisplayConfig::default()
        .with_bright_start(TimeOfDay::new(7, 0))
        .with_dim_start(TimeOfDay::new(12, 1));
    let mut s = build(MockClock::new(), MockMetar::new(), MockNetwork::online(), config);

    run_until(&mut s, 5_000);
    assert_eq!(s.state().brightness, Some(Brightness::Bright));

    run_until(&mut s, 65_000);
    assert_eq!(s.state().brightness, Some(Brightness::Dim));
}

// ============================================================================
// Freshness
// ============================================================================

#[test]
fn ninety_minute_old_report_is_painted_stale() {
    let mut s = online(MockMetar::always(observation_at("10:30")));
    s.refresh();

    let colors = s.panel().link().frames_starting_with("data.mtime.pco=");
    assert_eq!(colors.last().unwrap(), "data.mtime.pco=63488");
}

#[test]
fn thirty_minute_old_report_stays_fresh() {
    let mut s = online(MockMetar::always(observation_at("11:30")));
    s.refresh();
    run_until(&mut s, 20_000);

    let colors = s.panel().link().frames_starting_with("data.mtime.pco=");
    assert!(colors.iter().all(|c| c == "data.mtime.pco=2016"));
}

#[test]
fn report_turns_stale_as_time_passes() {
    let mut s = online(MockMetar::always(observation_at("11:30")));
    s.refresh();

    s.clock_mut().advance(31 * 60 * 1000);
    s.tick();

    let colors = s.panel().link().frames_starting_with("data.mtime.pco=");
    assert_eq!(colors.last().unwrap(), "data.mtime.pco=63488");
}

// ============================================================================
// Fetch Failures
// ============================================================================

#[test]
fn fetch_failure_marks_station_red_and_keeps_values() {
    let obs = observation_at("11:53");
    let mut metar = MockMetar::new();
    metar.push_ok(obs.clone());
    metar.push_err(FetchError::Forbidden);
    let mut s = online(metar);

    s.refresh();
    s.refresh();

    let written = s.panel().link().frames_written();
    assert!(written.contains(&"data.stat.pco=63488".to_string()));
    assert!(written.contains(&"data.warn.txt=\"weather service refused the request\"".to_string()));
    assert_eq!(s.state().observation, Some(obs));
    assert!(s.state().freshness.last_report().is_some());
}

#[test]
fn success_after_failure_repaints_same_observation() {
    let obs = observation_at("11:53");
    let mut metar = MockMetar::new();
    metar.push_ok(obs.clone());
    metar.push_err(FetchError::Unreachable("timed out".into()));
    metar.push_ok(obs);
    let mut s = online(metar);

    s.refresh();
    s.refresh();
    s.refresh();

    let white = s.panel().link().frames_starting_with("data.stat.pco=65535");
    assert_eq!(white.len(), 2);
}

// ============================================================================
// Commands
// ============================================================================

#[test]
fn every_applied_command_is_saved() {
    let mut s = online(MockMetar::new());

    s.panel_mut().link_mut().push_frame("DMV5");
    run_until(&mut s, 500);
    s.panel_mut().link_mut().push_frame("TZDmt");
    run_until(&mut s, 1_000);

    assert_eq!(s.store().saves, 2);
    let saved = s.store().stored.clone().unwrap();
    assert_eq!(saved.dim_level, 5);
    assert_eq!(saved.zone.as_str(), "mt");
}

#[test]
fn save_failure_keeps_in_memory_change() {
    let mut store = MockStore::new();
    store.fail_saves = true;
    let mut link = MockLink::new();
    link.push_frame("STAkpdx");
    let mut s = Scheduler::new(
        Panel::new(link),
        MockClock::new(),
        MockMetar::new(),
        MockNetwork::online(),
        store,
        DisplayConfig::default(),
    );

    assert!(s.tick().command);
    assert_eq!(s.config().station.as_str(), "KPDX");
    assert_eq!(s.store().saves, 0);
    assert_eq!(s.store().stored, None);
}

#[test]
fn station_change_fetches_new_station_immediately() {
    let mut s = online(MockMetar::always(observation_at("11:53")));
    s.panel_mut().link_mut().push_frame("STAkbos");
    run_until(&mut s, 500);

    assert_eq!(s.metar().requested, vec!["KBOS"]);
    assert!(s
        .panel()
        .link()
        .frames_written()
        .contains(&"settings.station.txt=\"KBOS\"".to_string()));
}

#[test]
fn wifi_change_connects_and_forgets_old_profile() {
    let config = DisplayConfig::default().with_wifi(WifiCredentials::new("old-net", "x"));
    let mut s = build(
        MockClock::new(),
        MockMetar::new(),
        MockNetwork::online(),
        config,
    );

    s.panel_mut()
        .link_mut()
        .push_frame("WFInew-net:password:hunter2");
    run_until(&mut s, 500);

    assert_eq!(
        s.network().connects,
        vec![WifiCredentials::new("new-net", "hunter2")]
    );
    assert_eq!(s.network().forgotten, vec!["old-net"]);
    assert_eq!(s.config().wifi.ssid.as_str(), "new-net");
}

#[test]
fn network_command_failures_are_not_fatal() {
    let mut network = MockNetwork::online();
    network.fail_commands = true;
    let config = DisplayConfig::default().with_wifi(WifiCredentials::new("old-net", "x"));
    let mut s = build(MockClock::new(), MockMetar::new(), network, config);

    s.panel_mut().link_mut().push_frame("WFInew-net:password:pw");
    let report = s.tick();

    assert!(report.command);
    assert_eq!(s.network().forgotten, vec!["old-net"]);
}

#[test]
fn pending_refetch_waits_for_network() {
    let mut s = build(
        MockClock::new(),
        MockMetar::always(observation_at("11:53")),
        MockNetwork::offline(),
        DisplayConfig::default(),
    );
    s.panel_mut().link_mut().push_frame("STAkbos");
    s.tick();
    assert!(s.metar().requested.is_empty());
    assert!(s.state().needs_refetch);

    s.network_mut().address = Some([10, 0, 0, 9].into());
    let reports = run_until(&mut s, 5_000);

    assert_eq!(times(&reports, |r| r.refresh), vec![5_000]);
    assert_eq!(s.metar().requested, vec!["KBOS"]);
    assert!(!s.state().needs_refetch);
}

// ============================================================================
// Link Errors
// ============================================================================

#[test]
fn corrupt_inbound_frame_triggers_resync() {
    let mut s = online(MockMetar::new());
    s.panel_mut()
        .link_mut()
        .push_inbound(&[b'S', 0x1A, 0xFF, 0xFF, 0xFF]);

    let report = s.tick();
    assert!(!report.command);
    assert_eq!(s.panel().link().flushes, 1);
    assert_eq!(s.clock().slept_ms, 50);
}

#[test]
fn trailing_bytes_do_not_block_the_command() {
    let mut s = online(MockMetar::new());
    s.panel_mut().link_mut().push_inbound(b"DMV7\xff\xff\xffnoise");

    assert!(s.tick().command);
    assert_eq!(s.config().dim_level, 7);
    assert!(s.panel().link().inbound.is_empty());
}
