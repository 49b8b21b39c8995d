use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wdactl_protocol::Point;

use super::Dispatcher;
use crate::config::AdoptionConfig;
use crate::dispatch::{Mode, TapPreference, TapVariant};
use crate::error::Error;
use crate::gesture::Command;
use crate::session::SessionManager;
use crate::transport::fake::{FakeTransport, Reply};

const BASE: &str = "http://wda.test";
const TAP0: &str = "http://wda.test/session/s1/wda/tap/0";
const NATIVE_DRAG: &str = "http://wda.test/session/s1/wda/dragfromtoforduration";
const ACTIONS: &str = "http://wda.test/session/s1/actions";
const TOUCH: &str = "http://wda.test/session/s1/touch/perform";

struct Harness {
	fake: Arc<FakeTransport>,
	sessions: Arc<SessionManager>,
	dispatcher: Dispatcher,
}

fn harness(mode: Mode, allow_fallback: bool, allow_timeout_fallback: bool) -> Harness {
	let fake = Arc::new(FakeTransport::new());
	fake.on_get("http://wda.test/sessions", Reply::Json(json!({ "value": [{ "id": "s1" }] })));
	let adoption = AdoptionConfig {
		status_polls: 1,
		poll_interval: Duration::from_millis(1),
		..AdoptionConfig::default()
	};
	let sessions = Arc::new(SessionManager::new(fake.clone(), adoption, false).with_initial_mode(mode, TapPreference::Auto));
	let dispatcher = Dispatcher::new(sessions.clone(), fake.clone()).with_fallback(allow_fallback, allow_timeout_fallback);
	Harness { fake, sessions, dispatcher }
}

fn tap() -> Command {
	Command::Tap { at: Point::new(10.0, 20.0) }
}

fn drag() -> Command {
	Command::Drag {
		from: Point::new(0.0, 0.0),
		to: Point::new(50.0, 50.0),
		duration: Duration::from_millis(120),
	}
}

#[tokio::test]
async fn auto_falls_back_to_actions_and_pins_it() {
	let h = harness(Mode::Auto, true, false);
	h.fake.on_post(ACTIONS, Reply::Json(json!({ "value": "done" })));

	let reply = h.dispatcher.dispatch(BASE, &tap()).await.unwrap();
	assert_eq!(reply, json!({ "value": "done" }));
	assert_eq!(h.fake.count("POST", TAP0), 1);
	assert_eq!(h.fake.count("POST", NATIVE_DRAG), 1);
	assert_eq!(h.fake.count("POST", ACTIONS), 1);
	assert_eq!(h.fake.count("POST", TOUCH), 0);
	assert_eq!(h.sessions.backend(BASE).mode().mode(), Mode::Actions);
}

#[tokio::test]
async fn pinned_mode_goes_straight_to_winner() {
	let h = harness(Mode::Auto, true, false);
	h.fake.on_post(ACTIONS, Reply::ok());

	h.dispatcher.dispatch(BASE, &tap()).await.unwrap();
	h.dispatcher.dispatch(BASE, &tap()).await.unwrap();
	assert_eq!(h.fake.count("POST", TAP0), 1);
	assert_eq!(h.fake.count("POST", ACTIONS), 2);
}

#[tokio::test]
async fn native_tap_success_pins_variant() {
	let h = harness(Mode::Auto, true, false);
	h.fake.on_post(NATIVE_DRAG, Reply::ok());

	h.dispatcher.dispatch(BASE, &tap()).await.unwrap();
	let snapshot = h.sessions.backend(BASE).mode().snapshot();
	assert_eq!(snapshot.mode, Mode::Native);
	assert_eq!(snapshot.native_tap, TapPreference::Pinned(TapVariant::ZeroDrag));

	h.dispatcher.dispatch(BASE, &tap()).await.unwrap();
	assert_eq!(h.fake.count("POST", TAP0), 1);
	assert_eq!(h.fake.count("POST", NATIVE_DRAG), 2);
}

#[tokio::test]
async fn not_found_advances_exactly_one_step() {
	let h = harness(Mode::Auto, true, false);
	h.fake.on_post(ACTIONS, Reply::ok());

	h.dispatcher.dispatch(BASE, &drag()).await.unwrap();
	assert_eq!(h.fake.count("POST", NATIVE_DRAG), 1);
	assert_eq!(h.fake.count("POST", ACTIONS), 1);
	assert_eq!(h.fake.count("POST", TOUCH), 0);
}

#[tokio::test]
async fn server_error_aborts_without_fallback() {
	let h = harness(Mode::Actions, true, false);
	h.fake.on_post(ACTIONS, Reply::Status(500, "boom".into()));
	h.fake.on_post(TOUCH, Reply::ok());

	let err = h.dispatcher.dispatch(BASE, &tap()).await.unwrap_err();
	assert_eq!(err.http_status(), Some(500));
	assert_eq!(h.fake.count("POST", TOUCH), 0);
}

#[tokio::test]
async fn timeouts_are_unsafe_by_default() {
	let h = harness(Mode::Actions, true, false);
	h.fake.on_post(ACTIONS, Reply::Timeout);
	h.fake.on_post(TOUCH, Reply::ok());

	assert!(h.dispatcher.dispatch(BASE, &drag()).await.is_err());
	assert_eq!(h.fake.count("POST", TOUCH), 0);
}

#[tokio::test]
async fn timeout_override_allows_fallback() {
	let h = harness(Mode::Actions, true, true);
	h.fake.on_post(ACTIONS, Reply::Timeout);
	h.fake.on_post(TOUCH, Reply::ok());

	h.dispatcher.dispatch(BASE, &drag()).await.unwrap();
	assert_eq!(h.fake.count("POST", TOUCH), 1);
}

#[tokio::test]
async fn connect_failures_fall_back() {
	let h = harness(Mode::Jsonwp, true, false);
	h.fake.on_post(TOUCH, Reply::Connect);
	h.fake.on_post(ACTIONS, Reply::ok());

	h.dispatcher.dispatch(BASE, &drag()).await.unwrap();
	assert_eq!(h.fake.count("POST", ACTIONS), 1);
}

#[tokio::test]
async fn exhausting_every_protocol_reports_last_error() {
	let h = harness(Mode::Auto, true, false);

	match h.dispatcher.dispatch(BASE, &drag()).await {
		Err(Error::DispatchExhausted { last }) => assert_eq!(last.http_status(), Some(404)),
		other => panic!("unexpected {other:?}"),
	}
	assert_eq!(h.fake.count("POST", TOUCH), 1);
	assert_eq!(h.sessions.backend(BASE).mode().mode(), Mode::Auto);
}

#[tokio::test]
async fn disabled_fallback_tries_only_first_candidate() {
	let h = harness(Mode::Auto, false, false);
	h.fake.on_post(ACTIONS, Reply::ok());

	assert!(matches!(h.dispatcher.dispatch(BASE, &drag()).await, Err(Error::DispatchExhausted { .. })));
	assert_eq!(h.fake.count("POST", NATIVE_DRAG), 1);
	assert_eq!(h.fake.count("POST", ACTIONS), 0);
}

#[tokio::test]
async fn disabled_fallback_skips_protocols_without_a_trace_form() {
	let h = harness(Mode::Auto, false, false);
	h.fake.on_post(ACTIONS, Reply::ok());
	h.fake.on_post(TOUCH, Reply::ok());

	let cmd = Command::TracedDrag {
		points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(20.0, 0.0)],
		total: Duration::from_millis(100),
	};
	h.dispatcher.dispatch(BASE, &cmd).await.unwrap();
	assert_eq!(h.fake.count("POST", ACTIONS), 1);
	assert_eq!(h.fake.count("POST", TOUCH), 0);
	assert_eq!(h.fake.count("POST", NATIVE_DRAG), 0);
}

#[tokio::test]
async fn disabled_fallback_stops_after_first_sent_candidate() {
	let h = harness(Mode::Native, false, false);
	h.fake.on_post(TOUCH, Reply::ok());

	let cmd = Command::TracedDrag {
		points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
		total: Duration::from_millis(40),
	};
	match h.dispatcher.dispatch(BASE, &cmd).await {
		Err(Error::DispatchExhausted { last }) => assert_eq!(last.http_status(), Some(404)),
		other => panic!("unexpected {other:?}"),
	}
	assert_eq!(h.fake.count("POST", ACTIONS), 1);
	assert_eq!(h.fake.count("POST", TOUCH), 0);
}

#[tokio::test]
async fn gone_session_is_readopted_and_retried_once() {
	let h = harness(Mode::Actions, true, false);
	h.fake.on_get("http://wda.test/sessions", Reply::Json(json!({ "value": [{ "id": "s1" }, { "id": "s2" }] })));
	h.fake.on_post(ACTIONS, Reply::session_gone());
	h.fake.on_post("http://wda.test/session/s2/actions", Reply::ok());

	h.dispatcher.dispatch(BASE, &tap()).await.unwrap();
	assert_eq!(h.fake.count("POST", ACTIONS), 1);
	assert_eq!(h.fake.count("POST", "http://wda.test/session/s2/actions"), 1);
	assert_eq!(h.sessions.cached(BASE).await.as_deref(), Some("s2"));
}

#[tokio::test]
async fn native_pump_failure_midway_is_not_retried_elsewhere() {
	let h = harness(Mode::Native, true, false);
	h.fake.on_post(NATIVE_DRAG, Reply::ok());
	h.fake.on_post(NATIVE_DRAG, Reply::Status(404, "unknown command".into()));
	h.fake.on_post(ACTIONS, Reply::ok());

	let cmd = Command::PumpedDrag {
		points: vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(10.0, 10.0)],
		segment: Duration::from_millis(80),
	};
	match h.dispatcher.dispatch(BASE, &cmd).await {
		Err(Error::PartialGesture { completed, total, .. }) => assert_eq!((completed, total), (1, 2)),
		other => panic!("unexpected {other:?}"),
	}
	assert_eq!(h.fake.count("POST", ACTIONS), 0);
}

#[tokio::test]
async fn native_pump_reports_segments() {
	let h = harness(Mode::Native, true, false);
	h.fake.on_post(NATIVE_DRAG, Reply::ok());

	let cmd = Command::PumpedDrag {
		points: vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(10.0, 10.0)],
		segment: Duration::from_millis(80),
	};
	assert_eq!(h.dispatcher.dispatch(BASE, &cmd).await.unwrap(), json!({ "ok": true, "segments": 2 }));
	assert_eq!(h.fake.count("POST", NATIVE_DRAG), 2);
}

#[tokio::test]
async fn trace_skips_native_and_uses_actions() {
	let h = harness(Mode::Auto, true, false);
	h.fake.on_post(ACTIONS, Reply::ok());

	let cmd = Command::TracedDrag {
		points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(20.0, 0.0)],
		total: Duration::from_millis(100),
	};
	h.dispatcher.dispatch(BASE, &cmd).await.unwrap();
	assert_eq!(h.fake.count("POST", NATIVE_DRAG), 0);
	let sent = h.fake.calls().into_iter().find(|c| c.url == ACTIONS).and_then(|c| c.body).unwrap();
	assert_eq!(sent["actions"][0]["actions"][2]["duration"], 50);
	assert_eq!(sent["actions"][0]["actions"][3]["duration"], 50);
}

#[tokio::test]
async fn trivial_polyline_touches_nothing() {
	let h = harness(Mode::Auto, true, false);
	let cmd = Command::TracedDrag {
		points: vec![Point::new(1.0, 1.0)],
		total: Duration::from_millis(100),
	};
	assert_eq!(h.dispatcher.dispatch(BASE, &cmd).await.unwrap(), json!({ "ok": true, "segments": 0 }));
	assert!(h.fake.calls().is_empty());
}

#[tokio::test]
async fn missing_session_propagates() {
	let fake = Arc::new(FakeTransport::new());
	let adoption = AdoptionConfig {
		status_polls: 1,
		..AdoptionConfig::default()
	};
	let sessions = Arc::new(SessionManager::new(fake.clone(), adoption, false));
	let dispatcher = Dispatcher::new(sessions, fake.clone());
	assert!(matches!(dispatcher.dispatch(BASE, &tap()).await, Err(Error::NoSession)));
	assert!(fake.calls().iter().all(|c| c.method == "GET"));
}
