use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::data::loader::{self, LoadOptions};
use crate::data::model::{MarkerTable, Position};
use crate::data::raw::RawTable;
use crate::error::{LoadError, SkipReason};
use crate::notify::{Ack, HttpNotifier, NotifyMode, NotifyRequest, RenderNotifier};
use crate::view::{MarkerView, Scene};

use super::outcome::Outcome;
use super::resolver::FrameIndexResolver;
use super::throttle::Throttle;
use super::validator::{validate_table_frame, PositionLimits};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No recording loaded.
    Idle,
    /// Recording loaded, nothing inspected yet.
    Ready,
    /// A frame has been resolved, validated and drawn.
    FrameActive { index: usize },
}

/// What happened to the external notification for one update.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// No notifier configured.
    Disabled,
    /// Dropped inside the throttle window.
    Throttled,
    /// The payload would be out of range (negative frame, percentage past 100).
    Unsendable,
    /// Handed to the notifier; carries its acknowledgment.
    Sent(Ack),
}

/// Result of one successful pointer update.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameUpdate {
    pub index: usize,
    pub frame_number: i64,
    pub markers_drawn: usize,
    pub highlighted: bool,
    pub notification: Notification,
}

/// Tunables for the interactive loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncSettings {
    pub limits: PositionLimits,
    pub notify_mode: NotifyMode,
    pub throttle: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            limits: PositionLimits::default(),
            notify_mode: NotifyMode::default(),
            throttle: Duration::from_millis(100),
        }
    }
}

// ---------------------------------------------------------------------------
// SyncController
// ---------------------------------------------------------------------------

/// Keeps the time-series pointer, the 3D view and the render engine in step.
///
/// All state changes go through [`load_table`](Self::load_table) and
/// [`pointer_moved`](Self::pointer_moved).
pub struct SyncController<V: MarkerView = Scene> {
    state: SyncState,
    table: Option<MarkerTable>,
    highlight: Option<Position>,
    view: V,
    limits: PositionLimits,
    notify_mode: NotifyMode,
    throttle: Throttle,
    notifier: Option<Box<dyn RenderNotifier>>,
}

impl SyncController<Scene> {
    /// Controller with the built-in scene, notifying over HTTP when
    /// `use_babylon` is set.
    pub fn from_config(config: &Config) -> Self {
        let notifier: Option<Box<dyn RenderNotifier>> = if config.use_babylon {
            let http = HttpNotifier::new(config.babylon_endpoint.clone(), config.notify_timeout());
            log::info!("Render-engine notifications go to {}", http.endpoint());
            Some(Box::new(http))
        } else {
            None
        };
        let settings = SyncSettings {
            limits: config.limits(),
            notify_mode: config.notify_mode,
            throttle: config.throttle_interval(),
        };
        SyncController::new(Scene::default(), settings, notifier)
    }
}

impl<V: MarkerView> SyncController<V> {
    pub fn new(view: V, settings: SyncSettings, notifier: Option<Box<dyn RenderNotifier>>) -> Self {
        SyncController {
            state: SyncState::Idle,
            table: None,
            highlight: None,
            view,
            limits: settings.limits,
            notify_mode: settings.notify_mode,
            throttle: Throttle::new(settings.throttle),
            notifier,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn table(&self) -> Option<&MarkerTable> {
        self.table.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn limits(&self) -> &PositionLimits {
        &self.limits
    }

    /// Index of the frame currently drawn.
    pub fn active_frame(&self) -> Option<usize> {
        match self.state {
            SyncState::FrameActive { index } => Some(index),
            _ => None,
        }
    }

    /// Highlighted marker of the active frame, if it was valid.
    pub fn highlight(&self) -> Option<Position> {
        self.highlight
    }

    // -- Loading --

    /// Install a loaded table, discarding all view state.
    pub fn load_table(&mut self, table: MarkerTable) {
        log::info!("Recording ready: {table}");
        self.table = Some(table);
        self.highlight = None;
        self.view.clear();
        self.throttle.reset();
        self.state = SyncState::Ready;
    }

    /// Sanitize `raw` and install it. A structural failure keeps the
    /// previous recording and state.
    pub fn load_raw(&mut self, raw: RawTable, options: &LoadOptions) -> Outcome<usize> {
        self.install(loader::sanitize(raw, options))
    }

    /// Load a recording file and install it.
    pub fn load_path(&mut self, path: &Path, options: &LoadOptions) -> Outcome<usize> {
        self.install(loader::load_file(path, options))
    }

    fn install(&mut self, result: Result<MarkerTable, LoadError>) -> Outcome<usize> {
        if let Err(err) = &result {
            log::error!("Failed to load recording: {err}");
        }
        Outcome::from(result.map(|table| {
            let frames = table.len();
            self.load_table(table);
            frames
        }))
    }

    // -- Interactive loop --

    /// Handle a pointer position on the time-series frame axis.
    pub fn pointer_moved(&mut self, query: f64, now: Instant) -> Outcome<FrameUpdate> {
        let Some(table) = self.table.as_ref() else {
            return Outcome::Skipped(SkipReason::NoRecording);
        };

        let index = match FrameIndexResolver::new(table.frame_numbers()).resolve(query) {
            Ok(index) => index,
            Err(reason) => {
                log::debug!("Pointer ignored: {reason}");
                return Outcome::Skipped(reason);
            }
        };
        let frame_number = table.frame_numbers()[index];
        let frame_count = table.len();
        let validated = validate_table_frame(table, index, &self.limits);

        let outcome = match validated {
            Ok(frame) => {
                self.view.show_frame(&frame);
                self.highlight = frame.highlighted;
                self.state = SyncState::FrameActive { index };
                Ok(FrameUpdate {
                    index,
                    frame_number,
                    markers_drawn: frame.markers.len(),
                    highlighted: frame.highlighted.is_some(),
                    notification: Notification::Disabled,
                })
            }
            Err(reason) => {
                log::warn!("Frame {frame_number} not drawn: {reason}");
                Err(reason)
            }
        };

        let notification = self.notify(frame_number, frame_count, now);
        Outcome::from(outcome.map(|update| FrameUpdate {
            notification,
            ..update
        }))
    }

    /// Forward the inspected frame to the render engine, subject to throttling.
    fn notify(&mut self, frame_number: i64, frame_count: usize, now: Instant) -> Notification {
        let Some(notifier) = self.notifier.as_mut() else {
            return Notification::Disabled;
        };
        if !self.throttle.admit(now) {
            return Notification::Throttled;
        }
        let Some(request) = NotifyRequest::for_frame(self.notify_mode, frame_number, frame_count)
        else {
            log::warn!(
                "Not notifying frame {frame_number}: {:?} payload out of range",
                self.notify_mode
            );
            return Notification::Unsendable;
        };

        log::debug!("Notifying render engine: {request:?}");
        let ack = notifier.send(&request);
        if ack.is_error() {
            log::warn!(
                "Render-engine notification failed: {}",
                ack.message.as_deref().unwrap_or("unknown error")
            );
        }
        Notification::Sent(ack)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::data::raw::read_csv;

    /// Records every request and answers with a canned ack.
    #[derive(Clone, Default)]
    struct Recorder {
        sent: Rc<RefCell<Vec<NotifyRequest>>>,
        fail: bool,
    }

    impl RenderNotifier for Recorder {
        fn send(&mut self, request: &NotifyRequest) -> Ack {
            self.sent.borrow_mut().push(request.clone());
            if self.fail {
                Ack::error("connection refused")
            } else {
                serde_json::from_str(r#"{"status":"success"}"#).unwrap()
            }
        }
    }

    const CSV: &str = "\
capture
Frame,<T-M> X,<T-M> Y,<T-M> Z,<T-A> X,<T-A> Y,<T-A> Z
0,1,2,3,10,10,10
1,1,2,3,20000,0,0
2,1,2,3,10,10,10
3,50000,0,0,20000,0,0
";

    fn controller(mode: NotifyMode, recorder: Option<Recorder>) -> SyncController {
        let settings = SyncSettings {
            notify_mode: mode,
            ..Default::default()
        };
        let notifier = recorder.map(|r| Box::new(r) as Box<dyn RenderNotifier>);
        let mut ctl = SyncController::new(Scene::default(), settings, notifier);
        let raw = read_csv(CSV.as_bytes(), 1).unwrap();
        assert!(ctl.load_raw(raw, &LoadOptions::new("<T-M>")).is_ok());
        ctl
    }

    #[test]
    fn starts_idle_and_becomes_ready_on_load() {
        let mut ctl: SyncController =
            SyncController::new(Scene::default(), SyncSettings::default(), None);
        assert_eq!(ctl.state(), SyncState::Idle);
        assert_eq!(
            ctl.pointer_moved(0.0, Instant::now()).skipped(),
            Some(&SkipReason::NoRecording)
        );
        let raw = read_csv(CSV.as_bytes(), 1).unwrap();
        assert!(matches!(ctl.load_raw(raw, &LoadOptions::new("<T-M>")), Outcome::Ok(4)));
        assert_eq!(ctl.state(), SyncState::Ready);
    }

    #[test]
    fn pointer_activates_nearest_frame() {
        let mut ctl = controller(NotifyMode::Frame, None);
        let update = ctl.pointer_moved(1.6, Instant::now()).ok().unwrap();
        assert_eq!(update.index, 2);
        assert_eq!(update.markers_drawn, 2);
        assert!(update.highlighted);
        assert_eq!(update.notification, Notification::Disabled);
        assert_eq!(ctl.state(), SyncState::FrameActive { index: 2 });
        assert_eq!(ctl.highlight(), Some([1.0, 2.0, 3.0]));
        assert_eq!(ctl.view().frame_number(), Some(2));
    }

    #[test]
    fn out_of_range_marker_is_not_drawn() {
        let mut ctl = controller(NotifyMode::Frame, None);
        let update = ctl.pointer_moved(1.0, Instant::now()).ok().unwrap();
        assert_eq!(update.markers_drawn, 1);
        assert_eq!(ctl.view().markers()[0].name, "M");
    }

    #[test]
    fn out_of_bounds_pointer_keeps_state_and_view() {
        let mut ctl = controller(NotifyMode::Frame, None);
        ctl.pointer_moved(0.0, Instant::now());
        let before = ctl.view().clone();
        let outcome = ctl.pointer_moved(7.5, Instant::now());
        assert!(matches!(outcome.skipped(), Some(SkipReason::QueryOutOfBounds { .. })));
        assert_eq!(ctl.state(), SyncState::FrameActive { index: 0 });
        assert_eq!(ctl.view(), &before);
    }

    #[test]
    fn frame_without_valid_markers_keeps_previous_view() {
        let mut ctl = controller(NotifyMode::Frame, None);
        ctl.pointer_moved(2.0, Instant::now());
        let before = ctl.view().clone();
        let outcome = ctl.pointer_moved(3.0, Instant::now());
        assert_eq!(outcome.skipped(), Some(&SkipReason::NoValidMarkers { index: 3 }));
        assert_eq!(ctl.state(), SyncState::FrameActive { index: 2 });
        assert_eq!(ctl.view(), &before);
    }

    #[test]
    fn notifications_are_throttled() {
        let recorder = Recorder::default();
        let mut ctl = controller(NotifyMode::Frame, Some(recorder.clone()));
        let t = Instant::now();
        ctl.pointer_moved(0.0, t);
        let dropped = ctl.pointer_moved(1.0, t + Duration::from_millis(30)).ok().unwrap();
        assert_eq!(dropped.notification, Notification::Throttled);
        ctl.pointer_moved(2.0, t + Duration::from_millis(140));
        assert_eq!(
            *recorder.sent.borrow(),
            vec![NotifyRequest::Frame { frame: 0 }, NotifyRequest::Frame { frame: 2 }]
        );
    }

    #[test]
    fn percentage_mode_sends_frame_over_count() {
        let recorder = Recorder::default();
        let mut ctl = controller(NotifyMode::Percentage, Some(recorder.clone()));
        ctl.pointer_moved(2.0, Instant::now());
        assert_eq!(
            *recorder.sent.borrow(),
            vec![NotifyRequest::Percentage { percentage: 50.0 }]
        );
    }

    #[test]
    fn skipped_frame_still_notifies() {
        let recorder = Recorder::default();
        let mut ctl = controller(NotifyMode::Frame, Some(recorder.clone()));
        assert!(ctl.pointer_moved(3.0, Instant::now()).skipped().is_some());
        assert_eq!(*recorder.sent.borrow(), vec![NotifyRequest::Frame { frame: 3 }]);
    }

    #[test]
    fn transport_failure_is_not_fatal() {
        let recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        let mut ctl = controller(NotifyMode::Frame, Some(recorder));
        let update = ctl.pointer_moved(0.0, Instant::now()).ok().unwrap();
        match update.notification {
            Notification::Sent(ack) => assert!(ack.is_error()),
            other => panic!("expected a sent notification, got {other:?}"),
        }
        assert_eq!(ctl.state(), SyncState::FrameActive { index: 0 });
    }

    #[test]
    fn failed_reload_keeps_previous_recording() {
        let mut ctl = controller(NotifyMode::Frame, None);
        ctl.pointer_moved(0.0, Instant::now());
        let raw = read_csv("Time,a\n0,1\n".as_bytes(), 0).unwrap();
        assert!(matches!(
            ctl.load_raw(raw, &LoadOptions::new("<T-M>")),
            Outcome::Fatal(_)
        ));
        assert_eq!(ctl.table().map(|t| t.len()), Some(4));
        assert_eq!(ctl.state(), SyncState::FrameActive { index: 0 });
    }

    #[test]
    fn reload_discards_view_state() {
        let mut ctl = controller(NotifyMode::Frame, None);
        ctl.pointer_moved(0.0, Instant::now());
        let raw = read_csv(CSV.as_bytes(), 1).unwrap();
        assert!(ctl.load_raw(raw, &LoadOptions::new("<T-M>")).is_ok());
        assert_eq!(ctl.state(), SyncState::Ready);
        assert!(ctl.view().is_empty());
        assert_eq!(ctl.highlight(), None);
    }
}
