//! Hosts: where the surface is mounted, when frames run, where input comes from.
//!
//! The engine never sleeps or polls a platform on its own. It asks its host
//! to schedule one frame at a time (`request_frame`), waits for the host to
//! hand out the timestamp of that frame (`next_frame`) and collects whatever
//! input arrived in between (`poll_input`).

use ember_core::{EmberError, Result};
use ember_render::{DrawCommand, RecordingSurface, Surface};
use ember_runtime::InputEvent;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

/// Platform services the engine runs on
pub trait Host {
    type Surface: Surface;

    /// Resolve `selector` to a drawing surface of `width` x `height`.
    /// Fails with [`EmberError::MountFailed`] if the target does not exist.
    fn mount(&mut self, selector: &str, width: u32, height: u32) -> Result<Self::Surface>;

    /// Start delivering input events
    fn attach_input(&mut self);

    /// Stop delivering input events and drop any still queued
    fn detach_input(&mut self);

    /// Schedule exactly one frame callback
    fn request_frame(&mut self);

    /// Drop a scheduled frame callback, if any
    fn cancel_frame(&mut self);

    /// Wait for the scheduled frame and return its timestamp in seconds.
    /// `None` when nothing is scheduled or the host has shut down.
    fn next_frame(&mut self) -> Option<f64>;

    /// Input received since the last call
    fn poll_input(&mut self) -> Vec<InputEvent>;

    /// Called after each rendered frame
    fn present(&mut self, _surface: &mut Self::Surface) {}
}

fn check_selector(selector: &str, targets: &[String]) -> Result<()> {
    if selector.trim().is_empty() {
        return Err(EmberError::MountFailed("empty selector".to_string()));
    }
    if !targets.is_empty() && !targets.iter().any(|t| t == selector) {
        return Err(EmberError::MountFailed(format!(
            "no mount target matches '{selector}'"
        )));
    }
    Ok(())
}

/// Simulated host: fixed-interval timestamps, scripted input, recorded frames.
///
/// Frames are handed out instantly, `interval` seconds of simulated time
/// apart, which makes the loop deterministic under test.
pub struct HeadlessHost {
    interval: f64,
    clock: f64,
    /// Accepted mount targets. Empty accepts any non-empty selector.
    targets: Vec<String>,
    frame_limit: Option<u64>,
    frames_delivered: u64,
    frame_requested: bool,
    input_attached: bool,
    /// (frame index, event), delivered before that frame
    script: VecDeque<(u64, InputEvent)>,
    pending_input: Vec<InputEvent>,
    last_frame: Vec<DrawCommand>,
}

impl HeadlessHost {
    /// A host producing `fps` simulated frames per second
    pub fn new(fps: f64) -> Self {
        let interval = if fps > 0.0 { 1.0 / fps } else { 1.0 / 60.0 };
        Self::with_interval(interval)
    }

    /// A host whose frames are `interval` seconds apart
    pub fn with_interval(interval: f64) -> Self {
        Self {
            interval: interval.max(0.0),
            clock: 0.0,
            targets: Vec::new(),
            frame_limit: None,
            frames_delivered: 0,
            frame_requested: false,
            input_attached: false,
            script: VecDeque::new(),
            pending_input: Vec::new(),
            last_frame: Vec::new(),
        }
    }

    /// Stop handing out frames after `frames`
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Only accept these mount targets
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Timestamp of the first frame
    pub fn with_start_time(mut self, seconds: f64) -> Self {
        self.clock = seconds;
        self
    }

    /// Deliver `event` just before frame `frame` (0-based)
    pub fn script(&mut self, frame: u64, event: InputEvent) {
        let index = self.script.partition_point(|(f, _)| *f <= frame);
        self.script.insert(index, (frame, event));
    }

    pub fn frames_delivered(&self) -> u64 {
        self.frames_delivered
    }

    pub fn is_frame_requested(&self) -> bool {
        self.frame_requested
    }

    pub fn is_input_attached(&self) -> bool {
        self.input_attached
    }

    /// Draw commands of the most recently presented frame
    pub fn last_frame(&self) -> &[DrawCommand] {
        &self.last_frame
    }
}

impl Host for HeadlessHost {
    type Surface = RecordingSurface;

    fn mount(&mut self, selector: &str, width: u32, height: u32) -> Result<RecordingSurface> {
        check_selector(selector, &self.targets)?;
        log::debug!("headless surface {width}x{height} mounted at '{selector}'");
        Ok(RecordingSurface::new(width, height))
    }

    fn attach_input(&mut self) {
        self.input_attached = true;
    }

    fn detach_input(&mut self) {
        self.input_attached = false;
        self.pending_input.clear();
    }

    fn request_frame(&mut self) {
        self.frame_requested = true;
    }

    fn cancel_frame(&mut self) {
        self.frame_requested = false;
    }

    fn next_frame(&mut self) -> Option<f64> {
        if !self.frame_requested {
            return None;
        }
        if self.frame_limit.is_some_and(|limit| self.frames_delivered >= limit) {
            self.frame_requested = false;
            return None;
        }
        self.frame_requested = false;

        while self
            .script
            .front()
            .is_some_and(|(f, _)| *f <= self.frames_delivered)
        {
            if let Some((_, event)) = self.script.pop_front() {
                if self.input_attached {
                    self.pending_input.push(event);
                }
            }
        }

        let now = self.clock;
        self.clock += self.interval;
        self.frames_delivered += 1;
        Some(now)
    }

    fn poll_input(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending_input)
    }

    fn present(&mut self, surface: &mut RecordingSurface) {
        self.last_frame = surface.take_commands();
    }
}

const DEFAULT_FRAME_DURATION: Duration = Duration::from_nanos(16_666_667);

/// Wall-clock host: frames paced to a target rate by sleeping between them.
///
/// Draws into a [`RecordingSurface`]; input arrives through the channel
/// returned by [`PacedHost::input_sender`], from any thread.
pub struct PacedHost {
    frame_duration: Duration,
    started: Instant,
    next_deadline: Option<Instant>,
    frame_limit: Option<u64>,
    frames_delivered: u64,
    frame_requested: bool,
    input_attached: bool,
    input_tx: Sender<InputEvent>,
    input_rx: Receiver<InputEvent>,
    last_frame_commands: usize,
}

impl PacedHost {
    /// Host paced at `target_fps`. Rates that give no representable
    /// frame duration fall back to 60 fps.
    pub fn new(target_fps: f64) -> Self {
        let frame_duration = Duration::try_from_secs_f64(1.0 / target_fps)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(DEFAULT_FRAME_DURATION);
        let (input_tx, input_rx) = mpsc::channel();
        Self {
            frame_duration,
            started: Instant::now(),
            next_deadline: None,
            frame_limit: None,
            frames_delivered: 0,
            frame_requested: false,
            input_attached: false,
            input_tx,
            input_rx,
            last_frame_commands: 0,
        }
    }

    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Sender for feeding input events into the host
    pub fn input_sender(&self) -> Sender<InputEvent> {
        self.input_tx.clone()
    }

    pub fn frames_delivered(&self) -> u64 {
        self.frames_delivered
    }

    /// Number of draw commands in the last presented frame
    pub fn last_frame_commands(&self) -> usize {
        self.last_frame_commands
    }
}

impl Host for PacedHost {
    type Surface = RecordingSurface;

    fn mount(&mut self, selector: &str, width: u32, height: u32) -> Result<RecordingSurface> {
        check_selector(selector, &[])?;
        log::debug!("paced surface {width}x{height} mounted at '{selector}'");
        Ok(RecordingSurface::new(width, height))
    }

    fn attach_input(&mut self) {
        // drop anything sent while detached
        while self.input_rx.try_recv().is_ok() {}
        self.input_attached = true;
    }

    fn detach_input(&mut self) {
        self.input_attached = false;
    }

    fn request_frame(&mut self) {
        self.frame_requested = true;
    }

    fn cancel_frame(&mut self) {
        self.frame_requested = false;
    }

    fn next_frame(&mut self) -> Option<f64> {
        if !self.frame_requested {
            return None;
        }
        self.frame_requested = false;
        if self.frame_limit.is_some_and(|limit| self.frames_delivered >= limit) {
            return None;
        }

        let now = Instant::now();
        let deadline = self.next_deadline.unwrap_or(now);
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        let frame_time = Instant::now();
        // a late frame re-anchors the schedule instead of bursting to catch up
        self.next_deadline = Some((deadline + self.frame_duration).max(frame_time));

        self.frames_delivered += 1;
        Some(frame_time.duration_since(self.started).as_secs_f64())
    }

    fn poll_input(&mut self) -> Vec<InputEvent> {
        let events: Vec<InputEvent> = self.input_rx.try_iter().collect();
        if self.input_attached {
            events
        } else {
            Vec::new()
        }
    }

    fn present(&mut self, surface: &mut RecordingSurface) {
        self.last_frame_commands = surface.take_commands().len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    #[test]
    fn test_headless_frames_need_a_request() {
        let mut host = HeadlessHost::new(50.0);
        assert_eq!(host.next_frame(), None);

        host.request_frame();
        assert_eq!(host.next_frame(), Some(0.0));
        assert_eq!(host.next_frame(), None);

        host.request_frame();
        let t = host.next_frame().unwrap();
        assert!((t - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_headless_cancel_drops_request() {
        let mut host = HeadlessHost::new(60.0);
        host.request_frame();
        host.cancel_frame();
        assert_eq!(host.next_frame(), None);
        assert_eq!(host.frames_delivered(), 0);
    }

    #[test]
    fn test_headless_frame_limit() {
        let mut host = HeadlessHost::new(60.0).with_frame_limit(2);
        for _ in 0..2 {
            host.request_frame();
            assert!(host.next_frame().is_some());
        }
        host.request_frame();
        assert_eq!(host.next_frame(), None);
    }

    #[test]
    fn test_mount_checks_targets() {
        let mut host = HeadlessHost::new(60.0).with_targets(["#game"]);
        assert!(host.mount("#game", 10, 10).is_ok());
        assert!(matches!(
            host.mount("#missing", 10, 10),
            Err(EmberError::MountFailed(_))
        ));
        assert!(matches!(
            HeadlessHost::new(60.0).mount("  ", 10, 10),
            Err(EmberError::MountFailed(_))
        ));
    }

    #[test]
    fn test_scripted_input_only_when_attached() {
        let mut host = HeadlessHost::new(60.0);
        host.script(0, InputEvent::KeyDown(KeyCode::Space));
        host.script(1, InputEvent::KeyUp(KeyCode::Space));

        host.request_frame();
        host.next_frame();
        assert!(host.poll_input().is_empty());

        host.attach_input();
        host.request_frame();
        host.next_frame();
        assert_eq!(host.poll_input(), vec![InputEvent::KeyUp(KeyCode::Space)]);
    }

    #[test]
    fn test_script_keeps_frame_order() {
        let mut host = HeadlessHost::new(60.0);
        host.attach_input();
        host.script(1, InputEvent::KeyDown(KeyCode::KeyB));
        host.script(0, InputEvent::KeyDown(KeyCode::KeyA));
        host.script(1, InputEvent::KeyDown(KeyCode::KeyC));

        host.request_frame();
        host.next_frame();
        assert_eq!(host.poll_input(), vec![InputEvent::KeyDown(KeyCode::KeyA)]);
        host.request_frame();
        host.next_frame();
        assert_eq!(
            host.poll_input(),
            vec![
                InputEvent::KeyDown(KeyCode::KeyB),
                InputEvent::KeyDown(KeyCode::KeyC)
            ]
        );
    }

    #[test]
    fn test_paced_host_paces_frames() {
        let mut host = PacedHost::new(200.0).with_frame_limit(3);
        let mut stamps = Vec::new();
        loop {
            host.request_frame();
            match host.next_frame() {
                Some(t) => stamps.push(t),
                None => break,
            }
        }
        assert_eq!(stamps.len(), 3);
        // at 200 fps frames are at least ~5ms apart
        assert!(stamps[2] - stamps[0] >= 0.009);
    }

    #[test]
    fn test_paced_host_rejects_unusable_rates() {
        let fallback = Duration::from_nanos(16_666_667);
        for fps in [0.0, -30.0, 1e-300, f64::NAN, f64::INFINITY] {
            assert_eq!(PacedHost::new(fps).frame_duration(), fallback, "fps={fps}");
        }
        let paced = PacedHost::new(50.0).frame_duration();
        assert!((paced.as_secs_f64() - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_paced_host_input_channel() {
        let mut host = PacedHost::new(60.0);
        let tx = host.input_sender();
        host.attach_input();
        tx.send(InputEvent::MouseDown(0)).unwrap();
        assert_eq!(host.poll_input(), vec![InputEvent::MouseDown(0)]);

        host.detach_input();
        tx.send(InputEvent::MouseDown(1)).unwrap();
        assert!(host.poll_input().is_empty());
    }
}
