use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::{
    sync::{broadcast::error::RecvError, Mutex},
    task::JoinHandle,
    time,
};

use crate::{
    config::Config,
    host::{Binding, HostPage, OverlayControl, HAVE_FUTURE_DATA},
    log_debug, log_info, log_warn,
    timeline::TimelineService,
    utils::Throttle,
};

use super::{
    events::{ControllerEvent, MediaEvent, OverlayAction, PageEvent, PageEvents},
    overlay::{progress_text, OverlayView},
    state::{ControllerSnapshot, Phase, SessionState},
};

const ENABLE_LOGS: bool = true;

static VIDEO_URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/video/(\d+)$").expect("video url regex should compile"));

/// Video number at the end of a `/video/{no}` URL.
pub fn video_no_from_url(url: &str) -> Option<u64> {
    VIDEO_URL_PATTERN
        .captures(url)
        .and_then(|captures| captures[1].parse().ok())
}

#[derive(Debug, Default)]
struct SessionTasks {
    locate: Option<JoinHandle<()>>,
    autoplay: Option<JoinHandle<()>>,
    deferred: Vec<JoinHandle<()>>,
}

impl SessionTasks {
    fn track_deferred(&mut self, handle: JoinHandle<()>) {
        self.deferred.retain(|task| !task.is_finished());
        self.deferred.push(handle);
    }

    fn abort_all(&mut self) {
        let handles = self
            .locate
            .take()
            .into_iter()
            .chain(self.autoplay.take())
            .chain(self.deferred.drain(..));
        for handle in handles {
            handle.abort();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingSelection {
    video_no: u64,
    timeline_index: usize,
}

struct ControllerState {
    phase: Phase,
    session: SessionState,
    tasks: SessionTasks,
    /// Selection made for a video that was not loaded yet. Survives teardown.
    pending_selection: Option<PendingSelection>,
    /// Bumped by every teardown; continuations holding an older value are dropped.
    epoch: u64,
    progress_throttle: Throttle,
}

enum Advance {
    Done,
    NextVideo { epoch: u64, current: Option<u64> },
}

/// Drives segment playback on the current video page.
#[derive(Clone)]
pub struct PlaybackController {
    state: Arc<Mutex<ControllerState>>,
    host: Arc<dyn HostPage>,
    service: TimelineService,
    config: Arc<Config>,
}

impl PlaybackController {
    pub fn new(host: Arc<dyn HostPage>, service: TimelineService, config: Arc<Config>) -> Self {
        let state = ControllerState {
            phase: Phase::Idle,
            session: SessionState::default(),
            tasks: SessionTasks::default(),
            pending_selection: None,
            epoch: 0,
            progress_throttle: Throttle::new(config.timing.progress_refresh()),
        };

        Self {
            state: Arc::new(Mutex::new(state)),
            host,
            service,
            config,
        }
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        let state = self.state.lock().await;
        ControllerSnapshot::capture(state.phase, &state.session)
    }

    pub async fn current_video_no(&self) -> Option<u64> {
        self.state.lock().await.session.video_no
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase
    }

    /// Tears down any previous session and starts loading the video in the current URL.
    pub async fn init(&self) {
        self.destroy().await;

        let url = self.host.current_url();
        let Some(video_no) = video_no_from_url(&url) else {
            log_warn!("No video number in {url}");
            self.state.lock().await.phase = Phase::Idle;
            return;
        };

        let epoch = {
            let mut state = self.state.lock().await;
            state.phase = Phase::Idle;
            state.session.video_no = Some(video_no);
            state.epoch
        };

        if !self.service.is_eligible_channel(video_no).await {
            log_info!("Video {video_no} is not from the target channel, skipping");
            return;
        }

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            log_debug!("Session for video {video_no} was torn down during eligibility check");
            return;
        }
        state.phase = Phase::Locating;
        let controller = self.clone();
        state.tasks.locate = Some(tokio::spawn(async move {
            controller.locate_and_load(epoch).await;
        }));
    }

    /// Aborts pending work, unbinds listeners, removes the overlay and clears the session.
    pub async fn destroy(&self) {
        let mut state = self.state.lock().await;
        state.epoch += 1;
        state.tasks.abort_all();
        for id in state.session.listeners.drain(..) {
            self.host.remove_listener(id);
        }
        if state.session.overlay_mounted {
            self.host.remove_overlay();
        }
        state.session.reset();
        state.progress_throttle.reset();
        if state.phase != Phase::Destroyed {
            log_debug!("Playback session destroyed");
        }
        state.phase = Phase::Destroyed;
    }

    async fn locate_and_load(&self, epoch: u64) {
        let interval = self.config.timing.locate_retry_interval();
        let max_retries = self.config.timing.max_locate_retries;

        loop {
            {
                let mut state = self.state.lock().await;
                if state.epoch != epoch {
                    return;
                }
                if let Some(media) = self.host.find_video_element() {
                    state.session.media = Some(media);
                    break;
                }
                state.session.retry_count += 1;
                if state.session.retry_count >= max_retries {
                    log_warn!("Video element not found after {max_retries} attempts");
                    state.phase = Phase::Idle;
                    return;
                }
            }
            time::sleep(interval).await;
        }

        self.load_session(epoch).await;
    }

    async fn load_session(&self, epoch: u64) {
        let Some(video_no) = self.current_video_no().await else {
            return;
        };

        let segments = self.service.segments_for(video_no).await;
        let keys = &self.config.storage_keys;
        let store = self.service.store();
        let auto_play: bool = store.get(&keys.auto_play, false).await;
        let auto_advance: bool = store.get(&keys.auto_advance, false).await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            log_debug!("Dropping stale load of video {video_no}");
            return;
        }
        if segments.is_empty() {
            log_info!("No timeline for video {video_no}");
            state.phase = Phase::Idle;
            return;
        }

        state.session.segments = segments;
        state.session.auto_play = auto_play;
        state.session.auto_advance = auto_advance;

        if let Some(pending) = state
            .pending_selection
            .filter(|pending| pending.video_no == video_no)
        {
            state.pending_selection = None;
            if !state.session.select(pending.timeline_index) {
                log_warn!(
                    "Ignoring selection {} for video {video_no} with {} segments",
                    pending.timeline_index,
                    state.session.segments.len()
                );
            }
        }

        self.mount(&mut state);
        state.phase = Phase::Ready;
        log_info!(
            "Loaded {} segments for video {video_no}",
            state.session.segments.len()
        );

        if auto_play {
            let controller = self.clone();
            state.tasks.autoplay = Some(tokio::spawn(async move {
                controller.auto_play_when_ready(epoch).await;
            }));
        }
    }

    fn mount(&self, state: &mut ControllerState) {
        let mut bindings = vec![
            Binding::MediaTimeUpdate,
            Binding::MediaPause,
            Binding::MediaSeeked,
            Binding::OverlaySwallowClicks,
            Binding::OverlayHoverEnter,
            Binding::OverlayHoverLeave,
            Binding::OverlayClick(OverlayControl::Prev),
            Binding::OverlayClick(OverlayControl::PlayPause),
            Binding::OverlayClick(OverlayControl::Next),
            Binding::OverlayClick(OverlayControl::AutoPlay),
            Binding::OverlayClick(OverlayControl::AutoAdvance),
        ];
        bindings.extend(
            (0..state.session.segments.len())
                .map(|index| Binding::OverlayClick(OverlayControl::Item(index))),
        );

        state.session.listeners = bindings
            .into_iter()
            .map(|binding| self.host.add_listener(binding))
            .collect();

        let current_time = state
            .session
            .media
            .as_ref()
            .map(|media| media.current_time())
            .unwrap_or(0.0);
        state.session.progress_text = progress_text(&state.session, current_time);
        state.session.overlay_mounted = true;
        self.render(&state.session);
    }

    async fn auto_play_when_ready(&self, epoch: u64) {
        loop {
            time::sleep(self.config.timing.autoplay_poll()).await;
            let state = self.state.lock().await;
            if state.epoch != epoch {
                return;
            }
            let Some(media) = state.session.media.as_ref() else {
                return;
            };
            if media.ready_state() >= HAVE_FUTURE_DATA {
                break;
            }
        }

        time::sleep(self.config.timing.autoplay_start_delay()).await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            return;
        }
        log_debug!("Auto-playing segment {}", state.session.current_index + 1);
        self.move_to_current(&mut state);
        self.play_locked(&mut state);
    }

    pub async fn dispatch(&self, event: ControllerEvent) {
        match event {
            ControllerEvent::Media(event) => self.handle_media_event(event).await,
            ControllerEvent::Overlay(action) => self.handle_overlay_action(action).await,
            ControllerEvent::Page(event) => self.handle_page_event(event).await,
        }
    }

    pub async fn handle_media_event(&self, event: MediaEvent) {
        match event {
            MediaEvent::TimeUpdate => self.on_time_update().await,
            MediaEvent::Pause => self.stop().await,
            MediaEvent::Seeked => self.on_seeked().await,
        }
    }

    pub async fn handle_overlay_action(&self, action: OverlayAction) {
        match action {
            OverlayAction::Prev => self.prev_timeline().await,
            OverlayAction::TogglePlay => self.toggle_play().await,
            OverlayAction::Next => self.next_timeline().await,
            OverlayAction::ToggleAutoPlay => self.toggle_auto_play().await,
            OverlayAction::ToggleAutoAdvance => self.toggle_auto_advance().await,
            OverlayAction::Select(index) => self.select_timeline(index).await,
            OverlayAction::ShowList => self.set_list_visible(true).await,
            OverlayAction::HideList => self.set_list_visible(false).await,
        }
    }

    pub async fn handle_page_event(&self, event: PageEvent) {
        match event {
            PageEvent::SegmentSelected {
                video_no,
                timeline_index,
            } => self.on_segment_selected(video_no, timeline_index).await,
            PageEvent::PlaybackStop => self.stop().await,
        }
    }

    /// Forwards page events to this controller until the bus closes.
    pub fn listen(&self, events: &PageEvents) -> JoinHandle<()> {
        let mut receiver = events.subscribe();
        let controller = self.clone();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => controller.handle_page_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        log_warn!("Page event listener lagged, {skipped} events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    pub async fn play(&self) {
        let mut state = self.state.lock().await;
        self.play_locked(&mut state);
    }

    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        self.stop_locked(&mut state);
    }

    pub async fn toggle_play(&self) {
        let mut state = self.state.lock().await;
        if state.session.playing {
            self.stop_locked(&mut state);
        } else {
            self.play_locked(&mut state);
        }
    }

    pub async fn prev_timeline(&self) {
        let mut state = self.state.lock().await;
        if !state.session.overlay_mounted || !state.session.step_back() {
            return;
        }
        self.move_to_current(&mut state);
        if !state.session.playing {
            self.play_locked(&mut state);
        }
    }

    pub async fn next_timeline(&self) {
        let advance = {
            let mut state = self.state.lock().await;
            if !state.session.overlay_mounted {
                return;
            }
            self.advance_locked(&mut state)
        };
        self.finish_advance(advance).await;
    }

    pub async fn select_timeline(&self, index: usize) {
        let mut state = self.state.lock().await;
        if !state.session.overlay_mounted {
            return;
        }
        if !state.session.select(index) {
            log_warn!("Invalid timeline index {index}");
            self.stop_locked(&mut state);
            return;
        }
        self.move_to_current(&mut state);
        if !state.session.playing {
            self.play_locked(&mut state);
        }
    }

    pub async fn toggle_auto_play(&self) {
        let enabled = {
            let mut state = self.state.lock().await;
            state.session.auto_play = !state.session.auto_play;
            self.render(&state.session);
            state.session.auto_play
        };
        self.service
            .store()
            .set(&self.config.storage_keys.auto_play, &enabled)
            .await;
    }

    pub async fn toggle_auto_advance(&self) {
        let enabled = {
            let mut state = self.state.lock().await;
            state.session.auto_advance = !state.session.auto_advance;
            self.render(&state.session);
            state.session.auto_advance
        };
        self.service
            .store()
            .set(&self.config.storage_keys.auto_advance, &enabled)
            .await;
    }

    /// Edge-triggered: an ad appearing stops playback, its disappearance resumes it.
    pub async fn check_ad_playing(&self) {
        let mut state = self.state.lock().await;
        if !state.session.overlay_mounted {
            return;
        }
        let ad_playing = self.host.is_ad_playing();
        if ad_playing == state.session.ad_playing {
            return;
        }
        state.session.ad_playing = ad_playing;
        if ad_playing {
            log_debug!("Ad started, pausing segment playback");
            self.stop_locked(&mut state);
        } else {
            log_debug!("Ad finished, resuming segment playback");
            self.play_locked(&mut state);
        }
    }

    async fn set_list_visible(&self, visible: bool) {
        let mut state = self.state.lock().await;
        if state.session.list_visible != visible {
            state.session.list_visible = visible;
            self.render(&state.session);
        }
    }

    async fn on_segment_selected(&self, video_no: u64, timeline_index: usize) {
        let mut state = self.state.lock().await;
        let loaded = state.phase == Phase::Ready && state.session.video_no == Some(video_no);
        if !loaded {
            log_debug!("Remembering segment {timeline_index} for video {video_no}");
            state.pending_selection = Some(PendingSelection {
                video_no,
                timeline_index,
            });
            return;
        }
        if !state.session.select(timeline_index) {
            log_warn!("Invalid timeline index {timeline_index} for video {video_no}");
            self.stop_locked(&mut state);
            return;
        }
        self.move_to_current(&mut state);
    }

    async fn on_time_update(&self) {
        let mut state = self.state.lock().await;
        if !state.session.overlay_mounted {
            return;
        }

        if state.session.playing && state.progress_throttle.try_acquire() {
            if let Some(current_time) = state.session.media.as_ref().map(|m| m.current_time()) {
                state.session.progress_text = progress_text(&state.session, current_time);
                self.render(&state.session);
            }
        }

        let epoch = state.epoch;
        let controller = self.clone();
        let check = tokio::spawn(async move {
            tokio::task::yield_now().await;
            controller.check_segment_end(epoch).await;
        });
        state.tasks.track_deferred(check);
    }

    async fn on_seeked(&self) {
        let mut state = self.state.lock().await;
        if !state.session.overlay_mounted || state.session.consume_seek() {
            return;
        }
        state.session.playing = false;
        self.render(&state.session);
    }

    async fn check_segment_end(&self, epoch: u64) {
        let advance = {
            let mut state = self.state.lock().await;
            if state.epoch != epoch || !state.session.playing || state.session.advancing {
                return;
            }
            let Some(end) = state.session.current_segment().map(|segment| segment.end) else {
                return;
            };
            let Some(current_time) = state.session.media.as_ref().map(|m| m.current_time()) else {
                return;
            };
            if current_time < end {
                return;
            }
            self.advance_locked(&mut state)
        };
        self.finish_advance(advance).await;
    }

    /// Next segment, or at the last one either the next video or a wrap to the first.
    fn advance_locked(&self, state: &mut ControllerState) -> Advance {
        if state.session.segments.is_empty() || state.session.advancing {
            return Advance::Done;
        }
        if state.session.step_forward() {
            self.move_to_current(state);
            if !state.session.playing {
                self.play_locked(state);
            }
            return Advance::Done;
        }
        if state.session.auto_advance {
            state.session.advancing = true;
            return Advance::NextVideo {
                epoch: state.epoch,
                current: state.session.video_no,
            };
        }
        state.session.current_index = 0;
        self.move_to_current(state);
        Advance::Done
    }

    async fn finish_advance(&self, advance: Advance) {
        let Advance::NextVideo { epoch, current } = advance else {
            return;
        };

        let next = self.service.next_eligible_video(current).await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            return;
        }
        state.session.advancing = false;
        match next {
            Some(video_no) if Some(video_no) == current => {
                log_info!("Video {video_no} is the only eligible one, wrapping to its first segment");
                state.session.current_index = 0;
                self.move_to_current(&mut state);
            }
            Some(video_no) => {
                log_info!("Advancing to video {video_no}");
                self.host.navigate(&self.config.video_page_path(video_no));
            }
            None => log_info!("No eligible video to advance to"),
        }
    }

    fn play_locked(&self, state: &mut ControllerState) {
        let Some(media) = state.session.media.clone() else {
            return;
        };
        let Some(segment) = state.session.current_segment().cloned() else {
            return;
        };

        if !segment.contains(media.current_time()) {
            self.move_to_current(state);
        }
        match media.play() {
            Ok(()) => state.session.playing = true,
            Err(err) => log_debug!("Media refused to play: {err:?}"),
        }
        self.render(&state.session);
    }

    fn stop_locked(&self, state: &mut ControllerState) {
        if let Some(media) = state.session.media.as_ref() {
            media.pause();
        }
        state.session.playing = false;
        self.render(&state.session);
    }

    /// Seeks to the current segment start, flagging the seek as our own.
    fn move_to_current(&self, state: &mut ControllerState) {
        let Some(start) = state.session.current_segment().map(|segment| segment.start) else {
            log_warn!(
                "Invalid timeline index {} of {}",
                state.session.current_index,
                state.session.segments.len()
            );
            self.stop_locked(state);
            return;
        };

        if let Some(media) = state.session.media.clone() {
            state.session.programmatic_seek = true;
            media.set_current_time(start);
            state.session.progress_text = progress_text(&state.session, start);
        }
        self.render(&state.session);
    }

    fn render(&self, session: &SessionState) {
        if session.overlay_mounted {
            self.host
                .render_overlay(&OverlayView::build(session, &self.config));
        }
    }
}
