use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::{
    preview_budget, Adapter, AdapterId, CallToAction, Config, EmbedTarget, Emitter, MediaSource,
    Overlay, PlatformKind, PlayerCommand, PlayerSignal, Presentation, PreviewEvent, PreviewState,
    RawMessage, Teaching, TeachingSummary, Verdict, ViewContext, ViewerSession,
};

#[derive(Debug, Error)]
pub enum DetailError {
    #[error("Source {index} does not exist, the teaching has {available}")]
    SourceOutOfRange { index: usize, available: usize },

    #[error("Teaching has nothing to play")]
    NoPlayableSource,
}

/// The tabs shown under the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailTab {
    Description,
    Audio,
    Comments,
}

/// Everything a teaching detail page needs to mount a player and gate it.
pub struct DetailOptions<E> {
    pub session: ViewerSession,
    pub context: ViewContext,
    pub embed: Arc<E>,
    pub events: Emitter,
    pub config: Config,
}

/// The composition root of a teaching page.
///
/// Binds an adapter to the page's embed, feeds every time update through the access decision,
/// and raises the blocker on the first block verdict.
pub struct TeachingDetail<E>
where
    E: EmbedTarget,
{
    teaching: Teaching,
    session: ViewerSession,
    context: ViewContext,
    config: Config,
    embed: Arc<E>,
    events: Emitter,

    adapter: Option<Adapter<E>>,
    /// The last adapter bound, kept after a replaced player was torn down.
    mounted: Option<AdapterId>,
    selected: usize,
    preview: PreviewState,
    related: Vec<TeachingSummary>,
}

impl<E> TeachingDetail<E>
where
    E: EmbedTarget,
{
    /// Mounts the teaching, binding a player to its primary source if it has one.
    pub fn mount(teaching: Teaching, options: DetailOptions<E>) -> Self {
        let budget = preview_budget(&teaching, options.context, &options.config);

        let mut detail = Self {
            teaching,
            session: options.session,
            context: options.context,
            config: options.config,
            embed: options.embed,
            events: options.events,

            adapter: None,
            mounted: None,
            selected: 0,
            preview: PreviewState::new(budget),
            related: vec![],
        };

        if let Some(source) = detail.teaching.primary_source().cloned() {
            let adapter = detail.bind(&source);

            detail.events.emit(PreviewEvent::Mounted {
                teaching_id: detail.teaching.id.clone(),
                adapter_id: adapter,
                platform: detail.platform(),
            });

            // Restricted content, or a budget of zero, is blocked before anything plays.
            detail.check_current();
        }

        detail
    }

    /// Sets the related teachings shown in the sidebar.
    pub fn with_related(mut self, related: Vec<TeachingSummary>) -> Self {
        self.related = related;
        self
    }

    /// Handles a message from the page. Returns the verdict after all recognized signals were processed.
    pub fn receive(&mut self, message: RawMessage) -> Verdict {
        let signals = match self.adapter.as_mut() {
            Some(adapter) => {
                adapter.receive(message);
                adapter.drain()
            }
            None => vec![],
        };

        for signal in signals {
            self.handle_signal(signal);
        }

        self.verdict()
    }

    /// Samples a playback position and enforces the verdict.
    pub fn on_time_update(&mut self, current_time: f64) -> Verdict {
        // Nothing more to decide once blocked, and the player is already silenced
        if self.preview.is_blocked() {
            return Verdict::Block;
        }

        let verdict = self
            .preview
            .sample(current_time, &self.session, self.teaching.access_type);

        if let Some(adapter_id) = self.adapter_id() {
            self.events.emit(PreviewEvent::TimeUpdate {
                adapter_id,
                elapsed: self.preview.clock.elapsed(),
                progress: self.preview.clock.progress(),
            });
        }

        if verdict.is_block() {
            self.enforce_block();
        }

        verdict
    }

    /// Switches to another video source. The preview starts over from zero.
    ///
    /// Selecting the current source changes nothing, blocked or not.
    pub fn select_source(&mut self, index: usize) -> Result<(), DetailError> {
        let sources = self.teaching.playable_sources();
        let available = sources.len();

        if available == 0 {
            return Err(DetailError::NoPlayableSource);
        }

        let source = sources
            .get(index)
            .cloned()
            .ok_or(DetailError::SourceOutOfRange { index, available })?;

        if index == self.selected {
            return Ok(());
        }

        self.teardown();
        self.preview.reset();
        self.selected = index;

        let adapter_id = self.bind(&source);

        self.events.emit(PreviewEvent::SourceSelected {
            teaching_id: self.teaching.id.clone(),
            adapter_id,
            platform: self.platform(),
            index,
        });

        self.check_current();
        Ok(())
    }

    /// Tears the player down. Dropping the detail does the same.
    pub fn unmount(self) {}

    pub fn teaching(&self) -> &Teaching {
        &self.teaching
    }

    pub fn session(&self) -> &ViewerSession {
        &self.session
    }

    pub fn sources(&self) -> &[MediaSource] {
        self.teaching.playable_sources()
    }

    pub fn selected_source(&self) -> usize {
        self.selected
    }

    /// Returns true if a source selector should be shown.
    pub fn has_multiple_sources(&self) -> bool {
        self.sources().len() > 1
    }

    pub fn adapter(&self) -> Option<&Adapter<E>> {
        self.adapter.as_ref()
    }

    pub fn platform(&self) -> PlatformKind {
        self.adapter
            .as_ref()
            .map(|a| a.platform())
            .unwrap_or(PlatformKind::Unknown)
    }

    pub fn preview(&self) -> &PreviewState {
        &self.preview
    }

    pub fn elapsed(&self) -> f64 {
        self.preview.clock.elapsed()
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.preview.blocker.overlay()
    }

    pub fn is_blocked(&self) -> bool {
        self.preview.is_blocked()
    }

    /// Returns false once the blocker has replaced the player.
    pub fn player_visible(&self) -> bool {
        self.teaching.primary_source().is_some() && !self.preview.blocker.hides_player()
    }

    pub fn verdict(&self) -> Verdict {
        self.preview.is_blocked().into()
    }

    pub fn related(&self) -> &[TeachingSummary] {
        &self.related
    }

    pub fn tabs(&self) -> Vec<DetailTab> {
        let mut tabs = vec![DetailTab::Description];

        if !self.teaching.audio_sources.is_empty() {
            tabs.push(DetailTab::Audio);
        }

        if self.teaching.comments_enabled {
            tabs.push(DetailTab::Comments);
        }

        tabs
    }

    fn handle_signal(&mut self, signal: PlayerSignal) {
        let Some(adapter_id) = self.adapter_id() else {
            return;
        };

        match signal {
            PlayerSignal::TimeUpdate(seconds) => {
                self.on_time_update(seconds);
            }
            PlayerSignal::StateChange(state) => {
                self.events
                    .emit(PreviewEvent::StateChange { adapter_id, state });
            }
            PlayerSignal::Error(message) => {
                warn!("Player on {} reported an error: {}", adapter_id, message);
                self.events
                    .emit(PreviewEvent::PlayerError { adapter_id, message });
            }
        }
    }

    /// Runs the decision on the current state without a new sample.
    fn check_current(&mut self) {
        let verdict = self
            .preview
            .evaluate(&self.session, self.teaching.access_type);

        if verdict.is_block() {
            self.enforce_block();
        }
    }

    /// Silences the player and raises the overlay, once.
    fn enforce_block(&mut self) {
        if self.preview.is_blocked() {
            return;
        }

        let presentation = self.silence_player();
        let overlay = self.overlay_for(presentation);

        if !self.preview.blocker.raise(overlay) {
            return;
        }

        let adapter_id = self.adapter_id();

        // A replaced player is unmounted, so nothing should listen to it anymore.
        if presentation == Presentation::Replace {
            self.teardown();
        }

        let Some(adapter_id) = adapter_id else {
            return;
        };

        info!(
            "Blocked teaching {} after {:.1}s of {:.1}s",
            self.teaching.slug,
            self.preview.clock.elapsed(),
            self.preview.clock.budget()
        );

        self.events.emit(PreviewEvent::Blocked {
            teaching_id: self.teaching.id.clone(),
            adapter_id,
            elapsed: self.preview.clock.elapsed(),
            budget: self.preview.clock.budget(),
        });
    }

    /// Tries to stop the player, and returns how the overlay has to be presented.
    fn silence_player(&self) -> Presentation {
        let Some(adapter) = self.adapter.as_ref().filter(|a| a.is_controllable()) else {
            return Presentation::Replace;
        };

        let command = if self.config.pause_on_block || !adapter.platform().supports(&PlayerCommand::Stop) {
            PlayerCommand::Pause
        } else {
            PlayerCommand::Stop
        };

        if adapter.send_command(command) {
            Presentation::Cover
        } else {
            self.events.emit(PreviewEvent::CommandFailed {
                adapter_id: adapter.id,
                command,
            });

            // Audio would keep playing under a cover
            Presentation::Replace
        }
    }

    fn overlay_for(&self, presentation: Presentation) -> Overlay {
        let return_to = match self.context {
            ViewContext::Public => format!("/teachings/{}", self.teaching.slug),
            ViewContext::Dashboard => format!("/dashboard/teachings/{}", self.teaching.slug),
        };

        Overlay {
            thumbnail: self.teaching.thumbnail.clone(),
            headline: self.config.blocker_headline.clone(),
            call_to_action: CallToAction {
                sign_up_url: self.config.sign_up_url_for(&return_to),
                sign_in_url: self.config.sign_in_url_for(&return_to),
            },
            presentation,
        }
    }

    fn bind(&mut self, source: &MediaSource) -> AdapterId {
        let adapter = Adapter::bind(self.embed.clone(), &source.embed_url());
        let id = adapter.id;

        self.adapter = Some(adapter);
        self.mounted = Some(id);
        id
    }

    fn adapter_id(&self) -> Option<AdapterId> {
        self.adapter.as_ref().map(|a| a.id)
    }

    /// Unbinds the current adapter, returning its id.
    fn teardown(&mut self) -> Option<AdapterId> {
        let mut adapter = self.adapter.take()?;
        adapter.unbind();

        Some(adapter.id)
    }
}

impl<E> Drop for TeachingDetail<E>
where
    E: EmbedTarget,
{
    fn drop(&mut self) {
        self.teardown();

        if let Some(adapter_id) = self.mounted.take() {
            self.events.emit(PreviewEvent::Unmounted {
                teaching_id: self.teaching.id.clone(),
                adapter_id,
            });
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use crate::{testing::RecordingEmbed, AccessType, EventReceiver, MembershipTier};

    use super::*;

    fn teaching(value: serde_json::Value) -> Teaching {
        serde_json::from_value(value).expect("teaching is valid")
    }

    fn free_video() -> Teaching {
        teaching(json!({
            "id": "1",
            "slug": "opening-the-heart",
            "title": "Opening the Heart",
            "thumbnail": "https://cdn.example/heart.jpg",
            "content_type": "video",
            "youtube_ids": ["dQw4w9WgXcQ"],
            "preview_duration": 300,
            "access_type": "free"
        }))
    }

    fn multi_source() -> Teaching {
        teaching(json!({
            "id": "2",
            "slug": "retreat-day-one",
            "title": "Retreat, Day One",
            "content_type": "video",
            "youtube_ids": ["aaaaaaaaaaa", "bbbbbbbbbbb"],
            "preview_duration": 300
        }))
    }

    fn mount(
        teaching: Teaching,
        session: ViewerSession,
    ) -> (TeachingDetail<RecordingEmbed>, Arc<RecordingEmbed>, EventReceiver) {
        mount_with_embed(teaching, session, RecordingEmbed::default())
    }

    fn mount_with_embed(
        teaching: Teaching,
        session: ViewerSession,
        embed: RecordingEmbed,
    ) -> (TeachingDetail<RecordingEmbed>, Arc<RecordingEmbed>, EventReceiver) {
        let embed = Arc::new(embed);
        let (events, receiver) = Emitter::channel();

        let detail = TeachingDetail::mount(
            teaching,
            DetailOptions {
                session,
                context: ViewContext::Public,
                embed: embed.clone(),
                events,
                config: Config::default(),
            },
        );

        (detail, embed, receiver)
    }

    fn blocked_events(receiver: &EventReceiver) -> usize {
        receiver
            .try_iter()
            .filter(|e| matches!(e, PreviewEvent::Blocked { .. }))
            .count()
    }

    #[test]
    fn test_blocks_exactly_at_budget() {
        let (mut detail, embed, receiver) = mount(free_video(), ViewerSession::anonymous());

        for t in [0., 100., 200., 299.] {
            assert_eq!(detail.on_time_update(t), Verdict::Allow, "blocked early at {}", t);
            assert!(!detail.is_blocked());
        }

        assert_eq!(detail.on_time_update(300.), Verdict::Block);
        assert!(detail.is_blocked());
        assert_eq!(detail.on_time_update(301.), Verdict::Block);

        assert_eq!(blocked_events(&receiver), 1);

        // The player was stopped exactly once
        let posted = embed.posted();
        assert_eq!(posted.len(), 1);
        assert!(posted[0].0.contains("stopVideo"));

        let overlay = detail.overlay().expect("overlay is shown");
        assert_eq!(overlay.presentation, Presentation::Cover);
        assert_eq!(overlay.thumbnail.as_deref(), Some("https://cdn.example/heart.jpg"));
        assert_eq!(
            overlay.call_to_action.sign_up_url,
            "/signup?redirect=%2Fteachings%2Fopening-the-heart"
        );
        assert!(detail.player_visible());
    }

    #[test]
    fn test_blocks_through_messages() {
        let (mut detail, _, _) = mount(free_video(), ViewerSession::anonymous());

        let message = |t: f64| {
            RawMessage::text(
                "https://www.youtube.com",
                json!({ "event": "infoDelivery", "info": { "currentTime": t } }).to_string(),
            )
        };

        assert_eq!(detail.receive(message(299.)), Verdict::Allow);
        assert_eq!(detail.receive(message(300.)), Verdict::Block);
    }

    #[test]
    fn test_authenticated_viewer_is_never_blocked() {
        let session = ViewerSession::authenticated(MembershipTier::Free, "token");
        let (mut detail, embed, receiver) = mount(free_video(), session);

        for t in [0., 100., 200., 299., 300., 301., 10_000.] {
            assert_eq!(detail.on_time_update(t), Verdict::Allow);
        }

        assert!(!detail.is_blocked());
        assert!(embed.posted().is_empty());
        assert_eq!(blocked_events(&receiver), 0);
    }

    #[test]
    fn test_restricted_is_blocked_on_mount() {
        let mut teaching = free_video();
        teaching.access_type = AccessType::Restricted;

        let (detail, _, receiver) = mount(teaching, ViewerSession::anonymous());

        assert!(detail.is_blocked());
        assert_eq!(blocked_events(&receiver), 1);
    }

    #[test]
    fn test_switching_sources_resets_preview() {
        let (mut detail, embed, _) = mount(multi_source(), ViewerSession::anonymous());
        assert!(detail.has_multiple_sources());

        detail.on_time_update(250.);
        assert_eq!(detail.elapsed(), 250.);

        detail.select_source(1).expect("source exists");

        assert_eq!(detail.selected_source(), 1);
        assert_eq!(detail.elapsed(), 0.);
        assert_eq!(
            embed.source().as_deref(),
            Some("https://www.youtube.com/embed/bbbbbbbbbbb?enablejsapi=1")
        );

        // The budget applies fresh to the new source
        assert_eq!(detail.on_time_update(100.), Verdict::Allow);
        assert_eq!(detail.on_time_update(300.), Verdict::Block);
    }

    #[test]
    fn test_switching_clears_block() {
        let (mut detail, _, _) = mount(multi_source(), ViewerSession::anonymous());

        detail.on_time_update(300.);
        assert!(detail.is_blocked());

        detail.select_source(1).unwrap();
        assert!(!detail.is_blocked());
        assert_eq!(detail.elapsed(), 0.);
    }

    #[test]
    fn test_reselecting_blocked_source_keeps_block() {
        let (mut detail, embed, receiver) = mount(free_video(), ViewerSession::anonymous());

        assert_eq!(detail.on_time_update(300.), Verdict::Block);
        receiver.try_iter().for_each(drop);

        detail.select_source(0).expect("source exists");

        assert!(detail.is_blocked());
        assert_eq!(detail.elapsed(), 300.);
        assert_eq!(detail.on_time_update(10.), Verdict::Block);
        assert_eq!(embed.posted().len(), 1);
        assert_eq!(receiver.try_iter().count(), 0);
    }

    #[test]
    fn test_reselecting_replaced_source_keeps_block() {
        let (mut detail, _, _) = mount_with_embed(
            multi_source(),
            ViewerSession::anonymous(),
            RecordingEmbed::rejecting(),
        );

        detail.on_time_update(300.);
        assert!(detail.adapter().is_none());

        detail.select_source(0).expect("source exists");

        assert!(detail.is_blocked());
        assert!(!detail.player_visible());
        assert_eq!(detail.elapsed(), 300.);
    }

    #[test]
    fn test_select_out_of_range() {
        let (mut detail, _, _) = mount(free_video(), ViewerSession::anonymous());

        assert!(matches!(
            detail.select_source(3),
            Err(DetailError::SourceOutOfRange {
                index: 3,
                available: 1
            })
        ));
    }

    #[test]
    fn test_malformed_messages_change_nothing() {
        let (mut detail, _, receiver) = mount(free_video(), ViewerSession::anonymous());
        receiver.try_iter().for_each(drop);

        for data in ["{", "null", "\"text\"", "{\"event\":\"video-progress\"}"] {
            assert_eq!(
                detail.receive(RawMessage::text("https://www.youtube.com", data)),
                Verdict::Allow
            );
        }

        assert_eq!(detail.elapsed(), 0.);
        assert_eq!(detail.preview().clock.samples(), 0);
        assert_eq!(receiver.try_iter().count(), 0);
    }

    #[test]
    fn test_uncontrollable_player_is_replaced() {
        let teaching = teaching(json!({
            "id": "3",
            "slug": "evening-talk",
            "title": "Evening Talk",
            "content_type": "audio",
            "podbean_ids": ["pb-xyz"],
            "preview_duration": 60
        }));

        let (mut detail, embed, _) = mount(teaching, ViewerSession::anonymous());
        assert_eq!(detail.platform(), PlatformKind::Unknown);
        assert_eq!(detail.tabs(), vec![DetailTab::Description, DetailTab::Audio, DetailTab::Comments]);

        assert_eq!(detail.on_time_update(60.), Verdict::Block);

        assert_eq!(
            detail.overlay().map(|o| o.presentation),
            Some(Presentation::Replace)
        );
        assert!(!detail.player_visible());
        assert!(detail.adapter().is_none());
        // The embed's source is never reset
        assert!(embed.source().is_some_and(|s| s.contains("podbean")));
        assert!(embed.posted().is_empty());
    }

    #[test]
    fn test_failed_stop_replaces_player() {
        let (mut detail, _, receiver) = mount_with_embed(
            free_video(),
            ViewerSession::anonymous(),
            RecordingEmbed::rejecting(),
        );

        detail.on_time_update(300.);

        assert!(receiver
            .try_iter()
            .any(|e| matches!(e, PreviewEvent::CommandFailed { command: PlayerCommand::Stop, .. })));
        assert!(!detail.player_visible());
    }

    #[test]
    fn test_configured_default_budget() {
        let teaching = teaching(json!({
            "id": "5",
            "slug": "walking-meditation",
            "title": "Walking Meditation",
            "content_type": "video",
            "youtube_ids": ["ccccccccccc"]
        }));

        let (events, _) = Emitter::channel();
        let mut detail = TeachingDetail::mount(
            teaching,
            DetailOptions {
                session: ViewerSession::anonymous(),
                context: ViewContext::Public,
                embed: Arc::new(RecordingEmbed::default()),
                events,
                config: Config {
                    default_preview_in_seconds: 10.,
                    ..Default::default()
                },
            },
        );

        assert_eq!(detail.preview().clock.budget(), 10.);
        assert_eq!(detail.on_time_update(9.), Verdict::Allow);
        assert_eq!(detail.on_time_update(60.), Verdict::Block);
    }

    #[test]
    fn test_text_teaching_has_no_player() {
        let teaching = teaching(json!({
            "id": "4",
            "slug": "on-silence",
            "title": "On Silence",
            "content_type": "essay",
            "comments_enabled": false
        }));

        let (mut detail, _, _) = mount(teaching, ViewerSession::anonymous());

        assert!(detail.adapter().is_none());
        assert!(!detail.player_visible());
        assert_eq!(detail.tabs(), vec![DetailTab::Description]);
        assert!(matches!(
            detail.select_source(0),
            Err(DetailError::NoPlayableSource)
        ));
    }

    #[test]
    fn test_unmount_releases_adapter() {
        let (detail, _, receiver) = mount(free_video(), ViewerSession::anonymous());
        detail.unmount();

        assert!(receiver
            .try_iter()
            .any(|e| matches!(e, PreviewEvent::Unmounted { .. })));
    }

    #[test]
    fn test_replaced_player_is_unmounted() {
        let (mut detail, _, receiver) = mount_with_embed(
            free_video(),
            ViewerSession::anonymous(),
            RecordingEmbed::rejecting(),
        );

        detail.on_time_update(300.);
        assert!(detail.adapter().is_none());

        let mounted = receiver.try_iter().find_map(|e| match e {
            PreviewEvent::Mounted { adapter_id, .. } => Some(adapter_id),
            _ => None,
        });

        detail.unmount();

        let unmounted: Vec<_> = receiver
            .try_iter()
            .filter_map(|e| match e {
                PreviewEvent::Unmounted { adapter_id, .. } => Some(adapter_id),
                _ => None,
            })
            .collect();

        assert_eq!(unmounted.len(), 1);
        assert_eq!(Some(unmounted[0]), mounted);
    }
}
