use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use crate::models::{ContentItem, ItemId, RelatedLoadOutcome, SessionSnapshot, SessionToken};

use super::batch_generator::BatchGenerator;
use super::ranker::Ranker;

/// Ranking rounds attempted before giving up on filling a related batch
const MAX_CANDIDATE_ROUNDS: usize = 4;

/// Tunables for detail sessions
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub related_batch_size: usize,
    /// Fresh candidates generated per ranking round; the best ones are shown
    pub candidate_window: usize,
    /// Soft cap on retained related items, trimmed from the front
    pub related_cap: usize,
    pub latency: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            related_batch_size: 6,
            candidate_window: 18,
            related_cap: 120,
            latency: Duration::from_millis(600),
        }
    }
}

/// Proof that a related-items load was started for a given session identity
#[derive(Debug, PartialEq, Eq)]
pub struct RelatedLoadTicket {
    token: SessionToken,
}

impl RelatedLoadTicket {
    pub fn token(&self) -> SessionToken {
        self.token
    }
}

/// Outcome of trying to claim the session's in-flight slot
#[derive(Debug, PartialEq, Eq)]
pub enum RelatedLoadStart {
    Started(RelatedLoadTicket),
    AlreadyLoading,
    NoSession,
}

#[derive(Debug)]
struct ExplorationSession {
    token: SessionToken,
    focus: ContentItem,
    history: Vec<ContentItem>,
    related: VecDeque<ContentItem>,
    seen_ids: HashSet<ItemId>,
    loading: bool,
}

impl ExplorationSession {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            token: self.token,
            focus: self.focus.clone(),
            history_depth: self.history.len(),
            depth: self.history.len() + 1,
            related: self.related.iter().cloned().collect(),
            loading: self.loading,
        }
    }
}

/// Owns one drill-down exploration: focus, navigation stack and related list
///
/// Every transition (`open`, `select`, `back`, `close`) issues a new session
/// token. A related load carries the token it started under and its result is
/// dropped if the token no longer matches.
#[derive(Debug)]
pub struct DetailNavigator {
    session: Option<ExplorationSession>,
    generator: BatchGenerator,
    ranker: Ranker,
    settings: SessionSettings,
    next_token: u64,
}

impl DetailNavigator {
    pub fn new(generator: BatchGenerator, ranker: Ranker, settings: SessionSettings) -> Self {
        Self {
            session: None,
            generator,
            ranker,
            settings,
            next_token: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn focus(&self) -> Option<&ContentItem> {
        self.session.as_ref().map(|s| &s.focus)
    }

    pub fn history_depth(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.history.len())
    }

    pub fn related(&self) -> Vec<ContentItem> {
        self.session
            .as_ref()
            .map(|s| s.related.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.loading)
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session.as_ref().map(ExplorationSession::snapshot)
    }

    /// Looks up an item reachable from the session: related, history, focus
    pub fn find(&self, id: &ItemId) -> Option<&ContentItem> {
        let session = self.session.as_ref()?;
        session
            .related
            .iter()
            .chain(session.history.iter())
            .chain(std::iter::once(&session.focus))
            .find(|item| item.id() == id)
    }

    /// Starts a fresh session on `item`, replacing any open one
    pub fn open(&mut self, item: ContentItem) -> SessionSnapshot {
        let token = self.issue_token();
        let mut session = ExplorationSession {
            token,
            focus: item,
            history: Vec::new(),
            related: VecDeque::new(),
            seen_ids: HashSet::new(),
            loading: false,
        };
        self.reseed(&mut session);

        tracing::info!(
            token = %token,
            focus = %session.focus.id(),
            related = session.related.len(),
            "Opened detail session"
        );

        let snapshot = session.snapshot();
        self.session = Some(session);
        snapshot
    }

    /// Drills into `item`, pushing the current focus onto the history
    ///
    /// Returns `None` when no session is open.
    pub fn select(&mut self, item: ContentItem) -> Option<SessionSnapshot> {
        let token = self.issue_token();
        let mut session = self.session.take()?;

        let previous = std::mem::replace(&mut session.focus, item);
        session.history.push(previous);
        session.token = token;
        self.reseed(&mut session);

        tracing::info!(
            token = %token,
            focus = %session.focus.id(),
            history_depth = session.history.len(),
            "Selected related item"
        );

        let snapshot = session.snapshot();
        self.session = Some(session);
        Some(snapshot)
    }

    /// Pops the navigation stack, or closes the session when it is empty
    ///
    /// Returns the new snapshot, or `None` if the session is now closed.
    pub fn back(&mut self) -> Option<SessionSnapshot> {
        let previous = match self.session.as_mut() {
            None => return None,
            Some(session) => session.history.pop(),
        };

        let Some(previous) = previous else {
            self.close();
            return None;
        };

        let token = self.issue_token();
        let mut session = self.session.take()?;
        session.focus = previous;
        session.token = token;
        self.reseed(&mut session);

        tracing::info!(
            token = %token,
            focus = %session.focus.id(),
            history_depth = session.history.len(),
            "Navigated back"
        );

        let snapshot = session.snapshot();
        self.session = Some(session);
        Some(snapshot)
    }

    /// Discards the session entirely. Returns whether one was open.
    pub fn close(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                self.issue_token();
                tracing::info!(
                    token = %session.token,
                    history_depth = session.history.len(),
                    "Closed detail session"
                );
                true
            }
            None => false,
        }
    }

    /// Claims the session's in-flight slot for a related-items load
    pub fn begin_related_load(&mut self) -> RelatedLoadStart {
        match self.session.as_mut() {
            None => RelatedLoadStart::NoSession,
            Some(session) if session.loading => RelatedLoadStart::AlreadyLoading,
            Some(session) => {
                session.loading = true;
                RelatedLoadStart::Started(RelatedLoadTicket {
                    token: session.token,
                })
            }
        }
    }

    /// Ranks and appends the next related batch if the session is unchanged
    pub fn complete_related_load(&mut self, ticket: RelatedLoadTicket) -> RelatedLoadOutcome {
        let Self {
            session,
            generator,
            ranker,
            settings,
            ..
        } = self;

        let session = match session.as_mut() {
            Some(session) if session.token == ticket.token => session,
            _ => {
                tracing::debug!(token = %ticket.token, "Discarding stale related batch");
                return RelatedLoadOutcome::Discarded;
            }
        };

        let batch = next_related(generator, ranker, settings, session);
        let appended = batch.len();
        session.related.extend(batch);

        let trimmed = trim_front(&mut session.related, settings.related_cap);
        session.loading = false;

        tracing::debug!(
            token = %session.token,
            appended,
            trimmed,
            total = session.related.len(),
            "Appended related batch"
        );

        RelatedLoadOutcome::Loaded {
            appended,
            total: session.related.len(),
        }
    }

    fn issue_token(&mut self) -> SessionToken {
        self.next_token += 1;
        SessionToken(self.next_token)
    }

    /// Resets per-focus state and ranks the first related batch
    fn reseed(&mut self, session: &mut ExplorationSession) {
        session.related.clear();
        session.seen_ids.clear();
        session.loading = false;

        let batch = next_related(&mut self.generator, &self.ranker, &self.settings, session);
        session.related.extend(batch);
        trim_front(&mut session.related, self.settings.related_cap);
    }
}

/// Generates candidate windows and keeps the best unseen ones
///
/// Every returned id is recorded in `seen_ids` so it cannot resurface for the
/// same focus.
fn next_related(
    generator: &mut BatchGenerator,
    ranker: &Ranker,
    settings: &SessionSettings,
    session: &mut ExplorationSession,
) -> Vec<ContentItem> {
    let wanted = settings.related_batch_size;
    let window = settings.candidate_window.max(wanted);
    let mut batch = Vec::with_capacity(wanted);

    for _ in 0..MAX_CANDIDATE_ROUNDS {
        if batch.len() >= wanted {
            break;
        }

        let candidates = generator.next_batch(window, &session.seen_ids);
        let ranked = ranker.rank(&session.focus, &session.history, candidates, &session.seen_ids);
        if ranked.is_empty() {
            tracing::debug!(focus = %session.focus.id(), "Empty ranking, requesting fresh candidates");
            continue;
        }

        for item in ranked.into_iter().take(wanted - batch.len()) {
            session.seen_ids.insert(item.id().clone());
            batch.push(item);
        }
    }

    batch
}

fn trim_front(items: &mut VecDeque<ContentItem>, cap: usize) -> usize {
    let excess = items.len().saturating_sub(cap);
    items.drain(..excess);
    excess
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentAttributes, MediaRef};
    use crate::services::catalog::ContentCatalog;
    use std::sync::Arc;

    fn navigator(settings: SessionSettings) -> DetailNavigator {
        let generator = BatchGenerator::new(Arc::new(ContentCatalog::builtin()), "related");
        DetailNavigator::new(generator, Ranker::default(), settings)
    }

    fn item(id: &str, categories: &[&str]) -> ContentItem {
        ContentItem::new(
            ItemId::new(id),
            MediaRef::new(id),
            ContentAttributes::from_parts(categories, &[], &[], &[]),
        )
    }

    fn load_related(nav: &mut DetailNavigator) -> RelatedLoadOutcome {
        match nav.begin_related_load() {
            RelatedLoadStart::Started(ticket) => nav.complete_related_load(ticket),
            other => panic!("unexpected start: {:?}", other),
        }
    }

    #[test]
    fn test_open_seeds_related() {
        let mut nav = navigator(SessionSettings::default());
        let snapshot = nav.open(item("X", &["abstract"]));

        assert_eq!(snapshot.focus.id().as_str(), "X");
        assert_eq!(snapshot.history_depth, 0);
        assert_eq!(snapshot.depth, 1);
        assert_eq!(snapshot.related.len(), 6);
    }

    #[test]
    fn test_related_prefers_matching_assets() {
        let mut nav = navigator(SessionSettings::default());
        let snapshot = nav.open(item("X", &["abstract"]));
        assert!(snapshot.related[0].has_attribute("abstract"));
    }

    #[test]
    fn test_select_then_back_restores_focus() {
        let mut nav = navigator(SessionSettings::default());
        nav.open(item("X", &["abstract"]));
        nav.select(item("Y", &["design"]));
        assert_eq!(nav.history_depth(), 1);

        let snapshot = nav.back().unwrap();
        assert_eq!(snapshot.focus.id().as_str(), "X");
        assert_eq!(nav.focus().unwrap().id().as_str(), "X");
        assert_eq!(nav.history_depth(), 0);
    }

    #[test]
    fn test_history_is_lifo() {
        let mut nav = navigator(SessionSettings::default());
        nav.open(item("root", &[]));
        nav.select(item("a", &[]));
        nav.select(item("b", &[]));
        nav.back();
        assert_eq!(nav.focus().unwrap().id().as_str(), "a");
        nav.back();
        assert_eq!(nav.focus().unwrap().id().as_str(), "root");
    }

    #[test]
    fn test_deep_drill_walks_back_to_root() {
        let mut nav = navigator(SessionSettings::default());
        nav.open(item("root", &[]));
        for depth in 0..100 {
            nav.select(item(&format!("n{depth}"), &[]));
        }
        assert_eq!(nav.history_depth(), 100);

        let mut steps = 0;
        let mut last_focus = None;
        while let Some(snapshot) = nav.back() {
            steps += 1;
            last_focus = Some(snapshot.focus.id().clone());
        }

        assert_eq!(steps, 100);
        assert_eq!(last_focus, Some(ItemId::new("root")));
        assert!(!nav.is_open());
    }

    #[test]
    fn test_back_with_empty_history_closes() {
        let mut nav = navigator(SessionSettings::default());
        nav.open(item("X", &[]));
        assert!(nav.back().is_none());
        assert!(!nav.is_open());
        assert!(nav.focus().is_none());
        assert!(nav.related().is_empty());
    }

    #[test]
    fn test_select_without_session() {
        let mut nav = navigator(SessionSettings::default());
        assert!(nav.select(item("Y", &[])).is_none());
        assert!(nav.back().is_none());
        assert!(!nav.close());
    }

    #[test]
    fn test_load_more_related_never_repeats_or_includes_focus() {
        let mut nav = navigator(SessionSettings::default());
        nav.open(item("X", &["abstract"]));
        for _ in 0..10 {
            load_related(&mut nav);
        }

        let related = nav.related();
        assert_eq!(related.len(), 66);
        let ids: HashSet<&ItemId> = related.iter().map(|i| i.id()).collect();
        assert_eq!(ids.len(), related.len());
        assert!(!ids.contains(&ItemId::new("X")));
    }

    #[test]
    fn test_double_trigger_is_guarded() {
        let mut nav = navigator(SessionSettings::default());
        nav.open(item("X", &[]));

        let ticket = match nav.begin_related_load() {
            RelatedLoadStart::Started(ticket) => ticket,
            other => panic!("unexpected start: {:?}", other),
        };
        assert!(nav.is_loading());
        assert_eq!(nav.begin_related_load(), RelatedLoadStart::AlreadyLoading);
        assert_eq!(nav.related().len(), 6);

        nav.complete_related_load(ticket);
        assert!(!nav.is_loading());
        assert_eq!(nav.related().len(), 12);
    }

    #[test]
    fn test_no_session_load() {
        let mut nav = navigator(SessionSettings::default());
        assert_eq!(nav.begin_related_load(), RelatedLoadStart::NoSession);
    }

    #[test]
    fn test_stale_load_after_close_is_discarded() {
        let mut nav = navigator(SessionSettings::default());
        nav.open(item("X", &[]));
        let RelatedLoadStart::Started(ticket) = nav.begin_related_load() else {
            panic!("expected load to start");
        };

        nav.close();
        assert_eq!(nav.complete_related_load(ticket), RelatedLoadOutcome::Discarded);
        assert!(!nav.is_open());
    }

    #[test]
    fn test_stale_load_after_select_is_discarded() {
        let mut nav = navigator(SessionSettings::default());
        nav.open(item("X", &[]));
        let RelatedLoadStart::Started(ticket) = nav.begin_related_load() else {
            panic!("expected load to start");
        };

        nav.select(item("Y", &[]));
        // new focus has its own slot
        assert!(!nav.is_loading());
        assert_eq!(nav.complete_related_load(ticket), RelatedLoadOutcome::Discarded);
        assert_eq!(nav.related().len(), 6);
    }

    #[test]
    fn test_stale_load_after_back_is_discarded() {
        let mut nav = navigator(SessionSettings::default());
        nav.open(item("X", &[]));
        nav.select(item("Y", &[]));
        let RelatedLoadStart::Started(ticket) = nav.begin_related_load() else {
            panic!("expected load to start");
        };

        let snapshot = nav.back().unwrap();
        assert_eq!(snapshot.focus.id().as_str(), "X");
        assert_eq!(nav.complete_related_load(ticket), RelatedLoadOutcome::Discarded);
        assert_eq!(nav.related().len(), 6);
        assert!(!nav.is_loading());
    }

    #[test]
    fn test_stale_load_after_reopen_is_discarded() {
        let mut nav = navigator(SessionSettings::default());
        nav.open(item("X", &[]));
        let RelatedLoadStart::Started(ticket) = nav.begin_related_load() else {
            panic!("expected load to start");
        };

        nav.close();
        nav.open(item("X", &[]));
        assert_eq!(nav.complete_related_load(ticket), RelatedLoadOutcome::Discarded);
    }

    #[test]
    fn test_related_is_trimmed_to_cap() {
        let mut nav = navigator(SessionSettings {
            related_cap: 10,
            ..SessionSettings::default()
        });
        nav.open(item("X", &[]));
        let first_seeded = nav.related()[0].id().clone();

        for _ in 0..5 {
            load_related(&mut nav);
        }

        let related = nav.related();
        assert_eq!(related.len(), 10);
        assert!(related.iter().all(|i| i.id() != &first_seeded));
    }

    #[test]
    fn test_select_resets_related() {
        let mut nav = navigator(SessionSettings::default());
        nav.open(item("X", &[]));
        load_related(&mut nav);
        assert_eq!(nav.related().len(), 12);

        let snapshot = nav.select(item("Y", &[])).unwrap();
        assert_eq!(snapshot.related.len(), 6);
        assert_eq!(snapshot.depth, 2);
    }

    #[test]
    fn test_tokens_change_on_every_transition() {
        let mut nav = navigator(SessionSettings::default());
        let t1 = nav.open(item("X", &[])).token;
        let t2 = nav.select(item("Y", &[])).unwrap().token;
        let t3 = nav.back().unwrap().token;
        assert!(t1 < t2 && t2 < t3);
    }

    #[test]
    fn test_find_searches_session_items() {
        let mut nav = navigator(SessionSettings::default());
        nav.open(item("X", &[]));
        let related_id = nav.related()[2].id().clone();
        assert!(nav.find(&related_id).is_some());
        assert!(nav.find(&ItemId::new("X")).is_some());
        assert!(nav.find(&ItemId::new("missing")).is_none());
    }
}
