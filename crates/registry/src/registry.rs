use rps_core::Config;
use rps_core::MatchId;
use rps_core::PlayerId;
use rps_core::Unique;
use rps_database::Repository;
use rps_domain::Move;
use rps_domain::rating_deltas;
use rps_engine::Match;
use rps_engine::MatchError;
use rps_engine::MatchMode;
use rps_engine::MatchResult;
use rps_engine::MatchState;
use rps_engine::MatchView;
use rps_engine::StatsView;
use rps_engine::Transition;
use rps_engine::match_view;
use rps_engine::stats_view;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_postgres::Client;

type Shared = Arc<Mutex<Match>>;

/// The process-wide live-match index (C5) plus the async deadline scheduler
/// (C6). Every public method here is the thing a Command Surface (C8)
/// operation calls into; the five fields below are this process's only
/// mutable match state.
pub struct Registry {
    db: Arc<Client>,
    config: Config,
    matches: RwLock<HashMap<MatchId, Shared>>,
    /// Reverse index enforcing the `PlayerBusy` invariant: a player appears
    /// here iff they participate in some non-terminal match.
    active_by_player: RwLock<HashMap<PlayerId, MatchId>>,
    /// FIFO of open `Quick` matches awaiting an opponent. A `BTreeSet`
    /// suffices because `MatchId` is UUIDv7 and therefore sorts by creation
    /// order (§ glossary, Epoch) — no separate sequence counter is needed.
    quick_queue: RwLock<BTreeSet<MatchId>>,
    /// Short-TTL read-through cache of just-completed matches, evicted
    /// lazily on lookup rather than by a background sweep.
    completed_cache: RwLock<HashMap<MatchId, (Shared, Instant)>>,
}

impl Registry {
    pub fn new(db: Arc<Client>, config: Config) -> Arc<Self> {
        Arc::new(Self {
            db,
            config,
            matches: RwLock::new(HashMap::new()),
            active_by_player: RwLock::new(HashMap::new()),
            quick_queue: RwLock::new(BTreeSet::new()),
            completed_cache: RwLock::new(HashMap::new()),
        })
    }

    /// `createQuickMatch(playerId, bestOf)`.
    pub async fn create_quick_match(
        self: &Arc<Self>,
        player: PlayerId,
        best_of: u32,
    ) -> MatchResult<MatchView> {
        self.ensure_not_busy(player).await?;
        let m = Match::create(player, MatchMode::Quick, best_of, self.config.match_max_best_of)?;
        let id = m.id();
        let view = match_view(&m, player);
        self.matches.write().await.insert(id, Arc::new(Mutex::new(m)));
        self.active_by_player.write().await.insert(player, id);
        self.quick_queue.write().await.insert(id);
        Ok(view)
    }

    /// `createPrivateMatch(playerId, bestOf)`.
    pub async fn create_private_match(
        self: &Arc<Self>,
        player: PlayerId,
        best_of: u32,
    ) -> MatchResult<MatchView> {
        self.ensure_not_busy(player).await?;
        let m = Match::create(player, MatchMode::Private, best_of, self.config.match_max_best_of)?;
        let id = m.id();
        let view = match_view(&m, player);
        self.matches.write().await.insert(id, Arc::new(Mutex::new(m)));
        self.active_by_player.write().await.insert(player, id);
        Ok(view)
    }

    /// `joinOpenQuickMatch(playerId)`: `findOpenQuickMatch` plus the join
    /// itself. Scans the queue oldest-first for a match this player did not
    /// create themselves.
    pub async fn join_open_quick_match(self: &Arc<Self>, player: PlayerId) -> MatchResult<MatchView> {
        self.ensure_not_busy(player).await?;
        let candidate = {
            let queue = self.quick_queue.read().await;
            let matches = self.matches.read().await;
            let mut found = None;
            for &id in queue.iter() {
                if let Some(shared) = matches.get(&id) {
                    let m = shared.lock().await;
                    if m.player1() != player && m.state() == MatchState::AwaitingOpponent {
                        found = Some(id);
                        break;
                    }
                }
            }
            found
        };
        let match_id = candidate.ok_or(MatchError::NoMatchAvailable)?;
        self.join_match_by_id(player, match_id).await
    }

    /// `joinMatchById(playerId, matchId)`.
    pub async fn join_match_by_id(self: &Arc<Self>, player: PlayerId, match_id: MatchId) -> MatchResult<MatchView> {
        self.ensure_not_busy(player).await?;
        let shared = self.lookup(match_id).await?;
        let (transition, view) = {
            let mut m = shared.lock().await;
            let transition = m.join(player, self.config.move_timeout)?;
            (transition, match_view(&m, player))
        };
        self.active_by_player.write().await.insert(player, match_id);
        self.quick_queue.write().await.remove(&match_id);
        self.handle_transition(match_id, shared, transition).await;
        Ok(view)
    }

    /// `submitMove(playerId, matchId, move)`.
    pub async fn submit_move(
        self: &Arc<Self>,
        player: PlayerId,
        match_id: MatchId,
        mv: Move,
    ) -> MatchResult<MatchView> {
        let shared = self.lookup(match_id).await?;
        let transition = {
            let mut m = shared.lock().await;
            m.submit_move(player, mv, self.config.move_timeout)?
        };
        let view = {
            let m = shared.lock().await;
            match_view(&m, player)
        };
        self.handle_transition(match_id, shared, transition).await;
        Ok(view)
    }

    /// `getMatchView(playerId, matchId)`. Reads through the completed-match
    /// cache so a viewer can still see a match that just finished.
    pub async fn get_match_view(&self, player: PlayerId, match_id: MatchId) -> MatchResult<MatchView> {
        let shared = self.lookup_including_cache(match_id).await?;
        let m = shared.lock().await;
        if !m.is_participant(player) {
            return Err(MatchError::NotParticipant);
        }
        Ok(match_view(&m, player))
    }

    /// `getPlayerStats(playerId)`.
    pub async fn get_player_stats(&self, player: PlayerId) -> MatchResult<StatsView> {
        let p = self
            .db
            .load_player(player)
            .await?
            .ok_or_else(|| MatchError::NotFound("player".into()))?;
        let record = self.db.load_stats(player).await?;
        Ok(stats_view(&record.stats, p.rating()))
    }

    /// `cancelMatch(playerId, matchId)`.
    pub async fn cancel_match(self: &Arc<Self>, player: PlayerId, match_id: MatchId) -> MatchResult<MatchView> {
        let shared = self.lookup(match_id).await?;
        let view = {
            let mut m = shared.lock().await;
            if !m.is_participant(player) {
                return Err(MatchError::NotParticipant);
            }
            m.cancel("cancelled by participant")?;
            match_view(&m, player)
        };
        self.cleanup_indices(match_id, &shared).await;
        Ok(view)
    }

    /// Returns the match a player currently participates in, if any. Lets a
    /// chat-style adapter address "my current match" without the caller
    /// tracking a `matchId` itself.
    pub async fn current_match_for(&self, player: PlayerId) -> Option<MatchId> {
        self.active_by_player.read().await.get(&player).copied()
    }

    async fn ensure_not_busy(&self, player: PlayerId) -> MatchResult<()> {
        if self.active_by_player.read().await.contains_key(&player) {
            return Err(MatchError::PlayerBusy);
        }
        Ok(())
    }

    async fn lookup(&self, match_id: MatchId) -> MatchResult<Shared> {
        self.matches
            .read()
            .await
            .get(&match_id)
            .cloned()
            .ok_or_else(|| MatchError::NotFound("match".into()))
    }

    async fn lookup_including_cache(&self, match_id: MatchId) -> MatchResult<Shared> {
        if let Some(shared) = self.matches.read().await.get(&match_id).cloned() {
            return Ok(shared);
        }
        let mut cache = self.completed_cache.write().await;
        match cache.get(&match_id) {
            Some((shared, expires)) if Instant::now() < *expires => Ok(shared.clone()),
            Some(_) => {
                cache.remove(&match_id);
                Err(MatchError::NotFound("match".into()))
            }
            None => Err(MatchError::NotFound("match".into())),
        }
    }

    /// Reacts to what a state-machine call just reported (§5's "scheduler
    /// delivers `onDeadline`"): arm the next firing, or finalize a terminal
    /// match.
    async fn handle_transition(self: &Arc<Self>, match_id: MatchId, shared: Shared, transition: Transition) {
        match transition {
            Transition::Armed { epoch } | Transition::RoundResolved { epoch } => {
                let deadline = shared.lock().await.deadline();
                if let Some(deadline) = deadline {
                    self.schedule_deadline(match_id, epoch, deadline);
                }
            }
            Transition::Terminal => self.finalize(match_id, shared).await,
            Transition::Ignored => {}
        }
    }

    fn schedule_deadline(self: &Arc<Self>, match_id: MatchId, epoch: u64, deadline: Instant) {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            registry.on_deadline(match_id, epoch).await;
        });
    }

    /// The Timeout Scheduler's (C6) delivery of `onDeadline(matchId, epoch)`.
    /// Never called directly by a Command Surface operation — only by the
    /// task `schedule_deadline` spawns.
    async fn on_deadline(self: &Arc<Self>, match_id: MatchId, epoch: u64) {
        let Some(shared) = self.matches.read().await.get(&match_id).cloned() else {
            return;
        };
        let transition = {
            let mut m = shared.lock().await;
            m.on_deadline(epoch, self.config.move_timeout)
        };
        self.handle_transition(match_id, shared, transition).await;
    }

    /// Rating Updater (C2) + Stats Accumulator (C3) + Repository Contract
    /// (C7), run once a match reaches `Completed` or `TimedOut`. Snapshots
    /// the match under its lock and releases it immediately — no repository
    /// I/O is performed while holding a match's lock (§5).
    async fn finalize(self: &Arc<Self>, match_id: MatchId, shared: Shared) {
        let snapshot = {
            let m = shared.lock().await;
            m.match_outcome().map(|outcome| (outcome, m.clone()))
        };
        let Some((outcome, m)) = snapshot else {
            self.cleanup_indices(match_id, &shared).await;
            return;
        };
        let p1_id = m.player1();
        let p2_id = m.player2().expect("terminal match has a second player");

        let (p1, p2) = match (self.db.load_player(p1_id).await, self.db.load_player(p2_id).await) {
            (Ok(Some(p1)), Ok(Some(p2))) => (p1, p2),
            _ => {
                log::error!("[registry] could not load both players finalizing match {match_id}");
                self.cleanup_indices(match_id, &shared).await;
                return;
            }
        };
        let mut p1 = p1;
        let mut p2 = p2;
        let (d1, d2) = rating_deltas(p1.rating(), p2.rating(), outcome, self.config.rating_k);
        p1.apply_rating_delta(d1, self.config.rating_min);
        p2.apply_rating_delta(d2, self.config.rating_min);

        // Stats accumulation is idempotent by matchId, so a `Conflict` from a
        // racing writer is safe to retry: reload, reaccumulate, resave (§4.7,
        // §7's bounded internal retry).
        const MAX_ATTEMPTS: u32 = 3;
        let mut persisted = false;
        for attempt in 1..=MAX_ATTEMPTS {
            let (s1, s2) = match (self.db.load_stats(p1_id).await, self.db.load_stats(p2_id).await) {
                (Ok(s1), Ok(s2)) => (s1, s2),
                _ => {
                    log::error!("[registry] could not load stats finalizing match {match_id}");
                    break;
                }
            };
            let mut s1 = s1;
            let mut s2 = s2;
            if let Some(o) = m.outcome_for(p1_id, d1) {
                s1.stats.accumulate(&o);
            }
            if let Some(o) = m.outcome_for(p2_id, d2) {
                s2.stats.accumulate(&o);
            }
            match self
                .db
                .save_completed_match(&m, &p1, &p2, &s1.stats, &s2.stats, (s1.version, s2.version))
                .await
            {
                Ok(()) => {
                    persisted = true;
                    break;
                }
                Err(MatchError::Conflict) if attempt < MAX_ATTEMPTS => {
                    log::warn!(
                        "[registry] stats write conflict finalizing match {match_id}, retrying (attempt {attempt})"
                    );
                }
                Err(e) => {
                    log::error!("[registry] failed to persist completed match {match_id}: {e}");
                    break;
                }
            }
        }

        if persisted {
            let expires = Instant::now() + self.config.completed_match_cache_ttl;
            self.completed_cache
                .write()
                .await
                .insert(match_id, (shared.clone(), expires));
        }
        self.cleanup_indices(match_id, &shared).await;
    }

    async fn cleanup_indices(&self, match_id: MatchId, shared: &Shared) {
        self.matches.write().await.remove(&match_id);
        self.quick_queue.write().await.remove(&match_id);
        let m = shared.lock().await;
        let mut active = self.active_by_player.write().await;
        active.remove(&m.player1());
        if let Some(p2) = m.player2() {
            active.remove(&p2);
        }
    }
}
