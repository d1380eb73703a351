//! Queue assembly from familiar and discovery candidate pools.
//!
//! Assembly is pure and deterministic for a given input order:
//!
//! 1. drop unplayable (zero-length) tracks and deduplicate each pool by id
//! 2. drop discovery tracks already present in the familiar pool
//! 3. cap familiar at two tracks per artist, discovery at one
//! 4. seed with a discovery track when one is available
//! 5. interleave one familiar then up to two discovery tracks until the
//!    target duration is reached or both pools run dry
//!
//! An empty result is a valid outcome, not an error.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use moodcast_core::types::{AssembledQueue, QueuedTrack, Track, TrackOrigin};

const FAMILIAR_PER_ARTIST: usize = 2;
const DISCOVERY_PER_ARTIST: usize = 1;
const DISCOVERY_PER_ROUND: usize = 2;

/// Optional reordering of the pools before filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PoolShuffle {
    /// Keep the order the sourcer returned.
    #[default]
    None,
    /// Shuffle both pools with a deterministic RNG.
    Seeded(u64),
}

impl PoolShuffle {
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or(PoolShuffle::None, PoolShuffle::Seeded)
    }

    pub fn apply(&self, familiar: &mut [Track], discovery: &mut [Track]) {
        if let PoolShuffle::Seeded(seed) = *self {
            let mut rng = StdRng::seed_from_u64(seed);
            familiar.shuffle(&mut rng);
            discovery.shuffle(&mut rng);
        }
    }
}

/// Candidate pools after dedup and diversity filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePools {
    pub familiar: Vec<Track>,
    pub discovery: Vec<Track>,
}

impl CandidatePools {
    pub fn len(&self) -> usize {
        self.familiar.len() + self.discovery.len()
    }

    pub fn is_empty(&self) -> bool {
        self.familiar.is_empty() && self.discovery.is_empty()
    }
}

fn dedup_playable(pool: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::new();
    pool.into_iter()
        .filter(|t| t.duration_ms > 0)
        .filter(|t| seen.insert(t.id.clone()))
        .collect()
}

fn cap_per_artist(pool: Vec<Track>, limit: usize) -> Vec<Track> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    pool.into_iter()
        .filter(|t| {
            let count = counts.entry(t.artist_key.clone()).or_insert(0);
            *count += 1;
            *count <= limit
        })
        .collect()
}

/// Dedup, cross-pool dedup and per-artist caps. Pool order is preserved.
pub fn filter_candidates(familiar: Vec<Track>, discovery: Vec<Track>) -> CandidatePools {
    let familiar = dedup_playable(familiar);
    let familiar_ids: HashSet<&str> = familiar.iter().map(|t| t.id.as_str()).collect();
    let discovery: Vec<Track> = dedup_playable(discovery)
        .into_iter()
        .filter(|t| !familiar_ids.contains(t.id.as_str()))
        .collect();

    CandidatePools {
        familiar: cap_per_artist(familiar, FAMILIAR_PER_ARTIST),
        discovery: cap_per_artist(discovery, DISCOVERY_PER_ARTIST),
    }
}

struct QueueBuilder {
    queue: AssembledQueue,
    total_ms: u64,
    target_ms: u64,
}

impl QueueBuilder {
    fn push(&mut self, track: Track, origin: TrackOrigin) {
        self.total_ms += track.duration_ms;
        match origin {
            TrackOrigin::Familiar => self.queue.familiar_count += 1,
            TrackOrigin::Discovery => self.queue.discovery_count += 1,
        }
        self.queue.tracks.push(QueuedTrack { track, origin });
    }

    fn full(&self) -> bool {
        self.total_ms >= self.target_ms
    }
}

/// Seed and interleave already-filtered pools up to `target_ms`.
///
/// The seed track is always placed, so the result is empty only when both
/// pools are.
pub fn assemble_pools(pools: CandidatePools, target_ms: u64) -> AssembledQueue {
    let mut familiar = pools.familiar.into_iter();
    let mut discovery = pools.discovery.into_iter();
    let mut builder = QueueBuilder {
        queue: AssembledQueue::default(),
        total_ms: 0,
        target_ms,
    };

    if let Some(track) = discovery.next() {
        builder.push(track, TrackOrigin::Discovery);
    } else if let Some(track) = familiar.next() {
        builder.push(track, TrackOrigin::Familiar);
    }

    'rounds: while !builder.full() {
        let mut progressed = false;

        if let Some(track) = familiar.next() {
            builder.push(track, TrackOrigin::Familiar);
            progressed = true;
            if builder.full() {
                break;
            }
        }

        for _ in 0..DISCOVERY_PER_ROUND {
            let Some(track) = discovery.next() else { break };
            builder.push(track, TrackOrigin::Discovery);
            progressed = true;
            if builder.full() {
                break 'rounds;
            }
        }

        if !progressed {
            break;
        }
    }

    debug!(
        tracks = builder.queue.tracks.len(),
        familiar = builder.queue.familiar_count,
        discovery = builder.queue.discovery_count,
        total_ms = builder.total_ms,
        target_ms,
        "Queue assembled"
    );
    builder.queue
}

/// Filter both pools and assemble a queue of at least `target_ms` where the
/// candidates allow it.
pub fn assemble_queue(familiar: Vec<Track>, discovery: Vec<Track>, target_ms: u64) -> AssembledQueue {
    assemble_pools(filter_candidates(familiar, discovery), target_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 60_000;

    fn track(id: &str, artist: &str, minutes: u64) -> Track {
        Track::new(id, artist, minutes * MIN)
    }

    fn ids(queue: &AssembledQueue) -> Vec<&str> {
        queue.tracks.iter().map(|t| t.track.id.as_str()).collect()
    }

    fn origins(queue: &AssembledQueue) -> Vec<TrackOrigin> {
        queue.tracks.iter().map(|t| t.origin).collect()
    }

    // ---- filtering tests ----

    #[test]
    fn test_dedup_within_pool_keeps_first() {
        let pools = filter_candidates(
            vec![track("a", "x", 3), track("a", "y", 5), track("b", "z", 3)],
            vec![],
        );
        assert_eq!(pools.familiar, vec![track("a", "x", 3), track("b", "z", 3)]);
    }

    #[test]
    fn test_cross_pool_collision_goes_to_familiar() {
        let pools = filter_candidates(
            vec![track("shared", "x", 3)],
            vec![track("shared", "x", 3), track("new", "y", 3)],
        );
        assert_eq!(pools.familiar.len(), 1);
        assert_eq!(pools.discovery, vec![track("new", "y", 3)]);
    }

    #[test]
    fn test_artist_caps() {
        let pools = filter_candidates(
            vec![
                track("f1", "a", 3),
                track("f2", "a", 3),
                track("f3", "a", 3),
                track("f4", "b", 3),
            ],
            vec![track("d1", "c", 3), track("d2", "c", 3), track("d3", "d", 3)],
        );
        let familiar: Vec<&str> = pools.familiar.iter().map(|t| t.id.as_str()).collect();
        let discovery: Vec<&str> = pools.discovery.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(familiar, ["f1", "f2", "f4"]);
        assert_eq!(discovery, ["d1", "d3"]);
        assert_eq!(pools.len(), 5);
    }

    #[test]
    fn test_zero_duration_tracks_dropped() {
        let pools = filter_candidates(
            vec![Track::new("silent", "a", 0), track("ok", "a", 3)],
            vec![Track::new("blank", "b", 0)],
        );
        assert_eq!(pools.familiar, vec![track("ok", "a", 3)]);
        assert!(pools.discovery.is_empty());
    }

    // ---- assembly tests ----

    #[test]
    fn test_small_pools_discovery_first() {
        let queue = assemble_queue(vec![track("f", "a", 3)], vec![track("d", "b", 4)], 5 * MIN);
        assert_eq!(ids(&queue), ["d", "f"]);
        assert_eq!(queue.total_duration_ms(), 7 * MIN);
        assert_eq!(queue.familiar_count, 1);
        assert_eq!(queue.discovery_count, 1);
    }

    #[test]
    fn test_interleave_pattern() {
        let familiar = (0..4).map(|i| track(&format!("f{i}"), &format!("fa{i}"), 3)).collect();
        let discovery = (0..6).map(|i| track(&format!("d{i}"), &format!("da{i}"), 3)).collect();
        let queue = assemble_queue(familiar, discovery, 60 * MIN);
        use TrackOrigin::{Discovery as D, Familiar as F};
        assert_eq!(origins(&queue), [D, F, D, D, F, D, D, F, D, F]);
        assert_eq!(queue.tracks.len(), 10);
    }

    #[test]
    fn test_stops_at_first_track_reaching_target() {
        let familiar = (0..10).map(|i| track(&format!("f{i}"), &format!("fa{i}"), 4)).collect();
        let discovery = (0..10).map(|i| track(&format!("d{i}"), &format!("da{i}"), 4)).collect();
        let target = 30 * MIN;
        let queue = assemble_queue(familiar, discovery, target);

        let total = queue.total_duration_ms();
        assert!(total >= target);
        let last = queue.tracks.last().unwrap().track.duration_ms;
        assert!(total - last < target, "queue grew past the target");
    }

    #[test]
    fn test_no_discovery_seeds_from_familiar() {
        let queue = assemble_queue(vec![track("f1", "a", 3), track("f2", "b", 3)], vec![], 60 * MIN);
        assert_eq!(ids(&queue), ["f1", "f2"]);
        assert_eq!(queue.discovery_count, 0);
    }

    #[test]
    fn test_only_discovery() {
        let queue = assemble_queue(vec![], vec![track("d1", "a", 3), track("d2", "b", 3)], 60 * MIN);
        assert_eq!(ids(&queue), ["d1", "d2"]);
    }

    #[test]
    fn test_empty_pools_give_empty_queue() {
        let queue = assemble_queue(vec![], vec![], 30 * MIN);
        assert!(queue.is_empty());
        assert_eq!(queue.familiar_count + queue.discovery_count, 0);
    }

    #[test]
    fn test_zero_target_still_places_seed() {
        let queue = assemble_queue(vec![track("f", "a", 3)], vec![track("d", "b", 3)], 0);
        assert_eq!(ids(&queue), ["d"]);
        assert_eq!(queue.discovery_count, 1);

        let familiar_only = assemble_queue(vec![track("f", "a", 3)], vec![], 0);
        assert_eq!(ids(&familiar_only), ["f"]);
    }

    #[test]
    fn test_short_pools_return_short_queue() {
        let queue = assemble_queue(vec![track("f", "a", 3)], vec![], 60 * MIN);
        assert_eq!(queue.total_duration_ms(), 3 * MIN);
    }

    #[test]
    fn test_assembled_queue_invariants_on_messy_input() {
        let familiar = vec![
            track("t1", "a", 3),
            track("t2", "a", 4),
            track("t3", "a", 2),
            track("t1", "a", 3),
            track("t4", "b", 5),
        ];
        let discovery = vec![
            track("t4", "b", 5),
            track("t5", "c", 3),
            track("t6", "c", 3),
            track("t7", "a", 3),
        ];
        let queue = assemble_queue(familiar, discovery, 120 * MIN);

        let unique: HashSet<&str> = ids(&queue).into_iter().collect();
        assert_eq!(unique.len(), queue.tracks.len());

        let t4 = queue.tracks.iter().find(|t| t.track.id == "t4").unwrap();
        assert_eq!(t4.origin, TrackOrigin::Familiar);

        let mut per_origin: HashMap<(TrackOrigin, &str), usize> = HashMap::new();
        for t in &queue.tracks {
            *per_origin.entry((t.origin, t.track.artist_key.as_str())).or_default() += 1;
        }
        for ((origin, _), count) in per_origin {
            match origin {
                TrackOrigin::Familiar => assert!(count <= 2),
                TrackOrigin::Discovery => assert!(count <= 1),
            }
        }
    }

    // ---- shuffle tests ----

    #[test]
    fn test_seeded_shuffle_is_deterministic() {
        let base: Vec<Track> = (0..20).map(|i| track(&format!("t{i}"), "a", 3)).collect();

        let (mut f1, mut d1) = (base.clone(), base.clone());
        let (mut f2, mut d2) = (base.clone(), base.clone());
        PoolShuffle::Seeded(7).apply(&mut f1, &mut d1);
        PoolShuffle::Seeded(7).apply(&mut f2, &mut d2);
        assert_eq!(f1, f2);
        assert_eq!(d1, d2);
        assert_ne!(f1, base);
    }

    #[test]
    fn test_no_shuffle_keeps_order() {
        let base: Vec<Track> = (0..5).map(|i| track(&format!("t{i}"), "a", 3)).collect();
        let (mut f, mut d) = (base.clone(), base.clone());
        PoolShuffle::from_seed(None).apply(&mut f, &mut d);
        assert_eq!(f, base);
        assert_eq!(d, base);
    }
}
