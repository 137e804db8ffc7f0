//! The tiled structure-of-arrays holding every agent.
//!
//! The domain is cut into tiles ([`crate::geom::Domain`]); each tile owns the
//! agents whose current position falls inside its box and stores them as
//! parallel per-attribute vectors. Kernels operate on one tile at a time and
//! read/write the vectors directly; tiles are processed in parallel with
//! exclusive mutable access ([`AgentStore::par_tiles_mut`]).
//!
//! Agents are created once and never destroyed. Movement phases rewrite the
//! position columns and then call [`AgentStore::redistribute`], which migrates
//! rows whose position left their tile's box. With `fast_bin = false` every
//! tile re-sorts its rows by stable agent id after migration, so the storage
//! order (and therefore the order of floating-point updates) is identical
//! from run to run; with `fast_bin = true` arrival order is kept.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::agents::defs::{AgeGroup, GroupAttr, Status, SymptomStatus, NUM_GROUP_ATTRS};
use crate::error::EpigridError;
use crate::geom::{Domain, TileBox};

/// Immutable attributes of one agent, as provided by a population loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentAttributes {
    pub age_group: AgeGroup,
    pub family: i32,
    pub nborhood: i32,
    pub home: (i32, i32),
    /// `None` for non-workers.
    #[serde(default)]
    pub work: Option<(i32, i32)>,
    #[serde(default)]
    pub workgroup: i32,
    #[serde(default)]
    pub naics: i32,
    #[serde(default)]
    pub work_nborhood: i32,
    /// 0 = not in school, 1..=4 school buildings, 5 = daycare, 6 = playgroup.
    #[serde(default)]
    pub school_id: i32,
    #[serde(default)]
    pub school_grade: i32,
}

/// Per-disease state columns of one tile.
#[derive(Debug, Default, Clone)]
pub struct DiseaseCols {
    pub status: Vec<Status>,
    pub symptomatic: Vec<SymptomStatus>,
    /// Days since infection started, or days of immunity remaining.
    /// Integer-valued; stepped by exactly 1 so boundary checks can use `==`.
    pub counter: Vec<f64>,
    /// Hospital treatment countdown. Integer-valued, see `counter`.
    pub treatment_timer: Vec<f64>,
    /// Running product of per-interaction survival probabilities.
    pub prob: Vec<f64>,
    pub latent_period: Vec<f64>,
    pub infectious_period: Vec<f64>,
    pub incubation_period: Vec<f64>,
}

/// Per-disease state of one agent, used when rows migrate between tiles.
#[derive(Debug, Clone, Copy)]
pub struct DiseaseRowState {
    pub status: Status,
    pub symptomatic: SymptomStatus,
    pub counter: f64,
    pub treatment_timer: f64,
    pub prob: f64,
    pub latent_period: f64,
    pub infectious_period: f64,
    pub incubation_period: f64,
}

/// One full agent row, used for migration and insertion only; kernels never
/// see agents in this array-of-structs form.
#[derive(Debug, Clone)]
pub struct AgentRow {
    pub id: u64,
    pub age_group: AgeGroup,
    pub family: i32,
    pub nborhood: i32,
    pub home_i: i32,
    pub home_j: i32,
    pub work_i: i32,
    pub work_j: i32,
    pub hosp_i: i32,
    pub hosp_j: i32,
    pub trav_i: i32,
    pub trav_j: i32,
    pub school_id: i32,
    pub school_grade: i32,
    pub school_closed: bool,
    pub naics: i32,
    pub workgroup: i32,
    pub work_nborhood: i32,
    pub withdrawn: bool,
    pub random_travel: i64,
    pub air_travel: i64,
    pub pos_i: i32,
    pub pos_j: i32,
    pub diseases: Vec<DiseaseRowState>,
}

/// One tile's worth of agents, stored column-wise.
#[derive(Debug, Clone)]
pub struct Tile {
    pub bx: TileBox,
    pub id: Vec<u64>,
    pub age_group: Vec<AgeGroup>,
    pub family: Vec<i32>,
    pub nborhood: Vec<i32>,
    pub home_i: Vec<i32>,
    pub home_j: Vec<i32>,
    pub work_i: Vec<i32>,
    pub work_j: Vec<i32>,
    /// `-1` when not hospitalized.
    pub hosp_i: Vec<i32>,
    pub hosp_j: Vec<i32>,
    /// Air-travel destination; `-1` when none assigned.
    pub trav_i: Vec<i32>,
    pub trav_j: Vec<i32>,
    pub school_id: Vec<i32>,
    pub school_grade: Vec<i32>,
    pub school_closed: Vec<bool>,
    pub naics: Vec<i32>,
    pub workgroup: Vec<i32>,
    pub work_nborhood: Vec<i32>,
    pub withdrawn: Vec<bool>,
    /// `-1` when home; otherwise the agent's own id as a sentinel.
    pub random_travel: Vec<i64>,
    pub air_travel: Vec<i64>,
    pub pos_i: Vec<i32>,
    pub pos_j: Vec<i32>,
    pub diseases: Vec<DiseaseCols>,
}

impl Tile {
    fn new(bx: TileBox, n_diseases: usize) -> Self {
        Tile {
            bx,
            id: Vec::new(),
            age_group: Vec::new(),
            family: Vec::new(),
            nborhood: Vec::new(),
            home_i: Vec::new(),
            home_j: Vec::new(),
            work_i: Vec::new(),
            work_j: Vec::new(),
            hosp_i: Vec::new(),
            hosp_j: Vec::new(),
            trav_i: Vec::new(),
            trav_j: Vec::new(),
            school_id: Vec::new(),
            school_grade: Vec::new(),
            school_closed: Vec::new(),
            naics: Vec::new(),
            workgroup: Vec::new(),
            work_nborhood: Vec::new(),
            withdrawn: Vec::new(),
            random_travel: Vec::new(),
            air_travel: Vec::new(),
            pos_i: Vec::new(),
            pos_j: Vec::new(),
            diseases: vec![DiseaseCols::default(); n_diseases],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    #[must_use]
    pub fn in_hospital(&self, idx: usize) -> bool {
        self.hosp_i[idx] >= 0 && self.hosp_j[idx] >= 0
    }

    #[must_use]
    pub fn is_adult(&self, idx: usize) -> bool {
        !self.age_group[idx].is_child()
    }

    /// Infected and past the latent period.
    #[must_use]
    pub fn is_infectious(&self, d: usize, idx: usize) -> bool {
        let cols = &self.diseases[d];
        cols.status[idx] == Status::Infected && cols.counter[idx] >= cols.latent_period[idx]
    }

    /// Infected but still within the latent period ("exposed").
    #[must_use]
    pub fn is_exposed(&self, d: usize, idx: usize) -> bool {
        let cols = &self.diseases[d];
        cols.status[idx] == Status::Infected && cols.counter[idx] <= cols.latent_period[idx]
    }

    /// Not immune, not dead, not already infected.
    #[must_use]
    pub fn is_susceptible(&self, d: usize, idx: usize) -> bool {
        matches!(
            self.diseases[d].status[idx],
            Status::Never | Status::Susceptible
        )
    }

    /// Column for a kernel grouping attribute.
    #[must_use]
    pub fn group_col(&self, attr: GroupAttr) -> &[i32] {
        match attr {
            GroupAttr::Family => &self.family,
            GroupAttr::Nborhood => &self.nborhood,
            GroupAttr::WorkNborhood => &self.work_nborhood,
            GroupAttr::Workgroup => &self.workgroup,
            GroupAttr::Naics => &self.naics,
            GroupAttr::SchoolId => &self.school_id,
            GroupAttr::SchoolGrade => &self.school_grade,
        }
    }

    pub fn push_row(&mut self, row: AgentRow) {
        debug_assert_eq!(row.diseases.len(), self.diseases.len());
        self.id.push(row.id);
        self.age_group.push(row.age_group);
        self.family.push(row.family);
        self.nborhood.push(row.nborhood);
        self.home_i.push(row.home_i);
        self.home_j.push(row.home_j);
        self.work_i.push(row.work_i);
        self.work_j.push(row.work_j);
        self.hosp_i.push(row.hosp_i);
        self.hosp_j.push(row.hosp_j);
        self.trav_i.push(row.trav_i);
        self.trav_j.push(row.trav_j);
        self.school_id.push(row.school_id);
        self.school_grade.push(row.school_grade);
        self.school_closed.push(row.school_closed);
        self.naics.push(row.naics);
        self.workgroup.push(row.workgroup);
        self.work_nborhood.push(row.work_nborhood);
        self.withdrawn.push(row.withdrawn);
        self.random_travel.push(row.random_travel);
        self.air_travel.push(row.air_travel);
        self.pos_i.push(row.pos_i);
        self.pos_j.push(row.pos_j);
        for (cols, state) in self.diseases.iter_mut().zip(row.diseases) {
            cols.status.push(state.status);
            cols.symptomatic.push(state.symptomatic);
            cols.counter.push(state.counter);
            cols.treatment_timer.push(state.treatment_timer);
            cols.prob.push(state.prob);
            cols.latent_period.push(state.latent_period);
            cols.infectious_period.push(state.infectious_period);
            cols.incubation_period.push(state.incubation_period);
        }
    }

    /// Removes the row at `idx` by swapping with the last row.
    pub fn extract_row(&mut self, idx: usize) -> AgentRow {
        let diseases = self
            .diseases
            .iter_mut()
            .map(|cols| DiseaseRowState {
                status: cols.status.swap_remove(idx),
                symptomatic: cols.symptomatic.swap_remove(idx),
                counter: cols.counter.swap_remove(idx),
                treatment_timer: cols.treatment_timer.swap_remove(idx),
                prob: cols.prob.swap_remove(idx),
                latent_period: cols.latent_period.swap_remove(idx),
                infectious_period: cols.infectious_period.swap_remove(idx),
                incubation_period: cols.incubation_period.swap_remove(idx),
            })
            .collect();
        AgentRow {
            id: self.id.swap_remove(idx),
            age_group: self.age_group.swap_remove(idx),
            family: self.family.swap_remove(idx),
            nborhood: self.nborhood.swap_remove(idx),
            home_i: self.home_i.swap_remove(idx),
            home_j: self.home_j.swap_remove(idx),
            work_i: self.work_i.swap_remove(idx),
            work_j: self.work_j.swap_remove(idx),
            hosp_i: self.hosp_i.swap_remove(idx),
            hosp_j: self.hosp_j.swap_remove(idx),
            trav_i: self.trav_i.swap_remove(idx),
            trav_j: self.trav_j.swap_remove(idx),
            school_id: self.school_id.swap_remove(idx),
            school_grade: self.school_grade.swap_remove(idx),
            school_closed: self.school_closed.swap_remove(idx),
            naics: self.naics.swap_remove(idx),
            workgroup: self.workgroup.swap_remove(idx),
            work_nborhood: self.work_nborhood.swap_remove(idx),
            withdrawn: self.withdrawn.swap_remove(idx),
            random_travel: self.random_travel.swap_remove(idx),
            air_travel: self.air_travel.swap_remove(idx),
            pos_i: self.pos_i.swap_remove(idx),
            pos_j: self.pos_j.swap_remove(idx),
            diseases,
        }
    }

    /// Re-orders every column so rows appear in ascending id order. This is
    /// the stable binning used when `fast_bin = false`.
    pub fn sort_by_id(&mut self) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|&k| self.id[k]);

        fn permute<T: Copy>(col: &mut Vec<T>, order: &[usize]) {
            let permuted: Vec<T> = order.iter().map(|&k| col[k]).collect();
            *col = permuted;
        }

        permute(&mut self.id, &order);
        permute(&mut self.age_group, &order);
        permute(&mut self.family, &order);
        permute(&mut self.nborhood, &order);
        permute(&mut self.home_i, &order);
        permute(&mut self.home_j, &order);
        permute(&mut self.work_i, &order);
        permute(&mut self.work_j, &order);
        permute(&mut self.hosp_i, &order);
        permute(&mut self.hosp_j, &order);
        permute(&mut self.trav_i, &order);
        permute(&mut self.trav_j, &order);
        permute(&mut self.school_id, &order);
        permute(&mut self.school_grade, &order);
        permute(&mut self.school_closed, &order);
        permute(&mut self.naics, &order);
        permute(&mut self.workgroup, &order);
        permute(&mut self.work_nborhood, &order);
        permute(&mut self.withdrawn, &order);
        permute(&mut self.random_travel, &order);
        permute(&mut self.air_travel, &order);
        permute(&mut self.pos_i, &order);
        permute(&mut self.pos_j, &order);
        for cols in &mut self.diseases {
            permute(&mut cols.status, &order);
            permute(&mut cols.symptomatic, &order);
            permute(&mut cols.counter, &order);
            permute(&mut cols.treatment_timer, &order);
            permute(&mut cols.prob, &order);
            permute(&mut cols.latent_period, &order);
            permute(&mut cols.infectious_period, &order);
            permute(&mut cols.incubation_period, &order);
        }
    }
}

/// The partitioned agent container.
pub struct AgentStore {
    domain: Domain,
    n_diseases: usize,
    fast_bin: bool,
    tiles: Vec<Tile>,
    next_id: u64,
    max_groups: [OnceLock<i32>; NUM_GROUP_ATTRS],
}

impl AgentStore {
    #[must_use]
    pub fn new(domain: Domain, n_diseases: usize, fast_bin: bool) -> Self {
        let tiles = (0..domain.num_tiles())
            .map(|t| Tile::new(domain.tile_box(t), n_diseases))
            .collect();
        AgentStore {
            domain,
            n_diseases,
            fast_bin,
            tiles,
            next_id: 0,
            max_groups: std::array::from_fn(|_| OnceLock::new()),
        }
    }

    #[must_use]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    #[must_use]
    pub fn num_diseases(&self) -> usize {
        self.n_diseases
    }

    #[must_use]
    pub fn fast_bin(&self) -> bool {
        self.fast_bin
    }

    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[must_use]
    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    #[must_use]
    pub fn num_agents(&self) -> usize {
        self.tiles.iter().map(Tile::len).sum()
    }

    /// Adds an agent at its home cell and returns its stable id. Fails if the
    /// attributes violate the data-model invariants.
    pub fn push_agent(&mut self, attrs: &AgentAttributes) -> Result<u64, EpigridError> {
        let (home_i, home_j) = attrs.home;
        if !self.domain.contains(home_i, home_j) {
            return Err(EpigridError::BadPopulation(format!(
                "home cell ({home_i}, {home_j}) outside the domain"
            )));
        }
        let (work_i, work_j) = match attrs.work {
            Some((i, j)) => {
                if !self.domain.contains(i, j) {
                    return Err(EpigridError::BadPopulation(format!(
                        "work cell ({i}, {j}) outside the domain"
                    )));
                }
                (i, j)
            }
            None => (-1, -1),
        };
        if attrs.school_id > 0 && !(0..=30).contains(&attrs.school_grade) {
            return Err(EpigridError::BadPopulation(format!(
                "school grade {} out of range for enrolled agent",
                attrs.school_grade
            )));
        }
        // Group identifiers index dense counter arrays.
        for (label, v) in [
            ("family", attrs.family),
            ("nborhood", attrs.nborhood),
            ("work_nborhood", attrs.work_nborhood),
            ("workgroup", attrs.workgroup),
            ("naics", attrs.naics),
            ("school_id", attrs.school_id),
            ("school_grade", attrs.school_grade),
        ] {
            if v < 0 {
                return Err(EpigridError::BadPopulation(format!(
                    "{label} must be non-negative, got {v}"
                )));
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        let row = AgentRow {
            id,
            age_group: attrs.age_group,
            family: attrs.family,
            nborhood: attrs.nborhood,
            home_i,
            home_j,
            work_i,
            work_j,
            hosp_i: -1,
            hosp_j: -1,
            trav_i: -1,
            trav_j: -1,
            school_id: attrs.school_id,
            school_grade: attrs.school_grade,
            school_closed: false,
            naics: attrs.naics,
            workgroup: attrs.workgroup,
            work_nborhood: attrs.work_nborhood,
            withdrawn: false,
            random_travel: -1,
            air_travel: -1,
            pos_i: home_i,
            pos_j: home_j,
            diseases: vec![
                DiseaseRowState {
                    status: Status::Never,
                    symptomatic: SymptomStatus::Presymptomatic,
                    counter: 0.0,
                    treatment_timer: 0.0,
                    prob: 1.0,
                    latent_period: 0.0,
                    infectious_period: 0.0,
                    incubation_period: 0.0,
                };
                self.n_diseases
            ],
        };
        let t = self.domain.tile_of_cell(home_i, home_j);
        self.tiles[t].push_row(row);
        Ok(id)
    }

    /// Runs `f` once per non-empty tile, tiles in parallel.
    pub fn par_tiles_mut<F>(&mut self, f: F)
    where
        F: Fn(&mut Tile) + Sync + Send,
    {
        self.tiles.par_iter_mut().for_each(|tile| {
            if !tile.is_empty() {
                f(tile);
            }
        });
    }

    /// Largest value ever observed for a grouping attribute; `-1` when the
    /// store is empty. Computed on first use and cached — the grouping
    /// attributes are immutable for the simulation lifetime.
    pub fn max_group(&self, attr: GroupAttr) -> i32 {
        *self.max_groups[attr as usize].get_or_init(|| {
            self.tiles
                .par_iter()
                .map(|tile| tile.group_col(attr).iter().copied().max().unwrap_or(-1))
                .max()
                .unwrap_or(-1)
        })
    }

    /// Re-bins agents into the tile containing their current position. Must
    /// be called after any phase that rewrites the position columns.
    pub fn redistribute(&mut self) {
        let domain = self.domain;
        // Extraction walks indices downward so swap_remove never disturbs a
        // row that is still to be examined.
        let emigrants: Vec<Vec<(usize, AgentRow)>> = self
            .tiles
            .par_iter_mut()
            .map(|tile| {
                let mut out = Vec::new();
                let mut idx = tile.len();
                while idx > 0 {
                    idx -= 1;
                    let (i, j) = (tile.pos_i[idx], tile.pos_j[idx]);
                    debug_assert!(domain.contains(i, j));
                    if !tile.bx.contains(i, j) {
                        out.push((domain.tile_of_cell(i, j), tile.extract_row(idx)));
                    }
                }
                out
            })
            .collect();

        // Insertion runs in source-tile order, which is deterministic.
        for rows in emigrants {
            for (dest, row) in rows {
                self.tiles[dest].push_row(row);
            }
        }

        if !self.fast_bin {
            self.tiles.par_iter_mut().for_each(Tile::sort_by_id);
        }

        debug_assert!(self.tiles.iter().all(|tile| {
            (0..tile.len()).all(|k| tile.bx.contains(tile.pos_i[k], tile.pos_j[k]))
        }));
    }

    /// Morning commute: workers move to their work cell. Hospitalized and
    /// travelling agents keep their position.
    pub fn move_agents_to_work(&mut self) {
        self.par_tiles_mut(|tile| {
            for k in 0..tile.len() {
                if !tile.in_hospital(k)
                    && tile.random_travel[k] < 0
                    && tile.air_travel[k] < 0
                    && tile.work_i[k] >= 0
                {
                    tile.pos_i[k] = tile.work_i[k];
                    tile.pos_j[k] = tile.work_j[k];
                }
            }
        });
        self.redistribute();
    }

    /// Evening commute: everyone not hospitalized or travelling returns home.
    pub fn move_agents_to_home(&mut self) {
        self.par_tiles_mut(|tile| {
            for k in 0..tile.len() {
                if !tile.in_hospital(k) && tile.random_travel[k] < 0 && tile.air_travel[k] < 0 {
                    tile.pos_i[k] = tile.home_i[k];
                    tile.pos_j[k] = tile.home_j[k];
                }
            }
        });
        self.redistribute();
    }

    /// Moves hospitalized agents to their hospital cell. Redistribution is
    /// deferred to the next movement phase, as admission keeps agents within
    /// their home community in the common case.
    pub fn move_hospitalized(&mut self) {
        self.par_tiles_mut(|tile| {
            for k in 0..tile.len() {
                if tile.in_hospital(k) {
                    tile.pos_i[k] = tile.hosp_i[k];
                    tile.pos_j[k] = tile.hosp_j[k];
                }
            }
        });
    }

    /// One cell of random jitter for every non-hospitalized agent.
    pub fn move_agents_random_walk(&mut self, base_seed: u64, day: u32) {
        use crate::random::{agent_rng, RngStream};
        use rand::Rng;

        let (nx, ny) = self.domain.extent();
        self.par_tiles_mut(|tile| {
            for k in 0..tile.len() {
                if tile.in_hospital(k) {
                    continue;
                }
                let mut rng = agent_rng(base_seed, RngStream::RandomWalk, tile.id[k], day);
                let di = rng.random_range(-1..=1);
                let dj = rng.random_range(-1..=1);
                tile.pos_i[k] = (tile.pos_i[k] + di).clamp(0, nx - 1);
                tile.pos_j[k] = (tile.pos_j[k] + dj).clamp(0, ny - 1);
            }
        });
        self.redistribute();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::defs::AgeGroup;

    fn attrs(home: (i32, i32), work: Option<(i32, i32)>) -> AgentAttributes {
        AgentAttributes {
            age_group: AgeGroup::A30to49,
            family: 0,
            nborhood: 0,
            home,
            work,
            workgroup: 1,
            naics: 0,
            work_nborhood: 0,
            school_id: 0,
            school_grade: 0,
        }
    }

    fn store_4x4() -> AgentStore {
        AgentStore::new(Domain::new(4, 4, 2).unwrap(), 1, false)
    }

    #[test]
    fn push_rejects_out_of_domain() {
        let mut store = store_4x4();
        assert!(store.push_agent(&attrs((4, 0), None)).is_err());
        assert!(store.push_agent(&attrs((0, 0), Some((0, 7)))).is_err());
    }

    #[test]
    fn push_rejects_bad_school_grade() {
        let mut store = store_4x4();
        let mut a = attrs((0, 0), None);
        a.school_id = 1;
        a.school_grade = 31;
        assert!(store.push_agent(&a).is_err());
    }

    #[test]
    fn commute_round_trip_restores_home_tile() {
        let mut store = store_4x4();
        let id = store.push_agent(&attrs((0, 0), Some((3, 3)))).unwrap();
        store.push_agent(&attrs((1, 1), None)).unwrap();

        store.move_agents_to_work();
        let worker_tile = store.domain().tile_of_cell(3, 3);
        assert_eq!(store.tiles()[worker_tile].len(), 1);
        assert_eq!(store.tiles()[worker_tile].id[0], id);

        store.move_agents_to_home();
        let home_tile = store.domain().tile_of_cell(0, 0);
        assert_eq!(store.tiles()[home_tile].len(), 2);
        for k in 0..2 {
            let tile = &store.tiles()[home_tile];
            assert_eq!((tile.pos_i[k], tile.pos_j[k]), (tile.home_i[k], tile.home_j[k]));
        }
        assert_eq!(store.num_agents(), 2);
    }

    #[test]
    fn stable_binning_orders_by_id() {
        let mut store = store_4x4();
        // Three agents that all commute into tile (1,1) from different homes.
        for home in [(1, 0), (0, 0), (0, 1)] {
            store.push_agent(&attrs(home, Some((3, 3)))).unwrap();
        }
        store.move_agents_to_work();
        let t = store.domain().tile_of_cell(3, 3);
        assert_eq!(store.tiles()[t].id, vec![0, 1, 2]);
    }

    #[test]
    fn max_group_is_cached_maximum() {
        let mut store = store_4x4();
        for f in [3, 7, 5] {
            let mut a = attrs((0, 0), None);
            a.family = f;
            store.push_agent(&a).unwrap();
        }
        assert_eq!(store.max_group(GroupAttr::Family), 7);
        assert_eq!(store.max_group(GroupAttr::Naics), 0);
    }

    #[test]
    fn empty_store_max_group() {
        let store = store_4x4();
        assert_eq!(store.max_group(GroupAttr::Family), -1);
    }

    #[test]
    fn random_walk_stays_in_domain() {
        let mut store = store_4x4();
        for home in [(0, 0), (3, 3), (1, 2)] {
            store.push_agent(&attrs(home, None)).unwrap();
        }
        for day in 0..10 {
            store.move_agents_random_walk(9, day);
            for tile in store.tiles() {
                for k in 0..tile.len() {
                    assert!(store.domain().contains(tile.pos_i[k], tile.pos_j[k]));
                    assert!(tile.bx.contains(tile.pos_i[k], tile.pos_j[k]));
                }
            }
        }
        assert_eq!(store.num_agents(), 3);
    }
}
