//! Approximate touring-salesman heuristic.
//!
//! Cities come from Poisson-disk sampling, so no two land closer than the
//! minimum spacing. The algorithm runs as a three-phase state machine, one
//! bounded step per tick: Prim's MST over the complete road graph, a
//! closest-child-first preorder walk of the tree that yields the initial
//! tour, then endless randomized 2-opt improvement. Tour length only ever
//! improves or holds once the improvement phase begins.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use simarium_data::{color, Circle, Point, Rgba, Settings, SimulationKind, TourAlgorithm};

use crate::config::TourConfig;
use crate::engine::Simulation;
use crate::poisson;
use crate::surface::Surface;

const TOUR_EDGE: Rgba = Rgba::rgb(160, 32, 240);
const MST_EDGE: Rgba = Rgba::rgb(94, 255, 255);

/// A city: position, the best known connecting-edge cost while it waits in
/// the MST heap, a visited flag for the walk, and its MST children.
#[derive(Debug, Clone)]
pub struct City {
    pub pos: Point,
    pub cost: f64,
    pub visited: bool,
    pub children: Vec<usize>,
}

/// A directed road with its precomputed Euclidean cost.
#[derive(Debug, Clone, Copy)]
pub struct Road {
    pub to: usize,
    pub cost: f64,
}

/// Algorithm phases, in order. `Improving` never terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    BuildingMst,
    WalkingTour,
    Improving,
}

struct MstEntry {
    cost: f64,
    idx: usize,
}

impl PartialEq for MstEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost.total_cmp(&other.cost) == Ordering::Equal
    }
}

impl Eq for MstEntry {}

impl PartialOrd for MstEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MstEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost)
    }
}

pub struct TourSim {
    config: TourConfig,
    rng: ChaCha8Rng,
    algorithm: TourAlgorithm,
    cities: Vec<City>,
    roads: Vec<Vec<Road>>,
    heap: BinaryHeap<MstEntry>,
    in_mst: Vec<bool>,
    predecessors: Vec<Option<usize>>,
    phase: Phase,
    start_city: usize,
    walk: Vec<usize>,
    final_tour: Vec<usize>,
    city_radius: f64,
}

impl TourSim {
    pub fn new(config: TourConfig, rng: ChaCha8Rng) -> Self {
        Self {
            config,
            rng,
            algorithm: TourAlgorithm::default(),
            cities: Vec::new(),
            roads: Vec::new(),
            heap: BinaryHeap::new(),
            in_mst: Vec::new(),
            predecessors: Vec::new(),
            phase: Phase::BuildingMst,
            start_city: 0,
            walk: Vec::new(),
            final_tour: Vec::new(),
            city_radius: 2.0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn algorithm(&self) -> TourAlgorithm {
        self.algorithm
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// The closed tour (first city repeated at the end) once the walk phase
    /// has completed; empty before that.
    pub fn final_tour(&self) -> &[usize] {
        &self.final_tour
    }

    pub fn tour_length(&self) -> f64 {
        self.final_tour
            .windows(2)
            .map(|w| self.cities[w[0]].pos.distance_to(&self.cities[w[1]].pos))
            .sum()
    }

    fn edge_cost(&self, a: usize, b: usize) -> f64 {
        self.cities[a].pos.distance_to(&self.cities[b].pos)
    }

    /// One Prim relaxation batch: pop the cheapest waiting city, add it to
    /// the tree, relax every road out of it.
    fn mst_step(&mut self) {
        let city = loop {
            match self.heap.pop() {
                Some(entry) if self.in_mst[entry.idx] => continue,
                Some(entry) => break Some(entry.idx),
                None => break None,
            }
        };
        let Some(city) = city else {
            self.finish_mst();
            return;
        };
        self.in_mst[city] = true;
        for road in &self.roads[city] {
            if !self.in_mst[road.to] && road.cost < self.cities[road.to].cost {
                self.cities[road.to].cost = road.cost;
                self.predecessors[road.to] = Some(city);
                self.heap.push(MstEntry {
                    cost: road.cost,
                    idx: road.to,
                });
            }
        }
    }

    /// Turn the predecessor map into per-city child lists, closest child
    /// first, and seed the walk.
    fn finish_mst(&mut self) {
        for idx in 0..self.cities.len() {
            if let Some(pred) = self.predecessors[idx] {
                self.cities[pred].children.push(idx);
            }
        }
        for idx in 0..self.cities.len() {
            let mut children = std::mem::take(&mut self.cities[idx].children);
            children.sort_by(|&a, &b| self.edge_cost(idx, a).total_cmp(&self.edge_cost(idx, b)));
            self.cities[idx].children = children;
        }
        self.walk.push(self.start_city);
        self.cities[self.start_city].visited = true;
        self.phase = Phase::WalkingTour;
        tracing::info!(cities = self.cities.len(), "MST complete, walking tour");
    }

    /// One preorder-walk step: descend into the closest unvisited child, or
    /// backtrack toward the root. Exhausting the root ends the phase.
    fn walk_step(&mut self) {
        let current = match self.walk.last() {
            Some(&c) => c,
            None => return,
        };
        if self.cities[current].children.is_empty() {
            match self.predecessors[current] {
                Some(back) => self.walk.push(back),
                None => self.finish_walk(),
            }
        } else {
            let child = self.cities[current].children.remove(0);
            self.cities[child].visited = true;
            self.walk.push(child);
        }
    }

    /// Flatten the walk into the tour: first visit wins, then close the
    /// loop back to the start city.
    fn finish_walk(&mut self) {
        for &city in &self.walk {
            if !self.final_tour.contains(&city) {
                self.final_tour.push(city);
            }
        }
        self.final_tour.push(self.start_city);
        self.phase = Phase::Improving;
        tracing::info!(
            length = self.tour_length(),
            "Initial tour complete, improving"
        );
    }

    /// One randomized 2-opt trial: swap two tour edges if the exchange
    /// shortens the total, reversing the segment between them.
    fn improve_step(&mut self) {
        let len = self.final_tour.len();
        if len < 5 {
            return;
        }
        // Interior positions only; the closing endpoints stay fixed.
        let mut i = self.rng.gen_range(1..len - 1);
        let mut j = self.rng.gen_range(1..len - 1);
        if i == j {
            return;
        }
        if i > j {
            std::mem::swap(&mut i, &mut j);
        }
        let (a, b) = (self.final_tour[i - 1], self.final_tour[i]);
        let (c, d) = (self.final_tour[j], self.final_tour[j + 1]);
        let current = self.edge_cost(a, b) + self.edge_cost(c, d);
        let swapped = self.edge_cost(a, c) + self.edge_cost(b, d);
        if swapped < current {
            self.final_tour[i..=j].reverse();
        }
    }

    fn render(&self, surface: &mut Surface) {
        surface.clear(Rgba::BACKGROUND);

        // Spanning-tree edges discovered so far.
        for (idx, pred) in self.predecessors.iter().enumerate() {
            if let Some(pred) = *pred {
                let a = self.cities[idx].pos;
                let b = self.cities[pred].pos;
                surface.line(a.x, a.y, b.x, b.y, MST_EDGE);
            }
        }

        if self.phase == Phase::Improving {
            for w in self.final_tour.windows(2) {
                let a = self.cities[w[0]].pos;
                let b = self.cities[w[1]].pos;
                surface.line(a.x, a.y, b.x, b.y, TOUR_EDGE);
            }
            surface.text(
                f64::from(surface.width()) / 2.0,
                2.0,
                format!("tour length {:.0}", self.tour_length()),
                Rgba::WHITE,
            );
        }

        for (idx, city) in self.cities.iter().enumerate() {
            let (radius, tint) = if idx == self.start_city {
                (self.city_radius * 1.6, color::PALETTE[0])
            } else if city.visited {
                (self.city_radius * 1.3, color::PALETTE[1])
            } else {
                (self.city_radius, color::PALETTE[3])
            };
            surface.fill_circle(&Circle::new(city.pos.x, city.pos.y, radius), tint);
            surface.text(
                city.pos.x + radius + 1.0,
                city.pos.y,
                format!("{}", idx + 1),
                Rgba::rgb(200, 200, 200),
            );
        }
    }
}

impl Simulation for TourSim {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Tour
    }

    fn init(&mut self, surface: &mut Surface) {
        let diag = surface.diag_length();
        self.city_radius = (diag * 0.006).max(1.5);
        let margin = diag * self.config.margin_frac;
        let width = f64::from(surface.width()) - margin * 2.0;
        let height = f64::from(surface.height()) - margin * 2.0;
        let spacing = diag * self.config.spacing_frac;

        let mut points = poisson::sample(&mut self.rng, margin, margin, width, height, spacing);
        points.truncate(self.config.city_count);
        if points.len() < 2 {
            // Not enough room for a tour; every tick no-ops.
            self.cities.clear();
            return;
        }

        self.cities = points
            .into_iter()
            .map(|pos| City {
                pos,
                cost: f64::INFINITY,
                visited: false,
                children: Vec::new(),
            })
            .collect();

        // Complete bidirectional road graph with Euclidean costs.
        let n = self.cities.len();
        self.roads = (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| j != i)
                    .map(|j| Road {
                        to: j,
                        cost: self.edge_cost(i, j),
                    })
                    .collect()
            })
            .collect();

        self.in_mst = vec![false; n];
        self.predecessors = vec![None; n];
        self.start_city = self.rng.gen_range(0..n);
        self.cities[self.start_city].cost = 0.0;
        self.heap.push(MstEntry {
            cost: 0.0,
            idx: self.start_city,
        });

        self.render(surface);
    }

    fn tick(&mut self, surface: &mut Surface) {
        if surface.is_empty() || self.cities.is_empty() {
            return;
        }
        match self.phase {
            Phase::BuildingMst => self.mst_step(),
            Phase::WalkingTour => self.walk_step(),
            Phase::Improving => self.improve_step(),
        }
        self.render(surface);
    }

    fn update_settings(&mut self, settings: &Settings) {
        match settings {
            Settings::TourAlgorithm(algorithm) => {
                self.algorithm = *algorithm;
            }
            other => tracing::debug!(?other, "Ignoring settings payload for another simulation"),
        }
    }

    fn tick_period(&self) -> Duration {
        Duration::from_millis(self.config.tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn run_sim(seed: u64) -> (TourSim, Surface) {
        let config = TourConfig {
            city_count: 20,
            spacing_frac: 0.08,
            margin_frac: 0.05,
            ..Default::default()
        };
        let mut sim = TourSim::new(config, ChaCha8Rng::seed_from_u64(seed));
        let mut surface = Surface::new(300, 200);
        sim.init(&mut surface);
        (sim, surface)
    }

    fn run_until_improving(sim: &mut TourSim, surface: &mut Surface) {
        // MST pops + walk steps are both bounded by a small multiple of the
        // city count.
        let budget = sim.cities().len() * sim.cities().len() * 4 + 64;
        for _ in 0..budget {
            if sim.phase() == Phase::Improving {
                return;
            }
            sim.tick(surface);
        }
        panic!("tour never reached the improvement phase");
    }

    #[test]
    fn test_phases_run_in_order() {
        let (mut sim, mut surface) = run_sim(11);
        assert_eq!(sim.phase(), Phase::BuildingMst);
        run_until_improving(&mut sim, &mut surface);
        assert_eq!(sim.phase(), Phase::Improving);
    }

    #[test]
    fn test_tour_visits_every_city_once_and_closes() {
        let (mut sim, mut surface) = run_sim(12);
        run_until_improving(&mut sim, &mut surface);
        let tour = sim.final_tour();
        let n = sim.cities().len();
        assert_eq!(tour.len(), n + 1);
        assert_eq!(tour.first(), tour.last());
        let mut seen = vec![0usize; n];
        for &city in &tour[..n] {
            seen[city] += 1;
        }
        assert!(seen.iter().all(|&count| count == 1));
    }

    #[test]
    fn test_improvement_is_monotone() {
        let (mut sim, mut surface) = run_sim(13);
        run_until_improving(&mut sim, &mut surface);
        let mut best = sim.tour_length();
        for _ in 0..500 {
            sim.tick(&mut surface);
            let length = sim.tour_length();
            assert!(length <= best + 1e-9, "2-opt lengthened the tour");
            best = best.min(length);
        }
    }

    #[test]
    fn test_improvement_preserves_the_city_set() {
        let (mut sim, mut surface) = run_sim(14);
        run_until_improving(&mut sim, &mut surface);
        let n = sim.cities().len();
        for _ in 0..300 {
            sim.tick(&mut surface);
        }
        let tour = sim.final_tour();
        assert_eq!(tour.len(), n + 1);
        assert_eq!(tour.first(), tour.last());
    }

    #[test]
    fn test_algorithm_setting_lands() {
        let (mut sim, _surface) = run_sim(16);
        sim.update_settings(&Settings::TourAlgorithm(TourAlgorithm::MstTwoOpt));
        assert_eq!(sim.algorithm(), TourAlgorithm::MstTwoOpt);
    }

    #[test]
    fn test_cities_respect_minimum_spacing() {
        let (sim, _surface) = run_sim(15);
        let spacing = 0.08 * (300.0f64 * 300.0 + 200.0 * 200.0).sqrt();
        let cities = sim.cities();
        for i in 0..cities.len() {
            for j in (i + 1)..cities.len() {
                assert!(cities[i].pos.distance_to(&cities[j].pos) >= spacing - 1e-9);
            }
        }
    }
}
