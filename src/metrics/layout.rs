use std::collections::BTreeMap;
use std::f64::consts::PI;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::types::{Canvas, Service};
use super::tree::ServiceOverview;

/// Distance of service overviews from the anchor.
pub const SERVICE_RADIUS: f64 = 150.0;
/// Distance of aggregate-worker markers from the anchor.
pub const WORKER_RADIUS: f64 = 240.0;
pub const JITTER_TABLE_SIZE: usize = 10;
/// Largest angular offset of a worker marker, in radians.
pub const MAX_JITTER: f64 = PI / 12.0;
const MIN_RING_SLOTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// What a coordinate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LayoutKey {
    Overview(Service),
    AggregateWorker(Service),
}

pub type Layout = BTreeMap<LayoutKey, Point>;

/// Angular offset for a worker marker.
pub trait Jitter {
    fn jitter(&self, index: usize, service: Service) -> f64;
}

/// Pre-generated offsets from a seeded RNG: stable for one seed.
#[derive(Debug, Clone)]
pub struct SeededJitter {
    table: [f64; JITTER_TABLE_SIZE],
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut table = [0.0; JITTER_TABLE_SIZE];
        for slot in table.iter_mut() {
            *slot = rng.gen_range(-MAX_JITTER..=MAX_JITTER);
        }
        Self { table }
    }
}

impl Jitter for SeededJitter {
    fn jitter(&self, index: usize, _service: Service) -> f64 {
        self.table[index % JITTER_TABLE_SIZE]
    }
}

/// No offset at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn jitter(&self, _index: usize, _service: Service) -> f64 {
        0.0
    }
}

fn polar(anchor: Point, radius: f64, angle: f64) -> Point {
    Point {
        x: anchor.x + radius * angle.cos(),
        y: anchor.y + radius * angle.sin(),
    }
}

/// Place the root coordinator at the canvas centre and the other services on
/// a ring around it; services with workers get a marker further out.
pub fn compute_layout<J: Jitter + ?Sized>(services: &[ServiceOverview], canvas: &Canvas, jitter: &J) -> Layout {
    let anchor = Point { x: canvas.width / 2.0, y: canvas.height / 2.0 };
    let mut layout = Layout::new();

    let mut ring: Vec<&ServiceOverview> = Vec::with_capacity(services.len());
    for s in services {
        if s.service == Service::Root {
            layout.insert(LayoutKey::Overview(s.service), anchor);
        } else {
            ring.push(s);
        }
    }

    let step = 2.0 * PI / ring.len().max(MIN_RING_SLOTS) as f64;
    for (i, s) in ring.iter().enumerate() {
        let angle = step * i as f64;
        layout.insert(LayoutKey::Overview(s.service), polar(anchor, SERVICE_RADIUS, angle));
        if s.has_workers() {
            let offset = jitter.jitter(i, s.service);
            layout.insert(
                LayoutKey::AggregateWorker(s.service),
                polar(anchor, WORKER_RADIUS, angle + offset),
            );
        }
    }

    layout
}
