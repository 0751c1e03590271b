//! Support/resistance zone clustering.
//!
//! A touch within `tolerance` of an existing zone is registered into the
//! nearest such zone (ties go to the zone with more touches): the centroid
//! moves by running mean and `touches` grows by one. A touch with no zone in
//! range opens a new zone.

use crate::domain::{SwingPoint, Zone, ZoneStrength};

/// Strength tier for a touch count.
pub fn strength_for(touches: u32, strong_touch_threshold: u32) -> ZoneStrength {
    if touches >= strong_touch_threshold {
        ZoneStrength::Strong
    } else {
        ZoneStrength::Medium
    }
}

/// Incrementally built set of zones sharing one merge tolerance.
#[derive(Debug, Clone)]
pub struct ZoneSet {
    tolerance: f64,
    strong_touch_threshold: u32,
    zones: Vec<Zone>,
}

impl ZoneSet {
    pub fn new(tolerance: f64, strong_touch_threshold: u32) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
            strong_touch_threshold,
            zones: Vec::new(),
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Register one touch. Returns the index of the zone that absorbed it.
    pub fn register(&mut self, price: f64, timestamp: i64) -> usize {
        let nearest = self
            .zones
            .iter()
            .enumerate()
            .map(|(i, z)| (i, (z.price - price).abs(), z.touches))
            .filter(|&(_, dist, _)| dist <= self.tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(b.2.cmp(&a.2)));

        match nearest {
            Some((i, _, _)) => {
                let zone = &mut self.zones[i];
                let touches = zone.touches + 1;
                zone.price = (zone.price * f64::from(zone.touches) + price) / f64::from(touches);
                zone.touches = touches;
                zone.last_touch = zone.last_touch.max(timestamp);
                zone.strength = strength_for(touches, self.strong_touch_threshold);
                i
            }
            None => {
                self.zones.push(Zone {
                    price,
                    touches: 1,
                    strength: strength_for(1, self.strong_touch_threshold),
                    last_touch: timestamp,
                });
                self.zones.len() - 1
            }
        }
    }

    /// Sort by price and merge neighbours closer than the tolerance, so no
    /// two zones overlap. Centroids combine weighted by touches.
    pub fn normalize(&mut self) {
        self.zones.sort_by(|a, b| a.price.total_cmp(&b.price));
        let mut merged: Vec<Zone> = Vec::with_capacity(self.zones.len());
        for zone in self.zones.drain(..) {
            match merged.last_mut() {
                Some(prev) if zone.price - prev.price <= self.tolerance => {
                    let touches = prev.touches + zone.touches;
                    prev.price = (prev.price * f64::from(prev.touches)
                        + zone.price * f64::from(zone.touches))
                        / f64::from(touches);
                    prev.touches = touches;
                    prev.last_touch = prev.last_touch.max(zone.last_touch);
                    prev.strength = strength_for(touches, self.strong_touch_threshold);
                }
                _ => merged.push(zone),
            }
        }
        self.zones = merged;
    }

    pub fn into_zones(self) -> Vec<Zone> {
        self.zones
    }
}

/// Cluster swing points into non-overlapping zones, ascending by price.
pub fn cluster_zones<'a, I>(points: I, tolerance: f64, strong_touch_threshold: u32) -> Vec<Zone>
where
    I: IntoIterator<Item = &'a SwingPoint>,
{
    let mut sorted: Vec<&SwingPoint> = points
        .into_iter()
        .filter(|p| p.price.is_finite())
        .collect();
    sorted.sort_by(|a, b| a.price.total_cmp(&b.price).then(a.timestamp.cmp(&b.timestamp)));

    let mut set = ZoneSet::new(tolerance, strong_touch_threshold);
    for p in sorted {
        set.register(p.price, p.timestamp);
    }
    set.normalize();
    set.into_zones()
}
