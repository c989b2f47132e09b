/// Early out fraction that makes [`CollisionCollector::should_early_out`] return true
pub const FORCED_EARLY_OUT_FRACTION: f32 = f32::MIN;

/// A result that can be ordered by how close it is
pub trait CollisionResult {
    /// Lower is closer. Used to prune queries once a collector is satisfied.
    fn early_out_fraction(&self) -> f32;
}

/// Receives query results as they are found
pub trait CollisionCollector<R> {
    /// Called for every hit
    fn add_hit(&mut self, result: R);

    /// Hits with a fraction above this value are no longer interesting
    fn early_out_fraction(&self) -> f32;

    fn update_early_out_fraction(&mut self, fraction: f32);

    /// Returns true when the query can stop
    fn should_early_out(&self) -> bool {
        self.early_out_fraction() <= FORCED_EARLY_OUT_FRACTION
    }

    /// Prepares the collector for a new query
    fn reset(&mut self);
}

/// Collects every hit
#[derive(Debug, Clone)]
pub struct AllHitCollector<R> {
    pub hits: Vec<R>,
    early_out_fraction: f32,
}

impl<R: CollisionResult> AllHitCollector<R> {
    pub fn new() -> Self {
        Self {
            hits: Vec::new(),
            early_out_fraction: f32::MAX,
        }
    }

    pub fn had_hit(&self) -> bool {
        !self.hits.is_empty()
    }

    /// Orders the hits from closest to furthest
    pub fn sort(&mut self) {
        self.hits.sort_by(|a, b| a.early_out_fraction().total_cmp(&b.early_out_fraction()));
    }
}

impl<R: CollisionResult> Default for AllHitCollector<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CollisionResult> CollisionCollector<R> for AllHitCollector<R> {
    fn add_hit(&mut self, result: R) {
        self.hits.push(result);
    }

    fn early_out_fraction(&self) -> f32 {
        self.early_out_fraction
    }

    fn update_early_out_fraction(&mut self, fraction: f32) {
        self.early_out_fraction = self.early_out_fraction.min(fraction);
    }

    fn reset(&mut self) {
        self.hits.clear();
        self.early_out_fraction = f32::MAX;
    }
}

/// Keeps only the closest hit
#[derive(Debug, Clone)]
pub struct ClosestHitCollector<R> {
    pub hit: Option<R>,
    early_out_fraction: f32,
}

impl<R: CollisionResult> ClosestHitCollector<R> {
    pub fn new() -> Self {
        Self {
            hit: None,
            early_out_fraction: f32::MAX,
        }
    }

    pub fn had_hit(&self) -> bool {
        self.hit.is_some()
    }
}

impl<R: CollisionResult> Default for ClosestHitCollector<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CollisionResult> CollisionCollector<R> for ClosestHitCollector<R> {
    fn add_hit(&mut self, result: R) {
        let fraction = result.early_out_fraction();
        if self.hit.is_none() || fraction < self.early_out_fraction {
            self.early_out_fraction = fraction;
            self.hit = Some(result);
        }
    }

    fn early_out_fraction(&self) -> f32 {
        self.early_out_fraction
    }

    fn update_early_out_fraction(&mut self, fraction: f32) {
        self.early_out_fraction = self.early_out_fraction.min(fraction);
    }

    fn reset(&mut self) {
        self.hit = None;
        self.early_out_fraction = f32::MAX;
    }
}

/// Stops the query at the first hit
#[derive(Debug, Clone)]
pub struct AnyHitCollector<R> {
    pub hit: Option<R>,
    early_out_fraction: f32,
}

impl<R> AnyHitCollector<R> {
    pub fn new() -> Self {
        Self {
            hit: None,
            early_out_fraction: f32::MAX,
        }
    }

    pub fn had_hit(&self) -> bool {
        self.hit.is_some()
    }
}

impl<R> Default for AnyHitCollector<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> CollisionCollector<R> for AnyHitCollector<R> {
    fn add_hit(&mut self, result: R) {
        self.hit = Some(result);
        self.early_out_fraction = FORCED_EARLY_OUT_FRACTION;
    }

    fn early_out_fraction(&self) -> f32 {
        self.early_out_fraction
    }

    fn update_early_out_fraction(&mut self, fraction: f32) {
        self.early_out_fraction = self.early_out_fraction.min(fraction);
    }

    fn reset(&mut self) {
        self.hit = None;
        self.early_out_fraction = f32::MAX;
    }
}
