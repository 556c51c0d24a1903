/// The best candidate found so far by a single-nearest-neighbor search.
///
/// The best distance never increases over the lifetime of a search: [`offer`][Self::offer]
/// only replaces the candidate with a strictly closer one.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestNeighbor<T> {
    best: Option<(T, f64)>,
}

impl<T> NearestNeighbor<T> {
    /// An accumulator with no candidate yet.
    pub fn new() -> Self {
        Self { best: None }
    }

    /// Replace the current candidate if `distance` is strictly smaller than the best distance.
    ///
    /// Returns `true` if the candidate was replaced.
    pub fn offer(&mut self, item: T, distance: f64) -> bool {
        match &self.best {
            Some((_, best)) if distance >= *best => false,
            _ => {
                self.best = Some((item, distance));
                true
            }
        }
    }

    /// The best candidate, if any was offered.
    pub fn best_guess(&self) -> Option<&T> {
        self.best.as_ref().map(|(item, _)| item)
    }

    /// The distance of the best candidate, if any was offered.
    pub fn best_distance(&self) -> Option<f64> {
        self.best.as_ref().map(|(_, distance)| *distance)
    }

    /// Returns `true` if a region whose closest point lies `distance` away could still hold a
    /// better candidate.
    #[inline]
    pub fn may_improve(&self, distance: f64) -> bool {
        self.best_distance().map_or(true, |best| distance < best)
    }

    /// Consume the accumulator, returning the best candidate.
    pub fn into_inner(self) -> Option<T> {
        self.best.map(|(item, _)| item)
    }
}

impl<T> Default for NearestNeighbor<T> {
    fn default() -> Self {
        Self::new()
    }
}
