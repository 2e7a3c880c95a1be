/// Counter that lets only the newest of several overlapping requests apply
/// its response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestGeneration {
    latest: u64,
}

/// Issued per request, compared against the counter when the response arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

impl RequestGeneration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every earlier request as superseded
    pub fn next(&mut self) -> Generation {
        self.latest += 1;
        Generation(self.latest)
    }

    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_request_wins() {
        let mut generations = RequestGeneration::new();
        let first = generations.next();
        let second = generations.next();
        // Responses may arrive in any order, only the newest is applied
        assert!(generations.is_current(second));
        assert!(!generations.is_current(first));
    }
}
