use cgmath::Vector2;
use ndarray::Array2;
use thiserror::Error;

/// The instant the field stopped shrinking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    /// Ticks elapsed from the initial field to the minimum-spread instant.
    pub seconds: u64,
    /// Spread at that instant.
    pub spread: f64,
}

#[derive(Debug, Error)]
pub enum AlignError {
    #[error("no alignment within {max_seconds}s (spread never rose, last value {spread:.2})")]
    NoAlignment { max_seconds: u64, spread: f64 },
}

/// A field of drifting stars: one row per star, columns x then y. Positions
/// advance by one velocity step per tick; velocities never change.
#[derive(Debug, Clone)]
pub struct Sky {
    positions: Array2<i64>,
    velocities: Array2<i64>,
    seconds: u64,
}

impl Sky {
    /// Build a field from (position, velocity) pairs at tick zero.
    pub fn from_stars(stars: &[(Vector2<i64>, Vector2<i64>)]) -> Sky {
        let n = stars.len();
        let positions = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                stars[i].0.x
            } else {
                stars[i].0.y
            }
        });
        let velocities = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                stars[i].1.x
            } else {
                stars[i].1.y
            }
        });

        Sky {
            positions,
            velocities,
            seconds: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ticks stepped so far.
    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Current star positions, one row per star.
    pub fn positions(&self) -> &Array2<i64> {
        &self.positions
    }

    /// Advance every star by one tick.
    pub fn step(&mut self) {
        self.positions += &self.velocities;
        self.seconds += 1;
    }

    // Exact integer inverse of `step`. Only valid after at least one step.
    fn step_back(&mut self) {
        self.positions -= &self.velocities;
        self.seconds -= 1;
    }

    /// Population standard deviation over every coordinate in the field,
    /// x and y pooled together: |x - y| / 2 for a single star, NaN for an
    /// empty field.
    pub fn spread(&self) -> f64 {
        let values = self.positions.len() as f64;
        (self.spread_numerator() as f64).sqrt() / values
    }

    // M * sum(v^2) - sum(v)^2 over the M flattened coordinates, i.e. the
    // population variance scaled by M^2. Exact in i128, so a rigid drift
    // that leaves the spread constant compares equal tick to tick where
    // f64 accumulation wobbles by an ulp.
    fn spread_numerator(&self) -> i128 {
        let mut sum = 0i128;
        let mut sum_sq = 0i128;
        for &v in self.positions.iter() {
            let v = v as i128;
            sum += v;
            sum_sq += v * v;
        }
        self.positions.len() as i128 * sum_sq - sum * sum
    }

    /// Run the field forward until the spread stops shrinking.
    ///
    /// The spread of a linearly drifting field falls to a single minimum and
    /// grows afterwards, so the first tick whose spread strictly exceeds the
    /// previous tick's marks the previous tick as the minimum; the overshoot
    /// is rewound before returning. The rise test runs on the exact integer
    /// variance numerator, never on rounded floats. `watch` sees
    /// (seconds, spread) after every tick, overshoot included. A field whose
    /// spread never rises within `max_seconds` ticks (all velocities equal,
    /// say) yields [`AlignError::NoAlignment`] with the field left at the
    /// cap.
    pub fn align(
        &mut self,
        max_seconds: u64,
        mut watch: impl FnMut(u64, f64),
    ) -> Result<Alignment, AlignError> {
        let mut prev = self.spread_numerator();

        for _ in 0..max_seconds {
            self.step();
            let now = self.spread_numerator();
            watch(self.seconds, self.spread());

            if now > prev {
                self.step_back();
                return Ok(Alignment {
                    seconds: self.seconds,
                    spread: self.spread(),
                });
            }
            prev = now;
        }

        Err(AlignError::NoAlignment {
            max_seconds,
            spread: self.spread(),
        })
    }
}
