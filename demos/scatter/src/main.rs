use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use cgmath::{vec2, Vector2};
use clap::Parser;
use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use stardrift::Plate;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_PATTERN: &str = concat!(
    "#...#.###\n",
    "#...#..#.\n",
    "#####..#.\n",
    "#...#..#.\n",
    "#...#.###\n",
);

/// Scramble a text pattern into a drifting star list that lines back up
/// after a chosen number of seconds.
#[derive(Parser, Debug)]
struct Args {
    /// Pattern file (`#` marks a star); a built-in glyph when omitted.
    #[arg(long)]
    pattern: Option<PathBuf>,
    /// Seconds of drift to wind back from the aligned instant.
    #[arg(long, default_value_t = 12)]
    seconds: u64,
    /// Largest velocity component handed out.
    #[arg(long, default_value_t = 4)]
    speed: i64,
    /// Seed for the velocity draw and the line shuffle.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Where to write the scrambled star list.
    #[arg(long, default_value = "scrambled.txt")]
    out: PathBuf,
    /// Save a PNG chart of the scrambled sky.
    #[arg(long)]
    chart: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let text = match &args.pattern {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => DEFAULT_PATTERN.to_string(),
    };
    let plate = Plate::from_text(&text)?;
    let targets: Vec<Vector2<i64>> = plate.stars().collect();
    if targets.is_empty() {
        bail!("pattern has no lit cells");
    }
    if args.speed < 1 {
        bail!("speed must be at least 1");
    }

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let velocities = draw_velocities(&targets, args.speed, &mut rng)?;

    let mut stars: Vec<(Vector2<i64>, Vector2<i64>)> = targets
        .iter()
        .zip(&velocities)
        .map(|(&target, &velocity)| (target - velocity * args.seconds as i64, velocity))
        .collect();
    stars.shuffle(&mut rng);

    let mut listing = String::new();
    for (position, velocity) in &stars {
        writeln!(
            listing,
            "position=<{:>6}, {:>6}> velocity=<{:>2}, {:>2}>",
            position.x, position.y, velocity.x, velocity.y
        )?;
    }
    fs::write(&args.out, listing).with_context(|| format!("writing {}", args.out.display()))?;
    info!(
        stars = stars.len(),
        seconds = args.seconds,
        path = %args.out.display(),
        "scrambled star list written"
    );

    if let Some(chart) = &args.chart {
        let scattered = Array2::from_shape_fn((stars.len(), 2), |(i, j)| {
            if j == 0 {
                stars[i].0.x
            } else {
                stars[i].0.y
            }
        });
        image_util::save_chart(chart, &scattered, 800)?;
        info!(path = %chart.display(), "chart saved");
    }

    Ok(())
}

/// Draw one velocity per target, rejecting draws that would drag the
/// spread minimum off the aligned instant.
///
/// Positions are affine in time, so the population variance of the field is
/// a parabola in the seconds left. Its vertex sits at
/// `cov(target, velocity) / var(velocity)` over the flattened coordinates;
/// keeping the vertex within half a tick of zero guarantees the spread
/// shrinks on every step in and first grows one step past the message.
fn draw_velocities(
    targets: &[Vector2<i64>],
    speed: i64,
    rng: &mut SmallRng,
) -> Result<Vec<Vector2<i64>>> {
    const TRIES: usize = 64;

    for _ in 0..TRIES {
        let velocities: Vec<Vector2<i64>> = targets
            .iter()
            .map(|_| vec2(rng.gen_range(-speed..=speed), rng.gen_range(-speed..=speed)))
            .collect();

        if let Some(shift) = vertex_shift(targets, &velocities) {
            if shift.abs() < 0.49 {
                return Ok(velocities);
            }
        }
    }

    bail!("no usable velocity draw in {} tries; try another seed", TRIES)
}

/// Vertex of the spread parabola in ticks, relative to the aligned instant.
/// `None` when the draw has no velocity variance at all.
fn vertex_shift(targets: &[Vector2<i64>], velocities: &[Vector2<i64>]) -> Option<f64> {
    let values = targets.len() as f64 * 2.0;

    let mut sum_t = 0.0;
    let mut sum_v = 0.0;
    for (target, velocity) in targets.iter().zip(velocities) {
        sum_t += (target.x + target.y) as f64;
        sum_v += (velocity.x + velocity.y) as f64;
    }
    let mean_t = sum_t / values;
    let mean_v = sum_v / values;

    let mut cov = 0.0;
    let mut var_v = 0.0;
    for (target, velocity) in targets.iter().zip(velocities) {
        for (t, v) in [(target.x, velocity.x), (target.y, velocity.y)] {
            let dt = t as f64 - mean_t;
            let dv = v as f64 - mean_v;
            cov += dt * dv;
            var_v += dv * dv;
        }
    }

    if var_v == 0.0 {
        None
    } else {
        Some(cov / var_v)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_vertex_of_radial_collapse_stays_within_tolerance() {
        let targets = vec![vec2(0i64, 0), vec2(4, 0), vec2(0, 4), vec2(4, 4)];
        let velocities: Vec<_> = targets.iter().map(|&t| (t - vec2(2, 2)) * 3).collect();

        let shift = vertex_shift(&targets, &velocities).unwrap();

        assert!((shift - 1.0 / 3.0).abs() < 1e-9, "shift {}", shift);
        assert!(shift.abs() < 0.49);
    }

    #[test]
    fn test_vertex_rejects_velocities_matching_targets() {
        let targets = vec![vec2(0i64, 0), vec2(6, 2), vec2(3, 9)];
        let velocities = targets.clone();

        let shift = vertex_shift(&targets, &velocities).unwrap();

        assert!((shift - 1.0).abs() < 1e-9, "shift {}", shift);
    }

    #[test]
    fn test_uniform_draw_has_no_vertex() {
        let targets = vec![vec2(0i64, 0), vec2(5, 5)];
        let velocities = vec![vec2(2i64, 2), vec2(2, 2)];

        assert_eq!(vertex_shift(&targets, &velocities), None);
    }

    #[test]
    fn test_draw_velocities_keeps_the_minimum_centered() {
        let targets: Vec<_> = (0..24i64).map(|i| vec2(i % 6, i / 6)).collect();
        let mut rng = SmallRng::seed_from_u64(11);

        let velocities = draw_velocities(&targets, 4, &mut rng).unwrap();
        let shift = vertex_shift(&targets, &velocities).unwrap();

        assert!(shift.abs() < 0.49, "shift {}", shift);
    }
}
