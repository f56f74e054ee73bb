//! Double-threshold hysteresis over the gradient field.
//!
//! The stage is a small state machine over [`HysteresisState`]:
//!
//! 1. **classify**: `Unvisited` pixels below the low threshold become
//!    `Background`, pixels above the high threshold become `StrongEdge`.
//!    Pixels already marked by suppression keep their state.
//! 2. **trace**: from every strong seed, an 8-connected flood walks through
//!    `Unvisited` pixels only and marks them `Candidate`. `Background` and
//!    `StrongEdge` pixels stop the flood.
//! 3. **finalize**: pixels the flood never reached become `Background`,
//!    `Candidate` pixels fold into `StrongEdge`.
//!
//! The flood uses an explicit stack, so its memory is bounded by the pixel
//! count rather than by the call stack.

use rayon::prelude::*;

use crate::field::{GradientField, HysteresisState};
use crate::grid::Grid;
use crate::params::CandidatePolicy;

/// Intensity of a set pixel in binary artifacts.
pub const EDGE_VALUE: f32 = 255.0;
/// Intensity of linked pixels under [`CandidatePolicy::Mark`].
pub const MARKED_VALUE: f32 = 127.0;

const NEIGHBORS_8: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Artifacts emitted by the hysteresis stage.
#[derive(Clone, Debug)]
pub struct HysteresisOutput {
    /// `EDGE_VALUE` where a pixel crossed the high threshold.
    pub strong: Grid,
    /// `EDGE_VALUE` where a pixel sat between the thresholds before
    /// finalization, whether or not the flood reached it.
    pub between: Grid,
    /// Final edge map, linked pixels encoded per [`CandidatePolicy`].
    pub combined: Grid,
}

/// Runs classify, trace and finalize on `field`.
pub fn hysteresis(
    field: &mut GradientField,
    low: f64,
    high: f64,
    policy: CandidatePolicy,
) -> HysteresisOutput {
    let seeds = classify(field, low, high);
    let strong = field.render(|c| binary(c.state == HysteresisState::StrongEdge));
    trace(field, &seeds);
    debug!(
        "hysteresis trace ok, {} seeds, {} linked",
        seeds.len(),
        field.count_state(HysteresisState::Candidate)
    );
    let (between, combined) = finalize(field, policy);
    HysteresisOutput {
        strong,
        between,
        combined,
    }
}

/// Thresholds every `Unvisited` pixel and returns the indices of the strong
/// seeds.
pub fn classify(field: &mut GradientField, low: f64, high: f64) -> Vec<usize> {
    field
        .cells_mut()
        .par_iter_mut()
        .enumerate()
        .filter_map(|(i, cell)| {
            if cell.state != HysteresisState::Unvisited {
                return None;
            }
            let s = cell.normalized_strength as f64;
            if s < low {
                cell.state.advance(HysteresisState::Background);
                None
            } else if s > high {
                cell.state.advance(HysteresisState::StrongEdge);
                Some(i)
            } else {
                None
            }
        })
        .collect()
}

/// Floods from `seeds` through `Unvisited` pixels, marking them `Candidate`.
///
/// Returns the number of pixels marked.
pub fn trace(field: &mut GradientField, seeds: &[usize]) -> usize {
    let mut stack: Vec<usize> = Vec::with_capacity(seeds.len() * 2);
    let mut linked = 0;

    for &seed in seeds {
        stack.push(seed);
        while let Some(i) = stack.pop() {
            let (x, y) = field.position(i);
            for (dx, dy) in NEIGHBORS_8 {
                let Some(n) = field.offset(x, y, dx, dy) else {
                    continue;
                };
                let state = &mut field.cells_mut()[n].state;
                if *state == HysteresisState::Unvisited {
                    state.advance(HysteresisState::Candidate);
                    linked += 1;
                    stack.push(n);
                }
            }
        }
    }
    linked
}

/// Renders the between-thresholds and combined artifacts, then folds every
/// non-terminal state.
///
/// Returns `(between, combined)`.
pub fn finalize(field: &mut GradientField, policy: CandidatePolicy) -> (Grid, Grid) {
    let between = field.render(|c| {
        binary(matches!(
            c.state,
            HysteresisState::Candidate | HysteresisState::Unvisited
        ))
    });
    let linked_value = match policy {
        CandidatePolicy::Promote => EDGE_VALUE,
        CandidatePolicy::Mark => MARKED_VALUE,
    };
    let combined = field.render(|c| match c.state {
        HysteresisState::StrongEdge => EDGE_VALUE,
        HysteresisState::Candidate => linked_value,
        _ => 0.0,
    });

    field.cells_mut().par_iter_mut().for_each(|cell| match cell.state {
        HysteresisState::Unvisited => cell.state.advance(HysteresisState::Background),
        HysteresisState::Candidate => cell.state.advance(HysteresisState::StrongEdge),
        _ => {}
    });

    (between, combined)
}

#[inline]
fn binary(set: bool) -> f32 {
    if set {
        EDGE_VALUE
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_from(strengths: &[f32], width: u32) -> GradientField {
        let height = strengths.len() as u32 / width;
        let mut field = GradientField::new(width, height);
        for (cell, &s) in field.cells_mut().iter_mut().zip(strengths) {
            cell.strength = s;
            cell.normalized_strength = s;
        }
        field
    }

    fn states(field: &GradientField) -> Vec<HysteresisState> {
        field.cells().iter().map(|c| c.state).collect()
    }

    #[test]
    fn classify_leaves_between_and_suppressed_pixels_alone() {
        let mut field = field_from(&[0.05, 0.2, 0.9, 0.95], 4);
        field.cells_mut()[3].state = HysteresisState::Background;
        let seeds = classify(&mut field, 0.1, 0.3);
        use HysteresisState::*;
        assert_eq!(seeds, vec![2]);
        assert_eq!(states(&field), vec![Background, Unvisited, StrongEdge, Background]);
    }

    #[test]
    fn thresholds_are_exclusive() {
        let mut field = field_from(&[0.25, 0.75], 2);
        let seeds = classify(&mut field, 0.25, 0.75);
        assert!(seeds.is_empty());
        assert!(states(&field)
            .iter()
            .all(|&s| s == HysteresisState::Unvisited));
    }

    #[test]
    fn flood_follows_diagonal_chains_and_stops_at_background() {
        #[rustfmt::skip]
        let strengths = [
            0.9, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.2, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.2, 0.0, 0.2,
            0.0, 0.0, 0.0, 0.0, 0.2,
        ];
        let mut field = field_from(&strengths, 5);
        let out = hysteresis(&mut field, 0.1, 0.5, CandidatePolicy::Promote);

        for (x, y) in [(0, 0), (1, 1), (2, 2)] {
            assert_eq!(field.get(x, y).state, HysteresisState::StrongEdge);
            assert_eq!(out.combined.get_pixel(x, y)[0], EDGE_VALUE);
        }
        // Separated from the chain by a background column.
        for (x, y) in [(4, 2), (4, 3)] {
            assert_eq!(field.get(x, y).state, HysteresisState::Background);
            assert_eq!(out.combined.get_pixel(x, y)[0], 0.0);
            assert_eq!(out.between.get_pixel(x, y)[0], EDGE_VALUE);
        }
        assert_eq!(out.strong.get_pixel(0, 0)[0], EDGE_VALUE);
        assert_eq!(out.strong.get_pixel(1, 1)[0], 0.0);
        assert_eq!(out.between.get_pixel(1, 1)[0], EDGE_VALUE);
        assert_eq!(out.between.get_pixel(0, 0)[0], 0.0);
    }

    #[test]
    fn isolated_between_pixel_ends_as_background() {
        let mut strengths = [0.0f32; 25];
        strengths[12] = 0.5;
        let mut field = field_from(&strengths, 5);
        let out = hysteresis(&mut field, 0.1, 0.8, CandidatePolicy::Promote);

        assert_eq!(field.get(2, 2).state, HysteresisState::Background);
        assert_eq!(out.between.get_pixel(2, 2)[0], EDGE_VALUE);
        assert_eq!(out.strong.get_pixel(2, 2)[0], 0.0);
        assert_eq!(out.combined.get_pixel(2, 2)[0], 0.0);
    }

    #[test]
    fn candidate_policy_controls_linked_encoding() {
        let strengths = [0.9, 0.2, 0.2, 0.0];
        let mut promote = field_from(&strengths, 4);
        let promoted = hysteresis(&mut promote, 0.1, 0.5, CandidatePolicy::Promote);
        assert_eq!(
            promoted.combined.as_raw(),
            &vec![EDGE_VALUE, EDGE_VALUE, EDGE_VALUE, 0.0]
        );

        let mut mark = field_from(&strengths, 4);
        let marked = hysteresis(&mut mark, 0.1, 0.5, CandidatePolicy::Mark);
        assert_eq!(
            marked.combined.as_raw(),
            &vec![EDGE_VALUE, MARKED_VALUE, MARKED_VALUE, 0.0]
        );

        // Both policies leave the same terminal states behind.
        assert_eq!(states(&promote), states(&mark));
    }

    #[test]
    fn finalize_leaves_only_terminal_states() {
        let strengths: Vec<f32> = (0..64).map(|i| ((i * 37) % 100) as f32 / 100.0).collect();
        let mut field = field_from(&strengths, 8);
        hysteresis(&mut field, 0.3, 0.7, CandidatePolicy::Promote);
        assert!(field.cells().iter().all(|c| c.state.is_terminal()));
        assert_eq!(field.count_state(HysteresisState::Candidate), 0);
        assert_eq!(field.count_state(HysteresisState::Unvisited), 0);
    }

    #[test]
    fn large_connected_region_does_not_exhaust_the_stack() {
        let (w, h) = (600u32, 600u32);
        let mut strengths = vec![0.2f32; (w * h) as usize];
        strengths[0] = 1.0;
        let mut field = field_from(&strengths, w);
        let out = hysteresis(&mut field, 0.1, 0.5, CandidatePolicy::Promote);
        assert_eq!(field.count_state(HysteresisState::StrongEdge), (w * h) as usize);
        assert_eq!(out.combined.get_pixel(w - 1, h - 1)[0], EDGE_VALUE);
    }
}
