//! Non-maximum suppression along the quantized gradient direction.

use rayon::prelude::*;

use crate::field::{GradientField, HysteresisState};
use crate::grid::Grid;

/// Thins edges by marking every pixel that is strictly weaker than one of its
/// two neighbours along the gradient as `Background`.
///
/// Neighbours outside the field are skipped and never cause suppression.
/// Decisions are taken against the strengths as they were on entry, so the
/// outcome does not depend on visiting order. Returns the `suppressed`
/// artifact: normalized strength scaled to `[0, 255]` for retained pixels,
/// 0 for suppressed ones.
pub fn non_maximum_suppression(field: &mut GradientField) -> Grid {
    let (width, height) = field.dimensions();
    let snapshot: &GradientField = field;
    let suppressed: Vec<bool> = (0..width as usize * height as usize)
        .into_par_iter()
        .map(|i| {
            let (x, y) = snapshot.position(i);
            let cell = &snapshot.cells()[i];
            cell.direction
                .neighbor_offsets()
                .iter()
                .filter_map(|&(dx, dy)| snapshot.offset(x, y, dx, dy))
                .any(|n| cell.strength < snapshot.cells()[n].strength)
        })
        .collect();

    field
        .cells_mut()
        .par_iter_mut()
        .zip(suppressed.par_iter())
        .filter(|(cell, s)| **s && cell.state == HysteresisState::Unvisited)
        .for_each(|(cell, _)| cell.state.advance(HysteresisState::Background));

    debug!(
        "non-maximum suppression ok, suppressed {} of {}",
        suppressed.iter().filter(|&&s| s).count(),
        suppressed.len()
    );

    field.render(|c| match c.state {
        HysteresisState::Background => 0.0,
        _ => c.normalized_strength * 255.0,
    })
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Luma};

    use super::*;
    use crate::field::Direction;
    use crate::gradient::{compute_gradient_field, strength_normalized_grid};
    use crate::params::BorderMode;

    fn field_from(strengths: &[f32], width: u32, direction: Direction) -> GradientField {
        let height = strengths.len() as u32 / width;
        let mut field = GradientField::new(width, height);
        for (cell, &s) in field.cells_mut().iter_mut().zip(strengths) {
            cell.strength = s;
            cell.normalized_strength = s;
            cell.direction = direction;
        }
        field
    }

    #[test]
    fn keeps_only_the_ridge_across_columns() {
        let mut field = field_from(&[0.2, 0.5, 1.0, 0.4, 0.6], 5, Direction::Deg90);
        let out = non_maximum_suppression(&mut field);
        let states: Vec<_> = field.cells().iter().map(|c| c.state).collect();
        use HysteresisState::*;
        // The rightmost pixel only has its left neighbour, which is weaker.
        assert_eq!(states, vec![Background, Background, Unvisited, Background, Unvisited]);
        assert_eq!(out.get_pixel(2, 0)[0], 255.0);
        assert_eq!(out.get_pixel(1, 0)[0], 0.0);
    }

    #[test]
    fn direction_selects_the_compared_neighbours() {
        // A 3x3 field with a weak center. Only the 0° neighbours (above and
        // below) are stronger than it.
        #[rustfmt::skip]
        let strengths = [
            0.0, 0.9, 0.0,
            0.0, 0.5, 0.0,
            0.0, 0.9, 0.0,
        ];
        for (direction, suppressed) in [
            (Direction::Deg0, true),
            (Direction::Deg45, false),
            (Direction::Deg90, false),
            (Direction::Deg135, false),
        ] {
            let mut field = field_from(&strengths, 3, direction);
            non_maximum_suppression(&mut field);
            assert_eq!(
                field.get(1, 1).state == HysteresisState::Background,
                suppressed,
                "{direction:?}"
            );
        }
    }

    #[test]
    fn diagonal_neighbours_match_their_bins() {
        #[rustfmt::skip]
        let main_diagonal = [
            0.9, 0.0, 0.0,
            0.0, 0.5, 0.0,
            0.0, 0.0, 0.0,
        ];
        let mut field = field_from(&main_diagonal, 3, Direction::Deg45);
        non_maximum_suppression(&mut field);
        assert_eq!(field.get(1, 1).state, HysteresisState::Background);

        #[rustfmt::skip]
        let anti_diagonal = [
            0.0, 0.0, 0.9,
            0.0, 0.5, 0.0,
            0.0, 0.0, 0.0,
        ];
        let mut field = field_from(&anti_diagonal, 3, Direction::Deg135);
        non_maximum_suppression(&mut field);
        assert_eq!(field.get(1, 1).state, HysteresisState::Background);

        let mut field = field_from(&anti_diagonal, 3, Direction::Deg45);
        non_maximum_suppression(&mut field);
        assert_eq!(field.get(1, 1).state, HysteresisState::Unvisited);
    }

    #[test]
    fn equal_neighbours_do_not_suppress() {
        let mut field = field_from(&[0.7, 0.7, 0.7], 3, Direction::Deg90);
        non_maximum_suppression(&mut field);
        assert!(field
            .cells()
            .iter()
            .all(|c| c.state == HysteresisState::Unvisited));
    }

    #[test]
    fn never_increases_magnitude() {
        let image = ImageBuffer::from_fn(17, 12, |x, y| {
            Luma([((x * x + 3 * y * x + 7 * y) % 211) as f32])
        });
        let mut field = compute_gradient_field(&image, BorderMode::Replicate).unwrap();
        let before = strength_normalized_grid(&field);
        let after = non_maximum_suppression(&mut field);
        for (b, a) in before.pixels().zip(after.pixels()) {
            assert!(a[0] <= b[0]);
        }
        for y in 0..field.height() {
            for x in 0..field.width() {
                let cell = field.get(x, y);
                let weaker = cell
                    .direction
                    .neighbor_offsets()
                    .iter()
                    .filter_map(|&(dx, dy)| field.offset(x, y, dx, dy))
                    .any(|n| cell.strength < field.cells()[n].strength);
                if weaker {
                    assert_eq!(after.get_pixel(x, y)[0], 0.0);
                    assert_eq!(cell.state, HysteresisState::Background);
                }
            }
        }
    }
}
