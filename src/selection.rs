use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::DrawError;
use crate::roster::Student;

/// Decides, once, which roster members win. Validation order matters:
/// a too-small roster is reported before an oversized request, so a
/// roster of one always answers `InsufficientRoster` whatever was asked.
///
/// The winners are fixed here, before any animation frame renders; the
/// rolling display only ever flashes candidates, it never re-draws.
pub fn winner_indices_with_rng<R: Rng + ?Sized>(
    roster: &[Student],
    requested: usize,
    rng: &mut R,
) -> Result<Vec<usize>, DrawError> {
    if roster.len() < 2 {
        return Err(DrawError::InsufficientRoster {
            available: roster.len(),
        });
    }
    if requested > roster.len() {
        return Err(DrawError::OverRequested {
            requested,
            available: roster.len(),
        });
    }

    // Fisher-Yates over index space, then slice. Winner order is display
    // order (which card reveals whom), not a ranking.
    let mut order: Vec<usize> = (0..roster.len()).collect();
    order.shuffle(rng);
    order.truncate(requested);
    Ok(order)
}

pub fn draw_winners_with_rng<R: Rng + ?Sized>(
    roster: &[Student],
    requested: usize,
    rng: &mut R,
) -> Result<Vec<Student>, DrawError> {
    winner_indices_with_rng(roster, requested, rng)
        .map(|order| order.into_iter().map(|i| roster[i].clone()).collect())
}

/// Draw with thread-local entropy; distinct calls are independent draws.
pub fn draw_winners(roster: &[Student], requested: usize) -> Result<Vec<Student>, DrawError> {
    draw_winners_with_rng(roster, requested, &mut rand::rng())
}
