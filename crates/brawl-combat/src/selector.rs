//! Move selection.
//!
//! Picks the move for an attack from the grounded state, the input strength,
//! the current combo index and the air aim. Selection is a pure function of
//! its inputs.

use crate::moves::{AirAim, AttackStrength, Move, MoveFamily, MoveTable};

/// A selected move together with where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection<'a> {
    /// Family the move was drawn from.
    pub family: MoveFamily,
    /// Index within the family, after clamping.
    pub index: usize,
    /// The move itself.
    pub mv: &'a Move,
}

/// Resolve the move for an attack.
///
/// - grounded light/heavy: indexed by `combo_index` (clamped)
/// - airborne light: always the single regular air move
/// - airborne heavy: chosen by `aim` alone, combo index ignored
#[must_use]
pub fn select_move(
    table: &MoveTable,
    grounded: bool,
    strength: AttackStrength,
    combo_index: usize,
    aim: AirAim,
) -> Selection<'_> {
    let (family, index) = match (grounded, strength) {
        (true, AttackStrength::Light) => (MoveFamily::RegularGrounded, combo_index),
        (true, AttackStrength::Heavy) => (MoveFamily::HeavyGrounded, combo_index),
        (false, AttackStrength::Light) => (MoveFamily::RegularAir, 0),
        (false, AttackStrength::Heavy) => (aim.heavy_family(), 0),
    };

    let index = table.clamp_index(family, index);
    Selection {
        family,
        index,
        mv: table.lookup(family, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grounded_light_follows_combo() {
        let table = MoveTable::standard();
        for i in 0..3 {
            let sel = select_move(&table, true, AttackStrength::Light, i, AirAim::Neutral);
            assert_eq!(sel.family, MoveFamily::RegularGrounded);
            assert_eq!(sel.index, i);
            assert!(std::ptr::eq(
                sel.mv,
                table.lookup(MoveFamily::RegularGrounded, i)
            ));
        }
    }

    #[test]
    fn test_grounded_heavy_clamps() {
        let table = MoveTable::standard();
        let sel = select_move(&table, true, AttackStrength::Heavy, 9, AirAim::Up);
        assert_eq!(sel.family, MoveFamily::HeavyGrounded);
        assert_eq!(sel.index, 2);
        assert_eq!(sel.mv.damage(), 40.0);
    }

    #[test]
    fn test_air_light_ignores_combo_and_aim() {
        let table = MoveTable::standard();
        let a = select_move(&table, false, AttackStrength::Light, 2, AirAim::Down);
        let b = select_move(&table, false, AttackStrength::Light, 0, AirAim::Up);
        assert_eq!(a, b);
        assert_eq!(a.family, MoveFamily::RegularAir);
    }

    #[test]
    fn test_air_heavy_by_aim_only() {
        let table = MoveTable::standard();
        let cases = [
            (AirAim::Up, MoveFamily::HeavyAirUp),
            (AirAim::Neutral, MoveFamily::HeavyAirNeutral),
            (AirAim::Down, MoveFamily::HeavyAirDown),
        ];
        for (aim, family) in cases {
            for combo in 0..4 {
                let sel = select_move(&table, false, AttackStrength::Heavy, combo, aim);
                assert_eq!(sel.family, family);
                assert_eq!(sel.index, 0);
            }
        }
    }
}
