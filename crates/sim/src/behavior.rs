//! Material behavior classifiers, reactions, and state transitions.
//!
//! A capability bitmask per material drives the generic parts of the stages;
//! reaction and transition records describe what materials turn into.

use crate::material::{Material, MAT_COUNT};

/// Bitmask of material capabilities.
pub type BehaviorFlags = u32;

// Movement behaviors.
pub const BHV_NONE: BehaviorFlags = 0x0000_0000;
pub const BHV_FALLS: BehaviorFlags = 0x0000_0001;
pub const BHV_RISES: BehaviorFlags = 0x0000_0002;
pub const BHV_FLOWS: BehaviorFlags = 0x0000_0004;
pub const BHV_SLIDES: BehaviorFlags = 0x0000_0008;
pub const BHV_STATIC: BehaviorFlags = 0x0000_0010;

// Interaction behaviors.
pub const BHV_FLAMMABLE: BehaviorFlags = 0x0000_0100;
pub const BHV_CONDUCTS_HEAT: BehaviorFlags = 0x0000_0200;
pub const BHV_CORRODIBLE: BehaviorFlags = 0x0000_0400;
pub const BHV_CORROSIVE: BehaviorFlags = 0x0000_0800;
pub const BHV_EXTINGUISHES: BehaviorFlags = 0x0000_1000;

// State change behaviors.
pub const BHV_MELTS: BehaviorFlags = 0x0001_0000;
pub const BHV_FREEZES: BehaviorFlags = 0x0002_0000;
pub const BHV_BOILS: BehaviorFlags = 0x0004_0000;
pub const BHV_CONDENSES: BehaviorFlags = 0x0008_0000;
pub const BHV_BURNS_OUT: BehaviorFlags = 0x0010_0000;

// Lifetime behaviors.
pub const BHV_DISSIPATES: BehaviorFlags = 0x0100_0000;
pub const BHV_SPREADS: BehaviorFlags = 0x0200_0000;
pub const BHV_PRODUCES_SMOKE: BehaviorFlags = 0x0400_0000;
pub const BHV_PRODUCES_HEAT: BehaviorFlags = 0x0800_0000;

const BEHAVIOR_TABLE: [BehaviorFlags; MAT_COUNT] = [
    // Empty
    BHV_NONE,
    // Sand
    BHV_FALLS | BHV_SLIDES | BHV_CONDUCTS_HEAT,
    // Stone
    BHV_STATIC | BHV_CONDUCTS_HEAT | BHV_CORRODIBLE,
    // Water
    BHV_FALLS | BHV_FLOWS | BHV_CONDUCTS_HEAT | BHV_FREEZES | BHV_BOILS | BHV_EXTINGUISHES,
    // Wood
    BHV_STATIC | BHV_FLAMMABLE | BHV_CONDUCTS_HEAT | BHV_CORRODIBLE,
    // Fire
    BHV_RISES | BHV_SPREADS | BHV_PRODUCES_SMOKE | BHV_PRODUCES_HEAT | BHV_BURNS_OUT,
    // Smoke
    BHV_RISES | BHV_FLOWS | BHV_DISSIPATES,
    // Soil
    BHV_FALLS | BHV_SLIDES | BHV_CONDUCTS_HEAT | BHV_CORRODIBLE,
    // Ice
    BHV_STATIC | BHV_CONDUCTS_HEAT | BHV_MELTS | BHV_EXTINGUISHES,
    // Steam
    BHV_RISES | BHV_FLOWS | BHV_CONDENSES | BHV_DISSIPATES,
    // Ash
    BHV_FALLS | BHV_SLIDES | BHV_CONDUCTS_HEAT,
    // Acid
    BHV_FALLS | BHV_FLOWS | BHV_CORROSIVE | BHV_CONDUCTS_HEAT,
];

/// Full capability mask for a material.
#[inline]
pub fn behavior(mat: Material) -> BehaviorFlags {
    BEHAVIOR_TABLE[mat as usize]
}

/// Check a single capability bit.
#[inline]
pub fn has_behavior(mat: Material, flag: BehaviorFlags) -> bool {
    behavior(mat) & flag != 0
}

// Movement queries.
#[inline]
pub fn falls(mat: Material) -> bool {
    has_behavior(mat, BHV_FALLS)
}
#[inline]
pub fn rises(mat: Material) -> bool {
    has_behavior(mat, BHV_RISES)
}
#[inline]
pub fn flows(mat: Material) -> bool {
    has_behavior(mat, BHV_FLOWS)
}
#[inline]
pub fn slides(mat: Material) -> bool {
    has_behavior(mat, BHV_SLIDES)
}
#[inline]
pub fn is_static(mat: Material) -> bool {
    has_behavior(mat, BHV_STATIC)
}

// Interaction queries.
#[inline]
pub fn is_flammable(mat: Material) -> bool {
    has_behavior(mat, BHV_FLAMMABLE)
}
#[inline]
pub fn conducts_heat(mat: Material) -> bool {
    has_behavior(mat, BHV_CONDUCTS_HEAT)
}
#[inline]
pub fn is_corrodible(mat: Material) -> bool {
    has_behavior(mat, BHV_CORRODIBLE)
}
#[inline]
pub fn is_corrosive(mat: Material) -> bool {
    has_behavior(mat, BHV_CORROSIVE)
}
#[inline]
pub fn extinguishes(mat: Material) -> bool {
    has_behavior(mat, BHV_EXTINGUISHES)
}

// State change queries.
#[inline]
pub fn can_melt(mat: Material) -> bool {
    has_behavior(mat, BHV_MELTS)
}
#[inline]
pub fn can_freeze(mat: Material) -> bool {
    has_behavior(mat, BHV_FREEZES)
}
#[inline]
pub fn can_boil(mat: Material) -> bool {
    has_behavior(mat, BHV_BOILS)
}
#[inline]
pub fn can_condense(mat: Material) -> bool {
    has_behavior(mat, BHV_CONDENSES)
}

// Lifetime queries.
#[inline]
pub fn dissipates(mat: Material) -> bool {
    has_behavior(mat, BHV_DISSIPATES)
}
#[inline]
pub fn spreads(mat: Material) -> bool {
    has_behavior(mat, BHV_SPREADS)
}
#[inline]
pub fn produces_smoke(mat: Material) -> bool {
    has_behavior(mat, BHV_PRODUCES_SMOKE)
}
#[inline]
pub fn produces_heat(mat: Material) -> bool {
    has_behavior(mat, BHV_PRODUCES_HEAT)
}

/// What a material becomes once a threshold is crossed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateTransition {
    pub result: Material,
    pub threshold: f32,
    pub probability: f32,
}

const NO_TRANSITION: StateTransition = StateTransition {
    result: Material::Empty,
    threshold: 9999.0,
    probability: 0.0,
};

pub fn melt_transition(mat: Material) -> StateTransition {
    match mat {
        Material::Ice => StateTransition {
            result: Material::Water,
            threshold: 0.0,
            probability: 0.01,
        },
        _ => NO_TRANSITION,
    }
}

pub fn freeze_transition(mat: Material) -> StateTransition {
    match mat {
        Material::Water => StateTransition {
            result: Material::Ice,
            threshold: 0.0,
            probability: 0.005,
        },
        _ => StateTransition {
            threshold: -9999.0,
            ..NO_TRANSITION
        },
    }
}

pub fn boil_transition(mat: Material) -> StateTransition {
    match mat {
        Material::Water => StateTransition {
            result: Material::Steam,
            threshold: 100.0,
            probability: 0.02,
        },
        _ => NO_TRANSITION,
    }
}

pub fn condense_transition(mat: Material) -> StateTransition {
    match mat {
        Material::Steam => StateTransition {
            result: Material::Water,
            threshold: 80.0,
            probability: 0.01,
        },
        _ => StateTransition {
            threshold: -9999.0,
            ..NO_TRANSITION
        },
    }
}

/// Ignition transition, kept for ignition-by-temperature logic.
pub fn burn_transition(mat: Material) -> StateTransition {
    match mat {
        Material::Wood => StateTransition {
            result: Material::Fire,
            threshold: 300.0,
            probability: 0.03,
        },
        _ => NO_TRANSITION,
    }
}

/// What a dying fire cell leaves behind.
#[derive(Clone, Copy, Debug)]
pub struct FireDeathProducts {
    pub ash: Material,
    pub smoke: Material,
    pub ash_chance: f32,
    pub smoke_chance: f32,
}

pub const fn fire_death_products() -> FireDeathProducts {
    FireDeathProducts {
        ash: Material::Ash,
        smoke: Material::Smoke,
        ash_chance: 0.3,
        smoke_chance: 0.5,
    }
}

/// An interaction between a source cell and a neighboring target.
#[derive(Clone, Copy, Debug)]
pub struct ReactionRule {
    pub target: Material,
    pub result_self: Material,
    pub result_target: Material,
    pub probability: f32,
    pub byproduct: Material,
    pub byproduct_chance: f32,
}

const NO_REACTION: ReactionRule = ReactionRule {
    target: Material::Empty,
    result_self: Material::Empty,
    result_target: Material::Empty,
    probability: 0.0,
    byproduct: Material::Empty,
    byproduct_chance: 0.0,
};

/// Corrosion of a corrodible target by acid. The acid itself is consumed
/// with an independent 50% roll per successful reaction.
pub fn corrosion_reaction(target: Material) -> ReactionRule {
    if !is_corrodible(target) {
        return NO_REACTION;
    }
    ReactionRule {
        target,
        result_self: Material::Empty,
        result_target: Material::Empty,
        probability: 0.08,
        byproduct: Material::Smoke,
        byproduct_chance: 0.5,
    }
}

/// Fire igniting a flammable neighbor.
pub fn fire_spread_reaction(target: Material) -> ReactionRule {
    if !is_flammable(target) {
        return NO_REACTION;
    }
    ReactionRule {
        target,
        result_self: Material::Fire,
        result_target: Material::Fire,
        probability: 0.03,
        byproduct: Material::Empty,
        byproduct_chance: 0.0,
    }
}

/// Water or ice putting out fire. Defined as table data; no stage currently
/// invokes it.
pub fn extinguish_reaction(source: Material) -> ReactionRule {
    if !extinguishes(source) {
        return NO_REACTION;
    }
    ReactionRule {
        target: Material::Fire,
        result_self: if source == Material::Water {
            Material::Steam
        } else {
            source
        },
        result_target: Material::Smoke,
        probability: 0.5,
        byproduct: Material::Steam,
        byproduct_chance: 0.3,
    }
}

/// Movement attempt order per material class. Left/right ties at the same
/// priority are broken by one RNG bit in the stages.
pub const POWDER_MOVE_PRIORITY: [(i32, i32); 3] = [(0, 1), (-1, 1), (1, 1)];
pub const FLUID_MOVE_PRIORITY: [(i32, i32); 5] = [(0, 1), (-1, 0), (1, 0), (-1, 1), (1, 1)];
pub const GAS_MOVE_PRIORITY: [(i32, i32); 5] = [(0, -1), (-1, -1), (1, -1), (-1, 0), (1, 0)];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_bits_match_catalog() {
        assert!(falls(Material::Sand) && slides(Material::Sand));
        assert!(!flows(Material::Sand));

        assert!(flows(Material::Water) && can_freeze(Material::Water));
        assert!(extinguishes(Material::Water));

        assert!(is_static(Material::Stone) && is_corrodible(Material::Stone));
        assert!(is_flammable(Material::Wood));
        assert!(!is_flammable(Material::Stone));

        assert!(rises(Material::Fire) && produces_heat(Material::Fire));
        assert!(dissipates(Material::Smoke));
        assert!(can_condense(Material::Steam));
        assert!(is_corrosive(Material::Acid));
        assert_eq!(behavior(Material::Empty), BHV_NONE);
    }

    #[test]
    fn corrosion_rule_only_applies_to_corrodible() {
        let rule = corrosion_reaction(Material::Stone);
        assert_eq!(rule.probability, 0.08);
        assert_eq!(rule.byproduct, Material::Smoke);

        let none = corrosion_reaction(Material::Water);
        assert_eq!(none.probability, 0.0);
    }

    #[test]
    fn extinguish_rule_is_data_only() {
        let water = extinguish_reaction(Material::Water);
        assert_eq!(water.result_self, Material::Steam);
        assert_eq!(water.result_target, Material::Smoke);

        let ice = extinguish_reaction(Material::Ice);
        assert_eq!(ice.result_self, Material::Ice);

        let sand = extinguish_reaction(Material::Sand);
        assert_eq!(sand.probability, 0.0);
    }

    #[test]
    fn fire_death_products_cover_the_unit_interval() {
        let death = fire_death_products();
        // 30% ash, 50% smoke, remaining 20% empty.
        assert!(death.ash_chance + death.smoke_chance < 1.0);
        assert_eq!(death.ash, Material::Ash);
        assert_eq!(death.smoke, Material::Smoke);
    }

    #[test]
    fn transitions_pair_up() {
        assert_eq!(melt_transition(Material::Ice).result, Material::Water);
        assert_eq!(freeze_transition(Material::Water).result, Material::Ice);
        assert_eq!(boil_transition(Material::Water).result, Material::Steam);
        assert_eq!(condense_transition(Material::Steam).result, Material::Water);
        assert_eq!(burn_transition(Material::Wood).result, Material::Fire);
        assert_eq!(melt_transition(Material::Sand).probability, 0.0);
    }
}
