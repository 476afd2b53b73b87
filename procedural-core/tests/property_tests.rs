//! Property-based tests using proptest
//!
//! Tests invariants that must hold for ALL inputs:
//! - Partition: leaves conserve volume and respect the minimum edge
//! - Partition/solver/pipeline: same seed → identical output
//! - Solver: complete runs have zero adjacency violations
//! - Solver: possibility sets never grow during a run

use proptest::prelude::*;

use mapgen_core::generation::bsp::{build, flatten, validate, PartitionConfig};
use mapgen_core::generation::wfc::{
    adjacency_violations, initialize_grid, run_to_completion, step, StepOutcome,
};
use mapgen_core::{
    Direction, Distribution, MapDimensions, MapGenConfig, MapGenerator, SectorGraph, SeededRng,
    TileCatalog, TileDefinition, WfcConfig,
};

fn dungeon_catalog() -> TileCatalog {
    TileCatalog::new(vec![
        TileDefinition::new("floor", "ground")
            .with_weight(2.0)
            .allow_planar(&["floor", "door"]),
        TileDefinition::new("wall", "structure").allow_planar(&["wall", "door"]),
        TileDefinition::new("door", "structure")
            .with_weight(0.5)
            .allow_planar(&["floor", "wall"]),
    ])
    .unwrap()
}

/// Stacked columns: ground only rests on ground, air only sits under air.
/// Rules are declared from both sides, so every run completes.
fn layered_catalog() -> TileCatalog {
    TileCatalog::new(vec![
        TileDefinition::new("ground", "solid")
            .with_weight(2.0)
            .allow(Direction::Up, &["ground", "air"])
            .allow(Direction::Down, &["ground"]),
        TileDefinition::new("air", "empty")
            .allow(Direction::Up, &["air"])
            .allow(Direction::Down, &["ground", "air"]),
    ])
    .unwrap()
}

// ============================================================
// Partition Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_partition_conserves_volume(
        width in 1u32..=80,
        height in 1u32..=80,
        depth in 1u32..=8,
        max_depth in 0u32..=7,
        min_edge in 1u32..=10,
        seed in "[a-z0-9]{1,12}",
    ) {
        let config = PartitionConfig::new(width, height, depth, max_depth, min_edge).unwrap();
        let tree = build(&config, &mut SeededRng::from_seed_str(&seed));
        let sectors = flatten(&tree);

        let volume: u64 = sectors.iter().map(|s| s.bounds.volume()).sum();
        prop_assert_eq!(volume, width as u64 * height as u64 * depth as u64);
        prop_assert!(sectors.len() <= 1usize << max_depth);
        prop_assert!(SectorGraph::build(&sectors).is_connected());
    }

    #[test]
    fn prop_partition_respects_min_edge(
        width in 1u32..=80,
        height in 1u32..=80,
        depth in 1u32..=8,
        max_depth in 0u32..=7,
        min_edge in 1u32..=10,
        seed in "[a-z0-9]{1,12}",
    ) {
        let config = PartitionConfig::new(width, height, depth, max_depth, min_edge).unwrap();
        let sectors = flatten(&build(&config, &mut SeededRng::from_seed_str(&seed)));

        for sector in &sectors {
            let b = sector.bounds;
            // An axis too short to split keeps its full extent
            prop_assert!(b.width >= min_edge || b.width == width);
            prop_assert!(b.height >= min_edge || b.height == height);
            prop_assert!(b.depth >= min_edge || b.depth == depth);
        }
        if width >= min_edge && height >= min_edge && (depth <= 1 || depth >= min_edge) {
            prop_assert!(validate(&sectors, min_edge));
        }
    }

    #[test]
    fn prop_partition_is_deterministic(seed in "[a-z0-9]{1,12}", max_depth in 0u32..=6) {
        let config = PartitionConfig::new(64, 48, 6, max_depth, 4).unwrap();
        let a = build(&config, &mut SeededRng::from_seed_str(&seed));
        let b = build(&config, &mut SeededRng::from_seed_str(&seed));
        prop_assert_eq!(flatten(&a), flatten(&b));
    }
}

// ============================================================
// Solver Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_complete_runs_satisfy_adjacency(
        width in 1u32..=6,
        height in 1u32..=6,
        seed in "[a-z0-9]{1,12}",
    ) {
        let config = WfcConfig::new(width, height, 1, dungeon_catalog(), Distribution::Weighted).unwrap();
        let result = run_to_completion(&config, &mut SeededRng::from_seed_str(&seed));
        if result.is_complete() {
            prop_assert_eq!(result.tiles.len(), (width * height) as usize);
            prop_assert!(adjacency_violations(&result.tiles, config.tiles()).is_empty());
        } else {
            prop_assert!(result.contradiction.is_some());
            prop_assert!(result.tiles.len() < (width * height) as usize);
        }
    }

    #[test]
    fn prop_layered_catalog_always_completes(
        width in 1u32..=4,
        height in 1u32..=4,
        depth in 1u32..=5,
        seed in "[a-z0-9]{1,12}",
    ) {
        let config = WfcConfig::new(width, height, depth, layered_catalog(), Distribution::Uniform).unwrap();
        let result = run_to_completion(&config, &mut SeededRng::from_seed_str(&seed));
        prop_assert!(result.is_complete());
        prop_assert!(adjacency_violations(&result.tiles, config.tiles()).is_empty());
    }

    #[test]
    fn prop_solver_is_deterministic(seed in "[a-z0-9]{1,12}") {
        let config = WfcConfig::new(5, 5, 2, dungeon_catalog(), Distribution::Weighted).unwrap();
        let a = run_to_completion(&config, &mut SeededRng::from_seed_str(&seed));
        let b = run_to_completion(&config, &mut SeededRng::from_seed_str(&seed));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_possibility_sets_never_grow(seed in "[a-z0-9]{1,12}") {
        let config = WfcConfig::new(4, 4, 2, dungeon_catalog(), Distribution::Weighted).unwrap();
        let mut grid = initialize_grid(&config);
        let mut rng = SeededRng::from_seed_str(&seed);
        let mut previous = grid.possibility_counts();

        while let Ok(StepOutcome::Collapsed(_)) = step(&mut grid, config.tiles(), &mut rng) {
            let counts = grid.possibility_counts();
            for (now, before) in counts.iter().zip(&previous) {
                prop_assert!(now <= before);
            }
            for cell in grid.cells() {
                prop_assert_eq!(cell.entropy() == 0.0, cell.possible().len() <= 1);
            }
            previous = counts;
        }
    }
}

// ============================================================
// Pipeline Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_pipeline_is_deterministic(seed in "[a-z0-9]{1,12}") {
        let config = MapGenConfig {
            dimensions: MapDimensions { width: 10, height: 8, depth: 2 },
            ..MapGenConfig::default()
        };
        let generator = MapGenerator::new(config, layered_catalog()).unwrap();
        let a = generator.generate(&seed);
        let b = generator.generate(&seed);
        prop_assert_eq!(&a.sectors, &b.sectors);
        prop_assert_eq!(&a.tiles, &b.tiles);
        prop_assert_eq!(&a.id, &b.id);
    }
}
