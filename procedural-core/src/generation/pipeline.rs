//! Map assembly: partition, solve, attach tiles to sectors, wrap the result
//! in a `GeneratedMap`.
//!
//! One seed string drives one `SeededRng`; the partitioner draws from it
//! first and the solver continues the same stream. Retries re-seed with
//! `"<seed>#<attempt>"`.

use rayon::prelude::*;
use sha3::{Digest, Sha3_256};

use super::bsp::{self, PartitionConfig};
use super::wfc::{self, WfcConfig};
use super::MapSeed;
use crate::config::MapGenConfig;
use crate::constants::{ENGINE_VERSION, MAP_FORMAT_VERSION};
use crate::error::{ConfigurationError, GenerationError};
use crate::logging::TimingSpan;
use crate::model::{Sector, TileCatalog, TileInstance};
use crate::serialization::{GeneratedMap, MapMetadata, MapStats};

/// Validated generator; cheap to share across threads
#[derive(Debug, Clone)]
pub struct MapGenerator {
    config: MapGenConfig,
    partition: PartitionConfig,
    solver: WfcConfig,
}

impl MapGenerator {
    pub fn new(config: MapGenConfig, catalog: TileCatalog) -> Result<Self, ConfigurationError> {
        let partition = config.partition_config()?;
        let solver = config.wfc_config(catalog)?;
        Ok(Self {
            config,
            partition,
            solver,
        })
    }

    pub fn config(&self) -> &MapGenConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TileCatalog {
        self.solver.tiles()
    }

    /// Single attempt. A contradiction still yields a map holding the
    /// partial tile list, with `status = contradiction`.
    pub fn generate(&self, seed: &str) -> GeneratedMap {
        self.generate_attempt(&MapSeed::new(seed), 1)
    }

    /// Retry with derived seeds until a run completes or the configured
    /// attempt bound is reached (at least one attempt is always made).
    pub fn generate_until_complete(&self, seed: &str) -> Result<GeneratedMap, GenerationError> {
        let base = MapSeed::new(seed);
        let max_attempts = self.config.solver.max_attempts.max(1);

        let mut attempt = 0;
        loop {
            let map = self.generate_attempt(&base.attempt(attempt), attempt + 1);
            attempt += 1;

            let Some(contradiction) = map.metadata.contradiction.clone() else {
                if attempt > 1 {
                    tracing::info!(seed, attempts = attempt, "map completed after retries");
                }
                return Ok(map);
            };

            if attempt >= max_attempts {
                tracing::warn!(seed, attempts = attempt, "no complete map within attempt bound");
                return Err(GenerationError::AttemptsExhausted {
                    attempts: attempt,
                    last: contradiction,
                });
            }
            tracing::debug!(seed, attempt, "contradiction, retrying with derived seed");
        }
    }

    /// Independent generations in parallel, results in input order
    pub fn generate_batch<S: AsRef<str> + Sync>(&self, seeds: &[S]) -> Vec<GeneratedMap> {
        seeds
            .par_iter()
            .map(|seed| self.generate(seed.as_ref()))
            .collect()
    }

    fn generate_attempt(&self, seed: &MapSeed, attempts: u32) -> GeneratedMap {
        let timer = TimingSpan::new("generate_map");
        let mut rng = seed.rng();

        let tree = bsp::build(&self.partition, &mut rng);
        let mut sectors = bsp::flatten(&tree);
        let result = wfc::run_to_completion(&self.solver, &mut rng);

        let mut tiles = result.tiles;
        assign_sectors(&mut sectors, &mut tiles);

        let dimensions = self.config.dimensions;
        let hash = generation_hash(&seed.seed, &sectors, &tiles);
        let stats = MapStats {
            sector_count: sectors.len(),
            tile_count: tiles.len(),
            density: tiles.len() as f64 / dimensions.cell_count() as f64,
            attempts,
            solver_steps: result.steps,
            adjacency_violations: wfc::adjacency_violations(&tiles, self.catalog()).len(),
            elapsed_ms: timer.elapsed_ms(),
        };

        match &result.contradiction {
            Some(err) => tracing::debug!(
                seed = %seed.seed,
                x = err.position.x,
                y = err.position.y,
                z = err.position.z,
                tiles = stats.tile_count,
                "map generated with contradiction"
            ),
            None => tracing::debug!(
                seed = %seed.seed,
                sectors = stats.sector_count,
                tiles = stats.tile_count,
                "map generated"
            ),
        }

        GeneratedMap {
            id: format!("map_{}", &hash[..16]),
            seed: seed.seed.clone(),
            dimensions,
            sectors,
            tiles,
            metadata: MapMetadata {
                format_version: MAP_FORMAT_VERSION,
                engine_version: ENGINE_VERSION.to_string(),
                generation_hash: hash,
                status: result.status,
                contradiction: result.contradiction,
                stats,
                extra: Default::default(),
            },
        }
    }
}

/// Tag each tile with its containing sector and list tile keys per sector
fn assign_sectors(sectors: &mut [Sector], tiles: &mut [TileInstance]) {
    for sector in sectors.iter_mut() {
        sector.tile_ids = Some(Vec::new());
    }
    for tile in tiles.iter_mut() {
        let pos = tile.position();
        let Some(sector) = sectors.iter_mut().find(|s| s.bounds.contains(pos)) else {
            continue;
        };
        tile.metadata.insert("sector".into(), sector.id.clone().into());
        if let Some(ids) = sector.tile_ids.as_mut() {
            ids.push(tile.key());
        }
    }
}

/// Hex SHA3-256 fingerprint of a map's content
fn generation_hash(seed: &str, sectors: &[Sector], tiles: &[TileInstance]) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(seed.as_bytes());
    for sector in sectors {
        let b = &sector.bounds;
        hasher.update(sector.id.as_bytes());
        hasher.update(sector.role.as_str().as_bytes());
        for v in [b.x, b.y, b.z, b.width, b.height, b.depth] {
            hasher.update(v.to_le_bytes());
        }
    }
    for tile in tiles {
        hasher.update(tile.tile_id.as_bytes());
        for v in [tile.x, tile.y, tile.z] {
            hasher.update(v.to_le_bytes());
        }
    }
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
