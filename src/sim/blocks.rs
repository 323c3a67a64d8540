//! Destructible block field
//!
//! Blocks live in an arena keyed by a stable [`BlockId`]. Each live block owns
//! a kinematic body in the [`PhysicsWorld`] carrying its id as user data, so
//! contact callbacks resolve id → block through the grid instead of holding
//! references into the physics layer.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use super::catalog::BlockType;
use super::physics::{Body, BodyHandle, CollisionType, PhysicsWorld, ShapeFilter};
use super::shape::Rect;
use crate::consts::BLOCK_HP_THRESHOLDS;
use crate::tuning::GridTuning;

/// Shape filter group shared by all blocks so they never collide with each other
pub const BLOCK_GROUP: u32 = 2;

/// Stable block identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl BlockId {
    /// Encode as physics user data
    pub fn to_user_data(self) -> u64 {
        self.0 as u64
    }

    pub fn from_user_data(data: u64) -> Option<Self> {
        u32::try_from(data).ok().map(BlockId)
    }
}

/// A destructible block
#[derive(Debug, Clone)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockType,
    /// Top-left corner in world space (fixed at spawn)
    pub world_pos: Vec2,
    health: i32,
    max_health: i32,
    body: Option<BodyHandle>,
    /// Screen-space rectangle from the last projection
    pub screen_rect: Rect,
}

impl Block {
    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0 && self.body.is_some()
    }

    pub fn health_percent(&self) -> f32 {
        self.health as f32 / self.max_health as f32 * 100.0
    }

    /// Damage texture tier: the largest threshold not above the health percent
    pub fn damage_threshold(&self) -> u8 {
        let percent = self.health_percent();
        BLOCK_HP_THRESHOLDS
            .iter()
            .copied()
            .find(|&thr| percent >= thr as f32)
            .unwrap_or(0)
    }

    /// Remove health; every hit takes at least one point. Returns true when
    /// the block is destroyed.
    fn take_damage(&mut self, amount: i32) -> bool {
        self.health -= amount.max(1);
        self.health <= 0
    }
}

/// Result of [`BlockGrid::apply_damage`]
#[derive(Debug, Clone)]
pub enum DamageOutcome {
    /// Unknown or already retired block
    Ignored,
    Damaged { remaining: i32 },
    /// The block was removed from the grid. Its body handle (if any) must be
    /// removed from the physics world by the caller.
    Destroyed(Block),
}

/// Pick an index with probability proportional to `weights`
///
/// All-zero (or otherwise unusable) weights fall back to a uniform pick.
/// Returns `None` only for an empty slice.
pub fn choose_weighted<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    match WeightedIndex::new(weights) {
        Ok(dist) => Some(dist.sample(rng)),
        Err(_) => Some(rng.random_range(0..weights.len())),
    }
}

/// The scrolling block field
pub struct BlockGrid {
    blocks: BTreeMap<BlockId, Block>,
    next_id: u32,
    spawn_weights: Vec<f64>,
    cols: usize,
    block_size: f32,
    border_width: f32,
    initial_offset: f32,
    friction: f32,
    elasticity: f32,
    scroll_offset: f32,
}

impl BlockGrid {
    pub fn new(tuning: &GridTuning) -> Self {
        Self {
            blocks: BTreeMap::new(),
            next_id: 1,
            spawn_weights: BlockType::ALL.iter().map(|t| t.spawn_weight()).collect(),
            cols: tuning.cols,
            block_size: tuning.block_size,
            border_width: tuning.border_width,
            initial_offset: tuning.initial_offset,
            friction: tuning.block_friction,
            elasticity: tuning.block_elasticity,
            scroll_offset: 0.0,
        }
    }

    /// Override the spawn weights (catalog order)
    pub fn set_spawn_weights(&mut self, weights: [f64; 13]) {
        self.spawn_weights = weights.to_vec();
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// Blocks in id (spawn) order
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// World y of the lowest row that still has blocks
    pub fn lowest_row_y(&self) -> Option<f32> {
        self.blocks.values().map(|b| b.world_pos.y).reduce(f32::max)
    }

    fn random_block_type<R: Rng + ?Sized>(&self, rng: &mut R) -> BlockType {
        choose_weighted(rng, &self.spawn_weights)
            .and_then(|i| BlockType::ALL.get(i).copied())
            .unwrap_or(BlockType::Stone)
    }

    fn cell_center(&self, world_pos: Vec2) -> Vec2 {
        world_pos + Vec2::splat(self.block_size / 2.0)
    }

    /// Spawn one full row of blocks with their top edge at `world_y`
    pub fn generate_row<R: Rng + ?Sized>(
        &mut self,
        world: &mut PhysicsWorld,
        rng: &mut R,
        world_y: f32,
    ) {
        for col in 0..self.cols {
            let world_pos = Vec2::new(col as f32 * self.block_size + self.border_width, world_y);
            let kind = self.random_block_type(rng);
            let id = BlockId(self.next_id);
            self.next_id += 1;

            let body = world.add_body(
                Body::kinematic(Vec2::splat(self.block_size))
                    .with_position(self.cell_center(world_pos))
                    .with_material(self.friction, self.elasticity)
                    .with_collision_type(CollisionType::Block)
                    .with_filter(ShapeFilter::group(BLOCK_GROUP))
                    .with_user_data(id.to_user_data()),
            );

            let max_health = kind.max_health();
            self.blocks.insert(
                id,
                Block {
                    id,
                    kind,
                    world_pos,
                    health: max_health,
                    max_health,
                    body: Some(body),
                    screen_rect: Rect::new(
                        world_pos.x,
                        world_pos.y - self.scroll_offset,
                        self.block_size,
                        self.block_size,
                    ),
                },
            );
        }
    }

    /// Keep at least one viewport of rows below the scroll offset
    ///
    /// An empty field is reseeded with a single row at
    /// `scroll_offset + initial_offset`. Returns the number of rows added.
    pub fn ensure_coverage<R: Rng + ?Sized>(
        &mut self,
        world: &mut PhysicsWorld,
        rng: &mut R,
        scroll_offset: f32,
        viewport_height: f32,
    ) -> usize {
        let Some(mut lowest) = self.lowest_row_y() else {
            self.generate_row(world, rng, scroll_offset + self.initial_offset);
            return 1;
        };

        let mut rows = 0;
        while lowest - scroll_offset < viewport_height {
            lowest += self.block_size;
            self.generate_row(world, rng, lowest);
            rows += 1;
        }
        rows
    }

    /// Fill the field for a fresh game
    pub fn seed_initial<R: Rng + ?Sized>(
        &mut self,
        world: &mut PhysicsWorld,
        rng: &mut R,
        scroll_offset: f32,
        viewport_height: f32,
    ) -> usize {
        let mut rows = 0;
        if self.is_empty() {
            rows += self.ensure_coverage(world, rng, scroll_offset, viewport_height);
        }
        rows += self.ensure_coverage(world, rng, scroll_offset, viewport_height);
        log::info!("Block field seeded with {} rows ({} blocks)", rows, self.len());
        rows
    }

    /// Drop blocks that left the retention band around the viewport
    ///
    /// A block is culled when its screen top is more than one block below the
    /// viewport bottom, or its screen bottom is more than one block above the
    /// viewport top. Health plays no part. Returns the number removed.
    pub fn retire_offscreen(
        &mut self,
        world: &mut PhysicsWorld,
        scroll_offset: f32,
        viewport_height: f32,
    ) -> usize {
        let size = self.block_size;
        let doomed: Vec<BlockId> = self
            .blocks
            .values()
            .filter(|b| {
                let top = b.world_pos.y - scroll_offset;
                top > viewport_height + size || top + size < -size
            })
            .map(|b| b.id)
            .collect();

        for id in &doomed {
            self.destroy(world, *id);
        }
        doomed.len()
    }

    /// Recompute screen rectangles and re-center every kinematic body on its
    /// cell
    pub fn project(&mut self, world: &mut PhysicsWorld, scroll_offset: f32) {
        self.scroll_offset = scroll_offset;
        let size = self.block_size;
        for block in self.blocks.values_mut() {
            block.screen_rect = Rect::new(
                block.world_pos.x,
                block.world_pos.y - scroll_offset,
                size,
                size,
            );
            if let Some(body) = block.body.and_then(|h| world.body_mut(h)) {
                body.position = block.world_pos + Vec2::splat(size / 2.0);
                body.velocity = Vec2::ZERO;
            }
        }
    }

    /// Damage a block. A destroyed block leaves the grid immediately; the
    /// caller owns removing its body from the physics world.
    pub fn apply_damage(&mut self, id: BlockId, amount: i32) -> DamageOutcome {
        let Some(block) = self.blocks.get_mut(&id) else {
            return DamageOutcome::Ignored;
        };
        if !block.is_alive() {
            return DamageOutcome::Ignored;
        }

        if block.take_damage(amount) {
            match self.blocks.remove(&id) {
                Some(block) => DamageOutcome::Destroyed(block),
                None => DamageOutcome::Ignored,
            }
        } else {
            DamageOutcome::Damaged {
                remaining: block.health,
            }
        }
    }

    /// Remove a block and its body outright
    pub fn destroy(&mut self, world: &mut PhysicsWorld, id: BlockId) -> Option<Block> {
        let mut block = self.blocks.remove(&id)?;
        if let Some(handle) = block.body.take() {
            world.remove_body(handle);
        }
        Some(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup() -> (BlockGrid, PhysicsWorld, Pcg32) {
        (
            BlockGrid::new(&GridTuning::default()),
            PhysicsWorld::new(GRAVITY),
            Pcg32::seed_from_u64(42),
        )
    }

    #[test]
    fn test_generate_row_places_kinematic_bodies() {
        let (mut grid, mut world, mut rng) = setup();
        grid.generate_row(&mut world, &mut rng, 320.0);

        assert_eq!(grid.len(), GRID_COLS);
        assert_eq!(world.body_count(), GRID_COLS);
        for (col, block) in grid.iter().enumerate() {
            assert_eq!(block.world_pos, Vec2::new(BORDER_WIDTH + col as f32 * BLOCK_SIZE, 320.0));
            assert_eq!(block.health(), block.kind.max_health());
            let body = world.body(block.body().unwrap()).unwrap();
            assert!(!body.is_dynamic());
            assert_eq!(body.collision_type, CollisionType::Block);
            assert_eq!(BlockId::from_user_data(body.user_data), Some(block.id));
            assert_eq!(body.position, block.world_pos + Vec2::splat(BLOCK_SIZE / 2.0));
        }
    }

    #[test]
    fn test_empty_grid_seeds_single_row() {
        let (mut grid, mut world, mut rng) = setup();
        let scroll = 128.0;
        let rows = grid.ensure_coverage(&mut world, &mut rng, scroll, SCREEN_HEIGHT);

        assert_eq!(rows, 1);
        assert_eq!(grid.len(), GRID_COLS);
        assert!(grid.iter().all(|b| b.world_pos.y == scroll + INITIAL_OFFSET));
    }

    #[test]
    fn test_coverage_after_seed() {
        let (mut grid, mut world, mut rng) = setup();
        grid.seed_initial(&mut world, &mut rng, 0.0, SCREEN_HEIGHT);
        let lowest = grid.lowest_row_y().unwrap();
        assert!(lowest >= SCREEN_HEIGHT);
        assert!(lowest < SCREEN_HEIGHT + BLOCK_SIZE);
        assert_eq!(grid.len() % GRID_COLS, 0);
    }

    #[test]
    fn test_coverage_catches_up_after_jump() {
        let (mut grid, mut world, mut rng) = setup();
        grid.seed_initial(&mut world, &mut rng, 0.0, SCREEN_HEIGHT);
        // Camera jumps five rows in a single frame
        let scroll = 5.0 * BLOCK_SIZE;
        let rows = grid.ensure_coverage(&mut world, &mut rng, scroll, SCREEN_HEIGHT);
        assert_eq!(rows, 5);
        assert!(grid.lowest_row_y().unwrap() - scroll >= SCREEN_HEIGHT);
    }

    #[test]
    fn test_retire_offscreen_is_idempotent() {
        let (mut grid, mut world, mut rng) = setup();
        grid.seed_initial(&mut world, &mut rng, 0.0, SCREEN_HEIGHT);
        let before = grid.len();

        // Scroll far enough that the top rows leave the band above
        let scroll = 10.0 * BLOCK_SIZE;
        let first = grid.retire_offscreen(&mut world, scroll, SCREEN_HEIGHT);
        let second = grid.retire_offscreen(&mut world, scroll, SCREEN_HEIGHT);

        assert!(first > 0);
        assert_eq!(second, 0);
        assert_eq!(grid.len(), before - first);
        assert_eq!(world.body_count(), grid.len());
        for block in grid.iter() {
            assert!(block.world_pos.y - scroll + BLOCK_SIZE >= -BLOCK_SIZE);
        }
    }

    #[test]
    fn test_retire_culls_far_below() {
        let (mut grid, mut world, mut rng) = setup();
        grid.generate_row(&mut world, &mut rng, SCREEN_HEIGHT + 2.0 * BLOCK_SIZE);
        grid.generate_row(&mut world, &mut rng, SCREEN_HEIGHT);
        let removed = grid.retire_offscreen(&mut world, 0.0, SCREEN_HEIGHT);
        assert_eq!(removed, GRID_COLS);
        assert!(grid.iter().all(|b| b.world_pos.y == SCREEN_HEIGHT));
    }

    #[test]
    fn test_project_updates_screen_rects() {
        let (mut grid, mut world, mut rng) = setup();
        grid.generate_row(&mut world, &mut rng, 640.0);
        grid.project(&mut world, 100.0);
        for block in grid.iter() {
            assert_eq!(block.screen_rect.top(), 540.0);
            assert_eq!(block.screen_rect.left(), block.world_pos.x);
            let body = world.body(block.body().unwrap()).unwrap();
            assert_eq!(body.position, block.world_pos + Vec2::splat(BLOCK_SIZE / 2.0));
        }
    }

    #[test]
    fn test_damage_sequence_hardness_two() {
        let (mut grid, mut world, mut rng) = setup();
        let mut weights = [0.0; 13];
        weights[BlockType::Stone as usize] = 1.0;
        grid.set_spawn_weights(weights);
        grid.generate_row(&mut world, &mut rng, 320.0);
        let id = grid.iter().next().unwrap().id;
        assert_eq!(grid.get(id).unwrap().health(), 10);

        let mut seen = Vec::new();
        for _ in 0..3 {
            match grid.apply_damage(id, 3) {
                DamageOutcome::Damaged { remaining } => seen.push(remaining),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(seen, vec![7, 4, 1]);

        let DamageOutcome::Destroyed(block) = grid.apply_damage(id, 3) else {
            panic!("fourth strike should destroy");
        };
        assert!(block.health() <= 0);
        assert!(grid.get(id).is_none());
        assert!(matches!(grid.apply_damage(id, 3), DamageOutcome::Ignored));

        // Body removal is the caller's job, and happens once
        let handle = block.body().unwrap();
        assert!(world.remove_body(handle).is_some());
        assert!(world.remove_body(handle).is_none());
    }

    #[test]
    fn test_zero_damage_still_hurts() {
        let (mut grid, mut world, mut rng) = setup();
        grid.generate_row(&mut world, &mut rng, 0.0);
        let block = grid.iter().next().unwrap().clone();
        let DamageOutcome::Damaged { remaining } = grid.apply_damage(block.id, 0) else {
            panic!("expected damage");
        };
        assert_eq!(remaining, block.max_health() - 1);
    }

    #[test]
    fn test_destroy_removes_body() {
        let (mut grid, mut world, mut rng) = setup();
        grid.generate_row(&mut world, &mut rng, 0.0);
        let id = grid.iter().next().unwrap().id;
        assert!(grid.destroy(&mut world, id).is_some());
        assert!(grid.destroy(&mut world, id).is_none());
        assert_eq!(world.body_count(), GRID_COLS - 1);
    }

    #[test]
    fn test_damage_threshold() {
        let (mut grid, mut world, mut rng) = setup();
        let mut weights = [0.0; 13];
        weights[BlockType::Stone as usize] = 1.0;
        grid.set_spawn_weights(weights);
        grid.generate_row(&mut world, &mut rng, 0.0);
        let id = grid.iter().next().unwrap().id;

        assert_eq!(grid.get(id).unwrap().damage_threshold(), 100);
        grid.apply_damage(id, 3); // 70%
        assert_eq!(grid.get(id).unwrap().damage_threshold(), 60);
        grid.apply_damage(id, 6); // 10%
        assert_eq!(grid.get(id).unwrap().damage_threshold(), 0);
    }

    #[test]
    fn test_all_zero_weights_fall_back_to_uniform() {
        let mut rng = Pcg32::seed_from_u64(7);
        let weights = [0.0; 4];
        let mut counts = [0u32; 4];
        for _ in 0..4000 {
            counts[choose_weighted(&mut rng, &weights).unwrap()] += 1;
        }
        assert!(counts.iter().all(|&c| c > 800));
        assert_eq!(choose_weighted(&mut rng, &[]), None);
    }

    #[test]
    fn test_zero_weight_grid_still_generates() {
        let (mut grid, mut world, mut rng) = setup();
        grid.set_spawn_weights([0.0; 13]);
        grid.generate_row(&mut world, &mut rng, 0.0);
        assert_eq!(grid.len(), GRID_COLS);
    }

    #[test]
    fn test_spawn_distribution_matches_weights() {
        let mut rng = Pcg32::seed_from_u64(2024);
        let weights: Vec<f64> = BlockType::ALL.iter().map(|t| t.spawn_weight()).collect();
        let total: f64 = weights.iter().sum();
        let samples = 200_000;

        let mut counts = vec![0u64; weights.len()];
        for _ in 0..samples {
            counts[choose_weighted(&mut rng, &weights).unwrap()] += 1;
        }

        let chi2: f64 = counts
            .iter()
            .zip(&weights)
            .map(|(&observed, &w)| {
                let expected = samples as f64 * w / total;
                (observed as f64 - expected).powi(2) / expected
            })
            .sum();
        // 12 degrees of freedom, p = 0.001
        assert!(chi2 < 32.91, "chi-squared {chi2} too large");
    }

    proptest! {
        #[test]
        fn prop_health_never_increases(
            kind in 0usize..13,
            hits in prop::collection::vec(-3i32..12, 1..60),
        ) {
            let (mut grid, mut world, mut rng) = setup();
            let mut weights = [0.0; 13];
            weights[kind] = 1.0;
            grid.set_spawn_weights(weights);
            grid.generate_row(&mut world, &mut rng, 320.0);
            let id = grid.iter().next().unwrap().id;
            let handle = grid.get(id).unwrap().body().unwrap();

            // Keep striking for 1 after the random hits until the block breaks
            let strikes = hits.into_iter().chain(std::iter::repeat_n(1, 200));
            let mut health = grid.get(id).unwrap().health();
            let mut destroyed = 0;
            let mut removed = 0;
            for amount in strikes {
                match grid.apply_damage(id, amount) {
                    DamageOutcome::Damaged { remaining } => {
                        prop_assert_eq!(destroyed, 0);
                        prop_assert!(remaining < health);
                        health = remaining;
                    }
                    DamageOutcome::Destroyed(block) => {
                        prop_assert!(block.health() <= 0);
                        destroyed += 1;
                        if world.remove_body(block.body().unwrap()).is_some() {
                            removed += 1;
                        }
                    }
                    DamageOutcome::Ignored => {
                        prop_assert_eq!(destroyed, 1);
                    }
                }
            }

            prop_assert_eq!(destroyed, 1);
            prop_assert_eq!(removed, 1);
            prop_assert!(world.remove_body(handle).is_none());
            prop_assert!(grid.get(id).is_none());
        }

        #[test]
        fn prop_coverage_holds_while_scrolling(
            steps in prop::collection::vec(0.0f32..200.0, 1..40),
        ) {
            let (mut grid, mut world, mut rng) = setup();
            grid.seed_initial(&mut world, &mut rng, 0.0, SCREEN_HEIGHT);
            let mut scroll = 0.0;
            for step in steps {
                scroll += step;
                grid.retire_offscreen(&mut world, scroll, SCREEN_HEIGHT);
                grid.ensure_coverage(&mut world, &mut rng, scroll, SCREEN_HEIGHT);
                let lowest = grid.lowest_row_y().unwrap();
                prop_assert!(lowest - scroll >= SCREEN_HEIGHT);
                prop_assert_eq!(world.body_count(), grid.len());
            }
        }
    }
}
