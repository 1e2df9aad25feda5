//! Demo scenes: a loading screen and a 5x3 reel grid

use rand::Rng;
use slot_engine::prelude::*;

/// Symbol texture names, also used as asset names
pub const SYMBOLS: &[&str] = &["cherry", "lemon", "bell", "bar", "seven"];

const REELS: usize = 5;
const ROWS: usize = 3;
const CELL_SIZE: f32 = 200.0;
const DESIGN_WIDTH: f32 = 1920.0;
const DESIGN_HEIGHT: f32 = 1080.0;

/// Progress bar shown while bundles load
pub struct LoadingScene {
    core: SceneCore,
    bar: ContainerId,
    label: ContainerId,
    progress: f32,
}

impl LoadingScene {
    /// Scene name
    pub const NAME: &'static str = "loading";

    /// Build the bar and label containers
    pub fn new(display: &DisplayTree) -> Self {
        Self {
            core: SceneCore::new(Self::NAME, display).with_background(0x000000),
            bar: display.create("loading:bar"),
            label: display.create("loading:label"),
            progress: 0.0,
        }
    }

    /// Update the bar, 0..=1
    pub fn set_progress(&mut self, progress: f32) {
        self.progress = progress.clamp(0.0, 1.0);
        let display = self.core.display();
        display.set_scale(self.bar, self.progress, 1.0);
        display.set_text(self.label, Some(format!("Loading {:.0}%", self.progress * 100.0)));
    }
}

impl Scene for LoadingScene {
    fn core(&self) -> &SceneCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SceneCore {
        &mut self.core
    }

    fn init(&mut self, _ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        let display = self.core.display();
        display.set_size(self.bar, 800.0, 24.0);
        display.set_position(self.bar, 560.0, 700.0);
        display.set_position(self.label, 960.0, 660.0);
        self.core.add_ui(self.bar);
        self.core.add_ui(self.label);
        self.set_progress(0.0);
        Ok(())
    }

    fn enter(&mut self, _ctx: &mut SceneContext<'_>) {
        log::info!("Loading screen shown");
    }
}

/// Reel grid that re-rolls its symbols on a timer
pub struct ReelScene {
    core: SceneCore,
    cells: Vec<EntityId>,
    logo: Option<EntityId>,
    spin_interval: f32,
    since_spin: f32,
    spins: u32,
    wins: u32,
}

impl ReelScene {
    /// Scene name
    pub const NAME: &'static str = "reels";

    /// `spin_interval` is in seconds
    pub fn new(display: &DisplayTree, spin_interval: f32) -> Self {
        Self {
            core: SceneCore::new(Self::NAME, display).with_background(0x1099bb),
            cells: Vec::with_capacity(REELS * ROWS),
            logo: None,
            spin_interval,
            since_spin: 0.0,
            spins: 0,
            wins: 0,
        }
    }

    /// Spins so far
    pub fn spins(&self) -> u32 {
        self.spins
    }

    /// Spins with three or more matching symbols on the middle row
    pub fn wins(&self) -> u32 {
        self.wins
    }

    fn spin(&mut self, ctx: &mut SceneContext<'_>) {
        let display = ctx.display().clone();
        let mut rng = rand::thread_rng();
        let mut middle_row = Vec::with_capacity(REELS);

        for (index, id) in self.cells.iter().enumerate() {
            let symbol = SYMBOLS[rng.gen_range(0..SYMBOLS.len())];
            if index % ROWS == 1 {
                middle_row.push(symbol);
            }
            let sprite = ctx
                .entities()
                .get_entity_mut(*id)
                .and_then(|e| e.get_component_mut::<SpriteComponent>(SpriteComponent::KEY));
            if let Some(sprite) = sprite {
                sprite.set_texture(&display, symbol);
            }
        }
        self.spins += 1;

        let Some(&first) = middle_row.first() else {
            return;
        };
        let run = middle_row.iter().take_while(|s| **s == first).count();
        if run >= 3 {
            self.wins += 1;
            log::info!("Spin {}: {} x{} on the middle row", self.spins, first, run);
            self.celebrate(ctx, first);
        } else {
            log::debug!("Spin {}: {:?}", self.spins, middle_row);
        }
    }

    fn celebrate(&self, ctx: &mut SceneContext<'_>, symbol: &str) {
        let entities = ctx.entities();
        let id = entities.create_entity(format!("win_{}", self.spins), true);
        if let Some(effect) = entities.get_entity_mut(id) {
            effect.set_position(DESIGN_WIDTH / 2.0, DESIGN_HEIGHT / 2.0);
            effect.add_component(SpriteComponent::KEY, SpriteComponent::new(symbol).with_size(400.0, 400.0));
            effect.add_component(
                FrameAnimationComponent::KEY,
                FrameAnimationComponent::new(SYMBOLS.iter().copied(), 12.0),
            );
            effect.add_component(LifetimeComponent::KEY, LifetimeComponent::new(1.5));
            self.core.add_content(effect.container());
        }
    }

    fn layout(&self, width: f32, height: f32) {
        let scale = (width / DESIGN_WIDTH).min(height / DESIGN_HEIGHT);
        let display = self.core.display();
        let container = self.core.container();
        display.set_scale(container, scale, scale);
        display.set_position(
            container,
            (width - DESIGN_WIDTH * scale) / 2.0,
            (height - DESIGN_HEIGHT * scale) / 2.0,
        );
    }
}

impl Scene for ReelScene {
    fn core(&self) -> &SceneCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SceneCore {
        &mut self.core
    }

    fn init(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        for symbol in SYMBOLS {
            if ctx.assets().get_asset::<Texture>(symbol).is_none() {
                return Err(SceneError::MissingAsset {
                    scene: Self::NAME.to_string(),
                    asset: (*symbol).to_string(),
                });
            }
        }

        let origin_x = (DESIGN_WIDTH - REELS as f32 * CELL_SIZE) / 2.0;
        let origin_y = (DESIGN_HEIGHT - ROWS as f32 * CELL_SIZE) / 2.0;
        let entities = ctx.entities();
        for reel in 0..REELS {
            for row in 0..ROWS {
                let id = entities.create_entity(format!("reel_{reel}_{row}"), true);
                if let Some(cell) = entities.get_entity_mut(id) {
                    cell.set_position(
                        origin_x + reel as f32 * CELL_SIZE,
                        origin_y + row as f32 * CELL_SIZE,
                    );
                    cell.add_component(
                        SpriteComponent::KEY,
                        SpriteComponent::new(SYMBOLS[(reel + row) % SYMBOLS.len()])
                            .with_size(CELL_SIZE, CELL_SIZE),
                    );
                    self.core.add_content(cell.container());
                }
                self.cells.push(id);
            }
        }

        let logo = entities.create_entity("logo", true);
        if let Some(entity) = entities.get_entity_mut(logo) {
            entity.set_position(DESIGN_WIDTH / 2.0, 100.0);
            entity.add_component(SpriteComponent::KEY, SpriteComponent::new("logo"));
            entity.add_component(SpinComponent::KEY, SpinComponent::new(0.5));
            self.core.add_ui(entity.container());
        }
        self.logo = Some(logo);

        let (width, height) = ctx.screen_size();
        self.layout(width, height);
        Ok(())
    }

    fn enter(&mut self, _ctx: &mut SceneContext<'_>) {
        log::info!("Reels ready ({} cells)", self.cells.len());
    }

    fn update(&mut self, ctx: &mut SceneContext<'_>, delta_time: f32) {
        self.since_spin += delta_time;
        if self.since_spin >= self.spin_interval {
            self.since_spin = 0.0;
            self.spin(ctx);
        }
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.layout(width, height);
    }

    fn destroy(&mut self) {
        log::info!("Reel scene done: {} spins, {} wins", self.spins, self.wins);
    }
}
