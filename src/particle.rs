use crate::settings::BoundaryBehavior;
use rand::Rng;

/// Life lost per unit of elapsed time
pub const LIFE_DECAY: f32 = 0.01;

/// Mass per pixel of spawn size
const MASS_PER_SIZE: f32 = 0.1;

/// Spin range handed out at spawn (radians per unit time, symmetric)
const MAX_SPIN: f32 = 0.05;

const DEFAULT_SATURATION: f32 = 80.0;
const DEFAULT_LIGHTNESS: f32 = 60.0;

/// One pool slot worth of simulation state.
///
/// Fields other than `active` only carry meaning while the slot is live;
/// a retired slot keeps its stale values until the next spawn overwrites them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Force accumulator, cleared after every integration step
    pub ax: f32,
    pub ay: f32,
    /// Current drawn size (pixels)
    pub size: f32,
    /// Size at spawn; audio swell scales from this
    pub base_size: f32,
    pub life: f32,
    pub max_life: f32,
    pub alpha: f32,
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub mass: f32,
    pub angle: f32,
    pub angular_velocity: f32,
    pub active: bool,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            ax: 0.0,
            ay: 0.0,
            size: 1.0,
            base_size: 1.0,
            life: 0.0,
            max_life: 1.0,
            alpha: 0.0,
            hue: 0.0,
            saturation: DEFAULT_SATURATION,
            lightness: DEFAULT_LIGHTNESS,
            mass: MASS_PER_SIZE,
            angle: 0.0,
            angular_velocity: 0.0,
            active: false,
        }
    }
}

impl Particle {
    /// Bring a free slot to life. Must only be called on an inactive slot.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        x: f32,
        y: f32,
        vx: f32,
        vy: f32,
        size: f32,
        life: f32,
        hue: f32,
    ) {
        debug_assert!(!self.active, "spawn on a live slot");
        *self = Self {
            x,
            y,
            vx,
            vy,
            ax: 0.0,
            ay: 0.0,
            size,
            base_size: size,
            life,
            max_life: life,
            alpha: 1.0,
            hue,
            saturation: DEFAULT_SATURATION,
            lightness: DEFAULT_LIGHTNESS,
            mass: size * MASS_PER_SIZE,
            angle: rng.gen_range(0.0..std::f32::consts::TAU),
            angular_velocity: rng.gen_range(-MAX_SPIN..=MAX_SPIN),
            active: true,
        };
    }

    /// Accumulate a force for this frame
    pub fn apply_force(&mut self, fx: f32, fy: f32) {
        self.ax += fx / self.mass;
        self.ay += fy / self.mass;
    }

    /// Integrate one step and age the particle. Returns true if the particle
    /// retired during this call.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }

        self.vx += self.ax * dt;
        self.vy += self.ay * dt;
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.angle += self.angular_velocity * dt;

        self.life = (self.life - LIFE_DECAY * dt).max(0.0);
        self.alpha = (self.life / self.max_life).max(0.0);

        self.ax = 0.0;
        self.ay = 0.0;

        if self.life <= 0.0 {
            self.active = false;
            return true;
        }
        false
    }

    /// Multiplicative velocity decay
    pub fn damp(&mut self, factor: f32) {
        self.vx *= factor;
        self.vy *= factor;
    }

    /// Keep the particle on a `width` x `height` canvas
    pub fn apply_boundary(&mut self, behavior: BoundaryBehavior, width: f32, height: f32, bounce_damping: f32) {
        match behavior {
            BoundaryBehavior::Wrap => {
                if self.x < 0.0 {
                    self.x = width;
                } else if self.x > width {
                    self.x = 0.0;
                }
                if self.y < 0.0 {
                    self.y = height;
                } else if self.y > height {
                    self.y = 0.0;
                }
            }
            BoundaryBehavior::Bounce => {
                if self.x < 0.0 || self.x > width {
                    self.x = self.x.clamp(0.0, width);
                    self.vx = -self.vx * bounce_damping;
                }
                if self.y < 0.0 || self.y > height {
                    self.y = self.y.clamp(0.0, height);
                    self.vy = -self.vy * bounce_damping;
                }
            }
        }
    }
}
