//! Damped-harmonic-oscillator spring used to ease morph progress.
//!
//! Distinct from the tween driver: the spring has no fixed duration, it
//! integrates toward a target and reports settlement. The morph sequencer
//! relies on the simulator snapping exactly onto the target once settled so
//! shape boundaries never jitter around tolerance near-misses.

/// Spring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringSpec {
    /// 1.0 = critically damped, < 1.0 = under-damped (slight overshoot).
    pub damping_ratio: f32,
    pub stiffness: f32,
    pub mass: f32,
    /// Settlement tolerance applied to both position and velocity.
    pub tolerance: f32,
}

impl SpringSpec {
    /// Spring used for the morph progress ramp: a touch of overshoot, then a
    /// quick settle well inside one morph cycle.
    pub fn morph() -> Self {
        Self {
            damping_ratio: 0.6,
            stiffness: 200.0,
            mass: 1.0,
            tolerance: 0.1,
        }
    }
}

impl Default for SpringSpec {
    fn default() -> Self {
        Self::morph()
    }
}

/// Integration substep, in seconds. Semi-implicit Euler is stable for the
/// stiffness range used here as long as steps stay this small.
const SUBSTEP_SECONDS: f32 = 1.0 / 240.0;

/// Pure physics integrator producing a position/velocity trajectory toward a
/// target. No clocks, no callbacks: callers feed elapsed time in.
#[derive(Debug, Clone)]
pub struct SpringSimulator {
    spec: SpringSpec,
    position: f32,
    velocity: f32,
    target: f32,
    settled: bool,
}

impl SpringSimulator {
    pub fn new(spec: SpringSpec) -> Self {
        Self {
            spec,
            position: 0.0,
            velocity: 0.0,
            target: 0.0,
            settled: true,
        }
    }

    /// Restart the trajectory from `position` toward `target` with zero
    /// velocity.
    pub fn reset(&mut self, position: f32, target: f32) {
        self.position = position;
        self.velocity = 0.0;
        self.target = target;
        self.settled = self.within_tolerance();
        if self.settled {
            self.position = self.target;
        }
    }

    /// Advance the simulation by `delta_ms` of wall time.
    pub fn advance(&mut self, delta_ms: u64) {
        if self.settled {
            return;
        }
        let spring_constant = self.spec.stiffness;
        let damping =
            2.0 * self.spec.damping_ratio * (self.spec.stiffness * self.spec.mass).sqrt();

        let mut remaining = delta_ms as f32 / 1000.0;
        while remaining > 0.0 {
            let dt = remaining.min(SUBSTEP_SECONDS);
            let displacement = self.position - self.target;
            let acceleration =
                (-spring_constant * displacement - damping * self.velocity) / self.spec.mass;
            self.velocity += acceleration * dt;
            self.position += self.velocity * dt;
            remaining -= dt;

            if self.within_tolerance() {
                // Snap exactly onto the target; near-misses must not leak to
                // rendering.
                self.position = self.target;
                self.velocity = 0.0;
                self.settled = true;
                break;
            }
        }
    }

    fn within_tolerance(&self) -> bool {
        (self.position - self.target).abs() <= self.spec.tolerance
            && self.velocity.abs() <= self.spec.tolerance
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trajectory_moves_toward_target_and_settles_exactly() {
        let mut spring = SpringSimulator::new(SpringSpec::morph());
        spring.reset(0.0, 1.0);
        assert!(!spring.is_settled());

        spring.advance(50);
        let early = spring.position();
        assert!(early > 0.0 && early < 1.0, "early sample was {early}");

        spring.advance(600);
        assert!(spring.is_settled());
        assert_eq!(spring.position(), 1.0);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn settles_well_within_one_morph_cycle() {
        let mut spring = SpringSimulator::new(SpringSpec::morph());
        spring.reset(0.0, 1.0);
        spring.advance(650);
        assert!(spring.is_settled());
    }

    #[test]
    fn reset_onto_the_target_is_immediately_settled() {
        let mut spring = SpringSimulator::new(SpringSpec::morph());
        spring.reset(1.0, 1.0);
        assert!(spring.is_settled());
        assert_eq!(spring.position(), 1.0);
    }

    #[test]
    fn advance_after_settlement_is_inert() {
        let mut spring = SpringSimulator::new(SpringSpec::morph());
        spring.reset(0.0, 1.0);
        spring.advance(2000);
        let settled_at = spring.position();
        spring.advance(500);
        assert_eq!(spring.position(), settled_at);
    }
}
