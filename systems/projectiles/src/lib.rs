#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that flies bullets toward their targets and reports impacts.

use std::collections::BTreeMap;

use path_defence_core::{BulletView, Command, EnemyId, EnemyView, Event, Health};

/// Configuration parameters required to construct the projectile system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    speed: f32,
    impact_radius: f32,
}

impl Config {
    /// Creates a new configuration using the provided flight speed and impact radius.
    #[must_use]
    pub const fn new(speed: f32, impact_radius: f32) -> Self {
        Self {
            speed,
            impact_radius,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(4.0, 4.0)
    }
}

/// Bullet flight system that emits movement and impact commands.
#[derive(Debug)]
pub struct Projectiles {
    speed: f32,
    impact_radius: f32,
    health_ledger: BTreeMap<EnemyId, Health>,
    scratch: Vec<Command>,
}

impl Projectiles {
    /// Creates a new projectile system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            speed: config.speed,
            impact_radius: config.impact_radius,
            health_ledger: BTreeMap::new(),
            scratch: Vec::new(),
        }
    }

    /// Consumes world events and immutable views to emit bullet commands.
    ///
    /// Bullets are visited in firing order. A bullet whose target is gone is
    /// discarded. A bullet within the impact radius of its target, or aimed at
    /// a target already out of health, strikes. Any other bullet moves toward
    /// the target's current position. Damage dealt by earlier strikes in the
    /// same call is visible to later bullets.
    pub fn handle(
        &mut self,
        events: &[Event],
        bullets: &BulletView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        self.health_ledger.clear();
        self.scratch.clear();

        for bullet in bullets.iter() {
            let Some(target) = enemies.get(bullet.target) else {
                self.scratch
                    .push(Command::DiscardBullet { bullet: bullet.id });
                continue;
            };

            let health = self
                .health_ledger
                .get(&target.id)
                .copied()
                .unwrap_or(target.health);
            let offset = target.position - bullet.position;
            let distance = offset.length();

            if distance < self.impact_radius || health.is_depleted() {
                let _ = self
                    .health_ledger
                    .insert(target.id, health.after(bullet.damage));
                self.scratch.push(Command::StrikeEnemy { bullet: bullet.id });
                continue;
            }

            self.scratch.push(Command::MoveBullet {
                bullet: bullet.id,
                position: bullet.position + offset / distance * self.speed,
            });
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use path_defence_core::{BulletId, BulletSnapshot, Damage, EnemySnapshot, Timestamp, TowerKind};
    use std::time::Duration;

    fn tick() -> Vec<Event> {
        vec![Event::TimeAdvanced {
            now: Timestamp::from_millis(16),
            elapsed: Duration::from_millis(16),
        }]
    }

    fn enemy(id: u32, position: Vec2, health: i32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            position,
            health: Health::new(health),
            max_health: Health::new(10),
            speed: 1.0,
            path_index: 0,
        }
    }

    fn bullet(id: u32, position: Vec2, target: u32, damage: u32) -> BulletSnapshot {
        BulletSnapshot {
            id: BulletId::new(id),
            kind: TowerKind::Basic,
            position,
            target: EnemyId::new(target),
            damage: Damage::new(damage),
        }
    }

    #[test]
    fn bullets_home_in_by_their_speed() {
        let mut system = Projectiles::new(Config::default());
        let enemies = EnemyView::from_snapshots(vec![enemy(1, Vec2::new(0.0, 50.0), 10)]);
        let bullets = BulletView::from_snapshots(vec![bullet(0, Vec2::ZERO, 1, 5)]);
        let mut out = Vec::new();

        system.handle(&tick(), &bullets, &enemies, &mut out);

        assert_eq!(
            out,
            vec![Command::MoveBullet {
                bullet: BulletId::new(0),
                position: Vec2::new(0.0, 4.0),
            }]
        );
    }

    #[test]
    fn bullets_inside_impact_radius_strike() {
        let mut system = Projectiles::new(Config::default());
        let enemies = EnemyView::from_snapshots(vec![enemy(1, Vec2::new(3.9, 0.0), 10)]);
        let bullets = BulletView::from_snapshots(vec![bullet(0, Vec2::ZERO, 1, 5)]);
        let mut out = Vec::new();

        system.handle(&tick(), &bullets, &enemies, &mut out);

        assert_eq!(
            out,
            vec![Command::StrikeEnemy {
                bullet: BulletId::new(0),
            }]
        );
    }

    #[test]
    fn orphaned_bullets_are_discarded() {
        let mut system = Projectiles::new(Config::default());
        let bullets = BulletView::from_snapshots(vec![bullet(3, Vec2::ZERO, 8, 5)]);
        let mut out = Vec::new();

        system.handle(&tick(), &bullets, &EnemyView::default(), &mut out);

        assert_eq!(
            out,
            vec![Command::DiscardBullet {
                bullet: BulletId::new(3),
            }]
        );
    }

    #[test]
    fn later_bullets_see_damage_from_earlier_strikes() {
        let mut system = Projectiles::new(Config::default());
        let enemies = EnemyView::from_snapshots(vec![enemy(1, Vec2::new(1.0, 0.0), 10)]);
        let bullets = BulletView::from_snapshots(vec![
            bullet(0, Vec2::ZERO, 1, 10),
            bullet(1, Vec2::new(0.0, 80.0), 1, 5),
        ]);
        let mut out = Vec::new();

        system.handle(&tick(), &bullets, &enemies, &mut out);

        assert_eq!(
            out,
            vec![
                Command::StrikeEnemy {
                    bullet: BulletId::new(0),
                },
                Command::StrikeEnemy {
                    bullet: BulletId::new(1),
                },
            ]
        );
    }

    #[test]
    fn no_clock_tick_means_no_flight() {
        let mut system = Projectiles::new(Config::default());
        let enemies = EnemyView::from_snapshots(vec![enemy(1, Vec2::new(0.0, 50.0), 10)]);
        let bullets = BulletView::from_snapshots(vec![bullet(0, Vec2::ZERO, 1, 5)]);
        let mut out = Vec::new();

        system.handle(&[], &bullets, &enemies, &mut out);

        assert!(out.is_empty());
    }
}
