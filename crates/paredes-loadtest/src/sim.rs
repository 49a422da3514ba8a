//! Load simulator
//!
//! N synthetic clients generating protocol traffic against a simulated
//! server. Each client draws a base latency once when it joins; every
//! message then gets per-message jitter on top, may be dropped before
//! the uplink, pays half the round trip to reach the server, costs the
//! server a processing slice, and fans out to every other active client
//! over its own lossy downlink.
//!
//! Everything runs on the virtual clock of [`EventQueue`]; a run
//! consumes no wall time and two runs with the same config and seed
//! produce byte-identical reports.

use paredes_protocol::Vec3;
use tracing::{debug, info, trace};

use crate::event::{ActionKind, EventQueue, MessageKind, SimEvent, SimMessage};
use crate::metrics::{Metrics, BASELINE_FPS};
use crate::{LoadTestConfig, LoadTestReport, Result, SimRng};

const CHAT_LINES: &[&str] = &[
    "anyone near the generator?",
    "it heard me, run",
    "low on stamina, cover me",
    "meet at the east door",
    "I found a key",
    "don't split up",
    "that hallway is not safe",
    "reviving, hold on",
    "it's behind you",
    "going dark, flashlight dead",
];

const ENEMY_EVENT_CHANCE: f64 = 0.1;
const ENEMY_ATTACK_CHANCE: f64 = 0.3;

/// One synthetic client
#[derive(Debug)]
struct SimClient {
    active: bool,
    position: Vec3,
    yaw: f64,
    health: f64,
    /// Base round-trip latency in ms, drawn once per join
    latency_ms: f64,
}

impl SimClient {
    fn join(rng: &mut SimRng, config: &LoadTestConfig) -> Self {
        Self {
            active: true,
            position: Vec3::new(
                rng.range_f64(-10.0, 10.0),
                1.0,
                rng.range_f64(-10.0, 10.0),
            ),
            yaw: rng.range_f64(-std::f64::consts::PI, std::f64::consts::PI),
            health: 100.0,
            latency_ms: rng.range_f64(config.latency.min_ms, config.latency.max_ms),
        }
    }
}

/// Discrete-event load simulator
#[derive(Debug)]
pub struct LoadSimulator {
    config: LoadTestConfig,
    rng: SimRng,
    clients: Vec<SimClient>,
    queue: EventQueue,
    metrics: Metrics,
    now_ms: f64,
}

impl LoadSimulator {
    /// Build a simulator, validating the configuration
    pub fn new(config: LoadTestConfig) -> Result<Self> {
        let config = config.validated()?;
        let mut rng = SimRng::new(config.seed);
        let clients = (0..config.num_players)
            .map(|_| SimClient::join(&mut rng, &config))
            .collect();
        Ok(Self {
            config,
            rng,
            clients,
            queue: EventQueue::new(),
            metrics: Metrics::new(),
            now_ms: 0.0,
        })
    }

    /// Run the simulation to completion and produce a report
    ///
    /// Drains the event queue in virtual-time order until the configured
    /// duration elapses. Events already in flight past the end time are
    /// simply never drained.
    pub fn run(mut self) -> LoadTestReport {
        info!(
            players = self.config.num_players,
            duration_secs = self.config.duration_secs,
            "starting load test"
        );
        let end_ms = self.config.duration_ms();
        self.queue.push(0.0, SimEvent::Tick);

        while let Some((time, event)) = self.queue.pop() {
            if time > end_ms {
                break;
            }
            self.now_ms = time;
            match event {
                SimEvent::Tick => self.on_tick(),
                SimEvent::ServerReceive { message, latency_ms } => {
                    self.on_server_receive(message, latency_ms)
                }
                SimEvent::Broadcast { message } => self.on_broadcast(message),
                SimEvent::ClientDeliver { client, message } => {
                    self.on_client_deliver(client, message)
                }
            }
        }

        let report = LoadTestReport::new(
            self.config.num_players,
            self.config.duration_secs,
            self.metrics.snapshot(),
        );
        info!(status = ?report.status, "load test finished");
        report
    }

    fn on_tick(&mut self) {
        for i in 0..self.clients.len() {
            if self.clients[i].active {
                self.client_tick(i);
            } else if self.rng.chance(self.config.events.join) {
                self.clients[i] = SimClient::join(&mut self.rng, &self.config);
                self.send_to_server(SimMessage {
                    kind: MessageKind::Join,
                    sender: i,
                });
            }
        }

        self.enemy_tick();
        self.sample_metrics();

        self.queue.push(
            self.now_ms + self.config.update_interval_ms,
            SimEvent::Tick,
        );
    }

    fn client_tick(&mut self, i: usize) {
        if self.rng.chance(self.config.events.movement) {
            let dx = self.rng.range_f64(-0.25, 0.25);
            let dz = self.rng.range_f64(-0.25, 0.25);
            let dyaw = self.rng.range_f64(-0.1, 0.1);
            let client = &mut self.clients[i];
            client.position.x += dx;
            client.position.z += dz;
            client.yaw += dyaw;
            trace!(
                client = i,
                x = client.position.x,
                z = client.position.z,
                yaw = client.yaw,
                "movement"
            );
            self.send_to_server(SimMessage {
                kind: MessageKind::Movement,
                sender: i,
            });
        }
        if self.rng.chance(self.config.events.action) {
            const ACTIONS: [ActionKind; 3] =
                [ActionKind::Attack, ActionKind::Interact, ActionKind::Use];
            let kind = ACTIONS[(self.rng.next_u64() as usize) % ACTIONS.len()];
            self.send_to_server(SimMessage {
                kind: MessageKind::Action(kind),
                sender: i,
            });
        }
        if self.rng.chance(self.config.events.chat) {
            let line = CHAT_LINES[(self.rng.next_u64() as usize) % CHAT_LINES.len()];
            self.send_to_server(SimMessage {
                kind: MessageKind::Chat(line),
                sender: i,
            });
        }
        if self.rng.chance(self.config.events.leave) {
            self.send_to_server(SimMessage {
                kind: MessageKind::Leave,
                sender: i,
            });
            self.clients[i].active = false;
            debug!(client = i, "client left");
        }
    }

    /// Server-originated enemy behavior: occasionally an enemy attacks a
    /// random active client, and the hit is broadcast to everyone.
    fn enemy_tick(&mut self) {
        if !self.rng.chance(ENEMY_EVENT_CHANCE) {
            return;
        }
        let active: Vec<usize> = (0..self.clients.len())
            .filter(|&i| self.clients[i].active)
            .collect();
        let Some(&target) = self.rng.pick(&active) else {
            return;
        };
        if !self.rng.chance(ENEMY_ATTACK_CHANCE) {
            return;
        }
        let damage = self.rng.range_f64(5.0, 25.0) as u32;
        self.clients[target].health = (self.clients[target].health - damage as f64).max(0.0);
        debug!(
            victim = target,
            damage,
            health = self.clients[target].health,
            "enemy attack"
        );
        self.queue.push(
            self.now_ms,
            SimEvent::Broadcast {
                message: SimMessage {
                    kind: MessageKind::EnemyAttack { target, damage },
                    sender: target,
                },
            },
        );
    }

    fn sample_metrics(&mut self) {
        let (latency_sum, active) = self
            .clients
            .iter()
            .filter(|c| c.active)
            .fold((0.0, 0u32), |(sum, n), c| (sum + c.latency_ms, n + 1));
        let avg_latency = if active > 0 {
            latency_sum / active as f64
        } else {
            0.0
        };

        let elapsed_secs = (self.now_ms / 1000.0).max(1.0 / 1000.0);
        let load = (self.metrics.messages_processed() as f64 / elapsed_secs * 0.5).min(100.0);
        let fps = BASELINE_FPS - load / 10.0;
        self.metrics.sample(avg_latency, load, fps);
    }

    /// Uplink: loss is decided before the send, then the message pays
    /// half its jittered round trip to reach the server.
    fn send_to_server(&mut self, message: SimMessage) {
        if self.rng.chance(self.config.packet_loss) {
            self.metrics.record_dropped();
            return;
        }
        let latency_ms = self.jittered_latency(message.sender);
        self.queue.push(
            self.now_ms + latency_ms / 2.0,
            SimEvent::ServerReceive {
                message,
                latency_ms,
            },
        );
    }

    fn on_server_receive(&mut self, message: SimMessage, latency_ms: f64) {
        self.metrics.record_processed(latency_ms);
        let processing_ms = self.rng.range_f64(1.0, 6.0);
        self.metrics.record_server_load(processing_ms);
        self.queue
            .push(self.now_ms + processing_ms, SimEvent::Broadcast { message });
    }

    fn on_broadcast(&mut self, message: SimMessage) {
        for i in 0..self.clients.len() {
            if i == message.sender || !self.clients[i].active {
                continue;
            }
            if self.rng.chance(self.config.packet_loss) {
                self.metrics.record_packet_dropped();
                continue;
            }
            let downlink_ms = self.jittered_latency(i) / 2.0;
            self.queue.push(
                self.now_ms + downlink_ms,
                SimEvent::ClientDeliver { client: i, message },
            );
        }
    }

    fn on_client_deliver(&mut self, client: usize, message: SimMessage) {
        trace!(client, kind = ?message.kind, "delivered");
        self.metrics.record_delivered();
    }

    /// Base latency plus symmetric jitter, clamped so the result is
    /// never negative even when jitter exceeds the base.
    fn jittered_latency(&mut self, client: usize) -> f64 {
        let jitter = (self.rng.next_f64() - 0.5) * 2.0 * self.config.jitter_ms;
        (self.clients[client].latency_ms + jitter).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> LoadTestConfig {
        LoadTestConfig {
            num_players: 5,
            duration_secs: 5.0,
            ..LoadTestConfig::default()
        }
    }

    #[test]
    fn test_lossless_run_drops_nothing() {
        let config = LoadTestConfig {
            packet_loss: 0.0,
            ..quick_config()
        };
        let report = LoadSimulator::new(config).unwrap().run();
        assert_eq!(report.metrics.messages_dropped, 0);
        assert_eq!(report.metrics.packets_dropped, 0);
        assert!(report.metrics.messages_processed > 0);
        assert_eq!(report.packet_loss_rate, 0.0);
    }

    #[test]
    fn test_total_loss_processes_nothing() {
        let config = LoadTestConfig {
            packet_loss: 1.0,
            ..quick_config()
        };
        let report = LoadSimulator::new(config).unwrap().run();
        assert_eq!(report.metrics.messages_processed, 0);
        assert!(report.metrics.messages_dropped > 0);
        assert_eq!(report.packet_loss_rate, 1.0);
    }

    #[test]
    fn test_same_seed_same_report() {
        let a = LoadSimulator::new(quick_config()).unwrap().run();
        let b = LoadSimulator::new(quick_config()).unwrap().run();
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.status, b.status);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = LoadSimulator::new(quick_config()).unwrap().run();
        let b = LoadSimulator::new(LoadTestConfig {
            seed: 999,
            ..quick_config()
        })
        .unwrap()
        .run();
        assert_ne!(a.metrics, b.metrics);
    }

    #[test]
    fn test_longer_run_processes_more() {
        let short = LoadSimulator::new(quick_config()).unwrap().run();
        let long = LoadSimulator::new(LoadTestConfig {
            duration_secs: 10.0,
            ..quick_config()
        })
        .unwrap()
        .run();
        assert!(long.metrics.messages_processed > short.metrics.messages_processed);
    }

    #[test]
    fn test_jitter_never_yields_negative_latency() {
        // Jitter amplitude far above base latency
        let config = LoadTestConfig {
            latency: crate::LatencyRange {
                min_ms: 0.0,
                max_ms: 1.0,
            },
            jitter_ms: 500.0,
            packet_loss: 0.0,
            ..quick_config()
        };
        let report = LoadSimulator::new(config).unwrap().run();
        // Peak latency is the max over jittered values; no panic and a
        // non-negative peak means every draw was clamped.
        assert!(report.metrics.peak_latency_ms >= 0.0);
        assert!(report.metrics.messages_processed > 0);
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(LoadSimulator::new(LoadTestConfig {
            num_players: 0,
            ..LoadTestConfig::default()
        })
        .is_err());
    }
}
