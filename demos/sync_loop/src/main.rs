//! Sync Loop Example
//!
//! Walks one client through a full synchronization round: connect,
//! welcome, predicted movement, an authoritative snapshot that both
//! reconciles the local player and feeds a remote player's interpolation
//! buffer, and the interpolated render pose that falls out. Finishes
//! with a short load test run.
//!
//! Server frames are built with the same envelope types the session
//! decodes, so everything here goes through the real wire shapes.

use paredes_loadtest::{LoadSimulator, LoadTestConfig};
use paredes_netcode::{KinematicState, Predictor};
use paredes_protocol::{
    Envelope, GameStatePayload, Movement, PeerInfo, PlayerId, PlayerSnapshot, ServerMessage, Vec3,
    Yaw,
};
use paredes_session::{ChannelConnection, Session};

fn server_frame(body: ServerMessage, server_time: f64) -> String {
    Envelope::new(body, server_time).encode().expect("encode server frame")
}

fn main() {
    println!("=== Paredes Sync Loop Example ===\n");

    let (conn, outbound) = ChannelConnection::pair();
    let predictor = Predictor::new(KinematicState::spawn(Vec3::new(0.0, 1.0, 0.0)));
    let mut session = Session::new(conn, predictor);

    // The server clock runs 500ms ahead of ours in this script.
    let mut local_now = 1_000.0;
    let server_ahead = 500.0;

    session.connect(local_now).expect("connect");
    println!("sent: {}", outbound.recv().unwrap());

    // welcome: our identity plus one peer already in the world
    let frame = server_frame(
        ServerMessage::Welcome {
            player_id: PlayerId(1),
            players: vec![
                PeerInfo {
                    id: PlayerId(1),
                    position: Vec3::new(0.0, 1.0, 0.0),
                },
                PeerInfo {
                    id: PlayerId(2),
                    position: Vec3::new(5.0, 1.0, 0.0),
                },
            ],
        },
        local_now + server_ahead,
    );
    session.handle_frame(&frame, local_now).expect("welcome");
    println!(
        "\nconnected as {} with {} peer(s), clock offset {:.0}ms",
        session.local_id().unwrap(),
        session.remotes().count(),
        session.clock().offset_ms()
    );

    // Predict a few frames of forward movement; each one is applied
    // locally and sent in the same step.
    let forward = Movement { x: 0.0, z: -1.0 };
    for _ in 0..3 {
        local_now += 16.0;
        session
            .apply_local_input(forward, false, false, 0.016, local_now)
            .expect("input");
    }
    println!(
        "after 3 predicted inputs: z = {:.3}, {} pending",
        session.predictor().state().position.z,
        session.predictor().pending().len()
    );

    // Authoritative snapshot. Our own entry acknowledges the first two
    // inputs and sits within tolerance, so prediction stands; the peer's
    // entry lands in its interpolation buffer.
    for step in 0u32..3 {
        local_now += 100.0;
        let server_time = local_now + server_ahead;
        let frame = server_frame(
            ServerMessage::GameState(GameStatePayload {
                players: vec![
                    PlayerSnapshot {
                        id: PlayerId(1),
                        position: session.predictor().state().position,
                        rotation: Yaw { y: 0.0 },
                        health: 100.0,
                        stamina: 100.0,
                        last_processed_input: Some(2),
                    },
                    PlayerSnapshot {
                        id: PlayerId(2),
                        position: Vec3::new(5.0 + step as f64, 1.0, 0.0),
                        rotation: Yaw { y: 0.0 },
                        health: 100.0,
                        stamina: 100.0,
                        last_processed_input: None,
                    },
                ],
                enemies: vec![],
                game_info: None,
            }),
            server_time,
        );
        session.handle_frame(&frame, local_now).expect("game_state");
    }
    println!(
        "after reconciliation: {} pending input(s) remain",
        session.predictor().pending().len()
    );

    // Advance past the interpolation delay so the peer's buffered
    // samples bracket the render time, then interpolate.
    local_now += 60.0;
    session.update(local_now).expect("update");
    let peer = session.remote(PlayerId(2)).expect("peer");
    println!(
        "peer renders at x = {:.2} ({} buffered samples)",
        peer.pose().position.x,
        peer.buffer_stats().len
    );

    while let Some(event) = session.poll_event() {
        println!("event: {event:?}");
    }

    // A short deterministic load test over the same message model
    println!("\n=== Load Test ===\n");
    let config = LoadTestConfig {
        num_players: 20,
        duration_secs: 30.0,
        ..LoadTestConfig::default()
    };
    let report = LoadSimulator::new(config).expect("config").run();
    print!("{report}");
}
